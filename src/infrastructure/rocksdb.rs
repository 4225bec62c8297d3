use crate::domain::cart::CartItem;
use crate::domain::ports::CartRepository;
use crate::error::{Result, StorefrontError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;

/// Column Family for the persisted cart.
pub const CF_CART: &str = "cart";

const CART_KEY: &[u8] = b"items";

/// Cart persistence backed by RocksDB.
///
/// The item list lives under a single key in its own column family.
/// Thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbCartRepository {
    db: Arc<DB>,
}

impl RocksDbCartRepository {
    /// Opens or creates a RocksDB instance at the specified path, ensuring
    /// the cart column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_cart = ColumnFamilyDescriptor::new(CF_CART, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_cart])?;

        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl CartRepository for RocksDbCartRepository {
    async fn load(&self) -> Vec<CartItem> {
        let Some(cf) = self.db.cf_handle(CF_CART) else {
            return Vec::new();
        };
        let bytes = match self.db.get_cf(&cf, CART_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(error) => {
                tracing::warn!(%error, "cart read failed, starting empty");
                return Vec::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!(%error, "discarding malformed cart data");
                Vec::new()
            }
        }
    }

    async fn save(&self, items: &[CartItem]) -> Result<()> {
        let cf = self.db.cf_handle(CF_CART).ok_or_else(|| {
            StorefrontError::Internal(Box::new(std::io::Error::other(
                "cart column family not found",
            )))
        })?;
        let bytes =
            serde_json::to_vec(items).map_err(|error| StorefrontError::Internal(Box::new(error)))?;
        self.db.put_cf(&cf, CART_KEY, bytes)?;
        Ok(())
    }
}
