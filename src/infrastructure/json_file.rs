use crate::domain::cart::CartItem;
use crate::domain::ports::CartRepository;
use crate::error::{Result, StorefrontError};
use async_trait::async_trait;
use std::path::PathBuf;

/// Durable cart persistence in a single JSON file.
///
/// The file holds the serialized item list under one key, the way a browser
/// session would keep it in local storage. Reads are defensive: a missing
/// or malformed file degrades to an empty cart and is never surfaced as an
/// error.
pub struct JsonFileCartRepository {
    path: PathBuf,
}

impl JsonFileCartRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CartRepository for JsonFileCartRepository {
    async fn load(&self) -> Vec<CartItem> {
        let Ok(bytes) = std::fs::read(&self.path) else {
            return Vec::new();
        };
        match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!(%error, path = %self.path.display(), "discarding malformed cart data");
                Vec::new()
            }
        }
    }

    async fn save(&self, items: &[CartItem]) -> Result<()> {
        let bytes =
            serde_json::to_vec(items).map_err(|error| StorefrontError::Internal(Box::new(error)))?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }
}
