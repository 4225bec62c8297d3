use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use storefront_session::application::cart::CartStore;
use storefront_session::domain::cart::CartItem;
use storefront_session::domain::ports::CartRepositoryBox;
use storefront_session::error::StorefrontError;
use storefront_session::infrastructure::in_memory::InMemoryCartRepository;
use storefront_session::infrastructure::json_file::JsonFileCartRepository;
use storefront_session::interfaces::csv::cart_writer::CartWriter;
use storefront_session::interfaces::csv::op_reader::{CartOp, CartOpKind, CartOpReader};

/// Replays a cart-operation script against a persisted cart session and
/// prints the resulting cart as CSV.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input cart operations CSV file
    input: PathBuf,

    /// Path to the persisted cart JSON file (optional). In-memory if omitted.
    #[arg(long)]
    cart_path: Option<PathBuf>,

    /// Path to a persistent database (optional). If provided, uses RocksDB.
    #[cfg(feature = "storage-rocksdb")]
    #[arg(long)]
    db_path: Option<PathBuf>,
}

impl Cli {
    fn repository(&self) -> Result<CartRepositoryBox> {
        #[cfg(feature = "storage-rocksdb")]
        if let Some(db_path) = &self.db_path {
            let store = storefront_session::infrastructure::rocksdb::RocksDbCartRepository::open(
                db_path,
            )
            .into_diagnostic()?;
            return Ok(Box::new(store));
        }

        Ok(match &self.cart_path {
            Some(path) => Box::new(JsonFileCartRepository::new(path)),
            None => Box::new(InMemoryCartRepository::new()),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cart = CartStore::open(cli.repository()?).await;

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CartOpReader::new(file);
    for op_result in reader.ops() {
        match op_result {
            Ok(op) => {
                if let Err(e) = apply_op(&mut cart, op).await {
                    eprintln!("Error applying operation: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading operation: {}", e);
            }
        }
    }

    let stdout = io::stdout();
    let mut writer = CartWriter::new(stdout.lock());
    writer.write_snapshot(&cart.snapshot()).into_diagnostic()?;

    Ok(())
}

async fn apply_op(cart: &mut CartStore, op: CartOp) -> storefront_session::error::Result<()> {
    match op.op {
        CartOpKind::Add => {
            let id = required(op.id, "add requires an id")?;
            let name = required(op.name, "add requires a name")?;
            let price = required(op.price, "add requires a price")?;
            let stock = required(op.stock, "add requires a stock limit")?;
            let quantity = u32::try_from(op.quantity.unwrap_or(1).max(1)).unwrap_or(u32::MAX);
            cart.add(CartItem::new(id, name, price, stock).with_quantity(quantity))
                .await
        }
        CartOpKind::Remove => {
            let id = required(op.id, "remove requires an id")?;
            cart.remove(id).await
        }
        CartOpKind::Set => {
            let id = required(op.id, "set requires an id")?;
            let quantity = required(op.quantity, "set requires a quantity")?;
            cart.set_quantity(id, quantity).await
        }
        CartOpKind::Clear => cart.clear().await,
    }
}

fn required<T>(value: Option<T>, message: &str) -> storefront_session::error::Result<T> {
    value.ok_or_else(|| StorefrontError::Validation(message.to_string()))
}
