use crate::error::{Result, StorefrontError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// Cart operations as they appear in a replay script.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum CartOpKind {
    Add,
    Remove,
    Set,
    Clear,
}

/// One row of a replay script: `op, id, name, price, quantity, stock`.
///
/// Fields irrelevant to an operation are left blank (`remove, 3, , , ,`).
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CartOp {
    pub op: CartOpKind,
    pub id: Option<u64>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<i64>,
    pub stock: Option<u32>,
}

/// Reads cart operations from a CSV source.
///
/// Wraps `csv::Reader` and provides an iterator over `Result<CartOp>`,
/// trimming whitespace and tolerating short records.
pub struct CartOpReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CartOpReader<R> {
    /// Creates a reader from any `Read` source (e.g. File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily reads and deserializes operations, streaming large scripts
    /// without loading them into memory.
    pub fn ops(self) -> impl Iterator<Item = Result<CartOp>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(StorefrontError::from))
    }
}
