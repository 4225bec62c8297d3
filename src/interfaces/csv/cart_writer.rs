use crate::domain::cart::{CartItem, CartSnapshot};
use crate::error::Result;
use std::io::Write;

/// Writes the final cart state as CSV.
pub struct CartWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CartWriter<W> {
    pub fn new(target: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(target),
        }
    }

    /// Serializes the item list, one row per line, headers first.
    pub fn write_items(&mut self, items: &[CartItem]) -> Result<()> {
        for item in items {
            self.writer.serialize(item)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Serializes a snapshot's item list.
    pub fn write_snapshot(&mut self, snapshot: &CartSnapshot) -> Result<()> {
        self.write_items(&snapshot.items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_writer_output() {
        let items = vec![
            CartItem::new(1, "Mug", dec!(12.50), 10).with_quantity(2),
            CartItem::new(2, "Shirt", dec!(24.50), 5),
        ];
        let mut buffer = Vec::new();
        CartWriter::new(&mut buffer).write_items(&items).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("id,name,unitPrice,quantity,stockLimit"));
        assert_eq!(lines.next(), Some("1,Mug,12.50,2,10"));
        assert_eq!(lines.next(), Some("2,Shirt,24.50,1,5"));
    }

    #[test]
    fn test_writer_empty_cart() {
        let mut buffer = Vec::new();
        CartWriter::new(&mut buffer).write_items(&[]).unwrap();
        assert!(String::from_utf8(buffer).unwrap().is_empty());
    }
}
