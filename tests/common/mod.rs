use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn generate_ops_csv(path: &Path, rows: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["op", "id", "name", "price", "quantity", "stock"])?;

    for i in 1..=rows {
        wtr.write_record(["add", &i.to_string(), "Widget", "2.50", "1", "100"])?;
    }

    wtr.flush()?;
    Ok(())
}
