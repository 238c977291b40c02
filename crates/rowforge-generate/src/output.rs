use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::rows::RowSet;

/// Write one entity's row set as CSV.
///
/// Header is the attribute names in declared order; absent values render
/// as empty fields. Returns the number of bytes written.
pub fn write_entity_csv(path: &Path, row_set: &RowSet) -> Result<u64, csv::Error> {
    let file = File::create(path).map_err(csv::Error::from)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));

    writer.write_record(&row_set.attribute_names)?;

    for row in &row_set.rows {
        let record: Vec<&str> = row_set
            .attribute_names
            .iter()
            .map(|name| row.get(name).map(String::as_str).unwrap_or_default())
            .collect();
        writer.write_record(&record)?;
    }

    writer.flush()?;
    drop(writer);

    let bytes = std::fs::metadata(path).map(|meta| meta.len()).unwrap_or(0);
    Ok(bytes)
}
