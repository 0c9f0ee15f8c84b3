use std::{fs::File, io, path::PathBuf};

use crate::portfolio::render::RenderTable;
use crate::util::os::mk_writable_dir;

use super::model::{AcbWriter, OutputType};

/// Writes each table to its own file in out_dir.
pub struct CsvWriter {
    out_dir: PathBuf,
}

impl CsvWriter {
    pub fn new(out_dir: &str) -> Result<CsvWriter, io::Error> {
        let dir_path = PathBuf::from(out_dir);
        mk_writable_dir(&dir_path)?;
        Ok(CsvWriter { out_dir: dir_path })
    }
}

fn file_safe_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '-' })
        .collect()
}

/// Writes the header, rows and footer as records. Errors and notes follow,
/// each as a record of its own with the message in the first column.
fn write_table<W: io::Write>(w: W, table_model: &RenderTable) -> csv::Result<()> {
    let mut csv_w = csv::WriterBuilder::new().has_headers(true).from_writer(w);

    csv_w.write_record(&table_model.header)?;
    for row in &table_model.rows {
        csv_w.write_record(row)?;
    }
    if !table_model.footer.is_empty() {
        csv_w.write_record(&table_model.footer)?;
    }

    let n_cols = table_model.header.len().max(1);
    let messages = table_model.errors.iter().map(|e| format!("[!] {e}"))
        .chain(table_model.notes.iter().cloned());
    for msg in messages {
        let mut record = vec![String::new(); n_cols];
        record[0] = msg;
        csv_w.write_record(&record)?;
    }

    csv_w.flush()?;
    Ok(())
}

impl AcbWriter for CsvWriter {
    fn print_render_table(
        &mut self,
        out_type: OutputType,
        name: &str,
        table_model: &RenderTable,
    ) -> Result<(), super::model::Error> {
        let file_name = match out_type {
            OutputType::Transactions => format!("{}.csv", file_safe_name(name)),
            OutputType::CapitalGains => format!("{}-gains.csv", file_safe_name(name)),
            OutputType::PortfolioSummary => "portfolio-summary.csv".to_string(),
            OutputType::AggregateGains => "aggregate-gains.csv".to_string(),
        };

        let file_path = self.out_dir.join(file_name);
        let fp = File::create(&file_path).map_err(|e| {
            format!("Failed to create {}: {}", file_path.display(), e)
        })?;
        tracing::info!("CsvWriter: writing {}", file_path.display());

        write_table(fp, table_model)
            .map_err(|e| format!("Failed to write {}: {}", file_path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use crate::portfolio::render::RenderTable;

    use super::{file_safe_name, write_table};

    #[test]
    fn test_file_safe_name() {
        assert_eq!(file_safe_name("VFV.TO"), "vfv.to");
        assert_eq!(file_safe_name("A B/C"), "a-b-c");
    }

    #[test]
    fn test_write_table() {
        let table = RenderTable {
            header: vec!["Year".to_string(), "Gain".to_string()],
            rows: vec![vec!["2023".to_string(), "$1,000.00".to_string()]],
            footer: vec![String::new(), "Total: $1,000.00\n2023: $1,000.00".to_string()],
            notes: vec!["A note".to_string()],
            errors: vec!["Bad".to_string()],
        };
        let mut buf = Vec::<u8>::new();
        write_table(&mut buf, &table).unwrap();

        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Year,Gain\n\
             2023,\"$1,000.00\"\n\
             ,\"Total: $1,000.00\n2023: $1,000.00\"\n\
             [!] Bad,\n\
             A note,\n"
        );
    }
}
