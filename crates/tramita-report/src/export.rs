//! CSV serialisation of a finished report.

use std::path::Path;

use arrow::util::display::{ArrayFormatter, FormatOptions};
use tracing::info;

use crate::{Report, ReportError};

/// File name offered for the CSV download.
pub const CSV_FILE_NAME: &str = "proposicoes_deputados.csv";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Encode the report as UTF-8 CSV: a header row of display labels, then one
/// record per proposal. Nulls become empty fields; there is no index column.
pub fn to_csv(report: &Report) -> Result<Vec<u8>, ReportError> {
    let batch = report.batch();
    let schema = batch.schema();
    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record(schema.fields().iter().map(|f| f.name().as_str()))?;

    let options = FormatOptions::default().with_timestamp_format(Some(TIMESTAMP_FORMAT));
    let formatters = batch
        .columns()
        .iter()
        .map(|col| ArrayFormatter::try_new(col.as_ref(), &options))
        .collect::<Result<Vec<_>, _>>()?;

    for row in 0..batch.num_rows() {
        let record: Vec<String> = formatters
            .iter()
            .map(|f| f.value(row).to_string())
            .collect();
        wtr.write_record(&record)?;
    }

    wtr.into_inner().map_err(|e| ReportError::Io(e.into_error()))
}

/// Write the CSV encoding of `report` to `path`.
pub fn write_csv(report: &Report, path: &Path) -> Result<(), ReportError> {
    let bytes = to_csv(report)?;
    std::fs::write(path, &bytes)?;
    info!(path = %path.display(), rows = report.num_rows(), bytes = bytes.len(), "wrote csv");
    Ok(())
}
