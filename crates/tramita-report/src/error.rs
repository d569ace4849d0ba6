use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot coerce {column} of proposal {id} to an integer: {value}")]
    Coercion {
        id: i64,
        column: &'static str,
        value: String,
    },

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
