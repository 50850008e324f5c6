use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid data: {0}")]
    InvalidDataFormat(String),

    #[error("Batch not found: {0}")]
    BatchNotFound(String),

    #[error(
        "Insufficient stock for {color} ({cotton_part}% cotton): available {available}, requested {requested}"
    )]
    InsufficientStock {
        color: String,
        cotton_part: i64,
        available: i64,
        requested: i64,
    },

    #[error("Import failed: {0}")]
    FileProcessing(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
