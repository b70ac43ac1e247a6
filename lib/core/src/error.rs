use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Caller supplied a query, dataset or neighbor count that cannot be classified.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The compiled-in reference table violates its authoring invariants.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn invalid_dataset(msg: impl Into<String>) -> Self {
        Error::InvalidDataset(msg.into())
    }
}
