use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CuckooError {
    #[error("invalid table configuration: {0}")]
    InvalidConfig(String),
    #[error("insertion failed: {0}")]
    InsertionFailed(String),
    #[error("rehash failed: {0}")]
    RehashFailed(String),
    #[error("table full: all {attempts} rebuild attempts failed")]
    TableFull { attempts: usize },
}

pub type Result<T> = std::result::Result<T, CuckooError>;
