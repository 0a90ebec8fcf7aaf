use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Category already exists: {0}")]
    CategoryExists(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Parent category not found: {0}")]
    ParentNotFound(String),

    #[error("Invalid similarity weight {weight} for edge {from} -> {to}: expected a value in [0, 1]")]
    InvalidWeight { from: String, to: String, weight: f32 },

    #[error("Invalid rating {0}: expected a finite value")]
    InvalidRating(f32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
