use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("File storage error: {0}")]
    FileStorageError(String),

    #[error("Underlying I/O error")]
    IoError(#[from] std::io::Error),

    #[error("Base64 decode error")]
    Base64DecodeError(#[from] base64::DecodeError),
}
