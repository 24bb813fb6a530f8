use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("snapshot does not belong to processor '{processor}'")]
    SnapshotMismatch { processor: &'static str },
}

pub type Result<T> = std::result::Result<T, CoreError>;
