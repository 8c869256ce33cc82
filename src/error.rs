use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("Hero name must not be empty")]
  InvalidName,
  #[error("No hero with id {0}")]
  NotFound(i64),
  #[error("{0}")]
  Service(String),
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error(transparent)]
  Json(#[from] serde_json::Error),
}
