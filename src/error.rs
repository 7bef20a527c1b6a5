use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("unsupported url {0}: {1}")]
  UnsupportedUrl(String, &'static str),

  #[error("failed to fetch media info: {0}")]
  MetadataFetch(String),

  #[error("download failed: {0}")]
  Extraction(String),

  #[error("extractor produced no output file (is ffmpeg installed?)")]
  OutputNotFound,

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error("malformed extractor output: {0}")]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Http(#[from] axum::http::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::UnsupportedUrl(..) => StatusCode::BAD_REQUEST,
      // the external tool failed, not us
      Error::MetadataFetch(_) | Error::Extraction(_) => StatusCode::BAD_GATEWAY,
      _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, self.to_string()).into_response()
  }
}
