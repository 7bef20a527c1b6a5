use std::sync::Arc;

use axum::{
  headers::ContentType, response::IntoResponse, routing::get, Router,
  TypedHeader,
};

mod download;
mod error;
mod extractor;
mod formats;
mod media;
mod transfer;
mod web;

pub use error::{Error, Result};

use crate::extractor::Ytdlp;
use crate::web::SharedExtractor;

pub const BIND_ADDR: &str = "0.0.0.0:8080";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let extractor: SharedExtractor = Arc::new(Ytdlp);

  let app = Router::new()
    .route("/", get(homepage))
    .route("/health", get(health))
    .route("/api/metadata", get(web::get_metadata))
    .route("/download/video", get(web::get_video))
    .route("/download/audio", get(web::get_audio))
    .with_state(extractor);

  println!("Listening on {BIND_ADDR}");

  axum::Server::bind(&BIND_ADDR.parse().unwrap())
    .serve(app.into_make_service())
    .await
    .expect("Failed to start server");

  Ok(())
}

pub const HOMEPAGE_HTML: &str = include_str!("../html/index.html");

async fn homepage() -> impl IntoResponse {
  (
    TypedHeader::<ContentType>(ContentType::html()),
    HOMEPAGE_HTML,
  )
}

async fn health() -> impl IntoResponse {
  "ok".to_owned()
}
