use std::sync::Arc;

use axum::body::{self, Bytes};
use axum::extract::{Query, State};
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::download::{download_audio, download_video};
use crate::extractor::Extractor;
use crate::formats::{available_audio_options, available_resolutions};
use crate::media::{AudioOption, DownloadResult};
use crate::{Error, Result};

pub type SharedExtractor = Arc<dyn Extractor>;

// always offered in the codec picker, on top of whatever the probe finds.
const DEFAULT_AUDIO_CODECS: [&str; 2] = ["mp3", "m4a"];

#[derive(Deserialize)]
pub struct MetadataReq {
  url: String,
}

#[derive(Serialize)]
pub struct MetadataResp {
  title: Option<String>,
  resolutions: Vec<u32>,
  audio_options: Vec<AudioOption>,
  audio_codecs: Vec<String>,
}

#[axum::debug_handler]
pub async fn get_metadata(
  State(extractor): State<SharedExtractor>,
  Query(req): Query<MetadataReq>,
) -> Result<impl IntoResponse> {
  let url = validate_url(&req.url)?;
  let metadata = extractor.probe(url).await?;

  let audio_options = available_audio_options(&metadata.formats);
  let audio_codecs = audio_options
    .iter()
    .map(|o| o.ext.clone())
    .chain(DEFAULT_AUDIO_CODECS.iter().map(|c| c.to_string()))
    .sorted()
    .dedup()
    .collect();

  Ok(Json(MetadataResp {
    title: metadata.title,
    resolutions: available_resolutions(&metadata.formats),
    audio_options,
    audio_codecs,
  }))
}

#[derive(Deserialize)]
pub struct VideoReq {
  url: String,
  height: Option<u32>,
}

pub async fn get_video(
  State(extractor): State<SharedExtractor>,
  Query(req): Query<VideoReq>,
) -> Result<impl IntoResponse> {
  let url = validate_url(&req.url)?;
  let result = download_video(extractor.as_ref(), url, req.height).await?;
  attachment_response(result)
}

#[derive(Deserialize)]
pub struct AudioReq {
  url: String,
  codec: String,
  bitrate: Option<u32>,
}

pub async fn get_audio(
  State(extractor): State<SharedExtractor>,
  Query(req): Query<AudioReq>,
) -> Result<impl IntoResponse> {
  let url = validate_url(&req.url)?;
  let result =
    download_audio(extractor.as_ref(), url, &req.codec, req.bitrate).await?;
  attachment_response(result)
}

// reject obvious non-urls before forking a subprocess for them.
fn validate_url(url: &str) -> Result<&str> {
  if url.starts_with("http://") || url.starts_with("https://") {
    Ok(url)
  } else {
    Err(Error::UnsupportedUrl(url.to_string(), "not an http(s) url"))
  }
}

fn attachment_response(
  result: DownloadResult,
) -> Result<Response<body::Full<Bytes>>> {
  let resp = Response::builder()
    .status(StatusCode::OK)
    .header(header::CONTENT_TYPE, result.mime_type)
    .header(
      header::CONTENT_DISPOSITION,
      format!("attachment; filename=\"{}\"", result.filename),
    )
    .body(body::Full::new(Bytes::from(result.data)))?;

  Ok(resp)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn url_validation() {
    assert!(validate_url("https://youtube.com/watch?v=abc").is_ok());
    assert!(validate_url("http://example.com").is_ok());
    assert!(validate_url("ftp://example.com").is_err());
    assert!(validate_url("watch?v=abc").is_err());
    assert!(validate_url("").is_err());
  }

  #[test]
  fn attachment_headers() {
    let resp = attachment_response(DownloadResult {
      data: b"media".to_vec(),
      filename: "output.mp4".to_string(),
      mime_type: "video/mp4",
    })
    .unwrap();

    assert_eq!(resp.headers()[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(
      resp.headers()[header::CONTENT_DISPOSITION],
      "attachment; filename=\"output.mp4\""
    );
  }
}
