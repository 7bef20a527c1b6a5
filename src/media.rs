use serde::{Deserialize, Serialize};

// one encoding variant reported by the extractor's json probe. the real
// output carries dozens more fields; everything unused is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamFormat {
  pub ext: Option<String>,
  pub vcodec: Option<String>,
  pub acodec: Option<String>,
  pub height: Option<u32>,
  pub abr: Option<f64>,
}

// constructed fresh per probe, never persisted.
#[derive(Debug, Deserialize)]
pub struct MediaMetadata {
  pub title: Option<String>,
  #[serde(default)]
  pub formats: Vec<StreamFormat>,
}

// a downloadable audio-only rendition: container extension plus average
// bitrate, when the probe reports one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AudioOption {
  pub ext: String,
  pub bitrate: Option<u32>,
}

#[derive(Debug)]
pub struct DownloadResult {
  pub data: Vec<u8>,
  pub filename: String,
  pub mime_type: &'static str,
}
