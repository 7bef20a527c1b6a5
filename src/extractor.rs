mod ytdlp;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::media::MediaMetadata;
use crate::Result;

pub use ytdlp::Ytdlp;

// one post-download transform carried out by the media processor.
#[derive(Debug, Clone)]
pub enum Postprocessor {
  ExtractAudio { codec: String, bitrate_kbps: u32 },
}

// declarative invocation options covering the subset of the external
// extractor's surface this service relies on.
#[derive(Debug, Clone)]
pub struct ExtractorOptions {
  pub format: String,
  pub output_template: PathBuf,
  pub merge_container: Option<&'static str>,
  pub postprocessors: Vec<Postprocessor>,
  pub quiet: bool,
}

#[async_trait]
pub trait Extractor: Send + Sync {
  // query available streams without downloading anything.
  async fn probe(&self, url: &str) -> Result<MediaMetadata>;

  // fetch (and possibly merge or transcode) into the output template.
  async fn download(&self, url: &str, opts: &ExtractorOptions) -> Result<()>;
}
