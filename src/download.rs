use tracing::info;

use crate::extractor::{Extractor, ExtractorOptions, Postprocessor};
use crate::media::DownloadResult;
use crate::transfer::read_output;
use crate::Result;

// fixed stem for everything the extractor writes into the scratch dir.
const OUTPUT_STEM: &str = "output";

const DEFAULT_AUDIO_BITRATE_KBPS: u32 = 192;

// prefer an exact-height stream merged with the best audio, then the best
// combined stream at that height, then the overall best. the wide
// fallback keeps a request for an unavailable height from failing.
fn video_format_expr(target_height: Option<u32>) -> String {
  match target_height {
    Some(h) => {
      format!("bestvideo[height={h}]+bestaudio/best[height={h}]/best")
    }
    None => "bestvideo+bestaudio/best".to_string(),
  }
}

fn audio_format_expr() -> String {
  "bestaudio/best".to_string()
}

// the scratch dir is removed when `TempDir` drops, on every exit path.
pub async fn download_video(
  extractor: &dyn Extractor,
  url: &str,
  target_height: Option<u32>,
) -> Result<DownloadResult> {
  let scratch = tempfile::tempdir()?;
  let opts = ExtractorOptions {
    format: video_format_expr(target_height),
    output_template: scratch.path().join(format!("{OUTPUT_STEM}.%(ext)s")),
    merge_container: Some("mp4"),
    postprocessors: Vec::new(),
    quiet: true,
  };

  extractor.download(url, &opts).await?;

  let result = read_output(scratch.path(), OUTPUT_STEM).await?;
  info!("video ready: {} ({} bytes)", result.filename, result.data.len());
  Ok(result)
}

pub async fn download_audio(
  extractor: &dyn Extractor,
  url: &str,
  codec: &str,
  bitrate_kbps: Option<u32>,
) -> Result<DownloadResult> {
  let scratch = tempfile::tempdir()?;
  let opts = ExtractorOptions {
    format: audio_format_expr(),
    output_template: scratch.path().join(format!("{OUTPUT_STEM}.%(ext)s")),
    merge_container: None,
    postprocessors: vec![Postprocessor::ExtractAudio {
      codec: codec.to_string(),
      bitrate_kbps: bitrate_kbps.unwrap_or(DEFAULT_AUDIO_BITRATE_KBPS),
    }],
    quiet: true,
  };

  extractor.download(url, &opts).await?;

  let result = read_output(scratch.path(), OUTPUT_STEM).await?;
  info!("audio ready: {} ({} bytes)", result.filename, result.data.len());
  Ok(result)
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;
  use std::sync::Mutex;

  use async_trait::async_trait;

  use super::*;
  use crate::media::MediaMetadata;

  #[test]
  fn video_format_expressions() {
    assert_eq!(
      video_format_expr(Some(1080)),
      "bestvideo[height=1080]+bestaudio/best[height=1080]/best"
    );
    assert_eq!(video_format_expr(None), "bestvideo+bestaudio/best");
  }

  #[test]
  fn audio_format_expression() {
    assert_eq!(audio_format_expr(), "bestaudio/best");
  }

  // emulates the external tool's selection fallback: walks the
  // alternatives of the format expression and writes an output file as
  // soon as one matches the catalog.
  struct StubExtractor {
    heights: Vec<u32>,
    seen_dir: Mutex<Option<PathBuf>>,
  }

  impl StubExtractor {
    fn new(heights: Vec<u32>) -> Self {
      Self {
        heights,
        seen_dir: Mutex::new(None),
      }
    }

    fn scratch_dir(&self) -> PathBuf {
      self.seen_dir.lock().unwrap().clone().unwrap()
    }
  }

  fn parse_height(alternative: &str) -> Option<u32> {
    let (_, rest) = alternative.split_once("[height=")?;
    rest.split(']').next()?.parse().ok()
  }

  #[async_trait]
  impl Extractor for StubExtractor {
    async fn probe(&self, _url: &str) -> Result<MediaMetadata> {
      Ok(MediaMetadata {
        title: None,
        formats: Vec::new(),
      })
    }

    async fn download(
      &self,
      _url: &str,
      opts: &ExtractorOptions,
    ) -> Result<()> {
      let dir = opts.output_template.parent().unwrap().to_path_buf();
      *self.seen_dir.lock().unwrap() = Some(dir.clone());

      let ext = match opts.postprocessors.first() {
        Some(Postprocessor::ExtractAudio { codec, .. }) => codec.clone(),
        None => opts.merge_container.unwrap_or("mp4").to_string(),
      };

      let matched = opts.format.split('/').any(|alt| {
        match parse_height(alt) {
          Some(h) => self.heights.contains(&h),
          None => !self.heights.is_empty(),
        }
      });
      if matched {
        std::fs::write(dir.join(format!("output.{ext}")), b"media")?;
      }

      Ok(())
    }
  }

  #[tokio::test]
  async fn unavailable_height_falls_back_to_best() {
    let stub = StubExtractor::new(vec![720, 480]);
    let result = download_video(&stub, "https://example.com/v", Some(1080))
      .await
      .unwrap();

    assert_eq!(result.filename, "output.mp4");
    assert_eq!(result.mime_type, "video/mp4");
    assert_eq!(result.data, b"media");
  }

  #[tokio::test]
  async fn exact_height_downloads() {
    let stub = StubExtractor::new(vec![1080, 720]);
    let result = download_video(&stub, "https://example.com/v", Some(720))
      .await
      .unwrap();
    assert_eq!(result.mime_type, "video/mp4");
  }

  #[tokio::test]
  async fn audio_transcode_names_the_target_codec() {
    let stub = StubExtractor::new(vec![720]);
    let result =
      download_audio(&stub, "https://example.com/v", "mp3", None)
        .await
        .unwrap();

    assert_eq!(result.filename, "output.mp3");
    assert_eq!(result.mime_type, "audio/mpeg");
  }

  #[tokio::test]
  async fn missing_output_is_reported() {
    let stub = StubExtractor::new(Vec::new());
    let err = download_video(&stub, "https://example.com/v", None)
      .await
      .unwrap_err();
    assert!(matches!(err, crate::Error::OutputNotFound));
  }

  #[tokio::test]
  async fn scratch_dir_is_gone_after_the_request() {
    let stub = StubExtractor::new(vec![720]);
    download_video(&stub, "https://example.com/v", None)
      .await
      .unwrap();
    assert!(!stub.scratch_dir().exists());

    // also released when the download fails
    let stub = StubExtractor::new(Vec::new());
    download_video(&stub, "https://example.com/v", None)
      .await
      .unwrap_err();
    assert!(!stub.scratch_dir().exists());
  }
}
