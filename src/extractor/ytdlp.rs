use std::process::Stdio;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tokio::sync::Semaphore;
use tracing::info;

use crate::media::MediaMetadata;
use crate::{Error, Result};

use super::{Extractor, ExtractorOptions, Postprocessor};

// drives the yt-dlp command line. requires the yt-dlp executable to be in
// PATH; merged and transcoded downloads additionally require ffmpeg.
pub struct Ytdlp;

// ensure only a limited number of yt-dlp processes at a time
static YTDLP_MUTEX: LazyLock<Semaphore> = LazyLock::new(|| {
  let concurrency = std::env::var("YTDLP_CONCURRENCY")
    .ok()
    .and_then(|s| s.parse::<usize>().ok())
    .unwrap_or(1);
  Semaphore::new(concurrency)
});

static YTDLP_PROXY: LazyLock<Option<String>> =
  LazyLock::new(|| std::env::var("YTDLP_PROXY").ok());

#[async_trait]
impl Extractor for Ytdlp {
  async fn probe(&self, url: &str) -> Result<MediaMetadata> {
    let mut cmd = Command::new("yt-dlp");
    cmd.arg("-J").arg("--no-progress").arg(url);
    add_proxy(&mut cmd);

    let guard = YTDLP_MUTEX.acquire().await.unwrap();
    let output = cmd.output().await?;
    drop(guard);

    if !output.status.success() {
      return Err(Error::MetadataFetch(stderr_message(&output.stderr)));
    }

    let metadata = serde_json::from_slice(&output.stdout)?;
    Ok(metadata)
  }

  async fn download(&self, url: &str, opts: &ExtractorOptions) -> Result<()> {
    let mut cmd = Command::new("yt-dlp");
    cmd
      .arg("-f")
      .arg(&opts.format)
      .arg("--no-progress")
      .arg("--no-mtime")
      .arg("-o")
      .arg(&opts.output_template);

    if opts.quiet {
      cmd.arg("-q");
    }
    if let Some(container) = opts.merge_container {
      cmd.arg("--merge-output-format").arg(container);
    }
    for pp in &opts.postprocessors {
      match pp {
        Postprocessor::ExtractAudio { codec, bitrate_kbps } => {
          cmd
            .arg("-x")
            .arg("--audio-format")
            .arg(codec)
            .arg("--audio-quality")
            .arg(format!("{bitrate_kbps}K"));
        }
      }
    }
    add_proxy(&mut cmd);
    cmd.arg(url);

    info!("downloading {} with format {}", url, opts.format);

    let guard = YTDLP_MUTEX.acquire().await.unwrap();
    let child = cmd.stdout(Stdio::null()).stderr(Stdio::piped()).spawn()?;
    let output = child.wait_with_output().await?;
    drop(guard);

    if !output.status.success() {
      return Err(Error::Extraction(stderr_message(&output.stderr)));
    }

    detect_error(&output.stderr)
  }
}

fn add_proxy(cmd: &mut Command) {
  if let Some(proxy) = YTDLP_PROXY.as_deref() {
    // strip cred info from the proxy url before logging
    static AUTH_REGEX: LazyLock<Regex> =
      LazyLock::new(|| Regex::new(r"//[^:]+(:[^@]+)@").unwrap());
    info!("using proxy: {}", AUTH_REGEX.replace(proxy, "//<REDACTED>@"));
    cmd.arg("--proxy").arg(proxy);
  }
}

// yt-dlp can exit zero while still reporting per-stream failures.
fn detect_error(stderr: &[u8]) -> Result<()> {
  let s = String::from_utf8_lossy(stderr);
  if s.contains("ERROR:") {
    Err(Error::Extraction(s.trim().to_string()))
  } else {
    Ok(())
  }
}

fn stderr_message(stderr: &[u8]) -> String {
  let s = String::from_utf8_lossy(stderr);
  s.lines()
    .find(|line| line.contains("ERROR:"))
    .unwrap_or_else(|| s.trim())
    .to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detect_error_flags_error_lines() {
    assert!(detect_error(b"ERROR: unable to download video data").is_err());
    assert!(detect_error(b"[download] Destination: output.mp4").is_ok());
    assert!(detect_error(b"").is_ok());
  }

  #[test]
  fn stderr_message_prefers_error_line() {
    let stderr = b"WARNING: unable to use cookies\n\
                   ERROR: Unsupported URL: https://example.com\n";
    assert_eq!(
      stderr_message(stderr),
      "ERROR: Unsupported URL: https://example.com"
    );
  }

  #[test]
  fn stderr_message_falls_back_to_full_output() {
    assert_eq!(stderr_message(b"something odd\n"), "something odd");
  }
}
