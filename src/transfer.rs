use std::path::Path;

use crate::media::DownloadResult;
use crate::{Error, Result};

// static extension table; the extractor names files with the container's
// native extension, so sniffing the content is unnecessary.
pub fn mime_from_ext(ext: &str) -> &'static str {
  match ext.to_ascii_lowercase().as_str() {
    "mp4" => "video/mp4",
    "webm" => "video/webm",
    "mkv" => "video/x-matroska",
    "mp3" => "audio/mpeg",
    "m4a" => "audio/mp4",
    "aac" => "audio/aac",
    "opus" => "audio/ogg",
    "wav" => "audio/wav",
    _ => "application/octet-stream",
  }
}

// read the first file under `dir` whose name starts with `stem` into
// memory. the extractor picks the final extension, so the exact name is
// only known after it has run.
pub async fn read_output(dir: &Path, stem: &str) -> Result<DownloadResult> {
  let mut entries = tokio::fs::read_dir(dir).await?;

  while let Some(entry) = entries.next_entry().await? {
    let filename = entry.file_name().to_string_lossy().into_owned();
    if !filename.starts_with(stem) {
      continue;
    }

    let data = tokio::fs::read(entry.path()).await?;
    let ext = filename.rsplit('.').next().unwrap_or_default();
    let mime_type = mime_from_ext(ext);

    return Ok(DownloadResult {
      data,
      filename,
      mime_type,
    });
  }

  Err(Error::OutputNotFound)
}
