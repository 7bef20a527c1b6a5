use std::cmp::Reverse;

use itertools::Itertools;

use crate::media::{AudioOption, StreamFormat};

// audio streams occasionally come back without a container extension.
const DEFAULT_AUDIO_EXT: &str = "m4a";

// distinct heights of streams that actually carry video, best first.
// the extractor marks audio-only streams with the literal vcodec "none";
// an absent vcodec field still counts as video.
pub fn available_resolutions(formats: &[StreamFormat]) -> Vec<u32> {
  formats
    .iter()
    .filter(|f| f.vcodec.as_deref() != Some("none"))
    .filter_map(|f| f.height)
    .sorted_by_key(|h| Reverse(*h))
    .dedup()
    .collect()
}

// distinct (extension, bitrate) pairs of the audio-only streams, highest
// bitrate first with unknown bitrates last. order among equal bitrates is
// unspecified.
pub fn available_audio_options(formats: &[StreamFormat]) -> Vec<AudioOption> {
  formats
    .iter()
    .filter(|f| f.vcodec.as_deref() == Some("none"))
    .filter(|f| matches!(f.acodec.as_deref(), Some(c) if c != "none"))
    .map(|f| AudioOption {
      ext: f
        .ext
        .clone()
        .unwrap_or_else(|| DEFAULT_AUDIO_EXT.to_string()),
      bitrate: f.abr.filter(|b| *b > 0.0).map(|b| b as u32),
    })
    .unique()
    .sorted_by_key(|o| Reverse(o.bitrate.unwrap_or(0)))
    .collect()
}
