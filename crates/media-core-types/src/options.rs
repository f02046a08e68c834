// crates/media-core-types/src/options.rs
//
// MediaOptions: everything the engine hands the core at component-init
// time (spec.md §6). Plain data — no ffmpeg, no file/env loading. Reading
// it from disk or a CLI is the engine's job, out of scope for this crate
// per spec.md §1.

use std::collections::HashMap;

use crate::media_type::MediaType;

/// Mirrors the codec library's `lowres` knob: how many times to halve the
/// decoded frame dimensions. `Full` disables the feature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LowResolutionIndex {
    Full,
    Half,
    Quarter,
    Eighth,
}

impl LowResolutionIndex {
    /// The raw `lowres` integer the codec context expects.
    pub fn as_index(self) -> i32 {
        match self {
            LowResolutionIndex::Full => 0,
            LowResolutionIndex::Half => 1,
            LowResolutionIndex::Quarter => 2,
            LowResolutionIndex::Eighth => 3,
        }
    }

    pub fn is_full(self) -> bool {
        matches!(self, LowResolutionIndex::Full)
    }
}

/// Per-stream decoder tuning, applied in MediaComponent::open (spec.md §4.2 step 5b-c).
#[derive(Clone, Debug)]
pub struct DecoderParams {
    pub enable_fast_decoding: bool,
    pub enable_low_delay_decoding: bool,
    pub low_resolution_index: LowResolutionIndex,
    pub ref_counted_frames: bool,
}

impl Default for DecoderParams {
    fn default() -> Self {
        Self {
            enable_fast_decoding: false,
            enable_low_delay_decoding: false,
            low_resolution_index: LowResolutionIndex::Full,
            ref_counted_frames: true,
        }
    }
}

/// Default block-buffer capacities per media type (spec.md §9 Open Question 1 —
/// the source's `Constants.MaxBlocks` table isn't given; these are our call,
/// recorded in DESIGN.md).
pub fn default_max_blocks() -> HashMap<MediaType, usize> {
    let mut m = HashMap::new();
    m.insert(MediaType::Video, 4);
    m.insert(MediaType::Audio, 64);
    m.insert(MediaType::Subtitle, 32);
    m
}

/// Configuration consumed by MediaComponent init and the pipeline's
/// admission rules. Constructed by the engine; never mutated by this crate.
#[derive(Clone, Debug)]
pub struct MediaOptions {
    /// 0.0 disables. Stamps the video stream's frame rate and packet
    /// timebase (spec.md §4.2 step 3).
    pub video_forced_fps: f64,
    /// streamIndex -> forced decoder name (spec.md §4.2 step 4).
    pub decoder_codec: HashMap<usize, String>,
    pub decoder_params: DecoderParams,
    /// Raw codec options per stream index, e.g. `threads=4`.
    pub stream_codec_options: HashMap<usize, Vec<(String, String)>>,
    /// Device string for the hardware shim; None disables hw-accel attach.
    pub video_hardware_device: Option<String>,
    pub subtitles_url: Option<String>,
    pub subtitles_delay: f64,
    pub is_subtitle_disabled: bool,
    /// Soft bound, in bytes, on aggregated PacketQueue buffer length before
    /// the reader loop pauses (spec.md §4.7 ShouldReadMorePackets).
    pub download_cache_length: u64,
    /// Block-buffer capacity K[media_type] (spec.md §4.6 / §9).
    pub max_blocks: HashMap<MediaType, usize>,
}

impl MediaOptions {
    pub fn stream_codec_options(&self, stream_index: usize) -> &[(String, String)] {
        self.stream_codec_options
            .get(&stream_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn forced_codec_name(&self, stream_index: usize) -> Option<&str> {
        self.decoder_codec.get(&stream_index).map(String::as_str).filter(|s| !s.is_empty())
    }

    pub fn max_blocks_for(&self, media_type: MediaType) -> usize {
        self.max_blocks.get(&media_type).copied().unwrap_or(16)
    }
}

impl Default for MediaOptions {
    fn default() -> Self {
        Self {
            video_forced_fps: 0.0,
            decoder_codec: HashMap::new(),
            decoder_params: DecoderParams::default(),
            stream_codec_options: HashMap::new(),
            video_hardware_device: None,
            subtitles_url: None,
            subtitles_delay: 0.0,
            is_subtitle_disabled: false,
            // 16 MiB — generous soft cache bound for a typical download/network source.
            download_cache_length: 16 * 1024 * 1024,
            max_blocks: default_max_blocks(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_resolution_index_clamps_to_codec_max() {
        assert_eq!(LowResolutionIndex::Full.as_index(), 0);
        assert!(LowResolutionIndex::Full.is_full());
        assert_eq!(LowResolutionIndex::Eighth.as_index(), 3);
        assert!(!LowResolutionIndex::Half.is_full());
    }

    #[test]
    fn default_max_blocks_covers_every_media_type() {
        let m = default_max_blocks();
        assert_eq!(m.get(&MediaType::Video), Some(&4));
        assert_eq!(m.get(&MediaType::Audio), Some(&64));
        assert_eq!(m.get(&MediaType::Subtitle), Some(&32));
    }

    #[test]
    fn forced_codec_name_ignores_blank_entries() {
        let mut options = MediaOptions::default();
        options.decoder_codec.insert(0, String::new());
        options.decoder_codec.insert(1, "h264_cuvid".to_string());
        assert_eq!(options.forced_codec_name(0), None);
        assert_eq!(options.forced_codec_name(1), Some("h264_cuvid"));
        assert_eq!(options.forced_codec_name(2), None);
    }

    #[test]
    fn stream_codec_options_defaults_to_empty_slice() {
        let options = MediaOptions::default();
        assert!(options.stream_codec_options(0).is_empty());
    }

    #[test]
    fn max_blocks_for_falls_back_when_unconfigured() {
        let mut options = MediaOptions::default();
        options.max_blocks.clear();
        assert_eq!(options.max_blocks_for(MediaType::Video), 16);
    }
}
