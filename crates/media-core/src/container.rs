// crates/media-core/src/container.rs
//
// Thin pin over the demuxer collaborator (spec.md §1, §6): "opens input,
// exposes ReadNextPacket, stream metadata, abort/EOF flags." Format parsing
// itself belongs to ffmpeg's demuxer, not to this crate — Container just
// adds the abort/EOF bookkeeping the pipeline's admission rules need and
// that ffmpeg-the-third's `format::context::Input` doesn't track on its own.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use ffmpeg_the_third as ffmpeg;
use ffmpeg::format::context::Input;

use media_core_types::{MediaCoreError, Result};

pub struct Container {
    input: Input,
    read_aborted: AtomicBool,
    at_end_of_stream: AtomicBool,
    start_time_offset: f64,
    is_live: bool,
}

impl Container {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let is_live = Self::detect_live(path);
        let input = ffmpeg::format::input(&path).map_err(MediaCoreError::from)?;
        let start_time_offset = Self::start_offset_of(&input);
        Ok(Self {
            input,
            read_aborted: AtomicBool::new(false),
            at_end_of_stream: AtomicBool::new(false),
            start_time_offset,
            is_live,
        })
    }

    /// Live-stream heuristic used for the reader loop's cache-bound
    /// exemption (spec.md §4.7 `ShouldReadMorePackets`'s "live stream OR
    /// ..." clause): the URL scheme matches one of the push-style live
    /// protocols (rtp/rtsp/sdp/udp), the same family of sources
    /// `fflags=nobuffer`/`rtsp_transport=tcp` get tuned for when opening a
    /// live source rather than a seekable file.
    fn detect_live(path: &Path) -> bool {
        let Some(url) = path.to_str() else { return false };
        let Some((scheme, _)) = url.split_once("://") else { return false };
        matches!(scheme.to_ascii_lowercase().as_str(), "rtp" | "rtsp" | "sdp" | "udp")
    }

    /// Whether this container was opened against a live source rather than
    /// a seekable file (spec.md §4.7).
    pub fn is_live(&self) -> bool {
        self.is_live
    }

    fn start_offset_of(input: &Input) -> f64 {
        let start = input.start();
        if start == ffmpeg::ffi::AV_NOPTS_VALUE {
            0.0
        } else {
            start as f64 / ffmpeg::ffi::AV_TIME_BASE as f64
        }
    }

    pub fn streams(&self) -> ffmpeg::format::stream::StreamIter<'_> {
        self.input.streams()
    }

    pub fn stream(&self, index: usize) -> Option<ffmpeg::format::stream::Stream<'_>> {
        self.input.stream(index)
    }

    pub fn media_start_time_offset(&self) -> f64 {
        self.start_time_offset
    }

    pub fn is_read_aborted(&self) -> bool {
        self.read_aborted.load(Ordering::Relaxed)
    }

    pub fn is_at_end_of_stream(&self) -> bool {
        self.at_end_of_stream.load(Ordering::Relaxed)
    }

    /// Cooperative cancellation for a blocking `read_next_packet` (spec.md
    /// §5). The reader loop observes this on its next poll; it does not
    /// interrupt an in-flight `ReadNextPacket` call, which the codec
    /// library does not support anyway.
    pub fn signal_abort_reads(&self) {
        self.read_aborted.store(true, Ordering::Relaxed);
    }

    /// Reads the next demuxed packet, or `None` at genuine EOF / after
    /// abort has been signaled (spec.md §4.7 `CanReadMorePackets`).
    pub fn read_next_packet(&mut self) -> Option<(usize, ffmpeg::Packet)> {
        if self.read_aborted.load(Ordering::Relaxed) {
            return None;
        }
        let mut packets = self.input.packets();
        match packets.next() {
            Some(Ok((stream, packet))) => Some((stream.index(), packet)),
            _ => {
                self.at_end_of_stream.store(true, Ordering::Relaxed);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_live_matches_streaming_schemes() {
        assert!(Container::detect_live(Path::new("rtsp://camera.local/stream")));
        assert!(Container::detect_live(Path::new("rtp://239.0.0.1:5004")));
        assert!(Container::detect_live(Path::new("udp://239.0.0.1:1234")));
        assert!(Container::detect_live(Path::new("sdp://cam.sdp")));
    }

    #[test]
    fn detect_live_leaves_plain_files_and_other_protocols_alone() {
        assert!(!Container::detect_live(Path::new("/srv/media/movie.mp4")));
        assert!(!Container::detect_live(Path::new("clip.mkv")));
        assert!(!Container::detect_live(Path::new("https://example.com/video.mp4")));
    }
}
