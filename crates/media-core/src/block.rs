// crates/media-core/src/block.rs
//
// MediaBlock: a materialized, renderer-ready frame with timeline metadata
// (spec.md §3, §4.6). "Materialized" means timestamped and owned by a
// MediaBlockBuffer — not pixel-converted or resampled, which spec.md §1
// reserves for the renderer.

use ffmpeg_the_third as ffmpeg;

use media_core_types::MediaType;

use crate::foreign::ForeignRegistry;
use crate::media_frame::MediaFrame;

pub enum BlockPayload {
    Video(ffmpeg::frame::Video),
    Audio(ffmpeg::frame::Audio),
    Subtitle(ffmpeg::Subtitle),
}

pub struct MediaBlock {
    pub media_type: MediaType,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub payload: BlockPayload,
}

impl MediaBlock {
    /// The component-specific materializer hook (spec.md §6
    /// `MaterializeFrame`): converts a decoded MediaFrame plus its
    /// timebase into a timestamped, buffer-owned MediaBlock.
    pub fn materialize(frame: MediaFrame, time_base: ffmpeg::Rational) -> Self {
        let tb = time_base.numerator() as f64 / time_base.denominator() as f64;
        // The frame handle itself (stream_index/pts bookkeeping) is
        // consumed here; its foreign payload lives on inside the block
        // until the buffer evicts it. Balances the `frame_allocated` count
        // taken out in `ComponentDecoder::receive_frame`/`decode_subtitle`.
        ForeignRegistry::global().frame_released();
        match frame {
            MediaFrame::Video { frame, pts, duration } => {
                let start = pts as f64 * tb;
                let dur = duration as f64 * tb;
                MediaBlock {
                    media_type: MediaType::Video,
                    start_time: start,
                    end_time: start + dur,
                    duration: dur,
                    payload: BlockPayload::Video(frame),
                }
            }
            MediaFrame::Audio { frame, pts, duration } => {
                let start = pts as f64 * tb;
                let dur = duration as f64 * tb;
                MediaBlock {
                    media_type: MediaType::Audio,
                    start_time: start,
                    end_time: start + dur,
                    duration: dur,
                    payload: BlockPayload::Audio(frame),
                }
            }
            MediaFrame::Subtitle { frame, start, end } => {
                let start_time = start as f64 * tb;
                let end_time = end as f64 * tb;
                MediaBlock {
                    media_type: MediaType::Subtitle,
                    start_time,
                    end_time,
                    duration: (end_time - start_time).max(0.0),
                    payload: BlockPayload::Subtitle(frame),
                }
            }
        }
    }

    /// Whether `t` falls within `[start_time, end_time)`.
    pub fn covers(&self, t: f64) -> bool {
        t >= self.start_time && t < self.end_time.max(self.start_time + f64::EPSILON)
    }
}
