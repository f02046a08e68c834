// crates/media-core/src/media_frame.rs
//
// MediaFrame: short-lived handle to whatever the codec just produced, plus
// its timeline metadata (spec.md §3). Holding the ffmpeg frame itself
// (rather than converting pixels/samples here) keeps color conversion and
// resampling out of this crate — spec.md §1 makes that the renderer's job.

use ffmpeg_the_third as ffmpeg;

use media_core_types::MediaType;

pub enum MediaFrame {
    Audio {
        frame: ffmpeg::frame::Audio,
        pts: i64,
        duration: i64,
    },
    Video {
        frame: ffmpeg::frame::Video,
        pts: i64,
        duration: i64,
    },
    Subtitle {
        frame: ffmpeg::Subtitle,
        start: i64,
        end: i64,
    },
}

impl MediaFrame {
    pub fn media_type(&self) -> MediaType {
        match self {
            MediaFrame::Audio { .. } => MediaType::Audio,
            MediaFrame::Video { .. } => MediaType::Video,
            MediaFrame::Subtitle { .. } => MediaType::Subtitle,
        }
    }

    /// Presentation start time, in the stream's own timebase units.
    pub fn start_pts(&self) -> i64 {
        match self {
            MediaFrame::Audio { pts, .. } => *pts,
            MediaFrame::Video { pts, .. } => *pts,
            MediaFrame::Subtitle { start, .. } => *start,
        }
    }

    pub fn duration_units(&self) -> i64 {
        match self {
            MediaFrame::Audio { duration, .. } => *duration,
            MediaFrame::Video { duration, .. } => *duration,
            MediaFrame::Subtitle { start, end, .. } => (*end - *start).max(0),
        }
    }
}
