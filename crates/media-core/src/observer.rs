// crates/media-core/src/observer.rs
//
// Engine callbacks (spec.md §6): `OnFrameDecoded(framePtr, mediaType)` and
// `OnSubtitleDecoded(framePtr)`. Per spec.md §9's open question, these fire
// synchronously on the decoder thread — implementations must not block.

use media_core_types::MediaType;

use crate::media_frame::MediaFrame;

pub trait PipelineObserver: Send + Sync {
    fn on_frame_decoded(&self, frame: &MediaFrame, media_type: MediaType) {
        let _ = (frame, media_type);
    }

    fn on_subtitle_decoded(&self, frame: &MediaFrame) {
        let _ = frame;
    }
}

/// No-op observer used when the embedding engine doesn't need the hooks.
pub struct NullObserver;

impl PipelineObserver for NullObserver {}
