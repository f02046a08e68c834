// crates/media-core/src/component_set.rs
//
// ComponentSet: the opened MediaComponents for one container, keyed by
// media type (spec.md §3, §4.5). At most one component per MediaType —
// the source stream selection (best video/audio/subtitle track) is the
// engine's job; this just holds whatever MediaComponent::open already
// picked for each stream index handed to it.

use std::collections::HashMap;

use ffmpeg_the_third as ffmpeg;

use media_core_types::{MediaCoreError, MediaOptions, MediaType, Result};

use crate::block::MediaBlock;
use crate::block_buffer::MediaBlockBuffer;
use crate::component::MediaComponent;
use crate::container::Container;
use crate::hw_accel::HardwareAccelerator;
use crate::observer::PipelineObserver;

pub struct ComponentSet {
    by_type: HashMap<MediaType, MediaComponent>,
    index_to_type: HashMap<usize, MediaType>,
}

impl ComponentSet {
    /// Opens one component per entry in `stream_indices`, skipping streams
    /// whose media type is already represented (first one wins, matching
    /// the codec library's own "first matching stream" selection order).
    pub fn open(
        container: &Container,
        stream_indices: impl IntoIterator<Item = usize>,
        options: &MediaOptions,
        hw_accel: Option<&dyn HardwareAccelerator>,
    ) -> Result<Self> {
        let mut by_type = HashMap::new();
        let mut index_to_type = HashMap::new();

        for stream_index in stream_indices {
            if options.is_subtitle_disabled {
                if let Some(stream) = container.stream(stream_index) {
                    if stream.parameters().medium() == ffmpeg::media::Type::Subtitle {
                        continue;
                    }
                }
            }

            let component = MediaComponent::open(container, stream_index, options, hw_accel)?;
            let media_type = component.media_type();
            if by_type.contains_key(&media_type) {
                continue;
            }
            index_to_type.insert(stream_index, media_type);
            by_type.insert(media_type, component);
        }

        if by_type.is_empty() {
            return Err(MediaCoreError::ContainerError(
                "no decodable streams selected for this container".into(),
            ));
        }

        Ok(Self { by_type, index_to_type })
    }

    pub fn get(&self, media_type: MediaType) -> Option<&MediaComponent> {
        self.by_type.get(&media_type)
    }

    pub fn by_stream_index(&self, stream_index: usize) -> Option<&MediaComponent> {
        let media_type = self.index_to_type.get(&stream_index)?;
        self.by_type.get(media_type)
    }

    pub fn has(&self, media_type: MediaType) -> bool {
        self.by_type.contains_key(&media_type)
    }

    pub fn for_each(&self, mut f: impl FnMut(&MediaComponent)) {
        for component in self.by_type.values() {
            f(component);
        }
    }

    /// Video if present, else audio — the component whose clock the
    /// pipeline's renderer loop paces itself against (spec.md §4.7).
    pub fn main(&self) -> Option<&MediaComponent> {
        self.by_type
            .get(&MediaType::Video)
            .or_else(|| self.by_type.get(&MediaType::Audio))
    }

    /// Sum of packet-queue buffer lengths across every component, the
    /// quantity `ShouldReadMorePackets` compares against
    /// `MediaOptions::download_cache_length` (spec.md §4.7).
    pub fn packet_buffer_length(&self) -> usize {
        self.by_type.values().map(MediaComponent::packet_buffer_length).sum()
    }

    pub fn packet_buffer_count(&self) -> usize {
        self.by_type.values().map(MediaComponent::packet_buffer_count).sum()
    }

    /// Dispatches `send_packet` to whichever component owns `stream_index`,
    /// dropping the packet silently if no component claimed that stream
    /// (spec.md §4.7's reader loop: unselected streams are discarded).
    pub fn route_packet(&self, stream_index: usize, packet: Option<ffmpeg::Packet>) {
        if let Some(component) = self.by_stream_index(stream_index) {
            component.send_packet(packet);
        }
    }

    pub fn dispose_all(&self) {
        self.for_each(|c| c.dispose());
    }

    /// `AddNextBlock(t)` (spec.md §4.7): pulls at most one decoded frame for
    /// `media_type`, materializes it into `buffer`, and reports whether a
    /// block was actually added. Refuses to pull anything once `buffer` is
    /// already saturated, so callers can loop `while add_next_block(...)` and
    /// stop exactly where the spec says to — "while `AddNextBlock(t)`
    /// returned a block and the block buffer for `t` is not saturated" —
    /// instead of draining a component's whole ready queue in one shot and
    /// overflowing the buffer's eviction policy.
    ///
    /// Dispatches `observer` synchronously, same as before (spec.md §6 open
    /// question: `OnFrameDecoded`/`OnSubtitleDecoded` fire on the decoder
    /// thread, so `observer` must not block).
    pub fn add_next_block(
        &self,
        media_type: MediaType,
        buffer: &mut MediaBlockBuffer,
        observer: &dyn PipelineObserver,
    ) -> bool {
        if buffer.is_full() {
            return false;
        }
        let Some(component) = self.by_type.get(&media_type) else { return false };
        let Some(frame) = component.receive_next_frame() else { return false };
        if media_type == MediaType::Subtitle {
            observer.on_subtitle_decoded(&frame);
        } else {
            observer.on_frame_decoded(&frame, media_type);
        }
        buffer.add(MediaBlock::materialize(frame, component.time_base()));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn main_prefers_video_over_audio() {
        // Pure routing logic only — opening real components needs a
        // container backed by an actual media file, exercised in the
        // integration harness instead.
        let set = ComponentSet { by_type: HashMap::new(), index_to_type: HashMap::new() };
        assert!(set.main().is_none());
    }
}
