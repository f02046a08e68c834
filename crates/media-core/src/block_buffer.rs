// crates/media-core/src/block_buffer.rs
//
// MediaBlockBuffer: bounded, time-ordered cache of materialized blocks for
// one media type (spec.md §3, §4.6). Single-producer (decoder thread) /
// single-consumer (renderer thread), with the reader thread also allowed to
// probe `index_of` / `get_snap_position` — the caller supplies the lock
// (see pipeline.rs), this type itself just keeps blocks sorted.
//
// Duplicate-timestamp policy: spec.md §9 marks this an open question and
// assumes "replace" pending confirmation against production behavior. We
// implement that assumption; see DESIGN.md for the recorded decision.

use std::collections::VecDeque;

use crate::block::MediaBlock;

pub struct MediaBlockBuffer {
    capacity: usize,
    blocks: VecDeque<MediaBlock>,
}

impl MediaBlockBuffer {
    pub fn new(capacity: usize) -> Self {
        Self { capacity: capacity.max(1), blocks: VecDeque::new() }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.blocks.len() >= self.capacity
    }

    /// Insert `block` in start-time order. If a block with the same
    /// `start_time` already exists, it is replaced in place. If the buffer
    /// is at capacity and no replacement happened, the oldest block is
    /// evicted (dropped) to make room.
    pub fn add(&mut self, block: MediaBlock) -> &MediaBlock {
        let pos = self
            .blocks
            .iter()
            .position(|b| b.start_time >= block.start_time);

        match pos {
            Some(i) if self.blocks[i].start_time == block.start_time => {
                self.blocks[i] = block;
                return &self.blocks[i];
            }
            Some(i) => {
                if self.is_full() {
                    self.blocks.pop_front();
                    let i = i.saturating_sub(1);
                    self.blocks.insert(i, block);
                    return &self.blocks[i];
                }
                self.blocks.insert(i, block);
                return &self.blocks[i];
            }
            None => {
                if self.is_full() {
                    self.blocks.pop_front();
                }
                self.blocks.push_back(block);
                let last = self.blocks.len() - 1;
                return &self.blocks[last];
            }
        }
    }

    /// Index of the block covering time `t`, searching from the most recent
    /// block backward to the first one whose range contains (or precedes) `t`.
    fn covering_index(&self, t: f64) -> Option<usize> {
        let mut candidate = None;
        for (i, block) in self.blocks.iter().enumerate() {
            if block.start_time > t {
                break;
            }
            candidate = Some(i);
        }
        candidate
    }

    /// Start time of the block covering `t`, if any (spec.md §4.6).
    pub fn get_snap_position(&self, t: f64) -> Option<f64> {
        self.covering_index(t).map(|i| self.blocks[i].start_time)
    }

    /// Position of the block covering `t`, or `None` (spec.md's `-1`) if no
    /// block starts at or before `t`.
    pub fn index_of(&self, t: f64) -> Option<usize> {
        self.covering_index(t)
    }

    pub fn block_at(&self, index: usize) -> Option<&MediaBlock> {
        self.blocks.get(index)
    }

    pub fn last(&self) -> Option<&MediaBlock> {
        self.blocks.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffmpeg_the_third as ffmpeg;
    use media_core_types::MediaType;

    fn block(start: f64, end: f64) -> MediaBlock {
        MediaBlock {
            media_type: MediaType::Video,
            start_time: start,
            end_time: end,
            duration: end - start,
            payload: crate::block::BlockPayload::Video(ffmpeg::frame::Video::empty()),
        }
    }

    #[test]
    fn snap_position_never_exceeds_query_time() {
        let mut buf = MediaBlockBuffer::new(8);
        buf.add(block(0.0, 1.0));
        buf.add(block(1.0, 2.0));
        buf.add(block(2.0, 3.0));
        let snapped = buf.get_snap_position(2.5).unwrap();
        assert!(snapped <= 2.5);
        assert_eq!(snapped, 2.0);
    }

    #[test]
    fn eviction_drops_oldest_when_full() {
        let mut buf = MediaBlockBuffer::new(2);
        buf.add(block(0.0, 1.0));
        buf.add(block(1.0, 2.0));
        buf.add(block(2.0, 3.0));
        assert_eq!(buf.len(), 2);
        assert!(buf.get_snap_position(0.5).is_none());
        assert_eq!(buf.get_snap_position(2.5), Some(2.0));
    }

    #[test]
    fn duplicate_timestamp_replaces() {
        let mut buf = MediaBlockBuffer::new(4);
        buf.add(block(0.0, 1.0));
        buf.add(block(0.0, 5.0));
        assert_eq!(buf.len(), 1);
        assert_eq!(buf.block_at(0).unwrap().end_time, 5.0);
    }

    #[test]
    fn index_of_is_none_before_first_block() {
        let mut buf = MediaBlockBuffer::new(4);
        buf.add(block(5.0, 6.0));
        assert!(buf.index_of(1.0).is_none());
        assert_eq!(buf.index_of(5.5), Some(0));
    }
}
