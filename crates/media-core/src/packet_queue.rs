// crates/media-core/src/packet_queue.rs
//
// FIFO of owned packets for one stream (spec.md §3, §4.1). Single-producer
// (reader thread) / single-consumer (decoder thread) once wired into a
// MediaComponent; this type itself just owns the VecDeque and the byte
// accounting, guarded by whatever lock the caller wraps it in.
//
// Sentinel identity: spec.md §9 asks for the flush sentinel to be
// identifiable by pointer equality against a well-known address, the same
// trick the codec library itself uses. We can't (and shouldn't) fake a raw
// pointer in safe Rust, so the "well-known address" here is a single
// process-wide `Arc<()>` — `IsFlushPacket` becomes `Arc::ptr_eq` against it.
// Same identity test, no unsafe.

use std::collections::VecDeque;
use std::sync::{Arc, OnceLock};

use ffmpeg_the_third as ffmpeg;

fn flush_marker() -> &'static Arc<()> {
    static MARKER: OnceLock<Arc<()>> = OnceLock::new();
    MARKER.get_or_init(|| Arc::new(()))
}

enum PacketBody {
    /// A real demuxed packet, possibly zero-size (the "empty" sentinel).
    Data(ffmpeg::Packet),
    /// The flush sentinel. Never holds real packet storage — there is
    /// nothing for `send_packet` to consume, by construction.
    Flush,
}

/// One entry in a PacketQueue: either a demuxed packet or a sentinel.
pub struct Packet {
    stream_index: usize,
    body: PacketBody,
    /// Set only on `Flush` bodies; compared by pointer identity in `is_flush`.
    marker: Option<Arc<()>>,
}

impl Packet {
    pub fn from_demuxed(stream_index: usize, packet: ffmpeg::Packet) -> Self {
        Self { stream_index, body: PacketBody::Data(packet), marker: None }
    }

    /// Zero-size real packet: requests the codec enter drain mode or refresh
    /// attached-picture output (spec.md §3, "Empty/null sentinel").
    pub fn empty(stream_index: usize) -> Self {
        Self {
            stream_index,
            body: PacketBody::Data(ffmpeg::Packet::empty()),
            marker: None,
        }
    }

    /// Flush sentinel: consumed by the decoder to flush codec buffers, never
    /// sent to `send_packet` (spec.md §3, §4.1, §4.3).
    pub fn flush(stream_index: usize) -> Self {
        Self { stream_index, body: PacketBody::Flush, marker: Some(flush_marker().clone()) }
    }

    pub fn is_flush(&self) -> bool {
        match (&self.body, &self.marker) {
            (PacketBody::Flush, Some(m)) => Arc::ptr_eq(m, flush_marker()),
            _ => false,
        }
    }

    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    /// Payload size in bytes; 0 for both sentinel kinds.
    pub fn size(&self) -> usize {
        match &self.body {
            PacketBody::Data(p) => p.size(),
            PacketBody::Flush => 0,
        }
    }

    /// The underlying ffmpeg packet, if this entry carries one. `None` for
    /// the flush sentinel — callers must check `is_flush` first and never
    /// forward a flush packet into `send_packet` (spec.md §4.3).
    pub fn as_ffmpeg(&self) -> Option<&ffmpeg::Packet> {
        match &self.body {
            PacketBody::Data(p) => Some(p),
            PacketBody::Flush => None,
        }
    }
}

/// FIFO of owned packets for one stream (spec.md §4.1).
pub struct PacketQueue {
    items: VecDeque<Packet>,
    buffer_length: usize,
}

impl PacketQueue {
    pub fn new() -> Self {
        Self { items: VecDeque::new(), buffer_length: 0 }
    }

    pub fn push(&mut self, packet: Packet) {
        let size = packet.size();
        self.items.push_back(packet);
        self.buffer_length += size;
    }

    pub fn peek(&self) -> Option<&Packet> {
        self.items.front()
    }

    pub fn dequeue(&mut self) -> Option<Packet> {
        let packet = self.items.pop_front()?;
        self.buffer_length = self.buffer_length.saturating_sub(packet.size());
        Some(packet)
    }

    /// Dequeue-and-release every remaining packet. Dropping each `Packet`
    /// returns its storage to the codec library via ffmpeg's own Drop impl
    /// on `ffmpeg::Packet`; the flush sentinel has no foreign storage to
    /// release at all.
    pub fn clear(&mut self) {
        while self.dequeue().is_some() {}
    }

    pub fn buffer_length(&self) -> usize {
        self.buffer_length
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for PacketQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_identity_is_independent_of_stream_index() {
        let a = Packet::flush(0);
        let b = Packet::flush(1);
        assert!(a.is_flush());
        assert!(b.is_flush());
    }

    #[test]
    fn non_flush_packets_are_not_flush() {
        assert!(!Packet::empty(0).is_flush());
    }

    #[test]
    fn buffer_length_tracks_only_data_packets() {
        let mut q = PacketQueue::new();
        q.push(Packet::flush(0));
        assert_eq!(q.buffer_length(), 0);
        assert_eq!(q.count(), 1);
        q.push(Packet::empty(0));
        assert_eq!(q.buffer_length(), 0);
        assert_eq!(q.count(), 2);
    }

    #[test]
    fn dequeue_is_fifo() {
        let mut q = PacketQueue::new();
        q.push(Packet::flush(0));
        q.push(Packet::empty(0));
        assert!(q.dequeue().unwrap().is_flush());
        assert!(!q.dequeue().unwrap().is_flush());
        assert!(q.dequeue().is_none());
    }

    #[test]
    fn clear_drains_everything() {
        let mut q = PacketQueue::new();
        for _ in 0..5 {
            q.push(Packet::empty(0));
        }
        q.clear();
        assert_eq!(q.count(), 0);
        assert_eq!(q.buffer_length(), 0);
    }
}
