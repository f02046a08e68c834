// crates/media-core/src/foreign.rs
//
// Debug-only leak-detection registry for foreign (codec-library-owned)
// allocations: codec contexts and decoded-frame scratch buffers. Preserved
// per spec.md §9's guidance — "the reference-counter registry used by the
// source for leak detection should be preserved as a debug-only facility" —
// and used by the S6 shutdown-race test (spec.md §8) to assert zero live
// codec resources after `Pipeline::stop_workers`.
//
// Compiled to plain counters under `debug_assertions`; every method is a
// no-op in release builds so this never costs anything in production.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::OnceLock;

#[derive(Default)]
pub struct ForeignRegistry {
    codec_contexts: AtomicI64,
    frames: AtomicI64,
}

impl ForeignRegistry {
    pub fn global() -> &'static ForeignRegistry {
        static REGISTRY: OnceLock<ForeignRegistry> = OnceLock::new();
        REGISTRY.get_or_init(ForeignRegistry::default)
    }

    pub fn codec_context_opened(&self) {
        if cfg!(debug_assertions) {
            self.codec_contexts.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn codec_context_closed(&self) {
        if cfg!(debug_assertions) {
            self.codec_contexts.fetch_sub(1, Ordering::Relaxed);
        }
    }

    pub fn frame_allocated(&self) {
        if cfg!(debug_assertions) {
            self.frames.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn frame_released(&self) {
        if cfg!(debug_assertions) {
            self.frames.fetch_sub(1, Ordering::Relaxed);
        }
    }

    pub fn live_codec_contexts(&self) -> i64 {
        self.codec_contexts.load(Ordering::Relaxed)
    }

    pub fn live_frames(&self) -> i64 {
        self.frames.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_open_close_nets_to_zero() {
        let r = ForeignRegistry::default();
        r.codec_context_opened();
        r.codec_context_opened();
        r.codec_context_closed();
        r.codec_context_closed();
        assert_eq!(r.live_codec_contexts(), 0);
    }
}
