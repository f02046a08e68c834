// crates/media-core/src/codec_lock.rs
//
// Global codec lock (spec.md §3, §5, §9): the codec library requires every
// `avcodec_open2` to be serialized process-wide, and disposal must not race
// a concurrent open of a different component. Nothing else belongs in this
// lock — it guards exactly `open` and `dispose`, never decode.

use std::sync::{Mutex, MutexGuard, OnceLock};

pub struct CodecLock(Mutex<()>);

impl CodecLock {
    pub fn global() -> &'static CodecLock {
        static LOCK: OnceLock<CodecLock> = OnceLock::new();
        LOCK.get_or_init(|| CodecLock(Mutex::new(())))
    }

    pub fn acquire(&self) -> MutexGuard<'_, ()> {
        self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
