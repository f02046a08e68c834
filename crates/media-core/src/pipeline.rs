// crates/media-core/src/pipeline.rs
//
// Pipeline: the three cooperating loops spec.md §4.7 describes — packet
// reader, frame decoder, block-rendering timer — wired together with
// CycleEvents instead of per-item signaling, and torn down in the exact
// order spec.md §5 gives for StopWorkers. Mirrors the teacher's own
// thread-per-stage layout (`worker.rs`'s scrub/playback threads) but with
// the stages coupled by cycle events rather than `crossbeam_channel`,
// since the spec's pump is pull-based on both ends.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use media_core_types::{MediaOptions, MediaType};

use crate::block::MediaBlock;
use crate::block_buffer::MediaBlockBuffer;
use crate::component_set::ComponentSet;
use crate::container::Container;
use crate::cycle_event::CycleEvent;
use crate::observer::PipelineObserver;

/// Playback clock the renderer loop paces itself against (spec.md §6's
/// implied `Clock` collaborator). Implemented by the embedding engine.
pub trait Clock: Send + Sync {
    fn now(&self) -> f64;
    fn pause(&self);
    fn resume(&self);
    fn reset(&self);
}

/// Sink for materialized blocks (spec.md §6's implied `Renderer`
/// collaborator). One call per media type per pipeline; `close` must be
/// safe to call even if no block was ever pushed.
pub trait Renderer: Send + Sync {
    fn push(&self, media_type: MediaType, block: &MediaBlock);
    fn close(&self, media_type: MediaType);

    /// Video-block renders additionally update the engine's SMPTE timecode
    /// and hardware-decoder name; everything else leaves engine state
    /// alone, so this defaults to a no-op.
    fn on_video_timecode(&self, _timecode: &str, _hardware_name: Option<&str>) {}
}

const RENDER_TICK: Duration = Duration::from_millis(10);

/// How far past the clock's current time the decoder loop keeps the main
/// component's block buffer filled before moving on (spec.md §4.7's "enough
/// blocks to cover the current clock plus a lookahead window"). Chosen to
/// comfortably outrun one renderer tick's worth of jitter without decoding
/// the whole buffer ahead of playback every cycle.
const DECODE_LOOKAHEAD_SECONDS: f64 = 2.0;

struct LoopHandles {
    reader: Option<JoinHandle<()>>,
    decoder: Option<JoinHandle<()>>,
    renderer: Option<JoinHandle<()>>,
}

pub struct Pipeline {
    container: Arc<Mutex<Container>>,
    components: Arc<ComponentSet>,
    options: MediaOptions,
    observer: Arc<dyn PipelineObserver>,
    clock: Arc<dyn Clock>,
    renderer: Arc<dyn Renderer>,

    buffers: Arc<Mutex<std::collections::HashMap<MediaType, MediaBlockBuffer>>>,

    shutdown: Arc<AtomicBool>,
    reader_cycle: Arc<CycleEvent>,
    decoder_cycle: Arc<CycleEvent>,
    renderer_running: Arc<AtomicBool>,

    handles: Mutex<LoopHandles>,
}

impl Pipeline {
    pub fn new(
        container: Container,
        components: ComponentSet,
        options: MediaOptions,
        observer: Arc<dyn PipelineObserver>,
        clock: Arc<dyn Clock>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        let mut buffers = std::collections::HashMap::new();
        components.for_each(|c| {
            buffers.insert(c.media_type(), MediaBlockBuffer::new(options.max_blocks_for(c.media_type())));
        });

        Self {
            container: Arc::new(Mutex::new(container)),
            components: Arc::new(components),
            options,
            observer,
            clock,
            renderer,
            buffers: Arc::new(Mutex::new(buffers)),
            shutdown: Arc::new(AtomicBool::new(false)),
            reader_cycle: Arc::new(CycleEvent::new()),
            decoder_cycle: Arc::new(CycleEvent::new()),
            renderer_running: Arc::new(AtomicBool::new(false)),
            handles: Mutex::new(LoopHandles { reader: None, decoder: None, renderer: None }),
        }
    }

    /// Spawns the reader, decoder, and renderer loops. Idempotent: calling
    /// twice without an intervening `stop_workers` is a no-op.
    pub fn start_workers(self: &Arc<Self>) {
        let mut handles = self.handles.lock().unwrap();
        if handles.reader.is_some() {
            return;
        }
        self.shutdown.store(false, Ordering::Relaxed);
        self.renderer_running.store(true, Ordering::Relaxed);

        let reader_pipeline = Arc::clone(self);
        handles.reader = Some(thread::spawn(move || reader_pipeline.run_reader_loop()));

        let decoder_pipeline = Arc::clone(self);
        handles.decoder = Some(thread::spawn(move || decoder_pipeline.run_decoder_loop()));

        let renderer_pipeline = Arc::clone(self);
        handles.renderer = Some(thread::spawn(move || renderer_pipeline.run_renderer_loop()));

        self.clock.resume();
    }

    /// Teardown order from spec.md §5: pause the clock, flag shutdown,
    /// abort the demuxer read, stop the renderer timer (awaiting the
    /// in-flight tick), close renderers, join reader then decoder, clear
    /// renderer state, reset the clock. The renderer thread must be joined
    /// before `Renderer::close` is called for any media type — otherwise a
    /// tick already in flight on the renderer thread can call
    /// `Renderer::push` for a media type this function just closed.
    pub fn stop_workers(&self) {
        self.clock.pause();
        self.shutdown.store(true, Ordering::Relaxed);
        self.container.lock().unwrap().signal_abort_reads();
        self.renderer_running.store(false, Ordering::Relaxed);

        let mut handles = self.handles.lock().unwrap();
        if let Some(h) = handles.renderer.take() {
            let _ = h.join();
        }

        for media_type in [MediaType::Video, MediaType::Audio, MediaType::Subtitle] {
            if self.components.has(media_type) {
                self.renderer.close(media_type);
            }
        }

        if let Some(h) = handles.reader.take() {
            let _ = h.join();
        }
        if let Some(h) = handles.decoder.take() {
            let _ = h.join();
        }
        drop(handles);

        self.buffers.lock().unwrap().clear();
        self.clock.reset();
        self.components.dispose_all();
    }

    fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// `CanReadMorePackets`: neither shut down nor at container EOF.
    fn can_read_more_packets(&self) -> bool {
        if self.is_shutting_down() {
            return false;
        }
        let container = self.container.lock().unwrap();
        !container.is_at_end_of_stream() && !container.is_read_aborted()
    }

    /// `ShouldReadMorePackets`: live sources read without regard to the
    /// cache bound (there's no catalog to pace against — falling behind
    /// just drops data), everything else is gated on the soft cache bound
    /// (spec.md §4.7).
    fn should_read_more_packets(&self) -> bool {
        self.container.lock().unwrap().is_live()
            || (self.components.packet_buffer_length() as u64) < self.options.download_cache_length
    }

    fn run_reader_loop(&self) {
        loop {
            if !self.can_read_more_packets() {
                self.reader_cycle.complete();
                break;
            }
            if !self.should_read_more_packets() {
                thread::sleep(RENDER_TICK);
                continue;
            }

            self.reader_cycle.begin();
            let next = self.container.lock().unwrap().read_next_packet();
            match next {
                Some((stream_index, packet)) => {
                    self.components.route_packet(stream_index, Some(packet));
                }
                None => {
                    // Genuine EOF: stamp every component with the empty
                    // sentinel so its decoder drains any buffered frames.
                    self.components.for_each(|c| c.send_empty_packet());
                }
            }
            self.reader_cycle.complete();
            self.decoder_cycle.complete();

            if !self.can_read_more_packets() {
                break;
            }
        }
    }

    /// `CanReadMoreFramesOf`: a component can still be pumped as long as it
    /// carries queued packets or the codec has some buffered internally.
    fn can_read_more_frames_of(&self, media_type: MediaType) -> bool {
        self.components
            .get(media_type)
            .map(|c| c.packet_buffer_count() > 0 || c.has_codec_packets())
            .unwrap_or(false)
    }

    /// Whether the main component's buffer already covers the clock's
    /// current position plus the lookahead window, i.e. there's no point
    /// decoding further for this type before the next cycle (spec.md §4.7).
    /// `false` (keep decoding) when there's no main component yet, or its
    /// buffer is empty — the gate only throttles a buffer that's already
    /// ahead, it never blocks filling one from scratch.
    fn main_has_enough_lookahead(&self) -> bool {
        let Some(main) = self.components.main() else { return false };
        let buffers = self.buffers.lock().unwrap();
        let Some(buffer) = buffers.get(&main.media_type()) else { return false };
        let Some(last) = buffer.last() else { return false };
        last.start_time >= self.clock.now() + DECODE_LOOKAHEAD_SECONDS
    }

    fn run_decoder_loop(&self) {
        loop {
            if self.is_shutting_down() {
                self.decoder_cycle.complete();
                break;
            }

            self.decoder_cycle.begin();
            let mut produced_any = false;
            for media_type in [MediaType::Video, MediaType::Audio, MediaType::Subtitle] {
                if !self.components.has(media_type) {
                    continue;
                }
                loop {
                    if self.main_has_enough_lookahead() {
                        break;
                    }
                    let mut buffers = self.buffers.lock().unwrap();
                    let Some(buffer) = buffers.get_mut(&media_type) else { break };
                    let added = self.components.add_next_block(media_type, buffer, self.observer.as_ref());
                    drop(buffers);
                    if !added {
                        break;
                    }
                    produced_any = true;
                }
            }
            self.decoder_cycle.complete();

            if !produced_any {
                if !self.reader_cycle.wait_timeout(RENDER_TICK) && self.is_shutting_down() {
                    break;
                }
                if self.is_shutting_down() && !self.any_component_has_work() {
                    break;
                }
            }
        }
    }

    fn any_component_has_work(&self) -> bool {
        [MediaType::Video, MediaType::Audio, MediaType::Subtitle]
            .into_iter()
            .any(|mt| self.can_read_more_frames_of(mt))
    }

    /// Timer-paced render loop: at each tick, for every component whose
    /// buffer has a block covering the clock's current time, push it to the
    /// renderer if it hasn't been pushed yet (spec.md §4.7's
    /// `LastRenderTime[t]` bookkeeping keeps this idempotent per block).
    fn run_renderer_loop(&self) {
        let mut last_rendered: std::collections::HashMap<MediaType, f64> = std::collections::HashMap::new();
        while self.renderer_running.load(Ordering::Relaxed) {
            let now = self.clock.now();
            let mut buffers = self.buffers.lock().unwrap();
            for (media_type, buffer) in buffers.iter_mut() {
                let Some(index) = buffer.index_of(now) else { continue };
                let Some(block) = buffer.block_at(index) else { continue };
                let already = last_rendered.get(media_type).copied();
                if already != Some(block.start_time) {
                    self.renderer.push(*media_type, block);
                    if *media_type == MediaType::Video {
                        let fps = self
                            .components
                            .get(MediaType::Video)
                            .and_then(|c| c.forced_frame_rate())
                            .map(|r| r.numerator() as f64 / r.denominator() as f64)
                            .unwrap_or(30.0);
                        let timecode = media_core_types::helpers::time::smpte_timecode(now, fps);
                        let hw_name = self
                            .components
                            .get(MediaType::Video)
                            .and_then(|c| c.hardware_info())
                            .map(|info| info.name.as_str());
                        self.renderer.on_video_timecode(&timecode, hw_name);
                    }
                    last_rendered.insert(*media_type, block.start_time);
                }
            }
            drop(buffers);
            thread::sleep(RENDER_TICK);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU64;

    struct TestClock {
        micros: AtomicU64,
        paused: AtomicBool,
    }

    impl Clock for TestClock {
        fn now(&self) -> f64 {
            self.micros.load(Ordering::Relaxed) as f64 / 1_000_000.0
        }
        fn pause(&self) {
            self.paused.store(true, Ordering::Relaxed);
        }
        fn resume(&self) {
            self.paused.store(false, Ordering::Relaxed);
        }
        fn reset(&self) {
            self.micros.store(0, Ordering::Relaxed);
        }
    }

    struct NullRenderer;
    impl Renderer for NullRenderer {
        fn push(&self, _media_type: MediaType, _block: &MediaBlock) {}
        fn close(&self, _media_type: MediaType) {}
    }

    #[test]
    fn clock_reset_zeroes_time() {
        let clock = TestClock { micros: AtomicU64::new(5_000_000), paused: AtomicBool::new(false) };
        assert_eq!(clock.now(), 5.0);
        clock.reset();
        assert_eq!(clock.now(), 0.0);
    }

    #[test]
    fn null_renderer_accepts_any_media_type() {
        let r = NullRenderer;
        r.close(MediaType::Audio);
        r.close(MediaType::Video);
        r.close(MediaType::Subtitle);
    }
}
