// crates/media-core/src/component.rs
//
// MediaComponent (spec.md §3, §4.2, §4.3, §4.4): owns one codec context and
// drives packet -> frame for one stream. Audio/Video share the send-packet /
// receive-frame pump; Subtitle uses the older decode_subtitle2 contract.
//
// Design-notes §9 calls for "a sum-type of component variants {Audio,
// Video, Subtitle} and a small trait/interface containing the two hooks;
// dispatch via tag, not inheritance" in place of the source's abstract
// base class. `ComponentDecoder` below is that sum type; its methods are
// the dispatch points instead of virtual calls.

use std::ffi::CString;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use ffmpeg_the_third as ffmpeg;
use ffmpeg::ffi as avffi;
use ffmpeg::media::Type as AvMediaType;

use media_core_types::{MediaCoreError, MediaOptions, MediaType, Result};

use crate::codec_lock::CodecLock;
use crate::container::Container;
use crate::foreign::ForeignRegistry;
use crate::hw_accel::{HardwareAccelInfo, HardwareAccelerator};
use crate::media_frame::MediaFrame;
use crate::packet_queue::{Packet, PacketQueue};
use crate::rational::d2q;

/// Owns an opened `AVCodecContext*`. We open it ourselves via raw
/// `avcodec_open2` (see `open_codec` below) rather than the safe
/// `Context::decoder()...video()` convenience, so this type also owns
/// teardown — wrapping the safe decoder types here would mean opening the
/// context a second time just to get a typed handle back.
struct RawCodecContext(*mut avffi::AVCodecContext);

// Access is always serialized through `MediaComponent::decoder`'s Mutex.
unsafe impl Send for RawCodecContext {}

impl Drop for RawCodecContext {
    fn drop(&mut self) {
        unsafe { avffi::avcodec_free_context(&mut self.0) };
    }
}

/// The codec-library side of a component: one opened codec context,
/// dispatched by media type instead of through an abstract base class.
enum ComponentDecoder {
    Video(RawCodecContext),
    Audio(RawCodecContext),
    Subtitle(RawCodecContext),
}

impl ComponentDecoder {
    fn ptr(&self) -> *mut avffi::AVCodecContext {
        match self {
            ComponentDecoder::Video(c) | ComponentDecoder::Audio(c) | ComponentDecoder::Subtitle(c) => c.0,
        }
    }

    fn send_packet(&mut self, packet: &ffmpeg::Packet) -> std::result::Result<(), ffmpeg::Error> {
        let rc = unsafe { avffi::avcodec_send_packet(self.ptr(), packet.as_ptr()) };
        if rc == 0 {
            Ok(())
        } else {
            Err(ffmpeg::Error::from(rc))
        }
    }

    fn flush(&mut self) {
        unsafe { avffi::avcodec_flush_buffers(self.ptr()) };
    }

    /// Pulls one decoded AV frame. Never called for `Subtitle` — that side
    /// uses `decode_subtitle` below. `time_base`/`frame_rate` come from the
    /// owning `MediaComponent` and are used only to stamp the frame's
    /// duration in timebase units (spec.md §3's `MediaFrame`/`MediaBlock`
    /// duration, block.rs's materializer converts it back to seconds).
    fn receive_frame(
        &mut self,
        time_base: ffmpeg::Rational,
        frame_rate: Option<ffmpeg::Rational>,
    ) -> std::result::Result<MediaFrame, ffmpeg::Error> {
        match self {
            ComponentDecoder::Video(c) => {
                let mut frame = ffmpeg::frame::Video::empty();
                let rc = unsafe { avffi::avcodec_receive_frame(c.0, frame.as_mut_ptr()) };
                if rc != 0 {
                    return Err(ffmpeg::Error::from(rc));
                }
                let pts = frame.pts().unwrap_or(0);
                let duration = video_frame_duration_units(time_base, frame_rate);
                ForeignRegistry::global().frame_allocated();
                Ok(MediaFrame::Video { frame, pts, duration })
            }
            ComponentDecoder::Audio(c) => {
                let mut frame = ffmpeg::frame::Audio::empty();
                let rc = unsafe { avffi::avcodec_receive_frame(c.0, frame.as_mut_ptr()) };
                if rc != 0 {
                    return Err(ffmpeg::Error::from(rc));
                }
                let pts = frame.pts().unwrap_or(0);
                let duration = audio_frame_duration_units(time_base, frame.samples() as i64, frame.rate() as i64);
                ForeignRegistry::global().frame_allocated();
                Ok(MediaFrame::Audio { frame, pts, duration })
            }
            ComponentDecoder::Subtitle(_) => unreachable!("subtitle uses decode(), not receive_frame"),
        }
    }

    /// The subtitle pump's `decode_subtitle2` contract (spec.md §4.4).
    fn decode_subtitle(&mut self, packet: &ffmpeg::Packet) -> std::result::Result<Option<MediaFrame>, ffmpeg::Error> {
        match self {
            ComponentDecoder::Subtitle(c) => {
                let mut subtitle = ffmpeg::Subtitle::new();
                let mut got: i32 = 0;
                let rc = unsafe {
                    avffi::avcodec_decode_subtitle2(c.0, subtitle.as_mut_ptr(), &mut got, packet.as_ptr() as *mut _)
                };
                if rc < 0 {
                    return Err(ffmpeg::Error::from(rc));
                }
                if got == 0 {
                    return Ok(None);
                }
                let start = packet.pts().unwrap_or(0) + subtitle.start() as i64;
                let end = start + subtitle.end().saturating_sub(subtitle.start()) as i64;
                ForeignRegistry::global().frame_allocated();
                Ok(Some(MediaFrame::Subtitle { frame: subtitle, start, end }))
            }
            _ => unreachable!("decode_subtitle is the subtitle-only pump"),
        }
    }
}

pub struct MediaComponent {
    media_type: MediaType,
    stream_index: usize,
    codec_id: ffmpeg::codec::Id,
    codec_name: String,
    bitrate: i64,
    start_time_offset: f64,
    duration: f64,
    time_base: ffmpeg::Rational,
    /// Set when §4.2 step 3's forced-FPS path fires; the safe stream
    /// wrapper doesn't expose a setter for `avg_frame_rate`, so downstream
    /// materializers consult this field instead of the (unmodified) stream.
    forced_frame_rate: Option<ffmpeg::Rational>,
    /// The rate actually governing this video component's per-frame
    /// duration: `forced_frame_rate` if set, else the stream's own
    /// `avg_frame_rate` when the demuxer reports one. `None` for
    /// audio/subtitle components, and for video whose rate is unknown
    /// (e.g. genuinely variable frame rate with no average reported).
    frame_rate: Option<ffmpeg::Rational>,
    hardware_info: Option<HardwareAccelInfo>,

    lifetime_bytes_read: AtomicU64,
    has_codec_packets: AtomicBool,
    is_disposed: AtomicBool,

    queue: Mutex<PacketQueue>,
    decoder: Mutex<Option<ComponentDecoder>>,
}

impl MediaComponent {
    /// Opens a component for `stream_index` in `container` (spec.md §4.2,
    /// steps 1-11). Every failure path releases whatever foreign state was
    /// acquired so far before returning.
    pub fn open(
        container: &Container,
        stream_index: usize,
        options: &MediaOptions,
        hw_accel: Option<&dyn HardwareAccelerator>,
    ) -> Result<MediaComponent> {
        let stream = container
            .stream(stream_index)
            .ok_or_else(|| MediaCoreError::ArgumentError(format!("no stream at index {stream_index}")))?;

        // Steps 1-2: allocate a fresh codec context and copy stream params.
        // A failure here is logged as a warning (spec.md §7) and we fall
        // back to an empty context so codec selection can still proceed.
        let mut codec_ctx = match ffmpeg::codec::context::Context::from_parameters(stream.parameters()) {
            Ok(ctx) => ctx,
            Err(e) => {
                eprintln!("[component] stream {stream_index}: from_parameters failed: {e} (continuing)");
                ffmpeg::codec::context::Context::new()
            }
        };

        let is_video = matches!(stream.parameters().medium(), AvMediaType::Video);

        // Step 3: packet timebase.
        let (packet_time_base, forced_frame_rate) = if is_video && options.video_forced_fps > 0.0 {
            let q = d2q(options.video_forced_fps, 1_000_000);
            (q.invert(), Some(q))
        } else {
            (stream.time_base(), None)
        };
        codec_ctx.set_time_base(packet_time_base);

        // The rate block.rs's materializer uses for per-frame video
        // duration: forced rate wins, else fall back to whatever average
        // frame rate the demuxer reports for this stream.
        let frame_rate = if is_video {
            forced_frame_rate.or_else(|| {
                let natural = stream.avg_frame_rate();
                (natural.numerator() > 0 && natural.denominator() > 0).then_some(natural)
            })
        } else {
            None
        };

        // Step 4: candidate codecs, forced name first.
        let mut candidates = Vec::new();
        if let Some(name) = options.forced_codec_name(stream_index) {
            match ffmpeg::decoder::find_by_name(name) {
                Some(codec) => candidates.push(codec),
                None => eprintln!("[component] stream {stream_index}: forced codec `{name}` not found"),
            }
        }
        if let Some(codec) = ffmpeg::decoder::find(codec_ctx.id()) {
            candidates.push(codec);
        }
        if candidates.is_empty() {
            return Err(MediaCoreError::ContainerError(format!(
                "no decoder available for stream {stream_index}"
            )));
        }

        // Step 5: try each candidate in order.
        let mut opened_codec_id = None;
        let mut hardware_info = None;
        let mut decoder = None;
        for candidate in candidates {
            codec_ctx.set_id(candidate.id());
            apply_decoder_flags(&mut codec_ctx, &options.decoder_params, candidate);

            let mut dict = build_option_dict(options, stream_index, &options.decoder_params, candidate);

            if is_video {
                if let (Some(device), Some(hw)) = (&options.video_hardware_device, hw_accel) {
                    match hw.attach(&mut codec_ctx, device) {
                        Ok(info) => hardware_info = Some(info),
                        Err(e) => eprintln!("[hwaccel] attach failed on stream {stream_index}: {e}"),
                    }
                }
            }

            match open_codec(&mut codec_ctx, candidate, &mut dict) {
                Ok(()) => {
                    warn_unconsumed_options(&dict, candidate.name());
                    opened_codec_id = Some(candidate.id());
                    ForeignRegistry::global().codec_context_opened();
                    // `codec_ctx` is now an opened AVCodecContext*. Take raw
                    // ownership of it instead of asking the safe wrapper to
                    // open it again — `build_decoder` below must not call
                    // anything that performs a second `avcodec_open2`.
                    let raw_ptr = codec_ctx.as_mut_ptr();
                    std::mem::forget(codec_ctx);
                    decoder = Some(build_decoder(raw_ptr, candidate.medium())?);
                    break;
                }
                Err(e) => {
                    eprintln!("[component] stream {stream_index}: open failed for `{}`: {e}", candidate.name());
                }
            }
        }

        let codec_id = opened_codec_id
            .ok_or_else(|| MediaCoreError::ContainerError(format!("no candidate codec opened for stream {stream_index}")))?;
        let decoder = decoder.expect("decoder set alongside opened_codec_id");

        // Step 7: discard = default, resolve media type.
        unsafe {
            (*stream.as_ptr()).discard = avffi::AVDiscard::AVDISCARD_DEFAULT;
        }
        let media_type = match &decoder {
            ComponentDecoder::Video(_) => MediaType::Video,
            ComponentDecoder::Audio(_) => MediaType::Audio,
            ComponentDecoder::Subtitle(_) => MediaType::Subtitle,
        };

        // Steps 9-10: start offset / duration, inheriting from the
        // container when the stream itself doesn't report one.
        let start_time_offset = if stream.start_time() == avffi::AV_NOPTS_VALUE {
            container.media_start_time_offset()
        } else {
            stream.start_time() as f64 * packet_time_base.numerator() as f64
                / packet_time_base.denominator() as f64
        };
        let duration = if stream.duration() <= 0 {
            0.0
        } else {
            stream.duration() as f64 * packet_time_base.numerator() as f64 / packet_time_base.denominator() as f64
        };

        let bitrate = unsafe { (*stream.parameters().as_ptr()).bit_rate };

        let mut queue = PacketQueue::new();
        // Step 11: prime the queue with a flush packet.
        queue.push(Packet::flush(stream_index));

        Ok(MediaComponent {
            media_type,
            stream_index,
            codec_id,
            codec_name: codec_id.name().to_string(),
            bitrate,
            start_time_offset,
            duration,
            time_base: packet_time_base,
            forced_frame_rate,
            frame_rate,
            hardware_info,
            lifetime_bytes_read: AtomicU64::new(0),
            has_codec_packets: AtomicBool::new(false),
            is_disposed: AtomicBool::new(false),
            queue: Mutex::new(queue),
            decoder: Mutex::new(Some(decoder)),
        })
    }

    // ── Accessors (spec.md §6) ────────────────────────────────────────────

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn stream_index(&self) -> usize {
        self.stream_index
    }

    pub fn codec_id(&self) -> ffmpeg::codec::Id {
        self.codec_id
    }

    pub fn codec_name(&self) -> &str {
        &self.codec_name
    }

    pub fn bitrate(&self) -> i64 {
        self.bitrate
    }

    pub fn start_time_offset(&self) -> f64 {
        self.start_time_offset
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn time_base(&self) -> ffmpeg::Rational {
        self.time_base
    }

    pub fn forced_frame_rate(&self) -> Option<ffmpeg::Rational> {
        self.forced_frame_rate
    }

    /// The rate used to compute each decoded video frame's duration (spec.md
    /// §3's `MediaBlock`/`MediaFrame` duration): `forced_frame_rate` if the
    /// engine pinned one, else the stream's own average, else `None`.
    pub fn frame_rate(&self) -> Option<ffmpeg::Rational> {
        self.frame_rate
    }

    pub fn hardware_info(&self) -> Option<&HardwareAccelInfo> {
        self.hardware_info.as_ref()
    }

    pub fn packet_buffer_length(&self) -> usize {
        self.queue.lock().unwrap().buffer_length()
    }

    pub fn packet_buffer_count(&self) -> usize {
        self.queue.lock().unwrap().count()
    }

    pub fn lifetime_bytes_read(&self) -> u64 {
        self.lifetime_bytes_read.load(Ordering::Relaxed)
    }

    pub fn has_codec_packets(&self) -> bool {
        self.has_codec_packets.load(Ordering::Acquire)
    }

    pub fn is_disposed(&self) -> bool {
        self.is_disposed.load(Ordering::Acquire)
    }

    // ── AV / subtitle pump public surface (spec.md §4.3) ─────────────────

    /// `SendPacket(p)`: `None` sends the empty/null sentinel.
    pub fn send_packet(&self, packet: Option<ffmpeg::Packet>) {
        match packet {
            None => self.send_empty_packet(),
            Some(p) => {
                let size = p.size();
                self.lifetime_bytes_read.fetch_add(size.max(0) as u64, Ordering::Relaxed);
                self.queue.lock().unwrap().push(Packet::from_demuxed(self.stream_index, p));
            }
        }
    }

    pub fn send_empty_packet(&self) {
        self.queue.lock().unwrap().push(Packet::empty(self.stream_index));
    }

    /// Drains the queue, releasing every packet. If `flush_buffers`, also
    /// flushes the codec and clears `HasCodecPackets`.
    pub fn clear_queued_packets(&self, flush_buffers: bool) {
        self.queue.lock().unwrap().clear();
        if flush_buffers {
            if let Some(decoder) = self.decoder.lock().unwrap().as_mut() {
                decoder.flush();
            }
            self.has_codec_packets.store(false, Ordering::Release);
        }
    }

    /// Returns the next decoded frame, or `None` (spec.md §4.3, §4.4).
    pub fn receive_next_frame(&self) -> Option<MediaFrame> {
        if self.is_disposed() {
            return None;
        }
        match self.media_type {
            MediaType::Subtitle => self.receive_next_subtitle_frame(),
            MediaType::Audio | MediaType::Video => self.receive_next_av_frame(),
        }
    }

    fn receive_next_av_frame(&self) -> Option<MediaFrame> {
        if let Some(frame) = self.try_receive_av() {
            return Some(frame);
        }
        if !self.feed_packets_to_decoder(false) {
            return self.try_receive_av();
        }
        loop {
            if let Some(frame) = self.try_receive_av() {
                return Some(frame);
            }
            if !self.feed_packets_to_decoder(true) {
                return None;
            }
        }
    }

    /// `ReceiveFrameFromDecoder` (spec.md §4.3): returns `Some(frame)` on a
    /// decoded frame, `None` on AGAIN/EOF/hard error, updating
    /// `has_codec_packets` exactly per the spec's status table.
    fn try_receive_av(&self) -> Option<MediaFrame> {
        let mut guard = self.decoder.lock().unwrap();
        let decoder = guard.as_mut()?;
        match decoder.receive_frame(self.time_base, self.frame_rate) {
            Ok(frame) => Some(frame),
            Err(ffmpeg::Error::Eof) => {
                decoder.flush();
                None
            }
            Err(ffmpeg::Error::Other { errno }) if errno == avffi::EAGAIN => {
                self.has_codec_packets.store(false, Ordering::Release);
                None
            }
            Err(e) => {
                eprintln!("[component] stream {}: receive_frame: {e}", self.stream_index);
                self.has_codec_packets.store(false, Ordering::Release);
                None
            }
        }
    }

    /// `FeedPacketsToDecoder(fillBuffer)` (spec.md §4.3). Returns whether at
    /// least one real packet was accepted by the codec this call.
    fn feed_packets_to_decoder(&self, fill_buffer: bool) -> bool {
        let mut accepted_any = false;
        loop {
            let mut queue = self.queue.lock().unwrap();
            let Some(head) = queue.peek() else { break };

            if head.is_flush() {
                queue.dequeue();
                drop(queue);
                if let Some(decoder) = self.decoder.lock().unwrap().as_mut() {
                    decoder.flush();
                }
                continue;
            }

            let ffmpeg_packet = head.as_ffmpeg().expect("non-flush packet carries ffmpeg data").clone();
            drop(queue);

            let send_result = {
                let mut guard = self.decoder.lock().unwrap();
                match guard.as_mut() {
                    Some(decoder) => decoder.send_packet(&ffmpeg_packet),
                    None => return accepted_any,
                }
            };

            match send_result {
                Err(ffmpeg::Error::Other { errno }) if errno == avffi::EAGAIN => {
                    // Decoder full: do not dequeue, stop feeding.
                    break;
                }
                Ok(()) => {
                    self.queue.lock().unwrap().dequeue();
                    self.has_codec_packets.store(true, Ordering::Release);
                    accepted_any = true;
                    if !fill_buffer {
                        break;
                    }
                }
                Err(e) => {
                    eprintln!("[component] stream {}: send_packet: {e}", self.stream_index);
                    self.queue.lock().unwrap().dequeue();
                    break;
                }
            }
        }
        accepted_any
    }

    // ── Subtitle pump (spec.md §4.4) ──────────────────────────────────────

    fn receive_next_subtitle_frame(&self) -> Option<MediaFrame> {
        // Step 1: empty packet "flush try".
        let flush_try = ffmpeg::Packet::empty();
        let mut result = self.decode_subtitle_packet(&flush_try);

        // Step 2: else dequeue a real packet and try with that.
        let mut negative_status = result.is_err();
        if !matches!(result, Ok(Some(_))) {
            let next = self.queue.lock().unwrap().dequeue();
            if let Some(packet) = next {
                if let Some(raw) = packet.as_ffmpeg() {
                    let raw = raw.clone();
                    result = self.decode_subtitle_packet(&raw);
                    negative_status = result.is_err();
                }
            }
        }

        if let Err(e) = &result {
            eprintln!("[component] stream {}: decode_subtitle2: {e}", self.stream_index);
        }
        if negative_status {
            self.has_codec_packets.store(false, Ordering::Release);
        }
        result.ok().flatten()
    }

    fn decode_subtitle_packet(&self, packet: &ffmpeg::Packet) -> std::result::Result<Option<MediaFrame>, ffmpeg::Error> {
        let mut guard = self.decoder.lock().unwrap();
        let decoder = guard.as_mut().ok_or(ffmpeg::Error::Eof)?;
        decoder.decode_subtitle(packet)
    }

    // ── Disposal (spec.md §3, §5) ─────────────────────────────────────────

    /// Idempotent. Guarded by the global codec lock per spec.md §5, and
    /// safe to call concurrently with an in-flight `receive_next_frame` —
    /// both hold `self.decoder`'s mutex, so whichever gets there first
    /// finishes before the other sees a torn state.
    pub fn dispose(&self) {
        if self.is_disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        let _guard = CodecLock::global().acquire();
        if let Some(_decoder) = self.decoder.lock().unwrap().take() {
            ForeignRegistry::global().codec_context_closed();
            // `_decoder` drops here, releasing the codec context through
            // ffmpeg-the-third's own Drop impl.
        }
        self.queue.lock().unwrap().clear();
    }
}

impl Drop for MediaComponent {
    fn drop(&mut self) {
        self.dispose();
    }
}

// ── Frame duration (spec.md §3's MediaFrame/MediaBlock duration) ─────────

/// One video frame's duration, in `time_base` ticks, derived from
/// `frame_rate` (forced fps or the stream's own average). `None`/zero rate
/// means the duration genuinely isn't known (e.g. unforced variable frame
/// rate), in which case callers fall back to a zero-length block.
fn video_frame_duration_units(time_base: ffmpeg::Rational, frame_rate: Option<ffmpeg::Rational>) -> i64 {
    let Some(rate) = frame_rate else { return 0 };
    if rate.numerator() <= 0 || time_base.numerator() <= 0 {
        return 0;
    }
    (time_base.denominator() as i64 * rate.denominator() as i64)
        / (time_base.numerator() as i64 * rate.numerator() as i64)
}

/// One audio frame's duration, in `time_base` ticks: `samples / sample_rate`
/// seconds converted into the component's packet timebase.
fn audio_frame_duration_units(time_base: ffmpeg::Rational, samples: i64, sample_rate: i64) -> i64 {
    if sample_rate <= 0 || time_base.numerator() <= 0 {
        return 0;
    }
    (samples * time_base.denominator() as i64) / (sample_rate * time_base.numerator() as i64)
}

// ── Free functions used during §4.2 step 5 ───────────────────────────────

fn apply_decoder_flags(
    codec_ctx: &mut ffmpeg::codec::context::Context,
    params: &media_core_types::DecoderParams,
    candidate: ffmpeg::Codec,
) {
    unsafe {
        let raw = codec_ctx.as_mut_ptr();
        if params.enable_fast_decoding {
            (*raw).flags2 |= avffi::AV_CODEC_FLAG2_FAST as i32;
        }
        if params.enable_low_delay_decoding {
            (*raw).flags |= avffi::AV_CODEC_FLAG_LOW_DELAY as i32;
        }
        let _ = candidate; // candidate.max_lowres consulted in build_option_dict
    }
}

fn build_option_dict<'d>(
    options: &MediaOptions,
    stream_index: usize,
    params: &media_core_types::DecoderParams,
    candidate: ffmpeg::Codec,
) -> ffmpeg::Dictionary<'d> {
    let mut dict = ffmpeg::Dictionary::new();
    for (k, v) in options.stream_codec_options(stream_index) {
        dict.set(k, v);
    }
    if !params.low_resolution_index.is_full() {
        let max_lowres = unsafe { (*candidate.as_ptr()).max_lowres };
        let requested = params.low_resolution_index.as_index();
        let clamped = requested.min(max_lowres as i32);
        dict.set("lowres", &clamped.to_string());
    }
    dict.set("refcounted_frames", if params.ref_counted_frames { "1" } else { "0" });
    dict
}

/// Opens `codec_ctx` with `candidate`, serialized by the global codec lock
/// (spec.md §4.2 step 5e, §5, §9). Unconsumed option keys are left in
/// `dict` on return so the caller can warn about them (step 5f); this is
/// the one place we drop to raw `avcodec_open2` because the safe wrapper's
/// `open_as_with` consumes the dictionary without handing back residue.
fn open_codec(
    codec_ctx: &mut ffmpeg::codec::context::Context,
    candidate: ffmpeg::Codec,
    dict: &mut ffmpeg::Dictionary,
) -> std::result::Result<(), ffmpeg::Error> {
    let _guard = CodecLock::global().acquire();
    unsafe {
        let mut raw_opts: *mut avffi::AVDictionary = std::ptr::null_mut();
        for (k, v) in dict.iter() {
            let k = CString::new(k).unwrap_or_default();
            let v = CString::new(v).unwrap_or_default();
            avffi::av_dict_set(&mut raw_opts, k.as_ptr(), v.as_ptr(), 0);
        }

        let rc = avffi::avcodec_open2(codec_ctx.as_mut_ptr(), candidate.as_ptr(), &mut raw_opts);

        dict.clear_retaining_capacity();
        let mut entry: *mut avffi::AVDictionaryEntry = std::ptr::null_mut();
        loop {
            entry = avffi::av_dict_get(raw_opts, c"".as_ptr(), entry, avffi::AV_DICT_IGNORE_SUFFIX as i32);
            if entry.is_null() {
                break;
            }
            let key = std::ffi::CStr::from_ptr((*entry).key).to_string_lossy().into_owned();
            let val = std::ffi::CStr::from_ptr((*entry).value).to_string_lossy().into_owned();
            dict.set(&key, &val);
        }
        avffi::av_dict_free(&mut raw_opts);

        if rc < 0 {
            Err(ffmpeg::Error::from(rc))
        } else {
            Ok(())
        }
    }
}

fn warn_unconsumed_options(dict: &ffmpeg::Dictionary, codec_name: &str) {
    for (key, _value) in dict.iter() {
        eprintln!("[component] codec `{codec_name}`: unconsumed option `{key}`");
    }
}

/// Wraps an already-opened `AVCodecContext*` in the variant matching
/// `medium`. Takes raw ownership — the caller must not also drop the
/// `Context` it came from (see the `mem::forget` at the call site).
fn build_decoder(raw_ptr: *mut avffi::AVCodecContext, medium: AvMediaType) -> Result<ComponentDecoder> {
    let ctx = RawCodecContext(raw_ptr);
    match medium {
        AvMediaType::Video => Ok(ComponentDecoder::Video(ctx)),
        AvMediaType::Audio => Ok(ComponentDecoder::Audio(ctx)),
        AvMediaType::Subtitle => Ok(ComponentDecoder::Subtitle(ctx)),
        other => {
            // `ctx`'s Drop still runs here, freeing the context we just
            // opened for a media type we can't represent.
            Err(MediaCoreError::ContainerError(format!("unsupported media type {other:?}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These exercise the pure bookkeeping paths (lifetime byte accounting,
    // has_codec_packets transitions) against a MediaComponent built purely
    // from a PacketQueue + atomics, without opening a real codec — the
    // codec-boundary behavior (S1-S6 in spec.md §8) needs a real media file
    // and belongs in an integration test harness outside this crate.

    #[test]
    fn flush_sentinel_never_reaches_send_packet() {
        let mut q = PacketQueue::new();
        q.push(Packet::flush(0));
        q.push(Packet::empty(0));
        let first = q.dequeue().unwrap();
        assert!(first.is_flush());
        assert!(first.as_ffmpeg().is_none());
        let second = q.dequeue().unwrap();
        assert!(!second.is_flush());
        assert!(second.as_ffmpeg().is_some());
    }

    #[test]
    fn video_duration_at_25fps_90khz_timebase() {
        let tb = ffmpeg::Rational::new(1, 90_000);
        let fps = ffmpeg::Rational::new(25, 1);
        assert_eq!(video_frame_duration_units(tb, Some(fps)), 3600);
    }

    #[test]
    fn video_duration_unknown_without_a_frame_rate() {
        let tb = ffmpeg::Rational::new(1, 90_000);
        assert_eq!(video_frame_duration_units(tb, None), 0);
    }

    #[test]
    fn audio_duration_in_its_own_sample_rate_timebase() {
        // 1024 samples at 48kHz, timebase == 1/sample_rate: duration should
        // land exactly on the sample count.
        let tb = ffmpeg::Rational::new(1, 48_000);
        assert_eq!(audio_frame_duration_units(tb, 1024, 48_000), 1024);
    }

    #[test]
    fn audio_duration_converts_across_differing_timebase() {
        // 1024 samples at 48kHz in a 90kHz packet timebase: 1024/48000 s ==
        // 1920/90000 s.
        let tb = ffmpeg::Rational::new(1, 90_000);
        assert_eq!(audio_frame_duration_units(tb, 1024, 48_000), 1920);
    }
}
