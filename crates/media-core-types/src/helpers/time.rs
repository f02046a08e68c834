// crates/media-core-types/src/helpers/time.rs
//
// Shared time-formatting utilities.
//
// Canonical source for format_time() — kept for any future engine-side
// display needs (duration labels, scrub UI); `smpte_timecode` is the one
// these pipe into for the engine-state update the renderer loop makes on
// every video block (spec.md "Video-block renders additionally update
// SMPTE timecode ... on the engine state").

/// Format a duration in seconds as `MM:SS:FF` (minutes, seconds, frames at 30 fps).
///
/// ```
/// use media_core_types::helpers::time::format_time;
/// assert_eq!(format_time(0.0),    "00:00:00");
/// assert_eq!(format_time(61.5),   "01:01:15");
/// assert_eq!(format_time(3599.0), "59:59:00");
/// ```
pub fn format_time(s: f64) -> String {
    let m  = (s / 60.0) as u32;
    let sc = (s % 60.0) as u32;
    let fr = ((s * 30.0) as u32) % 30;
    format!("{m:02}:{sc:02}:{fr:02}")
}

/// Non-drop-frame SMPTE timecode `HH:MM:SS:FF` at the given frame rate.
/// `fps <= 0.0` falls back to 30, matching `format_time`'s assumption.
///
/// ```
/// use media_core_types::helpers::time::smpte_timecode;
/// assert_eq!(smpte_timecode(0.0, 25.0),   "00:00:00:00");
/// assert_eq!(smpte_timecode(3725.2, 25.0), "01:02:05:05");
/// ```
pub fn smpte_timecode(seconds: f64, fps: f64) -> String {
    let fps = if fps > 0.0 { fps } else { 30.0 };
    let total_frames = (seconds.max(0.0) * fps).round() as u64;
    let frames_per_second = fps.round().max(1.0) as u64;
    let frame = total_frames % frames_per_second;
    let total_secs = total_frames / frames_per_second;
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{h:02}:{m:02}:{s:02}:{frame:02}")
}

/// Format a duration in seconds as a compact human-readable string.
///
/// | Range         | Format       | Example   |
/// |---------------|--------------|-----------|
/// | ≥ 3600 s      | `H:MM:SS`    | `1:04:35` |
/// | ≥ 60 s        | `M:SS`       | `3:07`    |
/// | < 60 s        | `S.Xs`       | `4.2s`    |
///
/// ```
/// use media_core_types::helpers::time::format_duration;
/// assert_eq!(format_duration(4.2),    "4.2s");
/// assert_eq!(format_duration(187.0),  "3:07");
/// assert_eq!(format_duration(3875.0), "1:04:35");
/// ```
pub fn format_duration(secs: f64) -> String {
    if secs >= 3600.0 {
        format!(
            "{}:{:02}:{:02}",
            secs as u64 / 3600,
            (secs as u64 % 3600) / 60,
            secs as u64 % 60,
        )
    } else if secs >= 60.0 {
        format!("{}:{:02}", secs as u64 / 60, secs as u64 % 60)
    } else {
        format!("{secs:.1}s")
    }
}