// crates/media-core/src/hw_accel.rs
//
// Pin for the hardware-acceleration shim (spec.md §1, §6): "sets up
// accelerator; records Name and IsUsingHardwareDecoding." The shim's
// internals (device enumeration, `hw_device_ctx` wiring) are an external
// collaborator we do not re-specify — MediaComponent::open calls this trait
// once, during step 5d of init, before `avcodec_open2`.

use ffmpeg_the_third as ffmpeg;

/// Result of a successful hardware-accelerator attach.
#[derive(Clone, Debug)]
pub struct HardwareAccelInfo {
    pub name: String,
    pub is_using_hardware_decoding: bool,
}

pub trait HardwareAccelerator: Send + Sync {
    /// Attaches hardware decode support to `codec_ctx` for the named
    /// `device` before the codec is opened. Implementations live outside
    /// this crate; a `None` config (spec.md's `VideoHardwareDevice`) simply
    /// skips this call entirely.
    fn attach(
        &self,
        codec_ctx: &mut ffmpeg::codec::context::Context,
        device: &str,
    ) -> anyhow::Result<HardwareAccelInfo>;
}
