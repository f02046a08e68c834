// crates/media-core/src/lib.rs

pub mod block;
pub mod block_buffer;
pub mod codec_lock;
pub mod component;
pub mod component_set;
pub mod container;
pub mod cycle_event;
pub mod foreign;
pub mod hw_accel;
pub mod media_frame;
pub mod observer;
pub mod packet_queue;
pub mod pipeline;
pub mod rational;

pub use block::{BlockPayload, MediaBlock};
pub use block_buffer::MediaBlockBuffer;
pub use component::MediaComponent;
pub use component_set::ComponentSet;
pub use container::Container;
pub use foreign::ForeignRegistry;
pub use hw_accel::{HardwareAccelInfo, HardwareAccelerator};
pub use media_frame::MediaFrame;
pub use observer::{NullObserver, PipelineObserver};
pub use packet_queue::{Packet, PacketQueue};
pub use pipeline::{Clock, Pipeline, Renderer};

pub use media_core_types::{
    DecoderParams, LowResolutionIndex, MediaCoreError, MediaOptions, MediaType, Result,
};
