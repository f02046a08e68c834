// crates/media-core-types/src/error.rs
//
// Error enum for the public boundary of MediaComponent / ComponentSet
// construction. Internal glue inside media-core uses anyhow::Result the way
// the teacher's decode/probe/worker modules do; this enum is what those
// anyhow errors get folded into at the public API per the propagation
// policy in spec.md §7.

use std::fmt;

#[derive(Debug)]
pub enum MediaCoreError {
    /// Null container / invalid stream index — fail fast, before anything
    /// foreign has been allocated.
    ArgumentError(String),
    /// Codec parameters couldn't be copied, no candidate codec opened, or
    /// the opened codec's media type isn't Audio/Video/Subtitle.
    ContainerError(String),
    /// Underlying ffmpeg-the-third call failed outside of a recognized
    /// AGAIN/EOF transient.
    Ffmpeg(ffmpeg_the_third::Error),
}

impl fmt::Display for MediaCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaCoreError::ArgumentError(m) => write!(f, "argument error: {m}"),
            MediaCoreError::ContainerError(m) => write!(f, "container error: {m}"),
            MediaCoreError::Ffmpeg(e) => write!(f, "ffmpeg error: {e}"),
        }
    }
}

impl std::error::Error for MediaCoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MediaCoreError::Ffmpeg(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ffmpeg_the_third::Error> for MediaCoreError {
    fn from(e: ffmpeg_the_third::Error) -> Self {
        MediaCoreError::Ffmpeg(e)
    }
}

pub type Result<T> = std::result::Result<T, MediaCoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_the_reason() {
        let e = MediaCoreError::ArgumentError("no stream at index 3".into());
        assert_eq!(e.to_string(), "argument error: no stream at index 3");

        let e = MediaCoreError::ContainerError("no candidate codec opened".into());
        assert_eq!(e.to_string(), "container error: no candidate codec opened");
    }

    #[test]
    fn argument_and_container_errors_have_no_source() {
        use std::error::Error;
        let e = MediaCoreError::ArgumentError("x".into());
        assert!(e.source().is_none());
    }
}
