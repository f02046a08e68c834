// crates/media-core-types/src/media_type.rs
//
// The three kinds of stream this core ever decodes. Lives here (rather than
// in media-core) because it crosses the boundary into MediaOptions (e.g.
// `max_blocks`) that an embedding engine constructs without depending on
// ffmpeg-the-third directly.

/// Which kind of elementary stream a `MediaComponent` was built around.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MediaType {
    Audio,
    Video,
    Subtitle,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Subtitle => "subtitle",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_as_str() {
        for mt in [MediaType::Audio, MediaType::Video, MediaType::Subtitle] {
            assert_eq!(mt.to_string(), mt.as_str());
        }
    }

    #[test]
    fn usable_as_hashmap_key() {
        let mut m = std::collections::HashMap::new();
        m.insert(MediaType::Video, 4);
        m.insert(MediaType::Audio, 64);
        assert_eq!(m.get(&MediaType::Video), Some(&4));
        assert_eq!(m.get(&MediaType::Subtitle), None);
    }
}
