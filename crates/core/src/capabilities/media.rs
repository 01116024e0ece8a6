//! Media (audio/video) targets for ffmpeg.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use super::{normalize_token, Domain, UnsupportedFormat};

/// Container and codecs ffmpeg should use for a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    /// Muxer passed to `-f`.
    pub container: &'static str,
    pub video_codec: Option<&'static str>,
    /// `None` drops the audio stream.
    pub audio_codec: Option<&'static str>,
    /// Extension of the produced file.
    pub extension: &'static str,
}

impl MediaDescriptor {
    const fn audio(container: &'static str, codec: &'static str, extension: &'static str) -> Self {
        Self {
            container,
            video_codec: None,
            audio_codec: Some(codec),
            extension,
        }
    }

    const fn video(
        container: &'static str,
        video: &'static str,
        audio: Option<&'static str>,
        extension: &'static str,
    ) -> Self {
        Self {
            container,
            video_codec: Some(video),
            audio_codec: audio,
            extension,
        }
    }

    /// Whether the target carries a video stream.
    pub fn is_video(&self) -> bool {
        self.video_codec.is_some()
    }
}

static MEDIA_FORMATS: Lazy<BTreeMap<&'static str, MediaDescriptor>> = Lazy::new(|| {
    let amr_container = if cfg!(windows) { "wav" } else { "amr_nb" };

    BTreeMap::from([
        // Audio
        ("mp3", MediaDescriptor::audio("mp3", "libmp3lame", "mp3")),
        ("wav", MediaDescriptor::audio("wav", "pcm_s16le", "wav")),
        ("flac", MediaDescriptor::audio("flac", "flac", "flac")),
        ("aiff", MediaDescriptor::audio("aiff", "pcm_s16be", "aiff")),
        ("alac", MediaDescriptor::audio("ipod", "alac", "alac")),
        ("aac", MediaDescriptor::audio("ipod", "aac", "aac")),
        ("opus", MediaDescriptor::audio("ogg", "libopus", "opus")),
        ("ogg", MediaDescriptor::audio("ogg", "libvorbis", "ogg")),
        ("ac3", MediaDescriptor::audio("ac3", "ac3", "ac3")),
        ("amr", MediaDescriptor::audio(amr_container, "pcm_s16le", "amr")),
        // Video
        ("mp4", MediaDescriptor::video("mp4", "libx264", Some("aac"), "mp4")),
        ("webm", MediaDescriptor::video("webm", "libvpx-vp9", Some("libopus"), "webm")),
        ("avi", MediaDescriptor::video("avi", "mpeg4", Some("libmp3lame"), "avi")),
        ("mov", MediaDescriptor::video("mov", "prores", Some("aac"), "mov")),
        ("mkv", MediaDescriptor::video("matroska", "libx264", Some("aac"), "mkv")),
        ("wmv", MediaDescriptor::video("asf", "wmv2", Some("wmav2"), "wmv")),
        ("flv", MediaDescriptor::video("flv", "flv", Some("aac"), "flv")),
        ("mpg", MediaDescriptor::video("mpeg", "mpeg2video", Some("mp2"), "mpg")),
        ("ts", MediaDescriptor::video("mpegts", "libx264", Some("aac"), "ts")),
        ("gif", MediaDescriptor::video("gif", "gif", None, "gif")),
        ("hevc_mp4", MediaDescriptor::video("mp4", "libx265", Some("aac"), "mp4")),
    ])
});

/// Looks up the recipe for a media target.
pub fn descriptor(target: &str) -> Result<&'static MediaDescriptor, UnsupportedFormat> {
    let token = normalize_token(target);
    MEDIA_FORMATS
        .get(token.as_str())
        .ok_or_else(|| UnsupportedFormat::unknown_target(Domain::Media, token))
}

/// All media target tokens.
pub fn formats() -> Vec<&'static str> {
    MEDIA_FORMATS.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_target() {
        let mp3 = descriptor("mp3").unwrap();
        assert_eq!(mp3.container, "mp3");
        assert_eq!(mp3.audio_codec, Some("libmp3lame"));
        assert!(!mp3.is_video());
    }

    #[test]
    fn test_video_target_case_insensitive() {
        let mkv = descriptor("MKV").unwrap();
        assert_eq!(mkv.container, "matroska");
        assert_eq!(mkv.video_codec, Some("libx264"));
        assert_eq!(mkv.audio_codec, Some("aac"));
    }

    #[test]
    fn test_gif_has_no_audio() {
        let gif = descriptor("gif").unwrap();
        assert!(gif.is_video());
        assert_eq!(gif.audio_codec, None);
    }

    #[test]
    fn test_hevc_writes_mp4_extension() {
        let hevc = descriptor("hevc_mp4").unwrap();
        assert_eq!(hevc.video_codec, Some("libx265"));
        assert_eq!(hevc.extension, "mp4");
    }

    #[test]
    fn test_unknown_target_is_unsupported() {
        let err = descriptor("xyz").unwrap_err();
        assert_eq!(err.domain, Domain::Media);
        assert_eq!(err.format, "xyz");
    }

    #[test]
    fn test_formats_listing() {
        let all = formats();
        assert_eq!(all.len(), 21);
        assert!(all.contains(&"webm"));
    }
}
