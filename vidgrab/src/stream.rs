use std::fmt;

use yt_dlp::Format;

pub const UNDEFINED_LANGUAGE: &str = "undefined";

/// How a stream is addressed by the tool that will consume the choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamId {
    /// yt-dlp format id, usable in a format-selector expression.
    Format(String),
    /// Container-relative stream index, usable in an ffmpeg `-map`.
    Index(u32)
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamId::Format(id) => write!(f, "{id}"),
            StreamId::Index(index) => write!(f, "#{index}")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    /// Discovered from format metadata before downloading.
    Remote,
    /// Discovered by probing a file on disk.
    Local
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamDescriptor {
    pub id: StreamId,
    pub codec: Option<String>,
    pub language: String,
    pub channels: Option<u32>,
    pub ext: Option<String>
}

impl StreamDescriptor {
    pub fn from_format(format: &Format) -> Self {
        Self {
            id: StreamId::Format(format.format_id.clone()),
            codec: format.acodec.clone(),
            language: language_or_undefined(format.language.as_deref()),
            channels: format.audio_channels,
            ext: format.ext.clone()
        }
    }

    pub fn local(index: u32, codec: Option<String>, language: Option<&str>, channels: Option<u32>) -> Self {
        Self {
            id: StreamId::Index(index),
            codec,
            language: language_or_undefined(language),
            channels,
            ext: None
        }
    }

    pub fn source(&self) -> StreamSource {
        match self.id {
            StreamId::Format(_) => StreamSource::Remote,
            StreamId::Index(_) => StreamSource::Local
        }
    }

    pub fn format_id(&self) -> Option<&str> {
        match &self.id {
            StreamId::Format(id) => Some(id),
            StreamId::Index(_) => None
        }
    }

    pub fn stream_index(&self) -> Option<u32> {
        match self.id {
            StreamId::Index(index) => Some(index),
            StreamId::Format(_) => None
        }
    }

    /// One-line summary shown to the operator, e.g. `251 opus webm, en, 2 ch`.
    pub fn describe(&self) -> String {
        let mut head = self.id.to_string();
        for part in [self.codec.as_deref(), self.ext.as_deref()].into_iter().flatten() {
            head.push(' ');
            head.push_str(part);
        }

        let mut line = format!("{head}, {}", self.language);
        if let Some(channels) = self.channels {
            line.push_str(&format!(", {channels} ch"));
        }
        line
    }
}

fn language_or_undefined(language: Option<&str>) -> String {
    match language.map(str::trim) {
        Some(lang) if !lang.is_empty() => lang.to_string(),
        _ => UNDEFINED_LANGUAGE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(json: &str) -> Format {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_from_format_carries_metadata() {
        let stream = StreamDescriptor::from_format(&format(
            r#"{"format_id": "251-1", "ext": "webm", "vcodec": "none", "acodec": "opus", "language": "es", "audio_channels": 2}"#
        ));
        assert_eq!(stream.id, StreamId::Format("251-1".to_string()));
        assert_eq!(stream.source(), StreamSource::Remote);
        assert_eq!(stream.format_id(), Some("251-1"));
        assert_eq!(stream.stream_index(), None);
        assert_eq!(stream.describe(), "251-1 opus webm, es, 2 ch");
    }

    #[test]
    fn test_missing_language_defaults_to_undefined() {
        let stream = StreamDescriptor::from_format(&format(r#"{"format_id": "140", "language": ""}"#));
        assert_eq!(stream.language, UNDEFINED_LANGUAGE);
        assert_eq!(stream.describe(), "140, undefined");

        let stream = StreamDescriptor::local(2, Some("ac3".to_string()), None, Some(6));
        assert_eq!(stream.language, UNDEFINED_LANGUAGE);
        assert_eq!(stream.source(), StreamSource::Local);
        assert_eq!(stream.stream_index(), Some(2));
        assert_eq!(stream.describe(), "#2 ac3, undefined, 6 ch");
    }
}
