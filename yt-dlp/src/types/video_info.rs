use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub formats: Vec<Format>
}

impl VideoInfo {
    /// Formats carrying audio and no video, in the order yt-dlp listed them.
    pub fn audio_only_formats(&self) -> impl Iterator<Item = &Format> {
        self.formats.iter().filter(|f| f.is_audio_only())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Format {
    pub format_id: String,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub audio_channels: Option<u32>,
    #[serde(default)]
    pub language: Option<String>
}

impl Format {
    pub fn has_video(&self) -> bool {
        self.vcodec.as_ref().is_some_and(|v| v != "none")
    }

    pub fn has_audio(&self) -> bool {
        self.acodec.as_ref().is_some_and(|a| a != "none")
    }

    pub fn is_audio_only(&self) -> bool {
        self.has_audio() && !self.has_video()
    }
}
