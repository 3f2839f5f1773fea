/// Value passed to `-f`. `Default` leaves the choice to yt-dlp.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormatSelector {
    #[default]
    Default,
    Expression(String)
}

impl FormatSelector {
    pub fn as_arg(&self) -> Option<String> {
        match self {
            FormatSelector::Default => None,
            FormatSelector::Expression(s) => Some(s.clone())
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Container {
    #[default]
    Default,
    Mp4
}

impl Container {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Container::Default => None,
            Container::Mp4 => Some("mp4")
        }
    }
}

/// Per-download settings. Client-wide settings (cookies, ffmpeg location)
/// live on [`crate::YtDlp`].
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub format: FormatSelector,
    /// Container used when separate video and audio formats are merged.
    pub merge_container: Container,
    /// Container the finished file is remuxed into after download.
    pub remux_container: Container,
    /// Keep the intermediate per-format files after merging.
    pub keep_video: bool,
    pub headers: Vec<(String, String)>,
    pub user_agent: Option<String>
}

impl DownloadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format(mut self, format: FormatSelector) -> Self {
        self.format = format;
        self
    }

    pub fn merge_container(mut self, container: Container) -> Self {
        self.merge_container = container;
        self
    }

    pub fn remux_container(mut self, container: Container) -> Self {
        self.remux_container = container;
        self
    }

    pub fn keep_video(mut self, keep: bool) -> Self {
        self.keep_video = keep;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
}
