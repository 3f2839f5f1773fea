use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::types::DownloadOptions;

/// Tag of the lines written through [`PROGRESS_TEMPLATE`], distinct from
/// yt-dlp's own `[download]` messages.
pub const PROGRESS_TAG: &str = "progress";

pub const PROGRESS_TEMPLATE: &str = "download:[progress] %(progress._percent_str)s %(progress._total_bytes_str)s %(progress._speed_str)s %(progress._eta_str)s";

/// Argument list for one yt-dlp invocation, built up flag by flag.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    binary: PathBuf,
    args: Vec<String>
}

impl CommandBuilder {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            args: Vec::new()
        }
    }

    fn flag(mut self, name: &str) -> Self {
        self.args.push(name.to_string());
        self
    }

    fn value(mut self, name: &str, value: impl Into<String>) -> Self {
        self.args.push(name.to_string());
        self.args.push(value.into());
        self
    }

    fn path(self, name: &str, path: &Path) -> Self {
        self.value(name, path.to_string_lossy())
    }

    pub fn url(mut self, url: &str) -> Self {
        self.args.push(url.to_string());
        self
    }

    /// Metadata only: one JSON document, no playlist expansion, no files.
    pub fn metadata(self) -> Self {
        self.flag("--dump-json").flag("--skip-download").flag("--no-playlist")
    }

    pub fn output(self, template: &Path) -> Self {
        self.path("-o", template)
    }

    /// One progress line per update, in the [`PROGRESS_TEMPLATE`] layout.
    pub fn progress_lines(self) -> Self {
        self.flag("--newline").value("--progress-template", PROGRESS_TEMPLATE)
    }

    pub fn cookies(self, file: Option<&Path>) -> Self {
        match file {
            Some(file) => self.path("--cookies", file),
            None => self
        }
    }

    pub fn ffmpeg_location(self, binary: Option<&Path>) -> Self {
        match binary {
            Some(binary) => self.path("--ffmpeg-location", binary),
            None => self
        }
    }

    pub fn with_options(mut self, options: &DownloadOptions) -> Self {
        if let Some(format) = options.format.as_arg() {
            self = self.value("-f", format);
        }
        if let Some(container) = options.merge_container.as_str() {
            self = self.value("--merge-output-format", container);
        }
        if let Some(container) = options.remux_container.as_str() {
            self = self.value("--remux-video", container);
        }
        if options.keep_video {
            self = self.flag("-k");
        }
        for (name, value) in &options.headers {
            self = self.value("--add-header", format!("{name}:{value}"));
        }
        if let Some(agent) = &options.user_agent {
            self = self.value("--user-agent", agent.as_str());
        }
        self
    }

    pub fn build(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.args);
        cmd
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Container, FormatSelector};

    #[test]
    fn test_metadata_invocation() {
        let builder = CommandBuilder::new("yt-dlp").metadata().url("https://example.com/v/1");
        assert_eq!(builder.get_args(), [
            "--dump-json",
            "--skip-download",
            "--no-playlist",
            "https://example.com/v/1"
        ]);
    }

    #[test]
    fn test_download_invocation() {
        let options = DownloadOptions::new()
            .format(FormatSelector::Expression("bv*[height<=480]+140".to_string()))
            .merge_container(Container::Mp4)
            .remux_container(Container::Mp4)
            .header("Accept-Language", "de-DE")
            .user_agent("curl/8");
        let builder = CommandBuilder::new("yt-dlp")
            .with_options(&options)
            .output(Path::new("/srv/%(title)s.%(ext)s"))
            .url("https://example.com/v/1");

        assert_eq!(builder.get_args(), [
            "-f",
            "bv*[height<=480]+140",
            "--merge-output-format",
            "mp4",
            "--remux-video",
            "mp4",
            "--add-header",
            "Accept-Language:de-DE",
            "--user-agent",
            "curl/8",
            "-o",
            "/srv/%(title)s.%(ext)s",
            "https://example.com/v/1"
        ]);
    }

    #[test]
    fn test_optional_paths() {
        let builder = CommandBuilder::new("yt-dlp")
            .cookies(Some(Path::new("/home/me/cookies.txt")))
            .ffmpeg_location(None);
        assert_eq!(builder.get_args(), ["--cookies", "/home/me/cookies.txt"]);

        let builder = CommandBuilder::new("yt-dlp")
            .cookies(None)
            .ffmpeg_location(Some(Path::new("/opt/ffmpeg/bin/ffmpeg")));
        assert_eq!(builder.get_args(), ["--ffmpeg-location", "/opt/ffmpeg/bin/ffmpeg"]);
    }

    #[test]
    fn test_progress_lines_use_the_tag() {
        let builder = CommandBuilder::new("yt-dlp").progress_lines();
        assert_eq!(builder.get_args()[0], "--newline");
        assert!(builder.get_args()[2].contains(&format!("[{PROGRESS_TAG}]")));
    }

    #[test]
    fn test_keep_video_only_when_requested() {
        let builder = CommandBuilder::new("yt-dlp").with_options(&DownloadOptions::new());
        assert!(builder.get_args().is_empty());

        let builder = CommandBuilder::new("yt-dlp").with_options(&DownloadOptions::new().keep_video(true));
        assert_eq!(builder.get_args(), ["-k"]);
    }
}
