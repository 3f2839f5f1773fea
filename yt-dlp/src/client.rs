use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use futures_core::Stream;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::command::CommandBuilder;
use crate::error::{Error, Result};
use crate::output::OutputParser;
use crate::types::{DownloadEvent, DownloadOptions, VideoInfo};

pub type DownloadEvents = Pin<Box<dyn Stream<Item = Result<DownloadEvent>> + Send + 'static>>;

/// A yt-dlp executable plus the settings shared by every invocation.
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    cookies_file: Option<PathBuf>,
    ffmpeg_location: Option<PathBuf>
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlp {
    pub fn new() -> Self {
        Self::with_binary("yt-dlp")
    }

    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            binary: path.into(),
            cookies_file: None,
            ffmpeg_location: None
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn set_cookies_file(&mut self, path: Option<PathBuf>) {
        self.cookies_file = path;
    }

    /// ffmpeg binary (or its directory) yt-dlp should merge and remux with.
    pub fn set_ffmpeg_location(&mut self, path: Option<PathBuf>) {
        self.ffmpeg_location = path;
    }

    /// Version string reported by `--version`.
    pub async fn version(&self) -> Result<String> {
        let output = Command::new(&self.binary)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::BinaryNotExecutable(self.binary.clone()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Metadata and format list of a single video. Nothing is downloaded.
    pub async fn fetch_info(&self, url: &str) -> Result<VideoInfo> {
        let builder = self.command().metadata().url(url);
        tracing::debug!(binary = %self.binary.display(), args = ?builder.get_args(), "reading video metadata");

        let output = builder.build().stdin(Stdio::null()).output().await?;
        if !output.status.success() {
            return Err(Error::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string()
            });
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }

    /// Starts a download and streams the events parsed from yt-dlp's output.
    ///
    /// Both pipes are read: progress and file messages come on stdout,
    /// `WARNING:` lines on stderr are passed through as
    /// [`DownloadEvent::Warning`]. The stream always ends with
    /// [`DownloadEvent::Finished`] or, when the process exits non-zero,
    /// [`DownloadEvent::Error`] carrying the first `ERROR:` line yt-dlp
    /// printed. Stream errors are reserved for spawn and pipe failures.
    /// Dropping the stream kills the process.
    pub fn download_with_progress(
        &self,
        url: &str,
        output: impl AsRef<Path>,
        options: &DownloadOptions
    ) -> DownloadEvents {
        let fallback = output.as_ref().to_string_lossy().to_string();
        let builder = self
            .command()
            .with_options(options)
            .output(output.as_ref())
            .progress_lines()
            .url(url);
        tracing::debug!(binary = %self.binary.display(), args = ?builder.get_args(), "starting download");

        let mut command = builder.build();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        let url = url.to_string();

        Box::pin(async_stream::try_stream! {
            yield DownloadEvent::Extracting { url };

            let mut child = command.spawn()?;
            let stdout = child.stdout.take().ok_or(Error::OutputNotCaptured("stdout"))?;
            let stderr = child.stderr.take().ok_or(Error::OutputNotCaptured("stderr"))?;

            let (tx, mut rx) = mpsc::unbounded_channel();
            tokio::spawn(forward_lines(stdout, Line::Stdout, tx.clone()));
            tokio::spawn(forward_lines(stderr, Line::Stderr, tx));

            let mut parser = OutputParser::default();
            let mut first_error: Option<String> = None;

            while let Some(line) = rx.recv().await {
                match line? {
                    Line::Stdout(text) => {
                        tracing::trace!(line = %text, "yt-dlp");
                        if let Some(event) = parser.feed(&text) {
                            yield event;
                        }
                    }
                    Line::Stderr(text) => {
                        tracing::trace!(line = %text, "yt-dlp stderr");
                        match parser.feed(&text) {
                            Some(DownloadEvent::Error { message }) => {
                                first_error.get_or_insert(message);
                            }
                            Some(event) => {
                                yield event;
                            }
                            None => {}
                        }
                    }
                }
            }

            let status = child.wait().await?;

            if status.success() {
                let filename = parser.into_destination().unwrap_or(fallback);
                yield DownloadEvent::Finished { filename };
            } else {
                let code = status.code().unwrap_or(-1);
                let message = match first_error {
                    Some(reason) => format!("{reason} (yt-dlp exited with code {code})"),
                    None => format!("yt-dlp exited with code {code}")
                };
                yield DownloadEvent::Error { message };
            }
        })
    }

    fn command(&self) -> CommandBuilder {
        CommandBuilder::new(&self.binary)
            .cookies(self.cookies_file.as_deref())
            .ffmpeg_location(self.ffmpeg_location.as_deref())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Stdout(String),
    Stderr(String)
}

/// Sends every line of `pipe` to `tx` until end of file, a read error or a
/// closed receiver.
async fn forward_lines(
    pipe: impl AsyncRead + Unpin,
    wrap: fn(String) -> Line,
    tx: mpsc::UnboundedSender<std::io::Result<Line>>
) {
    let mut lines = BufReader::new(pipe).lines();
    loop {
        let (next, last) = match lines.next_line().await {
            Ok(Some(text)) => (Ok(wrap(text)), false),
            Ok(None) => return,
            Err(e) => (Err(e), true)
        };
        if tx.send(next).is_err() || last {
            return;
        }
    }
}
