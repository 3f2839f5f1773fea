use std::io::Write;
use std::path::{Path, PathBuf};

use tokio_stream::StreamExt;
use yt_dlp::{Container, DownloadEvent, DownloadOptions, FormatSelector, YtDlp};

use crate::config::Config;
use crate::selector::{InputProvider, TrackSelector};
use crate::stream::StreamDescriptor;

const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no URL given")]
    EmptyUrl,

    #[error("could not read video metadata: {0}")]
    Metadata(#[source] yt_dlp::Error),

    #[error(transparent)]
    YtDlp(#[from] yt_dlp::Error),

    #[error("download failed: {0}")]
    DownloadFailed(String)
}

/// Adds `https://` unless the URL already names an http(s) scheme.
pub fn normalize_url(raw: &str) -> Result<String, Error> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(Error::EmptyUrl);
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Ok(format!("https://{url}"))
    }
}

/// Pure-audio formats of a remote video, in yt-dlp's order.
pub async fn enumerate_remote_audio(client: &YtDlp, url: &str) -> Result<Vec<StreamDescriptor>, Error> {
    let info = client.fetch_info(url).await.map_err(Error::Metadata)?;
    tracing::debug!(id = %info.id, "{} formats listed for {}", info.formats.len(), info.title);
    Ok(info
        .audio_only_formats()
        .map(StreamDescriptor::from_format)
        .collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub url: String,
    /// Final file as reported by yt-dlp, when it named one.
    pub file: Option<PathBuf>
}

pub struct Acquirer {
    client: YtDlp,
    download_dir: PathBuf,
    max_height: u32,
    accept_language: Option<String>,
    user_agent: Option<String>
}

impl Acquirer {
    pub fn new(client: YtDlp, config: &Config) -> Self {
        Self {
            client,
            download_dir: config.download_dir.clone(),
            max_height: config.max_height,
            accept_language: config.accept_language.clone(),
            user_agent: config.user_agent.clone()
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn output_template(&self) -> PathBuf {
        self.download_dir.join(OUTPUT_TEMPLATE)
    }

    /// Format-selector expression: best video up to the height limit with the
    /// chosen audio format, or the layered mp4-first fallback chain.
    pub fn format_expression(&self, audio: Option<&StreamDescriptor>) -> String {
        let h = self.max_height;
        match audio.and_then(StreamDescriptor::format_id) {
            Some(id) => format!("bv*[height<={h}]+{id}"),
            None => format!("bv*[ext=mp4][height={h}]+ba[ext=m4a]/b[ext=mp4][height<={h}]/bv*+ba/b")
        }
    }

    pub fn download_options(&self, audio: Option<&StreamDescriptor>) -> DownloadOptions {
        let mut options = DownloadOptions::new()
            .format(FormatSelector::Expression(self.format_expression(audio)))
            .merge_container(Container::Mp4)
            .remux_container(Container::Mp4)
            .keep_video(false);

        if let Some(ref language) = self.accept_language {
            options = options.header("Accept-Language", language.clone());
        }
        if let Some(ref agent) = self.user_agent {
            options = options.user_agent(agent.clone());
        }

        options
    }

    /// Lists the remote audio formats and lets the operator pick one. Only an
    /// explicit pick out of several overrides the default format chain.
    pub async fn pick_audio<I: InputProvider, W: Write>(
        &self,
        url: &str,
        selector: &mut TrackSelector<I, W>
    ) -> Result<Option<StreamDescriptor>, Error> {
        let streams = enumerate_remote_audio(&self.client, url).await?;
        Ok(selector.select(&streams).chosen().cloned())
    }

    /// Downloads `url`, rewriting a single progress line on `progress`.
    pub async fn download<W: Write>(
        &self,
        url: &str,
        audio: Option<&StreamDescriptor>,
        progress: &mut W
    ) -> Result<Outcome, Error> {
        let options = self.download_options(audio);
        let events = self
            .client
            .download_with_progress(url, self.output_template(), &options);
        tokio::pin!(events);

        let mut file: Option<PathBuf> = None;
        let mut failure: Option<String> = None;
        let mut progress_shown = false;

        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    end_progress_line(progress, progress_shown);
                    return Err(e.into());
                }
            };
            match event {
                DownloadEvent::Progress(p) => {
                    if let Some(percent) = p.format_percent() {
                        let _ = write!(progress, "\rDownloading: {percent:>6}");
                        let _ = progress.flush();
                        progress_shown = true;
                    }
                }
                DownloadEvent::Extracting { url } => tracing::debug!("extracting {}", url),
                DownloadEvent::DownloadStarted { filename } => {
                    tracing::debug!("writing {}", filename);
                }
                DownloadEvent::MergingFormats => tracing::debug!("merging formats"),
                DownloadEvent::PostProcessing { status } => tracing::debug!("{}", status),
                DownloadEvent::Warning { message } => {
                    end_progress_line(progress, progress_shown);
                    progress_shown = false;
                    tracing::warn!("yt-dlp: {}", message);
                }
                DownloadEvent::Error { message } => {
                    tracing::debug!("yt-dlp error: {}", message);
                    failure.get_or_insert(message);
                }
                DownloadEvent::Finished { filename } => file = Some(PathBuf::from(filename))
            }
        }

        end_progress_line(progress, progress_shown);

        match failure {
            Some(message) => Err(Error::DownloadFailed(message)),
            None => Ok(Outcome {
                url: url.to_string(),
                file
            })
        }
    }
}

fn end_progress_line<W: Write>(progress: &mut W, shown: bool) {
    if shown {
        let _ = writeln!(progress);
    }
}
