use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::process::Command;

use crate::stream::StreamDescriptor;

/// Large enough for containers whose audio streams start late or carry
/// sparse headers.
const ANALYZE_DURATION: &str = "100M";
const PROBE_SIZE: &str = "100M";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to execute ffprobe: {0}")]
    ExecutionFailed(#[from] std::io::Error),

    #[error("ffprobe exited with code {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String },

    #[error("failed to parse ffprobe output: {0}")]
    JsonParseFailed(#[from] serde_json::Error)
}

#[derive(Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>
}

#[derive(Deserialize)]
struct FfprobeStream {
    index: u32,
    codec_name: Option<String>,
    channels: Option<u32>,
    #[serde(default)]
    tags: FfprobeTags
}

#[derive(Deserialize, Default)]
struct FfprobeTags {
    language: Option<String>
}

#[derive(Debug, Clone)]
pub struct Prober {
    binary: PathBuf
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober {
    pub fn new() -> Self {
        Self::with_binary("ffprobe")
    }

    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self { binary: path.into() }
    }

    /// Audio streams of a local file, in container order. Any failure is
    /// logged and yields an empty list.
    pub async fn enumerate_local_audio(&self, path: &Path) -> Vec<StreamDescriptor> {
        match self.probe_audio(path).await {
            Ok(streams) => streams,
            Err(e) => {
                tracing::warn!("could not list audio streams of {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    pub async fn probe_audio(&self, path: &Path) -> Result<Vec<StreamDescriptor>, Error> {
        let args = audio_probe_args(path);
        tracing::debug!(binary = %self.binary.display(), args = ?args, "spawning ffprobe");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(std::process::Stdio::null())
            .output()
            .await?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string()
            });
        }

        parse_audio_streams(&output.stdout)
    }
}

fn audio_probe_args(path: &Path) -> Vec<String> {
    [
        "-v",
        "error",
        "-analyzeduration",
        ANALYZE_DURATION,
        "-probesize",
        PROBE_SIZE,
        "-select_streams",
        "a",
        "-show_entries",
        "stream=index,codec_name,channels:stream_tags=language",
        "-of",
        "json"
    ]
    .into_iter()
    .map(String::from)
    .chain([path.to_string_lossy().to_string()])
    .collect()
}

pub fn parse_audio_streams(json: &[u8]) -> Result<Vec<StreamDescriptor>, Error> {
    let parsed: FfprobeOutput = serde_json::from_slice(json)?;
    Ok(parsed
        .streams
        .into_iter()
        .map(|s| StreamDescriptor::local(s.index, s.codec_name, s.tags.language.as_deref(), s.channels))
        .collect())
}
