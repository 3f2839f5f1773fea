use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::probe::Prober;
use crate::selector::{InputProvider, TrackSelector};
use crate::stream::{StreamDescriptor, StreamId};

pub const SELECTED_SUFFIX: &str = "_selected";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("stream {0} has no container index; probe the local file to choose a track")]
    NotLocalStream(StreamId),

    #[error("failed to execute ffmpeg: {0}")]
    ExecutionFailed(#[from] std::io::Error),

    #[error("ffmpeg exited with code {code}: {stderr}")]
    CommandFailed { code: i32, stderr: String }
}

/// `<parent>/<stem>_selected<.ext>`, next to the input.
pub fn selected_output_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(SELECTED_SUFFIX);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}

/// Keeps every video stream of `input` plus exactly one audio stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemuxPlan {
    pub input: PathBuf,
    pub output: PathBuf,
    pub audio_index: u32
}

impl RemuxPlan {
    pub fn new(input: impl Into<PathBuf>, audio: &StreamDescriptor) -> Result<Self, Error> {
        let audio_index = audio
            .stream_index()
            .ok_or_else(|| Error::NotLocalStream(audio.id.clone()))?;
        let input = input.into();
        let output = selected_output_path(&input);

        Ok(Self {
            input,
            output,
            audio_index
        })
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-y".to_string(),
            "-i".to_string(),
            self.input.to_string_lossy().to_string(),
            "-map".to_string(),
            "0:v?".to_string(),
            "-map".to_string(),
            format!("0:{}", self.audio_index),
            "-c".to_string(),
            "copy".to_string(),
            self.output.to_string_lossy().to_string()
        ]
    }
}

#[derive(Debug, Clone)]
pub struct Remuxer {
    binary: PathBuf
}

impl Default for Remuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl Remuxer {
    pub fn new() -> Self {
        Self::with_binary("ffmpeg")
    }

    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self { binary: path.into() }
    }

    /// Runs the plan to completion. The input file is never touched; a
    /// previous output at the same path is overwritten.
    pub async fn run(&self, plan: &RemuxPlan) -> Result<PathBuf, Error> {
        let args = plan.args();
        tracing::debug!(binary = %self.binary.display(), args = ?args, "spawning ffmpeg");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(std::process::Stdio::null())
            .output()
            .await?;

        if output.status.success() {
            Ok(plan.output.clone())
        } else {
            Err(Error::CommandFailed {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).to_string()
            })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Remuxed(PathBuf),
    /// No track was picked out of several, so the file stays as it is.
    Unchanged
}

/// Probes `input`, asks for one audio track and writes a copy holding only
/// that track next to it.
pub async fn select_and_remux<I: InputProvider, W: Write>(
    prober: &Prober,
    remuxer: &Remuxer,
    selector: &mut TrackSelector<I, W>,
    input: &Path
) -> Result<Outcome, Error> {
    let streams = prober.enumerate_local_audio(input).await;
    tracing::info!("{} audio stream(s) in {}", streams.len(), input.display());

    let Some(stream) = selector.select(&streams).chosen() else {
        return Ok(Outcome::Unchanged);
    };

    let plan = RemuxPlan::new(input, stream)?;
    tracing::info!(
        "keeping video and audio stream {} in {}",
        plan.audio_index,
        plan.output.display()
    );

    remuxer.run(&plan).await.map(Outcome::Remuxed)
}
