//! Interactive choice of one audio stream out of an enumerated list.
//!
//! The decision itself is [`resolve`], a pure function of the candidates and
//! the raw operator input. [`TrackSelector`] wraps it with rendering and an
//! injected [`InputProvider`]. Bad input never becomes an error: it falls
//! back to the default choice with a printed warning.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead, Write};

use crate::stream::StreamDescriptor;

pub trait InputProvider {
    /// Shows `prompt` and returns one line of operator input. End of input
    /// reads as an empty line.
    fn read_line(&mut self, prompt: &str) -> io::Result<String>;
}

/// Reads from the process's stdin, prompting on stdout.
#[derive(Debug, Default)]
pub struct StdinInput;

impl InputProvider for StdinInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        write!(stdout, "{prompt}")?;
        stdout.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(line)
    }
}

/// Answers prompts from a fixed queue of lines.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    prompts: Vec<String>
}

impl ScriptedInput {
    pub fn new<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            prompts: Vec::new()
        }
    }

    /// Prompts shown so far, in order.
    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl InputProvider for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.prompts.push(prompt.to_string());
        Ok(self.lines.pop_front().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Fewer than two candidates, so there was nothing to ask.
    Implicit(Option<&'a StreamDescriptor>),
    /// Empty or rejected input: keep whatever the flow does by default.
    KeepDefault,
    Chosen { index: usize, stream: &'a StreamDescriptor }
}

impl<'a> Selection<'a> {
    /// The stream this selection resolves to, including the implicit one.
    pub fn stream(&self) -> Option<&'a StreamDescriptor> {
        match *self {
            Selection::Implicit(stream) => stream,
            Selection::KeepDefault => None,
            Selection::Chosen { stream, .. } => Some(stream)
        }
    }

    /// The stream only when the operator picked it out of several.
    pub fn chosen(&self) -> Option<&'a StreamDescriptor> {
        match *self {
            Selection::Chosen { stream, .. } => Some(stream),
            _ => None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("\"{0}\" is not a track number")]
    NotANumber(String),

    #[error("track {value} does not exist (choose 0 to {last})")]
    OutOfRange { value: i64, last: usize },

    #[error("could not read a choice: {0}")]
    Unreadable(String)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub selection: Selection<'a>,
    pub rejection: Option<Rejection>
}

impl<'a> Resolution<'a> {
    fn accepted(selection: Selection<'a>) -> Self {
        Self {
            selection,
            rejection: None
        }
    }

    fn rejected(rejection: Rejection) -> Self {
        Self {
            selection: Selection::KeepDefault,
            rejection: Some(rejection)
        }
    }
}

/// Maps raw operator input onto one of `streams`.
pub fn resolve<'a>(streams: &'a [StreamDescriptor], raw: &str) -> Resolution<'a> {
    if streams.len() < 2 {
        return Resolution::accepted(Selection::Implicit(streams.first()));
    }

    let raw = raw.trim();
    if raw.is_empty() {
        return Resolution::accepted(Selection::KeepDefault);
    }

    let Ok(value) = raw.parse::<i64>() else {
        return Resolution::rejected(Rejection::NotANumber(raw.to_string()));
    };

    match usize::try_from(value).ok().and_then(|i| streams.get(i).map(|s| (i, s))) {
        Some((index, stream)) => Resolution::accepted(Selection::Chosen { index, stream }),
        None => Resolution::rejected(Rejection::OutOfRange {
            value,
            last: streams.len() - 1
        })
    }
}

pub struct TrackSelector<I, W> {
    input: I,
    out: W,
    default_label: &'static str,
    console_failed: bool
}

impl<I: InputProvider, W: Write> TrackSelector<I, W> {
    pub fn new(input: I, out: W) -> Self {
        Self {
            input,
            out,
            default_label: "keep the default track",
            console_failed: false
        }
    }

    /// Wording for what an empty answer does, e.g. "keep all tracks".
    pub fn with_default_label(mut self, label: &'static str) -> Self {
        self.default_label = label;
        self
    }

    pub fn into_parts(self) -> (I, W) {
        (self.input, self.out)
    }

    pub fn select<'a>(&mut self, streams: &'a [StreamDescriptor]) -> Selection<'a> {
        if streams.len() < 2 {
            match streams.first() {
                Some(stream) => self.say(format_args!(
                    "Only one audio track ({}), no choice needed.",
                    stream.describe()
                )),
                None => self.say(format_args!("No separate audio tracks found, no choice needed."))
            }
            return resolve(streams, "").selection;
        }

        self.say(format_args!("Available audio tracks:"));
        for (i, stream) in streams.iter().enumerate() {
            self.say(format_args!("  [{i}] {}", stream.describe()));
        }

        let prompt = format!(
            "Choose a track (0-{}, Enter to {}): ",
            streams.len() - 1,
            self.default_label
        );
        let resolution = match self.input.read_line(&prompt) {
            Ok(raw) => resolve(streams, &raw),
            Err(e) => Resolution::rejected(Rejection::Unreadable(e.to_string()))
        };

        if let Some(rejection) = &resolution.rejection {
            tracing::debug!("track choice rejected: {}", rejection);
            let label = self.default_label;
            self.say(format_args!("Warning: {rejection}; will {label} instead."));
        }
        if let Selection::Chosen { index, stream } = resolution.selection {
            self.say(format_args!("Using track [{index}] {}", stream.describe()));
        }

        resolution.selection
    }

    /// Writes one console line. A broken console never changes the choice;
    /// the first failure is logged and later ones are ignored.
    fn say(&mut self, line: fmt::Arguments<'_>) {
        let written = self.out.write_fmt(line).and_then(|()| {
            self.out.write_all(b"\n")?;
            self.out.flush()
        });
        if let Err(e) = written
            && !self.console_failed
        {
            self.console_failed = true;
            tracing::warn!("could not write to the console: {}", e);
        }
    }
}
