//! Turns yt-dlp's line-oriented console output into [`DownloadEvent`]s.
//!
//! yt-dlp tags most lines with the component that printed them, e.g.
//! `[download] Destination: clip.f251.webm` or `[Merger] Merging formats
//! into "clip.mp4"`. Lines without a tag are either `WARNING:`/`ERROR:`
//! messages or noise.

use crate::command::PROGRESS_TAG;
use crate::types::{DownloadEvent, DownloadProgress};

/// Line parser for one download run. Remembers the last file yt-dlp said
/// it was writing, so the run's final event can name it.
#[derive(Debug, Default)]
pub(crate) struct OutputParser {
    destination: Option<String>
}

impl OutputParser {
    pub(crate) fn into_destination(self) -> Option<String> {
        self.destination
    }

    pub(crate) fn feed(&mut self, line: &str) -> Option<DownloadEvent> {
        let line = line.trim();

        if let Some(message) = line.strip_prefix("ERROR:") {
            return Some(DownloadEvent::Error {
                message: message.trim().to_string()
            });
        }
        if let Some(message) = line.strip_prefix("WARNING:") {
            return Some(DownloadEvent::Warning {
                message: message.trim().to_string()
            });
        }

        let (tag, body) = split_tag(line)?;
        match tag {
            PROGRESS_TAG => template_progress(body).map(DownloadEvent::Progress),
            "download" => self.download_line(body),
            "Merger" => {
                self.remember(quoted(body));
                Some(DownloadEvent::MergingFormats)
            }
            "VideoRemuxer" => {
                let target = body
                    .split_once("Destination:")
                    .map(|(_, path)| path.trim())
                    .or_else(|| quoted(body));
                self.remember(target);
                Some(DownloadEvent::PostProcessing {
                    status: line.to_string()
                })
            }
            "ffmpeg" | "FixupM3u8" => Some(DownloadEvent::PostProcessing {
                status: line.to_string()
            }),
            _ => None
        }
    }

    fn download_line(&mut self, body: &str) -> Option<DownloadEvent> {
        if let Some(path) = body.strip_prefix("Destination:") {
            let filename = path.trim().to_string();
            self.destination = Some(filename.clone());
            return Some(DownloadEvent::DownloadStarted { filename });
        }

        if let Some(path) = body.strip_suffix("has already been downloaded") {
            let filename = path.trim().to_string();
            self.destination = Some(filename.clone());
            return Some(DownloadEvent::Finished { filename });
        }

        console_progress(body).map(DownloadEvent::Progress)
    }

    fn remember(&mut self, path: Option<&str>) {
        if let Some(path) = path.filter(|p| !p.is_empty()) {
            self.destination = Some(path.to_string());
        }
    }
}

/// `[tag] body` into its parts.
fn split_tag(line: &str) -> Option<(&str, &str)> {
    let (tag, body) = line.strip_prefix('[')?.split_once(']')?;
    Some((tag, body.trim()))
}

fn quoted(text: &str) -> Option<&str> {
    let (_, rest) = text.split_once('"')?;
    let (inner, _) = rest.rsplit_once('"')?;
    Some(inner)
}

/// Fields written by the progress template: percent, total, speed, eta.
fn template_progress(body: &str) -> Option<DownloadProgress> {
    let mut fields = body.split_whitespace();
    let percent = fields.next().and_then(percentage)?;
    let total_bytes = fields.next().and_then(byte_count);

    Some(DownloadProgress {
        downloaded_bytes: portion(percent, total_bytes),
        total_bytes,
        speed: fields.next().and_then(rate),
        eta: fields.next().and_then(seconds),
        percent: Some(percent)
    })
}

/// yt-dlp's own progress line, e.g.
/// `14.6% of ~887.84MiB at 7.61MiB/s ETA 01:39`.
fn console_progress(body: &str) -> Option<DownloadProgress> {
    let mut progress = DownloadProgress::default();
    let mut words = body.split_whitespace();

    while let Some(word) = words.next() {
        match word {
            "of" => progress.total_bytes = words.next().and_then(byte_count),
            "at" => progress.speed = words.next().and_then(rate),
            "ETA" => progress.eta = words.next().and_then(seconds),
            word if word.ends_with('%') => progress.percent = percentage(word),
            _ => {}
        }
    }

    let percent = progress.percent?;
    progress.downloaded_bytes = portion(percent, progress.total_bytes);
    Some(progress)
}

fn percentage(word: &str) -> Option<f64> {
    word.strip_suffix('%')?.parse().ok()
}

/// `10.00MiB`, `~1.2GiB`, `512KB`. Unknown sizes (`N/A`) are `None`.
fn scaled(text: &str) -> Option<f64> {
    let text = text.trim_start_matches('~');
    let (number, unit) = text.split_at(text.find(|c: char| c.is_ascii_alphabetic())?);
    let number: f64 = number.parse().ok()?;

    let scale = match unit {
        "B" => 1.0,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        "TiB" => 1024.0 * 1024.0 * 1024.0 * 1024.0,
        "KB" | "kB" => 1e3,
        "MB" => 1e6,
        "GB" => 1e9,
        "TB" => 1e12,
        _ => return None
    };
    Some(number * scale)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn byte_count(text: &str) -> Option<u64> {
    scaled(text).map(|bytes| bytes.round() as u64)
}

fn rate(text: &str) -> Option<f64> {
    text.strip_suffix("/s").and_then(scaled)
}

/// `SS`, `MM:SS` or `HH:MM:SS`.
fn seconds(text: &str) -> Option<f64> {
    text.split(':')
        .try_fold(0.0, |total, part| Some(total * 60.0 + part.parse::<f64>().ok()?))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn portion(percent: f64, total_bytes: Option<u64>) -> u64 {
    total_bytes.map_or(0, |total| (percent / 100.0 * total as f64) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(parser: &mut OutputParser, line: &str) -> DownloadProgress {
        match parser.feed(line) {
            Some(DownloadEvent::Progress(progress)) => progress,
            other => panic!("expected progress for {line:?}, got {other:?}")
        }
    }

    #[test]
    fn test_sizes_and_durations() {
        assert_eq!(byte_count("10.00MiB"), Some(10_485_760));
        assert_eq!(byte_count("~2GiB"), Some(2_147_483_648));
        assert_eq!(byte_count("1.5KB"), Some(1500));
        assert_eq!(byte_count("N/A"), None);
        assert_eq!(byte_count("12parsecs"), None);
        assert_eq!(rate("512.00KiB/s"), Some(524_288.0));
        assert_eq!(rate("Unknown"), None);
        assert_eq!(seconds("07"), Some(7.0));
        assert_eq!(seconds("02:15"), Some(135.0));
        assert_eq!(seconds("1:02:03"), Some(3723.0));
        assert_eq!(seconds("N/A"), None);
    }

    #[test]
    fn test_template_progress() {
        let mut parser = OutputParser::default();
        let p = progress(&mut parser, "[progress]  25.0% 40.00MiB 4.00MiB/s 00:07");
        assert_eq!(p.percent, Some(25.0));
        assert_eq!(p.total_bytes, Some(41_943_040));
        assert_eq!(p.downloaded_bytes, 10_485_760);
        assert_eq!(p.speed, Some(4_194_304.0));
        assert_eq!(p.eta, Some(7.0));

        let p = progress(&mut parser, "[progress]   3.1% N/A N/A N/A");
        assert_eq!(p.percent, Some(3.1));
        assert_eq!(p.total_bytes, None);
        assert_eq!(p.downloaded_bytes, 0);
        assert_eq!(p.eta, None);
    }

    #[test]
    fn test_console_progress() {
        let mut parser = OutputParser::default();
        let p = progress(&mut parser, "[download]  80.0% of ~50.00MiB at 5.00MiB/s ETA 00:02");
        assert_eq!(p.percent, Some(80.0));
        assert_eq!(p.total_bytes, Some(52_428_800));
        assert_eq!(p.speed, Some(5_242_880.0));
        assert_eq!(p.eta, Some(2.0));

        assert_eq!(parser.feed("[download] Downloading item 1 of 3"), None);
    }

    #[test]
    fn test_destination_follows_the_last_writer() {
        let mut parser = OutputParser::default();
        assert_eq!(
            parser.feed("[download] Destination: /dl/Talk.f140.m4a"),
            Some(DownloadEvent::DownloadStarted {
                filename: "/dl/Talk.f140.m4a".to_string()
            })
        );
        assert_eq!(
            parser.feed(r#"[Merger] Merging formats into "/dl/Talk.mkv""#),
            Some(DownloadEvent::MergingFormats)
        );
        assert!(matches!(
            parser.feed("[VideoRemuxer] Remuxing video from mkv to mp4; Destination: /dl/Talk.mp4"),
            Some(DownloadEvent::PostProcessing { .. })
        ));
        assert!(matches!(
            parser.feed("[ffmpeg] Fixing container of \"/dl/Talk.mp4\""),
            Some(DownloadEvent::PostProcessing { .. })
        ));
        assert_eq!(parser.into_destination().as_deref(), Some("/dl/Talk.mp4"));
    }

    #[test]
    fn test_already_downloaded_finishes() {
        let mut parser = OutputParser::default();
        assert_eq!(
            parser.feed("[download] /dl/Talk.mp4 has already been downloaded"),
            Some(DownloadEvent::Finished {
                filename: "/dl/Talk.mp4".to_string()
            })
        );
    }

    #[test]
    fn test_messages_and_noise() {
        let mut parser = OutputParser::default();
        assert_eq!(
            parser.feed("ERROR: [youtube] abc: Private video"),
            Some(DownloadEvent::Error {
                message: "[youtube] abc: Private video".to_string()
            })
        );
        assert_eq!(
            parser.feed("WARNING: nsig extraction failed"),
            Some(DownloadEvent::Warning {
                message: "nsig extraction failed".to_string()
            })
        );
        assert_eq!(parser.feed("[youtube] abc: Downloading webpage"), None);
        assert_eq!(parser.feed("plain text"), None);
        assert_eq!(parser.into_destination(), None);
    }
}
