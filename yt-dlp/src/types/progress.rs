/// One progress report. Fields yt-dlp printed as unknown are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadProgress {
    pub downloaded_bytes: u64,
    pub total_bytes: Option<u64>,
    pub speed: Option<f64>,
    pub eta: Option<f64>,
    pub percent: Option<f64>
}

impl DownloadProgress {
    /// Percentage with one decimal, e.g. `42.2%`.
    pub fn format_percent(&self) -> Option<String> {
        self.percent.map(|p| format!("{p:.1}%"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    Extracting { url: String },
    DownloadStarted { filename: String },
    Progress(DownloadProgress),
    MergingFormats,
    PostProcessing { status: String },
    Finished { filename: String },
    Error { message: String },
    Warning { message: String }
}

impl DownloadEvent {
    pub fn is_error(&self) -> bool {
        matches!(self, DownloadEvent::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percent() {
        let progress = DownloadProgress {
            percent: Some(42.24),
            ..DownloadProgress::default()
        };
        assert_eq!(progress.format_percent().as_deref(), Some("42.2%"));
        assert_eq!(DownloadProgress::default().format_percent(), None);
    }

    #[test]
    fn test_only_error_events_are_errors() {
        assert!(DownloadEvent::Error { message: "gone".to_string() }.is_error());
        assert!(!DownloadEvent::Warning { message: "slow".to_string() }.is_error());
        assert!(!DownloadEvent::MergingFormats.is_error());
    }
}
