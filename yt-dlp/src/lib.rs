//! Async Rust wrapper for the yt-dlp CLI.
//!
//! Covers the slice of yt-dlp that a single-video downloader needs: reading
//! format metadata without downloading, and running a download while
//! streaming progress events parsed from the tool's output.
//!
//! # Example
//!
//! ```no_run
//! use yt_dlp::{Container, DownloadOptions, FormatSelector, YtDlp};
//!
//! #[tokio::main]
//! async fn main() -> yt_dlp::Result<()> {
//!     let client = YtDlp::new();
//!
//!     let info = client.fetch_info("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!     for format in info.audio_only_formats() {
//!         println!("{} {:?}", format.format_id, format.language);
//!     }
//!
//!     let options = DownloadOptions::new()
//!         .format(FormatSelector::Expression("bv*+ba/b".to_string()))
//!         .merge_container(Container::Mp4);
//!     let events = client.download_with_progress(
//!         "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
//!         "%(title)s.%(ext)s",
//!         &options
//!     );
//!     # drop(events);
//!     Ok(())
//! }
//! ```

mod client;
mod command;
mod output;
pub mod error;
pub mod types;

pub use client::{DownloadEvents, YtDlp};
pub use error::{Error, Result};
pub use types::{
    Container, DownloadEvent, DownloadOptions, DownloadProgress, Format, FormatSelector,
    VideoInfo
};
