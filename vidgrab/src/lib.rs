//! Download a video with yt-dlp and keep exactly the audio track you want,
//! either by choosing among the remote audio formats before downloading or
//! by remuxing a local file afterwards with ffmpeg.

pub mod acquire;
pub mod config;
pub mod probe;
pub mod remux;
pub mod selector;
pub mod stream;

pub use config::Config;
pub use stream::{StreamDescriptor, StreamId, StreamSource};
