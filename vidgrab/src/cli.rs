use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidgrab")]
#[command(author, version, about = "Download videos and keep the audio track you want")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a video into the downloads directory (the default command)
    Download {
        /// Video URL; prompted for when omitted
        url: Option<String>,

        /// Skip the audio track prompt and let yt-dlp pick
        #[arg(long)]
        default_audio: bool
    },

    /// Write a copy of a local file that keeps only one audio track
    Remux {
        /// File to remux
        #[arg(required = true)]
        file: PathBuf
    },

    /// List the audio tracks of a URL or local file
    Tracks {
        /// URL or path
        source: String
    }
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Download {
            url: None,
            default_audio: false
        }
    }
}

