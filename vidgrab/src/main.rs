mod cli;

use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};
use vidgrab::Config;
use vidgrab::acquire::{self, Acquirer};
use vidgrab::remux::{self, Outcome};
use vidgrab::selector::{InputProvider, StdinInput, TrackSelector};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command.unwrap_or_default()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "vidgrab=debug,yt_dlp=debug"
    } else {
        "vidgrab=warn,yt_dlp=warn"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into())
        )
        .init();
}

async fn run(command: Commands) -> anyhow::Result<ExitCode> {
    let config = Config::from_env().context("invalid configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let code = match command {
        Commands::Download { url, default_audio } => download(&config, url, !default_audio).await,
        Commands::Remux { file } => remux_file(&config, &file).await,
        Commands::Tracks { source } => list_tracks(&config, &source).await
    };
    Ok(code)
}

async fn download(config: &Config, url: Option<String>, pick_audio: bool) -> ExitCode {
    let raw = match url {
        Some(url) => url,
        None => match StdinInput.read_line("Video URL: ") {
            Ok(line) => line,
            Err(e) => {
                eprintln!("Could not read a URL: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    let client = config.yt_dlp();
    match client.version().await {
        Ok(version) => tracing::info!("yt-dlp version: {}", version),
        Err(e) => tracing::warn!("yt-dlp not found or not executable: {}", e)
    }

    let acquirer = Acquirer::new(client, config);
    match fetch(&acquirer, &raw, pick_audio).await {
        Ok(outcome) => {
            println!("Download complete!");
            if let Some(file) = outcome.file {
                println!("Saved to {}", file.display());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "download flow failed");
            eprintln!("An error occurred: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn fetch(acquirer: &Acquirer, raw: &str, pick_audio: bool) -> Result<acquire::Outcome, acquire::Error> {
    let url = acquire::normalize_url(raw)?;
    println!("Starting download of {url}");
    println!("Saving to {}", acquirer.download_dir().display());

    let audio = if pick_audio {
        let mut selector = TrackSelector::new(StdinInput, io::stdout())
            .with_default_label("use the default audio track");
        acquirer.pick_audio(&url, &mut selector).await?
    } else {
        None
    };

    acquirer.download(&url, audio.as_ref(), &mut io::stdout()).await
}

async fn remux_file(config: &Config, file: &Path) -> ExitCode {
    if !file.is_file() {
        eprintln!("No such file: {}", file.display());
        return ExitCode::FAILURE;
    }

    let mut selector =
        TrackSelector::new(StdinInput, io::stdout()).with_default_label("keep the file unchanged");

    match remux::select_and_remux(&config.prober(), &config.remuxer(), &mut selector, file).await {
        Ok(Outcome::Remuxed(output)) => {
            println!("Saved the selected track to {}", output.display());
            ExitCode::SUCCESS
        }
        Ok(Outcome::Unchanged) => {
            println!("Leaving {} unchanged.", file.display());
            ExitCode::SUCCESS
        }
        Err(remux::Error::CommandFailed { stderr, .. }) => {
            eprintln!("ffmpeg failed:\n{}", stderr.trim_end());
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Remux failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn list_tracks(config: &Config, source: &str) -> ExitCode {
    let path = Path::new(source);
    let streams = if path.exists() {
        config.prober().enumerate_local_audio(path).await
    } else {
        let listed = match acquire::normalize_url(source) {
            Ok(url) => acquire::enumerate_remote_audio(&config.yt_dlp(), &url).await,
            Err(e) => Err(e)
        };
        match listed {
            Ok(streams) => streams,
            Err(e) => {
                eprintln!("An error occurred: {e}");
                return ExitCode::FAILURE;
            }
        }
    };

    if streams.is_empty() {
        println!("No separate audio tracks found.");
    }
    for (i, stream) in streams.iter().enumerate() {
        println!("[{i}] {}", stream.describe());
    }
    ExitCode::SUCCESS
}
