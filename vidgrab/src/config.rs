use std::path::PathBuf;

use yt_dlp::YtDlp;

use crate::probe::Prober;
use crate::remux::Remuxer;

pub const DEFAULT_MAX_HEIGHT: u32 = 720;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("could not determine a downloads directory; set VIDGRAB_DOWNLOAD_DIR")]
    NoDownloadDir
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub download_dir: PathBuf,
    pub ytdlp_path: Option<PathBuf>,
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub cookies_file: Option<PathBuf>,
    pub max_height: u32,
    pub accept_language: Option<String>,
    pub user_agent: Option<String>
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, which maps variable names to values.
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let download_dir = match get("VIDGRAB_DOWNLOAD_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => default_download_dir().ok_or(Error::NoDownloadDir)?
        };

        let max_height = match get("VIDGRAB_MAX_HEIGHT") {
            Some(value) => match value.parse::<u32>() {
                Ok(height) if height > 0 => height,
                _ => {
                    return Err(Error::InvalidValue {
                        key: "VIDGRAB_MAX_HEIGHT",
                        value
                    });
                }
            },
            None => DEFAULT_MAX_HEIGHT
        };

        Ok(Self {
            download_dir,
            ytdlp_path: get("YTDLP_PATH").map(PathBuf::from),
            ffmpeg_path: get("FFMPEG_PATH").map(PathBuf::from),
            ffprobe_path: get("FFPROBE_PATH").map(PathBuf::from),
            cookies_file: get("VIDGRAB_COOKIES").map(PathBuf::from),
            max_height,
            accept_language: get("VIDGRAB_ACCEPT_LANGUAGE"),
            user_agent: get("VIDGRAB_USER_AGENT")
        })
    }

    pub fn yt_dlp(&self) -> YtDlp {
        let mut yt_dlp = match self.ytdlp_path {
            Some(ref path) => {
                tracing::info!("Using custom yt-dlp path: {}", path.display());
                YtDlp::with_binary(path)
            }
            None => YtDlp::new()
        };

        if let Some(ref cookies) = self.cookies_file {
            if cookies.exists() {
                yt_dlp.set_cookies_file(Some(cookies.clone()));
                tracing::info!("Using cookies file: {}", cookies.display());
            } else {
                tracing::warn!("Cookies file {} does not exist, ignoring it", cookies.display());
            }
        }

        if let Some(ref ffmpeg) = self.ffmpeg_path {
            yt_dlp.set_ffmpeg_location(Some(ffmpeg.clone()));
        }

        yt_dlp
    }

    pub fn prober(&self) -> Prober {
        self.ffprobe_path
            .as_ref()
            .map_or_else(Prober::new, Prober::with_binary)
    }

    pub fn remuxer(&self) -> Remuxer {
        self.ffmpeg_path
            .as_ref()
            .map_or_else(Remuxer::new, Remuxer::with_binary)
    }
}

fn default_download_dir() -> Option<PathBuf> {
    dirs::download_dir().or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<Config, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("VIDGRAB_DOWNLOAD_DIR", "/srv/media")]).unwrap();
        assert_eq!(config.download_dir, PathBuf::from("/srv/media"));
        assert_eq!(config.max_height, DEFAULT_MAX_HEIGHT);
        assert_eq!(config.ytdlp_path, None);
        assert_eq!(config.accept_language, None);
        assert_eq!(config.yt_dlp().binary(), std::path::Path::new("yt-dlp"));
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let config = config(&[
            ("VIDGRAB_DOWNLOAD_DIR", "/srv/media"),
            ("YTDLP_PATH", "/opt/yt-dlp"),
            ("FFPROBE_PATH", "  "),
            ("VIDGRAB_MAX_HEIGHT", "1080"),
            ("VIDGRAB_ACCEPT_LANGUAGE", "pt-BR,pt;q=0.9")
        ])
        .unwrap();
        assert_eq!(config.ytdlp_path, Some(PathBuf::from("/opt/yt-dlp")));
        assert_eq!(config.ffprobe_path, None);
        assert_eq!(config.max_height, 1080);
        assert_eq!(config.accept_language.as_deref(), Some("pt-BR,pt;q=0.9"));
        assert_eq!(config.yt_dlp().binary(), std::path::Path::new("/opt/yt-dlp"));
    }

    #[test]
    fn test_invalid_height() {
        for bad in ["tall", "0", "-720"] {
            let result = config(&[("VIDGRAB_DOWNLOAD_DIR", "/srv"), ("VIDGRAB_MAX_HEIGHT", bad)]);
            assert!(
                matches!(result, Err(Error::InvalidValue { key: "VIDGRAB_MAX_HEIGHT", .. })),
                "value {bad:?}"
            );
        }
    }
}
