#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Writes an executable shell script named `name` into `dir`.
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn output_text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

pub const THREE_TRACKS: &str = r#"
cat <<'EOF'
{"streams": [
  {"index": 1, "codec_name": "aac", "channels": 2, "tags": {"language": "en"}},
  {"index": 2, "codec_name": "aac", "channels": 2, "tags": {"language": "es"}},
  {"index": 3, "codec_name": "ac3", "channels": 6, "tags": {"language": "fr"}}
]}
EOF
"#;

pub const ONE_TRACK: &str = r#"echo '{"streams": [{"index": 1, "codec_name": "opus", "channels": 2}]}'"#;

/// Records its arguments next to itself and creates the output file.
pub const RECORDING_FFMPEG: &str = r#"
printf '%s\n' "$@" > "$(dirname "$0")/ffmpeg-args.txt"
for last; do :; done
: > "$last"
"#;

pub const FAILING_FFMPEG: &str = r"
echo 'Invalid stream' >&2
exit 1
";
