//! Video download and frame/audio extraction.
//!
//! Wraps yt-dlp for YouTube links and ffmpeg/ffprobe for sampling frames and
//! pulling the audio track out of a video file.

use crate::error::{Result, SvarError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;
use tracing::{debug, info, instrument};

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?x)
        (?:https?://)?
        (?:www\.|m\.)?
        (?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/|youtube\.com/v/)
        ([a-zA-Z0-9_-]{11})
        ",
    )
    .expect("Invalid regex")
});

/// Extract a YouTube video ID from a URL.
pub fn youtube_id(input: &str) -> Option<String> {
    YOUTUBE_ID
        .captures(input.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Downloads a YouTube video (capped at 480p) into `output_dir`.
#[instrument(skip(output_dir), fields(video_id = %video_id))]
pub async fn download_youtube(video_id: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let url = format!("https://www.youtube.com/watch?v={}", video_id);
    let template = output_dir.join(format!("{}.%(ext)s", video_id));

    info!("Downloading video from {}", url);

    let result = Command::new("yt-dlp")
        .arg("--format").arg("best[height<=480]/best")
        .arg("--output").arg(template.to_str().unwrap_or_default())
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg(&url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SvarError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(SvarError::ToolFailed(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SvarError::ToolFailed(format!("yt-dlp failed: {stderr}")));
    }

    find_download(output_dir, video_id)
}

/// Locates a downloaded file by its ID prefix.
fn find_download(dir: &Path, video_id: &str) -> Result<PathBuf> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| SvarError::ToolFailed(format!("Cannot read directory: {e}")))?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(video_id) {
            return Ok(entry.path());
        }
    }

    Err(SvarError::ToolFailed("Video file not found after download".into()))
}

/// Timestamps of `count` frames spread evenly over `duration` seconds.
///
/// Each frame sits in the middle of its slice so the very first and last
/// frames (often black) are avoided.
pub fn frame_timestamps(duration: f64, count: u32) -> Vec<f64> {
    if count == 0 || duration <= 0.0 {
        return Vec::new();
    }

    let slice = duration / count as f64;
    (0..count).map(|i| slice * (i as f64 + 0.5)).collect()
}

/// Extracts a single JPEG frame at `timestamp` seconds.
pub async fn extract_frame(source: &Path, dest: &Path, timestamp: f64) -> Result<()> {
    debug!("Extracting frame at {:.2}s", timestamp);

    let result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", timestamp))
        .arg("-i").arg(source)
        .arg("-frames:v").arg("1")
        .arg("-vf").arg("scale='min(768,iw)':-2")
        .arg("-q:v").arg("3")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    run_result(result, "ffmpeg", "Frame extraction failed")
}

/// Extracts the audio track of a video to MP3.
pub async fn extract_audio(source: &Path, dest: &Path) -> Result<()> {
    debug!("Extracting audio track from {:?}", source);

    let result = Command::new("ffmpeg")
        .arg("-i").arg(source)
        .arg("-vn")
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("4")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    run_result(result, "ffmpeg", "Audio extraction failed")
}

fn run_result(
    result: std::io::Result<std::process::Output>,
    tool: &str,
    context: &str,
) -> Result<()> {
    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(SvarError::ToolFailed(format!("{context}: {err}")))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SvarError::ToolNotFound(tool.to_string()))
        }
        Err(e) => Err(SvarError::ToolFailed(format!("{tool} error: {e}"))),
    }
}

/// Queries the duration of a media file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SvarError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(SvarError::ToolFailed(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(SvarError::ToolFailed("ffprobe returned error".into()));
    }

    parse_probe_duration(&String::from_utf8_lossy(&output.stdout))
}

fn parse_probe_duration(json_str: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|_| SvarError::ToolFailed("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| SvarError::ToolFailed("Could not determine media duration".into()))
}
