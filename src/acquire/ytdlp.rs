use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::ClipSource;
use crate::config::AcquireConfig;
use crate::error::{PipelineError, PipelineResult};

/// Video search and partial download through the `yt-dlp` executable.
#[derive(Debug, Clone)]
pub struct YtDlp {
    bin: String,
    cookies: Option<PathBuf>,
    clip_seconds: u32,
    retries: u32,
    retry_sleep_secs: u32,
    socket_timeout_secs: u32,
}

/// `--download-sections` value covering the first `seconds` of a video.
fn clip_section(seconds: u32) -> String {
    format!(
        "*00:00:00-{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

/// First non-empty line of the tool's stdout.
fn first_line(stdout: &[u8]) -> Option<String> {
    String::from_utf8_lossy(stdout)
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Locate `<stem>.<ext>` in `dir` when the tool did not report the final path.
fn find_by_stem(dir: &Path, stem: &str) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .find(|p| {
            p.file_stem().and_then(|s| s.to_str()) == Some(stem)
                && p.extension().and_then(|e| e.to_str()) != Some("part")
        })
}

impl YtDlp {
    pub fn from_config(config: &AcquireConfig) -> Self {
        Self {
            bin: config.ytdlp_bin.clone(),
            cookies: config.cookies.clone(),
            clip_seconds: config.clip_seconds,
            retries: config.retries,
            retry_sleep_secs: config.retry_sleep_secs,
            socket_timeout_secs: config.socket_timeout_secs,
        }
    }

    fn search_args(&self, query: &str) -> Vec<OsString> {
        vec![
            "--quiet".into(),
            "--no-warnings".into(),
            "--skip-download".into(),
            "--print".into(),
            "webpage_url".into(),
            "--socket-timeout".into(),
            self.socket_timeout_secs.to_string().into(),
            format!("ytsearch1:{}", query).into(),
        ]
    }

    fn download_args(&self, url: &str, dir: &Path, stem: &str) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--quiet".into(),
            "--no-warnings".into(),
            "--no-playlist".into(),
            "-f".into(),
            "bestaudio[ext=webm]/bestaudio/best".into(),
            "-o".into(),
            dir.join(format!("{}.%(ext)s", stem)).into_os_string(),
            "--download-sections".into(),
            clip_section(self.clip_seconds).into(),
            "--retries".into(),
            self.retries.to_string().into(),
            "--retry-sleep".into(),
            self.retry_sleep_secs.to_string().into(),
            "--socket-timeout".into(),
            self.socket_timeout_secs.to_string().into(),
            "--no-simulate".into(),
            "--print".into(),
            "after_move:filepath".into(),
        ];
        if let Some(cookies) = &self.cookies {
            args.push("--cookies".into());
            args.push(cookies.clone().into_os_string());
        }
        args.push(url.into());
        args
    }

    fn run(&self, args: Vec<OsString>) -> PipelineResult<Output> {
        let output = Command::new(&self.bin)
            .args(args)
            .output()
            .map_err(|e| PipelineError::Download(format!("failed to execute {}: {}", self.bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::Download(format!(
                "{} exited with {}: {}",
                self.bin,
                output.status,
                stderr.trim()
            )));
        }

        Ok(output)
    }
}

impl ClipSource for YtDlp {
    fn search(&mut self, query: &str) -> PipelineResult<Option<String>> {
        let output = self.run(self.search_args(query))?;
        Ok(first_line(&output.stdout))
    }

    fn download(&mut self, url: &str, dir: &Path, stem: &str) -> PipelineResult<PathBuf> {
        std::fs::create_dir_all(dir)?;

        let output = self.run(self.download_args(url, dir, stem))?;

        let reported = first_line(&output.stdout).map(PathBuf::from).filter(|p| p.is_file());
        reported
            .or_else(|| find_by_stem(dir, stem))
            .ok_or_else(|| PipelineError::Download(format!("no file for '{}' in {}", stem, dir.display())))
    }
}
