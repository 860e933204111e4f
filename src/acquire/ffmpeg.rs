use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use super::Transcoder;
use crate::config::AcquireConfig;
use crate::error::{PipelineError, PipelineResult};

/// Transcodes downloads to mono 16-bit PCM WAV with `ffmpeg`.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    bin: String,
    sample_rate: u32,
}

impl Ffmpeg {
    pub fn from_config(config: &AcquireConfig) -> Self {
        Self {
            bin: config.ffmpeg_bin.clone(),
            sample_rate: config.sample_rate,
        }
    }

    fn command(&self, input: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.bin);
        command
            .args(["-hide_banner", "-loglevel", "error", "-i"])
            .arg(input)
            .args(["-vn", "-ac", "1", "-ar"])
            .arg(self.sample_rate.to_string())
            .args(["-c:a", "pcm_s16le", "-f", "wav", "-y"])
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        command
    }
}

/// Where the transcoder writes before the result is complete: `<output>.part`.
fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    output.with_file_name(name)
}

impl Transcoder for Ffmpeg {
    fn transcode(&mut self, input: &Path, output: &Path) -> PipelineResult<()> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let partial = partial_path(output);
        let result = self
            .command(input, &partial)
            .output()
            .map_err(|e| PipelineError::Transcode(format!("failed to execute {}: {}", self.bin, e)))?;

        if !result.status.success() {
            let _ = std::fs::remove_file(&partial);
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(PipelineError::Transcode(format!(
                "{} exited with {}: {}",
                input.display(),
                result.status,
                stderr.trim()
            )));
        }

        // Only a finished file ever appears under the cached name.
        std::fs::rename(&partial, output)?;

        tracing::debug!(output = %output.display(), "Transcoded");
        Ok(())
    }
}
