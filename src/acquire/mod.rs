//! Getting a short normalized waveform for a track: names, paths, the
//! clip source, the transcoder and the size guard between them.

mod ffmpeg;
pub mod paths;
pub mod sanitize;
mod ytdlp;

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, PipelineResult};

pub use ffmpeg::Ffmpeg;
pub use paths::{GameDirs, MediaPaths};
pub use sanitize::{sanitize, sanitize_component};
pub use ytdlp::YtDlp;

/// Finds and downloads audio clips from a video platform.
pub trait ClipSource {
    /// URL of the best match for `query`, if any.
    fn search(&mut self, query: &str) -> PipelineResult<Option<String>>;

    /// Download the start of `url` into `dir` as `<stem>.<ext>` and return
    /// the path of the container written.
    fn download(&mut self, url: &str, dir: &Path, stem: &str) -> PipelineResult<PathBuf>;
}

/// Converts any audio container to the normalized waveform format.
pub trait Transcoder {
    fn transcode(&mut self, input: &Path, output: &Path) -> PipelineResult<()>;
}

impl<T: ClipSource + ?Sized> ClipSource for &mut T {
    fn search(&mut self, query: &str) -> PipelineResult<Option<String>> {
        (**self).search(query)
    }

    fn download(&mut self, url: &str, dir: &Path, stem: &str) -> PipelineResult<PathBuf> {
        (**self).download(url, dir, stem)
    }
}

impl<T: Transcoder + ?Sized> Transcoder for &mut T {
    fn transcode(&mut self, input: &Path, output: &Path) -> PipelineResult<()> {
        (**self).transcode(input, output)
    }
}

/// Reject containers of `limit` bytes or more. Returns the size otherwise.
pub fn check_size(path: &Path, limit: u64) -> PipelineResult<u64> {
    let size = std::fs::metadata(path)?.len();
    if size >= limit {
        return Err(PipelineError::Oversized { size, limit });
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_size_guard_boundary() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clip.webm");
        std::fs::write(&path, vec![0u8; 1024]).unwrap();

        assert_eq!(check_size(&path, 1025).unwrap(), 1024);
        assert_eq!(check_size(&path, 1024).unwrap_err().kind(), ErrorKind::Oversized);
        assert!(check_size(&path, 1024).unwrap_err().is_skip());
    }
}
