use std::path::Path;

use crate::error::{PipelineError, PipelineResult};

/// Load a normalized waveform: mono, `sample_rate` Hz, samples in [-1, 1].
pub fn load_waveform(path: &Path, sample_rate: u32) -> PipelineResult<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| PipelineError::Inference(format!("cannot read {}: {}", path.display(), e)))?;
    let spec = reader.spec();

    if spec.channels != 1 || spec.sample_rate != sample_rate {
        return Err(PipelineError::Inference(format!(
            "{} is {} channel(s) at {} Hz, expected mono at {} Hz",
            path.display(),
            spec.channels,
            spec.sample_rate,
            sample_rate
        )));
    }

    let samples: Result<Vec<f32>, hound::Error> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect(),
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect()
        }
    };

    let samples = samples
        .map_err(|e| PipelineError::Inference(format!("corrupt audio in {}: {}", path.display(), e)))?;

    if samples.is_empty() {
        return Err(PipelineError::Inference(format!("{} has no samples", path.display())));
    }

    Ok(samples)
}
