//! Feature extraction using ONNX Runtime.
//!
//! One embedding graph turns the waveform into per-frame embeddings; the
//! genre head and the ten mood heads each turn those embeddings into
//! per-frame class probabilities.

use anyhow::{anyhow, bail, Context, Result};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::heads::{MoodHead, MoodKind, MoodScores, MOOD_HEADS};
use super::pooling::{argmax, mean_pool, to_frames};
use super::waveform::load_waveform;
use super::{FeatureExtractor, TrackFeatures};
use crate::config::{ModelSpec, ModelsConfig};
use crate::error::{PipelineError, PipelineResult};

/// Class list shipped next to each model as `<stem>.json`.
#[derive(Debug, Deserialize)]
struct ModelMetadata {
    classes: Vec<String>,
}

fn read_metadata(model_path: &Path) -> Result<Option<ModelMetadata>> {
    let path = model_path.with_extension("json");
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path)?;
    let metadata = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse model metadata {}", path.display()))?;
    Ok(Some(metadata))
}

/// The configured tensor names must exist, and the input must take the
/// `[rows, cols]` matrices every model here is fed.
fn check_signature(inputs: &[(&str, Option<usize>)], outputs: &[&str], spec: &ModelSpec) -> Result<(), String> {
    let Some((_, rank)) = inputs.iter().find(|(name, _)| *name == spec.input) else {
        let names: Vec<&str> = inputs.iter().map(|(name, _)| *name).collect();
        return Err(format!("no input named '{}' (inputs: {})", spec.input, names.join(", ")));
    };
    if let Some(rank) = rank {
        if *rank != 2 {
            return Err(format!("input '{}' has rank {}, expected 2", spec.input, rank));
        }
    }
    if !outputs.contains(&spec.output.as_str()) {
        return Err(format!("no output named '{}' (outputs: {})", spec.output, outputs.join(", ")));
    }
    Ok(())
}

/// A session plus the tensor names it is driven with.
struct LoadedModel {
    session: Session,
    input: String,
    output: String,
    path: PathBuf,
}

impl LoadedModel {
    fn load(dir: &Path, spec: &ModelSpec) -> Result<Self> {
        let path = dir.join(&spec.file);
        if !path.exists() {
            bail!("Model not found: {}", path.display());
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(&path)
            .with_context(|| format!("Failed to load model {}", path.display()))?;

        let inputs: Vec<(&str, Option<usize>)> = session
            .inputs()
            .iter()
            .map(|i| (i.name(), i.dtype().tensor_shape().map(|s| s.len())))
            .collect();
        let outputs: Vec<&str> = session.outputs().iter().map(|o| o.name()).collect();
        check_signature(&inputs, &outputs, spec).map_err(|e| anyhow!("{}: {}", path.display(), e))?;

        tracing::debug!(model = %spec.file, "Model loaded");

        Ok(Self {
            session,
            input: spec.input.clone(),
            output: spec.output.clone(),
            path,
        })
    }

    /// Run on a `[rows, cols]` input and return `[frames, classes]`.
    fn predict(&mut self, shape: [usize; 2], data: Vec<f32>) -> Result<Array2<f32>> {
        let input = Tensor::from_array((shape, data.into_boxed_slice()))?;
        let outputs = self.session.run(ort::inputs![self.input.as_str() => input])?;

        let (_, value) = outputs
            .iter()
            .find(|(name, _)| *name == self.output.as_str())
            .ok_or_else(|| anyhow!("{} has no output named '{}'", self.path.display(), self.output))?;

        let (dims, values) = value.try_extract_tensor::<f32>()?;
        let dims: Vec<usize> = dims.iter().map(|&d| d as usize).collect();
        to_frames(&dims, values.to_vec()).map_err(|e| anyhow!("{}: {}", self.path.display(), e))
    }
}

/// Reduce per-frame head output to the stored features.
fn summarize(
    genre_labels: &[String],
    genre_frames: &Array2<f32>,
    mood_frames: &[(MoodHead, Array2<f32>)],
) -> Result<TrackFeatures, String> {
    let pooled = mean_pool(genre_frames).ok_or("genre head produced no frames")?;
    if pooled.len() != genre_labels.len() {
        return Err(format!(
            "genre head produced {} classes, metadata lists {}",
            pooled.len(),
            genre_labels.len()
        ));
    }
    let best = argmax(&pooled).ok_or("genre head produced no finite values")?;

    let mut scores = MoodScores::default();
    for (head, frames) in mood_frames {
        let pooled = mean_pool(frames).ok_or_else(|| format!("{:?} head produced no frames", head.kind))?;
        scores.set(head.kind, head.read(&pooled)?);
    }

    Ok(TrackFeatures {
        genre: genre_labels[best].clone(),
        scores,
    })
}

/// The full model chain, loaded once and reused for every track.
pub struct OnnxExtractor {
    embedding: LoadedModel,
    genre: LoadedModel,
    genre_labels: Vec<String>,
    moods: Vec<(MoodHead, LoadedModel)>,
    sample_rate: u32,
}

impl OnnxExtractor {
    /// Load every model and validate its class list. Any missing file or
    /// mismatched schema is an error here rather than a per-track skip.
    pub fn load(config: &ModelsConfig, sample_rate: u32) -> Result<Self> {
        let embedding = LoadedModel::load(&config.dir, &config.embedding)?;

        let genre = LoadedModel::load(&config.dir, &config.genre)?;
        let genre_labels = read_metadata(&genre.path)?
            .map(|m| m.classes)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| anyhow!("Genre labels missing next to {}", genre.path.display()))?;

        let mut moods = Vec::with_capacity(MOOD_HEADS.len());
        for head in MOOD_HEADS {
            let model = LoadedModel::load(&config.dir, mood_spec(config, head.kind))?;
            match read_metadata(&model.path)? {
                Some(metadata) => head
                    .check_classes(&metadata.classes)
                    .map_err(|e| anyhow!("{}: {}", model.path.display(), e))?,
                None => tracing::warn!(
                    model = %model.path.display(),
                    "No class metadata; trusting declared index {}",
                    head.index
                ),
            }
            moods.push((head, model));
        }

        let mut extractor = Self {
            embedding,
            genre,
            genre_labels,
            moods,
            sample_rate,
        };

        // One second of silence through the whole chain.
        extractor
            .run_models(vec![0.0; sample_rate as usize])
            .context("Feature models failed a trial run on silence")?;

        tracing::info!(
            genres = extractor.genre_labels.len(),
            heads = extractor.moods.len(),
            "Feature models ready"
        );

        Ok(extractor)
    }

    fn run(&mut self, waveform: &Path) -> PipelineResult<TrackFeatures> {
        let samples = load_waveform(waveform, self.sample_rate)?;
        self.run_models(samples)
            .map_err(|e| PipelineError::Inference(format!("{:#}", e)))
    }

    fn run_models(&mut self, samples: Vec<f32>) -> Result<TrackFeatures> {
        let len = samples.len();
        let embeddings = self.embedding.predict([1, len], samples)?;
        let (frames, dim) = embeddings.dim();
        if frames == 0 {
            bail!("embedding model produced no frames");
        }
        let flat: Vec<f32> = embeddings.iter().copied().collect();

        let genre_frames = self.genre.predict([frames, dim], flat.clone())?;

        let mut mood_frames = Vec::with_capacity(self.moods.len());
        for (head, model) in self.moods.iter_mut() {
            mood_frames.push((*head, model.predict([frames, dim], flat.clone())?));
        }

        summarize(&self.genre_labels, &genre_frames, &mood_frames).map_err(|e| anyhow!(e))
    }
}

impl FeatureExtractor for OnnxExtractor {
    fn extract(&mut self, waveform: &Path) -> PipelineResult<TrackFeatures> {
        self.run(waveform)
    }
}

fn mood_spec(config: &ModelsConfig, kind: MoodKind) -> &ModelSpec {
    match kind {
        MoodKind::Approachability => &config.approachability,
        MoodKind::Engagement => &config.engagement,
        MoodKind::Danceability => &config.danceability,
        MoodKind::Aggressiveness => &config.aggressiveness,
        MoodKind::Happiness => &config.happiness,
        MoodKind::Party => &config.party,
        MoodKind::Relaxed => &config.relaxed,
        MoodKind::Sadness => &config.sadness,
        MoodKind::Electronic => &config.electronic,
        MoodKind::Acoustic => &config.acoustic,
    }
}
