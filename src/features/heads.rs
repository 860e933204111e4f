//! Mood/style classifier heads and the index each one is read at.
//!
//! Every mood head is a two-class softmax, but the class order is not the
//! same for all of them. The table below is the single place that says which
//! index carries the score we store.

use ndarray::Array1;

/// The ten continuous scores stored per song, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoodKind {
    Approachability,
    Engagement,
    Danceability,
    Aggressiveness,
    Happiness,
    Party,
    Relaxed,
    Sadness,
    Electronic,
    Acoustic,
}

impl MoodKind {
    pub const ALL: [MoodKind; 10] = [
        MoodKind::Approachability,
        MoodKind::Engagement,
        MoodKind::Danceability,
        MoodKind::Aggressiveness,
        MoodKind::Happiness,
        MoodKind::Party,
        MoodKind::Relaxed,
        MoodKind::Sadness,
        MoodKind::Electronic,
        MoodKind::Acoustic,
    ];

    pub fn column(self) -> &'static str {
        match self {
            MoodKind::Approachability => "approachability_score",
            MoodKind::Engagement => "engagement_score",
            MoodKind::Danceability => "danceability_score",
            MoodKind::Aggressiveness => "aggressiveness_score",
            MoodKind::Happiness => "happiness_score",
            MoodKind::Party => "party_score",
            MoodKind::Relaxed => "relaxed_score",
            MoodKind::Sadness => "sadness_score",
            MoodKind::Electronic => "electronic_score",
            MoodKind::Acoustic => "acoustic_score",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Where a head's score lives in its softmax output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodHead {
    pub kind: MoodKind,
    /// Index into the two-class output.
    pub index: usize,
    /// Class name the model's metadata must list at `index`.
    pub class: &'static str,
}

const fn head(kind: MoodKind, index: usize, class: &'static str) -> MoodHead {
    MoodHead { kind, index, class }
}

pub const MOOD_HEADS: [MoodHead; 10] = [
    head(MoodKind::Approachability, 1, "approachable"),
    head(MoodKind::Engagement, 1, "engaging"),
    head(MoodKind::Danceability, 0, "danceable"),
    head(MoodKind::Aggressiveness, 0, "aggressive"),
    head(MoodKind::Happiness, 0, "happy"),
    head(MoodKind::Party, 1, "party"),
    head(MoodKind::Relaxed, 1, "relaxed"),
    head(MoodKind::Sadness, 1, "sad"),
    head(MoodKind::Electronic, 0, "electronic"),
    head(MoodKind::Acoustic, 0, "acoustic"),
];

impl MoodHead {
    /// Compare against the class list shipped with the model.
    pub fn check_classes(&self, classes: &[String]) -> Result<(), String> {
        if classes.len() != 2 {
            return Err(format!(
                "{:?} head lists {} classes, expected 2",
                self.kind,
                classes.len()
            ));
        }
        match classes.get(self.index) {
            Some(class) if class == self.class => Ok(()),
            Some(class) => Err(format!(
                "{:?} head has '{}' at index {}, expected '{}'",
                self.kind, class, self.index, self.class
            )),
            None => Err(format!("{:?} head has no class at index {}", self.kind, self.index)),
        }
    }

    /// The stored score: the pooled value at the declared index, as is.
    pub fn read(&self, pooled: &Array1<f32>) -> Result<f64, String> {
        if pooled.len() != 2 {
            return Err(format!(
                "{:?} head produced {} values, expected 2",
                self.kind,
                pooled.len()
            ));
        }
        Ok(f64::from(pooled[self.index]))
    }
}

/// One value per [`MoodKind`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MoodScores([f64; 10]);

impl MoodScores {
    pub fn get(&self, kind: MoodKind) -> f64 {
        self.0[kind.slot()]
    }

    pub fn set(&mut self, kind: MoodKind, value: f64) {
        self.0[kind.slot()] = value;
    }

    /// Every score rounded to two decimal places.
    pub fn rounded(&self) -> Self {
        let mut out = *self;
        for value in out.0.iter_mut() {
            *value = round2(*value);
        }
        out
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
