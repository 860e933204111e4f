//! Mean pooling of per-frame model output.

use ndarray::{Array1, Array2, Axis};

/// Average the frame axis (axis 0) of a `[frames, classes]` matrix.
/// Frame order is discarded.
pub fn mean_pool(frames: &Array2<f32>) -> Option<Array1<f32>> {
    if frames.nrows() == 0 {
        return None;
    }
    frames.mean_axis(Axis(0))
}

/// Index of the largest value; the first one wins on ties.
pub fn argmax(values: &Array1<f32>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Reshape a flat model output into `[frames, classes]`. A leading batch
/// axis of size 1 is dropped; a rank-1 output is one frame.
pub fn to_frames(dims: &[usize], data: Vec<f32>) -> Result<Array2<f32>, String> {
    let (rows, cols) = match dims {
        [n] => (1, *n),
        [rows, cols] => (*rows, *cols),
        [1, rows, cols] => (*rows, *cols),
        other => return Err(format!("unexpected output shape {:?}", other)),
    };
    Array2::from_shape_vec((rows, cols), data).map_err(|e| format!("output shape error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_mean_pool() {
        let frames = array![[0.2f32, 0.8], [0.4, 0.6], [0.6, 0.4]];
        let pooled = mean_pool(&frames).unwrap();
        assert!((pooled[0] - 0.4).abs() < 1e-6);
        assert!((pooled[1] - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_mean_pool_empty() {
        let frames = Array2::<f32>::zeros((0, 2));
        assert!(mean_pool(&frames).is_none());
    }

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&array![0.1f32, 0.5, 0.3]), Some(1));
        assert_eq!(argmax(&array![0.5f32, 0.5]), Some(0));
        assert_eq!(argmax(&array![f32::NAN, 0.2]), Some(1));
        assert_eq!(argmax(&Array1::<f32>::zeros(0)), None);
    }

    #[test]
    fn test_to_frames_shapes() {
        assert_eq!(to_frames(&[2, 2], vec![1.0, 2.0, 3.0, 4.0]).unwrap().dim(), (2, 2));
        assert_eq!(to_frames(&[1, 3, 2], vec![0.0; 6]).unwrap().dim(), (3, 2));
        assert_eq!(to_frames(&[4], vec![0.0; 4]).unwrap().dim(), (1, 4));
        assert!(to_frames(&[2, 2], vec![0.0; 3]).is_err());
        assert!(to_frames(&[2, 2, 2], vec![0.0; 8]).is_err());
    }
}
