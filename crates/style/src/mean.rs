use crate::AnalysisError;

/// Element-wise arithmetic mean of `vectors`, each of length `dimension`.
///
/// Accumulates in `f64` so the mean of N identical vectors is bit-for-bit the
/// vector itself.
pub fn mean_embedding(vectors: &[Vec<f32>], dimension: usize) -> Result<Vec<f32>, AnalysisError> {
    if vectors.is_empty() {
        return Err(AnalysisError::NoSamples);
    }

    let mut sums = vec![0f64; dimension];
    for vector in vectors {
        if vector.len() != dimension {
            return Err(AnalysisError::DimensionMismatch {
                expected: dimension,
                got: vector.len(),
            });
        }
        for (sum, value) in sums.iter_mut().zip(vector) {
            *sum += f64::from(*value);
        }
    }

    let count = vectors.len() as f64;
    Ok(sums.into_iter().map(|sum| (sum / count) as f32).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_two_vectors() {
        let mean = mean_embedding(&[vec![1.0, 2.0, 3.0], vec![3.0, 4.0, 5.0]], 3).unwrap();
        assert_eq!(mean, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn single_vector_is_identity() {
        let v = vec![0.123_456_7f32, -0.987_654_3, 1e-7];
        assert_eq!(mean_embedding(&[v.clone()], 3).unwrap(), v);
    }

    #[test]
    fn repeated_vector_is_identity() {
        let v: Vec<f32> = (0..768).map(|i| ((i as f32) * 0.37).sin()).collect();
        let repeated = vec![v.clone(); 3];
        assert_eq!(mean_embedding(&repeated, 768).unwrap(), v);
    }

    #[test]
    fn empty_input_has_no_mean() {
        assert!(matches!(
            mean_embedding(&[], 4),
            Err(AnalysisError::NoSamples)
        ));
    }

    #[test]
    fn mismatched_length_is_rejected() {
        let err = mean_embedding(&[vec![1.0, 2.0], vec![1.0]], 2).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::DimensionMismatch {
                expected: 2,
                got: 1
            }
        ));
    }
}
