use serde::{Deserialize, Serialize};

/// A face embedding vector.
///
/// Serialized as a bare JSON array so precomputed references can be
/// written by other tools.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    /// Builds an embedding scaled to unit length.
    pub fn normalized(mut values: Vec<f32>) -> Self {
        l2_normalize(&mut values);
        Self(values)
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean distance. Embeddings of different dimensionality are
    /// infinitely far apart so they can never match.
    pub fn distance(&self, other: &Embedding) -> f64 {
        if self.0.len() != other.0.len() {
            return f64::INFINITY;
        }
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| {
                let d = *a as f64 - *b as f64;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_l2_normalize_unit_vector() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert_relative_eq!(v[0], 0.6, epsilon = 1e-6);
        assert_relative_eq!(v[1], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_l2_normalize_zero_vector() {
        let mut v = vec![0.0, 0.0, 0.0];
        l2_normalize(&mut v);
        assert_eq!(v, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_distance_identical_is_zero() {
        let a = Embedding::new(vec![0.25, 0.5, 0.75]);
        assert_relative_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn test_distance_euclidean() {
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![3.0, 4.0]);
        assert_relative_eq!(a.distance(&b), 5.0);
    }

    #[test]
    fn test_distance_dimension_mismatch_is_infinite() {
        let a = Embedding::new(vec![0.0, 0.0]);
        let b = Embedding::new(vec![0.0, 0.0, 0.0]);
        assert!(a.distance(&b).is_infinite());
    }

    #[test]
    fn test_normalized_has_unit_length() {
        let e = Embedding::normalized(vec![1.0, 2.0, 2.0]);
        let len: f32 = e.values().iter().map(|x| x * x).sum::<f32>().sqrt();
        assert_relative_eq!(len, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_json_is_bare_array() {
        let e: Embedding = serde_json::from_str("[0.5, -0.25]").unwrap();
        assert_eq!(e.values(), &[0.5, -0.25]);
        assert_eq!(serde_json::to_string(&e).unwrap(), "[0.5,-0.25]");
    }
}
