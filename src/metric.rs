//! Scoring a candidate vector against a query vector.

use std::fmt;

/// A way of comparing two vectors in the store's representation.
///
/// Scores from different metrics are not comparable: dot products grow
/// with similarity, Hamming distances shrink.
pub trait DistanceMetric {
    /// One storage element: an f32 component or a word of packed bits.
    type Element: Copy + Default + fmt::Debug;
    type Score: Copy + PartialOrd + fmt::Debug + fmt::Display;

    fn score(query: &[Self::Element], candidate: &[Self::Element]) -> Self::Score;

    /// Strict: equal scores never displace an earlier candidate.
    fn is_better(candidate: Self::Score, current: Self::Score) -> bool;

    /// Score an empty top-N slot starts with.
    fn worst_sentinel(dimension: usize) -> Self::Score;
}

/// Dot product over unit vectors, i.e. cosine similarity. Higher is better.
#[derive(Debug, Clone, Copy)]
pub struct ContinuousDot;

impl DistanceMetric for ContinuousDot {
    type Element = f32;
    type Score = f32;

    #[inline]
    fn score(query: &[f32], candidate: &[f32]) -> f32 {
        query.iter().zip(candidate).map(|(q, c)| q * c).sum()
    }

    #[inline]
    fn is_better(candidate: f32, current: f32) -> bool {
        candidate > current
    }

    fn worst_sentinel(_dimension: usize) -> f32 {
        0.0
    }
}

/// Number of differing bits between packed vectors. Lower is better.
#[derive(Debug, Clone, Copy)]
pub struct BitwiseHamming;

impl DistanceMetric for BitwiseHamming {
    type Element = u64;
    type Score = usize;

    #[inline]
    fn score(query: &[u64], candidate: &[u64]) -> usize {
        query
            .iter()
            .zip(candidate)
            .map(|(q, c)| (q ^ c).count_ones() as usize)
            .sum()
    }

    #[inline]
    fn is_better(candidate: usize, current: usize) -> bool {
        candidate < current
    }

    fn worst_sentinel(dimension: usize) -> usize {
        dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_product() {
        assert_eq!(ContinuousDot::score(&[1.0, 2.0, -1.0], &[0.5, 0.5, 2.0]), -0.5);
        assert!(ContinuousDot::is_better(0.3, 0.2));
        assert!(!ContinuousDot::is_better(0.2, 0.2));
        assert!(!ContinuousDot::is_better(f32::NAN, 0.0));
        assert_eq!(ContinuousDot::worst_sentinel(300), 0.0);
    }

    #[test]
    fn hamming_distance_spans_words() {
        let a = [0b1011u64, u64::MAX];
        let b = [0b0001u64, 0];
        assert_eq!(BitwiseHamming::score(&a, &b), 2 + 64);
        assert_eq!(BitwiseHamming::score(&a, &a), 0);
        assert!(BitwiseHamming::is_better(3, 4));
        assert!(!BitwiseHamming::is_better(4, 4));
        assert_eq!(BitwiseHamming::worst_sentinel(70), 70);
    }
}
