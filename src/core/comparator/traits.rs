//! Trait definitions for comparison strategies.

/// Strategy trait for deciding whether two hashes are similar
pub trait ComparisonStrategy: Send + Sync {
    /// Whether two images this many bits apart belong together
    fn is_similar(&self, distance: u32) -> bool;
}

/// Default Hamming distance below which images count as duplicates
pub const DEFAULT_THRESHOLD: u32 = 8;

/// Simple threshold-based comparison strategy
#[derive(Debug, Clone)]
pub struct ThresholdStrategy {
    /// Distances strictly below this are similar
    threshold: u32,
}

impl ThresholdStrategy {
    /// Create a new threshold strategy
    ///
    /// - 4: Conservative, near-identical copies only
    /// - 8: Balanced (default, about 12% of the bits)
    /// - 12: Permissive, catches more edits
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl ComparisonStrategy for ThresholdStrategy {
    fn is_similar(&self, distance: u32) -> bool {
        distance < self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_exclusive() {
        let strategy = ThresholdStrategy::new(5);

        assert!(strategy.is_similar(4));
        assert!(!strategy.is_similar(5));
        assert!(!strategy.is_similar(6));
    }

    #[test]
    fn zero_threshold_matches_nothing() {
        assert!(!ThresholdStrategy::new(0).is_similar(0));
    }

    #[test]
    fn default_is_eight() {
        let strategy = ThresholdStrategy::default();

        assert!(strategy.is_similar(7));
        assert!(!strategy.is_similar(8));
    }
}
