//! Majority-vote smoothing over recent classifications.

use crate::core::buffers::RollingBuffer;
use crate::core::classifier::EmotionalState;

/// Default number of classifications in the vote.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Smooths raw classifications by majority vote over a rolling window.
#[derive(Debug, Clone)]
pub struct StateSmoother {
    history: RollingBuffer<(EmotionalState, f64)>,
}

impl Default for StateSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_WINDOW)
    }
}

impl StateSmoother {
    pub fn new(window: usize) -> Self {
        Self {
            history: RollingBuffer::new(window),
        }
    }

    /// Add a raw classification and return the smoothed state and confidence.
    ///
    /// Ties go to whichever tied state appeared most recently. The smoothed
    /// confidence is the mean confidence of the entries voting for the winner.
    pub fn push(&mut self, state: EmotionalState, confidence: f64) -> (EmotionalState, f64) {
        self.history.push((state, confidence));

        let mut votes = [0usize; EmotionalState::ALL.len()];
        let mut last_seen = [0usize; EmotionalState::ALL.len()];
        for (position, (s, _)) in self.history.iter().enumerate() {
            votes[s.index()] += 1;
            last_seen[s.index()] = position;
        }

        let winner = EmotionalState::ALL
            .iter()
            .copied()
            .filter(|s| votes[s.index()] > 0)
            .max_by_key(|s| (votes[s.index()], last_seen[s.index()]))
            .unwrap_or(state);

        let (sum, count) = self
            .history
            .iter()
            .filter(|(s, _)| *s == winner)
            .fold((0.0, 0usize), |(sum, count), (_, c)| (sum + c, count + 1));
        let confidence = if count == 0 { 0.0 } else { sum / count as f64 };

        (winner, confidence)
    }

    /// Raw classifications currently in the window, oldest first.
    pub fn history(&self) -> Vec<EmotionalState> {
        self.history.iter().map(|(s, _)| *s).collect()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use EmotionalState::*;

    #[test]
    fn test_single_reading_passes_through() {
        let mut smoother = StateSmoother::default();
        assert_eq!(smoother.push(Focused, 0.6), (Focused, 0.6));
    }

    #[test]
    fn test_majority_wins() {
        let mut smoother = StateSmoother::default();
        smoother.push(Calm, 0.5);
        smoother.push(Calm, 0.7);
        smoother.push(Stressed, 0.9);
        let (state, confidence) = smoother.push(Calm, 0.6);

        assert_eq!(state, Calm);
        assert!((confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_tie_goes_to_most_recent() {
        let mut smoother = StateSmoother::default();
        smoother.push(Calm, 0.5);
        smoother.push(Focused, 0.5);
        smoother.push(Calm, 0.5);
        let (state, _) = smoother.push(Focused, 0.8);
        assert_eq!(state, Focused);
    }

    #[test]
    fn test_window_evicts_old_votes() {
        let mut smoother = StateSmoother::new(5);
        for _ in 0..3 {
            smoother.push(Anxious, 0.5);
        }
        for _ in 0..4 {
            smoother.push(Focused, 0.7);
        }
        assert_eq!(smoother.len(), 5);
        assert_eq!(smoother.history(), vec![Anxious, Focused, Focused, Focused, Focused]);

        let (state, _) = smoother.push(Anxious, 0.9);
        assert_eq!(state, Focused);

        smoother.clear();
        assert!(smoother.is_empty());
    }
}
