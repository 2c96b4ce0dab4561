use std::collections::VecDeque;

use crate::models::Sample;

/// Bounded FIFO of the most recent samples shown on the live chart
#[derive(Debug, Clone)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
}

impl SampleWindow {
    /// Ten retained samples plus the one just appended
    pub const CAPACITY: usize = 11;

    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(Self::CAPACITY),
        }
    }

    /// Append a sample, evicting the oldest one when full
    pub fn push(&mut self, sample: Sample) {
        while self.samples.len() >= Self::CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Drop everything and keep only `sample`
    pub fn reset_to(&mut self, sample: Sample) {
        self.samples.clear();
        self.samples.push_back(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }
}

impl Default for SampleWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn sample(temperature: f64) -> Sample {
        Sample {
            timestamp: OffsetDateTime::UNIX_EPOCH,
            temperature,
        }
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut window = SampleWindow::new();
        for i in 0..50 {
            window.push(sample(i as f64));
            assert!(window.len() <= SampleWindow::CAPACITY);
        }
        assert_eq!(window.len(), SampleWindow::CAPACITY);
    }

    #[test]
    fn keeps_most_recent_in_arrival_order() {
        let mut window = SampleWindow::new();
        for i in 0..20 {
            window.push(sample(i as f64));
        }
        let temps: Vec<f64> = window.iter().map(|s| s.temperature).collect();
        let expected: Vec<f64> = (9..20).map(|i| i as f64).collect();
        assert_eq!(temps, expected);
        assert_eq!(window.latest().map(|s| s.temperature), Some(19.0));
    }

    #[test]
    fn reset_leaves_single_entry() {
        let mut window = SampleWindow::new();
        window.push(sample(1.0));
        window.push(sample(2.0));
        window.reset_to(sample(36.0));
        assert_eq!(window.len(), 1);
        assert_eq!(window.latest().map(|s| s.temperature), Some(36.0));
    }
}
