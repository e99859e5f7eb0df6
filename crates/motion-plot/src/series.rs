use crate::color::Color;
use std::collections::VecDeque;

/// A named, colored, bounded sample buffer. The oldest sample is evicted
/// once `capacity` is reached.
#[derive(Debug, Clone)]
pub struct Series {
    name: String,
    color: Color,
    capacity: usize,
    samples: VecDeque<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, color: Color, capacity: usize) -> Self {
        Self {
            name: name.into(),
            color,
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Append a sample, evicting the oldest if full. With zero capacity
    /// nothing is stored.
    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Change the capacity, evicting the oldest samples if it shrinks.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        let excess = self.samples.len().saturating_sub(capacity);
        self.samples.drain(..excess);
        self.samples.shrink_to(capacity);
    }

    /// Samples from oldest to newest.
    pub fn samples(&self) -> impl ExactSizeIterator<Item = f64> + '_ {
        self.samples.iter().copied()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(series: &Series) -> Vec<f64> {
        series.samples().collect()
    }

    #[test]
    fn evicts_oldest_beyond_capacity() {
        let mut series = Series::new("x", Color::BLACK, 3);
        for v in [1.0, 2.0, 3.0, 4.0] {
            series.push(v);
        }
        assert_eq!(collect(&series), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn keeps_last_capacity_samples_in_order() {
        let capacity = 200;
        let mut series = Series::new("y", Color::BLACK, capacity);
        for k in [1, 7, 200, 451] {
            series.clear();
            for i in 0..capacity + k {
                series.push(i as f64);
            }
            assert_eq!(series.len(), capacity);
            let expected: Vec<f64> = (k..capacity + k).map(|i| i as f64).collect();
            assert_eq!(collect(&series), expected);
        }
    }

    #[test]
    fn shrinking_capacity_drops_oldest() {
        let mut series = Series::new("z", Color::BLACK, 5);
        for v in 0..5 {
            series.push(v as f64);
        }
        series.set_capacity(2);
        assert_eq!(collect(&series), vec![3.0, 4.0]);

        series.push(5.0);
        assert_eq!(collect(&series), vec![4.0, 5.0]);

        series.set_capacity(4);
        series.push(6.0);
        assert_eq!(collect(&series), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut series = Series::new("x", Color::BLACK, 0);
        series.push(1.0);
        assert!(series.is_empty());
    }
}
