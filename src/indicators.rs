//! Rolling computations over daily series.

use std::collections::VecDeque;

/// Trailing simple moving average.
///
/// Until `period` values have been pushed the mean is taken over however
/// many values are available, so the first output equals the first input.
#[derive(Debug, Clone)]
pub struct RollingMean {
    window: VecDeque<f64>,
    period: usize,
    sum: f64,
}

impl RollingMean {
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            window: VecDeque::with_capacity(period),
            period,
            sum: 0.0,
        }
    }

    pub fn update(&mut self, value: f64) -> f64 {
        self.sum += value;
        self.window.push_back(value);
        if self.window.len() > self.period {
            self.sum -= self.window.pop_front().unwrap_or(0.0);
        }
        self.get()
    }

    pub fn get(&self) -> f64 {
        if self.window.is_empty() {
            0.0
        } else {
            self.sum / self.window.len() as f64
        }
    }
}

/// Rolling mean of a whole series, one output per input.
pub fn rolling_mean(values: &[f64], period: usize) -> Vec<f64> {
    let mut mean = RollingMean::new(period);
    values.iter().map(|v| mean.update(*v)).collect()
}

/// `out[i] = values[i + 1] - values[i]`; one element shorter than the input.
///
/// Decreasing counts produce negative differences rather than an error.
pub fn first_difference(values: &[u64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| w[1] as f64 - w[0] as f64)
        .collect()
}
