//! Summary statistics over a series of timed trials

use std::time::Duration;

/// Outcome of a single trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Trial {
    pub elapsed: Duration,
    /// Net bytes still allocated after the trial, relative to before it
    pub memory_delta: i64,
}

/// Mean, spread and extremes of a series of trials, times in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub runs: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator), 0 for a single run
    pub stdev: f64,
    pub best: f64,
    pub worst: f64,
    /// Mean memory delta in bytes
    pub memory: f64,
}

impl Summary {
    /// Summarizes the given trials, or `None` if there are none
    pub fn from_trials(trials: &[Trial]) -> Option<Self> {
        if trials.is_empty() {
            return None;
        }

        let times: Vec<f64> = trials.iter().map(|t| t.elapsed.as_secs_f64()).collect();
        let runs = times.len();
        let mean = times.iter().sum::<f64>() / runs as f64;
        let stdev = if runs > 1 {
            let ss: f64 = times.iter().map(|t| (t - mean).powi(2)).sum();
            (ss / (runs - 1) as f64).sqrt()
        } else {
            0.0
        };
        let best = times.iter().copied().fold(f64::INFINITY, f64::min);
        let worst = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let memory = trials.iter().map(|t| t.memory_delta as f64).sum::<f64>() / runs as f64;

        Some(Self {
            runs,
            mean,
            stdev,
            best,
            worst,
            memory,
        })
    }

    /// Baseline mean divided by this mean
    pub fn speedup_over(&self, baseline: &Summary) -> f64 {
        if self.mean > 0.0 {
            baseline.mean / self.mean
        } else {
            f64::INFINITY
        }
    }

    /// Speedup divided by the number of workers used
    pub fn efficiency_over(&self, baseline: &Summary, workers: usize) -> f64 {
        self.speedup_over(baseline) / workers.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(ms: u64, memory_delta: i64) -> Trial {
        Trial {
            elapsed: Duration::from_millis(ms),
            memory_delta,
        }
    }

    #[test]
    fn test_summary() {
        let s = Summary::from_trials(&[trial(100, 10), trial(200, 20), trial(300, 30)]).unwrap();
        assert_eq!(s.runs, 3);
        assert!((s.mean - 0.2).abs() < 1e-12);
        assert!((s.stdev - 0.1).abs() < 1e-12);
        assert!((s.best - 0.1).abs() < 1e-12);
        assert!((s.worst - 0.3).abs() < 1e-12);
        assert!((s.memory - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_and_empty() {
        let s = Summary::from_trials(&[trial(50, -8)]).unwrap();
        assert_eq!(s.stdev, 0.0);
        assert_eq!(s.best, s.worst);
        assert_eq!(s.memory, -8.0);
        assert!(Summary::from_trials(&[]).is_none());
    }

    #[test]
    fn test_speedup() {
        let base = Summary::from_trials(&[trial(400, 0)]).unwrap();
        let fast = Summary::from_trials(&[trial(100, 0)]).unwrap();
        assert!((fast.speedup_over(&base) - 4.0).abs() < 1e-12);
        assert!((fast.efficiency_over(&base, 8) - 0.5).abs() < 1e-12);
    }
}
