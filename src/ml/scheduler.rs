//! Plateau learning-rate scheduler.
//!
//! Burn's `lr_scheduler` module only ships step-driven schedules, so the
//! metric-driven "reduce on plateau" policy lives here. The trainer feeds it
//! one validation metric per epoch and reads the learning rate back.

use serde::{Deserialize, Serialize};

/// Whether the monitored metric should go down (loss) or up (accuracy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateauMode {
    Min,
    Max,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateauConfig {
    pub mode: PlateauMode,
    /// Multiplier applied to the learning rate on a plateau
    pub factor: f64,
    /// Epochs without improvement tolerated before reducing
    pub patience: usize,
    /// Relative improvement required to count as "better"
    pub threshold: f64,
    /// Epochs to wait after a reduction before counting again
    pub cooldown: usize,
    pub min_lr: f64,
    /// Reductions smaller than this are skipped
    pub eps: f64,
}

impl Default for PlateauConfig {
    fn default() -> Self {
        Self {
            mode: PlateauMode::Max,
            factor: 0.2,
            patience: 0,
            threshold: 1e-4,
            cooldown: 0,
            min_lr: 0.0,
            eps: 1e-8,
        }
    }
}

/// Reduces the learning rate when the monitored metric stops improving.
#[derive(Debug, Clone)]
pub struct PlateauScheduler {
    config: PlateauConfig,
    lr: f64,
    best: f64,
    num_bad_epochs: usize,
    cooldown_counter: usize,
}

impl PlateauScheduler {
    pub fn new(initial_lr: f64, config: PlateauConfig) -> Self {
        let best = match config.mode {
            PlateauMode::Min => f64::INFINITY,
            PlateauMode::Max => f64::NEG_INFINITY,
        };
        Self {
            config,
            lr: initial_lr,
            best,
            num_bad_epochs: 0,
            cooldown_counter: 0,
        }
    }

    /// Current learning rate
    pub fn lr(&self) -> f64 {
        self.lr
    }

    /// Best metric seen so far
    pub fn best(&self) -> f64 {
        self.best
    }

    pub fn num_bad_epochs(&self) -> usize {
        self.num_bad_epochs
    }

    /// Record one epoch's metric. Returns true if the learning rate was reduced.
    pub fn step(&mut self, metric: f64) -> bool {
        if self.is_better(metric) {
            self.best = metric;
            self.num_bad_epochs = 0;
        } else {
            self.num_bad_epochs += 1;
        }

        if self.cooldown_counter > 0 {
            self.cooldown_counter -= 1;
            self.num_bad_epochs = 0;
        }

        if self.num_bad_epochs > self.config.patience {
            let reduced = self.reduce_lr();
            self.cooldown_counter = self.config.cooldown;
            self.num_bad_epochs = 0;
            return reduced;
        }
        false
    }

    fn reduce_lr(&mut self) -> bool {
        let new_lr = (self.lr * self.config.factor).max(self.config.min_lr);
        if self.lr - new_lr > self.config.eps {
            tracing::info!("Reducing learning rate {:.3e} -> {:.3e}", self.lr, new_lr);
            self.lr = new_lr;
            true
        } else {
            false
        }
    }

    fn is_better(&self, metric: f64) -> bool {
        let t = self.config.threshold;
        match self.config.mode {
            PlateauMode::Min => metric < self.best * (1.0 - t),
            PlateauMode::Max => metric > self.best * (1.0 + t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_max_mode_zero_patience_reduces_on_first_stall() {
        let mut s = PlateauScheduler::new(0.1, PlateauConfig::default());
        assert!(!s.step(0.50));
        assert!(!s.step(0.60));
        assert!(s.step(0.60));
        assert!(close(s.lr(), 0.02));
        assert!(close(s.best(), 0.60));
    }

    #[test]
    fn test_gain_below_threshold_is_not_improvement() {
        let mut s = PlateauScheduler::new(0.1, PlateauConfig::default());
        s.step(0.5);
        // 0.5 * (1 + 1e-4) = 0.50005
        assert!(s.step(0.50004));
        assert!(close(s.lr(), 0.02));
    }

    #[test]
    fn test_patience_delays_reduction() {
        let cfg = PlateauConfig { patience: 2, ..PlateauConfig::default() };
        let mut s = PlateauScheduler::new(1.0, cfg);
        s.step(0.5);
        assert!(!s.step(0.4));
        assert_eq!(s.num_bad_epochs(), 1);
        assert!(!s.step(0.4));
        assert!(s.step(0.4));
        assert!(close(s.lr(), 0.2));
        assert_eq!(s.num_bad_epochs(), 0);
    }

    #[test]
    fn test_min_mode() {
        let cfg = PlateauConfig { mode: PlateauMode::Min, factor: 0.5, ..PlateauConfig::default() };
        let mut s = PlateauScheduler::new(1.0, cfg);
        assert!(!s.step(2.0));
        assert!(!s.step(1.0));
        assert!(s.step(1.5));
        assert!(close(s.lr(), 0.5));
    }

    #[test]
    fn test_cooldown_holds_counter() {
        let cfg = PlateauConfig { cooldown: 1, ..PlateauConfig::default() };
        let mut s = PlateauScheduler::new(1.0, cfg);
        s.step(0.5);
        assert!(s.step(0.5)); // reduce, enter cooldown
        assert!(!s.step(0.5)); // cooldown swallows this stall
        assert!(s.step(0.5));
        assert!(close(s.lr(), 0.04));
    }

    #[test]
    fn test_min_lr_floor_and_eps() {
        let cfg = PlateauConfig { min_lr: 0.05, ..PlateauConfig::default() };
        let mut s = PlateauScheduler::new(0.1, cfg);
        s.step(0.5);
        assert!(s.step(0.5));
        assert!(close(s.lr(), 0.05));
        // Already at the floor: no further change
        assert!(!s.step(0.5));
        assert!(close(s.lr(), 0.05));
    }

    #[test]
    fn test_default_schedule_reaches_stop_threshold() {
        // lr 0.1 with factor 0.2 drops below 1e-5 after six stalls
        let mut s = PlateauScheduler::new(0.1, PlateauConfig::default());
        s.step(0.5);
        let mut stalls = 0;
        while s.lr() >= 1e-5 {
            s.step(0.5);
            stalls += 1;
        }
        assert_eq!(stalls, 6);
    }
}
