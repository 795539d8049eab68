//! # Global runtime configuration.
//!
//! Provides [`Config`], centralized settings for the bus and pipeline runtime.
//!
//! Config is used in two ways:
//! 1. **Bus creation**: `Bus::new(config)`
//! 2. **Pipeline creation**: `Pipeline::new(config)` (owns the bus)
//!
//! ## Field semantics
//! - `track_run_satisfaction`: enables the run-scoped satisfaction flag so
//!   `Scope::Run` can be validated ("required at least once over the entire run")
//! - `validation`: when the pipeline checks requirements (per cycle, end of run,
//!   or not at all)
//!
//! Prefer [`Config::run_tracking_enabled`] over reading the flag directly:
//! an end-of-run validation policy implies run tracking even when the flag
//! is left unset.

/// Global configuration for the bus and pipeline runtime.
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// re-deriving implied settings across the codebase.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Tracks, per required binding, whether it was satisfied at least once
    /// over the entire run (a second flag that is never reset by
    /// `begin_cycle`).
    ///
    /// - `false` = only per-cycle satisfaction is queryable (the common case)
    /// - `true` = `Scope::Run` validation is also available
    pub track_run_satisfaction: bool,

    /// When the pipeline runner checks requirements.
    ///
    /// Can be overridden by driving the bus manually with
    /// `Bus::check_requirements`.
    pub validation: ValidationPolicy,
}

impl Config {
    /// Returns whether run-scoped satisfaction is tracked.
    ///
    /// `ValidationPolicy::EndOfRun` implies run tracking: the end-of-run
    /// checkpoint is a run-scope query, so the flag is treated as set.
    #[inline]
    pub fn run_tracking_enabled(&self) -> bool {
        self.track_run_satisfaction || self.validation == ValidationPolicy::EndOfRun
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `track_run_satisfaction = false` (per-cycle requirements only)
    /// - `validation = ValidationPolicy::PerCycle` (check after every cycle)
    fn default() -> Self {
        Self {
            track_run_satisfaction: false,
            validation: ValidationPolicy::PerCycle,
        }
    }
}

/// Policy controlling when the pipeline runner validates requirements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// Check after every cycle; an unsatisfied requirement fails that cycle
    /// and aborts the run (default).
    PerCycle,
    /// Check once after the last cycle, against the run-scoped flags.
    /// Implies run tracking.
    EndOfRun,
    /// Never check automatically; the caller drives
    /// `Bus::check_requirements` itself.
    Disabled,
}

impl Default for ValidationPolicy {
    /// Returns [`ValidationPolicy::PerCycle`].
    fn default() -> Self {
        ValidationPolicy::PerCycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.track_run_satisfaction);
        assert_eq!(config.validation, ValidationPolicy::PerCycle);
        assert!(!config.run_tracking_enabled());
    }

    #[test]
    fn test_end_of_run_implies_run_tracking() {
        let config = Config {
            track_run_satisfaction: false,
            validation: ValidationPolicy::EndOfRun,
        };
        assert!(
            config.run_tracking_enabled(),
            "end-of-run validation must force run tracking"
        );
    }

    #[test]
    fn test_explicit_run_tracking() {
        let config = Config {
            track_run_satisfaction: true,
            validation: ValidationPolicy::Disabled,
        };
        assert!(config.run_tracking_enabled());
    }
}
