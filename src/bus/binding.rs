//! # Binding options, requirement levels and per-binding bookkeeping.
//!
//! Every bind/register call files one [`BindingRecord`]: who bound what
//! message type on which channel, at which requirement level, and whether the
//! binding was satisfied during the current cycle and during the run. Records
//! are used only for requirement validation, never for dispatch.
//!
//! ## Satisfaction flags
//! ```text
//! dispatch ──► delegate invoked ──► record.mark_satisfied()
//!                                      ├─ cycle flag (reset by begin_cycle)
//!                                      └─ run flag   (never reset)
//! ```
//!
//! ## Example
//! ```rust
//! use simbus::{Binding, Requirement};
//!
//! let binding = Binding::new().on_channel("dut").required();
//! assert_eq!(binding.channel(), "dut");
//! assert_eq!(binding.requirement(), Requirement::Required);
//!
//! // Default: default channel (wildcard receiver), optional.
//! let binding = Binding::new();
//! assert_eq!(binding.channel(), "");
//! assert_eq!(binding.requirement(), Requirement::Optional);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::messages::MessageType;

/// Requirement level of a binding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    /// The binding must receive at least one matching dispatch per validation
    /// scope; otherwise the run fails at the next checkpoint.
    Required,
    /// No obligation: the bound slot may remain empty indefinitely (default).
    Optional,
}

impl Default for Requirement {
    /// Returns [`Requirement::Optional`].
    fn default() -> Self {
        Requirement::Optional
    }
}

/// Validation scope queried through `Bus::check_requirements`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Satisfied within the current cycle (flags reset by `begin_cycle`).
    Cycle,
    /// Satisfied at least once since the bus was created. Only queryable when
    /// run tracking is enabled in the configuration.
    Run,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Cycle => f.write_str("cycle"),
            Scope::Run => f.write_str("run"),
        }
    }
}

/// Options for a bind/register call.
///
/// Built in the chained style; the default is the default channel (which makes
/// the receiver a wildcard across all channels of its type) at
/// [`Requirement::Optional`] level.
#[derive(Clone, Debug, Default)]
pub struct Binding {
    channel: String,
    requirement: Requirement,
}

impl Binding {
    /// Creates the default options: default channel, optional.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the binding to one named channel.
    ///
    /// A receiver bound to a named channel sees only messages dispatched on
    /// exactly that channel; one bound to the default channel (`""`) sees
    /// messages dispatched on any channel of the matching type.
    pub fn on_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }

    /// Upgrades the binding to [`Requirement::Required`].
    pub fn required(mut self) -> Self {
        self.requirement = Requirement::Required;
        self
    }

    /// Returns the bound channel (empty = default channel).
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Returns the requirement level.
    pub fn requirement(&self) -> Requirement {
        self.requirement
    }
}

/// Binding discipline tag, kept on records for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Discipline {
    Listener,
    SingleBind,
    MultiBind,
}

/// One required binding left unsatisfied at a validation checkpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnsatisfiedBinding {
    /// Name of the module that declared the binding.
    pub module: String,
    /// Identity tag of the bound message type.
    pub message_type: MessageType,
    /// Channel the binding was declared on (empty = default channel).
    pub channel: String,
}

impl fmt::Display for UnsatisfiedBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "module '{}' requires {} on channel '{}'",
            self.module, self.message_type, self.channel
        )
    }
}

/// Bookkeeping entry for one bind/register call.
///
/// Satisfaction flags use atomics because they are written during dispatch,
/// which runs behind a shared bus reference.
#[derive(Debug)]
pub(crate) struct BindingRecord {
    module: String,
    message_type: MessageType,
    channel: String,
    requirement: Requirement,
    discipline: Discipline,
    cycle_satisfied: AtomicBool,
    run_satisfied: AtomicBool,
}

impl BindingRecord {
    pub(crate) fn new(
        module: String,
        message_type: MessageType,
        binding: &Binding,
        discipline: Discipline,
    ) -> Self {
        Self {
            module,
            message_type,
            channel: binding.channel.clone(),
            requirement: binding.requirement,
            discipline,
            cycle_satisfied: AtomicBool::new(false),
            run_satisfied: AtomicBool::new(false),
        }
    }

    pub(crate) fn module(&self) -> &str {
        &self.module
    }

    pub(crate) fn message_type(&self) -> MessageType {
        self.message_type
    }

    pub(crate) fn channel(&self) -> &str {
        &self.channel
    }

    pub(crate) fn requirement(&self) -> Requirement {
        self.requirement
    }

    pub(crate) fn discipline(&self) -> Discipline {
        self.discipline
    }

    /// Marks the record satisfied for the current cycle and for the run.
    pub(crate) fn mark_satisfied(&self) {
        self.cycle_satisfied.store(true, Ordering::Relaxed);
        self.run_satisfied.store(true, Ordering::Relaxed);
    }

    /// Resets the per-cycle flag; the run flag is never reset.
    pub(crate) fn reset_cycle(&self) {
        self.cycle_satisfied.store(false, Ordering::Relaxed);
    }

    pub(crate) fn satisfied(&self, scope: Scope) -> bool {
        match scope {
            Scope::Cycle => self.cycle_satisfied.load(Ordering::Relaxed),
            Scope::Run => self.run_satisfied.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn to_unsatisfied(&self) -> UnsatisfiedBinding {
        UnsatisfiedBinding {
            module: self.module.clone(),
            message_type: self.message_type,
            channel: self.channel.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Message;

    #[derive(Debug)]
    struct Hit;
    impl Message for Hit {}

    fn record(binding: &Binding) -> BindingRecord {
        BindingRecord::new(
            "probe".into(),
            MessageType::of::<Hit>(),
            binding,
            Discipline::SingleBind,
        )
    }

    #[test]
    fn test_binding_defaults() {
        let binding = Binding::new();
        assert_eq!(binding.channel(), "");
        assert_eq!(binding.requirement(), Requirement::Optional);
    }

    #[test]
    fn test_binding_chain() {
        let binding = Binding::new().on_channel("telescope").required();
        assert_eq!(binding.channel(), "telescope");
        assert_eq!(binding.requirement(), Requirement::Required);
    }

    #[test]
    fn test_cycle_flag_resets_run_flag_persists() {
        let record = record(&Binding::new().required());
        assert!(!record.satisfied(Scope::Cycle));
        assert!(!record.satisfied(Scope::Run));

        record.mark_satisfied();
        assert!(record.satisfied(Scope::Cycle));
        assert!(record.satisfied(Scope::Run));

        record.reset_cycle();
        assert!(
            !record.satisfied(Scope::Cycle),
            "cycle flag must reset at cycle start"
        );
        assert!(
            record.satisfied(Scope::Run),
            "run flag must never be reset"
        );
    }

    #[test]
    fn test_unsatisfied_display_names_the_tuple() {
        let record = record(&Binding::new().on_channel("dut").required());
        let unsatisfied = record.to_unsatisfied();
        let text = unsatisfied.to_string();
        assert!(text.contains("probe"));
        assert!(text.contains("Hit"));
        assert!(text.contains("dut"));
    }
}
