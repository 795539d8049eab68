//! Error types used by the bus, modules and the pipeline runner.
//!
//! This module defines the full error taxonomy:
//!
//! - [`ConfigError`] — setup-time binding mistakes, fatal to startup.
//! - [`DispatchError`] — receiver failures surfaced through `dispatch`.
//! - [`ValidationError`] — unsatisfied data requirements found at a checkpoint.
//! - [`ModuleError`] — errors raised by individual module executions.
//! - [`PipelineError`] — run-level errors raised by the pipeline runner.
//!
//! All variants carry the implicated module name, message type and channel so
//! the cause is diagnosable without stepping through bus internals. Each enum
//! provides `as_label` returning a short stable label for logs/metrics.

use thiserror::Error;

use crate::bus::{Scope, UnsatisfiedBinding};

/// Boxed error payload returned by listener callbacks.
///
/// Listeners report failures as an opaque boxed error; the bus wraps it into
/// [`DispatchError::Receiver`] together with the binding context.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// # Errors raised while configuring bindings.
///
/// These represent mistakes in the setup phase, before any simulation work
/// runs. They are fatal to startup: a pipeline with a broken binding table
/// must not execute a single cycle.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The same (module, message type, channel) tuple was declared REQUIRED twice.
    ///
    /// A duplicate required binding means the same data dependency was
    /// declared twice, which is a configuration mistake. Duplicate OPTIONAL
    /// bindings are permitted and tracked independently.
    #[error("duplicate required binding: module '{module}' already requires {message_type} on channel '{channel}'")]
    DuplicateRequired {
        /// Name of the module that declared the binding.
        module: String,
        /// Full type name of the bound message type.
        message_type: &'static str,
        /// Channel the binding was declared on (empty = default channel).
        channel: String,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use simbus::ConfigError;
    ///
    /// let err = ConfigError::DuplicateRequired {
    ///     module: "writer".into(),
    ///     message_type: "Hit",
    ///     channel: String::new(),
    /// };
    /// assert_eq!(err.as_label(), "config_duplicate_required");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::DuplicateRequired { .. } => "config_duplicate_required",
        }
    }
}

/// # Errors raised while dispatching a message.
///
/// The bus performs no isolation or recovery between receivers: the first
/// listener that fails aborts the dispatch call, and the error propagates
/// synchronously to the producing module.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A listener callback returned an error while processing a message.
    #[error("receiver '{module}' failed for {message_type} on channel '{channel}': {source}")]
    Receiver {
        /// Name of the module whose listener failed.
        module: String,
        /// Full type name of the dispatched message.
        message_type: &'static str,
        /// Channel the message was dispatched on (empty = default channel).
        channel: String,
        /// The listener's own error.
        #[source]
        source: BoxError,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Receiver { .. } => "dispatch_receiver_failed",
        }
    }
}

/// # Errors raised at a requirement-validation checkpoint.
///
/// Produced by `Bus::check_requirements`; never raised mid-dispatch.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ValidationError {
    /// At least one REQUIRED binding received zero matching dispatches
    /// within the validation scope.
    #[error("unsatisfied required bindings ({scope} scope): [{}]", list_unsatisfied(.bindings))]
    Unsatisfied {
        /// The scope that was checked.
        scope: Scope,
        /// Every required binding left unsatisfied, in registration order.
        bindings: Vec<UnsatisfiedBinding>,
    },

    /// `Scope::Run` was queried but run-scoped satisfaction tracking is
    /// disabled in the bus configuration.
    #[error("run-scope validation requested but run tracking is disabled")]
    RunScopeDisabled,
}

impl ValidationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ValidationError::Unsatisfied { .. } => "validation_unsatisfied",
            ValidationError::RunScopeDisabled => "validation_run_scope_disabled",
        }
    }
}

fn list_unsatisfied(bindings: &[UnsatisfiedBinding]) -> String {
    bindings
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// # Errors produced by module execution.
///
/// These represent failures of individual modules driven by the pipeline.
/// Dispatch failures convert implicitly so module code can use `?` on
/// `Bus::dispatch` calls.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ModuleError {
    /// A dispatch issued by this module failed in one of its receivers.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Module execution failed for a module-specific reason.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl ModuleError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use simbus::ModuleError;
    ///
    /// let err = ModuleError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "module_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ModuleError::Dispatch(_) => "module_dispatch_failed",
            ModuleError::Fail { .. } => "module_failed",
        }
    }
}

/// # Errors produced by the pipeline runner.
///
/// These wrap module and validation failures with the run context (which
/// module, which event) so a failed run is diagnosable from the error alone.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A module failed while processing an event.
    #[error("module '{module}' failed during event {event}: {source}")]
    Module {
        /// Name of the failing module.
        module: String,
        /// Event number being processed (1-based).
        event: u64,
        /// The module's own error.
        #[source]
        source: ModuleError,
    },

    /// A requirement-validation checkpoint failed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A module failed in its finalize hook, after the last event.
    #[error("module '{module}' failed during finalization: {source}")]
    Finalize {
        /// Name of the failing module.
        module: String,
        /// The module's own error.
        #[source]
        source: ModuleError,
    },
}

impl PipelineError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            PipelineError::Module { .. } => "pipeline_module_failed",
            PipelineError::Validation(_) => "pipeline_validation_failed",
            PipelineError::Finalize { .. } => "pipeline_finalize_failed",
        }
    }
}
