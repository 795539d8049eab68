//! # Module abstraction for pipeline stages.
//!
//! This module defines the [`Module`] trait implemented by every processing
//! stage, and the shared handle type [`ModuleRef`] (`Arc<dyn Module>`) used by
//! the pipeline runner.
//!
//! A module declares its data dependencies in [`Module::attach`] (the only
//! place with mutable access to the bus, so binding is confined to the setup
//! phase by construction), does its per-event work in [`Module::run`], and may
//! flush results in [`Module::finalize`] after the last event.

use std::sync::Arc;

use crate::bus::Bus;
use crate::error::{ConfigError, ModuleError};

/// # A processing stage of the simulation pipeline.
///
/// A `Module` has a stable [`name`](Module::name) used in binding records and
/// error reports, and a run-spanning lifetime: the pipeline keeps every module
/// alive (behind an `Arc`) until the run completes, so delegates bound to it
/// never dangle.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use simbus::{Binding, Bus, ConfigError, Message, Module, ModuleError, MultiSlot};
///
/// #[derive(Debug)]
/// struct PixelHit {
///     address: u32,
/// }
/// impl Message for PixelHit {}
///
/// struct HitWriter {
///     hits: MultiSlot<PixelHit>,
/// }
///
/// impl Module for HitWriter {
///     fn name(&self) -> &str {
///         "hit_writer"
///     }
///
///     fn attach(module: &Arc<Self>, bus: &mut Bus) -> Result<(), ConfigError> {
///         bus.bind_multi(module, &module.hits, Binding::new().required())
///     }
///
///     fn run(&self, _bus: &Bus, _event: u64) -> Result<(), ModuleError> {
///         // consume self.hits.drain() ...
///         Ok(())
///     }
/// }
/// ```
pub trait Module: Send + Sync + 'static {
    /// Returns a stable, human-readable module name.
    ///
    /// The name identifies the module in binding records, validation reports
    /// and pipeline errors.
    fn name(&self) -> &str;

    /// Declares the module's bindings against the bus.
    ///
    /// Called once by the pipeline when the module is added, strictly before
    /// any cycle runs. The default binds nothing (pure producers need no
    /// bindings).
    fn attach(module: &Arc<Self>, bus: &mut Bus) -> Result<(), ConfigError>
    where
        Self: Sized,
    {
        let _ = (module, bus);
        Ok(())
    }

    /// Executes one cycle of this module.
    ///
    /// Producers dispatch messages here; consumers read their slots (and
    /// typically clear them first, since the bus never clears slots).
    /// `event` is the 1-based event number.
    fn run(&self, bus: &Bus, event: u64) -> Result<(), ModuleError>;

    /// Runs once after the last event, before the pipeline returns.
    ///
    /// The default does nothing.
    fn finalize(&self, bus: &Bus) -> Result<(), ModuleError> {
        let _ = bus;
        Ok(())
    }
}

/// Shared module handle used by the pipeline runner.
pub type ModuleRef = Arc<dyn Module>;
