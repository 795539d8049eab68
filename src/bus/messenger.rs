//! # The bus: bind/register API, dispatch and requirement validation.
//!
//! [`Bus`] owns the delegate [`Registry`] and the binding records for the
//! lifetime of one simulation run.
//!
//! ## Architecture
//! ```text
//! setup phase (&mut Bus):                run phase (&Bus):
//!   register(module, callback)            dispatch(msg, channel)
//!   bind_single(module, slot)               ├─► registry lookup (ty, channel) ∪ (ty, "")
//!   bind_multi(module, slot)                ├─► deliver to each delegate, in order
//!        │                                  └─► mark binding records satisfied
//!        ▼                               begin_cycle (&mut Bus)  → reset cycle flags
//!   BindingRecord + Delegate             check_requirements(scope) → pass / fail
//! ```
//!
//! ## Rules
//! - **Phase separation is compile-time**: binds and `begin_cycle` take
//!   `&mut self`, dispatch and validation take `&self`. The registry cannot
//!   change while any dispatch is reachable, so run-time lookups need no lock.
//! - **Synchronous fan-out**: `dispatch` returns only after every matching
//!   delegate ran. The first failing listener aborts the call; no isolation,
//!   retry or reordering.
//! - **Deterministic order**: explicit-channel delegates before wildcard
//!   delegates, each list in registration order.
//! - **No subscribers is not an error**: a dispatch with no matching delegate
//!   is a silent no-op.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::{debug, trace, warn};

use crate::bus::binding::{Binding, BindingRecord, Discipline, Requirement, Scope};
use crate::bus::delegate::{Delegate, Target};
use crate::bus::registry::Registry;
use crate::config::Config;
use crate::error::{BoxError, ConfigError, DispatchError, ValidationError};
use crate::messages::{Message, MessageType, MultiSlot, SingleSlot};
use crate::pipeline::Module;

/// In-process publish/subscribe bus connecting pipeline modules.
///
/// Modules declare their data dependencies against the bus during setup and
/// exchange messages through it during execution; after each cycle the bus
/// reports whether every required dependency was actually satisfied.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use simbus::{Binding, Bus, Config, Message, Module, ModuleError, Scope, SingleSlot};
///
/// #[derive(Debug)]
/// struct Hit {
///     charge: u32,
/// }
/// impl Message for Hit {}
///
/// struct Writer {
///     hits: SingleSlot<Hit>,
/// }
/// impl Module for Writer {
///     fn name(&self) -> &str {
///         "writer"
///     }
///     fn run(&self, _bus: &Bus, _event: u64) -> Result<(), ModuleError> {
///         Ok(())
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let writer = Arc::new(Writer { hits: SingleSlot::new() });
///
/// let mut bus = Bus::new(Config::default());
/// bus.bind_single(&writer, &writer.hits, Binding::new().required())?;
///
/// bus.begin_cycle();
/// bus.dispatch(Hit { charge: 12 }, "")?;
///
/// bus.check_requirements(Scope::Cycle)?;
/// assert_eq!(writer.hits.latest().unwrap().charge, 12);
/// # Ok(())
/// # }
/// ```
pub struct Bus {
    config: Config,
    registry: Registry,
    records: Vec<BindingRecord>,
    cycle: u64,
    dispatches: AtomicU64,
    deliveries: AtomicU64,
}

impl Bus {
    /// Creates an empty bus for one simulation run.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: Registry::new(),
            records: Vec::new(),
            cycle: 0,
            dispatches: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
        }
    }

    /// Returns the bus configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the current cycle number (0 before the first `begin_cycle`).
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Returns the number of dispatch calls that reached at least one delegate.
    pub fn dispatches(&self) -> u64 {
        self.dispatches.load(Ordering::Relaxed)
    }

    /// Returns the total number of per-delegate deliveries.
    pub fn deliveries(&self) -> u64 {
        self.deliveries.load(Ordering::Relaxed)
    }

    // ---------------------------
    // Binding API (setup phase)
    // ---------------------------

    /// Attaches a listener callback: each matching dispatch invokes
    /// `callback(&module, message)` synchronously.
    ///
    /// The callback's error aborts the dispatch call that triggered it and
    /// propagates to the producer as [`DispatchError::Receiver`].
    pub fn register<M, R, F>(
        &mut self,
        module: &Arc<M>,
        callback: F,
        binding: Binding,
    ) -> Result<(), ConfigError>
    where
        M: Module,
        R: Message,
        F: Fn(&M, Arc<R>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let record = self.push_record::<R>(module.name(), &binding, Discipline::Listener)?;
        let target = Target::listener(Arc::clone(module), callback);
        self.attach::<R>(module.name(), record, &binding, target);
        Ok(())
    }

    /// Attaches a single-bind slot: each matching dispatch overwrites the slot
    /// with the latest message (last write wins within a cycle).
    pub fn bind_single<M, R>(
        &mut self,
        module: &Arc<M>,
        slot: &SingleSlot<R>,
        binding: Binding,
    ) -> Result<(), ConfigError>
    where
        M: Module,
        R: Message,
    {
        let record = self.push_record::<R>(module.name(), &binding, Discipline::SingleBind)?;
        let target = Target::single(slot.clone());
        self.attach::<R>(module.name(), record, &binding, target);
        Ok(())
    }

    /// Attaches a multi-bind slot: each matching dispatch appends the message
    /// to the slot's sequence, never overwriting earlier entries.
    pub fn bind_multi<M, R>(
        &mut self,
        module: &Arc<M>,
        slot: &MultiSlot<R>,
        binding: Binding,
    ) -> Result<(), ConfigError>
    where
        M: Module,
        R: Message,
    {
        let record = self.push_record::<R>(module.name(), &binding, Discipline::MultiBind)?;
        let target = Target::multi(slot.clone());
        self.attach::<R>(module.name(), record, &binding, target);
        Ok(())
    }

    fn push_record<R: Message>(
        &mut self,
        module: &str,
        binding: &Binding,
        discipline: Discipline,
    ) -> Result<usize, ConfigError> {
        let ty = MessageType::of::<R>();

        // The same dependency declared REQUIRED twice is a setup mistake;
        // fail before any simulation work runs.
        if binding.requirement() == Requirement::Required {
            let duplicate = self.records.iter().any(|r| {
                r.requirement() == Requirement::Required
                    && r.module() == module
                    && r.message_type() == ty
                    && r.channel() == binding.channel()
            });
            if duplicate {
                return Err(ConfigError::DuplicateRequired {
                    module: module.to_string(),
                    message_type: ty.name(),
                    channel: binding.channel().to_string(),
                });
            }
        }

        self.records
            .push(BindingRecord::new(module.to_string(), ty, binding, discipline));
        Ok(self.records.len() - 1)
    }

    fn attach<R: Message>(
        &mut self,
        module: &str,
        record: usize,
        binding: &Binding,
        target: Target,
    ) {
        let ty = MessageType::of::<R>();
        debug!(
            "bound {:?} for {} on channel '{}' ({:?}, module '{}')",
            self.records[record].discipline(),
            ty,
            binding.channel(),
            binding.requirement(),
            module,
        );
        self.registry.attach(
            ty,
            binding.channel(),
            Delegate::new(module.to_string(), record, target),
        );
    }

    // ---------------------------
    // Dispatch API (run phase)
    // ---------------------------

    /// Dispatches an owned message on the given channel (empty = default).
    pub fn dispatch<R: Message>(&self, message: R, channel: &str) -> Result<(), DispatchError> {
        self.dispatch_erased(Arc::new(message), channel)
    }

    /// Dispatches an already-shared message on the given channel.
    pub fn dispatch_shared<R: Message>(
        &self,
        message: Arc<R>,
        channel: &str,
    ) -> Result<(), DispatchError> {
        self.dispatch_erased(message, channel)
    }

    /// Dispatches a type-erased message handle on the given channel.
    ///
    /// Routing uses the concrete runtime type behind the handle, never the
    /// handle type itself: a value constructed as a specific message type and
    /// passed around as `Arc<dyn Message>` reaches exactly the delegates
    /// registered for that concrete type.
    pub fn dispatch_any(
        &self,
        message: Arc<dyn Message>,
        channel: &str,
    ) -> Result<(), DispatchError> {
        self.dispatch_erased(message, channel)
    }

    fn dispatch_erased(
        &self,
        message: Arc<dyn Message>,
        channel: &str,
    ) -> Result<(), DispatchError> {
        let ty = message.message_type();
        let mut delivered = 0u64;

        for delegate in self.registry.delegates_for(&ty, channel) {
            delegate
                .deliver(&message)
                .map_err(|source| DispatchError::Receiver {
                    module: delegate.module().to_string(),
                    message_type: ty.name(),
                    channel: channel.to_string(),
                    source,
                })?;
            self.records[delegate.record()].mark_satisfied();
            delivered += 1;
        }

        if delivered > 0 {
            self.dispatches.fetch_add(1, Ordering::Relaxed);
            self.deliveries.fetch_add(delivered, Ordering::Relaxed);
        }
        trace!(
            "dispatched {} on channel '{}' to {} delegate(s)",
            ty,
            channel,
            delivered
        );
        Ok(())
    }

    // ---------------------------
    // Validation API
    // ---------------------------

    /// Starts a new cycle: resets every per-cycle satisfaction flag and
    /// returns the new cycle number (1-based).
    pub fn begin_cycle(&mut self) -> u64 {
        for record in &self.records {
            record.reset_cycle();
        }
        self.cycle += 1;
        debug!("cycle {} started", self.cycle);
        self.cycle
    }

    /// Checks whether every REQUIRED binding was satisfied in the given scope.
    ///
    /// Fails iff at least one required binding received zero matching
    /// dispatches within the scope, listing the offending (module, message
    /// type, channel) tuples. Optional bindings never fail the check.
    /// `Scope::Run` requires run tracking to be enabled in the configuration.
    pub fn check_requirements(&self, scope: Scope) -> Result<(), ValidationError> {
        if scope == Scope::Run && !self.config.run_tracking_enabled() {
            return Err(ValidationError::RunScopeDisabled);
        }

        let unsatisfied: Vec<_> = self
            .records
            .iter()
            .filter(|r| r.requirement() == Requirement::Required && !r.satisfied(scope))
            .map(BindingRecord::to_unsatisfied)
            .collect();

        if unsatisfied.is_empty() {
            Ok(())
        } else {
            warn!(
                "{} required binding(s) unsatisfied in {} scope",
                unsatisfied.len(),
                scope
            );
            Err(ValidationError::Unsatisfied {
                scope,
                bindings: unsatisfied,
            })
        }
    }
}

impl Default for Bus {
    /// Returns a bus with the default [`Config`].
    fn default() -> Self {
        Self::new(Config::default())
    }
}
