//! # Pipeline runner: drives modules through cycles over one bus.
//!
//! [`Pipeline`] owns the [`Bus`] and the ordered module list for one
//! simulation run. Modules are executed in insertion order, once per event;
//! requirement validation runs per the configured [`ValidationPolicy`].
//!
//! ## Architecture
//! ```text
//! Pipeline::add(module)  ──► Module::attach(&module, &mut bus)   (setup phase)
//!
//! Pipeline::run(events):                                         (run phase)
//!   for event in 1..=events:
//!     bus.begin_cycle()
//!     for module in modules: module.run(&bus, event)?
//!     [PerCycle]  bus.check_requirements(Scope::Cycle)?
//!   [EndOfRun]  bus.check_requirements(Scope::Run)?
//!   for module in modules: module.finalize(&bus)?
//! ```
//!
//! ## Rules
//! - Module order is insertion order; producers must be added before the
//!   consumers that depend on them within the same cycle.
//! - The first failure (module error, unsatisfied requirement) aborts the
//!   run; there is no partial-cycle rollback.

use std::sync::Arc;

use log::{debug, info};

use crate::bus::{Bus, Scope};
use crate::config::{Config, ValidationPolicy};
use crate::error::{ConfigError, PipelineError};
use crate::pipeline::module::{Module, ModuleRef};

/// Totals reported by a completed run.
#[derive(Clone, Copy, Debug)]
pub struct RunSummary {
    /// Number of events processed.
    pub events: u64,
    /// Dispatch calls that reached at least one delegate.
    pub dispatches: u64,
    /// Total per-delegate deliveries.
    pub deliveries: u64,
}

/// Ordered module chain executing over one bus.
///
/// ## Example
/// ```rust
/// use simbus::{Bus, Config, Message, Module, ModuleError, Pipeline};
///
/// #[derive(Debug)]
/// struct Trigger;
/// impl Message for Trigger {}
///
/// struct Source;
/// impl Module for Source {
///     fn name(&self) -> &str {
///         "source"
///     }
///     fn run(&self, bus: &Bus, _event: u64) -> Result<(), ModuleError> {
///         bus.dispatch(Trigger, "")?;
///         Ok(())
///     }
/// }
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut pipeline = Pipeline::new(Config::default());
/// pipeline.add(Source)?;
/// let summary = pipeline.run(10)?;
/// assert_eq!(summary.events, 10);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    bus: Bus,
    modules: Vec<ModuleRef>,
}

impl Pipeline {
    /// Creates an empty pipeline owning a fresh bus.
    pub fn new(config: Config) -> Self {
        Self {
            bus: Bus::new(config),
            modules: Vec::new(),
        }
    }

    /// Returns the bus, for manual dispatch or validation.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Returns mutable access to the bus, for bindings made outside a
    /// module's attach hook.
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Returns the module names in execution order.
    pub fn module_names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.name().to_string()).collect()
    }

    /// Appends a module to the chain, runs its attach hook and returns a
    /// shared handle to it (useful to inspect module state after the run).
    ///
    /// A binding mistake (duplicate required tuple) aborts setup here, before
    /// any simulation work runs.
    pub fn add<M: Module>(&mut self, module: M) -> Result<Arc<M>, ConfigError> {
        let module = Arc::new(module);
        M::attach(&module, &mut self.bus)?;
        debug!(
            "module '{}' attached at position {}",
            module.name(),
            self.modules.len()
        );
        self.modules.push(Arc::clone(&module) as ModuleRef);
        Ok(module)
    }

    /// Processes `events` cycles through the module chain.
    ///
    /// Each cycle starts with `begin_cycle`, runs every module in insertion
    /// order, then validates requirements when the policy is
    /// [`ValidationPolicy::PerCycle`]. After the last cycle an end-of-run
    /// check runs when the policy is [`ValidationPolicy::EndOfRun`], and every
    /// module's finalize hook is invoked.
    pub fn run(&mut self, events: u64) -> Result<RunSummary, PipelineError> {
        let validation = self.bus.config().validation;

        for event in 1..=events {
            self.bus.begin_cycle();
            for module in &self.modules {
                module
                    .run(&self.bus, event)
                    .map_err(|source| PipelineError::Module {
                        module: module.name().to_string(),
                        event,
                        source,
                    })?;
            }
            if validation == ValidationPolicy::PerCycle {
                self.bus.check_requirements(Scope::Cycle)?;
            }
        }

        if validation == ValidationPolicy::EndOfRun {
            self.bus.check_requirements(Scope::Run)?;
        }

        for module in &self.modules {
            module
                .finalize(&self.bus)
                .map_err(|source| PipelineError::Finalize {
                    module: module.name().to_string(),
                    source,
                })?;
        }

        let summary = RunSummary {
            events,
            dispatches: self.bus.dispatches(),
            deliveries: self.bus.deliveries(),
        };
        info!(
            "run finished: {} event(s), {} dispatch(es), {} delivery(ies)",
            summary.events, summary.dispatches, summary.deliveries
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    use crate::bus::Binding;
    use crate::error::{ModuleError, ValidationError};
    use crate::messages::{Message, MultiSlot, SingleSlot};

    #[derive(Debug)]
    struct Hit {
        charge: u32,
    }
    impl Message for Hit {}

    #[derive(Debug)]
    struct Cluster {
        id: u32,
    }
    impl Message for Cluster {}

    /// Produces one `Hit` per event, up to a configurable event count.
    struct HitSource {
        until_event: u64,
    }

    impl Module for HitSource {
        fn name(&self) -> &str {
            "hit_source"
        }

        fn run(&self, bus: &Bus, event: u64) -> Result<(), ModuleError> {
            if event <= self.until_event {
                bus.dispatch(Hit { charge: event as u32 }, "")?;
            }
            Ok(())
        }
    }

    /// Consumes the latest `Hit` through a required single-bind slot.
    struct HitWriter {
        hits: SingleSlot<Hit>,
        written: AtomicU64,
        finalized: AtomicU64,
    }

    impl HitWriter {
        fn new() -> Self {
            Self {
                hits: SingleSlot::new(),
                written: AtomicU64::new(0),
                finalized: AtomicU64::new(0),
            }
        }
    }

    impl Module for HitWriter {
        fn name(&self) -> &str {
            "hit_writer"
        }

        fn attach(module: &Arc<Self>, bus: &mut Bus) -> Result<(), ConfigError> {
            bus.bind_single(module, &module.hits, Binding::new().required())
        }

        fn run(&self, _bus: &Bus, _event: u64) -> Result<(), ModuleError> {
            if self.hits.take().is_some() {
                self.written.fetch_add(1, Ordering::Relaxed);
            }
            Ok(())
        }

        fn finalize(&self, _bus: &Bus) -> Result<(), ModuleError> {
            self.finalized.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }
    }

    #[test]
    fn test_run_processes_every_event() {
        let mut pipeline = Pipeline::new(Config::default());
        pipeline.add(HitSource { until_event: u64::MAX }).unwrap();
        pipeline.add(HitWriter::new()).unwrap();

        let summary = pipeline.run(5).unwrap();
        assert_eq!(summary.events, 5);
        assert_eq!(summary.dispatches, 5);
        assert_eq!(summary.deliveries, 5);
    }

    #[test]
    fn test_unsatisfied_requirement_fails_that_cycle() {
        let mut pipeline = Pipeline::new(Config::default());
        // The source stops producing after event 1; the writer's required
        // binding goes unsatisfied in cycle 2.
        pipeline.add(HitSource { until_event: 1 }).unwrap();
        pipeline.add(HitWriter::new()).unwrap();

        let err = pipeline.run(3).unwrap_err();
        match err {
            PipelineError::Validation(ValidationError::Unsatisfied { bindings, .. }) => {
                assert_eq!(bindings.len(), 1);
                assert_eq!(bindings[0].module, "hit_writer");
                assert!(bindings[0].message_type.name().ends_with("Hit"));
                assert_eq!(bindings[0].channel, "");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_end_of_run_policy_accepts_sparse_production() {
        let config = Config {
            validation: ValidationPolicy::EndOfRun,
            ..Config::default()
        };
        let mut pipeline = Pipeline::new(config);
        pipeline.add(HitSource { until_event: 1 }).unwrap();
        pipeline.add(HitWriter::new()).unwrap();

        // Production only in event 1 satisfies a run-scoped requirement.
        pipeline.run(3).unwrap();
    }

    #[test]
    fn test_end_of_run_policy_rejects_silent_run() {
        let config = Config {
            validation: ValidationPolicy::EndOfRun,
            ..Config::default()
        };
        let mut pipeline = Pipeline::new(config);
        pipeline.add(HitSource { until_event: 0 }).unwrap();
        pipeline.add(HitWriter::new()).unwrap();

        let err = pipeline.run(3).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Validation(ValidationError::Unsatisfied { scope: Scope::Run, .. })
        ));
    }

    #[test]
    fn test_module_failure_names_module_and_event() {
        struct Flaky;
        impl Module for Flaky {
            fn name(&self) -> &str {
                "flaky"
            }
            fn run(&self, _bus: &Bus, event: u64) -> Result<(), ModuleError> {
                if event == 2 {
                    return Err(ModuleError::Fail {
                        error: "bad calibration".into(),
                    });
                }
                Ok(())
            }
        }

        let mut pipeline = Pipeline::new(Config::default());
        pipeline.add(Flaky).unwrap();
        let err = pipeline.run(3).unwrap_err();
        match err {
            PipelineError::Module { module, event, .. } => {
                assert_eq!(module, "flaky");
                assert_eq!(event, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_finalize_runs_once_after_last_event() {
        let mut pipeline = Pipeline::new(Config::default());
        pipeline.add(HitSource { until_event: u64::MAX }).unwrap();
        let writer = pipeline.add(HitWriter::new()).unwrap();

        pipeline.run(4).unwrap();
        assert_eq!(writer.written.load(Ordering::Relaxed), 4);
        assert_eq!(writer.finalized.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_channelled_accumulation_scenario() {
        /// Emits clusters on the "dut" and "telescope" channels.
        struct ClusterSource;
        impl Module for ClusterSource {
            fn name(&self) -> &str {
                "cluster_source"
            }
            fn run(&self, bus: &Bus, _event: u64) -> Result<(), ModuleError> {
                for id in 0..3 {
                    bus.dispatch(Cluster { id }, "dut")?;
                }
                bus.dispatch(Cluster { id: 42 }, "telescope")?;
                Ok(())
            }
        }

        /// Accumulates "dut" clusters through an optional multi-bind slot.
        struct DutMonitor {
            clusters: MultiSlot<Cluster>,
        }
        impl Module for DutMonitor {
            fn name(&self) -> &str {
                "dut_monitor"
            }
            fn attach(module: &Arc<Self>, bus: &mut Bus) -> Result<(), ConfigError> {
                bus.bind_multi(module, &module.clusters, Binding::new().on_channel("dut"))
            }
            fn run(&self, _bus: &Bus, _event: u64) -> Result<(), ModuleError> {
                let clusters = self.clusters.drain();
                assert_eq!(clusters.len(), 3, "only 'dut' dispatches must land here");
                for (i, cluster) in clusters.iter().enumerate() {
                    assert_eq!(cluster.id as usize, i);
                }
                Ok(())
            }
        }

        let mut pipeline = Pipeline::new(Config::default());
        pipeline.add(ClusterSource).unwrap();
        pipeline
            .add(DutMonitor {
                clusters: MultiSlot::new(),
            })
            .unwrap();
        assert_eq!(pipeline.module_names(), ["cluster_source", "dut_monitor"]);

        pipeline.run(2).unwrap();
    }
}
