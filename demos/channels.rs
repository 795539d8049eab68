//! # Named channels and wildcard receivers
//!
//! Two producers dispatch the same message type on different channels; one
//! consumer binds per channel, another binds the default channel and sees
//! everything.
//!
//! Run with: `cargo run --example channels`

use std::sync::Arc;

use simbus::{
    Binding, Bus, Config, ConfigError, Message, Module, ModuleError, MultiSlot, Pipeline,
};

/// Cluster of adjacent hits on one detector plane.
#[derive(Debug)]
struct Cluster {
    plane: &'static str,
    size: u32,
}
impl Message for Cluster {}

/// Emits clusters for one detector onto its own channel.
struct ClusterSource {
    detector: &'static str,
    per_event: u32,
}

impl Module for ClusterSource {
    fn name(&self) -> &str {
        self.detector
    }

    fn run(&self, bus: &Bus, event: u64) -> Result<(), ModuleError> {
        for i in 0..self.per_event {
            bus.dispatch(
                Cluster {
                    plane: self.detector,
                    size: (event as u32) + i,
                },
                self.detector,
            )?;
        }
        Ok(())
    }
}

/// Consumes clusters from exactly one channel.
struct DutAnalysis {
    clusters: MultiSlot<Cluster>,
}

impl Module for DutAnalysis {
    fn name(&self) -> &str {
        "dut_analysis"
    }

    fn attach(module: &Arc<Self>, bus: &mut Bus) -> Result<(), ConfigError> {
        bus.bind_multi(
            module,
            &module.clusters,
            Binding::new().on_channel("dut").required(),
        )
    }

    fn run(&self, _bus: &Bus, event: u64) -> Result<(), ModuleError> {
        let clusters = self.clusters.drain();
        println!("[dut] event={} clusters={}", event, clusters.len());
        Ok(())
    }
}

/// Counts clusters from every channel through a wildcard listener.
struct Monitor;

impl Module for Monitor {
    fn name(&self) -> &str {
        "monitor"
    }

    fn attach(module: &Arc<Self>, bus: &mut Bus) -> Result<(), ConfigError> {
        bus.register(
            module,
            |_: &Self, cluster: Arc<Cluster>| {
                println!("[monitor] plane={} size={}", cluster.plane, cluster.size);
                Ok(())
            },
            Binding::new(),
        )
    }

    fn run(&self, _bus: &Bus, _event: u64) -> Result<(), ModuleError> {
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut pipeline = Pipeline::new(Config::default());
    pipeline.add(Monitor)?;
    pipeline.add(ClusterSource {
        detector: "dut",
        per_event: 2,
    })?;
    pipeline.add(ClusterSource {
        detector: "telescope",
        per_event: 3,
    })?;
    pipeline.add(DutAnalysis {
        clusters: MultiSlot::new(),
    })?;

    let summary = pipeline.run(3)?;
    println!(
        "processed {} event(s), {} delivery(ies)",
        summary.events, summary.deliveries
    );
    Ok(())
}
