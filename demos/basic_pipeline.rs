//! # Basic simulation pipeline
//!
//! Demonstrates the core bus features end to end:
//! - A producer dispatching typed messages each event
//! - A transformer consuming through a listener and re-dispatching
//! - A writer accumulating results through a required multi-bind slot
//! - Per-cycle requirement validation
//!
//! Run with: `cargo run --example basic_pipeline`

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use simbus::{
    Binding, Bus, Config, ConfigError, Message, Module, ModuleError, MultiSlot, Pipeline,
};

/// Raw charge deposited in one sensor cell.
#[derive(Debug)]
struct ChargeDeposit {
    cell: u32,
    charge: u32,
}
impl Message for ChargeDeposit {}

/// Digitized pixel hit, produced from a deposit above threshold.
#[derive(Debug)]
struct PixelHit {
    cell: u32,
    amplitude: u32,
}
impl Message for PixelHit {}

/// Deposits a few charges per event.
struct Sensor;

impl Module for Sensor {
    fn name(&self) -> &str {
        "sensor"
    }

    fn run(&self, bus: &Bus, event: u64) -> Result<(), ModuleError> {
        for cell in 0..3 {
            bus.dispatch(
                ChargeDeposit {
                    cell,
                    charge: (event as u32) * 100 + cell * 7,
                },
                "",
            )?;
        }
        Ok(())
    }
}

/// Converts deposits above threshold into pixel hits via a listener.
struct Digitizer {
    threshold: u32,
    converted: AtomicU64,
}

impl Module for Digitizer {
    fn name(&self) -> &str {
        "digitizer"
    }

    fn attach(module: &Arc<Self>, bus: &mut Bus) -> Result<(), ConfigError> {
        bus.register(
            module,
            |digitizer: &Self, deposit: Arc<ChargeDeposit>| {
                if deposit.charge >= digitizer.threshold {
                    digitizer.converted.fetch_add(1, Ordering::Relaxed);
                }
                Ok(())
            },
            Binding::new().required(),
        )
    }

    fn run(&self, bus: &Bus, _event: u64) -> Result<(), ModuleError> {
        // Hits for this cycle were collected by the listener; emit one
        // summary hit per conversion batch.
        let converted = self.converted.swap(0, Ordering::Relaxed);
        if converted > 0 {
            bus.dispatch(
                PixelHit {
                    cell: 0,
                    amplitude: converted as u32,
                },
                "",
            )?;
        }
        Ok(())
    }
}

/// Accumulates pixel hits through a required multi-bind slot.
struct HitWriter {
    hits: MultiSlot<PixelHit>,
    total: AtomicU64,
}

impl Module for HitWriter {
    fn name(&self) -> &str {
        "hit_writer"
    }

    fn attach(module: &Arc<Self>, bus: &mut Bus) -> Result<(), ConfigError> {
        bus.bind_multi(module, &module.hits, Binding::new().required())
    }

    fn run(&self, _bus: &Bus, event: u64) -> Result<(), ModuleError> {
        for hit in self.hits.drain() {
            println!(
                "[writer] event={} cell={} amplitude={}",
                event, hit.cell, hit.amplitude
            );
            self.total.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn finalize(&self, _bus: &Bus) -> Result<(), ModuleError> {
        println!(
            "[writer] run complete, {} hit(s) written",
            self.total.load(Ordering::Relaxed)
        );
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut pipeline = Pipeline::new(Config::default());
    pipeline.add(Sensor)?;
    pipeline.add(Digitizer {
        threshold: 100,
        converted: AtomicU64::new(0),
    })?;
    pipeline.add(HitWriter {
        hits: MultiSlot::new(),
        total: AtomicU64::new(0),
    })?;

    let summary = pipeline.run(5)?;
    println!(
        "processed {} event(s), {} dispatch(es), {} delivery(ies)",
        summary.events, summary.dispatches, summary.deliveries
    );
    Ok(())
}
