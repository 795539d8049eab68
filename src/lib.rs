//! # simbus
//!
//! **simbus** is a typed in-process publish/subscribe bus for simulation
//! pipelines.
//!
//! It connects independent processing stages ("modules") that must exchange
//! strongly-typed data objects during a simulation run without being compiled
//! against each other's concrete types. Messages are routed by the concrete
//! runtime type of the payload plus an optional named channel, delivered
//! synchronously in a deterministic order, and every module's declared data
//! dependencies are validated after each cycle.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Module    │   │    Module    │   │    Module    │
//!     │  (producer)  │   │ (transformer)│   │  (consumer)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            │ dispatch         │ listener         │ slots
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Bus                                                              │
//! │  - Registry: (MessageType, channel) → ordered delegates           │
//! │  - BindingRecords: requirement bookkeeping per binding            │
//! │  - dispatch: route by concrete type, explicit channel + wildcard  │
//! │  - check_requirements: per-cycle / per-run satisfaction           │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                │ owned by
//!                                ▼
//!                    ┌────────────────────────┐
//!                    │  Pipeline              │
//!                    │  begin_cycle           │
//!                    │  module.run × N        │
//!                    │  validation checkpoint │
//!                    └────────────────────────┘
//! ```
//!
//! ### Binding disciplines
//! ```text
//! register(module, callback)   → Listener   : invoke callback per dispatch
//! bind_single(module, slot)    → SingleBind : overwrite slot (last wins)
//! bind_multi(module, slot)     → MultiBind  : append to slot, in order
//! ```
//!
//! ### Lifecycle
//! ```text
//! setup:  Pipeline::add(module) ─► Module::attach ─► bind/register (&mut Bus)
//! run:    for each event:
//!           begin_cycle               (reset per-cycle satisfaction flags)
//!           modules run, dispatching  (&Bus, synchronous fan-out)
//!           check_requirements        (REQUIRED bindings satisfied?)
//! end:    optional end-of-run check, Module::finalize
//! ```
//!
//! ## Features
//! | Area           | Description                                                | Key types / traits                  |
//! |----------------|------------------------------------------------------------|-------------------------------------|
//! | **Messages**   | Identity-typed payloads, shared read-only across receivers. | [`Message`], [`MessageType`]       |
//! | **Slots**      | Module-owned cells fed by the bus.                         | [`SingleSlot`], [`MultiSlot`]       |
//! | **Bindings**   | Channel + requirement options per binding.                 | [`Binding`], [`Requirement`]        |
//! | **Dispatch**   | Deterministic synchronous fan-out by concrete type.        | [`Bus`]                             |
//! | **Validation** | Per-cycle / per-run data-dependency checks.                | [`Scope`], [`UnsatisfiedBinding`]   |
//! | **Pipeline**   | Ordered module chain driving cycles over one bus.          | [`Module`], [`Pipeline`]            |
//! | **Errors**     | Typed errors naming module, message type and channel.      | [`ConfigError`], [`DispatchError`]  |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use simbus::{
//!     Binding, Bus, Config, ConfigError, Message, Module, ModuleError, MultiSlot, Pipeline,
//! };
//!
//! // Messages are plain types carrying their own identity.
//! #[derive(Debug)]
//! struct PixelHit {
//!     address: u32,
//! }
//! impl Message for PixelHit {}
//!
//! // A producer dispatches during its run phase.
//! struct Sensor;
//! impl Module for Sensor {
//!     fn name(&self) -> &str {
//!         "sensor"
//!     }
//!     fn run(&self, bus: &Bus, event: u64) -> Result<(), ModuleError> {
//!         bus.dispatch(PixelHit { address: event as u32 }, "")?;
//!         Ok(())
//!     }
//! }
//!
//! // A consumer accumulates matching messages through a bound slot.
//! struct Writer {
//!     hits: MultiSlot<PixelHit>,
//! }
//! impl Module for Writer {
//!     fn name(&self) -> &str {
//!         "writer"
//!     }
//!     fn attach(module: &Arc<Self>, bus: &mut Bus) -> Result<(), ConfigError> {
//!         bus.bind_multi(module, &module.hits, Binding::new().required())
//!     }
//!     fn run(&self, _bus: &Bus, _event: u64) -> Result<(), ModuleError> {
//!         for hit in self.hits.drain() {
//!             let _ = hit.address; // write out...
//!         }
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut pipeline = Pipeline::new(Config::default());
//!     pipeline.add(Sensor)?;
//!     pipeline.add(Writer { hits: MultiSlot::new() })?;
//!
//!     let summary = pipeline.run(100)?;
//!     assert_eq!(summary.events, 100);
//!     Ok(())
//! }
//! ```

mod bus;
mod config;
mod error;
mod messages;
mod pipeline;

// ---- Public re-exports ----

pub use bus::{Binding, Bus, Requirement, Scope, UnsatisfiedBinding};
pub use config::{Config, ValidationPolicy};
pub use error::{
    BoxError, ConfigError, DispatchError, ModuleError, PipelineError, ValidationError,
};
pub use messages::{IntoAny, Message, MessageType, MultiSlot, SingleSlot};
pub use pipeline::{Module, ModuleRef, Pipeline, RunSummary};
