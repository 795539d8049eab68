//! The message bus: bindings, delegates, registry and dispatch.
//!
//! This module groups the bus **routing state** and the **binding model**
//! used to declare module data dependencies.
//!
//! ## Contents
//! - [`Bus`] bind/register API, dispatch algorithm, requirement validation
//! - [`Binding`], [`Requirement`], [`Scope`], [`UnsatisfiedBinding`] binding
//!   options and validation reporting
//! - `delegate`/`registry` (internal) type-erased delivery targets and the
//!   (message type, channel) routing table
//!
//! ## Quick reference
//! - **Setup**: modules call `register`/`bind_single`/`bind_multi` behind
//!   `&mut Bus`, typically from their attach hook.
//! - **Run**: producers call `dispatch*` behind `&Bus`; the pipeline calls
//!   `begin_cycle` and `check_requirements` between cycles.
//!
//! See `lib.rs` for the system-level wiring diagram.

mod binding;
mod delegate;
mod messenger;
mod registry;

pub use binding::{Binding, Requirement, Scope, UnsatisfiedBinding};
pub use messenger::Bus;
