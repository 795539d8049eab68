//! Message data model: capability trait, identity tags and slots.
//!
//! This module groups everything a payload type needs to travel over the bus.
//!
//! ## Contents
//! - [`Message`], [`MessageType`] payload capability and identity tag
//! - [`SingleSlot`], [`MultiSlot`] module-owned storage cells for the
//!   single-bind and multi-bind disciplines
//!
//! ## Quick reference
//! - **Producers** construct concrete message values and hand them to
//!   `Bus::dispatch` (ownership moves to the bus, shared read-only from there).
//! - **Consumers** either receive `Arc<R>` in a listener callback or read
//!   their bound slots after the producing modules ran.

mod message;
mod slots;

pub use message::{IntoAny, Message, MessageType};
pub use slots::{MultiSlot, SingleSlot};
