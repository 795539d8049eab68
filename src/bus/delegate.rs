//! # Delegates: type-erased delivery targets filed in the registry.
//!
//! A [`Delegate`] connects one registry entry to one receiving module. The
//! three binding disciplines collapse into a closed [`Target`] variant,
//! dispatched by pattern matching:
//!
//! - `Listener` invokes a callback on the receiving module;
//! - `Single` overwrites the module's [`SingleSlot`](crate::SingleSlot);
//! - `Multi` appends to the module's [`MultiSlot`](crate::MultiSlot).
//!
//! Each target captures what it needs to outlast the bind call: listeners
//! hold an `Arc` of their module, slot targets hold a handle to the
//! module-owned cell. A delegate therefore can never outlive its module.
//!
//! Downcasting from the erased `Arc<dyn Message>` back to the concrete type
//! is infallible by construction: a delegate is only ever filed under the
//! registry entry keyed by its own message type.

use std::sync::Arc;

use crate::error::BoxError;
use crate::messages::{IntoAny, Message, MultiSlot, SingleSlot};

/// Listener invocation target, type-erased over the message type.
pub(crate) type ListenerFn = Box<dyn Fn(Arc<dyn Message>) -> Result<(), BoxError> + Send + Sync>;

/// Slot write target, type-erased over the message type.
pub(crate) type SlotWrite = Box<dyn Fn(Arc<dyn Message>) + Send + Sync>;

/// Delivery target of a delegate, one variant per binding discipline.
pub(crate) enum Target {
    Listener(ListenerFn),
    Single(SlotWrite),
    Multi(SlotWrite),
}

impl Target {
    /// Builds a listener target for a receiving module and callback.
    pub(crate) fn listener<M, R, F>(receiver: Arc<M>, callback: F) -> Self
    where
        M: Send + Sync + 'static,
        R: Message,
        F: Fn(&M, Arc<R>) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Target::Listener(Box::new(move |message| {
            callback(&receiver, downcast::<R>(message))
        }))
    }

    /// Builds an overwrite target for a single-bind slot.
    pub(crate) fn single<R: Message>(slot: SingleSlot<R>) -> Self {
        Target::Single(Box::new(move |message| slot.put(downcast::<R>(message))))
    }

    /// Builds an append target for a multi-bind slot.
    pub(crate) fn multi<R: Message>(slot: MultiSlot<R>) -> Self {
        Target::Multi(Box::new(move |message| slot.push(downcast::<R>(message))))
    }
}

/// A bound receiver entry: module identity, bookkeeping index and target.
pub(crate) struct Delegate {
    module: String,
    record: usize,
    target: Target,
}

impl Delegate {
    pub(crate) fn new(module: String, record: usize, target: Target) -> Self {
        Self {
            module,
            record,
            target,
        }
    }

    pub(crate) fn module(&self) -> &str {
        &self.module
    }

    pub(crate) fn record(&self) -> usize {
        self.record
    }

    /// Delivers one message to this delegate's target.
    ///
    /// Only listener targets can fail; slot writes are plain stores.
    pub(crate) fn deliver(&self, message: &Arc<dyn Message>) -> Result<(), BoxError> {
        match &self.target {
            Target::Listener(invoke) => invoke(Arc::clone(message)),
            Target::Single(write) | Target::Multi(write) => {
                write(Arc::clone(message));
                Ok(())
            }
        }
    }
}

/// Recovers the concrete message type behind the erased handle.
///
/// The registry files every delegate under the entry keyed by its own message
/// type, so a mismatch here is a bus bug, not a caller error.
fn downcast<R: Message>(message: Arc<dyn Message>) -> Arc<R> {
    message
        .into_any()
        .downcast::<R>()
        .expect("delegate invoked with a message of a foreign type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug)]
    struct Hit {
        charge: u32,
    }
    impl Message for Hit {}

    struct Probe {
        seen: AtomicUsize,
    }

    #[test]
    fn test_listener_target_invokes_callback() {
        let probe = Arc::new(Probe {
            seen: AtomicUsize::new(0),
        });
        let target = Target::listener(Arc::clone(&probe), |probe: &Probe, hit: Arc<Hit>| {
            assert_eq!(hit.charge, 42);
            probe.seen.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });
        let delegate = Delegate::new("probe".into(), 0, target);

        let message: Arc<dyn Message> = Arc::new(Hit { charge: 42 });
        delegate.deliver(&message).unwrap();
        assert_eq!(probe.seen.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_listener_error_propagates() {
        let probe = Arc::new(());
        let target = Target::listener(probe, |_: &(), _: Arc<Hit>| Err("boom".into()));
        let delegate = Delegate::new("probe".into(), 0, target);

        let message: Arc<dyn Message> = Arc::new(Hit { charge: 1 });
        let err = delegate.deliver(&message).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_slot_targets_write_through() {
        let single = SingleSlot::<Hit>::new();
        let multi = MultiSlot::<Hit>::new();
        let overwrite = Delegate::new("a".into(), 0, Target::single(single.clone()));
        let append = Delegate::new("b".into(), 1, Target::multi(multi.clone()));

        for charge in [1, 2] {
            let message: Arc<dyn Message> = Arc::new(Hit { charge });
            overwrite.deliver(&message).unwrap();
            append.deliver(&message).unwrap();
        }

        assert_eq!(single.latest().unwrap().charge, 2);
        assert_eq!(multi.len(), 2);
    }
}
