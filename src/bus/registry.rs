//! # Delegate registry, keyed by (message type, channel).
//!
//! The registry is the bus's routing table: for every message type a map of
//! channel name to the ordered delegate list for that entry. Insertion order
//! equals registration order and is never changed after setup, which is what
//! makes dispatch fan-out deterministic and runs reproducible.
//!
//! ## Lookup
//! ```text
//! delegates_for(ty, "dut")
//!     ├─► entries[ty]["dut"]   (explicit-channel delegates, in bind order)
//!     └─► entries[ty][""]      (wildcard delegates, in bind order)
//! ```
//!
//! Explicit-channel delegates are yielded before wildcard delegates; a lookup
//! on the default channel yields only the wildcard entry.

use std::collections::HashMap;

use crate::bus::delegate::Delegate;
use crate::messages::MessageType;

/// Routing table from (message type, channel) to ordered delegates.
#[derive(Default)]
pub(crate) struct Registry {
    entries: HashMap<MessageType, HashMap<String, Vec<Delegate>>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a delegate at the end of its (type, channel) entry.
    pub(crate) fn attach(&mut self, ty: MessageType, channel: &str, delegate: Delegate) {
        self.entries
            .entry(ty)
            .or_default()
            .entry(channel.to_string())
            .or_default()
            .push(delegate);
    }

    /// Returns the delegates matching a dispatch of `ty` on `channel`:
    /// the explicit-channel entry first, then the wildcard entry, each in
    /// registration order.
    pub(crate) fn delegates_for<'a>(
        &'a self,
        ty: &MessageType,
        channel: &str,
    ) -> impl Iterator<Item = &'a Delegate> {
        let by_channel = self.entries.get(ty);
        let explicit = if channel.is_empty() {
            None
        } else {
            by_channel.and_then(|m| m.get(channel))
        };
        let wildcard = by_channel.and_then(|m| m.get(""));
        explicit
            .into_iter()
            .flatten()
            .chain(wildcard.into_iter().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::delegate::Target;
    use crate::messages::Message;

    #[derive(Debug)]
    struct Hit;
    impl Message for Hit {}

    #[derive(Debug)]
    struct Cluster;
    impl Message for Cluster {}

    fn delegate(module: &str) -> Delegate {
        Delegate::new(module.into(), 0, Target::Single(Box::new(|_| {})))
    }

    fn modules_for(registry: &Registry, ty: &MessageType, channel: &str) -> Vec<String> {
        registry
            .delegates_for(ty, channel)
            .map(|d| d.module().to_string())
            .collect()
    }

    #[test]
    fn test_registration_order_preserved() {
        let mut registry = Registry::new();
        let ty = MessageType::of::<Hit>();
        for name in ["a", "b", "c"] {
            registry.attach(ty, "", delegate(name));
        }
        assert_eq!(modules_for(&registry, &ty, ""), ["a", "b", "c"]);
    }

    #[test]
    fn test_explicit_before_wildcard() {
        let mut registry = Registry::new();
        let ty = MessageType::of::<Hit>();
        registry.attach(ty, "", delegate("wildcard"));
        registry.attach(ty, "dut", delegate("explicit"));

        assert_eq!(
            modules_for(&registry, &ty, "dut"),
            ["explicit", "wildcard"],
            "explicit-channel delegates must be delivered first"
        );
    }

    #[test]
    fn test_default_channel_lookup_skips_named_entries() {
        let mut registry = Registry::new();
        let ty = MessageType::of::<Hit>();
        registry.attach(ty, "dut", delegate("explicit"));
        registry.attach(ty, "", delegate("wildcard"));

        assert_eq!(modules_for(&registry, &ty, ""), ["wildcard"]);
    }

    #[test]
    fn test_types_and_channels_are_independent() {
        let mut registry = Registry::new();
        registry.attach(MessageType::of::<Hit>(), "dut", delegate("hits"));
        registry.attach(MessageType::of::<Cluster>(), "dut", delegate("clusters"));

        assert_eq!(
            modules_for(&registry, &MessageType::of::<Hit>(), "dut"),
            ["hits"]
        );
        assert_eq!(
            modules_for(&registry, &MessageType::of::<Hit>(), "telescope"),
            Vec::<String>::new()
        );
    }
}
