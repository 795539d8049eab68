//! # Message capability and identity tags.
//!
//! Every payload exchanged over the bus implements the [`Message`] marker
//! trait. The bus never inspects payload content; it only needs a stable
//! identity for the concrete type, captured by [`MessageType`].
//!
//! ## Identity semantics
//! - A [`MessageType`] is derived from the **concrete** (most-derived) type,
//!   even when the value is handled through an `Arc<dyn Message>`: the tag is
//!   produced by a monomorphized trait method, so the erased handle type never
//!   leaks into dispatch.
//! - Equality is identity equality (`TypeId`), not structural. Two distinct
//!   concrete types never compare equal.
//!
//! ## Example
//! ```rust
//! use simbus::{Message, MessageType};
//!
//! #[derive(Debug)]
//! struct Hit {
//!     column: u32,
//!     row: u32,
//! }
//! impl Message for Hit {}
//!
//! let hit = Hit { column: 3, row: 7 };
//! assert_eq!(hit.message_type(), MessageType::of::<Hit>());
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Arc-erasure support for messages, blanket-implemented for every concrete
/// payload type.
///
/// The bus moves messages around as `Arc<dyn Message>`; this supertrait is
/// what lets a delegate recover the typed `Arc<R>` behind that handle. It is
/// never implemented by hand.
pub trait IntoAny {
    /// Converts a shared message into a shared [`Any`] for downcasting.
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> IntoAny for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Capability for payload objects moved by the bus.
///
/// Implement this marker on every concrete message type:
///
/// ```rust
/// use simbus::Message;
///
/// #[derive(Debug)]
/// struct PixelCharge {
///     charge: u32,
/// }
/// impl Message for PixelCharge {}
/// ```
///
/// The bus shares messages read-only across receivers via `Arc`, so message
/// types must be `Send + Sync`; `Debug` keeps them printable in diagnostics.
pub trait Message: Any + IntoAny + fmt::Debug + Send + Sync {
    /// Returns the identity tag of the concrete message type.
    ///
    /// The default body is monomorphized per implementing type, so calling it
    /// through a `dyn Message` handle still yields the concrete type's tag.
    fn message_type(&self) -> MessageType {
        MessageType {
            id: TypeId::of::<Self>(),
            name: std::any::type_name::<Self>(),
        }
    }

    /// Returns the full type name of the concrete message type.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Opaque, stable identifier for a concrete message type.
///
/// Used as the registry key and in requirement bookkeeping. Cheap to copy;
/// compares and hashes by [`TypeId`] only. The captured type name is carried
/// for diagnostics.
#[derive(Clone, Copy, Debug)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    /// Returns the tag for a statically known message type.
    pub fn of<R: Message>() -> Self {
        Self {
            id: TypeId::of::<R>(),
            name: std::any::type_name::<R>(),
        }
    }

    /// Returns the full type name, for diagnostics.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl Hash for MessageType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Hit;
    impl Message for Hit {}

    #[derive(Debug)]
    struct Cluster;
    impl Message for Cluster {}

    #[test]
    fn test_tag_identity_not_structure() {
        assert_eq!(MessageType::of::<Hit>(), MessageType::of::<Hit>());
        assert_ne!(MessageType::of::<Hit>(), MessageType::of::<Cluster>());
    }

    #[test]
    fn test_concrete_tag_through_erased_handle() {
        let erased: Arc<dyn Message> = Arc::new(Hit);
        assert_eq!(
            erased.message_type(),
            MessageType::of::<Hit>(),
            "tag must come from the concrete type, not the handle type"
        );
        assert_ne!(erased.message_type(), MessageType::of::<Cluster>());
    }

    #[test]
    fn test_type_name_is_concrete() {
        let erased: Arc<dyn Message> = Arc::new(Cluster);
        assert!(erased.type_name().ends_with("Cluster"));
        assert!(MessageType::of::<Hit>().name().ends_with("Hit"));
    }

    #[test]
    fn test_display_shows_type_name() {
        let tag = MessageType::of::<Hit>();
        assert_eq!(format!("{tag}"), tag.name());
    }
}
