//! Generated item and feedback identifiers.
//!
//! Identifier generation is an injected dependency of the builders so tests
//! can supply deterministic values while production exports use random ones.

use uuid::Uuid;

/// Source of generated identifiers.
///
/// Item identifiers double as the item's file stem inside the QTI package,
/// so they must be unique across one export call. Feedback identifiers are
/// scoped to one item but drawn from the same generator.
pub trait IdGenerator {
    /// Identifier for one assessment item, e.g. `item-<token>`.
    fn item_id(&mut self) -> String;
    /// Identifier for one modal feedback block, e.g. `id-<token>`.
    fn feedback_id(&mut self) -> String;
}

/// Random (v4 UUID) identifiers for production exports.
#[derive(Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn item_id(&mut self) -> String {
        format!("item-{}", Uuid::new_v4())
    }

    fn feedback_id(&mut self) -> String {
        format!("id-{}", Uuid::new_v4())
    }
}

/// Counter-based identifiers for deterministic test output.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: u32,
}

impl IdGenerator for SequentialIds {
    fn item_id(&mut self) -> String {
        self.next += 1;
        format!("item-{:04}", self.next)
    }

    fn feedback_id(&mut self) -> String {
        self.next += 1;
        format!("id-{:04}", self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_ids_are_unique_and_prefixed() {
        let mut ids = UuidIds;
        let a = ids.item_id();
        let b = ids.item_id();
        assert!(a.starts_with("item-"));
        assert!(ids.feedback_id().starts_with("id-"));
        assert_ne!(a, b);
    }

    #[test]
    fn sequential_ids_are_deterministic() {
        let mut ids = SequentialIds::default();
        assert_eq!(ids.item_id(), "item-0001");
        assert_eq!(ids.feedback_id(), "id-0002");
        assert_eq!(ids.item_id(), "item-0003");

        let mut fresh = SequentialIds::default();
        assert_eq!(fresh.item_id(), "item-0001");
    }
}
