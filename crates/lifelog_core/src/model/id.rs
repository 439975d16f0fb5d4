//! Identifier generation for new tags and narratives.
//!
//! Ids are opaque strings. Uniqueness is probabilistic only; the archive never
//! re-checks a generated id against existing records.

use uuid::Uuid;

/// Returns a random UUID v4 string (36 characters including hyphens).
pub fn make_unique() -> String {
    Uuid::new_v4().to_string()
}

/// Capability used by mutating archive operations to mint ids.
///
/// Passed explicitly so callers can swap randomness for a deterministic
/// sequence in tests and replays.
pub trait IdGenerator {
    fn make_unique(&mut self) -> String;
}

/// Production generator backed by random UUID v4 values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn make_unique(&mut self) -> String {
        make_unique()
    }
}

/// Deterministic generator yielding `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug, Clone)]
pub struct SequenceIdGenerator {
    prefix: String,
    next: u64,
}

impl SequenceIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn make_unique(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
