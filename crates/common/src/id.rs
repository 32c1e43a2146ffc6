//! ID generation utilities.

use uuid::Uuid;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new primary key.
    ///
    /// UUID v7 is time-ordered, so freshly inserted rows sort last in
    /// primary-key order.
    #[must_use]
    pub fn generate(&self) -> String {
        Uuid::now_v7().to_string()
    }
}
