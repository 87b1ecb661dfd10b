//! Rollback history addressing

use crate::error::ValidationError;
use std::fmt;

/// Index into the device's rollback history
///
/// `0` is the active configuration; the device retains 49 earlier commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RollbackId(u8);

impl RollbackId {
    /// Deepest retained rollback
    pub const MAX: u8 = 49;

    /// The active configuration
    pub const ACTIVE: Self = Self(0);

    /// Validate a rollback id
    ///
    /// # Errors
    /// `ValidationError::InvalidRollbackId` outside `0..=49`.
    pub fn new(id: impl Into<i64>) -> Result<Self, ValidationError> {
        let id = id.into();
        u8::try_from(id)
            .ok()
            .filter(|id| *id <= Self::MAX)
            .map(Self)
            .ok_or(ValidationError::InvalidRollbackId(id))
    }

    /// Raw index
    #[inline]
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for RollbackId {
    type Error = ValidationError;

    fn try_from(id: i64) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl fmt::Display for RollbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
