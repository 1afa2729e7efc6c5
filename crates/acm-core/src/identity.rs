//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers. Each identifier is a distinct
//! type, so you cannot pass an [`ArcadeId`] where a [`MachineId`] is expected.
//!
//! UUID-based identifiers are always valid by construction. [`SerialNumber`]
//! validates at construction time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Maximum accepted serial number length, in characters.
pub const SERIAL_NUMBER_MAX_LEN: usize = 64;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_identifier!(
    /// Identifier of an operator organization owning one or more arcades.
    OrganizationId
);

uuid_identifier!(
    /// Identifier of an arcade (licensed premises).
    ArcadeId
);

uuid_identifier!(
    /// Identifier of a machine record. Distinct from its serial number.
    MachineId
);

/// Manufacturer serial number of a gaming machine.
///
/// Trimmed on construction. Uniqueness across the whole system is enforced
/// by the machine registry, not by this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerialNumber(String);

impl SerialNumber {
    /// Create a validated serial number.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySerialNumber`] for blank input and
    /// [`ValidationError::SerialNumberTooLong`] above
    /// [`SERIAL_NUMBER_MAX_LEN`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptySerialNumber);
        }
        if trimmed.chars().count() > SERIAL_NUMBER_MAX_LEN {
            return Err(ValidationError::SerialNumberTooLong {
                value: trimmed.to_string(),
                max: SERIAL_NUMBER_MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Return the serial number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SerialNumber {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SerialNumber> for String {
    fn from(serial: SerialNumber) -> Self {
        serial.0
    }
}

impl std::fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
