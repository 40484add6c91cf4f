//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Assets and participants each get a strongly-typed ID so the two can never
//! be mixed up at compile time. IDs are ordered, and that order is the one
//! every deterministic tie-break in the market uses.
//!
//! `new()` uses UUID v7 (time-ordered). Seeded population generation uses
//! [`from_random_bytes`](AssetId::from_random_bytes) instead so that the same
//! seed always produces the same identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Build a v4 identifier from caller-supplied random bytes.
            ///
            /// Used with a seeded RNG so identifiers are reproducible.
            pub const fn from_random_bytes(bytes: [u8; 16]) -> Self {
                Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a housing asset.
    AssetId
}

define_id! {
    /// Unique identifier for a market participant (home owner).
    ParticipantId
}
