//! Integer identifiers assigned by the store to survey entities.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw store identifier.
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            /// Raw store identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $name {
            fn from(raw: i32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id! {
    /// Identifier of a project.
    ProjectId
}

entity_id! {
    /// Identifier of a theoretical station.
    StationId
}

entity_id! {
    /// Identifier of a field measurement.
    MeasurementId
}

entity_id! {
    /// Identifier of a division reading.
    ReadingId
}
