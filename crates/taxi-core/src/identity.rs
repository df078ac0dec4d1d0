//! # Record Identifiers
//!
//! Newtype wrappers for the auto-assigned ids of each record kind, so a
//! `CarId` can never be passed where a `DriverId` is expected.
//!
//! Ids are sequential and start at 1. The store that owns a collection hands
//! them out in strictly increasing order, which makes ascending id the same
//! as insertion order.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Common behaviour of every record identifier.
pub trait RecordId: Copy + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Wrap a raw sequence number.
    fn from_raw(raw: u64) -> Self;
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl RecordId for $name {
            fn from_raw(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a [`Manufacturer`](crate::model::Manufacturer).
    ManufacturerId
);
record_id!(
    /// Identifier of a [`Car`](crate::model::Car).
    CarId
);
record_id!(
    /// Identifier of a [`Driver`](crate::model::Driver).
    DriverId
);
