//! # Domain Types
//!
//! Value types returned by and passed to the client.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Table`] | Flattened, row-oriented result of a normalized call |
//! | [`Payload`] | Either the provider JSON or a [`Table`] |
//! | [`Format`] | Caller choice between raw JSON and a table |
//! | [`Targets`] | One or many chains/protocols for fan-out endpoints |
//! | [`ChainListing`], [`ProtocolListing`], [`StablecoinListing`], [`PoolListing`] | Identifying fields of enumerative endpoints |

mod listing;
mod table;
mod targets;

pub use listing::{ChainId, ChainListing, PoolListing, ProtocolListing, StablecoinListing};
pub use table::{Table, CHAIN_COLUMN};
pub use targets::Targets;

use serde::Serialize;
use serde_json::Value;

/// Output format requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Provider JSON, unchanged apart from envelope unwrapping.
    #[default]
    Raw,
    /// Flattened [`Table`] with canonical chain names.
    Table,
}

impl Format {
    pub const fn is_raw(self) -> bool {
        matches!(self, Self::Raw)
    }
}

/// Result of an endpoint method.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Raw(Value),
    Table(Table),
}

impl Payload {
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            Self::Raw(value) => Some(value),
            Self::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            Self::Raw(_) => None,
        }
    }

    pub fn into_raw(self) -> Option<Value> {
        match self {
            Self::Raw(value) => Some(value),
            Self::Table(_) => None,
        }
    }

    pub fn into_table(self) -> Option<Table> {
        match self {
            Self::Table(table) => Some(table),
            Self::Raw(_) => None,
        }
    }
}
