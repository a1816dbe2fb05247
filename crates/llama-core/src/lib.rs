//! # Llama Core
//!
//! Synchronous client for the DefiLlama REST API with response normalization.
//!
//! ## Overview
//!
//! Every endpoint method returns a [`Payload`]: either the provider JSON
//! (unchanged apart from documented envelope unwrapping) or a flattened
//! [`Table`] with one row per data point and canonical chain names.
//!
//! - **Transport** with one reusable session and an injectable [`HttpClient`]
//! - **Typed parameters** per endpoint family, validated before any request
//! - **Chart flattening** of `totalDataChart` / `totalDataChartBreakdown`
//! - **Multi-key fan-out** over chains, protocols and bridge ids
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`api_tag`] | API families and their base URLs |
//! | [`client`] | [`LlamaClient`] and the generic `get` |
//! | [`config`] | Timeout and user agent settings |
//! | [`domain`] | Tables, payloads, targets and listings |
//! | [`error`] | Error taxonomy |
//! | [`http_client`] | HTTP client abstraction and offline fixtures |
//! | [`normalize`] | Chart flattening and chain canonicalization |
//! | [`params`] | Typed query parameters |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use llama_core::{Format, LlamaClient, VolumeParams};
//!
//! fn main() -> Result<(), llama_core::LlamaError> {
//!     let client = LlamaClient::new();
//!
//!     let payload = client.protocol_dex_volume(
//!         ["uniswap", "curve-dex"],
//!         &VolumeParams::breakdown(),
//!         Format::Table,
//!     )?;
//!
//!     if let Some(table) = payload.as_table() {
//!         println!("{:?}", table.columns());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use llama_core::{ErrorKind, LlamaError};
//!
//! fn handle_error(error: LlamaError) {
//!     match error.kind() {
//!         ErrorKind::Transport => {
//!             // Network failure, timeout or non-2xx status
//!         }
//!         ErrorKind::Shape => {
//!             // Provider answered with an unexpected structure
//!         }
//!         ErrorKind::InvalidArguments | ErrorKind::Configuration => {
//!             // Rejected before any request was made
//!         }
//!         ErrorKind::Decode => {}
//!     }
//! }
//! ```

pub mod api_tag;
pub mod client;
pub mod config;
pub mod domain;
mod endpoints;
pub mod error;
pub mod http_client;
pub mod normalize;
pub mod params;

// API families
pub use api_tag::ApiTag;

// Client
pub use client::LlamaClient;

// Configuration
pub use config::ClientConfig;

// Domain types
pub use domain::{
    ChainId, ChainListing, Format, Payload, PoolListing, ProtocolListing, StablecoinListing, Table,
    Targets,
};

// Error types
pub use error::{ErrorKind, LlamaError};

// HTTP client types
pub use http_client::{
    FixtureHttpClient, HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, Query,
    ReqwestHttpClient,
};

// Query parameters
pub use params::{
    BridgeFilter, BridgesParams, ChartDataType, ChartParams, ChartSelection, FeesDataType,
    FeesParams, OptionsDataType, OptionsParams, TransactionParams, VolumeDataType, VolumeParams,
};
