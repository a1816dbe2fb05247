//! Identifier listings used to map display names to the slugs and ids the
//! other endpoints accept. Only the identifying fields are kept.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{ChainListing, PoolListing, ProtocolListing, StablecoinListing};
use crate::http_client::Query;
use crate::normalize::into_envelope;
use crate::{ApiTag, LlamaClient, LlamaError};

impl LlamaClient {
    /// Every chain with its chain id and name (`/v2/chains`).
    pub fn chains(&self) -> Result<Vec<ChainListing>, LlamaError> {
        let response = self.get(ApiTag::Tvl, "/v2/chains", &Query::new())?;
        project("/v2/chains", response)
    }

    /// Every protocol with its id, name and slug (`/protocols`).
    pub fn protocols(&self) -> Result<Vec<ProtocolListing>, LlamaError> {
        let response = self.get(ApiTag::Tvl, "/protocols", &Query::new())?;
        project("/protocols", response)
    }

    /// Every stablecoin with its id, name and symbol (`/stablecoins`).
    pub fn stablecoins(&self) -> Result<Vec<StablecoinListing>, LlamaError> {
        let response = self.get(ApiTag::Stablecoins, "/stablecoins", &Query::new())?;
        let assets = into_envelope(response, "peggedAssets", "/stablecoins")?;
        project("/stablecoins", assets)
    }

    /// Every yield pool with its id, chain, project and symbol (`/pools`).
    pub fn pools(&self) -> Result<Vec<PoolListing>, LlamaError> {
        let response = self.get(ApiTag::Yields, "/pools", &Query::new())?;
        let pools = into_envelope(response, "data", "/pools")?;
        project("/pools", pools)
    }
}

fn project<T: DeserializeOwned>(endpoint: &str, items: Value) -> Result<Vec<T>, LlamaError> {
    serde_json::from_value(items).map_err(|error| LlamaError::shape(endpoint, error.to_string()))
}
