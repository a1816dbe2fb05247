use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Chain identifiers are numeric for EVM chains and textual elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainId {
    Numeric(u64),
    Named(String),
}

impl Display for ChainId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Numeric(id) => write!(f, "{id}"),
            Self::Named(id) => f.write_str(id),
        }
    }
}

/// Entry of `/v2/chains`, reduced to what identifies a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainListing {
    #[serde(rename = "chainId", default)]
    pub chain_id: Option<ChainId>,
    pub name: String,
}

/// Entry of `/protocols`; `slug` is the key accepted by protocol endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolListing {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Entry of `/stablecoins` (`peggedAssets` envelope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StablecoinListing {
    pub id: String,
    pub name: String,
    pub symbol: String,
}

/// Entry of `/pools` (`data` envelope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolListing {
    #[serde(rename = "pool")]
    pub id: String,
    pub chain: String,
    pub project: String,
    pub symbol: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn chain_listing_accepts_numeric_textual_and_missing_ids() {
        let listings: Vec<ChainListing> = serde_json::from_value(json!([
            {"chainId": 1, "name": "Ethereum", "tvl": 5.0},
            {"chainId": "cosmoshub-4", "name": "Cosmos"},
            {"chainId": null, "name": "Bitcoin"},
            {"name": "Solana"}
        ]))
        .expect("listings should deserialize");

        assert_eq!(listings[0].chain_id, Some(ChainId::Numeric(1)));
        assert_eq!(listings[1].chain_id, Some(ChainId::Named(String::from("cosmoshub-4"))));
        assert_eq!(listings[2].chain_id, None);
        assert_eq!(listings[3].chain_id, None);
    }

    #[test]
    fn pool_listing_renames_pool_to_id() {
        let pool: PoolListing = serde_json::from_value(json!({
            "pool": "747c1d2a-c668-4682-b9f9-296708a3dd90",
            "chain": "Ethereum",
            "project": "lido",
            "symbol": "STETH",
            "apy": 3.1
        }))
        .expect("pool should deserialize");

        assert_eq!(pool.id, "747c1d2a-c668-4682-b9f9-296708a3dd90");
        assert_eq!(pool.project, "lido");
    }
}
