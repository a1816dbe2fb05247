use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::LlamaError;

pub const TVL_URL: &str = "https://api.llama.fi";
pub const VOLUMES_URL: &str = TVL_URL;
pub const FEES_URL: &str = TVL_URL;
pub const COINS_URL: &str = "https://coins.llama.fi";
pub const STABLECOINS_URL: &str = "https://stablecoins.llama.fi";
pub const YIELDS_URL: &str = "https://yields.llama.fi";
pub const ABI_URL: &str = "https://abi-decoder.llama.fi";
pub const BRIDGES_URL: &str = "https://bridges.llama.fi";

/// Logical API family; selects the upstream host a request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiTag {
    Tvl,
    Coins,
    Stablecoins,
    Yields,
    Abi,
    Bridges,
    Volumes,
    Fees,
}

impl ApiTag {
    pub const ALL: [Self; 8] = [
        Self::Tvl,
        Self::Coins,
        Self::Stablecoins,
        Self::Yields,
        Self::Abi,
        Self::Bridges,
        Self::Volumes,
        Self::Fees,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tvl => "TVL",
            Self::Coins => "COINS",
            Self::Stablecoins => "STABLECOINS",
            Self::Yields => "YIELDS",
            Self::Abi => "ABI",
            Self::Bridges => "BRIDGES",
            Self::Volumes => "VOLUMES",
            Self::Fees => "FEES",
        }
    }

    /// TVL, VOLUMES and FEES share one host; every other tag has its own.
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Tvl => TVL_URL,
            Self::Volumes => VOLUMES_URL,
            Self::Fees => FEES_URL,
            Self::Coins => COINS_URL,
            Self::Stablecoins => STABLECOINS_URL,
            Self::Yields => YIELDS_URL,
            Self::Abi => ABI_URL,
            Self::Bridges => BRIDGES_URL,
        }
    }
}

impl Display for ApiTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiTag {
    type Err = LlamaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str() == normalized)
            .ok_or_else(|| LlamaError::configuration(format!("'{value}' is not a valid API tag")))
    }
}
