//! Typed query parameters, one structure per endpoint family.

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use time::OffsetDateTime;

use crate::http_client::Query;
use crate::normalize::fees_column_name;
use crate::LlamaError;

/// Upper bound the provider accepts for `/transactions/{id}?limit=`.
pub const MAX_TRANSACTION_LIMIT: u32 = 6_000;

/// `dataType` values accepted by a chart endpoint family.
pub trait ChartDataType: Copy + Default + Debug + Display + 'static {
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;

    /// Name of the value column in flattened tables.
    fn value_column(self) -> String {
        String::from("volume")
    }
}

fn parse_data_type<D: ChartDataType>(value: &str) -> Result<D, LlamaError> {
    D::ALL
        .iter()
        .copied()
        .find(|candidate| candidate.as_str() == value.trim())
        .ok_or_else(|| {
            let expected = D::ALL
                .iter()
                .map(|candidate| candidate.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            LlamaError::invalid_arguments(format!(
                "invalid dataType '{value}', expected one of {expected}"
            ))
        })
}

/// `dataType` for dex and derivatives volume endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VolumeDataType {
    #[default]
    DailyVolume,
    TotalVolume,
}

/// `dataType` for options volume endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OptionsDataType {
    #[default]
    DailyNotionalVolume,
    DailyPremiumVolume,
    TotalNotionalVolume,
    TotalPremiumVolume,
}

/// `dataType` for fees and revenue endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FeesDataType {
    #[default]
    DailyFees,
    TotalFees,
    DailyRevenue,
    TotalRevenue,
}

impl ChartDataType for VolumeDataType {
    const ALL: &'static [Self] = &[Self::DailyVolume, Self::TotalVolume];

    fn as_str(self) -> &'static str {
        match self {
            Self::DailyVolume => "dailyVolume",
            Self::TotalVolume => "totalVolume",
        }
    }
}

impl ChartDataType for OptionsDataType {
    const ALL: &'static [Self] = &[
        Self::DailyNotionalVolume,
        Self::DailyPremiumVolume,
        Self::TotalNotionalVolume,
        Self::TotalPremiumVolume,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::DailyNotionalVolume => "dailyNotionalVolume",
            Self::DailyPremiumVolume => "dailyPremiumVolume",
            Self::TotalNotionalVolume => "totalNotionalVolume",
            Self::TotalPremiumVolume => "totalPremiumVolume",
        }
    }
}

impl ChartDataType for FeesDataType {
    const ALL: &'static [Self] = &[
        Self::DailyFees,
        Self::TotalFees,
        Self::DailyRevenue,
        Self::TotalRevenue,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::DailyFees => "dailyFees",
            Self::TotalFees => "totalFees",
            Self::DailyRevenue => "dailyRevenue",
            Self::TotalRevenue => "totalRevenue",
        }
    }

    fn value_column(self) -> String {
        fees_column_name(self.as_str())
    }
}

macro_rules! impl_data_type_text {
    ($($name:ty),+) => {
        $(
            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.as_str())
                }
            }

            impl FromStr for $name {
                type Err = LlamaError;

                fn from_str(value: &str) -> Result<Self, Self::Err> {
                    parse_data_type(value)
                }
            }
        )+
    };
}

impl_data_type_text!(VolumeDataType, OptionsDataType, FeesDataType);

/// Which chart representation a normalized call flattens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSelection {
    /// `totalDataChart`: one value per timestamp.
    Aggregate,
    /// `totalDataChartBreakdown`: per-entity values per timestamp.
    Breakdown,
}

/// Parameters shared by volume, options and fees endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChartParams<D> {
    pub exclude_total_data_chart: bool,
    pub exclude_total_data_chart_breakdown: bool,
    pub data_type: D,
}

pub type VolumeParams = ChartParams<VolumeDataType>;
pub type OptionsParams = ChartParams<OptionsDataType>;
pub type FeesParams = ChartParams<FeesDataType>;

impl<D: ChartDataType> ChartParams<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests only `totalDataChart`.
    pub fn aggregate() -> Self {
        Self {
            exclude_total_data_chart: false,
            exclude_total_data_chart_breakdown: true,
            data_type: D::default(),
        }
    }

    /// Requests only `totalDataChartBreakdown`.
    pub fn breakdown() -> Self {
        Self {
            exclude_total_data_chart: true,
            exclude_total_data_chart_breakdown: false,
            data_type: D::default(),
        }
    }

    pub fn with_data_type(mut self, data_type: D) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_exclusions(mut self, total_data_chart: bool, breakdown: bool) -> Self {
        self.exclude_total_data_chart = total_data_chart;
        self.exclude_total_data_chart_breakdown = breakdown;
        self
    }

    /// Breakdown only when exactly the aggregate chart is excluded; every
    /// other combination, including equal flags, selects the aggregate chart.
    pub fn selection(&self) -> ChartSelection {
        if self.exclude_total_data_chart && !self.exclude_total_data_chart_breakdown {
            ChartSelection::Breakdown
        } else {
            ChartSelection::Aggregate
        }
    }

    pub fn query(&self) -> Query {
        Query::new()
            .with("excludeTotalDataChart", self.exclude_total_data_chart)
            .with(
                "excludeTotalDataChartBreakdown",
                self.exclude_total_data_chart_breakdown,
            )
            .with("dataType", self.data_type.as_str())
    }
}

/// Parameters for `/bridges`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgesParams {
    /// Include the previous day's volume breakdown by chain.
    pub include_chains: bool,
}

impl BridgesParams {
    pub fn query(&self) -> Query {
        Query::new().with("includeChains", self.include_chains)
    }
}

/// Optional bridge filter for chain-scoped bridge endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BridgeFilter {
    pub id: Option<u32>,
}

impl BridgeFilter {
    pub fn bridge(id: u32) -> Self {
        Self { id: Some(id) }
    }

    pub fn query(&self) -> Query {
        let mut query = Query::new();
        query.push_opt("id", self.id);
        query
    }
}

/// Filters for `/transactions/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionParams {
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
    pub source_chain: Option<String>,
    /// `{chain}:{address}`; matches either side of a transfer.
    pub address: Option<String>,
    pub limit: Option<u32>,
}

impl TransactionParams {
    pub fn validate(&self) -> Result<(), LlamaError> {
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_TRANSACTION_LIMIT {
                return Err(LlamaError::invalid_arguments(format!(
                    "transaction limit must be between 1 and {MAX_TRANSACTION_LIMIT}, got {limit}"
                )));
            }
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(LlamaError::invalid_arguments(
                    "transaction range start must not be after its end",
                ));
            }
        }
        if let Some(address) = &self.address {
            if !address.contains(':') {
                return Err(LlamaError::invalid_arguments(format!(
                    "address '{address}' must be formatted as chain:address"
                )));
            }
        }
        Ok(())
    }

    pub fn query(&self) -> Query {
        let mut query = Query::new();
        query.push_opt("starttimestamp", self.start.map(OffsetDateTime::unix_timestamp));
        query.push_opt("endtimestamp", self.end.map(OffsetDateTime::unix_timestamp));
        query.push_opt("sourcechain", self.source_chain.as_deref());
        query.push_opt("address", self.address.as_deref());
        query.push_opt("limit", self.limit);
        query
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn flag_resolution_prefers_aggregate_unless_only_aggregate_is_excluded() {
        let cases = [
            ((false, true), ChartSelection::Aggregate),
            ((true, false), ChartSelection::Breakdown),
            ((true, true), ChartSelection::Aggregate),
            ((false, false), ChartSelection::Aggregate),
        ];

        for ((chart, breakdown), expected) in cases {
            let params = VolumeParams::new().with_exclusions(chart, breakdown);
            assert_eq!(params.selection(), expected, "flags ({chart}, {breakdown})");
        }
    }

    #[test]
    fn defaults_follow_each_family() {
        assert_eq!(VolumeParams::new().data_type, VolumeDataType::DailyVolume);
        assert_eq!(OptionsParams::new().data_type, OptionsDataType::DailyNotionalVolume);
        assert_eq!(FeesParams::new().data_type, FeesDataType::DailyFees);
        assert_eq!(FeesDataType::TotalRevenue.value_column(), "total_revenue");
        assert_eq!(OptionsDataType::TotalPremiumVolume.value_column(), "volume");
    }

    #[test]
    fn chart_query_carries_flags_and_data_type() {
        let query = FeesParams::breakdown()
            .with_data_type(FeesDataType::DailyRevenue)
            .query();

        assert_eq!(query.get("excludeTotalDataChart"), Some("true"));
        assert_eq!(query.get("excludeTotalDataChartBreakdown"), Some("false"));
        assert_eq!(query.get("dataType"), Some("dailyRevenue"));
    }

    #[test]
    fn data_types_parse_from_provider_names() {
        assert_eq!(
            "totalPremiumVolume".parse::<OptionsDataType>().expect("known"),
            OptionsDataType::TotalPremiumVolume
        );
        let err = "weeklyVolume".parse::<VolumeDataType>().expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::InvalidArguments);
        assert!(err.to_string().contains("dailyVolume, totalVolume"));
    }

    #[test]
    fn transaction_params_validate_limit_and_range() {
        let too_many = TransactionParams {
            limit: Some(6_001),
            ..TransactionParams::default()
        };
        assert!(too_many.validate().is_err());

        let start = OffsetDateTime::from_unix_timestamp(1_692_385_206).expect("valid ts");
        let end = OffsetDateTime::from_unix_timestamp(1_692_056_796).expect("valid ts");
        let reversed = TransactionParams {
            start: Some(start),
            end: Some(end),
            ..TransactionParams::default()
        };
        assert!(reversed.validate().is_err());

        let valid = TransactionParams {
            start: Some(end),
            end: Some(start),
            source_chain: Some(String::from("ethereum")),
            limit: Some(100),
            ..TransactionParams::default()
        };
        valid.validate().expect("valid params");
        let query = valid.query();
        assert_eq!(query.get("starttimestamp"), Some("1692056796"));
        assert_eq!(query.get("sourcechain"), Some("ethereum"));
        assert_eq!(query.get("address"), None);
    }
}
