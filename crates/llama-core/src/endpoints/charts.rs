//! Volume, derivatives, options and fees charts.
//!
//! All four families share one response shape (`totalDataChart` and
//! `totalDataChartBreakdown`) and differ only in host, path segment and
//! `dataType` vocabulary.

use crate::client::{collect_raw, finish_table, segment};
use crate::domain::{Format, Payload, Table, Targets};
use crate::normalize::{ensure_chart_present, flatten_chart, ChartContext, ChartLayout, Scope};
use crate::params::{ChartDataType, ChartParams, FeesParams, OptionsParams, VolumeParams};
use crate::{ApiTag, LlamaClient, LlamaError};

#[derive(Debug, Clone, Copy)]
struct ChartFamily {
    tag: ApiTag,
    segment: &'static str,
}

impl ChartFamily {
    const DEXS: Self = Self::volumes("dexs");
    const DERIVATIVES: Self = Self::volumes("derivatives");
    const OPTIONS: Self = Self::volumes("options");
    const FEES: Self = Self {
        tag: ApiTag::Fees,
        segment: "fees",
    };

    const fn volumes(segment: &'static str) -> Self {
        Self {
            tag: ApiTag::Volumes,
            segment,
        }
    }

    fn overview(self) -> String {
        format!("/overview/{}", self.segment)
    }

    fn summary(self) -> String {
        format!("/summary/{}", self.segment)
    }
}

#[derive(Debug, Clone, Copy)]
enum ScopeKind {
    Chain,
    Protocol,
}

impl ScopeKind {
    fn name(self) -> &'static str {
        match self {
            Self::Chain => "chain",
            Self::Protocol => "protocol",
        }
    }

    fn scope(self, key: &str) -> Scope<'_> {
        match self {
            Self::Chain => Scope::Chain(key),
            Self::Protocol => Scope::Protocol(key),
        }
    }

    fn layout(self) -> ChartLayout {
        match self {
            Self::Chain => ChartLayout::OVERVIEW,
            Self::Protocol => ChartLayout::SUMMARY,
        }
    }
}

impl LlamaClient {
    /// Every dex with its volume history (`/overview/dexs`).
    pub fn dex_volume(&self, params: &VolumeParams, format: Format) -> Result<Payload, LlamaError> {
        self.overview_chart(ChartFamily::DEXS, params, format)
    }

    /// Dex volume on one or more chains (`/overview/dexs/{chain}`).
    pub fn chain_dex_volume(
        &self,
        chains: impl Into<Targets>,
        params: &VolumeParams,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        self.scoped_chart(ChartFamily::DEXS, ScopeKind::Chain, chains.into(), params, format)
    }

    /// Volume of one or more dex protocols (`/summary/dexs/{protocol}`).
    pub fn protocol_dex_volume(
        &self,
        protocols: impl Into<Targets>,
        params: &VolumeParams,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        self.scoped_chart(ChartFamily::DEXS, ScopeKind::Protocol, protocols.into(), params, format)
    }

    /// Every perpetuals protocol with its volume history (`/overview/derivatives`).
    pub fn perps_volume(&self, params: &VolumeParams, format: Format) -> Result<Payload, LlamaError> {
        self.overview_chart(ChartFamily::DERIVATIVES, params, format)
    }

    /// Perpetuals volume on one or more chains (`/overview/derivatives/{chain}`).
    pub fn chain_perps_volume(
        &self,
        chains: impl Into<Targets>,
        params: &VolumeParams,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        self.scoped_chart(ChartFamily::DERIVATIVES, ScopeKind::Chain, chains.into(), params, format)
    }

    /// Volume of one or more perpetuals protocols (`/summary/derivatives/{protocol}`).
    pub fn protocol_perps_volume(
        &self,
        protocols: impl Into<Targets>,
        params: &VolumeParams,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        self.scoped_chart(
            ChartFamily::DERIVATIVES,
            ScopeKind::Protocol,
            protocols.into(),
            params,
            format,
        )
    }

    /// Every options dex with its notional or premium history (`/overview/options`).
    pub fn options_volume(&self, params: &OptionsParams, format: Format) -> Result<Payload, LlamaError> {
        self.overview_chart(ChartFamily::OPTIONS, params, format)
    }

    /// Options volume on one or more chains (`/overview/options/{chain}`).
    pub fn chain_options_volume(
        &self,
        chains: impl Into<Targets>,
        params: &OptionsParams,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        self.scoped_chart(ChartFamily::OPTIONS, ScopeKind::Chain, chains.into(), params, format)
    }

    /// Volume of one or more options protocols (`/summary/options/{protocol}`).
    pub fn protocol_options_volume(
        &self,
        protocols: impl Into<Targets>,
        params: &OptionsParams,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        self.scoped_chart(ChartFamily::OPTIONS, ScopeKind::Protocol, protocols.into(), params, format)
    }

    /// Fees or revenue of every protocol (`/overview/fees`).
    ///
    /// The value column follows `dataType`, e.g. `daily_revenue`.
    pub fn fees_revenue(&self, params: &FeesParams, format: Format) -> Result<Payload, LlamaError> {
        self.overview_chart(ChartFamily::FEES, params, format)
    }

    /// Fees or revenue on one or more chains (`/overview/fees/{chain}`).
    pub fn chain_fees_revenue(
        &self,
        chains: impl Into<Targets>,
        params: &FeesParams,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        self.scoped_chart(ChartFamily::FEES, ScopeKind::Chain, chains.into(), params, format)
    }

    /// Fees or revenue of one or more protocols (`/summary/fees/{protocol}`).
    pub fn protocol_fees_revenue(
        &self,
        protocols: impl Into<Targets>,
        params: &FeesParams,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        self.scoped_chart(ChartFamily::FEES, ScopeKind::Protocol, protocols.into(), params, format)
    }

    fn overview_chart<D: ChartDataType>(
        &self,
        family: ChartFamily,
        params: &ChartParams<D>,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        let endpoint = family.overview();
        let response = self.get(family.tag, &endpoint, &params.query())?;
        if format.is_raw() {
            return Ok(Payload::Raw(response));
        }

        let context = ChartContext {
            endpoint: &endpoint,
            scope: Scope::Global,
            data_type: params.data_type.as_str(),
        };
        let table = flatten_chart(
            &response,
            params.selection(),
            ChartLayout::OVERVIEW,
            &params.data_type.value_column(),
            &context,
        )?;
        Ok(finish_table(&endpoint, table))
    }

    fn scoped_chart<D: ChartDataType>(
        &self,
        family: ChartFamily,
        kind: ScopeKind,
        targets: Targets,
        params: &ChartParams<D>,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        let endpoint = match kind {
            ScopeKind::Chain => family.overview(),
            ScopeKind::Protocol => family.summary(),
        };
        let data_type = params.data_type.as_str();

        let responses = self.fetch_each(
            family.tag,
            &targets,
            kind.name(),
            &params.query(),
            |key| format!("{endpoint}/{}", segment(key)),
            |key, response| {
                let context = ChartContext {
                    endpoint: &endpoint,
                    scope: kind.scope(key),
                    data_type,
                };
                ensure_chart_present(response, &context)
            },
        )?;

        if format.is_raw() {
            return Ok(Payload::Raw(collect_raw(&targets, responses)));
        }

        let value_column = params.data_type.value_column();
        let tables = responses
            .iter()
            .map(|(key, response)| {
                let context = ChartContext {
                    endpoint: &endpoint,
                    scope: kind.scope(key),
                    data_type,
                };
                flatten_chart(response, params.selection(), kind.layout(), &value_column, &context)
            })
            .collect::<Result<Vec<_>, LlamaError>>()?;
        Ok(finish_table(&endpoint, Table::concat(tables)))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::http_client::FixtureHttpClient;
    use crate::params::{FeesDataType, OptionsDataType};

    #[test]
    fn families_route_to_their_hosts() {
        assert_eq!(ChartFamily::DEXS.overview(), "/overview/dexs");
        assert_eq!(ChartFamily::DERIVATIVES.summary(), "/summary/derivatives");
        assert_eq!(ChartFamily::FEES.tag.base_url(), "https://api.llama.fi");
        assert_eq!(ChartFamily::OPTIONS.tag, ApiTag::Volumes);
    }

    #[test]
    fn overview_aggregate_has_date_and_value() {
        let fixture = FixtureHttpClient::new().with_json(
            "https://api.llama.fi/overview/options",
            r#"{"totalDataChart":[[1,10.0],[2,20.0]],"totalDataChartBreakdown":null}"#,
        );
        let client = LlamaClient::with_http_client(Arc::new(fixture));
        let params = OptionsParams::aggregate().with_data_type(OptionsDataType::DailyPremiumVolume);

        let payload = client.options_volume(&params, Format::Table).expect("normalizes");
        let table = payload.as_table().expect("table");

        assert_eq!(table.columns(), ["date", "volume"]);
        assert_eq!(table.rows()[1], vec![json!(2), json!(20.0)]);
    }

    #[test]
    fn scoped_query_is_forwarded_per_key() {
        let fixture = Arc::new(
            FixtureHttpClient::new()
                .with_json("https://api.llama.fi/overview/fees/ethereum", r#"{"totalDataChart":[]}"#),
        );
        let client = LlamaClient::with_http_client(fixture.clone());
        let params = FeesParams::aggregate().with_data_type(FeesDataType::TotalFees);

        client
            .chain_fees_revenue("ethereum", &params, Format::Table)
            .expect("empty chart is fine");

        let urls = fixture.recorded_urls();
        assert_eq!(urls.len(), 1);
        assert!(urls[0].contains("dataType=totalFees"));
        assert!(urls[0].contains("excludeTotalDataChartBreakdown=true"));
    }
}
