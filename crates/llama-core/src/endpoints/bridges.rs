use serde_json::{Map, Value};
use time::OffsetDateTime;

use crate::client::{collect_raw, finish_table, segment, shape};
use crate::domain::{Format, Payload, Table, Targets};
use crate::http_client::Query;
use crate::normalize::{envelope, objects};
use crate::params::{BridgeFilter, BridgesParams, TransactionParams};
use crate::{ApiTag, LlamaClient, LlamaError};

/// Summary fields of `/bridge/{id}`, as `(provider field, column)`.
const BRIDGE_SUMMARY_FIELDS: [(&str, &str); 5] = [
    ("displayName", "name"),
    ("lastDailyVolume", "last_daily_volume"),
    ("dayBeforeLastVolume", "day_before_last_volume"),
    ("weeklyVolume", "weekly_volume"),
    ("monthlyVolume", "monthly_volume"),
];

const DAY_STATS_DIRECTIONS: [(&str, &str); 2] = [
    ("totalTokensDeposited", "deposit"),
    ("totalTokensWithdrawn", "withdrawal"),
];

impl LlamaClient {
    /// Every bridge with its volume summary (`/bridges`).
    ///
    /// The table is built from the `bridges` envelope; raw output keeps the
    /// whole response, including the optional per-chain breakdown.
    pub fn all_bridge_volume(&self, params: &BridgesParams, format: Format) -> Result<Payload, LlamaError> {
        const ENDPOINT: &str = "/bridges";
        let response = self.get(ApiTag::Bridges, ENDPOINT, &params.query())?;

        shape(ENDPOINT, format, response, |raw| {
            let bridges = envelope(raw, "bridges", ENDPOINT)?;
            Ok(Table::from_objects(objects(bridges, ENDPOINT)?))
        })
    }

    /// Volume summary of one or more bridges (`/bridge/{id}`).
    ///
    /// Table: `bridge, name, last_daily_volume, day_before_last_volume,
    /// weekly_volume, monthly_volume`, one row per id.
    pub fn bridge_volume(&self, ids: impl Into<Targets>, format: Format) -> Result<Payload, LlamaError> {
        const ENDPOINT: &str = "/bridge";
        let targets = ids.into();
        let responses = self.fetch_each(
            ApiTag::Bridges,
            &targets,
            "bridge id",
            &Query::new(),
            |id| format!("{ENDPOINT}/{}", segment(id)),
            |id, response| {
                if response.is_object() {
                    Ok(())
                } else {
                    Err(LlamaError::shape(ENDPOINT, format!("bridge '{id}' is not an object")))
                }
            },
        )?;

        if format.is_raw() {
            return Ok(Payload::Raw(collect_raw(&targets, responses)));
        }

        let mut columns = vec!["bridge"];
        columns.extend(BRIDGE_SUMMARY_FIELDS.iter().map(|(_, column)| *column));
        let mut table = Table::new(columns);
        for (id, response) in &responses {
            let mut row = vec![Value::from(id.as_str())];
            row.extend(
                BRIDGE_SUMMARY_FIELDS
                    .iter()
                    .map(|(field, _)| response.get(*field).cloned().unwrap_or(Value::Null)),
            );
            table.push_row(row);
        }
        Ok(finish_table(ENDPOINT, table))
    }

    /// Historical bridge volume on one or more chains (`/bridgevolume/{chain}`),
    /// optionally restricted to one bridge.
    pub fn chain_bridge_volume(
        &self,
        chains: impl Into<Targets>,
        filter: &BridgeFilter,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        const ENDPOINT: &str = "/bridgevolume";
        let targets = chains.into();
        let responses = self.fetch_each(
            ApiTag::Bridges,
            &targets,
            "chain",
            &filter.query(),
            |chain| format!("{ENDPOINT}/{}", segment(chain)),
            |_, _| Ok(()),
        )?;

        if format.is_raw() {
            return Ok(Payload::Raw(collect_raw(&targets, responses)));
        }

        let tables = responses
            .iter()
            .map(|(chain, response)| {
                Ok(Table::from_objects(objects(response, ENDPOINT)?)
                    .with_constant_column("chain", Value::from(chain.as_str())))
            })
            .collect::<Result<Vec<_>, LlamaError>>()?;
        Ok(finish_table(ENDPOINT, Table::concat(tables)))
    }

    /// 24h token volume on one or more chains for the UTC day containing
    /// `day` (`/bridgedaystats/{timestamp}/{chain}`).
    ///
    /// Table: `date, chain, direction, token, usd_value, amount`, with
    /// `direction` either `deposit` or `withdrawal`.
    pub fn bridge_day_stats(
        &self,
        day: OffsetDateTime,
        chains: impl Into<Targets>,
        filter: &BridgeFilter,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        const ENDPOINT: &str = "/bridgedaystats";
        let timestamp = day.unix_timestamp();
        let targets = chains.into();
        let responses = self.fetch_each(
            ApiTag::Bridges,
            &targets,
            "chain",
            &filter.query(),
            |chain| format!("{ENDPOINT}/{timestamp}/{}", segment(chain)),
            |_, _| Ok(()),
        )?;

        if format.is_raw() {
            return Ok(Payload::Raw(collect_raw(&targets, responses)));
        }

        let mut table = Table::new(["date", "chain", "direction", "token", "usd_value", "amount"]);
        for (chain, response) in &responses {
            let date = response.get("date").cloned().unwrap_or_else(|| Value::from(timestamp));
            for (field, direction) in DAY_STATS_DIRECTIONS {
                for (token, stats) in token_stats(response, field, ENDPOINT)? {
                    table.push_row(vec![
                        date.clone(),
                        Value::from(chain.as_str()),
                        Value::from(direction),
                        Value::from(token.as_str()),
                        stats.get("usdValue").cloned().unwrap_or(Value::Null),
                        stats.get("amount").cloned().unwrap_or(Value::Null),
                    ]);
                }
            }
        }
        Ok(finish_table(ENDPOINT, table))
    }

    /// Transactions of one bridge (`/transactions/{id}`).
    ///
    /// Parameters are validated before any request is made.
    pub fn bridge_transactions(
        &self,
        id: u32,
        params: &TransactionParams,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        const ENDPOINT: &str = "/transactions";
        params.validate()?;
        let response = self.get(ApiTag::Bridges, &format!("{ENDPOINT}/{id}"), &params.query())?;

        shape(ENDPOINT, format, response, |raw| {
            Ok(Table::from_objects(objects(raw, ENDPOINT)?))
        })
    }
}

/// `{token: {usdValue, amount, ...}}` under `field`; absent reads as empty.
fn token_stats<'v>(
    response: &'v Value,
    field: &str,
    endpoint: &str,
) -> Result<Vec<(&'v String, &'v Map<String, Value>)>, LlamaError> {
    let Some(tokens) = response.get(field).filter(|value| !value.is_null()) else {
        return Ok(Vec::new());
    };
    let tokens = tokens
        .as_object()
        .ok_or_else(|| LlamaError::shape(endpoint, format!("'{field}' is not an object")))?;
    tokens
        .iter()
        .map(|(token, stats)| {
            stats
                .as_object()
                .map(|stats| (token, stats))
                .ok_or_else(|| LlamaError::shape(endpoint, format!("'{field}.{token}' is not an object")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::http_client::FixtureHttpClient;
    use crate::ErrorKind;

    #[test]
    fn transaction_limit_is_checked_before_the_request() {
        let fixture = Arc::new(FixtureHttpClient::new());
        let client = LlamaClient::with_http_client(fixture.clone());
        let params = TransactionParams {
            limit: Some(6_001),
            ..TransactionParams::default()
        };

        let err = client
            .bridge_transactions(1, &params, Format::Table)
            .expect_err("limit above maximum");

        assert_eq!(err.kind(), ErrorKind::InvalidArguments);
        assert!(fixture.recorded_requests().is_empty());
    }

    #[test]
    fn day_stats_split_deposits_and_withdrawals() {
        let fixture = FixtureHttpClient::new().with_json(
            "https://bridges.llama.fi/bridgedaystats/1700000000/ethereum",
            r#"{
                "date": 1699920000,
                "totalTokensDeposited": {"ethereum:0xa0b8": {"usdValue": 10.5, "amount": "10", "symbol": "USDC"}},
                "totalTokensWithdrawn": {"ethereum:0xdac1": {"usdValue": 3.0, "amount": "3", "symbol": "USDT"}}
            }"#,
        );
        let client = LlamaClient::with_http_client(Arc::new(fixture));
        let day = OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid ts");

        let payload = client
            .bridge_day_stats(day, "ethereum", &BridgeFilter::default(), Format::Table)
            .expect("normalizes");
        let table = payload.as_table().expect("table");

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "direction"), Some(&json!("deposit")));
        assert_eq!(table.get(1, "token"), Some(&json!("ethereum:0xdac1")));
        assert_eq!(table.get(1, "date"), Some(&json!(1_699_920_000)));
    }
}
