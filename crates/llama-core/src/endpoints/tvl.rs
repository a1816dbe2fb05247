use serde_json::{Map, Value};

use crate::client::{collect_raw, finish_table, segment, shape};
use crate::domain::{Format, Payload, Table, Targets};
use crate::http_client::Query;
use crate::normalize::objects;
use crate::{ApiTag, LlamaClient, LlamaError};

impl LlamaClient {
    /// Current TVL of every protocol (`/protocols`).
    ///
    /// Table: `chain, protocol, tvl`, one row per entry of each protocol's
    /// `chainTvls`, with `protocol` taken from the slug.
    pub fn all_protocols_current_tvl(&self, format: Format) -> Result<Payload, LlamaError> {
        const ENDPOINT: &str = "/protocols";
        let response = self.get(ApiTag::Tvl, ENDPOINT, &Query::new())?;

        shape(ENDPOINT, format, response, |raw| {
            let mut table = Table::new(["chain", "protocol", "tvl"]);
            for protocol in objects(raw, ENDPOINT)? {
                let slug = protocol.get("slug").cloned().unwrap_or(Value::Null);
                for (chain, tvl) in object_field(protocol, "chainTvls", ENDPOINT)? {
                    table.push_row(vec![Value::from(chain.as_str()), slug.clone(), tvl.clone()]);
                }
            }
            Ok(table)
        })
    }

    /// Historical TVL of one or more protocols, broken down by chain
    /// (`/protocol/{protocol}`).
    ///
    /// Table: `date, chain, protocol, tvl`.
    pub fn protocol_historical_tvl(
        &self,
        protocols: impl Into<Targets>,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        const ENDPOINT: &str = "/protocol";
        let targets = protocols.into();
        let responses = self.fetch_each(
            ApiTag::Tvl,
            &targets,
            "protocol",
            &Query::new(),
            |protocol| format!("{ENDPOINT}/{}", segment(protocol)),
            |_, _| Ok(()),
        )?;

        if format.is_raw() {
            return Ok(Payload::Raw(collect_raw(&targets, responses)));
        }

        let mut table = Table::new(["date", "chain", "protocol", "tvl"]);
        for (protocol, response) in &responses {
            let Some(object) = response.as_object() else {
                return Err(LlamaError::shape(ENDPOINT, format!("protocol '{protocol}' is not an object")));
            };
            for (chain, chain_data) in object_field(object, "chainTvls", ENDPOINT)? {
                let points = chain_data.get("tvl").and_then(Value::as_array);
                for point in points.into_iter().flatten() {
                    table.push_row(vec![
                        point.get("date").cloned().unwrap_or(Value::Null),
                        Value::from(chain.as_str()),
                        Value::from(protocol.as_str()),
                        point.get("totalLiquidityUSD").cloned().unwrap_or(Value::Null),
                    ]);
                }
            }
        }
        Ok(finish_table(ENDPOINT, table))
    }

    /// Historical TVL of DeFi across all chains (`/v2/historicalChainTvl`).
    pub fn all_chains_historical_tvl(&self, format: Format) -> Result<Payload, LlamaError> {
        const ENDPOINT: &str = "/v2/historicalChainTvl";
        let response = self.get(ApiTag::Tvl, ENDPOINT, &Query::new())?;

        shape(ENDPOINT, format, response, |raw| {
            Ok(Table::from_objects(objects(raw, ENDPOINT)?))
        })
    }

    /// Historical TVL of one or more chains (`/v2/historicalChainTvl/{chain}`).
    ///
    /// Table: the provider's `date, tvl` points plus a `chain` column.
    pub fn chain_historical_tvl(
        &self,
        chains: impl Into<Targets>,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        const ENDPOINT: &str = "/v2/historicalChainTvl";
        let targets = chains.into();
        let responses = self.fetch_each(
            ApiTag::Tvl,
            &targets,
            "chain",
            &Query::new(),
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

    /// Current TVL of one or more protocols (`/tvl/{protocol}`).
    ///
    /// Raw: a number for a single protocol, otherwise an object of numbers
    /// keyed by protocol. Table: `protocol, tvl`.
    pub fn protocol_current_tvl(
        &self,
        protocols: impl Into<Targets>,
        format: Format,
    ) -> Result<Payload, LlamaError> {
        const ENDPOINT: &str = "/tvl";
        let targets = protocols.into();
        let responses = self.fetch_each(
            ApiTag::Tvl,
            &targets,
            "protocol",
            &Query::new(),
            |protocol| format!("{ENDPOINT}/{}", segment(protocol)),
            |protocol, response| {
                if response.is_number() {
                    Ok(())
                } else {
                    Err(LlamaError::Shape {
                        endpoint: String::from(ENDPOINT),
                        entity: Some(format!("protocol '{protocol}'")),
                        data_type: None,
                        detail: format!("expected a numeric TVL, got {response}"),
                    })
                }
            },
        )?;

        if format.is_raw() {
            return Ok(Payload::Raw(collect_raw(&targets, responses)));
        }

        let mut table = Table::new(["protocol", "tvl"]);
        for (protocol, tvl) in responses {
            table.push_row(vec![Value::from(protocol), tvl]);
        }
        Ok(finish_table(ENDPOINT, table))
    }

    /// Current TVL of every chain (`/v2/chains`). Table: `chain, tvl`.
    pub fn all_chains_current_tvl(&self, format: Format) -> Result<Payload, LlamaError> {
        const ENDPOINT: &str = "/v2/chains";
        let response = self.get(ApiTag::Tvl, ENDPOINT, &Query::new())?;

        shape(ENDPOINT, format, response, |raw| {
            let mut table = Table::new(["chain", "tvl"]);
            for chain in objects(raw, ENDPOINT)? {
                table.push_row(vec![
                    chain.get("name").cloned().unwrap_or(Value::Null),
                    chain.get("tvl").cloned().unwrap_or(Value::Null),
                ]);
            }
            Ok(table)
        })
    }
}

/// Entries of an optional object-valued field; absent or `null` reads as empty.
fn object_field<'v>(
    object: &'v Map<String, Value>,
    field: &str,
    endpoint: &str,
) -> Result<Vec<(&'v String, &'v Value)>, LlamaError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(entries)) => Ok(entries.iter().collect()),
        Some(_) => Err(LlamaError::shape(endpoint, format!("'{field}' is not an object"))),
    }
}
