//! Response normalization: flattening provider JSON into [`Table`]s.
//!
//! Chart endpoints return `totalDataChart` (`[[ts, value], ...]`) and/or
//! `totalDataChartBreakdown` (`[[ts, {entity: value | {sub: value}}], ...]`).
//! [`ChartLayout`] names the columns a given endpoint produces and how deep
//! its breakdown is nested; [`Scope`] adds the constant chain/protocol column
//! for calls made on behalf of one key.

use serde_json::{Map, Value};

use crate::domain::{Table, CHAIN_COLUMN};
use crate::params::ChartSelection;
use crate::LlamaError;

pub const TOTAL_DATA_CHART: &str = "totalDataChart";
pub const TOTAL_DATA_CHART_BREAKDOWN: &str = "totalDataChartBreakdown";

/// Lower-cases a chain name and collapses each run of whitespace or `-`
/// into a single `_`.
pub fn canonical_chain_name(name: &str) -> String {
    let mut canonical = String::with_capacity(name.len());
    let mut in_separator = false;
    for ch in name.chars() {
        if ch.is_whitespace() || ch == '-' {
            if !in_separator {
                canonical.push('_');
                in_separator = true;
            }
        } else {
            canonical.extend(ch.to_lowercase());
            in_separator = false;
        }
    }
    canonical
}

/// `dailyRevenue` → `daily_revenue`, `totalFees` → `total_fees`.
pub fn fees_column_name(data_type: &str) -> String {
    data_type
        .replace("daily", "daily_")
        .replace("total", "total_")
        .to_lowercase()
}

/// Column layout of one chart endpoint family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartLayout {
    pub date_column: &'static str,
    /// Column names for each nesting level of a breakdown entry.
    pub breakdown_levels: &'static [&'static str],
}

impl ChartLayout {
    /// `/overview/*` endpoints: breakdown is keyed by protocol.
    pub const OVERVIEW: Self = Self {
        date_column: "date",
        breakdown_levels: &["protocol"],
    };

    /// `/summary/*/{protocol}` endpoints: breakdown is keyed by chain, then
    /// by protocol version.
    pub const SUMMARY: Self = Self {
        date_column: "timestamp",
        breakdown_levels: &["chain", "protocol_version"],
    };
}

/// Key a chart call was scoped to, emitted as a constant column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    Global,
    Chain(&'a str),
    Protocol(&'a str),
}

impl<'a> Scope<'a> {
    fn column(self) -> Option<(&'static str, &'a str)> {
        match self {
            Self::Global => None,
            Self::Chain(chain) => Some((CHAIN_COLUMN, chain)),
            Self::Protocol(protocol) => Some(("protocol", protocol)),
        }
    }

    fn describe(self) -> Option<String> {
        match self {
            Self::Global => None,
            Self::Chain(chain) => Some(format!("chain '{chain}'")),
            Self::Protocol(protocol) => Some(format!("protocol '{protocol}'")),
        }
    }
}

/// Identifies the call being normalized, for error messages.
#[derive(Debug, Clone, Copy)]
pub struct ChartContext<'a> {
    pub endpoint: &'a str,
    pub scope: Scope<'a>,
    pub data_type: &'a str,
}

impl ChartContext<'_> {
    fn error(&self, detail: impl Into<String>) -> LlamaError {
        LlamaError::Shape {
            endpoint: self.endpoint.to_owned(),
            entity: self.scope.describe(),
            data_type: Some(self.data_type.to_owned()),
            detail: detail.into(),
        }
    }
}

/// Fails unless the response carries at least one of the two charts.
pub fn ensure_chart_present(response: &Value, context: &ChartContext<'_>) -> Result<(), LlamaError> {
    let has_chart = |field: &str| response.get(field).is_some_and(|value| !value.is_null());
    if has_chart(TOTAL_DATA_CHART) || has_chart(TOTAL_DATA_CHART_BREAKDOWN) {
        Ok(())
    } else {
        Err(context.error("no data available"))
    }
}

/// Flattens the chart picked by `selection` into a table.
pub fn flatten_chart(
    response: &Value,
    selection: ChartSelection,
    layout: ChartLayout,
    value_column: &str,
    context: &ChartContext<'_>,
) -> Result<Table, LlamaError> {
    match selection {
        ChartSelection::Aggregate => aggregate_chart(response, layout, value_column, context),
        ChartSelection::Breakdown => breakdown_chart(response, layout, value_column, context),
    }
}

/// `totalDataChart` → `[date, <scope>, value]`, one row per point.
pub fn aggregate_chart(
    response: &Value,
    layout: ChartLayout,
    value_column: &str,
    context: &ChartContext<'_>,
) -> Result<Table, LlamaError> {
    let scope = context.scope.column();
    let mut columns = vec![layout.date_column];
    columns.extend(scope.map(|(name, _)| name));
    columns.push(value_column);

    let mut table = Table::new(columns);
    for (timestamp, value) in chart_points(response, TOTAL_DATA_CHART, context)? {
        let mut row = vec![timestamp.clone()];
        row.extend(scope.map(|(_, key)| Value::from(key)));
        row.push(value.clone());
        table.push_row(row);
    }
    Ok(table)
}

/// `totalDataChartBreakdown` → `[date, <scope>, <levels...>, value]`, one
/// row per leaf value.
pub fn breakdown_chart(
    response: &Value,
    layout: ChartLayout,
    value_column: &str,
    context: &ChartContext<'_>,
) -> Result<Table, LlamaError> {
    let scope = context.scope.column();
    let mut columns = vec![layout.date_column];
    columns.extend(scope.map(|(name, _)| name));
    columns.extend_from_slice(layout.breakdown_levels);
    columns.push(value_column);

    let mut table = Table::new(columns);
    for (timestamp, entities) in chart_points(response, TOTAL_DATA_CHART_BREAKDOWN, context)? {
        let mut prefix = vec![timestamp.clone()];
        prefix.extend(scope.map(|(_, key)| Value::from(key)));
        flatten_levels(entities, layout.breakdown_levels, &mut prefix, &mut table, context)?;
    }
    Ok(table)
}

fn flatten_levels(
    value: &Value,
    levels: &[&str],
    prefix: &mut Vec<Value>,
    table: &mut Table,
    context: &ChartContext<'_>,
) -> Result<(), LlamaError> {
    let Some((level, deeper)) = levels.split_first() else {
        if value.is_object() || value.is_array() {
            return Err(context.error(format!(
                "{TOTAL_DATA_CHART_BREAKDOWN} is nested deeper than expected"
            )));
        }
        let mut row = prefix.clone();
        row.push(value.clone());
        table.push_row(row);
        return Ok(());
    };

    let entries = value.as_object().ok_or_else(|| {
        context.error(format!(
            "{TOTAL_DATA_CHART_BREAKDOWN} entry must map {level} names to values"
        ))
    })?;

    for (key, nested) in entries {
        prefix.push(Value::from(key.as_str()));
        flatten_levels(nested, deeper, prefix, table, context)?;
        prefix.pop();
    }
    Ok(())
}

fn chart_points<'v>(
    response: &'v Value,
    field: &str,
    context: &ChartContext<'_>,
) -> Result<Vec<(&'v Value, &'v Value)>, LlamaError> {
    let points = response
        .get(field)
        .and_then(Value::as_array)
        .ok_or_else(|| context.error(format!("missing '{field}'")))?;

    points
        .iter()
        .enumerate()
        .map(|(index, point)| match point.as_array().map(Vec::as_slice) {
            Some([timestamp, value]) => Ok((timestamp, value)),
            _ => Err(context.error(format!(
                "'{field}' entry {index} is not a [timestamp, value] pair"
            ))),
        })
        .collect()
}

/// Borrows `field` from an object response.
pub fn envelope<'v>(response: &'v Value, field: &str, endpoint: &str) -> Result<&'v Value, LlamaError> {
    response
        .get(field)
        .ok_or_else(|| missing_envelope(field, endpoint))
}

/// Moves `field` out of an object response.
pub fn into_envelope(mut response: Value, field: &str, endpoint: &str) -> Result<Value, LlamaError> {
    response
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| missing_envelope(field, endpoint))
}

fn missing_envelope(field: &str, endpoint: &str) -> LlamaError {
    LlamaError::shape(endpoint, format!("missing '{field}' envelope"))
}

/// Views every element of a JSON array as an object.
pub fn objects<'v>(value: &'v Value, endpoint: &str) -> Result<Vec<&'v Map<String, Value>>, LlamaError> {
    let items = value
        .as_array()
        .ok_or_else(|| LlamaError::shape(endpoint, "expected a JSON array"))?;
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_object().ok_or_else(|| {
                LlamaError::shape(endpoint, format!("array element {index} is not an object"))
            })
        })
        .collect()
}
