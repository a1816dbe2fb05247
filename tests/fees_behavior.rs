//! Behavior-driven tests for fees and revenue endpoints
//!
//! These tests verify the dynamic value column derived from `dataType` and
//! the scoped fees summaries.

use llama_core::{ErrorKind, FeesDataType, FeesParams, FixtureHttpClient, Format, LlamaClient};
use serde_json::json;
use std::sync::Arc;

fn client_with(fixture: FixtureHttpClient) -> (LlamaClient, Arc<FixtureHttpClient>) {
    let fixture = Arc::new(fixture);
    (LlamaClient::with_http_client(fixture.clone()), fixture)
}

// =============================================================================
// Fees: Value Column
// =============================================================================

#[test]
fn when_total_revenue_is_requested_system_names_the_column_total_revenue() {
    // Given: A fees overview aggregate chart
    let (client, fixture) = client_with(FixtureHttpClient::new().with_json(
        "https://api.llama.fi/overview/fees",
        r#"{"totalDataChart": [[1000, 5.0], [2000, 7.5]]}"#,
    ));
    let params = FeesParams::aggregate().with_data_type(FeesDataType::TotalRevenue);

    // When: The chart is requested as a table
    let payload = client.fees_revenue(&params, Format::Table).expect("fees should flatten");

    // Then: Rows carry the derived column name
    let records = payload.into_table().expect("table").records();
    assert_eq!(
        records.into_iter().map(serde_json::Value::Object).collect::<Vec<_>>(),
        [
            json!({"date": 1000, "total_revenue": 5.0}),
            json!({"date": 2000, "total_revenue": 7.5}),
        ]
    );

    // And: The data type reached the provider
    assert!(fixture.recorded_urls()[0].contains("dataType=totalRevenue"));
}

#[test]
fn when_default_params_are_used_system_reports_daily_fees() {
    // Given: A fees overview
    let (client, _) = client_with(FixtureHttpClient::new().with_json(
        "https://api.llama.fi/overview/fees",
        r#"{"totalDataChart": [[1000, 1.0]]}"#,
    ));

    // When: Default parameters are used
    let table = client
        .fees_revenue(&FeesParams::new(), Format::Table)
        .expect("fees should flatten")
        .into_table()
        .expect("table");

    // Then: The value column is daily_fees
    assert_eq!(table.columns(), ["date", "daily_fees"]);
}

#[test]
fn when_protocol_fees_are_broken_down_system_uses_summary_layout() {
    // Given: A protocol fees summary with a chain/version breakdown
    let (client, _) = client_with(FixtureHttpClient::new().with_json(
        "https://api.llama.fi/summary/fees/aave",
        r#"{"totalDataChartBreakdown": [[1000, {"Ethereum": {"Aave V3": 3.0}, "Arbitrum One": {"Aave V3": 1.0}}]]}"#,
    ));
    let params = FeesParams::breakdown().with_data_type(FeesDataType::DailyRevenue);

    // When: The breakdown is requested
    let table = client
        .protocol_fees_revenue("aave", &params, Format::Table)
        .expect("breakdown should flatten")
        .into_table()
        .expect("table");

    // Then: Columns follow the summary layout and chains are canonical
    assert_eq!(
        table.columns(),
        ["timestamp", "protocol", "chain", "protocol_version", "daily_revenue"]
    );
    let chains = table.column("chain").expect("chain column");
    assert_eq!(chains, [&json!("ethereum"), &json!("arbitrum_one")]);
    assert_eq!(table.get(0, "protocol"), Some(&json!("aave")));
}

#[test]
fn when_chain_fees_are_missing_system_fails_with_entity_and_data_type() {
    // Given: A chain without fee data
    let (client, _) = client_with(FixtureHttpClient::new().with_json(
        "https://api.llama.fi/overview/fees/ethereum",
        r#"{"protocols": []}"#,
    ));
    let params = FeesParams::new().with_data_type(FeesDataType::TotalFees);

    // When: The chain is requested
    let err = client
        .chain_fees_revenue("ethereum", &params, Format::Table)
        .expect_err("no chart");

    // Then: The error names both
    assert_eq!(err.kind(), ErrorKind::Shape);
    let message = err.to_string();
    assert!(message.contains("chain 'ethereum'"), "{message}");
    assert!(message.contains("totalFees"), "{message}");
}
