use crate::common;
use chrono::NaiveDate;
use httpmock::Method::GET;
use tradestation_rs::{BarUnit, MarketData, SessionTemplate};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A 120-day minute-bar range against a 57,600-bar cap splits into three
/// 40-day-max windows. Each window is mocked separately, with bars returned
/// out of order, and the merged response must come back sorted with no
/// duplicates across the chunk seams.
#[tokio::test]
async fn long_range_is_chunked_fetched_and_merged_in_order() {
    let server = common::setup_server();
    common::mock_token(&server, "tok-1");

    let chunk1 = server.mock(|when, then| {
        when.method(GET)
            .path("/v3/marketdata/barcharts/AAPL")
            .query_param("firstdate", "2024-01-01")
            .query_param("lastdate", "2024-02-09")
            .query_param("interval", "1")
            .query_param("unit", "Minute")
            .query_param("sessiontemplate", "USEQPreAndPost");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::bars_json(&[
                "2024-01-02T14:31:00Z",
                "2024-01-02T14:30:00Z",
            ]));
    });
    let chunk2 = server.mock(|when, then| {
        when.method(GET)
            .path("/v3/marketdata/barcharts/AAPL")
            .query_param("firstdate", "2024-02-10")
            .query_param("lastdate", "2024-03-20");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::bars_json(&[
                "2024-02-12T14:30:00Z",
                "2024-02-12T14:31:00Z",
            ]));
    });
    let chunk3 = server.mock(|when, then| {
        when.method(GET)
            .path("/v3/marketdata/barcharts/AAPL")
            .query_param("firstdate", "2024-03-21")
            .query_param("lastdate", "2024-04-29");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::bars_json(&[
                "2024-03-22T14:30:00Z",
                "2024-03-22T14:31:00Z",
            ]));
    });

    let client = common::client(&server);
    let body = MarketData::new(&client)
        .bars("AAPL")
        .unit(BarUnit::Minute)
        .session_template(SessionTemplate::UseqPreAndPost)
        .between(day(2024, 1, 1), day(2024, 4, 29))
        .fetch()
        .await
        .unwrap();

    let stamps = common::stamps(&body);
    assert_eq!(
        stamps,
        vec![
            "2024-01-02T14:30:00Z",
            "2024-01-02T14:31:00Z",
            "2024-02-12T14:30:00Z",
            "2024-02-12T14:31:00Z",
            "2024-03-22T14:30:00Z",
            "2024-03-22T14:31:00Z",
        ]
    );
    chunk1.assert_hits(1);
    chunk2.assert_hits(1);
    chunk3.assert_hits(1);
}

#[tokio::test]
async fn short_range_stays_a_single_request() {
    let server = common::setup_server();
    common::mock_token(&server, "tok-1");

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v3/marketdata/barcharts/MSFT")
            .query_param("firstdate", "2024-01-01")
            .query_param("lastdate", "2024-01-31")
            .query_param("unit", "Minute");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::bars_json(&["2024-01-02T14:30:00Z"]));
    });

    let client = common::client(&server);
    let body = MarketData::new(&client)
        .bars("MSFT")
        .unit(BarUnit::Minute)
        .between(day(2024, 1, 1), day(2024, 1, 31))
        .fetch()
        .await
        .unwrap();

    assert_eq!(common::stamps(&body), vec!["2024-01-02T14:30:00Z"]);
    mock.assert_hits(1);
}

#[tokio::test]
async fn barsback_request_passes_the_lookback_through() {
    let server = common::setup_server();
    common::mock_token(&server, "tok-1");

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/v3/marketdata/barcharts/SPY")
            .query_param("barsback", "500")
            .query_param("interval", "5")
            .query_param("unit", "Minute");
        then.status(200)
            .header("content-type", "application/json")
            .body(common::bars_json(&["2024-05-01T14:30:00Z"]));
    });

    let client = common::client(&server);
    let body = MarketData::new(&client)
        .bars("SPY")
        .interval(5)
        .unit(BarUnit::Minute)
        .barsback(500)
        .fetch()
        .await
        .unwrap();

    assert_eq!(common::stamps(&body).len(), 1);
    mock.assert_hits(1);
}
