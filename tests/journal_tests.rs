mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{build_app, send, setup_test_db, token_for, FakeAuth};

async fn build_test_app() -> Option<(Router, String)> {
    let pool = setup_test_db().await?;
    let app = build_app(pool, Arc::new(FakeAuth::default()));
    // A fresh user per test keeps parallel tests from seeing each other's rows.
    Some((app, token_for(Uuid::new_v4())))
}

fn trade_body(symbol: &str, pnl: Option<&str>, market: Option<&str>, date: &str) -> Value {
    json!({
        "symbol": symbol,
        "side": "Buy",
        "quantity": "10",
        "entry_price": "100",
        "exit_price": "110",
        "pnl": pnl,
        "trade_date": date,
        "market": market,
        "emotional_state": ["calm"],
    })
}

async fn create_trade(app: &Router, token: &str, body: Value) -> Value {
    let (status, json) = send(app, "POST", "/api/trades", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "{json}");
    json["data"].clone()
}

#[tokio::test]
async fn test_trade_crud() {
    let Some((app, token)) = build_test_app().await else { return };

    let trade = create_trade(&app, &token, trade_body("AAPL", Some("100"), Some("stock"), "2024-03-01")).await;
    let id = trade["id"].as_str().unwrap().to_string();
    assert_eq!(trade["side"], "Buy");
    assert_eq!(trade["emotional_state"], json!(["calm"]));

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/trades/{id}"),
        Some(&token),
        Some(json!({ "pnl": "-40", "notes": "stopped out" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["pnl"], "-40");
    assert_eq!(json["data"]["symbol"], "AAPL");
    assert_eq!(json["data"]["notes"], "stopped out");

    let (status, _) = send(&app, "DELETE", &format!("/api/trades/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/api/trades/{id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trades_are_scoped_to_owner() {
    let Some((app, token)) = build_test_app().await else { return };
    let trade = create_trade(&app, &token, trade_body("MSFT", Some("5"), None, "2024-03-02")).await;
    let id = trade["id"].as_str().unwrap();

    let other = token_for(Uuid::new_v4());
    let (status, _) = send(&app, "GET", &format!("/api/trades/{id}"), Some(&other), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_trade_rejected() {
    let Some((app, token)) = build_test_app().await else { return };

    let mut body = trade_body("TSLA", None, None, "2024-03-03");
    body["quantity"] = json!("0");
    let (status, json) = send(&app, "POST", "/api/trades", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["success"], false);

    let mut body = trade_body("TSLA", None, None, "2024-03-03");
    body["strategy_id"] = json!(Uuid::new_v4());
    let (status, _) = send(&app, "POST", "/api/trades", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_market_filter_is_case_insensitive() {
    let Some((app, token)) = build_test_app().await else { return };

    for market in ["stock", "Stock", "STOCK"] {
        create_trade(&app, &token, trade_body("SPY", Some("1"), Some(market), "2024-04-01")).await;
    }
    create_trade(&app, &token, trade_body("EURUSD", Some("1"), Some("FOREX"), "2024-04-01")).await;
    create_trade(&app, &token, trade_body("???", Some("1"), None, "2024-04-01")).await;

    let (status, json) = send(&app, "GET", "/api/trades?market=sToCk", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["trades"].as_array().unwrap().len(), 3);
    assert_eq!(json["data"]["total_count"], 3);

    let (_, json) = send(&app, "GET", "/api/trades", Some(&token), None).await;
    assert_eq!(json["data"]["total_count"], 5);
}

#[tokio::test]
async fn test_statistics_endpoint() {
    let Some((app, token)) = build_test_app().await else { return };

    for pnl in ["250.50", "-120.75", "500", "-75.25", "300"] {
        create_trade(&app, &token, trade_body("NQ", Some(pnl), Some("futures"), "2024-05-01")).await;
    }

    let (status, json) = send(&app, "GET", "/api/statistics", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let stats = &json["data"];
    assert_eq!(stats["totalTrades"], 5);
    assert_eq!(stats["winningTrades"], 3);
    assert_eq!(stats["losingTrades"], 2);
    assert_eq!(stats["totalPnL"].as_str().unwrap().parse::<f64>().unwrap(), 854.5);
    assert_eq!(stats["winRate"].as_str().unwrap().parse::<f64>().unwrap(), 60.0);
}

#[tokio::test]
async fn test_statistics_empty_user() {
    let Some((app, token)) = build_test_app().await else { return };

    let (status, json) = send(&app, "GET", "/api/statistics", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["totalTrades"], 0);
    assert_eq!(json["data"]["sharpeRatio"], "0");
    assert_eq!(json["data"]["profitFactor"], "0");
}

#[tokio::test]
async fn test_strategy_delete_keeps_trades() {
    let Some((app, token)) = build_test_app().await else { return };

    let (status, json) = send(
        &app,
        "POST",
        "/api/strategies",
        Some(&token),
        Some(json!({ "name": "Opening range", "rules": ["wait 15m", "", "stop below range"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["rules"], json!(["wait 15m", "stop below range"]));
    let strategy_id = json["data"]["id"].as_str().unwrap().to_string();

    let mut body = trade_body("QQQ", Some("75"), Some("stock"), "2024-06-03");
    body["strategy_id"] = json!(strategy_id);
    let trade = create_trade(&app, &token, body).await;
    let trade_id = trade["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "GET",
        &format!("/api/strategies/{strategy_id}/performance"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["statistics"]["totalTrades"], 1);
    assert_eq!(json["data"]["statistics"]["profitFactor"], "Infinite");

    let (status, json) = send(&app, "DELETE", &format!("/api/strategies/{strategy_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["detached_trades"], 1);

    let (status, json) = send(&app, "GET", &format!("/api/trades/{trade_id}"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["strategy_id"].is_null());
}

#[tokio::test]
async fn test_strategy_replace_rules() {
    let Some((app, token)) = build_test_app().await else { return };

    let (_, json) = send(
        &app,
        "POST",
        "/api/strategies",
        Some(&token),
        Some(json!({ "name": "Pullback", "rules": ["trend up"] })),
    )
    .await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    let (status, json) = send(
        &app,
        "PUT",
        &format!("/api/strategies/{id}"),
        Some(&token),
        Some(json!({ "name": "Pullback v2", "rules": ["trend up", "touch 20 EMA"], "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["name"], "Pullback v2");
    assert_eq!(json["data"]["is_active"], false);

    let (_, json) = send(&app, "GET", "/api/strategies", Some(&token), None).await;
    let strategies = json["data"].as_array().unwrap();
    assert_eq!(strategies.len(), 1);
    assert_eq!(strategies[0]["rules"], json!(["trend up", "touch 20 EMA"]));
}

#[tokio::test]
async fn test_confluence_trades_shape() {
    let Some((app, token)) = build_test_app().await else { return };

    let (_, json) = send(
        &app,
        "POST",
        "/api/strategies",
        Some(&token),
        Some(json!({ "name": "Confluence A" })),
    )
    .await;
    let strategy_id = json["data"]["id"].clone();

    for day in 1..=3 {
        let mut body = trade_body("GC", Some("10"), Some("futures"), &format!("2024-07-0{day}"));
        body["strategy_id"] = strategy_id.clone();
        create_trade(&app, &token, body).await;
    }

    let (status, json) = send(&app, "GET", "/api/confluence-trades?limit=2&page=2", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalCount"], 3);
    assert!(json["requestId"].as_str().unwrap().parse::<Uuid>().is_ok());

    let trades = json["trades"].as_array().unwrap();
    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0]["trade_date"], "2024-07-01");
    assert_eq!(trades[0]["strategy_name"], "Confluence A");
}

#[tokio::test]
async fn test_pnl_history_and_dashboard() {
    let Some((app, token)) = build_test_app().await else { return };

    create_trade(&app, &token, trade_body("BTC", Some("100"), Some("crypto"), "2024-08-01")).await;
    create_trade(&app, &token, trade_body("ETH", Some("-30"), Some("Crypto"), "2024-08-02")).await;
    create_trade(&app, &token, trade_body("SOL", Some("20"), Some("crypto"), "2024-08-02")).await;

    let (status, json) = send(&app, "GET", "/api/analytics/pnl-history", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let points = json["data"].as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[1]["date"], "2024-08-02");
    assert_eq!(points[1]["cumulative_pnl"].as_str().unwrap().parse::<f64>().unwrap(), 90.0);

    let (status, json) = send(&app, "GET", "/api/dashboard/summary", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["statistics"]["totalTrades"], 3);
    assert_eq!(json["strategy_count"], 0);
    assert!(json["today_pnl"].is_string());
}
