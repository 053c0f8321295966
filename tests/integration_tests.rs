//! Integration tests for flight-dashboard
//!
//! These tests run the real reqwest client against a local responder that
//! replays canned HTTP responses and records the raw requests it received.

use chrono::{Days, NaiveDate};
use flight_dashboard::{
    fetch_popular_routes, local_today, search_flights, ApiClient, ApiConfig, Dashboard, DashboardError, FieldEdit,
    FlightApi, Insights, Phase, SearchRequest,
};
use std::io::ErrorKind;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const ROUTES_BODY: &str = r#"{
    "routes": [
        {"route": "SYD-MEL", "flights_per_day": 45, "current_demand": 1.54, "season": "spring",
         "distance_km": 713, "price_trend": "stable"},
        {"route": "BNE-SYD", "flights_per_day": 32, "current_demand": 1.1, "season": "spring",
         "distance_km": 732, "price_trend": "stable"},
        {"route": "PER-SYD", "flights_per_day": 18, "current_demand": 0.9, "season": "spring",
         "distance_km": 3285, "price_trend": "stable"}
    ],
    "seasonal_advice": "Flexible dates can save up to 20%",
    "debug": {"num_routes": 3, "generated_at": "2026-10-19T09:00:00.000000"}
}"#;

const FLIGHTS_BODY: &str = r#"{
    "data": [
        {"id": "SYD-MEL-0", "airline": "Jetstar", "flight_number": "JQ512", "departure": "06:15",
         "duration": 82, "price": 120.0, "route": "SYD-MEL", "demand_factor": 1.54, "aircraft": "B737"},
        {"id": "SYD-MEL-1", "airline": "Qantas", "flight_number": "QF401", "departure": "08:00",
         "duration": 88, "price": 250.0, "route": "SYD-MEL", "demand_factor": 1.54, "aircraft": "B737"},
        {"id": "SYD-MEL-2", "airline": "Jetstar", "flight_number": "JQ518", "departure": "17:45",
         "duration": 79, "price": 140.0, "route": "SYD-MEL", "demand_factor": 1.54, "aircraft": "B737"}
    ],
    "insights": {
        "price_summary": {"average": 170.0, "min": 120.0, "max": 250.0, "trend": "increasing"},
        "recommendation": "Book now",
        "airlines": ["Jetstar", "Qantas"]
    },
    "metadata": {"generated_at": "2026-10-19T09:00:01.000000", "num_flights": 3}
}"#;

/// Serve the given responses in order, one per connection.
/// Returns the base URL and a handle yielding the raw requests.
async fn start_server(responses: Vec<(&'static str, &'static str)>) -> Option<(String, JoinHandle<Vec<String>>)> {
    let listener = match TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) if err.kind() == ErrorKind::PermissionDenied => return None,
        Err(err) => panic!("failed to bind local test listener: {err}"),
    };
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut requests = Vec::new();
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            requests.push(read_request(&mut socket).await);

            let content_type = if body.trim_start().starts_with('{') {
                "application/json"
            } else {
                "text/plain"
            };
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Length: {}\r\nContent-Type: {content_type}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        requests
    });

    Some((format!("http://{addr}/api"), handle))
}

/// Read one request: headers, then as many body bytes as Content-Length says
async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

fn request_body(raw: &str) -> serde_json::Value {
    let (_, body) = raw.split_once("\r\n\r\n").expect("request has no body");
    serde_json::from_str(body).expect("request body is not JSON")
}

fn next_month() -> NaiveDate {
    local_today().checked_add_days(Days::new(30)).unwrap()
}

#[tokio::test]
async fn test_fetch_routes() {
    let Some((base_url, server)) = start_server(vec![("200 OK", ROUTES_BODY)]).await else {
        eprintln!("skipping test: sandbox does not permit local TCP listeners");
        return;
    };

    let routes = fetch_popular_routes(&ApiConfig::new(&base_url)).await.unwrap();
    assert_eq!(routes.routes.len(), 3);
    assert_eq!(routes.routes[0].route, "SYD-MEL");
    assert_eq!(routes.routes[2].flights_per_day, 18);
    assert_eq!(routes.seasonal_advice.as_deref(), Some("Flexible dates can save up to 20%"));

    let requests = server.await.unwrap();
    assert!(requests[0].starts_with("GET /api/popular-routes HTTP/1.1"));
}

#[tokio::test]
async fn test_fetch_routes_failure_carries_status_and_detail() {
    let Some((base_url, server)) =
        start_server(vec![("500 Internal Server Error", r#"{"detail": "simulator offline"}"#)]).await
    else {
        return;
    };

    let client = ApiClient::new(&ApiConfig::new(&base_url)).unwrap();
    let err = client.fetch_routes().await.unwrap_err();
    assert_eq!(
        err,
        DashboardError::Network { status: Some(500), message: "simulator offline".to_string() }
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_search_uppercases_airports() {
    let Some((base_url, server)) = start_server(vec![("200 OK", FLIGHTS_BODY)]).await else {
        return;
    };

    let date = next_month();
    let request = SearchRequest::new("syd", "Mel", date).with_return_date(date);
    let result = search_flights(&ApiConfig::new(&base_url), &request).await.unwrap();
    assert_eq!(result.data.len(), 3);
    assert!(matches!(result.insights, Insights::Available(_)));

    let requests = server.await.unwrap();
    let raw = &requests[0];
    assert!(raw.starts_with("POST /api/flights HTTP/1.1"));
    assert!(raw.to_lowercase().contains("accept: application/json"));
    assert!(raw.to_lowercase().contains("content-type: application/json"));

    let body = request_body(raw);
    assert_eq!(body["origin"], "SYD");
    assert_eq!(body["destination"], "MEL");
    assert_eq!(body["date"], date.format("%Y-%m-%d").to_string());
    assert_eq!(body["return_date"], date.format("%Y-%m-%d").to_string());
}

#[tokio::test]
async fn test_search_sends_null_return_date() {
    let Some((base_url, server)) = start_server(vec![("200 OK", FLIGHTS_BODY)]).await else {
        return;
    };

    let request = SearchRequest::new("PER", "SYD", next_month());
    search_flights(&ApiConfig::new(&base_url), &request).await.unwrap();

    let requests = server.await.unwrap();
    let body = request_body(&requests[0]);
    assert!(body["return_date"].is_null());
}

#[tokio::test]
async fn test_search_422_is_validation_error() {
    let Some((base_url, server)) = start_server(vec![(
        "422 Unprocessable Entity",
        r#"{"detail": "Date must be in YYYY-MM-DD format"}"#,
    )])
    .await
    else {
        return;
    };

    let request = SearchRequest::new("SYD", "MEL", next_month());
    let err = search_flights(&ApiConfig::new(&base_url), &request).await.unwrap_err();
    assert_eq!(err, DashboardError::Validation("Date must be in YYYY-MM-DD format".to_string()));
    assert_eq!(err.to_string(), "Validation error: Date must be in YYYY-MM-DD format");
    server.await.unwrap();
}

#[tokio::test]
async fn test_search_422_with_plain_text_body() {
    let Some((base_url, server)) =
        start_server(vec![("422 Unprocessable Entity", "Unprocessable: bad airport")]).await
    else {
        return;
    };

    let request = SearchRequest::new("SYD", "MEL", next_month());
    let err = search_flights(&ApiConfig::new(&base_url), &request).await.unwrap_err();
    assert_eq!(err, DashboardError::Validation("Unprocessable: bad airport".to_string()));
    assert!(err.is_validation());
    server.await.unwrap();
}

#[tokio::test]
async fn test_search_failure_prefers_detail_then_raw_text() {
    let Some((base_url, server)) = start_server(vec![
        ("500 Internal Server Error", r#"{"detail": "Internal server error: boom"}"#),
        ("502 Bad Gateway", "upstream unavailable"),
    ])
    .await
    else {
        return;
    };

    let client = ApiClient::new(&ApiConfig::new(&base_url)).unwrap();
    let request = SearchRequest::new("SYD", "MEL", next_month());

    let err = client.search_flights(&request).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Internal server error: boom");

    let err = client.search_flights(&request).await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_string(), "upstream unavailable");

    server.await.unwrap();
}

#[tokio::test]
async fn test_malformed_success_body_is_network_error() {
    let Some((base_url, server)) = start_server(vec![("200 OK", r#"{"data": "not a list"}"#)]).await else {
        return;
    };

    let request = SearchRequest::new("SYD", "MEL", next_month());
    let err = search_flights(&ApiConfig::new(&base_url), &request).await.unwrap_err();
    assert!(matches!(err, DashboardError::Network { status: Some(200), .. }));
    server.await.unwrap();
}

#[tokio::test]
async fn test_dashboard_session_end_to_end() {
    let Some((base_url, server)) = start_server(vec![
        ("200 OK", ROUTES_BODY),
        ("200 OK", FLIGHTS_BODY),
        ("500 Internal Server Error", r#"{"detail": "Internal server error: boom"}"#),
    ])
    .await
    else {
        return;
    };

    let client = ApiClient::new(&ApiConfig::new(&base_url)).unwrap();
    let mut dashboard = Dashboard::new(client);

    dashboard.mount().await;
    assert_eq!(dashboard.state().phase(), Phase::RoutesLoaded);
    assert_eq!(dashboard.state().routes().len(), 3);

    dashboard.edit(FieldEdit::Date(next_month()));
    assert!(dashboard.submit().await);
    assert_eq!(dashboard.state().phase(), Phase::SearchSucceeded);

    let text = dashboard.view().to_string();
    assert!(text.contains("Jetstar"));
    assert!(text.contains("130"));  // Jetstar average of 120 and 140
    assert!(text.contains("Book now"));

    assert!(dashboard.submit().await);
    let state = dashboard.state();
    assert_eq!(state.phase(), Phase::SearchFailed);
    assert_eq!(state.flights().unwrap().data.len(), 3);
    assert!(state.error().unwrap().starts_with("Failed to fetch flights"));

    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_locally_invalid_search_sends_nothing() {
    let Some((base_url, server)) = start_server(vec![("200 OK", ROUTES_BODY)]).await else {
        return;
    };

    let client = ApiClient::new(&ApiConfig::new(&base_url)).unwrap();
    let mut dashboard = Dashboard::new(client);
    dashboard.mount().await;

    dashboard.edit(FieldEdit::Origin("SYDNEY".to_string()));
    assert!(dashboard.submit().await);
    let state = dashboard.state();
    assert_eq!(state.phase(), Phase::SearchFailed);
    assert!(state.last_failure().unwrap().is_validation());

    // Only the routes request ever reached the server
    let requests = server.await.unwrap();
    assert_eq!(requests.len(), 1);
}
