//! HTTP client for the flight-search backend

use crate::config::ApiConfig;
use crate::{DashboardError, FlightSearchResult, PopularRoutes, SearchRequest};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::ACCEPT;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

/// The two backend calls the dashboard depends on
#[async_trait]
pub trait FlightApi: Send + Sync {
    /// `GET /popular-routes`
    async fn fetch_routes(&self) -> Result<PopularRoutes, DashboardError>;

    /// `POST /flights`
    async fn search_flights(&self, request: &SearchRequest) -> Result<FlightSearchResult, DashboardError>;
}

/// Wire body of a flight search. Airport codes are always uppercase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPayload {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl From<&SearchRequest> for SearchPayload {
    fn from(request: &SearchRequest) -> Self {
        Self {
            origin: request.origin.to_uppercase(),
            destination: request.destination.to_uppercase(),
            date: request.date,
            return_date: request.return_date,
        }
    }
}

/// Reqwest-backed client bound to one configured backend
pub struct ApiClient {
    http_client: Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &ApiConfig) -> Result<Self, DashboardError> {
        debug!(base_url = %config.base_url, "Creating API client");
        let http_client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Search with an explicit notion of "today" for the date invariants
    #[instrument(level = "info", skip(self, request))]
    pub async fn search_flights_on(
        &self,
        request: &SearchRequest,
        today: NaiveDate,
    ) -> Result<FlightSearchResult, DashboardError> {
        if let Err(err) = request.validate(today) {
            error!(
                origin = %request.origin,
                destination = %request.destination,
                date = %request.date,
                error = %err,
                "Flight search rejected before sending"
            );
            return Err(err);
        }

        let payload = SearchPayload::from(request);
        let url = self.config.endpoint("flights");
        info!(
            url = %url,
            origin = %payload.origin,
            destination = %payload.destination,
            date = %payload.date,
            return_date = ?payload.return_date,
            "Sending flight search"
        );

        let builder = self
            .http_client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&payload);

        let outcome = match self.execute(builder, &url).await {
            Ok((status, body)) if status.is_success() => decode::<FlightSearchResult>(status, &body),
            Ok((status, body)) => Err(classify_search_failure(status, &body)),
            Err(err) => Err(err),
        };

        match &outcome {
            Ok(result) => info!(flights_found = result.data.len(), "Flight search completed"),
            Err(err) => error!(
                origin = %payload.origin,
                destination = %payload.destination,
                date = %payload.date,
                status = ?err.status(),
                error = %err,
                "Flight search failed"
            ),
        }
        outcome
    }

    /// Send a request and read the whole body, whatever the status
    async fn execute(&self, builder: RequestBuilder, url: &str) -> Result<(StatusCode, String), DashboardError> {
        let start_time = std::time::Instant::now();
        let response = builder.send().await?;
        let status = response.status();

        info!(
            url = %url,
            status = %status,
            duration_ms = start_time.elapsed().as_millis(),
            "HTTP request completed"
        );

        let body = response.text().await?;
        debug!(body_length = body.len(), "Received response body");
        Ok((status, body))
    }
}

#[async_trait]
impl FlightApi for ApiClient {
    #[instrument(level = "info", skip(self))]
    async fn fetch_routes(&self) -> Result<PopularRoutes, DashboardError> {
        let url = self.config.endpoint("popular-routes");
        info!(url = %url, "Fetching popular routes");

        let outcome = match self.execute(self.http_client.get(&url), &url).await {
            Ok((status, body)) if status.is_success() => decode::<PopularRoutes>(status, &body),
            Ok((status, body)) => Err(classify_routes_failure(status, &body)),
            Err(err) => Err(err),
        };

        match &outcome {
            Ok(routes) => info!(routes = routes.routes.len(), "Popular routes loaded"),
            Err(err) => error!(status = ?err.status(), error = %err, "Error fetching routes"),
        }
        outcome
    }

    async fn search_flights(&self, request: &SearchRequest) -> Result<FlightSearchResult, DashboardError> {
        self.search_flights_on(request, crate::local_today()).await
    }
}

/// Error detail of a failed response: the JSON `detail` field when the body
/// is JSON, otherwise the raw body text. Empty details count as absent.
pub fn error_detail(body: &str) -> Option<String> {
    let detail = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => match json.get("detail") {
            Some(serde_json::Value::String(detail)) => Some(detail.clone()),
            Some(serde_json::Value::Null) | None => None,
            // FastAPI reports schema failures as a list of objects
            Some(other) => Some(other.to_string()),
        },
        Err(_) => Some(body.to_string()),
    };
    detail.filter(|d| !d.trim().is_empty())
}

/// Map a failed search response onto the error taxonomy
pub fn classify_search_failure(status: StatusCode, body: &str) -> DashboardError {
    let detail = error_detail(body);
    if status == StatusCode::UNPROCESSABLE_ENTITY {
        return DashboardError::Validation(detail.unwrap_or_else(|| status_message(status)));
    }
    DashboardError::Network {
        status: Some(status.as_u16()),
        message: detail.unwrap_or_else(|| status_message(status)),
    }
}

/// Map a failed routes response. Every status is a network failure here.
pub fn classify_routes_failure(status: StatusCode, body: &str) -> DashboardError {
    DashboardError::Network {
        status: Some(status.as_u16()),
        message: error_detail(body).unwrap_or_else(|| status_message(status)),
    }
}

fn status_message(status: StatusCode) -> String {
    format!("HTTP error! status: {}", status.as_u16())
}

fn decode<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, DashboardError> {
    serde_json::from_str(body).map_err(|e| DashboardError::Network {
        status: Some(status.as_u16()),
        message: format!("Invalid response body: {}", e),
    })
}
