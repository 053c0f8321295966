//! # Flight Dashboard Library
//!
//! Client-side core of the airline demand dashboard: a typed client for the
//! flight-search backend, the search form model, chart transforms, a loading
//! indicator and the page orchestrator that keeps UI state consistent with the
//! popular-routes load and user-triggered searches.

pub mod charts;
pub mod client;
pub mod config;
pub mod dashboard;
pub mod form;
pub mod loader;
pub mod logging;
pub mod view;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export main types for convenience
pub use charts::{AirlineAverage, ChartDescriptor, ChartKind, Charts};
pub use client::{ApiClient, FlightApi};
pub use config::{ApiConfig, Config, ConfigError, LoggingConfig};
pub use dashboard::{Dashboard, DashboardState, LoadingState, Phase};
pub use form::{FieldEdit, FormError, SearchForm};
pub use loader::Loader;
pub use view::View;

/// Error types for the dashboard
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// Transport failure or any non-success status other than 422
    #[error("{message}")]
    Network {
        status: Option<u16>,
        message: String,
    },

    /// The search parameters were rejected, locally or by the server (HTTP 422)
    #[error("Validation error: {0}")]
    Validation(String),
}

impl DashboardError {
    /// HTTP status attached to a network failure, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            DashboardError::Network { status, .. } => *status,
            DashboardError::Validation(_) => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DashboardError::Validation(_))
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Network {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// A single flight search as collected by the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub origin: String,       // Airport code, any case
    pub destination: String,  // Airport code, any case
    pub date: NaiveDate,
    pub return_date: Option<NaiveDate>,
}

impl SearchRequest {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            date,
            return_date: None,
        }
    }

    pub fn with_return_date(mut self, return_date: NaiveDate) -> Self {
        self.return_date = Some(return_date);
        self
    }

    /// Check the request invariants against the given calendar day.
    ///
    /// Airport codes must be three ASCII letters, the departure date must not
    /// be in the past and a return date must not precede the departure.
    pub fn validate(&self, today: NaiveDate) -> Result<(), DashboardError> {
        if !is_airport_code(&self.origin) || !is_airport_code(&self.destination) {
            return Err(DashboardError::Validation(
                "Airport codes must be 3 characters".to_string(),
            ));
        }
        if self.date < today {
            return Err(DashboardError::Validation(format!(
                "Departure date {} is in the past",
                self.date
            )));
        }
        if let Some(return_date) = self.return_date {
            if return_date < self.date {
                return Err(DashboardError::Validation(format!(
                    "Return date {} is before departure date {}",
                    return_date, self.date
                )));
            }
        }
        Ok(())
    }
}

fn is_airport_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Daily frequency of a popular route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub route: String,  // "SYD-MEL"
    pub flights_per_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_demand: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_trend: Option<String>,  // "up", "stable"
}

impl RouteSummary {
    pub fn new(route: impl Into<String>, flights_per_day: u32) -> Self {
        Self {
            route: route.into(),
            flights_per_day,
            current_demand: None,
            season: None,
            distance_km: None,
            price_trend: None,
        }
    }
}

/// Popular routes response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopularRoutes {
    pub routes: Vec<RouteSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_advice: Option<String>,
}

/// Individual flight returned by a search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub airline: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure: Option<String>,  // "HH:MM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,      // Minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_factor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aircraft: Option<String>,
}

impl FlightRecord {
    pub fn new(airline: impl Into<String>, price: f64) -> Self {
        Self {
            airline: airline.into(),
            price,
            id: None,
            flight_number: None,
            departure: None,
            duration: None,
            route: None,
            demand_factor: None,
            aircraft: None,
        }
    }
}

/// Server-side price statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub average: f64,
    pub trend: String,  // "increasing", "decreasing"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Travel insights computed by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelInsights {
    pub recommendation: String,
    pub price_summary: PriceSummary,
    pub airlines: Vec<String>,
}

/// Insights block of a search result. The backend answers with an error
/// object instead of statistics when no flights were generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Insights {
    Available(TravelInsights),
    Unavailable { error: String },
}

/// Search bookkeeping attached by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMetadata {
    pub generated_at: String,
    pub num_flights: usize,
}

/// Flight search result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSearchResult {
    pub data: Vec<FlightRecord>,
    pub insights: Insights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SearchMetadata>,
}

/// Current calendar day in the local timezone.
///
/// The form's date bounds and the client's pre-flight check both read this,
/// so they agree on what "today" is.
pub fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Fetch popular routes once with a throwaway client
pub async fn fetch_popular_routes(config: &ApiConfig) -> Result<PopularRoutes, DashboardError> {
    let client = ApiClient::new(config)?;
    client.fetch_routes().await
}

/// Run a single flight search with a throwaway client
pub async fn search_flights(
    config: &ApiConfig,
    request: &SearchRequest,
) -> Result<FlightSearchResult, DashboardError> {
    let client = ApiClient::new(config)?;
    client.search_flights(request).await
}
