//! Page orchestrator
//!
//! Owns the UI state and sequences the one-shot routes load and the
//! user-triggered searches. All mutation goes through `&mut self`, so events
//! are applied one at a time in the order they resolve.

use crate::client::FlightApi;
use crate::form::{FieldEdit, SearchForm};
use crate::view::View;
use crate::{local_today, DashboardError, FlightSearchResult, PopularRoutes, RouteSummary, SearchRequest};
use chrono::NaiveDate;
use tracing::{debug, error, info, instrument, warn};

pub const ROUTES_ERROR: &str = "Failed to load route data. Please refresh the page.";
pub const SEARCH_ERROR: &str = "Failed to fetch flights. Please check your connection and try again.";

/// Independent in-flight flags for the two data sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadingState {
    pub routes: bool,
    pub flights: bool,
}

/// Where the page is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    RoutesLoaded,
    RoutesFailed,
    SearchInFlight,
    SearchSucceeded,
    SearchFailed,
}

/// UI state of one page session
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    routes: Vec<RouteSummary>,
    seasonal_advice: Option<String>,
    flights: Option<FlightSearchResult>,
    loading: LoadingState,
    error: Option<String>,
    last_failure: Option<DashboardError>,
    phase: Phase,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            seasonal_advice: None,
            flights: None,
            loading: LoadingState {
                routes: true,
                flights: false,
            },
            error: None,
            last_failure: None,
            phase: Phase::Initial,
        }
    }

    pub fn routes(&self) -> &[RouteSummary] {
        &self.routes
    }

    pub fn seasonal_advice(&self) -> Option<&str> {
        self.seasonal_advice.as_deref()
    }

    pub fn flights(&self) -> Option<&FlightSearchResult> {
        self.flights.as_ref()
    }

    pub fn loading(&self) -> LoadingState {
        self.loading
    }

    /// User-visible error banner text
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Underlying cause of the most recent failure, kept for diagnostics
    pub fn last_failure(&self) -> Option<&DashboardError> {
        self.last_failure.as_ref()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Apply the outcome of the routes load. Returns false when no load was pending.
    pub fn finish_routes(&mut self, result: Result<PopularRoutes, DashboardError>) -> bool {
        if !self.loading.routes {
            warn!("Routes result arrived with no load pending; ignoring");
            return false;
        }
        self.loading.routes = false;

        let phase = match result {
            Ok(popular) => {
                self.routes = popular.routes;
                self.seasonal_advice = popular.seasonal_advice;
                Phase::RoutesLoaded
            }
            Err(err) => {
                error!(error = %err, "Route fetch error");
                self.error = Some(ROUTES_ERROR.to_string());
                self.last_failure = Some(err);
                Phase::RoutesFailed
            }
        };
        if !self.loading.flights {
            self.phase = phase;
        }
        true
    }

    /// Enter the in-flight state. Returns false if a search is already running.
    pub fn begin_search(&mut self) -> bool {
        if self.loading.flights {
            return false;
        }
        self.error = None;
        self.last_failure = None;
        self.loading.flights = true;
        self.phase = Phase::SearchInFlight;
        true
    }

    /// Apply the outcome of a search. Returns false when no search was pending.
    ///
    /// A failure keeps the previous result on screen.
    pub fn finish_search(&mut self, result: Result<FlightSearchResult, DashboardError>) -> bool {
        if !self.loading.flights {
            warn!("Search result arrived with no search pending; ignoring");
            return false;
        }
        self.loading.flights = false;

        match result {
            Ok(flights) => {
                info!(flights = flights.data.len(), "Flight search results received");
                self.flights = Some(flights);
                self.error = None;
                self.phase = Phase::SearchSucceeded;
            }
            Err(err) => {
                error!(error = %err, "Flight search error");
                self.error = Some(SEARCH_ERROR.to_string());
                self.last_failure = Some(err);
                self.phase = Phase::SearchFailed;
            }
        }
        true
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

/// One page session: state, form and the backend it talks to
pub struct Dashboard<A> {
    api: A,
    state: DashboardState,
    form: SearchForm,
    clock: fn() -> NaiveDate,
}

impl<A: FlightApi> Dashboard<A> {
    /// Session on the local calendar, the same one `ApiClient` validates against
    pub fn new(api: A) -> Self {
        Self::with_clock(api, local_today)
    }

    pub fn with_clock(api: A, clock: fn() -> NaiveDate) -> Self {
        Self {
            api,
            state: DashboardState::new(),
            form: SearchForm::new(clock()),
            clock,
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn form(&self) -> &SearchForm {
        &self.form
    }

    /// Forward a field edit to the form
    pub fn edit(&mut self, edit: FieldEdit) -> bool {
        self.form.apply(edit)
    }

    /// Load popular routes. Only the first call per session does anything.
    #[instrument(level = "info", skip(self))]
    pub async fn mount(&mut self) {
        if !self.state.loading().routes {
            debug!("Dashboard already mounted");
            return;
        }
        info!("Fetching route data");
        let result = self.api.fetch_routes().await;
        self.state.finish_routes(result);
    }

    /// Take the form draft and enter the in-flight state.
    ///
    /// Returns `None` without side effects while a search is already running.
    pub fn begin_search(&mut self) -> Option<SearchRequest> {
        if !self.form.is_disabled() {
            self.form.roll_over((self.clock)());
        }
        let request = self.form.submit()?;
        if !self.state.begin_search() {
            return None;
        }
        self.form.set_loading(true);
        info!(request = ?request, "Search initiated");
        Some(request)
    }

    pub fn finish_search(&mut self, result: Result<FlightSearchResult, DashboardError>) {
        self.state.finish_search(result);
        self.form.set_loading(self.state.loading().flights);
        debug!(phase = ?self.state.phase(), "Search completed");
    }

    /// Submit the form and wait for the search. Returns false if nothing was sent.
    pub async fn submit(&mut self) -> bool {
        let Some(request) = self.begin_search() else {
            return false;
        };
        let result = self.api.search_flights(&request).await;
        self.finish_search(result);
        true
    }

    pub fn view(&self) -> View<'_> {
        View::compose(&self.state, &self.form)
    }
}
