//! Page composition and text rendering

use crate::charts::Charts;
use crate::dashboard::DashboardState;
use crate::form::SearchForm;
use crate::loader::Loader;
use crate::Insights;
use std::fmt;

pub const PAGE_TITLE: &str = "Airline Demand Analyzer";
pub const ROUTES_LOADING: &str = "Loading route information...";
pub const SEARCH_LOADING: &str = "Searching for flights...";
pub const PLACEHOLDER: &str = "Search for flights to see data visualization";
pub const RETRY_LABEL: &str = "Retry";

/// What the page shows for a given state
#[derive(Debug, Clone, PartialEq)]
pub enum View<'a> {
    /// Full-page loader while popular routes are loading
    Loading(Loader),
    Page(Page<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub error: Option<ErrorBanner<'a>>,
    pub form: &'a SearchForm,
    pub content: Content<'a>,
}

/// Error message with a reload affordance
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBanner<'a> {
    pub message: &'a str,
    pub retry_label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Content<'a> {
    Searching(Loader),
    Results(Results<'a>),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Results<'a> {
    pub charts: Charts,
    pub insights: &'a Insights,
    pub seasonal_advice: Option<&'a str>,
}

impl<'a> View<'a> {
    pub fn compose(state: &'a DashboardState, form: &'a SearchForm) -> Self {
        let loading = state.loading();
        if loading.routes {
            return View::Loading(Loader::new(Some(ROUTES_LOADING)));
        }

        let error = state.error().map(|message| ErrorBanner {
            message,
            retry_label: RETRY_LABEL,
        });

        let content = if loading.flights {
            Content::Searching(Loader::new(Some(SEARCH_LOADING)))
        } else if let Some(result) = state.flights() {
            Content::Results(Results {
                charts: Charts::build(&result.data, state.routes()),
                insights: &result.insights,
                seasonal_advice: state.seasonal_advice(),
            })
        } else {
            Content::Placeholder
        };

        View::Page(Page { error, form, content })
    }
}

impl fmt::Display for View<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Loading(loader) => writeln!(f, "{}", loader),
            View::Page(page) => write!(f, "{}", page),
        }
    }
}

impl fmt::Display for Page<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", PAGE_TITLE)?;
        writeln!(f, "{}", "=".repeat(PAGE_TITLE.len()))?;

        if let Some(banner) = &self.error {
            writeln!(f, "! {}  [{}: type `reload`]", banner.message, banner.retry_label)?;
        }
        writeln!(f)?;
        write_form(f, self.form)?;
        writeln!(f)?;

        match &self.content {
            Content::Searching(loader) => writeln!(f, "{}", loader),
            Content::Placeholder => writeln!(f, "{}", PLACEHOLDER),
            Content::Results(results) => write!(f, "{}", results),
        }
    }
}

fn write_form(f: &mut fmt::Formatter<'_>, form: &SearchForm) -> fmt::Result {
    let draft = form.draft();
    let airport = |code: &str| match SearchForm::airport_name(code) {
        Some(name) => format!("{} ({})", name, code),
        None => code.to_string(),
    };

    writeln!(f, "Origin Airport:      {}", airport(&draft.origin))?;
    writeln!(f, "Destination Airport: {}", airport(&draft.destination))?;
    writeln!(f, "Departure Date:      {}  (from {})", draft.date, form.date_min())?;
    match draft.return_date {
        Some(date) => writeln!(f, "Return Date:         {}  (from {})", date, form.return_date_min())?,
        None => writeln!(f, "Return Date:         -  (optional, from {})", form.return_date_min())?,
    }
    writeln!(f, "[ {} ]", form.submit_label())
}

impl fmt::Display for Results<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.charts.prices.render_text())?;
        writeln!(f, "{}", self.charts.routes.render_text())?;

        writeln!(f, "Travel Insights")?;
        match self.insights {
            Insights::Available(insights) => {
                writeln!(f, "  {}", insights.recommendation)?;
                writeln!(f, "  Average price: ${}", insights.price_summary.average)?;
                writeln!(f, "  Price trend: {}", insights.price_summary.trend)?;
                if let (Some(min), Some(max)) = (insights.price_summary.min, insights.price_summary.max) {
                    writeln!(f, "  Price range: ${} - ${}", min, max)?;
                }
                writeln!(f, "  Airlines: {}", insights.airlines.join(", "))?;
            }
            Insights::Unavailable { error } => writeln!(f, "  {}", error)?,
        }
        if let Some(advice) = self.seasonal_advice {
            writeln!(f, "  Seasonal advice: {}", advice)?;
        }
        Ok(())
    }
}
