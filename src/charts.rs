//! Chart descriptors derived from fetched data
//!
//! Everything here is a pure transform of its inputs: nothing is fetched,
//! cached or mutated.

use crate::{FlightRecord, RouteSummary};
use serde::Serialize;
use std::fmt::Write;

pub const PRICE_CHART_TITLE: &str = "Flight Prices by Airline";
pub const PRICE_SERIES_LABEL: &str = "Average Price (AUD)";
pub const ROUTE_CHART_TITLE: &str = "Popular Routes";
pub const ROUTE_SERIES_LABEL: &str = "Daily Flights";

/// Width of the longest bar when rendered as text
const TEXT_BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// Categorical chart: one value per label, in label order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescriptor {
    pub kind: ChartKind,
    pub title: String,
    pub series_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Mean price of one airline's flights
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirlineAverage {
    pub airline: String,
    pub average_price: f64,
    pub flights: usize,
}

/// Average price per airline, airlines in order of first appearance.
///
/// A group only exists once a flight lands in it, so every mean has at least
/// one member. An empty slice yields no groups.
pub fn airline_averages(flights: &[FlightRecord]) -> Vec<AirlineAverage> {
    let mut groups: Vec<(&str, f64, usize)> = Vec::new();

    for flight in flights {
        match groups.iter_mut().find(|(airline, _, _)| *airline == flight.airline) {
            Some((_, total, count)) => {
                *total += flight.price;
                *count += 1;
            }
            None => groups.push((flight.airline.as_str(), flight.price, 1)),
        }
    }

    groups
        .into_iter()
        .map(|(airline, total, count)| AirlineAverage {
            airline: airline.to_string(),
            average_price: round_cents(total / count as f64),
            flights: count,
        })
        .collect()
}

/// Bar chart of average price per airline
pub fn price_chart(flights: &[FlightRecord]) -> ChartDescriptor {
    let (labels, values) = airline_averages(flights)
        .into_iter()
        .map(|avg| (avg.airline, avg.average_price))
        .unzip();

    ChartDescriptor {
        kind: ChartKind::Bar,
        title: PRICE_CHART_TITLE.to_string(),
        series_label: PRICE_SERIES_LABEL.to_string(),
        labels,
        values,
    }
}

/// Line chart of daily flights per route
pub fn route_chart(routes: &[RouteSummary]) -> ChartDescriptor {
    ChartDescriptor {
        kind: ChartKind::Line,
        title: ROUTE_CHART_TITLE.to_string(),
        series_label: ROUTE_SERIES_LABEL.to_string(),
        labels: routes.iter().map(|r| r.route.clone()).collect(),
        values: routes.iter().map(|r| f64::from(r.flights_per_day)).collect(),
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Both dashboard charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub prices: ChartDescriptor,
    pub routes: ChartDescriptor,
}

impl Charts {
    pub fn build(flights: &[FlightRecord], routes: &[RouteSummary]) -> Self {
        Self {
            prices: price_chart(flights),
            routes: route_chart(routes),
        }
    }
}

impl ChartDescriptor {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn value_of(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .and_then(|i| self.values.get(i).copied())
    }

    /// Render as text rows scaled to the largest value.
    ///
    /// Bars are drawn as filled blocks, lines as a marker at the value's
    /// position so consecutive rows read as a trace.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} [{}]", self.title, self.series_label);

        if self.is_empty() {
            let _ = writeln!(out, "  (no data)");
            return out;
        }

        let label_width = self.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let max_value = self.values.iter().cloned().fold(0.0_f64, f64::max);

        for (label, value) in self.labels.iter().zip(&self.values) {
            let cells = if max_value > 0.0 {
                ((value / max_value) * TEXT_BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            let graphic = match self.kind {
                ChartKind::Bar => "█".repeat(cells),
                ChartKind::Line => format!("{}●", " ".repeat(cells.saturating_sub(1))),
            };
            let _ = writeln!(
                out,
                "  {:<width$} │{:<bar$} {}",
                label,
                graphic,
                format_value(*value),
                width = label_width,
                bar = TEXT_BAR_WIDTH
            );
        }
        out
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}
