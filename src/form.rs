//! Search form model
//!
//! Holds the draft request between edits and hands it to the caller on
//! submit. The form never talks to the backend itself.

use crate::SearchRequest;
use chrono::NaiveDate;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Airports offered by the origin and destination pickers
pub const AIRPORTS: &[(&str, &str)] = &[
    ("SYD", "Sydney"),
    ("MEL", "Melbourne"),
    ("BNE", "Brisbane"),
    ("PER", "Perth"),
];

pub const DEFAULT_ORIGIN: &str = "SYD";
pub const DEFAULT_DESTINATION: &str = "MEL";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    #[error("Invalid date format: {0} (expected YYYY-MM-DD)")]
    DateParseError(String),
}

/// Form fields, named as on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Origin,
    Destination,
    Date,
    ReturnDate,
}

impl FromStr for FormField {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "origin" | "from" => Ok(FormField::Origin),
            "destination" | "to" => Ok(FormField::Destination),
            "date" => Ok(FormField::Date),
            "return_date" | "return-date" | "return" => Ok(FormField::ReturnDate),
            _ => Err(FormError::UnknownField(s.to_string())),
        }
    }
}

/// A single field change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Origin(String),
    Destination(String),
    Date(NaiveDate),
    ReturnDate(Option<NaiveDate>),
}

impl FieldEdit {
    /// Parse a textual edit. An empty return date clears it.
    pub fn parse(field: &str, value: &str) -> Result<Self, FormError> {
        let value = value.trim();
        match field.parse::<FormField>()? {
            FormField::Origin => Ok(FieldEdit::Origin(value.to_string())),
            FormField::Destination => Ok(FieldEdit::Destination(value.to_string())),
            FormField::Date => parse_date(value).map(FieldEdit::Date),
            FormField::ReturnDate if value.is_empty() => Ok(FieldEdit::ReturnDate(None)),
            FormField::ReturnDate => parse_date(value).map(|d| FieldEdit::ReturnDate(Some(d))),
        }
    }

    pub fn field(&self) -> FormField {
        match self {
            FieldEdit::Origin(_) => FormField::Origin,
            FieldEdit::Destination(_) => FormField::Destination,
            FieldEdit::Date(_) => FormField::Date,
            FieldEdit::ReturnDate(_) => FormField::ReturnDate,
        }
    }
}

pub fn parse_date(value: &str) -> Result<NaiveDate, FormError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| FormError::DateParseError(value.to_string()))
}

/// Draft search plus the disabled flag driven by the caller's loading state
#[derive(Debug, Clone, PartialEq)]
pub struct SearchForm {
    draft: SearchRequest,
    today: NaiveDate,
    disabled: bool,
}

impl SearchForm {
    /// Fresh form: SYD to MEL, departing `today`, one way
    pub fn new(today: NaiveDate) -> Self {
        Self {
            draft: SearchRequest::new(DEFAULT_ORIGIN, DEFAULT_DESTINATION, today),
            today,
            disabled: false,
        }
    }

    pub fn draft(&self) -> &SearchRequest {
        &self.draft
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Mirror the caller's in-flight flag
    pub fn set_loading(&mut self, loading: bool) {
        self.disabled = loading;
    }

    /// Apply one edit. Only the edited field changes; disabled forms ignore edits.
    pub fn apply(&mut self, edit: FieldEdit) -> bool {
        if self.disabled {
            debug!(field = ?edit.field(), "Ignoring edit while form is disabled");
            return false;
        }
        debug!(edit = ?edit, "Form field changed");
        match edit {
            FieldEdit::Origin(origin) => self.draft.origin = origin,
            FieldEdit::Destination(destination) => self.draft.destination = destination,
            FieldEdit::Date(date) => self.draft.date = date,
            FieldEdit::ReturnDate(return_date) => self.draft.return_date = return_date,
        }
        true
    }

    /// Move the form to a new calendar day.
    ///
    /// Dates that fell behind the new minimum are pulled up to it.
    pub fn roll_over(&mut self, today: NaiveDate) {
        if today <= self.today {
            return;
        }
        debug!(from = %self.today, to = %today, "Form date bounds moved");
        self.today = today;
        if self.draft.date < today {
            self.draft.date = today;
        }
        if self.draft.return_date.is_some_and(|date| date < today) {
            self.draft.return_date = Some(today);
        }
    }

    /// Earliest selectable departure date
    pub fn date_min(&self) -> NaiveDate {
        self.today
    }

    /// Earliest selectable return date, tied to the departure date
    pub fn return_date_min(&self) -> NaiveDate {
        self.draft.date
    }

    /// Hand the draft over unmodified, unless a search is already running
    pub fn submit(&self) -> Option<SearchRequest> {
        if self.disabled {
            debug!("Submit ignored while a search is in flight");
            return None;
        }
        debug!(draft = ?self.draft, "Form submitted");
        Some(self.draft.clone())
    }

    pub fn submit_label(&self) -> &'static str {
        if self.disabled {
            "Searching..."
        } else {
            "Find Flights"
        }
    }

    /// Display name for an airport code offered by the pickers
    pub fn airport_name(code: &str) -> Option<&'static str> {
        AIRPORTS
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(code))
            .map(|(_, name)| *name)
    }
}
