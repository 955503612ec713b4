use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Date format accepted on every input surface (`YYYY-MM-DD`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Errors raised while turning raw input into a [`TripRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("missing required field {0:?}")]
    MissingField(&'static str),

    #[error("invalid date {value:?} in field {field:?} (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },

    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

impl RequestError {
    /// Spanish message shown to the person filling in the form.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingField(_) | Self::InvalidDate { .. } => {
                "Las fechas proporcionadas no son válidas. Usa el formato AAAA-MM-DD."
            }
            Self::EndBeforeStart { .. } => {
                "La fecha de fin debe ser posterior a la fecha de inicio."
            }
        }
    }
}

/// Parse a `YYYY-MM-DD` value coming from the named input field.
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, RequestError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| RequestError::InvalidDate {
        field,
        value: value.to_owned(),
    })
}

/// A validated travel request.
///
/// Use [`TripRequest::new`] for the client and date range, then chain the
/// optional setters. The date range is checked once, at construction, and
/// cannot be changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRequest {
    client_name: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    destination: String,
    travel_style: String,
    special_requests: String,
}

impl TripRequest {
    pub const DEFAULT_CLIENT: &str = "Cliente";
    pub const DEFAULT_DESTINATION: &str = "Destino principal";
    pub const DEFAULT_STYLE: &str = "Premium";

    /// Create a request for the inclusive range `start_date..=end_date`.
    ///
    /// Optional fields start at their defaults:
    /// - `destination`: `"Destino principal"`
    /// - `travel_style`: `"Premium"`
    /// - `special_requests`: empty
    pub fn new(
        client_name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, RequestError> {
        if end_date < start_date {
            return Err(RequestError::EndBeforeStart {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            client_name: client_name.into(),
            start_date,
            end_date,
            destination: Self::DEFAULT_DESTINATION.to_owned(),
            travel_style: Self::DEFAULT_STYLE.to_owned(),
            special_requests: String::new(),
        })
    }

    /// Set the main destination.
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = destination.into();
        self
    }

    /// Set the travel style (free text, matched case-insensitively).
    pub fn travel_style(mut self, style: impl Into<String>) -> Self {
        self.travel_style = style.into();
        self
    }

    /// Set the free-text special requests.
    pub fn special_requests(mut self, requests: impl Into<String>) -> Self {
        self.special_requests = requests.into();
        self
    }

    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn destination_name(&self) -> &str {
        &self.destination
    }

    pub fn style(&self) -> &str {
        &self.travel_style
    }

    pub fn requests(&self) -> &str {
        &self.special_requests
    }

    /// Number of calendar days covered, both ends included.
    pub fn total_days(&self) -> u32 {
        // The constructor guarantees end >= start, so the span is never negative.
        (self.end_date - self.start_date).num_days() as u32 + 1
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

/// Structured description of a processed attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSummary {
    pub filename: String,
    pub content_type: String,
    /// Human-readable processing note.
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub style: String,
    pub special_requests: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripInfo {
    pub destination: String,
    /// Display label, e.g. `01 marzo 2024`.
    pub start_date: String,
    pub end_date: String,
    pub nights: u32,
}

/// One calendar day of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayEntry {
    /// Display label, e.g. `viernes 01 marzo`.
    pub date: String,
    pub title: String,
    pub summary: String,
    pub morning: String,
    pub afternoon: String,
    pub evening: String,
}

/// The four recommendation categories, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Gastronomy,
    Logistics,
    Wellness,
    Insider,
}

impl RecommendationCategory {
    pub const ALL: [Self; 4] = [
        Self::Gastronomy,
        Self::Logistics,
        Self::Wellness,
        Self::Insider,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Gastronomy => "gastronomy",
            Self::Logistics => "logistics",
            Self::Wellness => "wellness",
            Self::Insider => "insider",
        }
    }

    /// Section heading used in rendered documents.
    pub fn label(self) -> &'static str {
        match self {
            Self::Gastronomy => "Gastronomy",
            Self::Logistics => "Logistics",
            Self::Wellness => "Wellness",
            Self::Insider => "Insider",
        }
    }
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Advice grouped by category. Every list is non-empty in a built plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendations {
    pub gastronomy: Vec<String>,
    pub logistics: Vec<String>,
    pub wellness: Vec<String>,
    pub insider: Vec<String>,
}

impl Recommendations {
    pub fn get(&self, category: RecommendationCategory) -> &[String] {
        match category {
            RecommendationCategory::Gastronomy => &self.gastronomy,
            RecommendationCategory::Logistics => &self.logistics,
            RecommendationCategory::Wellness => &self.wellness,
            RecommendationCategory::Insider => &self.insider,
        }
    }

    pub(crate) fn list_mut(&mut self, category: RecommendationCategory) -> &mut Vec<String> {
        match category {
            RecommendationCategory::Gastronomy => &mut self.gastronomy,
            RecommendationCategory::Logistics => &mut self.logistics,
            RecommendationCategory::Wellness => &mut self.wellness,
            RecommendationCategory::Insider => &mut self.insider,
        }
    }

    /// Categories with their items, in display order.
    pub fn iter(&self) -> impl Iterator<Item = (RecommendationCategory, &[String])> {
        RecommendationCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }
}

/// The generated itinerary. Immutable once built; the unit of storage and
/// the sole input to rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub client: ClientInfo,
    pub trip: TripInfo,
    pub days: Vec<DayEntry>,
    pub recommendations: Recommendations,
    pub attachments: Vec<AttachmentSummary>,
}

impl Plan {
    /// Download filename derived from the client name, e.g.
    /// `itinerario_ana_maria.pdf`.
    pub fn download_filename(&self) -> String {
        let slug = self.client.name.replace(' ', "_").to_lowercase();
        format!("itinerario_{slug}.pdf")
    }
}
