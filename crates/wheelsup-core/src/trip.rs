use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::EstimateError;

/// Canonical wire form for arrival dates, e.g. "01-15-2025".
pub const DATE_FORMAT: &str = "%m-%d-%Y";
/// Canonical wire form for arrival times, 24-hour clock, e.g. "08:53".
pub const TIME_FORMAT: &str = "%H:%M";

/// The three supported destination airports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Airport {
    #[serde(rename = "JFK")]
    Jfk,
    #[serde(rename = "LGA")]
    Lga,
    #[serde(rename = "EWR")]
    Ewr,
}

impl Airport {
    pub const ALL: [Airport; 3] = [Airport::Jfk, Airport::Lga, Airport::Ewr];

    pub fn code(&self) -> &'static str {
        match self {
            Airport::Jfk => "JFK",
            Airport::Lga => "LGA",
            Airport::Ewr => "EWR",
        }
    }

    pub fn from_code(code: &str) -> Option<Airport> {
        match code.trim().to_uppercase().as_str() {
            "JFK" => Some(Airport::Jfk),
            "LGA" => Some(Airport::Lga),
            "EWR" => Some(Airport::Ewr),
            _ => None,
        }
    }
}

impl fmt::Display for Airport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// How the traveler gets to the airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportMode {
    /// Driving yourself; no pickup buffer applies.
    #[serde(rename = "self")]
    SelfDrive,
    /// Cab or rideshare; a pickup buffer applies.
    #[serde(rename = "cab")]
    Cab,
}

impl TransportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::SelfDrive => "self",
            TransportMode::Cab => "cab",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<TransportMode> {
        match value.trim().to_lowercase().as_str() {
            "self" | "drive" => Some(TransportMode::SelfDrive),
            "cab" => Some(TransportMode::Cab),
            _ => None,
        }
    }
}

/// A validated trip request, immutable once submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripRequest {
    pub from_address_text: String,
    /// Set only when the address was chosen from a suggestion list;
    /// otherwise the free text is authoritative.
    pub selected_place_id: Option<String>,
    pub airport: Airport,
    /// Calendar date in `MM-DD-YYYY` form.
    pub arrival_date: String,
    /// Wall-clock time in `HH:MM` (24-hour) form.
    pub arrival_time: String,
    pub transport_mode: TransportMode,
    /// Meaningful only for [`TransportMode::Cab`]; treated as 0 otherwise.
    pub cab_buffer_minutes: u32,
}

impl TripRequest {
    /// Parses `arrival_date` + `arrival_time` into a calendar instant.
    /// Out-of-range combinations (month 13, 24:00, Feb 30) fail here and
    /// are never clamped.
    pub fn arrival_instant(&self) -> Result<NaiveDateTime, EstimateError> {
        let date = NaiveDate::parse_from_str(self.arrival_date.trim(), DATE_FORMAT)
            .map_err(|e| EstimateError::InvalidInstant(format!("{}: {e}", self.arrival_date)))?;
        let time = NaiveTime::parse_from_str(self.arrival_time.trim(), TIME_FORMAT)
            .map_err(|e| EstimateError::InvalidInstant(format!("{}: {e}", self.arrival_time)))?;
        Ok(NaiveDateTime::new(date, time))
    }

    /// Cab buffer gated on the transport mode: always 0 when self-driving.
    pub fn effective_cab_buffer(&self) -> u32 {
        match self.transport_mode {
            TransportMode::Cab => self.cab_buffer_minutes,
            TransportMode::SelfDrive => 0,
        }
    }
}

/// Itemized minute components of one estimate. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateBreakdown {
    pub base_travel_minutes: u32,
    pub cab_buffer_minutes_used: u32,
    pub weather_extra_minutes: u32,
    /// Exact sum of the three components above.
    pub total_minutes: u32,
    /// Human-readable condition label, advisory only.
    pub weather_summary: Option<String>,
}

/// The composed answer: when to leave to make the requested arrival.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EstimateResult {
    pub arrival_instant: NaiveDateTime,
    pub recommended_leave_instant: NaiveDateTime,
    pub breakdown: EstimateBreakdown,
}

/// One address candidate, valid only until its query generation is superseded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    #[serde(alias = "place_id")]
    pub id: String,
    pub label: String,
}

/// Advisory weather delay for an airport/date/time, generation-scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherPreview {
    pub summary: String,
    pub extra_minutes: u32,
}
