use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};

use crate::trip::{Airport, TransportMode, TripRequest, DATE_FORMAT, TIME_FORMAT};

/// Cab pickup buffer the form starts out with, in minutes.
pub const DEFAULT_CAB_BUFFER_MINUTES: u32 = 10;

/// Raw form state before validation. Everything the user has not filled in
/// yet is simply absent or empty; absence is a field error, never a panic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripCandidate {
    pub from_address_text: String,
    pub selected_place_id: Option<String>,
    pub airport: Option<Airport>,
    pub arrival_date: String,
    pub arrival_time: String,
    pub transport_mode: Option<TransportMode>,
    pub cab_buffer_minutes: Option<u32>,
}

impl Default for TripCandidate {
    fn default() -> Self {
        Self {
            from_address_text: String::new(),
            selected_place_id: None,
            airport: None,
            arrival_date: String::new(),
            arrival_time: String::new(),
            transport_mode: None,
            cab_buffer_minutes: Some(DEFAULT_CAB_BUFFER_MINUTES),
        }
    }
}

impl TripCandidate {
    /// Builds the immutable request once validation has passed.
    /// Returns `None` when a required field is still missing.
    pub fn to_request(&self) -> Option<TripRequest> {
        let airport = self.airport?;
        let transport_mode = self.transport_mode?;
        let cab_buffer_minutes = match transport_mode {
            TransportMode::Cab => self.cab_buffer_minutes?,
            TransportMode::SelfDrive => 0,
        };
        Some(TripRequest {
            from_address_text: self.from_address_text.trim().to_string(),
            selected_place_id: self.selected_place_id.clone(),
            airport,
            arrival_date: self.arrival_date.trim().to_string(),
            arrival_time: self.arrival_time.trim().to_string(),
            transport_mode,
            cab_buffer_minutes,
        })
    }
}

/// Outcome of one validation pass. All violations are collected in a single
/// pass, keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub field_errors: BTreeMap<&'static str, String>,
}

/// Checks a candidate for completeness and shape. Pure and total: no I/O,
/// no panics, and every broken field gets its own message.
pub fn validate(candidate: &TripCandidate) -> ValidationReport {
    let mut field_errors = BTreeMap::new();

    if candidate.from_address_text.trim().is_empty() {
        field_errors.insert("fromAddress", "From address is required".to_string());
    }

    if candidate.airport.is_none() {
        field_errors.insert("airport", "Airport selection is required".to_string());
    }

    let date = candidate.arrival_date.trim();
    if date.is_empty() {
        field_errors.insert("arrivalDate", "Arrival date is required".to_string());
    } else if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
        field_errors.insert(
            "arrivalDate",
            "Arrival date must be a valid MM-DD-YYYY calendar date".to_string(),
        );
    }

    let time = candidate.arrival_time.trim();
    if time.is_empty() {
        field_errors.insert("arrivalTime", "Arrival time is required".to_string());
    } else if NaiveTime::parse_from_str(time, TIME_FORMAT).is_err() {
        field_errors.insert(
            "arrivalTime",
            "Arrival time must be a valid HH:MM time".to_string(),
        );
    }

    match candidate.transport_mode {
        None => {
            field_errors.insert(
                "transportMode",
                "Transportation mode is required".to_string(),
            );
        }
        Some(TransportMode::Cab) => {
            if candidate.cab_buffer_minutes.is_none() {
                field_errors.insert(
                    "cabBuffer",
                    "Cab pickup buffer is required when using cab or rideshare".to_string(),
                );
            }
        }
        Some(TransportMode::SelfDrive) => {}
    }

    ValidationReport {
        valid: field_errors.is_empty(),
        field_errors,
    }
}
