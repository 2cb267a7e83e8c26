// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wheels-Up contributors
//
// Regression tests for the trip validator (validator.rs).
// Covers: validation totality on an empty candidate, field error copy,
// cab buffer gating, date/time well-formedness.

use wheelsup_core::trip::{Airport, TransportMode};
use wheelsup_core::validator::{validate, TripCandidate};

fn well_formed() -> TripCandidate {
    TripCandidate {
        from_address_text: "20 W 34th St, New York".to_string(),
        selected_place_id: Some("place-123".to_string()),
        airport: Some(Airport::Lga),
        arrival_date: "06-01-2025".to_string(),
        arrival_time: "07:45".to_string(),
        transport_mode: Some(TransportMode::Cab),
        cab_buffer_minutes: Some(15),
    }
}

// =====================================================================
// Totality
// =====================================================================

#[test]
fn test_empty_candidate_reports_every_required_field() {
    let empty = TripCandidate {
        cab_buffer_minutes: None,
        ..TripCandidate::default()
    };
    let report = validate(&empty);

    assert!(!report.valid);
    for field in [
        "fromAddress",
        "airport",
        "arrivalDate",
        "arrivalTime",
        "transportMode",
    ] {
        assert!(
            report.field_errors.contains_key(field),
            "missing error for {field}"
        );
    }
    // The cab buffer is only required once cab mode is chosen.
    assert!(!report.field_errors.contains_key("cabBuffer"));
}

#[test]
fn test_well_formed_candidate_is_valid_with_no_errors() {
    let report = validate(&well_formed());
    assert!(report.valid);
    assert!(report.field_errors.is_empty());
}

#[test]
fn test_all_violations_reported_in_one_pass() {
    let candidate = TripCandidate {
        from_address_text: " ".to_string(),
        arrival_date: "not-a-date".to_string(),
        arrival_time: "25:00".to_string(),
        transport_mode: Some(TransportMode::Cab),
        cab_buffer_minutes: None,
        ..TripCandidate::default()
    };
    let report = validate(&candidate);
    assert_eq!(report.field_errors.len(), 5);
}

// =====================================================================
// Field error copy
// =====================================================================

#[test]
fn test_error_messages_match_product_copy() {
    let empty = TripCandidate::default();
    let report = validate(&empty);

    assert_eq!(
        report.field_errors.get("fromAddress").map(String::as_str),
        Some("From address is required")
    );
    assert_eq!(
        report.field_errors.get("airport").map(String::as_str),
        Some("Airport selection is required")
    );
    assert_eq!(
        report.field_errors.get("transportMode").map(String::as_str),
        Some("Transportation mode is required")
    );
}

#[test]
fn test_cab_buffer_message() {
    let candidate = TripCandidate {
        transport_mode: Some(TransportMode::Cab),
        cab_buffer_minutes: None,
        ..well_formed()
    };
    let report = validate(&candidate);
    assert_eq!(
        report.field_errors.get("cabBuffer").map(String::as_str),
        Some("Cab pickup buffer is required when using cab or rideshare")
    );
}

// =====================================================================
// Date / time shape
// =====================================================================

#[test]
fn test_impossible_calendar_dates_are_rejected() {
    for bad in ["02-30-2025", "13-01-2025", "00-10-2025", "2025-01-15", "01/15/2025"] {
        let candidate = TripCandidate {
            arrival_date: bad.to_string(),
            ..well_formed()
        };
        let report = validate(&candidate);
        assert!(
            report.field_errors.contains_key("arrivalDate"),
            "{bad} should be rejected"
        );
    }
}

#[test]
fn test_out_of_range_times_are_rejected() {
    for bad in ["24:00", "10:60", "9am", "10.30"] {
        let candidate = TripCandidate {
            arrival_time: bad.to_string(),
            ..well_formed()
        };
        let report = validate(&candidate);
        assert!(
            report.field_errors.contains_key("arrivalTime"),
            "{bad} should be rejected"
        );
    }
}

#[test]
fn test_leap_day_is_accepted_in_leap_years_only() {
    let candidate = TripCandidate {
        arrival_date: "02-29-2024".to_string(),
        ..well_formed()
    };
    assert!(validate(&candidate).valid);

    let candidate = TripCandidate {
        arrival_date: "02-29-2025".to_string(),
        ..well_formed()
    };
    assert!(!validate(&candidate).valid);
}
