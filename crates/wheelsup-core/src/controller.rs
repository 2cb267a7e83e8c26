use std::collections::BTreeMap;
use std::sync::Arc;

use log::{info, warn};

use crate::client::EstimateBackend;
use crate::engine;
use crate::trip::EstimateResult;
use crate::validator::{self, TripCandidate, DEFAULT_CAB_BUFFER_MINUTES};

/// Submission state machine: `Idle → Loading → {Success, Error}`, with an
/// explicit reset back to `Idle`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPhase {
    Idle,
    Loading,
    Success(EstimateResult),
    Error(String),
}

impl SubmissionPhase {
    pub fn is_loading(&self) -> bool {
        matches!(self, SubmissionPhase::Loading)
    }
}

/// Orchestrates validation, the remote call and engine composition.
///
/// The controller is the single writer of submission state. It owns the raw
/// form fields and the current result; each new submission discards the
/// previous one, and no history is kept. Advisory state (suggestions,
/// weather previews) lives in its own components and never crosses into
/// this machine.
pub struct SubmissionController<B> {
    backend: Arc<B>,
    pub form: TripCandidate,
    phase: SubmissionPhase,
    field_errors: BTreeMap<&'static str, String>,
}

impl<B: EstimateBackend> SubmissionController<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            form: TripCandidate::default(),
            phase: SubmissionPhase::Idle,
            field_errors: BTreeMap::new(),
        }
    }

    pub fn phase(&self) -> &SubmissionPhase {
        &self.phase
    }

    /// Field errors from the most recent submission attempt.
    pub fn field_errors(&self) -> &BTreeMap<&'static str, String> {
        &self.field_errors
    }

    /// Runs one submission: validate, call the backend once, compose.
    ///
    /// A submission while already loading is a no-op. A validation failure
    /// surfaces field errors and never enters `Loading` (nothing touches
    /// the network). A remote failure lands in `Error` with a user-facing
    /// message, never the raw transport error.
    pub async fn submit(&mut self) -> &SubmissionPhase {
        if self.phase.is_loading() {
            return &self.phase;
        }

        let report = validator::validate(&self.form);
        if !report.valid {
            info!(
                "submission rejected by validation — error_count={}",
                report.field_errors.len()
            );
            self.field_errors = report.field_errors;
            return &self.phase;
        }
        self.field_errors.clear();

        // Validation passed, so the candidate is complete and the instant
        // parses; both branches below are unreachable in practice.
        let request = match self.form.to_request() {
            Some(request) => request,
            None => {
                self.phase = SubmissionPhase::Error(
                    "The trip request is incomplete. Fill in the form and try again.".to_string(),
                );
                return &self.phase;
            }
        };
        let arrival_instant = match request.arrival_instant() {
            Ok(instant) => instant,
            Err(e) => {
                self.phase = SubmissionPhase::Error(e.user_message());
                return &self.phase;
            }
        };

        self.phase = SubmissionPhase::Loading;

        match self.backend.request_estimate(&request).await {
            Ok(remote) => match engine::compose(
                arrival_instant,
                remote.base_travel_minutes,
                request.effective_cab_buffer(),
                remote.weather_extra_minutes,
                remote.weather_summary,
            ) {
                Ok(result) => {
                    info!(
                        "estimate composed — airport={} total_minutes={} leave={}",
                        request.airport,
                        result.breakdown.total_minutes,
                        result.recommended_leave_instant
                    );
                    self.phase = SubmissionPhase::Success(result);
                }
                Err(e) => {
                    warn!("estimate breakdown rejected — error={}", e);
                    self.phase = SubmissionPhase::Error(e.user_message());
                }
            },
            Err(e) => {
                warn!("estimate call failed — error={}", e);
                self.phase = SubmissionPhase::Error(e.user_message());
            }
        }

        &self.phase
    }

    /// Soft reset: back to `Idle`, clearing the result, errors and trip
    /// timing fields while keeping the address and airport the user already
    /// typed in.
    pub fn reset(&mut self) {
        self.phase = SubmissionPhase::Idle;
        self.field_errors.clear();

        self.form.selected_place_id = None;
        self.form.arrival_date.clear();
        self.form.arrival_time.clear();
        self.form.transport_mode = None;
        self.form.cab_buffer_minutes = Some(DEFAULT_CAB_BUFFER_MINUTES);
        // from_address_text and airport survive the reset on purpose.
    }
}
