use chrono::{Duration, NaiveDateTime};

use crate::trip::{EstimateBreakdown, EstimateResult};
use crate::EstimateError;

/// Combines the remote baseline, the gated cab buffer and the weather delay
/// into one recommended-departure computation.
///
/// `total_minutes` is the exact sum of the three components; the leave
/// instant is plain calendar-aware subtraction, so day/month/year rollovers
/// come from chrono, not manual date math. No clamping: a zero cab/weather
/// breakdown is the normal "drive yourself, clear weather" path.
///
/// The remote minutes pass schema checks individually, so their sum can
/// still exceed `u32`. A breakdown whose total does not fit is rejected
/// rather than wrapped into a nonsense leave instant.
pub fn compose(
    arrival_instant: NaiveDateTime,
    base_travel_minutes: u32,
    cab_buffer_minutes_used: u32,
    weather_extra_minutes: u32,
    weather_summary: Option<String>,
) -> Result<EstimateResult, EstimateError> {
    let total_minutes = base_travel_minutes
        .checked_add(cab_buffer_minutes_used)
        .and_then(|sum| sum.checked_add(weather_extra_minutes))
        .ok_or_else(|| {
            EstimateError::MalformedResponse(format!(
                "breakdown minutes out of range: {base_travel_minutes} + \
                 {cab_buffer_minutes_used} + {weather_extra_minutes} exceeds u32"
            ))
        })?;
    let recommended_leave_instant = arrival_instant - Duration::minutes(i64::from(total_minutes));

    Ok(EstimateResult {
        arrival_instant,
        recommended_leave_instant,
        breakdown: EstimateBreakdown {
            base_travel_minutes,
            cab_buffer_minutes_used,
            weather_extra_minutes,
            total_minutes,
            weather_summary,
        },
    })
}
