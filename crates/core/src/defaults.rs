//! Deliverability-oriented defaults for campaign requests
//!
//! [`apply_defaults`] fills in every optional field the caller left unset and
//! reports what it did, so the tool response can tell the user which values
//! were chosen on their behalf. Explicit values, including `false` and `0`,
//! are never overridden.

use crate::campaign::{CampaignRequest, DaySelection};
use crate::timezone::TimezoneConfig;

pub const DEFAULT_TIMING_FROM: &str = "09:00";
pub const DEFAULT_TIMING_TO: &str = "17:00";
pub const DEFAULT_DAILY_LIMIT: u32 = 30;
pub const DEFAULT_EMAIL_GAP_MINUTES: u32 = 10;
pub const DEFAULT_SEQUENCE_STEPS: u32 = 1;
pub const DEFAULT_STEP_DELAY_DAYS: u32 = 3;

/// Defaulted copy of a request plus a log of every default applied
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultsOutcome {
    pub request: CampaignRequest,
    pub applied: Vec<String>,
}

/// Fill unset optional fields with smart defaults
///
/// The input is left untouched; the returned request is a modified copy.
pub fn apply_defaults(request: &CampaignRequest, timezones: &TimezoneConfig) -> DefaultsOutcome {
    let mut enhanced = request.clone();
    let mut applied = Vec::new();

    if enhanced.open_tracking.is_none() {
        enhanced.open_tracking = Some(false);
        applied.push("open_tracking disabled (tracking pixels hurt deliverability)".to_string());
    }
    if enhanced.link_tracking.is_none() {
        enhanced.link_tracking = Some(false);
        applied.push("link_tracking disabled (rewritten links hurt deliverability)".to_string());
    }

    let requested_timezone = enhanced.timezone.clone();
    match requested_timezone.as_deref() {
        None => {
            enhanced.timezone = Some(timezones.default_timezone.clone());
            applied.push(format!("timezone set to {}", timezones.default_timezone));
        }
        Some(requested) => {
            let resolved = timezones.resolve(Some(requested));
            if let Some(warning) = resolved.warning {
                applied.push(warning);
                enhanced.timezone = Some(resolved.timezone);
            }
        }
    }

    if enhanced.timing_from.is_none() {
        enhanced.timing_from = Some(DEFAULT_TIMING_FROM.to_string());
        applied.push(format!("timing_from set to {DEFAULT_TIMING_FROM}"));
    }
    if enhanced.timing_to.is_none() {
        enhanced.timing_to = Some(DEFAULT_TIMING_TO.to_string());
        applied.push(format!("timing_to set to {DEFAULT_TIMING_TO}"));
    }

    if enhanced.daily_limit.is_none() {
        enhanced.daily_limit = Some(DEFAULT_DAILY_LIMIT);
        applied.push(format!(
            "daily_limit set to {DEFAULT_DAILY_LIMIT} emails per day per account"
        ));
    }
    if enhanced.email_gap_minutes.is_none() {
        enhanced.email_gap_minutes = Some(DEFAULT_EMAIL_GAP_MINUTES);
        applied.push(format!(
            "email_gap_minutes set to {DEFAULT_EMAIL_GAP_MINUTES} minutes between emails"
        ));
    }

    if enhanced.stop_on_reply.is_none() {
        enhanced.stop_on_reply = Some(true);
        applied.push("stop_on_reply enabled".to_string());
    }
    if enhanced.stop_on_auto_reply.is_none() {
        enhanced.stop_on_auto_reply = Some(true);
        applied.push("stop_on_auto_reply enabled".to_string());
    }

    if enhanced.days.is_none() {
        enhanced.days = Some(DaySelection::weekdays());
        applied.push("days set to Monday-Friday".to_string());
    }

    if enhanced.sequence_steps.is_none() {
        enhanced.sequence_steps = Some(DEFAULT_SEQUENCE_STEPS);
        applied.push(format!("sequence_steps set to {DEFAULT_SEQUENCE_STEPS}"));
    }
    if enhanced.step_delay_days.is_none() {
        enhanced.step_delay_days = Some(DEFAULT_STEP_DELAY_DAYS);
        applied.push(format!("step_delay_days set to {DEFAULT_STEP_DELAY_DAYS} days"));
    }

    let steps = enhanced.sequence_steps.unwrap_or(DEFAULT_SEQUENCE_STEPS) as usize;
    if steps > 1 && !enhanced.is_complex() {
        let (subject, body) = enhanced.resolved_content();
        let subject = subject.unwrap_or_default();
        let body = body.unwrap_or_default();

        if let Some(added) = pad_sequence(&mut enhanced.sequence_bodies, steps, |index| {
            if index == 0 {
                body.clone()
            } else {
                format!("Follow-up #{index}:\n\n{body}")
            }
        }) {
            applied.push(format!(
                "sequence_bodies: generated {added} follow-up bodies from the base body"
            ));
        }

        if let Some(added) = pad_sequence(&mut enhanced.sequence_subjects, steps, |index| {
            if index == 0 {
                subject.clone()
            } else {
                format!("Follow-up: {subject}")
            }
        }) {
            applied.push(format!(
                "sequence_subjects: generated {added} follow-up subjects from the base subject"
            ));
        }
    }

    DefaultsOutcome {
        request: enhanced,
        applied,
    }
}

/// Extend `entries` to `len` items, returning how many were synthesized
fn pad_sequence(
    entries: &mut Option<Vec<String>>,
    len: usize,
    synthesize: impl Fn(usize) -> String,
) -> Option<usize> {
    let list = entries.get_or_insert_with(Vec::new);
    let existing = list.len();
    if existing >= len {
        return None;
    }

    list.extend((existing..len).map(synthesize));
    Some(len - existing)
}
