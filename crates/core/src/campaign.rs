//! Campaign request model and wire payload construction
//!
//! A [`CampaignRequest`] is the flat, user-facing shape a tool caller supplies.
//! [`build_campaign_payload`] turns it into the nested [`CampaignPayload`] the
//! upstream `POST /campaigns` endpoint expects.
//!
//! Two request shapes exist:
//!
//! - **simple**: subject + body (or a combined `message`), expanded through a
//!   schedule/sequence template
//! - **complex**: the caller supplies `campaign_schedule` and `sequences`
//!   directly; both are passed through untouched

use std::collections::BTreeMap;

use serde::Serialize;

use crate::defaults::{
    DEFAULT_DAILY_LIMIT, DEFAULT_SEQUENCE_STEPS, DEFAULT_STEP_DELAY_DAYS, DEFAULT_TIMING_FROM,
    DEFAULT_TIMING_TO,
};
use crate::errors::BuildError;
use crate::html::{convert_line_breaks_to_html, flatten_subject, LINE_BREAK};
use crate::timezone::TimezoneConfig;

/// Name given to the single generated schedule
pub const SCHEDULE_NAME: &str = "Default Schedule";

/// Per-weekday sending switches as supplied by the caller
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DaySelection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunday: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monday: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tuesday: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wednesday: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thursday: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friday: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saturday: Option<bool>,
}

/// Day names in upstream key order ("0" is Sunday)
pub const DAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

impl DaySelection {
    /// Monday through Friday explicitly on, weekend explicitly off
    pub fn weekdays() -> Self {
        Self {
            sunday: Some(false),
            monday: Some(true),
            tuesday: Some(true),
            wednesday: Some(true),
            thursday: Some(true),
            friday: Some(true),
            saturday: Some(false),
        }
    }

    fn slots(&self) -> [Option<bool>; 7] {
        [
            self.sunday,
            self.monday,
            self.tuesday,
            self.wednesday,
            self.thursday,
            self.friday,
            self.saturday,
        ]
    }

    /// Mutable access by upstream index, 0 = Sunday
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut Option<bool>> {
        match index {
            0 => Some(&mut self.sunday),
            1 => Some(&mut self.monday),
            2 => Some(&mut self.tuesday),
            3 => Some(&mut self.wednesday),
            4 => Some(&mut self.thursday),
            5 => Some(&mut self.friday),
            6 => Some(&mut self.saturday),
            _ => None,
        }
    }

    /// Dense `"0"`..`"6"` map; unset days fall back to weekday on, weekend off
    pub fn to_days_map(&self) -> BTreeMap<String, bool> {
        self.slots()
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let weekday = (1..=5).contains(&index);
                (index.to_string(), value.unwrap_or(weekday))
            })
            .collect()
    }
}

/// Caller input for `create_campaign`, produced by validation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CampaignRequest {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    /// Combined subject and body, split on the first sentence
    pub message: Option<String>,
    pub email_list: Vec<String>,

    pub timezone: Option<String>,
    pub timing_from: Option<String>,
    pub timing_to: Option<String>,
    pub days: Option<DaySelection>,

    pub daily_limit: Option<u32>,
    pub email_gap_minutes: Option<u32>,
    pub text_only: Option<bool>,
    pub open_tracking: Option<bool>,
    pub link_tracking: Option<bool>,
    pub stop_on_reply: Option<bool>,
    pub stop_on_auto_reply: Option<bool>,

    pub sequence_steps: Option<u32>,
    pub step_delay_days: Option<u32>,
    pub sequence_bodies: Option<Vec<String>>,
    pub sequence_subjects: Option<Vec<String>>,

    pub campaign_schedule: Option<serde_json::Value>,
    pub sequences: Option<serde_json::Value>,
}

impl CampaignRequest {
    /// Caller supplied the full schedule and sequence structure
    pub fn is_complex(&self) -> bool {
        self.campaign_schedule.is_some() && self.sequences.is_some()
    }

    /// Subject and body, filling whichever is missing from `message`
    pub fn resolved_content(&self) -> (Option<String>, Option<String>) {
        match (&self.subject, &self.body, &self.message) {
            (Some(subject), Some(body), _) => (Some(subject.clone()), Some(body.clone())),
            (subject, body, Some(message)) => {
                let (split_subject, split_body) = split_message(message);
                (
                    subject.clone().or(Some(split_subject)),
                    body.clone().or(Some(split_body)),
                )
            }
            (subject, body, None) => (subject.clone(), body.clone()),
        }
    }
}

/// Split a combined message into subject and body
///
/// The subject is the text before the first sentence-ending period or line
/// break, whichever comes first. The body is the remainder, or the subject
/// itself when nothing remains.
pub fn split_message(message: &str) -> (String, String) {
    let message = message.trim();
    let chars: Vec<(usize, char)> = message.char_indices().collect();

    let cut = chars.iter().enumerate().find_map(|(i, &(offset, c))| {
        let next_is_space = chars.get(i + 1).map_or(true, |&(_, n)| n.is_whitespace());
        match c {
            '\n' | '\r' => Some(offset),
            '.' if next_is_space => Some(offset),
            _ => None,
        }
    });

    let (subject, rest) = match cut {
        Some(offset) => (&message[..offset], &message[offset + 1..]),
        None => (message, ""),
    };

    let subject = subject.trim().to_string();
    let rest = rest.trim();
    let body = if rest.is_empty() {
        subject.clone()
    } else {
        rest.to_string()
    };

    (subject, body)
}

/// Sending window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timing {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub name: String,
    pub timing: Timing,
    pub days: BTreeMap<String, bool>,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignSchedule {
    pub schedules: Vec<Schedule>,
}

/// One subject/body pairing of a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Variant {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceStep {
    #[serde(rename = "type")]
    pub step_type: String,
    /// Days to wait after this step before the next one
    pub delay: u32,
    pub variants: Vec<Variant>,
}

impl SequenceStep {
    fn email(delay: u32, subject: String, body: String) -> Self {
        Self {
            step_type: "email".to_string(),
            delay,
            variants: vec![Variant { subject, body }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sequence {
    pub steps: Vec<SequenceStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScheduleBlock {
    Built(CampaignSchedule),
    PassThrough(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SequenceBlock {
    Built(Vec<Sequence>),
    PassThrough(serde_json::Value),
}

/// Body of `POST /campaigns`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CampaignPayload {
    pub name: String,
    pub campaign_schedule: ScheduleBlock,
    pub sequences: SequenceBlock,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_gap: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_tracking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_tracking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_on_reply: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_on_auto_reply: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub email_list: Vec<String>,
}

impl CampaignPayload {
    /// Steps of the first generated sequence; `None` for pass-through payloads
    pub fn steps(&self) -> Option<&[SequenceStep]> {
        match &self.sequences {
            SequenceBlock::Built(sequences) => sequences.first().map(|s| s.steps.as_slice()),
            SequenceBlock::PassThrough(_) => None,
        }
    }

    /// The generated schedule; `None` for pass-through payloads
    pub fn schedule(&self) -> Option<&Schedule> {
        match &self.campaign_schedule {
            ScheduleBlock::Built(schedule) => schedule.schedules.first(),
            ScheduleBlock::PassThrough(_) => None,
        }
    }
}

/// Build the upstream campaign payload from a (defaulted) request
///
/// Pure and deterministic. Fails when `name` is missing, or when a simple
/// request ends up with neither subject nor body after normalization.
pub fn build_campaign_payload(
    request: &CampaignRequest,
    timezones: &TimezoneConfig,
) -> Result<CampaignPayload, BuildError> {
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or(BuildError::MissingName)?
        .to_string();

    if let (Some(schedule), Some(sequences)) = (&request.campaign_schedule, &request.sequences) {
        log::debug!("building pass-through campaign payload for '{name}'");
        return Ok(CampaignPayload {
            name,
            campaign_schedule: ScheduleBlock::PassThrough(schedule.clone()),
            sequences: SequenceBlock::PassThrough(sequences.clone()),
            daily_limit: request.daily_limit,
            email_gap: request.email_gap_minutes,
            text_only: request.text_only,
            open_tracking: request.open_tracking,
            link_tracking: request.link_tracking,
            stop_on_reply: request.stop_on_reply,
            stop_on_auto_reply: None,
            email_list: request.email_list.clone(),
        });
    }

    let (subject, body) = request.resolved_content();
    let subject = flatten_subject(subject.as_deref().unwrap_or_default());
    let body = convert_line_breaks_to_html(body.as_deref().unwrap_or_default().trim());

    if subject.is_empty() && body.is_empty() {
        return Err(BuildError::EmptySequence);
    }

    let timezone = timezones.resolve(request.timezone.as_deref()).timezone;
    let days = request.days.unwrap_or_default().to_days_map();

    let schedule = Schedule {
        name: SCHEDULE_NAME.to_string(),
        timing: Timing {
            from: request
                .timing_from
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMING_FROM.to_string()),
            to: request
                .timing_to
                .clone()
                .unwrap_or_else(|| DEFAULT_TIMING_TO.to_string()),
        },
        days,
        timezone,
    };

    let steps = build_steps(request, &subject, &body);

    Ok(CampaignPayload {
        name,
        campaign_schedule: ScheduleBlock::Built(CampaignSchedule {
            schedules: vec![schedule],
        }),
        sequences: SequenceBlock::Built(vec![Sequence { steps }]),
        daily_limit: Some(request.daily_limit.unwrap_or(DEFAULT_DAILY_LIMIT)),
        email_gap: request.email_gap_minutes,
        text_only: request.text_only,
        open_tracking: request.open_tracking,
        link_tracking: request.link_tracking,
        stop_on_reply: request.stop_on_reply,
        stop_on_auto_reply: request.stop_on_auto_reply,
        email_list: request.email_list.clone(),
    })
}

fn build_steps(request: &CampaignRequest, subject: &str, body: &str) -> Vec<SequenceStep> {
    let step_count = request.sequence_steps.unwrap_or(DEFAULT_SEQUENCE_STEPS).max(1);
    let delay_days = request.step_delay_days.unwrap_or(DEFAULT_STEP_DELAY_DAYS);

    if step_count == 1 {
        return vec![SequenceStep::email(0, subject.to_string(), body.to_string())];
    }

    let custom_body = |index: usize| {
        request
            .sequence_bodies
            .as_ref()
            .and_then(|bodies| bodies.get(index))
            .map(|text| convert_line_breaks_to_html(text.trim()))
    };
    let custom_subject = |index: usize| {
        request
            .sequence_subjects
            .as_ref()
            .and_then(|subjects| subjects.get(index))
            .map(|text| flatten_subject(text))
    };

    let mut steps = Vec::with_capacity(step_count as usize);
    steps.push(SequenceStep::email(
        delay_days,
        custom_subject(0).unwrap_or_else(|| subject.to_string()),
        custom_body(0).unwrap_or_else(|| body.to_string()),
    ));

    for index in 1..step_count as usize {
        let step_subject = custom_subject(index).unwrap_or_else(|| format!("Follow-up: {subject}"));
        let step_body = custom_body(index).unwrap_or_else(|| {
            format!("This is follow-up #{index}.{LINE_BREAK}{LINE_BREAK}{body}")
        });
        steps.push(SequenceStep::email(delay_days, step_subject, step_body));
    }

    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_defaults;

    fn simple_request() -> CampaignRequest {
        CampaignRequest {
            name: Some("Promo".to_string()),
            subject: Some("Hi {{firstName}}".to_string()),
            body: Some("Line1\nLine2".to_string()),
            email_list: vec!["a@x.com".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_end_to_end_simple_campaign() {
        let timezones = TimezoneConfig::default();
        let defaulted = apply_defaults(&simple_request(), &timezones);
        let payload = build_campaign_payload(&defaulted.request, &timezones).unwrap();

        let steps = payload.steps().unwrap();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].delay, 0);
        assert_eq!(steps[0].step_type, "email");
        assert_eq!(steps[0].variants[0].body, "<p>Line1<br />Line2</p>");
        assert_eq!(steps[0].variants[0].subject, "Hi {{firstName}}");

        let schedule = payload.schedule().unwrap();
        assert_eq!(schedule.timezone, "America/Chicago");
        assert_eq!(schedule.timing.from, "09:00");
        assert_eq!(schedule.timing.to, "17:00");
        assert_eq!(payload.daily_limit, Some(30));
        assert_eq!(payload.email_gap, Some(10));
        assert_eq!(payload.open_tracking, Some(false));
        assert_eq!(payload.stop_on_reply, Some(true));
        assert_eq!(payload.email_list, vec!["a@x.com".to_string()]);
    }

    #[test]
    fn test_wire_format_shape() {
        let timezones = TimezoneConfig::default();
        let payload = build_campaign_payload(&simple_request(), &timezones).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["name"], "Promo");
        assert_eq!(
            json["campaign_schedule"]["schedules"][0]["days"],
            serde_json::json!({
                "0": false, "1": true, "2": true, "3": true, "4": true, "5": true, "6": false
            })
        );
        assert_eq!(json["sequences"][0]["steps"][0]["type"], "email");
        assert_eq!(json["sequences"][0]["steps"][0]["delay"], 0);
        assert_eq!(json["daily_limit"], 30);
        // Unset optional fields are omitted rather than sent as null
        assert!(json.get("email_gap").is_none());
        assert!(json.get("open_tracking").is_none());
    }

    #[test]
    fn test_build_is_deterministic() {
        let timezones = TimezoneConfig::default();
        let mut request = simple_request();
        request.sequence_steps = Some(3);
        let first = serde_json::to_string(&build_campaign_payload(&request, &timezones).unwrap());
        let second = serde_json::to_string(&build_campaign_payload(&request, &timezones).unwrap());
        assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn test_missing_name_fails() {
        let mut request = simple_request();
        request.name = None;
        assert_eq!(
            build_campaign_payload(&request, &TimezoneConfig::default()),
            Err(BuildError::MissingName)
        );

        request.name = Some("   ".to_string());
        assert_eq!(
            build_campaign_payload(&request, &TimezoneConfig::default()),
            Err(BuildError::MissingName)
        );
    }

    #[test]
    fn test_empty_content_is_rejected() {
        let request = CampaignRequest {
            name: Some("Empty".to_string()),
            subject: Some("  ".to_string()),
            body: Some("\n\n".to_string()),
            ..Default::default()
        };
        assert_eq!(
            build_campaign_payload(&request, &TimezoneConfig::default()),
            Err(BuildError::EmptySequence)
        );
    }

    #[test]
    fn test_multi_step_delays_and_count() {
        let mut request = simple_request();
        request.sequence_steps = Some(4);
        request.step_delay_days = Some(5);

        let payload = build_campaign_payload(&request, &TimezoneConfig::default()).unwrap();
        let steps = payload.steps().unwrap();

        assert_eq!(steps.len(), 4);
        assert!(steps.iter().all(|step| step.delay == 5));
        assert_eq!(steps[1].variants[0].subject, "Follow-up: Hi {{firstName}}");
        assert_eq!(
            steps[2].variants[0].body,
            "This is follow-up #2.<br /><br /><p>Line1<br />Line2</p>"
        );
    }

    #[test]
    fn test_multi_step_uses_custom_content() {
        let mut request = simple_request();
        request.sequence_steps = Some(2);
        request.sequence_bodies = Some(vec![
            "First custom\n\nbody".to_string(),
            "Second body".to_string(),
        ]);
        request.sequence_subjects = Some(vec!["Custom one".to_string(), "Custom\ntwo".to_string()]);

        let payload = build_campaign_payload(&request, &TimezoneConfig::default()).unwrap();
        let steps = payload.steps().unwrap();

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].variants[0].subject, "Custom one");
        assert_eq!(steps[0].variants[0].body, "<p>First custom</p><p>body</p>");
        assert_eq!(steps[1].variants[0].subject, "Custom two");
        assert_eq!(steps[1].variants[0].body, "<p>Second body</p>");
        assert_eq!(steps[0].delay, 3);
    }

    #[test]
    fn test_defaulted_follow_ups_are_html_converted() {
        let timezones = TimezoneConfig::default();
        let mut request = simple_request();
        request.sequence_steps = Some(2);
        let defaulted = apply_defaults(&request, &timezones);

        let payload = build_campaign_payload(&defaulted.request, &timezones).unwrap();
        let steps = payload.steps().unwrap();
        assert_eq!(
            steps[1].variants[0].body,
            "<p>Follow-up #1:</p><p>Line1<br />Line2</p>"
        );
        assert_eq!(steps[1].variants[0].subject, "Follow-up: Hi {{firstName}}");
    }

    #[test]
    fn test_subject_line_breaks_collapse() {
        let mut request = simple_request();
        request.subject = Some(" Quick\nquestion \r\n".to_string());
        let payload = build_campaign_payload(&request, &TimezoneConfig::default()).unwrap();
        assert_eq!(payload.steps().unwrap()[0].variants[0].subject, "Quick question");
    }

    #[test]
    fn test_days_override_keeps_all_keys() {
        let mut request = simple_request();
        request.days = Some(DaySelection {
            saturday: Some(true),
            monday: Some(false),
            ..Default::default()
        });

        let payload = build_campaign_payload(&request, &TimezoneConfig::default()).unwrap();
        let days = &payload.schedule().unwrap().days;

        assert_eq!(days.len(), 7);
        assert!(!days["0"]);
        assert!(!days["1"]);
        assert!(days["2"]);
        assert!(days["6"]);
    }

    #[test]
    fn test_timezone_alias_is_resolved() {
        let mut request = simple_request();
        request.timezone = Some("Europe/London".to_string());
        let payload = build_campaign_payload(&request, &TimezoneConfig::default()).unwrap();
        assert_eq!(payload.schedule().unwrap().timezone, "Europe/Isle_of_Man");
    }

    #[test]
    fn test_complex_shape_passes_through() {
        let schedule = serde_json::json!({"schedules": [{"name": "Custom", "timezone": "Asia/Dubai"}]});
        let sequences = serde_json::json!([{"steps": [{"type": "email", "delay": 2, "variants": []}]}]);
        let request = CampaignRequest {
            name: Some("Complex".to_string()),
            campaign_schedule: Some(schedule.clone()),
            sequences: Some(sequences.clone()),
            daily_limit: Some(50),
            open_tracking: Some(true),
            ..Default::default()
        };

        let payload = build_campaign_payload(&request, &TimezoneConfig::default()).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["campaign_schedule"], schedule);
        assert_eq!(json["sequences"], sequences);
        assert_eq!(json["daily_limit"], 50);
        assert_eq!(json["open_tracking"], true);
        assert!(json.get("email_gap").is_none());
        assert!(payload.steps().is_none());
    }

    #[test]
    fn test_only_schedule_is_not_complex() {
        let mut request = simple_request();
        request.campaign_schedule = Some(serde_json::json!({"schedules": []}));
        assert!(!request.is_complex());

        let payload = build_campaign_payload(&request, &TimezoneConfig::default()).unwrap();
        assert!(payload.steps().is_some());
    }

    #[test]
    fn test_message_shorthand() {
        let request = CampaignRequest {
            name: Some("Shorthand".to_string()),
            message: Some("Quick question. Are you free to chat\nnext week?".to_string()),
            ..Default::default()
        };

        let payload = build_campaign_payload(&request, &TimezoneConfig::default()).unwrap();
        let variant = &payload.steps().unwrap()[0].variants[0];
        assert_eq!(variant.subject, "Quick question");
        assert_eq!(variant.body, "<p>Are you free to chat<br />next week?</p>");
    }

    #[test]
    fn test_message_keeps_explicit_subject() {
        let request = CampaignRequest {
            name: Some("Shorthand".to_string()),
            subject: Some("Explicit".to_string()),
            message: Some("Ignored subject. Body text".to_string()),
            ..Default::default()
        };
        let (subject, body) = request.resolved_content();
        assert_eq!(subject.as_deref(), Some("Explicit"));
        assert_eq!(body.as_deref(), Some("Body text"));
    }

    #[test]
    fn test_split_message() {
        assert_eq!(
            split_message("Hello there\nHow are you?"),
            ("Hello there".to_string(), "How are you?".to_string())
        );
        assert_eq!(
            split_message("Only a subject"),
            ("Only a subject".to_string(), "Only a subject".to_string())
        );
        // Periods inside tokens are not sentence ends
        assert_eq!(
            split_message("Version 2.0 is out. Try it"),
            ("Version 2.0 is out".to_string(), "Try it".to_string())
        );
        assert_eq!(
            split_message("Ends here."),
            ("Ends here".to_string(), "Ends here".to_string())
        );
    }

    #[test]
    fn test_days_map_default() {
        let days = DaySelection::default().to_days_map();
        let keys: Vec<&str> = days.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["0", "1", "2", "3", "4", "5", "6"]);
        assert_eq!(days, DaySelection::weekdays().to_days_map());
    }
}
