//! Tool argument validation
//!
//! [`validate`] checks raw JSON arguments against the declared shape of a tool
//! and produces a typed [`ToolArgs`] value. Every violated constraint is
//! collected, so a single [`ValidationError`] lists all of them with their
//! field paths instead of stopping at the first problem.

use std::ops::RangeInclusive;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};

use crate::campaign::{split_message, CampaignRequest, DaySelection, DAY_NAMES};
use crate::errors::{FieldIssue, ValidationError};
use crate::timezone::TimezoneConfig;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time regex"));
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid id regex"));
static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid tag regex"));

const MAX_NAME_LEN: usize = 255;
const MAX_SUBJECT_LEN: usize = 255;
const MAX_BODY_LEN: usize = 50_000;
const MAX_ID_LEN: usize = 128;
const MAX_SENDERS: usize = 100;
const MAX_SEQUENCE_STEPS: u32 = 10;

/// Escaped sequences that show up when a client double-encodes its JSON
const FORBIDDEN_BODY_SEQUENCES: &[(&str, &str)] = &[
    ("\\\"", "escaped quotes (\\\")"),
    ("\\t", "escaped tabs (\\t)"),
    ("\\r", "escaped carriage returns (\\r)"),
];

/// Every tool the server exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ListAccounts,
    CreateCampaign,
    ListCampaigns,
    GetCampaign,
    ActivateCampaign,
    PauseCampaign,
    GetCampaignAnalytics,
    ListLeads,
    CreateLead,
    ListEmails,
    VerifyEmail,
}

impl ToolName {
    pub const ALL: [ToolName; 11] = [
        ToolName::ListAccounts,
        ToolName::CreateCampaign,
        ToolName::ListCampaigns,
        ToolName::GetCampaign,
        ToolName::ActivateCampaign,
        ToolName::PauseCampaign,
        ToolName::GetCampaignAnalytics,
        ToolName::ListLeads,
        ToolName::CreateLead,
        ToolName::ListEmails,
        ToolName::VerifyEmail,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::ListAccounts => "list_accounts",
            ToolName::CreateCampaign => "create_campaign",
            ToolName::ListCampaigns => "list_campaigns",
            ToolName::GetCampaign => "get_campaign",
            ToolName::ActivateCampaign => "activate_campaign",
            ToolName::PauseCampaign => "pause_campaign",
            ToolName::GetCampaignAnalytics => "get_campaign_analytics",
            ToolName::ListLeads => "list_leads",
            ToolName::CreateLead => "create_lead",
            ToolName::ListEmails => "list_emails",
            ToolName::VerifyEmail => "verify_email",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Campaign lifecycle stage, as used by the `status` filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
    RunningSubsequences,
}

impl CampaignStatus {
    pub const NAMES: [&'static str; 5] =
        ["draft", "active", "paused", "completed", "running_subsequences"];

    /// Numeric status code used by the upstream API
    pub fn code(self) -> i32 {
        match self {
            CampaignStatus::Draft => 0,
            CampaignStatus::Active => 1,
            CampaignStatus::Paused => 2,
            CampaignStatus::Completed => 3,
            CampaignStatus::RunningSubsequences => 4,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(CampaignStatus::Draft),
            1 => Some(CampaignStatus::Active),
            2 => Some(CampaignStatus::Paused),
            3 => Some(CampaignStatus::Completed),
            4 => Some(CampaignStatus::RunningSubsequences),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
            CampaignStatus::RunningSubsequences => "running_subsequences",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .and_then(|index| Self::from_code(index as i64))
    }
}

/// Cursor pagination arguments shared by every list tool
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    pub limit: Option<u32>,
    pub starting_after: Option<String>,
    /// Follow cursors until the data runs out
    pub get_all: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListCampaignsArgs {
    pub page: ListArgs,
    pub search: Option<String>,
    pub status: Option<CampaignStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignIdArgs {
    pub campaign_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsArgs {
    pub campaign_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListLeadsArgs {
    pub page: ListArgs,
    pub campaign_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLeadArgs {
    pub email: String,
    pub campaign_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company_name: Option<String>,
    pub personalization: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEmailsArgs {
    pub page: ListArgs,
    pub campaign_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyEmailArgs {
    pub email: String,
}

/// Validated, typed arguments for one tool invocation
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArgs {
    ListAccounts(ListArgs),
    CreateCampaign(Box<CampaignRequest>),
    ListCampaigns(ListCampaignsArgs),
    GetCampaign(CampaignIdArgs),
    ActivateCampaign(CampaignIdArgs),
    PauseCampaign(CampaignIdArgs),
    GetCampaignAnalytics(AnalyticsArgs),
    ListLeads(ListLeadsArgs),
    CreateLead(CreateLeadArgs),
    ListEmails(ListEmailsArgs),
    VerifyEmail(VerifyEmailArgs),
}

/// Validate raw tool arguments and convert them into typed form
///
/// `raw` may be `null` (treated as no arguments) or an object; anything else is
/// rejected. Unknown keys are ignored.
pub fn validate(
    tool: &str,
    raw: &Value,
    timezones: &TimezoneConfig,
) -> Result<ToolArgs, ValidationError> {
    let Some(name) = ToolName::parse(tool) else {
        return Err(ValidationError {
            tool: tool.to_string(),
            issues: vec![FieldIssue::new("", format!("unknown tool '{tool}'"))],
        });
    };

    let empty = Map::new();
    let args = match raw {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(ValidationError {
                tool: tool.to_string(),
                issues: vec![FieldIssue::new("", "arguments must be a JSON object")],
            })
        }
    };

    let mut fields = Fields::new(args);

    let validated = match name {
        ToolName::ListAccounts => ToolArgs::ListAccounts(list_args(&mut fields)),
        ToolName::CreateCampaign => {
            ToolArgs::CreateCampaign(Box::new(campaign_request(&mut fields, timezones)))
        }
        ToolName::ListCampaigns => ToolArgs::ListCampaigns(ListCampaignsArgs {
            page: list_args(&mut fields),
            search: fields.string("search", 1..=MAX_NAME_LEN),
            status: fields.campaign_status("status"),
        }),
        ToolName::GetCampaign => ToolArgs::GetCampaign(campaign_id_args(&mut fields)),
        ToolName::ActivateCampaign => ToolArgs::ActivateCampaign(campaign_id_args(&mut fields)),
        ToolName::PauseCampaign => ToolArgs::PauseCampaign(campaign_id_args(&mut fields)),
        ToolName::GetCampaignAnalytics => {
            ToolArgs::GetCampaignAnalytics(analytics_args(&mut fields))
        }
        ToolName::ListLeads => ToolArgs::ListLeads(ListLeadsArgs {
            page: list_args(&mut fields),
            campaign_id: fields.id("campaign_id"),
            search: fields.string("search", 1..=MAX_NAME_LEN),
        }),
        ToolName::CreateLead => ToolArgs::CreateLead(CreateLeadArgs {
            email: fields.required_email("email").unwrap_or_default(),
            campaign_id: fields.id("campaign_id"),
            first_name: fields.string("first_name", 1..=MAX_NAME_LEN),
            last_name: fields.string("last_name", 1..=MAX_NAME_LEN),
            company_name: fields.string("company_name", 1..=MAX_NAME_LEN),
            personalization: fields.string("personalization", 1..=MAX_BODY_LEN),
        }),
        ToolName::ListEmails => ToolArgs::ListEmails(ListEmailsArgs {
            page: list_args(&mut fields),
            campaign_id: fields.id("campaign_id"),
        }),
        ToolName::VerifyEmail => ToolArgs::VerifyEmail(VerifyEmailArgs {
            email: fields.required_email("email").unwrap_or_default(),
        }),
    };

    fields.finish(name, validated)
}

fn list_args(fields: &mut Fields<'_>) -> ListArgs {
    ListArgs {
        limit: fields.integer("limit", 1..=100),
        starting_after: fields.string("starting_after", 1..=512),
        get_all: fields.boolean("get_all").unwrap_or(false),
    }
}

fn campaign_id_args(fields: &mut Fields<'_>) -> CampaignIdArgs {
    CampaignIdArgs {
        campaign_id: fields.required_id("campaign_id").unwrap_or_default(),
    }
}

fn analytics_args(fields: &mut Fields<'_>) -> AnalyticsArgs {
    let campaign_id = fields.id("campaign_id");
    let start_date = fields.date("start_date");
    let end_date = fields.date("end_date");

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            fields.issue("end_date", "must not be earlier than start_date");
        }
    }

    AnalyticsArgs {
        campaign_id,
        start_date,
        end_date,
    }
}

fn campaign_request(fields: &mut Fields<'_>, timezones: &TimezoneConfig) -> CampaignRequest {
    let campaign_schedule = match fields.value("campaign_schedule") {
        Some(value) if value.is_object() => Some(value.clone()),
        Some(_) => {
            fields.issue("campaign_schedule", "must be an object with a schedules array");
            None
        }
        None => None,
    };
    let sequences = match fields.value("sequences") {
        Some(value) if value.is_array() => Some(value.clone()),
        Some(_) => {
            fields.issue("sequences", "must be an array of sequences");
            None
        }
        None => None,
    };
    let complex = fields.present("campaign_schedule") && fields.present("sequences");

    let name = fields.required_string("name", 1..=MAX_NAME_LEN);

    let subject = fields.string("subject", 1..=MAX_SUBJECT_LEN);
    if let Some(subject) = &subject {
        fields.check("subject", check_subject(subject));
    }

    let body = fields.string("body", 1..=MAX_BODY_LEN);
    if let Some(body) = &body {
        for problem in body_problems(body) {
            fields.issue("body", problem);
        }
    }

    let message = fields.string("message", 1..=MAX_BODY_LEN);
    if let Some(message) = &message {
        let (split_subject, split_body) = split_message(message);
        if !fields.present("subject") {
            let subject_checks = [
                check_length(&split_subject, &(1..=MAX_SUBJECT_LEN)),
                check_subject(&split_subject),
            ];
            for problem in subject_checks.into_iter().filter_map(Result::err) {
                fields.issue("message", format!("subject taken from message {problem}"));
            }
        }
        if !fields.present("body") {
            for problem in body_problems(&split_body) {
                fields.issue("message", format!("body taken from message {problem}"));
            }
        }
    }

    if !complex && !fields.present("message") {
        if !fields.present("subject") {
            fields.issue("subject", "is required (or provide message)");
        }
        if !fields.present("body") {
            fields.issue("body", "is required (or provide message)");
        }
    }

    let email_list = fields.email_list("email_list");

    let timezone = fields.string("timezone", 1..=64);
    if let Some(timezone) = &timezone {
        if !timezones.is_known(timezone) {
            fields.issue(
                "timezone",
                format!(
                    "'{timezone}' is not a supported timezone; use an IANA name such as {}",
                    timezones.default_timezone
                ),
            );
        }
    }

    let timing_from = fields.string("timing_from", 1..=5);
    if let Some(time) = &timing_from {
        fields.check("timing_from", check_time(time));
    }
    let timing_to = fields.string("timing_to", 1..=5);
    if let Some(time) = &timing_to {
        fields.check("timing_to", check_time(time));
    }

    let days = fields.days("days");

    let daily_limit = fields.integer("daily_limit", 1..=1000);
    let email_gap_minutes = fields.integer("email_gap_minutes", 1..=1440);
    let text_only = fields.boolean("text_only");
    let open_tracking = fields.boolean("open_tracking");
    let link_tracking = fields.boolean("link_tracking");
    let stop_on_reply = fields.boolean("stop_on_reply");
    let stop_on_auto_reply = fields.boolean("stop_on_auto_reply");

    let sequence_steps = fields.integer("sequence_steps", 1..=MAX_SEQUENCE_STEPS);
    let step_delay_days = fields.integer("step_delay_days", 1..=30);

    let sequence_bodies = fields.string_list("sequence_bodies", 1..=MAX_SEQUENCE_STEPS as usize);
    if let Some(bodies) = &sequence_bodies {
        for (index, body) in bodies.iter().enumerate() {
            let path = format!("sequence_bodies[{index}]");
            fields.check(&path, check_length(body, &(1..=MAX_BODY_LEN)));
            for problem in body_problems(body) {
                fields.issue(&path, problem);
            }
        }
    }

    let sequence_subjects =
        fields.string_list("sequence_subjects", 1..=MAX_SEQUENCE_STEPS as usize);
    if let Some(subjects) = &sequence_subjects {
        for (index, subject) in subjects.iter().enumerate() {
            let path = format!("sequence_subjects[{index}]");
            fields.check(&path, check_length(subject, &(1..=MAX_SUBJECT_LEN)));
            fields.check(&path, check_subject(subject));
        }
    }

    if let Some(steps) = sequence_steps {
        let steps = steps as usize;
        for (key, list) in [
            ("sequence_bodies", &sequence_bodies),
            ("sequence_subjects", &sequence_subjects),
        ] {
            if let Some(list) = list {
                if list.len() < steps {
                    fields.issue(
                        key,
                        format!(
                            "must contain at least {steps} entries (one per sequence step); got {}",
                            list.len()
                        ),
                    );
                }
            }
        }
    }

    CampaignRequest {
        name,
        subject,
        body,
        message,
        email_list,
        timezone,
        timing_from,
        timing_to,
        days,
        daily_limit,
        email_gap_minutes,
        text_only,
        open_tracking,
        link_tracking,
        stop_on_reply,
        stop_on_auto_reply,
        sequence_steps,
        step_delay_days,
        sequence_bodies,
        sequence_subjects,
        campaign_schedule,
        sequences,
    }
}

/// Typed reads over an argument object that record every violation
struct Fields<'a> {
    args: &'a Map<String, Value>,
    issues: Vec<FieldIssue>,
}

impl<'a> Fields<'a> {
    fn new(args: &'a Map<String, Value>) -> Self {
        Self {
            args,
            issues: Vec::new(),
        }
    }

    fn issue(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.issues.push(FieldIssue::new(path, message));
    }

    fn check(&mut self, path: &str, result: Result<(), String>) {
        if let Err(message) = result {
            self.issue(path, message);
        }
    }

    /// `null` counts as absent
    fn value(&self, key: &str) -> Option<&'a Value> {
        self.args.get(key).filter(|value| !value.is_null())
    }

    fn present(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    fn string(&mut self, key: &str, length: RangeInclusive<usize>) -> Option<String> {
        let value = self.value(key)?;
        let Some(text) = value.as_str() else {
            self.issue(key, "must be a string");
            return None;
        };

        match check_length(text, &length) {
            Ok(()) => Some(text.to_string()),
            Err(message) => {
                self.issue(key, message);
                None
            }
        }
    }

    fn required_string(&mut self, key: &str, length: RangeInclusive<usize>) -> Option<String> {
        if !self.present(key) {
            self.issue(key, "is required");
            return None;
        }
        self.string(key, length)
    }

    /// Upstream resource id, restricted to characters that are inert in a URL path
    fn id(&mut self, key: &str) -> Option<String> {
        let id = self.string(key, 1..=MAX_ID_LEN)?;
        if ID_RE.is_match(&id) {
            Some(id)
        } else {
            self.issue(
                key,
                format!("must contain only letters, digits, '-' and '_'; got '{id}'"),
            );
            None
        }
    }

    fn required_id(&mut self, key: &str) -> Option<String> {
        if !self.present(key) {
            self.issue(key, "is required");
            return None;
        }
        self.id(key)
    }

    fn required_email(&mut self, key: &str) -> Option<String> {
        let email = self.required_string(key, 3..=MAX_NAME_LEN)?;
        match check_email(&email) {
            Ok(()) => Some(email.trim().to_string()),
            Err(message) => {
                self.issue(key, message);
                None
            }
        }
    }

    fn integer(&mut self, key: &str, range: RangeInclusive<u32>) -> Option<u32> {
        let value = self.value(key)?;
        let number = match value {
            Value::Number(number) => number.as_i64().or_else(|| {
                number
                    .as_f64()
                    .filter(|float| float.fract() == 0.0)
                    .map(|float| float as i64)
            }),
            _ => None,
        };

        let Some(number) = number else {
            self.issue(key, "must be a whole number");
            return None;
        };

        match u32::try_from(number).ok().filter(|n| range.contains(n)) {
            Some(number) => Some(number),
            None => {
                self.issue(
                    key,
                    format!(
                        "must be between {} and {}; got {number}",
                        range.start(),
                        range.end()
                    ),
                );
                None
            }
        }
    }

    fn boolean(&mut self, key: &str) -> Option<bool> {
        let value = self.value(key)?;
        match value.as_bool() {
            Some(flag) => Some(flag),
            None => {
                self.issue(key, "must be true or false");
                None
            }
        }
    }

    fn string_list(&mut self, key: &str, count: RangeInclusive<usize>) -> Option<Vec<String>> {
        let value = self.value(key)?;
        let Some(items) = value.as_array() else {
            self.issue(key, "must be an array of strings");
            return None;
        };

        if !count.contains(&items.len()) {
            self.issue(
                key,
                format!(
                    "must contain between {} and {} entries; got {}",
                    count.start(),
                    count.end(),
                    items.len()
                ),
            );
            return None;
        }

        let mut strings = Vec::with_capacity(items.len());
        let mut valid = true;
        for (index, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(text) => strings.push(text.to_string()),
                None => {
                    self.issue(format!("{key}[{index}]"), "must be a string");
                    valid = false;
                }
            }
        }

        valid.then_some(strings)
    }

    fn email_list(&mut self, key: &str) -> Vec<String> {
        if !self.present(key) {
            self.issue(
                key,
                "is required: provide at least one sender account email (see list_accounts)",
            );
            return Vec::new();
        }

        let Some(emails) = self.string_list(key, 1..=MAX_SENDERS) else {
            return Vec::new();
        };

        let mut valid = Vec::with_capacity(emails.len());
        for (index, email) in emails.iter().enumerate() {
            match check_email(email) {
                Ok(()) => valid.push(email.trim().to_string()),
                Err(message) => self.issue(format!("{key}[{index}]"), message),
            }
        }
        valid
    }

    fn date(&mut self, key: &str) -> Option<NaiveDate> {
        let text = self.string(key, 1..=10)?;
        match check_date(&text) {
            Ok(date) => Some(date),
            Err(message) => {
                self.issue(key, message);
                None
            }
        }
    }

    fn campaign_status(&mut self, key: &str) -> Option<CampaignStatus> {
        let text = self.string(key, 1..=32)?;
        let status = CampaignStatus::parse(&text);
        if status.is_none() {
            self.issue(
                key,
                format!(
                    "must be one of {}; got '{text}'",
                    CampaignStatus::NAMES.join(", ")
                ),
            );
        }
        status
    }

    fn days(&mut self, key: &str) -> Option<DaySelection> {
        let value = self.value(key)?;
        let Some(map) = value.as_object() else {
            self.issue(
                key,
                "must be an object mapping day names to booleans (e.g. {\"monday\": true})",
            );
            return None;
        };

        let mut selection = DaySelection::default();
        let mut valid = true;

        for (day, flag) in map {
            let lowered = day.to_ascii_lowercase();
            let index = DAY_NAMES
                .iter()
                .position(|name| *name == lowered)
                .or_else(|| day.parse::<usize>().ok().filter(|index| *index < 7));

            let Some(index) = index else {
                self.issue(
                    format!("{key}.{day}"),
                    "is not a day of the week (use sunday through saturday)",
                );
                valid = false;
                continue;
            };

            let Some(flag) = flag.as_bool() else {
                self.issue(format!("{key}.{day}"), "must be true or false");
                valid = false;
                continue;
            };

            if let Some(slot) = selection.slot_mut(index) {
                *slot = Some(flag);
            }
        }

        if valid && !selection.to_days_map().values().any(|enabled| *enabled) {
            self.issue(key, "must enable at least one sending day");
            valid = false;
        }

        valid.then_some(selection)
    }

    fn finish<T>(self, tool: ToolName, value: T) -> Result<T, ValidationError> {
        if self.issues.is_empty() {
            Ok(value)
        } else {
            Err(ValidationError {
                tool: tool.as_str().to_string(),
                issues: self.issues,
            })
        }
    }
}

fn check_length(text: &str, length: &RangeInclusive<usize>) -> Result<(), String> {
    let count = text.chars().count();
    if count < *length.start() {
        if *length.start() <= 1 {
            Err("must not be empty".to_string())
        } else {
            Err(format!("must be at least {} characters", length.start()))
        }
    } else if count > *length.end() {
        Err(format!(
            "must be at most {} characters; got {count}",
            length.end()
        ))
    } else {
        Ok(())
    }
}

/// Loose address check: something@domain.tld with no whitespace
pub fn check_email(text: &str) -> Result<(), String> {
    if EMAIL_RE.is_match(text.trim()) {
        Ok(())
    } else {
        Err(format!("must be a valid email address; got '{text}'"))
    }
}

fn check_time(text: &str) -> Result<(), String> {
    if TIME_RE.is_match(text) {
        Ok(())
    } else {
        Err(format!(
            "must be a time in 24-hour HH:MM format (e.g. 09:00); got '{text}'"
        ))
    }
}

fn check_date(text: &str) -> Result<NaiveDate, String> {
    if !DATE_RE.is_match(text) {
        return Err(format!("must be a date in YYYY-MM-DD format; got '{text}'"));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| format!("'{text}' is not a valid calendar date"))
}

fn check_subject(text: &str) -> Result<(), String> {
    if text.contains('\n') || text.contains('\r') {
        Err("must be a single line; remove line breaks from the subject".to_string())
    } else {
        Ok(())
    }
}

/// Everything wrong with an email body, one message per problem
fn body_problems(text: &str) -> Vec<String> {
    let mut problems: Vec<String> = FORBIDDEN_BODY_SEQUENCES
        .iter()
        .filter(|(sequence, _)| text.contains(sequence))
        .map(|(_, label)| {
            format!("must not contain {label}; send plain text with real line breaks instead")
        })
        .collect();

    for tag in HTML_TAG_RE.find_iter(text).map(|m| m.as_str()) {
        if !is_allowed_tag(tag) {
            problems.push(format!(
                "contains unsupported HTML tag {tag}; only <p>, <br> and <br/> are allowed"
            ));
        }
    }

    problems
}

fn is_allowed_tag(tag: &str) -> bool {
    let normalized: String = tag
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    matches!(normalized.as_str(), "<p>" | "</p>" | "<br>" | "<br/>")
}
