//! Timezone configuration and resolution
//!
//! The upstream scheduler accepts only a fixed set of timezone identifiers. Common IANA
//! names that are not in that set are mapped onto an accepted zone with the same offset.

/// Timezone used when neither the caller nor the configuration picks one.
pub const DEFAULT_TIMEZONE: &str = "America/Chicago";

/// Timezones the upstream campaign scheduler accepts.
pub const ACCEPTED_TIMEZONES: &[&str] = &[
    "Etc/GMT+12",
    "Etc/GMT+11",
    "Etc/GMT+10",
    "America/Anchorage",
    "America/Dawson",
    "America/Creston",
    "America/Chihuahua",
    "America/Boise",
    "America/Belize",
    "America/Chicago",
    "America/Bahia_Banderas",
    "America/Regina",
    "America/Bogota",
    "America/Detroit",
    "America/Indiana/Marengo",
    "America/Caracas",
    "America/Asuncion",
    "America/Glace_Bay",
    "America/Campo_Grande",
    "America/Anguilla",
    "America/Santiago",
    "America/St_Johns",
    "America/Sao_Paulo",
    "America/Argentina/La_Rioja",
    "America/Araguaina",
    "America/Godthab",
    "America/Montevideo",
    "America/Bahia",
    "America/Noronha",
    "America/Scoresbysund",
    "Atlantic/Cape_Verde",
    "Africa/Casablanca",
    "America/Danmarkshavn",
    "Europe/Isle_of_Man",
    "Atlantic/Canary",
    "Africa/Abidjan",
    "Arctic/Longyearbyen",
    "Europe/Belgrade",
    "Africa/Ceuta",
    "Europe/Sarajevo",
    "Africa/Algiers",
    "Africa/Windhoek",
    "Asia/Nicosia",
    "Asia/Beirut",
    "Africa/Cairo",
    "Asia/Damascus",
    "Europe/Bucharest",
    "Africa/Blantyre",
    "Europe/Helsinki",
    "Europe/Istanbul",
    "Asia/Jerusalem",
    "Africa/Tripoli",
    "Asia/Amman",
    "Asia/Baghdad",
    "Europe/Kaliningrad",
    "Asia/Aden",
    "Africa/Addis_Ababa",
    "Europe/Kirov",
    "Europe/Astrakhan",
    "Asia/Tehran",
    "Asia/Dubai",
    "Asia/Baku",
    "Indian/Mahe",
    "Asia/Tbilisi",
    "Asia/Yerevan",
    "Asia/Kabul",
    "Antarctica/Mawson",
    "Asia/Yekaterinburg",
    "Asia/Karachi",
    "Asia/Kolkata",
    "Asia/Colombo",
    "Asia/Kathmandu",
    "Antarctica/Vostok",
    "Asia/Dhaka",
    "Asia/Rangoon",
    "Antarctica/Davis",
    "Asia/Novokuznetsk",
    "Asia/Hong_Kong",
    "Asia/Krasnoyarsk",
    "Asia/Brunei",
    "Australia/Perth",
    "Asia/Taipei",
    "Asia/Choibalsan",
    "Asia/Irkutsk",
    "Asia/Dili",
    "Asia/Pyongyang",
    "Australia/Adelaide",
    "Australia/Darwin",
    "Australia/Brisbane",
    "Australia/Melbourne",
    "Antarctica/DumontDUrville",
    "Australia/Currie",
    "Asia/Chita",
    "Antarctica/Macquarie",
    "Asia/Sakhalin",
    "Pacific/Auckland",
    "Etc/GMT-12",
    "Pacific/Fiji",
    "Asia/Anadyr",
    "Asia/Kamchatka",
    "Etc/GMT-13",
    "Pacific/Apia",
];

/// Common IANA names mapped to an accepted zone with the same UTC offset.
const TIMEZONE_ALIASES: &[(&str, &str)] = &[
    ("UTC", "Africa/Abidjan"),
    ("Etc/UTC", "Africa/Abidjan"),
    ("GMT", "Africa/Abidjan"),
    ("Pacific/Honolulu", "Etc/GMT+10"),
    ("America/Los_Angeles", "America/Dawson"),
    ("America/Vancouver", "America/Dawson"),
    ("America/Denver", "America/Boise"),
    ("America/Phoenix", "America/Creston"),
    ("America/Mexico_City", "America/Bahia_Banderas"),
    ("America/New_York", "America/Detroit"),
    ("America/Toronto", "America/Detroit"),
    ("America/Halifax", "America/Glace_Bay"),
    ("America/Buenos_Aires", "America/Argentina/La_Rioja"),
    ("America/Argentina/Buenos_Aires", "America/Argentina/La_Rioja"),
    ("Europe/London", "Europe/Isle_of_Man"),
    ("Europe/Dublin", "Europe/Isle_of_Man"),
    ("Europe/Lisbon", "Atlantic/Canary"),
    ("Europe/Paris", "Europe/Belgrade"),
    ("Europe/Berlin", "Europe/Belgrade"),
    ("Europe/Madrid", "Africa/Ceuta"),
    ("Europe/Rome", "Europe/Belgrade"),
    ("Europe/Amsterdam", "Europe/Belgrade"),
    ("Europe/Brussels", "Europe/Belgrade"),
    ("Europe/Vienna", "Europe/Belgrade"),
    ("Europe/Zurich", "Europe/Belgrade"),
    ("Europe/Stockholm", "Europe/Belgrade"),
    ("Europe/Oslo", "Arctic/Longyearbyen"),
    ("Europe/Copenhagen", "Europe/Belgrade"),
    ("Europe/Prague", "Europe/Belgrade"),
    ("Europe/Warsaw", "Europe/Sarajevo"),
    ("Europe/Athens", "Europe/Bucharest"),
    ("Europe/Kiev", "Europe/Helsinki"),
    ("Europe/Kyiv", "Europe/Helsinki"),
    ("Europe/Moscow", "Europe/Kirov"),
    ("Asia/Calcutta", "Asia/Kolkata"),
    ("Asia/Bangkok", "Asia/Novokuznetsk"),
    ("Asia/Jakarta", "Asia/Novokuznetsk"),
    ("Asia/Ho_Chi_Minh", "Asia/Novokuznetsk"),
    ("Asia/Singapore", "Asia/Brunei"),
    ("Asia/Kuala_Lumpur", "Asia/Brunei"),
    ("Asia/Manila", "Asia/Brunei"),
    ("Asia/Shanghai", "Asia/Hong_Kong"),
    ("Asia/Tokyo", "Asia/Dili"),
    ("Asia/Seoul", "Asia/Pyongyang"),
    ("Australia/Sydney", "Australia/Melbourne"),
];

/// Default timezone plus the set the upstream scheduler accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimezoneConfig {
    pub default_timezone: String,
    pub accepted: Vec<String>,
}

impl Default for TimezoneConfig {
    fn default() -> Self {
        Self {
            default_timezone: DEFAULT_TIMEZONE.to_string(),
            accepted: ACCEPTED_TIMEZONES.iter().map(|tz| tz.to_string()).collect(),
        }
    }
}

/// Result of resolving a caller-supplied timezone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTimezone {
    pub timezone: String,
    /// Set when the requested zone had to be replaced
    pub warning: Option<String>,
}

impl TimezoneConfig {
    /// Build a config with a different default, keeping the standard accepted set
    pub fn with_default(default_timezone: impl Into<String>) -> Self {
        Self {
            default_timezone: default_timezone.into(),
            ..Self::default()
        }
    }

    pub fn is_accepted(&self, timezone: &str) -> bool {
        self.accepted.iter().any(|tz| tz == timezone)
    }

    /// Whether the zone is accepted as-is or has a known accepted equivalent
    pub fn is_known(&self, timezone: &str) -> bool {
        self.is_accepted(timezone) || self.alias_for(timezone).is_some()
    }

    fn alias_for(&self, timezone: &str) -> Option<&'static str> {
        TIMEZONE_ALIASES
            .iter()
            .find(|(alias, target)| *alias == timezone && self.is_accepted(target))
            .map(|(_, target)| *target)
    }

    /// Resolve a requested timezone to one the upstream accepts
    ///
    /// - `None` resolves to the configured default without a warning.
    /// - An accepted zone is returned unchanged.
    /// - A known alias maps to its accepted equivalent with a warning.
    /// - Anything else falls back to the configured default with a warning.
    pub fn resolve(&self, requested: Option<&str>) -> ResolvedTimezone {
        let Some(requested) = requested.map(str::trim).filter(|tz| !tz.is_empty()) else {
            return ResolvedTimezone {
                timezone: self.default_timezone.clone(),
                warning: None,
            };
        };

        if self.is_accepted(requested) {
            return ResolvedTimezone {
                timezone: requested.to_string(),
                warning: None,
            };
        }

        if let Some(target) = self.alias_for(requested) {
            return ResolvedTimezone {
                timezone: target.to_string(),
                warning: Some(format!(
                    "Timezone '{requested}' is not supported upstream; using equivalent '{target}'"
                )),
            };
        }

        ResolvedTimezone {
            timezone: self.default_timezone.clone(),
            warning: Some(format!(
                "Timezone '{}' is not supported upstream; using default '{}'",
                requested, self.default_timezone
            )),
        }
    }
}
