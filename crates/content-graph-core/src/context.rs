use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::DEFAULT_LANGUAGE;

pub const HEADER_LANGUAGE: &str = "x-language";
pub const HEADER_CUSTOMER_TYPES: &str = "x-sl-dimension-customer-types";
pub const HEADER_DEVICE_TYPES: &str = "x-sl-dimension-device-types";
pub const HEADER_REGIONS: &str = "x-sl-dimension-regions";
pub const HEADER_TIME_TRAVEL: &str = "x-time-travel";

/// Entitlement axis.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum DimensionAxis {
    CustomerTypes,
    DeviceTypes,
    Regions,
}

impl DimensionAxis {
    pub const ALL: [Self; 3] = [Self::CustomerTypes, Self::DeviceTypes, Self::Regions];

    /// Field on availability records and audience segments that lists this axis.
    #[must_use]
    pub fn availability_field(self) -> &'static str {
        match self {
            Self::CustomerTypes => "customers",
            Self::DeviceTypes => "devices",
            Self::Regions => "regions",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CustomerTypes => "customer_types",
            Self::DeviceTypes => "device_types",
            Self::Regions => "regions",
        }
    }
}

/// Dimension values requested by the caller, already lower-cased and trimmed.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct RequestedDimensions {
    pub customer_types: Vec<String>,
    pub device_types: Vec<String>,
    pub regions: Vec<String>,
}

impl RequestedDimensions {
    #[must_use]
    pub fn new(customer_types: &str, device_types: &str, regions: &str) -> Self {
        Self {
            customer_types: parse_dimension_list(customer_types),
            device_types: parse_dimension_list(device_types),
            regions: parse_dimension_list(regions),
        }
    }

    #[must_use]
    pub fn axis(&self, axis: DimensionAxis) -> &[String] {
        match axis {
            DimensionAxis::CustomerTypes => &self.customer_types,
            DimensionAxis::DeviceTypes => &self.device_types,
            DimensionAxis::Regions => &self.regions,
        }
    }

    /// True when at least one axis restricts access. Filtering is skipped otherwise.
    #[must_use]
    pub fn any_requested(&self) -> bool {
        DimensionAxis::ALL.iter().any(|axis| !self.axis(*axis).is_empty())
    }
}

/// Split a comma list into lower-cased, trimmed, non-empty values.
#[must_use]
pub fn parse_dimension_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
#[must_use]
pub fn parse_instant(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if let Ok(instant) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(instant);
    }
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc())
}

/// Immutable per-request bundle threaded through every resolution call.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RequestContext {
    pub language_code: String,
    pub dimensions: RequestedDimensions,
    pub time_travel: Option<OffsetDateTime>,
    /// Reference instant for availability windows: `time_travel`, else the clock at build time.
    pub as_of: OffsetDateTime,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            language_code: DEFAULT_LANGUAGE.to_string(),
            dimensions: RequestedDimensions::default(),
            time_travel: None,
            as_of: OffsetDateTime::now_utc(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, language_code: &str) -> Self {
        let trimmed = language_code.trim();
        self.language_code = if trimmed.is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            trimmed.to_lowercase()
        };
        self
    }

    #[must_use]
    pub fn with_dimensions(mut self, dimensions: RequestedDimensions) -> Self {
        self.dimensions = dimensions;
        self
    }

    #[must_use]
    pub fn with_time_travel(mut self, time_travel: Option<OffsetDateTime>) -> Self {
        self.time_travel = time_travel;
        if let Some(instant) = time_travel {
            self.as_of = instant;
        }
        self
    }

    /// Pin the reference instant without marking the request as time-travelling.
    #[must_use]
    pub fn at(mut self, as_of: OffsetDateTime) -> Self {
        self.as_of = as_of;
        self
    }

    /// Build a context from header-like name/value pairs. Names compare case-insensitively;
    /// unknown headers are ignored and an unparseable time-travel value is dropped.
    pub fn from_headers<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut context = Self::new();
        for (name, value) in headers {
            match name.to_ascii_lowercase().as_str() {
                HEADER_LANGUAGE => context = context.with_language(value),
                HEADER_CUSTOMER_TYPES => {
                    context.dimensions.customer_types = parse_dimension_list(value);
                }
                HEADER_DEVICE_TYPES => {
                    context.dimensions.device_types = parse_dimension_list(value);
                }
                HEADER_REGIONS => {
                    context.dimensions.regions = parse_dimension_list(value);
                }
                HEADER_TIME_TRAVEL => {
                    let parsed = parse_instant(value);
                    if parsed.is_none() {
                        tracing::debug!(value, "ignoring unparseable time-travel header");
                    }
                    context = context.with_time_travel(parsed);
                }
                _ => {}
            }
        }
        context
    }

    #[must_use]
    pub fn is_default_language(&self) -> bool {
        self.language_code.eq_ignore_ascii_case(DEFAULT_LANGUAGE)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn dimension_lists_are_lowercased_trimmed_and_split() {
        assert_eq!(parse_dimension_list(" Premium , STANDARD,,"), vec!["premium", "standard"]);
        assert!(parse_dimension_list("").is_empty());
        assert!(parse_dimension_list(" , ").is_empty());
    }

    #[test]
    fn instants_accept_rfc3339_and_bare_dates() {
        assert_eq!(parse_instant("2025-03-01T10:30:00Z"), Some(datetime!(2025-03-01 10:30 UTC)));
        assert_eq!(parse_instant("2025-03-01"), Some(datetime!(2025-03-01 0:00 UTC)));
        assert_eq!(parse_instant("next tuesday"), None);
    }

    #[test]
    fn headers_build_context_case_insensitively() {
        let context = RequestContext::from_headers([
            ("X-Language", "PT-PT"),
            ("x-sl-dimension-customer-types", "Premium"),
            ("X-SL-Dimension-Regions", "europe, uk"),
            ("x-time-travel", "2030-01-01T00:00:00Z"),
            ("x-unrelated", "ignored"),
        ]);

        assert_eq!(context.language_code, "pt-pt");
        assert_eq!(context.dimensions.customer_types, vec!["premium"]);
        assert!(context.dimensions.device_types.is_empty());
        assert_eq!(context.dimensions.regions, vec!["europe", "uk"]);
        assert_eq!(context.time_travel, Some(datetime!(2030-01-01 0:00 UTC)));
        assert_eq!(context.as_of, datetime!(2030-01-01 0:00 UTC));
        assert!(context.dimensions.any_requested());
    }

    #[test]
    fn invalid_time_travel_is_dropped() {
        let context = RequestContext::from_headers([("x-time-travel", "not a date")]);
        assert_eq!(context.time_travel, None);
    }

    #[test]
    fn default_context_uses_default_language_without_dimensions() {
        let context = RequestContext::new();
        assert!(context.is_default_language());
        assert!(!context.dimensions.any_requested());
        assert!(RequestContext::new().with_language("EN-GB").is_default_language());
        assert!(RequestContext::new().with_language("  ").is_default_language());
    }
}
