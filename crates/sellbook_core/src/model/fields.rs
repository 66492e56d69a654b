//! Validated field value types.
//!
//! # Responsibility
//! - Reject malformed user or stored input at construction time.
//! - Keep serde decoding on the same validation path as `parse`.
//!
//! # Invariants
//! - A value of any type in this module always satisfies its constraint.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::model::record::RecordKind;

static WORDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+( [A-Za-z0-9]+)*$").expect("valid words regex"));
static CONTACT_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3,}$").expect("valid contact number regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9]([A-Za-z0-9+_.\-]*[A-Za-z0-9])?@([A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?\.)*[A-Za-z0-9][A-Za-z0-9\-]*[A-Za-z0-9]$",
    )
    .expect("valid email regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid tag regex"));
static MONEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$[0-9]+(\.[0-9]{1,2})?$").expect("valid money regex"));
static VENUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S.*$").expect("valid venue regex"));

/// Longest explicit schedule duration, one day.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Record identity must not be the nil UUID.
    NilId(RecordKind),
    /// A text field does not satisfy its constraint.
    InvalidField {
        field: &'static str,
        value: String,
        constraint: &'static str,
    },
    /// Explicit schedule duration is outside `1..=MAX_DURATION_MINUTES`.
    InvalidDuration(u32),
    /// Order status and schedule reference disagree.
    InconsistentSchedule { scheduled: bool, has_schedule: bool },
    /// A search was given no non-blank keyword.
    EmptyKeywords,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId(kind) => write!(f, "{kind} id must not be nil"),
            Self::InvalidField {
                field,
                value,
                constraint,
            } => write!(f, "invalid {field} `{value}`: {constraint}"),
            Self::InvalidDuration(minutes) => write!(
                f,
                "duration {minutes} must be between 1 and {MAX_DURATION_MINUTES} minutes"
            ),
            Self::InconsistentSchedule {
                scheduled,
                has_schedule,
            } => write!(
                f,
                "order status scheduled={scheduled} disagrees with schedule reference present={has_schedule}"
            ),
            Self::EmptyKeywords => f.write_str("at least one keyword is required"),
        }
    }
}

impl Error for ValidationError {}

macro_rules! validated_text {
    ($(#[$meta:meta])* $name:ident, $field:literal, $re:ident, $constraint:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub const CONSTRAINT: &'static str = $constraint;

            /// Validates and wraps `value`.
            pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                if $re.is_match(&value) {
                    Ok(Self(value))
                } else {
                    Err(ValidationError::InvalidField {
                        field: $field,
                        value,
                        constraint: $constraint,
                    })
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

validated_text!(
    /// Display name of a customer or phone model.
    Name,
    "name",
    WORDS_RE,
    "names must be alphanumeric words separated by single spaces"
);
validated_text!(
    /// Phone manufacturer.
    Brand,
    "brand",
    WORDS_RE,
    "brands must be alphanumeric words separated by single spaces"
);
validated_text!(Colour, "colour", WORDS_RE, "colours must be alphanumeric words separated by single spaces");
validated_text!(ContactNumber, "contact number", CONTACT_NUMBER_RE, "contact numbers must be at least 3 digits");
validated_text!(Email, "email", EMAIL_RE, "emails must be of the form local-part@domain");
validated_text!(Tag, "tag", TAG_RE, "tags must be alphanumeric");
validated_text!(
    /// Selling price of an order, e.g. `$1231.12`.
    Price,
    "price",
    MONEY_RE,
    "prices must start with '$', be non-negative and have at most 2 decimals"
);
validated_text!(
    /// Purchase cost of a phone.
    Cost,
    "cost",
    MONEY_RE,
    "costs must start with '$', be non-negative and have at most 2 decimals"
);
validated_text!(Venue, "venue", VENUE_RE, "venues must not be blank");

/// Storage capacity of a phone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Capacity {
    #[serde(rename = "8GB")]
    Size8Gb,
    #[serde(rename = "16GB")]
    Size16Gb,
    #[serde(rename = "32GB")]
    Size32Gb,
    #[serde(rename = "64GB")]
    Size64Gb,
    #[serde(rename = "128GB")]
    Size128Gb,
    #[serde(rename = "256GB")]
    Size256Gb,
    #[serde(rename = "512GB")]
    Size512Gb,
    #[serde(rename = "1TB")]
    Size1Tb,
}

impl Capacity {
    pub const CONSTRAINT: &'static str =
        "capacity must be one of 8GB, 16GB, 32GB, 64GB, 128GB, 256GB, 512GB, 1TB";

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Size8Gb => "8GB",
            Self::Size16Gb => "16GB",
            Self::Size32Gb => "32GB",
            Self::Size64Gb => "64GB",
            Self::Size128Gb => "128GB",
            Self::Size256Gb => "256GB",
            Self::Size512Gb => "512GB",
            Self::Size1Tb => "1TB",
        }
    }

    /// Parses a capacity label, case-insensitively.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "8GB" => Ok(Self::Size8Gb),
            "16GB" => Ok(Self::Size16Gb),
            "32GB" => Ok(Self::Size32Gb),
            "64GB" => Ok(Self::Size64Gb),
            "128GB" => Ok(Self::Size128Gb),
            "256GB" => Ok(Self::Size256Gb),
            "512GB" => Ok(Self::Size512Gb),
            "1TB" => Ok(Self::Size1Tb),
            _ => Err(ValidationError::InvalidField {
                field: "capacity",
                value: value.to_string(),
                constraint: Self::CONSTRAINT,
            }),
        }
    }
}

impl Display for Capacity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a list of raw tag strings.
pub fn parse_tags<I, S>(values: I) -> Result<Vec<Tag>, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Tag::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_reject_double_spaces_and_symbols() {
        assert!(Name::parse("iPhone 12 Pro").is_ok());
        assert!(Name::parse("iPhone  12").is_err());
        assert!(Name::parse(" Alice").is_err());
        assert!(Name::parse("Alice!").is_err());
        assert!(Name::parse("").is_err());
    }

    #[test]
    fn email_requires_domain_with_two_char_suffix() {
        assert!(Email::parse("alice@example.com").is_ok());
        assert!(Email::parse("a.b+c@mail-host.co").is_ok());
        assert!(Email::parse("alice@example.c").is_err());
        assert!(Email::parse("-alice@example.com").is_err());
        assert!(Email::parse("alice.example.com").is_err());
    }

    #[test]
    fn money_allows_at_most_two_decimals() {
        assert!(Price::parse("$500").is_ok());
        assert!(Price::parse("$1231.12").is_ok());
        assert!(Price::parse("$0").is_ok());
        assert!(Price::parse("500").is_err());
        assert!(Price::parse("$-5").is_err());
        assert!(Cost::parse("$1.234").is_err());
    }

    #[test]
    fn contact_number_needs_three_digits() {
        assert!(ContactNumber::parse("911").is_ok());
        assert!(ContactNumber::parse("91").is_err());
        assert!(ContactNumber::parse("9123 4567").is_err());
    }

    #[test]
    fn capacity_parses_case_insensitively() {
        assert_eq!(Capacity::parse("128gb").unwrap(), Capacity::Size128Gb);
        assert_eq!(Capacity::parse("1TB").unwrap(), Capacity::Size1Tb);
        assert!(Capacity::parse("3GB").is_err());
    }

    #[test]
    fn invalid_field_error_names_field_and_constraint() {
        let err = Tag::parse("not a tag").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("invalid tag `not a tag`"), "{message}");
        assert!(message.contains("alphanumeric"));
    }

    #[test]
    fn serde_decoding_runs_validation() {
        let ok: Venue = serde_json::from_str("\"CBD\"").unwrap();
        assert_eq!(ok.as_str(), "CBD");
        assert!(serde_json::from_str::<Venue>("\" \"").is_err());
        assert_eq!(
            serde_json::to_value(Capacity::Size64Gb).unwrap(),
            serde_json::json!("64GB")
        );
    }
}
