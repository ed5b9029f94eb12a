// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Properties (RFC 5545 Section 3.7/3.8) as one generic type.
//!
//! A [`Property`] pairs a [`PropertyKind`] with parameters and a typed
//! value. The kind registry drives value parsing: each kind names the
//! value shape it carries, and the factory dispatches on that table,
//! honoring `VALUE=DATE` and `TZID` parameters. Unknown names keep their
//! raw text.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::datetime::CalDateTime;
use crate::parameter::{Parameter, ParameterKind};
use crate::recur::{RecurrenceRule, RuleError};
use crate::syntax::{ContentLine, escape_text, unescape_text};

/// Registry of property names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[expect(missing_docs)]
pub enum PropertyKind {
    #[strum(serialize = "CALSCALE")]
    CalScale,
    #[strum(serialize = "METHOD")]
    Method,
    #[strum(serialize = "PRODID")]
    ProdId,
    #[strum(serialize = "VERSION")]
    Version,
    #[strum(serialize = "ATTACH")]
    Attach,
    #[strum(serialize = "CATEGORIES")]
    Categories,
    #[strum(serialize = "CLASS")]
    Class,
    #[strum(serialize = "COMMENT")]
    Comment,
    #[strum(serialize = "DESCRIPTION")]
    Description,
    #[strum(serialize = "GEO")]
    Geo,
    #[strum(serialize = "LOCATION")]
    Location,
    #[strum(serialize = "PERCENT-COMPLETE")]
    PercentComplete,
    #[strum(serialize = "PRIORITY")]
    Priority,
    #[strum(serialize = "RESOURCES")]
    Resources,
    #[strum(serialize = "STATUS")]
    Status,
    #[strum(serialize = "SUMMARY")]
    Summary,
    #[strum(serialize = "COMPLETED")]
    Completed,
    #[strum(serialize = "DTEND")]
    DtEnd,
    #[strum(serialize = "DUE")]
    Due,
    #[strum(serialize = "DTSTART")]
    DtStart,
    #[strum(serialize = "DURATION")]
    Duration,
    #[strum(serialize = "TRANSP")]
    Transp,
    #[strum(serialize = "TZID")]
    TzId,
    #[strum(serialize = "TZNAME")]
    TzName,
    #[strum(serialize = "TZOFFSETFROM")]
    TzOffsetFrom,
    #[strum(serialize = "TZOFFSETTO")]
    TzOffsetTo,
    #[strum(serialize = "ATTENDEE")]
    Attendee,
    #[strum(serialize = "CONTACT")]
    Contact,
    #[strum(serialize = "ORGANIZER")]
    Organizer,
    #[strum(serialize = "RECURRENCE-ID")]
    RecurrenceId,
    #[strum(serialize = "RELATED-TO")]
    RelatedTo,
    #[strum(serialize = "URL")]
    Url,
    #[strum(serialize = "UID")]
    Uid,
    #[strum(serialize = "EXDATE")]
    ExDate,
    #[strum(serialize = "RDATE")]
    RDate,
    #[strum(serialize = "RRULE")]
    RRule,
    #[strum(serialize = "CREATED")]
    Created,
    #[strum(serialize = "DTSTAMP")]
    DtStamp,
    #[strum(serialize = "LAST-MODIFIED")]
    LastModified,
    #[strum(serialize = "SEQUENCE")]
    Sequence,
    /// Any name outside the RFC 5545 registry, x-names included.
    #[strum(default, to_string = "{0}")]
    Other(String),
}

/// The value shape a property carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Free text, escaped on the wire.
    Text,
    /// One or more DATE or DATE-TIME values.
    DateTime,
    /// A recurrence rule.
    Recur,
    /// An integer.
    Integer,
    /// Text passed through without escaping (URIs, offsets, etc.).
    Raw,
}

impl PropertyKind {
    /// The value shape this property parses into.
    #[must_use]
    pub fn value_kind(&self) -> ValueKind {
        match self {
            PropertyKind::DtStart
            | PropertyKind::DtEnd
            | PropertyKind::Due
            | PropertyKind::Completed
            | PropertyKind::Created
            | PropertyKind::DtStamp
            | PropertyKind::LastModified
            | PropertyKind::RecurrenceId
            | PropertyKind::ExDate
            | PropertyKind::RDate => ValueKind::DateTime,
            PropertyKind::RRule => ValueKind::Recur,
            PropertyKind::Sequence | PropertyKind::Priority | PropertyKind::PercentComplete => {
                ValueKind::Integer
            }
            PropertyKind::Attach
            | PropertyKind::Attendee
            | PropertyKind::Organizer
            | PropertyKind::Url
            | PropertyKind::Geo
            | PropertyKind::Duration
            | PropertyKind::TzOffsetFrom
            | PropertyKind::TzOffsetTo => ValueKind::Raw,
            _ => ValueKind::Text,
        }
    }
}

/// A parsed property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// Unescaped text.
    Text(String),
    /// DATE or DATE-TIME values; singular for DTSTART-like properties,
    /// possibly plural for RDATE/EXDATE.
    DateTimes(Vec<CalDateTime>),
    /// A recurrence rule.
    Recur(RecurrenceRule),
    /// An integer.
    Integer(i64),
    /// Raw value text, emitted verbatim.
    Raw(String),
}

/// Errors rejecting a property value.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// A DATE or DATE-TIME value did not parse.
    #[error("property {property}: invalid date-time `{value}`")]
    InvalidDateTime {
        /// The property name.
        property: String,
        /// The rejected literal.
        value: String,
    },

    /// An RRULE value did not parse.
    #[error("property {property}: {source}")]
    InvalidRule {
        /// The property name.
        property: String,
        /// The underlying rule error.
        #[source]
        source: RuleError,
    },

    /// An integer value did not parse.
    #[error("property {property}: invalid integer `{value}`")]
    InvalidInteger {
        /// The property name.
        property: String,
        /// The rejected literal.
        value: String,
    },
}

/// A property: kind, parameters and typed value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// The property name.
    pub kind: PropertyKind,
    /// The property parameters.
    pub parameters: Vec<Parameter>,
    /// The typed value.
    pub value: PropertyValue,
}

impl Property {
    /// A parameterless property.
    #[must_use]
    pub fn new(kind: PropertyKind, value: PropertyValue) -> Self {
        Self {
            kind,
            parameters: Vec::new(),
            value,
        }
    }

    /// Build a typed property from a scanned content line.
    ///
    /// The value is parsed according to the kind's [`ValueKind`].
    /// Date-shaped properties accept both DATE and DATE-TIME literals
    /// (so `VALUE=DATE` values come out date-only), and a `TZID`
    /// parameter anchors floating times to that zone identity.
    ///
    /// # Errors
    ///
    /// Returns a [`PropertyError`] when the value does not parse; the
    /// property is not partially constructed.
    pub fn from_content_line(line: ContentLine) -> Result<Self, PropertyError> {
        let kind = PropertyKind::from_str(&line.name).unwrap_or(PropertyKind::Other(line.name));
        let parameters: Vec<Parameter> = line.parameters.into_iter().map(Parameter::from).collect();

        let value = match kind.value_kind() {
            ValueKind::Text => PropertyValue::Text(unescape_text(&line.value)),
            ValueKind::Raw => PropertyValue::Raw(line.value),
            ValueKind::Integer => match lexical::parse::<i64, _>(&line.value) {
                Ok(value) => PropertyValue::Integer(value),
                Err(_) => {
                    return Err(PropertyError::InvalidInteger {
                        property: kind.to_string(),
                        value: line.value,
                    });
                }
            },
            ValueKind::Recur => match line.value.parse::<RecurrenceRule>() {
                Ok(rule) => PropertyValue::Recur(rule),
                Err(source) => {
                    return Err(PropertyError::InvalidRule {
                        property: kind.to_string(),
                        source,
                    });
                }
            },
            ValueKind::DateTime => {
                let tzid = parameters
                    .iter()
                    .find(|p| p.kind == ParameterKind::Tzid)
                    .and_then(Parameter::value)
                    .map(str::to_owned);
                let mut values = Vec::new();
                for literal in line.value.split(',') {
                    let parsed =
                        literal
                            .parse::<CalDateTime>()
                            .map_err(|_| PropertyError::InvalidDateTime {
                                property: kind.to_string(),
                                value: literal.to_owned(),
                            })?;
                    let parsed = match &tzid {
                        Some(tzid) => parsed.with_zone(tzid),
                        None => parsed,
                    };
                    values.push(parsed);
                }
                PropertyValue::DateTimes(values)
            }
        };

        Ok(Self {
            kind,
            parameters,
            value,
        })
    }

    /// The parameter of the given kind, if present.
    #[must_use]
    pub fn parameter(&self, kind: &ParameterKind) -> Option<&Parameter> {
        self.parameters.iter().find(|p| &p.kind == kind)
    }

    /// The text value, for text-shaped properties.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            PropertyValue::Text(text) | PropertyValue::Raw(text) => Some(text),
            _ => None,
        }
    }

    /// The date-time values, for date-shaped properties.
    #[must_use]
    pub fn date_times(&self) -> Option<&[CalDateTime]> {
        match &self.value {
            PropertyValue::DateTimes(values) => Some(values),
            _ => None,
        }
    }

    /// The recurrence rule, for RRULE properties.
    #[must_use]
    pub fn rule(&self) -> Option<&RecurrenceRule> {
        match &self.value {
            PropertyValue::Recur(rule) => Some(rule),
            _ => None,
        }
    }
}

impl Display for Property {
    /// The unfolded content-line form `NAME;PARAM=..:value`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        for parameter in &self.parameters {
            write!(f, ";{parameter}")?;
        }
        write!(f, ":")?;
        match &self.value {
            PropertyValue::Text(text) => write!(f, "{}", escape_text(text)),
            PropertyValue::Raw(raw) => write!(f, "{raw}"),
            PropertyValue::Integer(value) => write!(f, "{value}"),
            PropertyValue::Recur(rule) => write!(f, "{rule}"),
            PropertyValue::DateTimes(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{value}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::TimeKind;
    use crate::syntax::scan;

    fn property(src: &str) -> Result<Property, PropertyError> {
        let mut lines = scan(src).unwrap();
        Property::from_content_line(lines.remove(0))
    }

    #[test]
    fn parses_text_with_escapes() {
        let p = property("SUMMARY:Lunch\\, then a walk\r\n").unwrap();
        assert_eq!(p.kind, PropertyKind::Summary);
        assert_eq!(p.text(), Some("Lunch, then a walk"));
    }

    #[test]
    fn parses_date_time_with_tzid() {
        let p = property("DTSTART;TZID=America/New_York:20250110T140000\r\n").unwrap();
        let values = p.date_times().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(
            values[0].kind(),
            &TimeKind::Zoned("America/New_York".to_owned())
        );
    }

    #[test]
    fn parses_date_only_exdate_list() {
        let p = property("EXDATE;VALUE=DATE:20250101,20250102\r\n").unwrap();
        let values = p.date_times().unwrap();
        assert_eq!(values.len(), 2);
        assert!(values.iter().all(CalDateTime::is_date_only));
    }

    #[test]
    fn parses_rrule_value() {
        let p = property("RRULE:FREQ=MONTHLY;BYDAY=-1FR\r\n").unwrap();
        let rule = p.rule().unwrap();
        assert_eq!(rule.by_day().len(), 1);
    }

    #[test]
    fn parses_integer_value() {
        let p = property("SEQUENCE:3\r\n").unwrap();
        assert_eq!(p.value, PropertyValue::Integer(3));
    }

    #[test]
    fn unknown_names_keep_raw_text() {
        let p = property("X-WR-CALNAME:Team Calendar\r\n").unwrap();
        assert_eq!(p.kind, PropertyKind::Other("X-WR-CALNAME".to_owned()));
        assert_eq!(p.text(), Some("Team Calendar"));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            property("DTSTART:20251301T000000\r\n"),
            Err(PropertyError::InvalidDateTime { .. })
        ));
        assert!(matches!(
            property("RRULE:FREQ=NEVER\r\n"),
            Err(PropertyError::InvalidRule { .. })
        ));
        assert!(matches!(
            property("SEQUENCE:three\r\n"),
            Err(PropertyError::InvalidInteger { .. })
        ));
    }

    #[test]
    fn displays_content_line_form() {
        let cases = [
            "SUMMARY:Lunch\\, then a walk",
            "DTSTART;TZID=America/New_York:20250110T140000",
            "RRULE:FREQ=MONTHLY;BYDAY=-1FR",
            "EXDATE:20250101,20250102",
        ];
        for src in cases {
            let p = property(&format!("{src}\r\n")).unwrap();
            assert_eq!(p.to_string(), src);
        }
    }
}
