// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Property parameters (RFC 5545 Section 3.2) as one generic type.
//!
//! Instead of a type per parameter, a [`Parameter`] pairs a
//! [`ParameterKind`] with its values; the kind registry maps names both
//! ways and funnels unknown names into [`ParameterKind::Other`].

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::syntax::RawParameter;

/// Registry of parameter names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[expect(missing_docs)]
pub enum ParameterKind {
    #[strum(serialize = "ALTREP")]
    AltRep,
    #[strum(serialize = "CN")]
    CommonName,
    #[strum(serialize = "CUTYPE")]
    CuType,
    #[strum(serialize = "DELEGATED-FROM")]
    DelegatedFrom,
    #[strum(serialize = "DELEGATED-TO")]
    DelegatedTo,
    #[strum(serialize = "DIR")]
    Dir,
    #[strum(serialize = "ENCODING")]
    Encoding,
    #[strum(serialize = "FMTTYPE")]
    FmtType,
    #[strum(serialize = "FBTYPE")]
    FbType,
    #[strum(serialize = "LANGUAGE")]
    Language,
    #[strum(serialize = "MEMBER")]
    Member,
    #[strum(serialize = "PARTSTAT")]
    PartStat,
    #[strum(serialize = "RANGE")]
    Range,
    #[strum(serialize = "RELATED")]
    Related,
    #[strum(serialize = "RELTYPE")]
    RelType,
    #[strum(serialize = "ROLE")]
    Role,
    #[strum(serialize = "RSVP")]
    Rsvp,
    #[strum(serialize = "SENT-BY")]
    SentBy,
    #[strum(serialize = "TZID")]
    Tzid,
    #[strum(serialize = "VALUE")]
    Value,
    /// Any name outside the RFC 5545 registry, x-names included.
    #[strum(default, to_string = "{0}")]
    Other(String),
}

/// A property parameter: a kind plus one or more values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// The parameter name.
    pub kind: ParameterKind,
    /// The parameter values, unquoted.
    pub values: Vec<String>,
}

impl Parameter {
    /// A single-valued parameter.
    #[must_use]
    pub fn new(kind: ParameterKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            values: vec![value.into()],
        }
    }

    /// The first value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

impl From<RawParameter> for Parameter {
    fn from(raw: RawParameter) -> Self {
        // The default variant makes kind parsing infallible.
        let kind = ParameterKind::from_str(&raw.name).unwrap_or(ParameterKind::Other(raw.name));
        Self {
            kind,
            values: raw.values,
        }
    }
}

impl Display for Parameter {
    /// `NAME=value,...`, quoting values that contain `:`, `;` or `,`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.kind)?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            if value.contains([':', ';', ',']) {
                write!(f, "\"{value}\"")?;
            } else {
                write!(f, "{value}")?;
            }
        }
        Ok(())
    }
}
