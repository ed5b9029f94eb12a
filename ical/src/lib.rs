// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Parse, validate, expand and serialize iCalendar (RFC 5545) data.
//!
//! The crate centers on the recurrence machinery: [`RecurrenceRule`]
//! parses and re-serializes RRULE values, [`RecurrenceRule::occurrences`]
//! lazily expands a rule from a seed date-time, and [`reconcile`] folds
//! RDATE/EXDATE sets into the generated sequence. Around that core sit
//! the content-line scanner ([`syntax`]), the generic property and
//! parameter model, component validation, and a folding serializer
//! ([`formatter`]).
//!
//! ```
//! use kalends_ical::{CalDateTime, RecurrenceRule};
//!
//! let rule: RecurrenceRule = "FREQ=MONTHLY;COUNT=3;BYDAY=-1FR".parse()?;
//! let seed: CalDateTime = "20240101T090000".parse()?;
//! let occurrences: Vec<String> = rule
//!     .occurrences(&seed, None)?
//!     .map(|dt| dt.to_string())
//!     .collect();
//! assert_eq!(
//!     occurrences,
//!     ["20240126T090000", "20240223T090000", "20240329T090000"]
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::match_bool,
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::similar_names,
    clippy::single_match_else
)]

pub mod component;
pub mod datetime;
pub mod formatter;
pub mod keyword;
pub mod parameter;
pub mod property;
pub mod recur;
pub mod syntax;

pub use crate::component::{
    Component, ComponentKind, ParseError, PropertyFilter, ValidationError,
};
pub use crate::datetime::{CalDateTime, DateTimeParseError, TimeKind, Weekday};
pub use crate::parameter::{Parameter, ParameterKind};
pub use crate::property::{Property, PropertyError, PropertyKind, PropertyValue, ValueKind};
pub use crate::recur::{
    Bound, DateSet, ExpandError, Frequency, Occurrences, RecurrenceRule, RecurrenceRuleBuilder,
    RuleError, WeekdayNum, Window, reconcile,
};
pub use crate::syntax::{ContentLine, RawParameter, SyntaxError};
