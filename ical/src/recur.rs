// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rules (RFC 5545 Section 3.3.10): the parsed rule model,
//! the occurrence-expansion iterator, and RDATE/EXDATE reconciliation.

mod dateset;
mod expand;
mod rule;

pub use dateset::{DateSet, reconcile};
pub use expand::{ExpandError, Occurrences, Window};
pub use rule::{Bound, Frequency, RecurrenceRule, RecurrenceRuleBuilder, RuleError, WeekdayNum};
