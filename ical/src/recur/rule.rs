// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Recurrence rule model: the parsed, immutable form of an RRULE value.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::datetime::{CalDateTime, Weekday};
use crate::keyword::{
    KW_RRULE_BYDAY, KW_RRULE_BYHOUR, KW_RRULE_BYMINUTE, KW_RRULE_BYMONTH, KW_RRULE_BYMONTHDAY,
    KW_RRULE_BYSECOND, KW_RRULE_BYSETPOS, KW_RRULE_BYWEEKNO, KW_RRULE_BYYEARDAY, KW_RRULE_COUNT,
    KW_RRULE_FREQ, KW_RRULE_INTERVAL, KW_RRULE_UNTIL, KW_RRULE_WKST,
};

/// Base period of a recurrence rule.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "UPPERCASE")]
#[expect(missing_docs)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// How a rule's occurrence sequence ends.
///
/// `Count` and `Until` are mutually exclusive; `Unbounded` rules require
/// the caller to supply an iteration window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    /// No COUNT or UNTIL part.
    Unbounded,
    /// Stop after this many occurrences.
    Count(u32),
    /// Stop after this date-time, inclusive.
    Until(CalDateTime),
}

/// A BYDAY entry: a weekday with an optional signed ordinal.
///
/// `2MO` is the second Monday of the period, `-1FR` the last Friday.
/// Without an ordinal every matching weekday in the period is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekdayNum {
    /// Signed occurrence within the period; `None` selects every one.
    pub ordinal: Option<i8>,
    /// The day of the week.
    pub weekday: Weekday,
}

impl Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ordinal) = self.ordinal {
            write!(f, "{ordinal}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

/// Errors rejecting an RRULE value at construction.
///
/// A failed parse or build never yields a partially constructed rule.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The mandatory FREQ part is absent.
    #[error("recurrence rule is missing the FREQ part")]
    MissingFrequency,

    /// COUNT and UNTIL occur in the same rule.
    #[error("COUNT and UNTIL must not occur in the same rule")]
    ConflictingBound,

    /// The UNTIL value is not a valid DATE or DATE-TIME literal.
    #[error("invalid UNTIL date `{value}`")]
    InvalidUntilDate {
        /// The rejected literal.
        value: String,
    },

    /// A rule part carries a value outside its RFC 5545 domain.
    #[error("value `{value}` is out of range for {part}")]
    InvalidFilterValue {
        /// The rule part name.
        part: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A token is not a recognized `KEY=value` rule part.
    #[error("unrecognized rule token `{token}`")]
    InvalidRuleToken {
        /// The rejected token.
        token: String,
    },

    /// A rule part occurs more than once.
    #[error("rule part {part} occurs more than once")]
    DuplicateRulePart {
        /// The repeated rule part name.
        part: &'static str,
    },
}

/// An immutable RFC 5545 recurrence rule.
///
/// Construct one by parsing an RRULE value (`FromStr`) or through
/// [`RecurrenceRule::builder`]; both validate every part, so a value of
/// this type always satisfies the RFC domains. The numeric BY* sets are
/// stored sorted and deduplicated, which makes [`Display`] canonical:
/// re-parsing the output yields an equal rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    frequency: Frequency,
    interval: u32,
    bound: Bound,
    week_start: Weekday,
    by_second: Vec<i8>,
    by_minute: Vec<i8>,
    by_hour: Vec<i8>,
    by_day: Vec<WeekdayNum>,
    by_month_day: Vec<i8>,
    by_year_day: Vec<i16>,
    by_week_no: Vec<i8>,
    by_month: Vec<i8>,
    by_set_pos: Vec<i16>,
}

impl RecurrenceRule {
    /// A builder for programmatic construction.
    #[must_use]
    pub fn builder(frequency: Frequency) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::new(frequency)
    }

    /// The base period.
    #[must_use]
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Periods advanced per step, at least 1.
    #[must_use]
    pub fn interval(&self) -> u32 {
        self.interval
    }

    /// How the occurrence sequence ends.
    #[must_use]
    pub fn bound(&self) -> &Bound {
        &self.bound
    }

    /// First day of the week for BYWEEKNO and WEEKLY periods.
    #[must_use]
    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// BYSECOND values, 0-60.
    #[must_use]
    pub fn by_second(&self) -> &[i8] {
        &self.by_second
    }

    /// BYMINUTE values, 0-59.
    #[must_use]
    pub fn by_minute(&self) -> &[i8] {
        &self.by_minute
    }

    /// BYHOUR values, 0-23.
    #[must_use]
    pub fn by_hour(&self) -> &[i8] {
        &self.by_hour
    }

    /// BYDAY entries.
    #[must_use]
    pub fn by_day(&self) -> &[WeekdayNum] {
        &self.by_day
    }

    /// BYMONTHDAY values, ±1-31; negative counts from the month's end.
    #[must_use]
    pub fn by_month_day(&self) -> &[i8] {
        &self.by_month_day
    }

    /// BYYEARDAY values, ±1-366; negative counts from the year's end.
    #[must_use]
    pub fn by_year_day(&self) -> &[i16] {
        &self.by_year_day
    }

    /// BYWEEKNO values, ±1-53; negative counts from the year's end.
    #[must_use]
    pub fn by_week_no(&self) -> &[i8] {
        &self.by_week_no
    }

    /// BYMONTH values, 1-12.
    #[must_use]
    pub fn by_month(&self) -> &[i8] {
        &self.by_month
    }

    /// BYSETPOS values, ±1-366, applied to the period's expanded set.
    #[must_use]
    pub fn by_set_pos(&self) -> &[i16] {
        &self.by_set_pos
    }

    /// Whether any date-selecting BY* part is present.
    pub(crate) fn has_date_selectors(&self) -> bool {
        !self.by_month.is_empty()
            || !self.by_week_no.is_empty()
            || !self.by_year_day.is_empty()
            || !self.by_month_day.is_empty()
            || !self.by_day.is_empty()
    }
}

impl FromStr for RecurrenceRule {
    type Err = RuleError;

    /// Parse an RRULE value of `KEY=value` parts separated by `;`.
    ///
    /// Part order is irrelevant, but each part may occur at most once.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut builder = RecurrenceRuleBuilder::empty();

        for token in s.split(';') {
            let Some((key, value)) = token.split_once('=') else {
                return Err(RuleError::InvalidRuleToken {
                    token: token.to_owned(),
                });
            };
            match key {
                KW_RRULE_FREQ => {
                    set_once(&mut builder.frequency, KW_RRULE_FREQ, parse_frequency(value)?)?;
                }
                KW_RRULE_UNTIL => {
                    let until =
                        value
                            .parse::<CalDateTime>()
                            .map_err(|_| RuleError::InvalidUntilDate {
                                value: value.to_owned(),
                            })?;
                    set_once(&mut builder.until, KW_RRULE_UNTIL, until)?;
                }
                KW_RRULE_COUNT => {
                    let count = positive_int(KW_RRULE_COUNT, value)?;
                    set_once(&mut builder.count, KW_RRULE_COUNT, count)?;
                }
                KW_RRULE_INTERVAL => {
                    let interval = positive_int(KW_RRULE_INTERVAL, value)?;
                    set_once(&mut builder.interval, KW_RRULE_INTERVAL, interval)?;
                }
                KW_RRULE_BYSECOND => {
                    let list = int_list(KW_RRULE_BYSECOND, value, |v: i8| (0..=60).contains(&v))?;
                    set_list_once(&mut builder.by_second, KW_RRULE_BYSECOND, list)?;
                }
                KW_RRULE_BYMINUTE => {
                    let list = int_list(KW_RRULE_BYMINUTE, value, |v: i8| (0..=59).contains(&v))?;
                    set_list_once(&mut builder.by_minute, KW_RRULE_BYMINUTE, list)?;
                }
                KW_RRULE_BYHOUR => {
                    let list = int_list(KW_RRULE_BYHOUR, value, |v: i8| (0..=23).contains(&v))?;
                    set_list_once(&mut builder.by_hour, KW_RRULE_BYHOUR, list)?;
                }
                KW_RRULE_BYDAY => {
                    let mut list = Vec::new();
                    for entry in value.split(',') {
                        list.push(weekday_num(entry)?);
                    }
                    set_list_once(&mut builder.by_day, KW_RRULE_BYDAY, list)?;
                }
                KW_RRULE_BYMONTHDAY => {
                    let list = int_list(KW_RRULE_BYMONTHDAY, value, |v: i8| {
                        v != 0 && (-31..=31).contains(&v)
                    })?;
                    set_list_once(&mut builder.by_month_day, KW_RRULE_BYMONTHDAY, list)?;
                }
                KW_RRULE_BYYEARDAY => {
                    let list = int_list(KW_RRULE_BYYEARDAY, value, |v: i16| {
                        v != 0 && (-366..=366).contains(&v)
                    })?;
                    set_list_once(&mut builder.by_year_day, KW_RRULE_BYYEARDAY, list)?;
                }
                KW_RRULE_BYWEEKNO => {
                    let list = int_list(KW_RRULE_BYWEEKNO, value, |v: i8| {
                        v != 0 && (-53..=53).contains(&v)
                    })?;
                    set_list_once(&mut builder.by_week_no, KW_RRULE_BYWEEKNO, list)?;
                }
                KW_RRULE_BYMONTH => {
                    let list = int_list(KW_RRULE_BYMONTH, value, |v: i8| (1..=12).contains(&v))?;
                    set_list_once(&mut builder.by_month, KW_RRULE_BYMONTH, list)?;
                }
                KW_RRULE_BYSETPOS => {
                    let list = int_list(KW_RRULE_BYSETPOS, value, |v: i16| {
                        v != 0 && (-366..=366).contains(&v)
                    })?;
                    set_list_once(&mut builder.by_set_pos, KW_RRULE_BYSETPOS, list)?;
                }
                KW_RRULE_WKST => {
                    let weekday =
                        Weekday::from_str(value).map_err(|_| RuleError::InvalidFilterValue {
                            part: KW_RRULE_WKST,
                            value: value.to_owned(),
                        })?;
                    set_once(&mut builder.week_start, KW_RRULE_WKST, weekday)?;
                }
                _ => {
                    return Err(RuleError::InvalidRuleToken {
                        token: key.to_owned(),
                    });
                }
            }
        }

        builder.build()
    }
}

impl Display for RecurrenceRule {
    /// The canonical RRULE text: FREQ first, then the remaining parts in
    /// a fixed order, defaults omitted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{KW_RRULE_FREQ}={}", self.frequency)?;

        match &self.bound {
            Bound::Unbounded => {}
            Bound::Count(count) => write!(f, ";{KW_RRULE_COUNT}={count}")?,
            Bound::Until(until) => write!(f, ";{KW_RRULE_UNTIL}={until}")?,
        }
        if self.interval != 1 {
            write!(f, ";{KW_RRULE_INTERVAL}={}", self.interval)?;
        }

        write_int_list(f, KW_RRULE_BYSECOND, &self.by_second)?;
        write_int_list(f, KW_RRULE_BYMINUTE, &self.by_minute)?;
        write_int_list(f, KW_RRULE_BYHOUR, &self.by_hour)?;
        if !self.by_day.is_empty() {
            write!(f, ";{KW_RRULE_BYDAY}=")?;
            for (i, entry) in self.by_day.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{entry}")?;
            }
        }
        write_int_list(f, KW_RRULE_BYMONTHDAY, &self.by_month_day)?;
        write_int_list(f, KW_RRULE_BYYEARDAY, &self.by_year_day)?;
        write_int_list(f, KW_RRULE_BYWEEKNO, &self.by_week_no)?;
        write_int_list(f, KW_RRULE_BYMONTH, &self.by_month)?;
        write_int_list(f, KW_RRULE_BYSETPOS, &self.by_set_pos)?;

        if self.week_start != Weekday::Monday {
            write!(f, ";{KW_RRULE_WKST}={}", self.week_start)?;
        }
        Ok(())
    }
}

fn write_int_list<T: Display>(
    f: &mut fmt::Formatter<'_>,
    key: &str,
    values: &[T],
) -> fmt::Result {
    if values.is_empty() {
        return Ok(());
    }
    write!(f, ";{key}=")?;
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ",")?;
        }
        write!(f, "{value}")?;
    }
    Ok(())
}

fn set_once<T>(slot: &mut Option<T>, part: &'static str, value: T) -> Result<(), RuleError> {
    if slot.is_some() {
        return Err(RuleError::DuplicateRulePart { part });
    }
    *slot = Some(value);
    Ok(())
}

fn set_list_once<T>(slot: &mut Vec<T>, part: &'static str, values: Vec<T>) -> Result<(), RuleError> {
    if !slot.is_empty() {
        return Err(RuleError::DuplicateRulePart { part });
    }
    *slot = values;
    Ok(())
}

fn parse_frequency(value: &str) -> Result<Frequency, RuleError> {
    Frequency::from_str(value).map_err(|_| RuleError::InvalidFilterValue {
        part: KW_RRULE_FREQ,
        value: value.to_owned(),
    })
}

fn positive_int(part: &'static str, value: &str) -> Result<u32, RuleError> {
    match lexical::parse::<u32, _>(value) {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(RuleError::InvalidFilterValue {
            part,
            value: value.to_owned(),
        }),
    }
}

fn int_list<T>(
    part: &'static str,
    value: &str,
    in_domain: impl Fn(T) -> bool,
) -> Result<Vec<T>, RuleError>
where
    T: lexical::FromLexical + Copy,
{
    let mut values = Vec::new();
    for entry in value.split(',') {
        // The grammar allows an explicit plus sign on signed values.
        let digits = entry.strip_prefix('+').unwrap_or(entry);
        match lexical::parse::<T, _>(digits) {
            Ok(v) if in_domain(v) => values.push(v),
            _ => {
                return Err(RuleError::InvalidFilterValue {
                    part,
                    value: entry.to_owned(),
                });
            }
        }
    }
    Ok(values)
}

/// ```txt
/// weekdaynum = [[plus / minus] ordwk] weekday
/// ordwk      = 1*2DIGIT   ;1 to 53
/// weekday    = "SU" / "MO" / "TU" / "WE" / "TH" / "FR" / "SA"
/// ```
fn weekday_num(entry: &str) -> Result<WeekdayNum, RuleError> {
    let invalid = || RuleError::InvalidFilterValue {
        part: KW_RRULE_BYDAY,
        value: entry.to_owned(),
    };

    let split = entry.len().checked_sub(2).ok_or_else(invalid)?;
    if !entry.is_char_boundary(split) {
        return Err(invalid());
    }
    let (ordinal, weekday) = entry.split_at(split);
    let weekday = Weekday::from_str(weekday).map_err(|_| invalid())?;
    let ordinal = if ordinal.is_empty() {
        None
    } else {
        let digits = ordinal.strip_prefix('+').unwrap_or(ordinal);
        let n = lexical::parse::<i8, _>(digits).map_err(|_| invalid())?;
        if n == 0 || !(-53..=53).contains(&n) {
            return Err(invalid());
        }
        Some(n)
    };
    Ok(WeekdayNum { ordinal, weekday })
}

/// Builder for [`RecurrenceRule`], mirroring the rule parts.
///
/// `build` applies the same validation as the parser; the two agree on
/// every rule they accept.
#[derive(Debug, Clone)]
pub struct RecurrenceRuleBuilder {
    frequency: Option<Frequency>,
    until: Option<CalDateTime>,
    count: Option<u32>,
    interval: Option<u32>,
    week_start: Option<Weekday>,
    by_second: Vec<i8>,
    by_minute: Vec<i8>,
    by_hour: Vec<i8>,
    by_day: Vec<WeekdayNum>,
    by_month_day: Vec<i8>,
    by_year_day: Vec<i16>,
    by_week_no: Vec<i8>,
    by_month: Vec<i8>,
    by_set_pos: Vec<i16>,
}

impl RecurrenceRuleBuilder {
    fn empty() -> Self {
        Self {
            frequency: None,
            until: None,
            count: None,
            interval: None,
            week_start: None,
            by_second: Vec::new(),
            by_minute: Vec::new(),
            by_hour: Vec::new(),
            by_day: Vec::new(),
            by_month_day: Vec::new(),
            by_year_day: Vec::new(),
            by_week_no: Vec::new(),
            by_month: Vec::new(),
            by_set_pos: Vec::new(),
        }
    }

    fn new(frequency: Frequency) -> Self {
        let mut builder = Self::empty();
        builder.frequency = Some(frequency);
        builder
    }

    /// Stop after this many occurrences.
    #[must_use]
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Stop after this date-time, inclusive.
    #[must_use]
    pub fn until(mut self, until: CalDateTime) -> Self {
        self.until = Some(until);
        self
    }

    /// Advance this many periods per step.
    #[must_use]
    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    /// First day of the week (WKST).
    #[must_use]
    pub fn week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = Some(week_start);
        self
    }

    /// BYSECOND values.
    #[must_use]
    pub fn by_second(mut self, seconds: impl IntoIterator<Item = i8>) -> Self {
        self.by_second.extend(seconds);
        self
    }

    /// BYMINUTE values.
    #[must_use]
    pub fn by_minute(mut self, minutes: impl IntoIterator<Item = i8>) -> Self {
        self.by_minute.extend(minutes);
        self
    }

    /// BYHOUR values.
    #[must_use]
    pub fn by_hour(mut self, hours: impl IntoIterator<Item = i8>) -> Self {
        self.by_hour.extend(hours);
        self
    }

    /// BYDAY entries.
    #[must_use]
    pub fn by_day(mut self, days: impl IntoIterator<Item = WeekdayNum>) -> Self {
        self.by_day.extend(days);
        self
    }

    /// BYMONTHDAY values.
    #[must_use]
    pub fn by_month_day(mut self, days: impl IntoIterator<Item = i8>) -> Self {
        self.by_month_day.extend(days);
        self
    }

    /// BYYEARDAY values.
    #[must_use]
    pub fn by_year_day(mut self, days: impl IntoIterator<Item = i16>) -> Self {
        self.by_year_day.extend(days);
        self
    }

    /// BYWEEKNO values.
    #[must_use]
    pub fn by_week_no(mut self, weeks: impl IntoIterator<Item = i8>) -> Self {
        self.by_week_no.extend(weeks);
        self
    }

    /// BYMONTH values.
    #[must_use]
    pub fn by_month(mut self, months: impl IntoIterator<Item = i8>) -> Self {
        self.by_month.extend(months);
        self
    }

    /// BYSETPOS values.
    #[must_use]
    pub fn by_set_pos(mut self, positions: impl IntoIterator<Item = i16>) -> Self {
        self.by_set_pos.extend(positions);
        self
    }

    /// Validate every part and produce the immutable rule.
    ///
    /// # Errors
    ///
    /// Any violation of the RFC 5545 domains or of the part combination
    /// constraints is rejected with the corresponding [`RuleError`].
    pub fn build(self) -> Result<RecurrenceRule, RuleError> {
        fn check<T: Copy>(
            part: &'static str,
            values: &[T],
            in_domain: impl Fn(T) -> bool,
        ) -> Result<(), RuleError>
        where
            T: Display,
        {
            for &v in values {
                if !in_domain(v) {
                    return Err(RuleError::InvalidFilterValue {
                        part,
                        value: v.to_string(),
                    });
                }
            }
            Ok(())
        }

        fn sort_and_dedup<T: Ord + Copy>(mut values: Vec<T>) -> Vec<T> {
            values.sort_unstable();
            values.dedup();
            values
        }

        let frequency = self.frequency.ok_or(RuleError::MissingFrequency)?;
        let bound = match (self.count, self.until) {
            (Some(_), Some(_)) => return Err(RuleError::ConflictingBound),
            (Some(0), None) => {
                return Err(RuleError::InvalidFilterValue {
                    part: KW_RRULE_COUNT,
                    value: "0".to_owned(),
                });
            }
            (Some(count), None) => Bound::Count(count),
            (None, Some(until)) => Bound::Until(until),
            (None, None) => Bound::Unbounded,
        };
        let interval = match self.interval {
            Some(0) => {
                return Err(RuleError::InvalidFilterValue {
                    part: KW_RRULE_INTERVAL,
                    value: "0".to_owned(),
                });
            }
            Some(interval) => interval,
            None => 1,
        };

        check(KW_RRULE_BYSECOND, &self.by_second, |v| {
            (0..=60).contains(&v)
        })?;
        check(KW_RRULE_BYMINUTE, &self.by_minute, |v| {
            (0..=59).contains(&v)
        })?;
        check(KW_RRULE_BYHOUR, &self.by_hour, |v| (0..=23).contains(&v))?;
        check(KW_RRULE_BYMONTHDAY, &self.by_month_day, |v| {
            v != 0 && (-31..=31).contains(&v)
        })?;
        check(KW_RRULE_BYYEARDAY, &self.by_year_day, |v| {
            v != 0 && (-366..=366).contains(&v)
        })?;
        check(KW_RRULE_BYWEEKNO, &self.by_week_no, |v| {
            v != 0 && (-53..=53).contains(&v)
        })?;
        check(KW_RRULE_BYMONTH, &self.by_month, |v| (1..=12).contains(&v))?;
        check(KW_RRULE_BYSETPOS, &self.by_set_pos, |v| {
            v != 0 && (-366..=366).contains(&v)
        })?;

        // Part combination constraints from RFC 5545 Section 3.3.10.
        for entry in &self.by_day {
            let Some(ordinal) = entry.ordinal else {
                continue;
            };
            let numbered_allowed = matches!(frequency, Frequency::Monthly | Frequency::Yearly)
                && !(matches!(frequency, Frequency::Yearly) && !self.by_week_no.is_empty());
            let in_range = if matches!(frequency, Frequency::Yearly) && self.by_month.is_empty() {
                (1..=53).contains(&ordinal.abs())
            } else {
                (1..=5).contains(&ordinal.abs())
            };
            if !numbered_allowed || !in_range {
                return Err(RuleError::InvalidFilterValue {
                    part: KW_RRULE_BYDAY,
                    value: entry.to_string(),
                });
            }
        }
        if !self.by_week_no.is_empty() && !matches!(frequency, Frequency::Yearly) {
            return Err(RuleError::InvalidFilterValue {
                part: KW_RRULE_BYWEEKNO,
                value: format!("{frequency}"),
            });
        }
        if !self.by_year_day.is_empty()
            && matches!(
                frequency,
                Frequency::Daily | Frequency::Weekly | Frequency::Monthly
            )
        {
            return Err(RuleError::InvalidFilterValue {
                part: KW_RRULE_BYYEARDAY,
                value: format!("{frequency}"),
            });
        }
        if !self.by_month_day.is_empty() && matches!(frequency, Frequency::Weekly) {
            return Err(RuleError::InvalidFilterValue {
                part: KW_RRULE_BYMONTHDAY,
                value: format!("{frequency}"),
            });
        }
        if !self.by_set_pos.is_empty()
            && self.by_second.is_empty()
            && self.by_minute.is_empty()
            && self.by_hour.is_empty()
            && self.by_day.is_empty()
            && self.by_month_day.is_empty()
            && self.by_year_day.is_empty()
            && self.by_week_no.is_empty()
            && self.by_month.is_empty()
        {
            return Err(RuleError::InvalidFilterValue {
                part: KW_RRULE_BYSETPOS,
                value: "no other BY* part".to_owned(),
            });
        }

        let mut by_day = self.by_day;
        by_day.sort_unstable();
        by_day.dedup();

        Ok(RecurrenceRule {
            frequency,
            interval,
            bound,
            week_start: self.week_start.unwrap_or(Weekday::Monday),
            by_second: sort_and_dedup(self.by_second),
            by_minute: sort_and_dedup(self.by_minute),
            by_hour: sort_and_dedup(self.by_hour),
            by_day,
            by_month_day: sort_and_dedup(self.by_month_day),
            by_year_day: sort_and_dedup(self.by_year_day),
            by_week_no: sort_and_dedup(self.by_week_no),
            by_month: sort_and_dedup(self.by_month),
            by_set_pos: sort_and_dedup(self.by_set_pos),
        })
    }
}
