// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Civil date-time values and the calendar arithmetic behind recurrence
//! expansion.
//!
//! Everything here follows the proleptic Gregorian calendar. Week-based
//! helpers take an explicit week-start day because RFC 5545 generalizes
//! ISO 8601 week numbering to any `WKST`.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::str::FromStr;

use chumsky::Parser;
use chumsky::error::RichPattern;
use chumsky::extra::ParserExtra;
use chumsky::input::Stream;
use chumsky::label::LabelError;
use chumsky::prelude::*;
use jiff::ToSpan;
use jiff::civil::{self, Date, DateTime};

/// Day of the week, using the two-letter codes of RFC 5545.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[expect(missing_docs)]
pub enum Weekday {
    #[strum(serialize = "MO")]
    Monday,
    #[strum(serialize = "TU")]
    Tuesday,
    #[strum(serialize = "WE")]
    Wednesday,
    #[strum(serialize = "TH")]
    Thursday,
    #[strum(serialize = "FR")]
    Friday,
    #[strum(serialize = "SA")]
    Saturday,
    #[strum(serialize = "SU")]
    Sunday,
}

impl Weekday {
    pub(crate) fn from_civil(weekday: civil::Weekday) -> Self {
        match weekday {
            civil::Weekday::Monday => Weekday::Monday,
            civil::Weekday::Tuesday => Weekday::Tuesday,
            civil::Weekday::Wednesday => Weekday::Wednesday,
            civil::Weekday::Thursday => Weekday::Thursday,
            civil::Weekday::Friday => Weekday::Friday,
            civil::Weekday::Saturday => Weekday::Saturday,
            civil::Weekday::Sunday => Weekday::Sunday,
        }
    }

    pub(crate) fn to_civil(self) -> civil::Weekday {
        match self {
            Weekday::Monday => civil::Weekday::Monday,
            Weekday::Tuesday => civil::Weekday::Tuesday,
            Weekday::Wednesday => civil::Weekday::Wednesday,
            Weekday::Thursday => civil::Weekday::Thursday,
            Weekday::Friday => civil::Weekday::Friday,
            Weekday::Saturday => civil::Weekday::Saturday,
            Weekday::Sunday => civil::Weekday::Sunday,
        }
    }

    /// Days since Monday, 0-6.
    fn monday_offset(self) -> i8 {
        match self {
            Weekday::Monday => 0,
            Weekday::Tuesday => 1,
            Weekday::Wednesday => 2,
            Weekday::Thursday => 3,
            Weekday::Friday => 4,
            Weekday::Saturday => 5,
            Weekday::Sunday => 6,
        }
    }
}

/// The weekday of the given date.
#[must_use]
pub fn day_of_week(date: Date) -> Weekday {
    Weekday::from_civil(date.weekday())
}

/// Gregorian leap-year test.
#[must_use]
pub fn is_leap_year(year: i16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in the given month, 28-31.
#[must_use]
pub fn days_in_month(year: i16, month: i8) -> i8 {
    match month {
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// One-based ordinal of the date within its year, 1-366.
#[must_use]
pub fn day_of_year(date: Date) -> i16 {
    date.day_of_year()
}

/// Days the given weekday lies past `week_start`, 0-6.
fn week_offset(weekday: Weekday, week_start: Weekday) -> i8 {
    (weekday.monday_offset() - week_start.monday_offset()).rem_euclid(7)
}

/// First day of week 1 of the given year.
///
/// Week 1 is the first week, starting on `week_start`, that contains at
/// least four days of the year. It may begin in the previous year.
fn week_one_start(year: i16, week_start: Weekday) -> Option<Date> {
    let jan1 = Date::new(year, 1, 1).ok()?;
    let offset = week_offset(day_of_week(jan1), week_start);
    let delta = if offset <= 3 {
        -i64::from(offset)
    } else {
        i64::from(7 - offset)
    };
    jan1.checked_add(delta.days()).ok()
}

/// Number of numbered weeks in the given year, 52 or 53.
#[must_use]
pub fn weeks_in_year(year: i16, week_start: Weekday) -> i8 {
    let Ok(jan1) = Date::new(year, 1, 1) else {
        return 52;
    };
    let offset = week_offset(day_of_week(jan1), week_start);
    if offset == 3 || (offset == 2 && is_leap_year(year)) {
        53
    } else {
        52
    }
}

/// Week number of the date, 1-53.
///
/// Dates before week 1 of their calendar year belong to the last week of
/// the previous year; dates past the last numbered week belong to week 1
/// of the next year. With `week_start = MO` this is ISO 8601 week
/// numbering.
#[must_use]
pub fn week_number(date: Date, week_start: Weekday) -> i8 {
    let year = date.year();
    let Some(week_one) = week_one_start(year, week_start) else {
        return 1;
    };
    if date < week_one {
        return weeks_in_year(year - 1, week_start);
    }
    let days = date.since(week_one).map_or(0, |span| span.get_days());
    let week = (days / 7 + 1).clamp(1, i32::from(i8::MAX)) as i8;
    if week > weeks_in_year(year, week_start) {
        1
    } else {
        week
    }
}

/// First day of the given numbered week of a year.
///
/// Returns `None` when the week number does not exist in that year.
#[must_use]
pub fn week_start_date(year: i16, week: i8, week_start: Weekday) -> Option<Date> {
    if week < 1 || week > weeks_in_year(year, week_start) {
        return None;
    }
    week_one_start(year, week_start)?
        .checked_add((i64::from(week) * 7 - 7).days())
        .ok()
}

/// First day of the week containing the given date.
#[must_use]
pub fn first_of_week(date: Date, week_start: Weekday) -> Date {
    let offset = week_offset(day_of_week(date), week_start);
    date.checked_add((-i64::from(offset)).days()).unwrap_or(date)
}

/// Last day of the week containing the given date.
#[must_use]
pub fn last_of_week(date: Date, week_start: Weekday) -> Date {
    first_of_week(date, week_start)
        .checked_add(6.days())
        .unwrap_or(date)
}

/// How a [`CalDateTime`] reckons its time of day.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimeKind {
    /// A date without a time of day (`VALUE=DATE`).
    Date,
    /// A floating local time with no time-zone identity.
    Floating,
    /// UTC, written with a trailing `Z`.
    Utc,
    /// A time anchored to a named zone (`TZID` parameter). Only the
    /// identity is carried; offset resolution is out of scope.
    Zoned(String),
}

impl TimeKind {
    fn rank(&self) -> u8 {
        match self {
            TimeKind::Date => 0,
            TimeKind::Floating => 1,
            TimeKind::Utc => 2,
            TimeKind::Zoned(_) => 3,
        }
    }
}

/// A civil date-time together with its time reckoning.
///
/// Ordering compares the civil value first, so sets mixing kinds still
/// sort chronologically by wall-clock value. Equality is exact: the same
/// civil value in two kinds compares unequal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CalDateTime {
    datetime: DateTime,
    kind: TimeKind,
}

impl CalDateTime {
    /// A date-time value with the given reckoning.
    #[must_use]
    pub fn new(datetime: DateTime, kind: TimeKind) -> Self {
        Self { datetime, kind }
    }

    /// A date-only value (midnight civil time).
    #[must_use]
    pub fn from_date(date: Date) -> Self {
        Self {
            datetime: date.to_datetime(civil::Time::midnight()),
            kind: TimeKind::Date,
        }
    }

    /// The civil date-time.
    #[must_use]
    pub fn datetime(&self) -> DateTime {
        self.datetime
    }

    /// The civil date.
    #[must_use]
    pub fn date(&self) -> Date {
        self.datetime.date()
    }

    /// The time reckoning.
    #[must_use]
    pub fn kind(&self) -> &TimeKind {
        &self.kind
    }

    /// Whether this value carries no time of day.
    #[must_use]
    pub fn is_date_only(&self) -> bool {
        matches!(self.kind, TimeKind::Date)
    }

    /// The same reckoning applied to a different civil value.
    pub(crate) fn with_datetime(&self, datetime: DateTime) -> Self {
        Self {
            datetime,
            kind: self.kind.clone(),
        }
    }

    /// Re-anchor a floating value to a named zone. Non-floating values
    /// are returned unchanged.
    #[must_use]
    pub fn with_zone(self, tzid: &str) -> Self {
        match self.kind {
            TimeKind::Floating => Self {
                datetime: self.datetime,
                kind: TimeKind::Zoned(tzid.to_owned()),
            },
            _ => self,
        }
    }
}

impl Ord for CalDateTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.datetime
            .cmp(&other.datetime)
            .then_with(|| self.kind.rank().cmp(&other.kind.rank()))
            .then_with(|| match (&self.kind, &other.kind) {
                (TimeKind::Zoned(a), TimeKind::Zoned(b)) => a.cmp(b),
                _ => Ordering::Equal,
            })
    }
}

impl PartialOrd for CalDateTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for CalDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self.datetime.date();
        write!(
            f,
            "{:04}{:02}{:02}",
            date.year(),
            date.month(),
            date.day()
        )?;
        if self.is_date_only() {
            return Ok(());
        }
        write!(
            f,
            "T{:02}{:02}{:02}",
            self.datetime.hour(),
            self.datetime.minute(),
            self.datetime.second()
        )?;
        if matches!(self.kind, TimeKind::Utc) {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

/// Error returned when a DATE or DATE-TIME literal cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid date-time literal `{value}`")]
pub struct DateTimeParseError {
    /// The rejected literal.
    pub value: String,
}

impl FromStr for CalDateTime {
    type Err = DateTimeParseError;

    /// Parse the RFC 5545 `YYYYMMDD` and `YYYYMMDDTHHMMSS[Z]` forms.
    ///
    /// A bare date yields a date-only value; a trailing `Z` yields UTC,
    /// otherwise the time floats.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stream = Stream::from_iter(s.chars());
        value_cal_date_time::<'_, _, extra::Err<Rich<'_, char>>>()
            .parse(stream)
            .into_result()
            .map_err(|_| DateTimeParseError {
                value: s.to_owned(),
            })
    }
}

/// Expected-value labels attached to chumsky errors by the value parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueExpected {
    Date,
}

impl From<ValueExpected> for RichPattern<'_, char> {
    fn from(expected: ValueExpected) -> Self {
        match expected {
            ValueExpected::Date => Self::Label(Cow::Borrowed("invalid date")),
        }
    }
}

/// ```txt
/// date / date-time  (date-time = date "T" time)
/// ```
pub(crate) fn value_cal_date_time<'src, I, E>() -> impl Parser<'src, I, CalDateTime, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    choice((
        value_date()
            .then_ignore(just('T'))
            .then(value_time())
            .map(|(date, (time, utc))| {
                let kind = if utc { TimeKind::Utc } else { TimeKind::Floating };
                CalDateTime::new(date.to_datetime(time), kind)
            }),
        value_date().map(CalDateTime::from_date),
    ))
}

/// ```txt
/// date-value    = date-fullyear date-month date-mday
/// date-fullyear = 4DIGIT
/// date-month    = 2DIGIT        ;01-12
/// date-mday     = 2DIGIT        ;01-28, 01-29, 01-30, 01-31
/// ```
pub(crate) fn value_date<'src, I, E>() -> impl Parser<'src, I, Date, E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
    E::Error: LabelError<'src, I, ValueExpected>,
{
    let year = i16_0_9()
        .then(i16_0_9())
        .then(i16_0_9())
        .then(i16_0_9())
        .map(|(((a, b), c), d)| 1000 * a + 100 * b + 10 * c + d);

    let month = choice((
        just('0').ignore_then(i8_1_9()),
        just('1').ignore_then(i8_0_2()).map(|b| 10 + b),
    ));

    let day = choice((
        just('0').ignore_then(i8_1_9()),
        i8_1_2().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('3').ignore_then(i8_0_1()).map(|b| 30 + b),
    ));

    year.then(month)
        .then(day)
        .try_map(|((year, month), day), span| {
            Date::new(year, month, day)
                .map_err(|_| E::Error::expected_found([ValueExpected::Date], None, span))
        })
}

/// ```txt
/// time        = time-hour time-minute time-second [time-utc]
/// time-hour   = 2DIGIT   ;00-23
/// time-minute = 2DIGIT   ;00-59
/// time-second = 2DIGIT   ;00-60 ("60" covers positive leap seconds)
/// time-utc    = "Z"
/// ```
///
/// A leap second collapses to `:59` in the civil value, matching how the
/// rest of the crate compares times.
pub(crate) fn value_time<'src, I, E>() -> impl Parser<'src, I, (civil::Time, bool), E>
where
    I: Input<'src, Token = char, Span = SimpleSpan>,
    E: ParserExtra<'src, I>,
{
    let hour = choice((
        i8_0_1().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('2').ignore_then(i8_0_3()).map(|b| 20 + b),
    ));
    let minute = i8_0_5().then(i8_0_9()).map(|(a, b)| 10 * a + b);
    let second = choice((
        i8_0_5().then(i8_0_9()).map(|(a, b)| 10 * a + b),
        just('6').ignore_then(just('0')).to(60),
    ));

    hour.then(minute)
        .then(second)
        .then(just('Z').or_not())
        .map(|(((hour, minute), second), utc)| {
            (civil::time(hour, minute, second.min(59), 0), utc.is_some())
        })
}

macro_rules! define_digit_select {
    ($fname:ident : $ty:ty => { $($ch:literal),+ $(,)? }) => {
        #[allow(trivial_numeric_casts, clippy::cast_lossless, clippy::char_lit_as_u8, clippy::cast_possible_wrap)]
        const fn $fname<'src, I, E>() -> impl Parser<'src, I, $ty, E> + Copy
        where
            I: Input<'src, Token = char, Span = SimpleSpan>,
            E: ParserExtra<'src, I>,
        {
            select! {
                $(
                    $ch => (($ch as u8 - b'0') as $ty),
                )+
            }
        }
    };
}

define_digit_select!(i8_0_1 : i8 => { '0', '1' });
define_digit_select!(i8_0_2 : i8 => { '0', '1', '2' });
define_digit_select!(i8_0_3 : i8 => { '0', '1', '2', '3' });
define_digit_select!(i8_0_5 : i8 => { '0', '1', '2', '3', '4', '5' });
define_digit_select!(i8_0_9 : i8 => { '0', '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i8_1_2 : i8 => { '1', '2' });
define_digit_select!(i8_1_9 : i8 => { '1', '2', '3', '4', '5', '6', '7', '8', '9' });
define_digit_select!(i16_0_9 : i16 => { '0', '1', '2', '3', '4', '5', '6', '7', '8', '9' });

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i16, month: i8, day: i8) -> Date {
        civil::date(year, month, day)
    }

    #[test]
    fn leap_years() {
        for year in [2000, 2004, 2020, 2024, 1600] {
            assert!(is_leap_year(year), "{year} should be leap");
        }
        for year in [1900, 2023, 2025, 2100, 1997] {
            assert!(!is_leap_year(year), "{year} should not be leap");
        }
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2025, 2), 28);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn year_days() {
        assert_eq!(day_of_year(date(2025, 1, 1)), 1);
        assert_eq!(day_of_year(date(2024, 12, 31)), 366);
        assert_eq!(day_of_year(date(2025, 12, 31)), 365);
    }

    #[test]
    fn iso_week_numbers_monday_start() {
        // 2015 starts on a Thursday, so it is a 53-week year.
        assert_eq!(weeks_in_year(2015, Weekday::Monday), 53);
        assert_eq!(week_number(date(2015, 12, 31), Weekday::Monday), 53);
        // 2016-01-01 is a Friday and still belongs to 2015's week 53.
        assert_eq!(week_number(date(2016, 1, 1), Weekday::Monday), 53);
        // 2020 is a leap year starting on Wednesday, also 53 weeks.
        assert_eq!(weeks_in_year(2020, Weekday::Monday), 53);
        assert_eq!(week_number(date(2021, 1, 1), Weekday::Monday), 53);
        // 2017-01-01 is a Sunday, the tail of 2016's week 52.
        assert_eq!(weeks_in_year(2016, Weekday::Monday), 52);
        assert_eq!(week_number(date(2017, 1, 1), Weekday::Monday), 52);
        // An unambiguous mid-year date.
        assert_eq!(week_number(date(2025, 7, 9), Weekday::Monday), 28);
    }

    #[test]
    fn week_numbers_with_sunday_start() {
        // 1997-01-01 is a Wednesday; with WKST=SU week 1 starts Dec 29.
        assert_eq!(weeks_in_year(1997, Weekday::Sunday), 53);
        assert_eq!(week_number(date(1997, 1, 1), Weekday::Sunday), 1);
        assert_eq!(
            week_start_date(1997, 1, Weekday::Sunday),
            Some(date(1996, 12, 29))
        );
    }

    #[test]
    fn week_start_dates() {
        // ISO week 20 of 1997 starts on Monday May 12.
        assert_eq!(
            week_start_date(1997, 20, Weekday::Monday),
            Some(date(1997, 5, 12))
        );
        assert_eq!(week_start_date(1997, 0, Weekday::Monday), None);
        assert_eq!(week_start_date(2016, 53, Weekday::Monday), None);
    }

    #[test]
    fn week_bounds() {
        let wednesday = date(2025, 1, 8);
        assert_eq!(first_of_week(wednesday, Weekday::Monday), date(2025, 1, 6));
        assert_eq!(last_of_week(wednesday, Weekday::Monday), date(2025, 1, 12));
        assert_eq!(first_of_week(wednesday, Weekday::Sunday), date(2025, 1, 5));
    }

    #[test]
    fn parses_date_time_literals() {
        #[rustfmt::skip]
        let success_cases = [
            ("19970714",         CalDateTime::from_date(date(1997, 7, 14))),
            ("19980118T230000",  CalDateTime::new(civil::datetime(1998, 1, 18, 23, 0, 0, 0), TimeKind::Floating)),
            ("19980119T070000Z", CalDateTime::new(civil::datetime(1998, 1, 19, 7, 0, 0, 0), TimeKind::Utc)),
            ("19970630T235960Z", CalDateTime::new(civil::datetime(1997, 6, 30, 23, 59, 59, 0), TimeKind::Utc)),
        ];
        for (src, expected) in success_cases {
            assert_eq!(src.parse::<CalDateTime>().unwrap(), expected, "{src}");
        }

        let fail_cases = [
            "20241301",         // invalid month
            "20240230",         // invalid day for February
            "19970714T250000",  // invalid hour
            "19970714T126000",  // invalid minute
            "19970714 133000",  // missing 'T'
            "1997071",          // truncated
            "19970714T133000ZZ",
            "",
        ];
        for src in fail_cases {
            assert!(src.parse::<CalDateTime>().is_err(), "{src} should fail");
        }
    }

    #[test]
    fn displays_date_time_literals() {
        let cases = [
            "19970714",
            "19980118T230000",
            "19980119T070000Z",
        ];
        for src in cases {
            let parsed: CalDateTime = src.parse().unwrap();
            assert_eq!(parsed.to_string(), src);
        }
    }

    #[test]
    fn orders_by_civil_value() {
        let a: CalDateTime = "20250101T090000Z".parse().unwrap();
        let b: CalDateTime = "20250101T100000".parse().unwrap();
        let c: CalDateTime = "20250102".parse().unwrap();
        assert!(a < b);
        assert!(b < c);
        // Same civil value, different kinds: unequal but ordered.
        let d: CalDateTime = "20250101T090000".parse().unwrap();
        assert_ne!(a, d);
        assert!(d < a);
    }

    #[test]
    fn zone_identity_is_carried() {
        let floating: CalDateTime = "20250101T090000".parse().unwrap();
        let zoned = floating.clone().with_zone("America/New_York");
        assert_eq!(
            zoned.kind(),
            &TimeKind::Zoned("America/New_York".to_owned())
        );
        // Already-UTC values are left alone.
        let utc: CalDateTime = "20250101T090000Z".parse().unwrap();
        assert_eq!(utc.with_zone("America/New_York").kind(), &TimeKind::Utc);
    }
}
