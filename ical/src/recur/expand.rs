// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Occurrence expansion: turning a rule and a seed date-time into the
//! ordered sequence of occurrences.
//!
//! The iterator materializes one period at a time. Each step advances the
//! period anchor by `interval` frequency units from the seed (multiplied,
//! not accumulated, so month-end constraining cannot drift), expands the
//! anchor through the BY* parts from coarse to fine, applies BYSETPOS to
//! the period's full candidate set, and then drains the set in ascending
//! order through the bound checks.

use jiff::civil::{self, DateTime};
use jiff::{Span, ToSpan};

use crate::datetime::{self, CalDateTime, TimeKind};
use crate::recur::rule::{Bound, Frequency, RecurrenceRule, WeekdayNum};

/// Errors raised when constructing an occurrence iterator.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    /// The rule has no COUNT or UNTIL bound and no window was supplied.
    #[error("rule is unbounded and no iteration window was supplied")]
    UnboundedWithoutWindow,
}

/// An inclusive iteration window.
///
/// Required for rules without a COUNT or UNTIL bound; optional otherwise,
/// in which case it further clips the sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// Earliest date-time to emit, inclusive.
    pub start: CalDateTime,
    /// Latest date-time to emit, inclusive.
    pub end: CalDateTime,
}

impl Window {
    /// A window spanning `start..=end`.
    #[must_use]
    pub fn new(start: CalDateTime, end: CalDateTime) -> Self {
        Self { start, end }
    }
}

impl RecurrenceRule {
    /// The occurrences of this rule anchored at `seed`, in ascending
    /// order, lazily generated.
    ///
    /// The seed's time of day and time reckoning are carried onto every
    /// occurrence; the seed itself appears only if it satisfies the
    /// rule's filters. Occurrences clipped off by `window.start` still
    /// count against a COUNT bound.
    ///
    /// # Errors
    ///
    /// [`ExpandError::UnboundedWithoutWindow`] when the rule has no
    /// bound and no window is given; the alternative would be an
    /// eagerly infinite sequence.
    pub fn occurrences(
        &self,
        seed: &CalDateTime,
        window: Option<&Window>,
    ) -> Result<Occurrences<'_>, ExpandError> {
        if matches!(self.bound(), Bound::Unbounded) && window.is_none() {
            return Err(ExpandError::UnboundedWithoutWindow);
        }

        let unit = match self.frequency() {
            Frequency::Secondly => 1.second(),
            Frequency::Minutely => 1.minute(),
            Frequency::Hourly => 1.hour(),
            Frequency::Daily => 1.day(),
            Frequency::Weekly => 1.week(),
            Frequency::Monthly => 1.month(),
            Frequency::Yearly => 1.year(),
        };
        let until = match self.bound() {
            Bound::Until(until) => Some(until.datetime()),
            _ => None,
        };
        let remaining = match self.bound() {
            Bound::Count(count) => Some(*count),
            _ => None,
        };
        let window = window.map(|w| (w.start.datetime(), w.end.datetime()));
        let limit = match (until, window.map(|(_, end)| end)) {
            (Some(u), Some(e)) => Some(u.min(e)),
            (Some(u), None) => Some(u),
            (None, Some(e)) => Some(e),
            (None, None) => None,
        };

        Ok(Occurrences {
            rule: self,
            seed: seed.datetime(),
            kind: seed.kind().clone(),
            unit,
            set: CandidateSet::default(),
            cur: Some((0, seed.datetime())),
            remaining,
            until,
            window,
            limit,
        })
    }
}

/// Lazy, ordered iterator over a rule's occurrences.
///
/// A pure function of (rule, seed, window): re-creating it always
/// reproduces the same sequence.
#[derive(Debug, Clone)]
pub struct Occurrences<'r> {
    rule: &'r RecurrenceRule,
    seed: DateTime,
    kind: TimeKind,
    /// One frequency unit; the advance for period `i` is `unit * i *
    /// interval` applied to the seed.
    unit: Span,
    /// The current period's candidates, descending so `pop` ascends.
    set: CandidateSet,
    /// Period index and anchor; `None` once advancing is done.
    cur: Option<(i64, DateTime)>,
    /// COUNT budget, if any.
    remaining: Option<u32>,
    until: Option<DateTime>,
    window: Option<(DateTime, DateTime)>,
    /// Earliest of UNTIL and window end; bounds the period scan.
    limit: Option<DateTime>,
}

impl Occurrences<'_> {
    fn halt(&mut self) {
        self.cur = None;
        self.set.clear();
    }

    /// Next period anchor, skipping anchors whose day of month was
    /// constrained away (e.g. Jan 31 + 1 month) unless a BY* part
    /// selects dates itself.
    fn advance(&self) -> Option<(i64, DateTime)> {
        let (mut attempt, orig) = self.cur?;
        loop {
            attempt = attempt.checked_add(1)?;
            let steps = attempt.checked_mul(i64::from(self.rule.interval()))?;
            let span = self.unit.checked_mul(steps).ok()?;
            let next = self.seed.checked_add(span).ok()?;

            if let Some(limit) = self.limit {
                if period_floor(self.rule, next) > limit {
                    return None;
                }
            }

            match self.rule.frequency() {
                Frequency::Yearly if next.day() != orig.day() => {
                    if !self.rule.has_date_selectors() {
                        continue;
                    }
                }
                Frequency::Monthly if next.day() != orig.day() => {
                    if self.rule.by_day().is_empty() && self.rule.by_month_day().is_empty() {
                        continue;
                    }
                }
                _ => {}
            }
            return Some((attempt, next));
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = CalDateTime;

    fn next(&mut self) -> Option<CalDateTime> {
        if self.remaining == Some(0) {
            return None;
        }
        loop {
            while let Some(dt) = self.set.pop() {
                // Expansion can produce candidates before the seed in
                // the first period; RFC semantics start at the seed.
                if dt < self.seed {
                    continue;
                }
                if self.until.is_some_and(|until| dt > until) {
                    self.halt();
                    return None;
                }
                if let Some((_, end)) = self.window {
                    if dt > end {
                        self.halt();
                        return None;
                    }
                }
                if let Some(remaining) = self.remaining.as_mut() {
                    *remaining -= 1;
                }
                if let Some((start, _)) = self.window {
                    if dt < start {
                        if self.remaining == Some(0) {
                            return None;
                        }
                        continue;
                    }
                }
                return Some(CalDateTime::new(dt, self.kind.clone()));
            }

            let (_, anchor) = self.cur?;
            tracing::trace!(anchor = %anchor, "expanding period");
            Expander {
                rule: self.rule,
                seed: self.seed,
                cur: anchor,
            }
            .expand(&mut self.set);
            self.cur = self.advance();
        }
    }
}

impl std::iter::FusedIterator for Occurrences<'_> {}

/// Earliest civil date-time any candidate of the period containing `dt`
/// can take. Used to stop the period scan once past the limit.
fn period_floor(rule: &RecurrenceRule, dt: DateTime) -> DateTime {
    let midnight = civil::Time::midnight();
    match rule.frequency() {
        Frequency::Yearly => dt.first_of_year().date().to_datetime(midnight),
        Frequency::Monthly => dt.first_of_month().date().to_datetime(midnight),
        Frequency::Weekly => {
            datetime::first_of_week(dt.date(), rule.week_start()).to_datetime(midnight)
        }
        _ => dt.date().to_datetime(midnight),
    }
}

/// Expands one period anchor into the period's candidate set.
///
/// Follows the expand/limit table of RFC 5545 Section 3.3.10: BY* parts
/// at or above the frequency's granularity restrict the anchor, parts
/// below it multiply candidates; absent parts leave the anchor's own
/// fields (inherited from the seed) in place.
#[derive(Clone, Copy, Debug)]
struct Expander<'r> {
    rule: &'r RecurrenceRule,
    seed: DateTime,
    cur: DateTime,
}

impl Expander<'_> {
    fn expand(&self, set: &mut CandidateSet) {
        match self.rule.frequency() {
            Frequency::Yearly => self.yearly(set),
            Frequency::Monthly => self.monthly(set),
            Frequency::Weekly => self.weekly(set),
            Frequency::Daily => self.daily(set),
            Frequency::Hourly => self.hourly(set),
            Frequency::Minutely => self.minutely(set),
            Frequency::Secondly => self.secondly(set),
        }
        set.canonicalize();
        // BYSETPOS indexes the period's complete expanded set, so it
        // must run after every other part and before bound filtering.
        if !self.rule.by_set_pos().is_empty() {
            set.apply_set_pos(self.rule.by_set_pos());
        }
    }

    fn yearly(&self, set: &mut CandidateSet) {
        set.insert(self.cur);
        if !self.rule.by_day().is_empty() {
            if !self.rule.by_week_no().is_empty() {
                self.expand_by_week(set);
                self.expand_by_day_weekly(set);
                self.limit_by_month(set);
            } else if !self.rule.by_month().is_empty() {
                self.expand_by_month(set);
                self.expand_by_day_monthly(set);
            } else {
                self.expand_by_day_yearly(set);
            }
            self.limit_by_year_day(set);
            self.limit_by_month_day(set);
        } else if !self.rule.by_week_no().is_empty() {
            self.expand_by_week(set);
            // A bare BYWEEKNO selects every day of the week, not just
            // the seed's weekday.
            set.expand(|dt| (0i64..7).filter_map(move |n| dt.checked_add(n.days()).ok()));
            self.limit_by_month(set);
            self.limit_by_year_day(set);
            self.limit_by_month_day(set);
        } else if !self.rule.by_month().is_empty() {
            self.expand_by_month(set);
            self.expand_by_month_day(set);
            self.limit_by_year_day(set);
        } else if !self.rule.by_month_day().is_empty() {
            // Fan out to every month on the 1st; the month-day expansion
            // below picks the real day.
            set.expand(|dt| {
                (1i8..=12).filter_map(move |month| dt.with().month(month).day(1).build().ok())
            });
            self.expand_by_month_day(set);
            self.limit_by_year_day(set);
        } else if !self.rule.by_year_day().is_empty() {
            self.expand_by_year_day(set);
        }
        self.expand_by_hour(set);
        self.expand_by_minute(set);
        self.expand_by_second(set);
    }

    fn monthly(&self, set: &mut CandidateSet) {
        if !self.satisfies_by_month(self.cur) {
            return;
        }
        set.insert(self.cur);
        if !self.rule.by_day().is_empty() {
            self.expand_by_day_monthly(set);
            self.limit_by_month_day(set);
        } else {
            self.expand_by_month_day(set);
        }
        self.expand_by_hour(set);
        self.expand_by_minute(set);
        self.expand_by_second(set);
    }

    fn weekly(&self, set: &mut CandidateSet) {
        if !self.satisfies_by_month(self.cur) {
            return;
        }
        set.insert(self.cur);
        self.expand_by_day_weekly(set);
        self.expand_by_hour(set);
        self.expand_by_minute(set);
        self.expand_by_second(set);
    }

    fn daily(&self, set: &mut CandidateSet) {
        if !self.satisfies_by_month(self.cur)
            || !self.satisfies_by_month_day(self.cur)
            || !self.satisfies_by_day(self.cur)
        {
            return;
        }
        set.insert(self.cur);
        self.expand_by_hour(set);
        self.expand_by_minute(set);
        self.expand_by_second(set);
    }

    fn hourly(&self, set: &mut CandidateSet) {
        if !self.satisfies_by_month(self.cur)
            || !self.satisfies_by_year_day(self.cur)
            || !self.satisfies_by_month_day(self.cur)
            || !self.satisfies_by_day(self.cur)
            || !self.satisfies_by_hour(self.cur)
        {
            return;
        }
        set.insert(self.cur);
        self.expand_by_minute(set);
        self.expand_by_second(set);
    }

    fn minutely(&self, set: &mut CandidateSet) {
        if !self.satisfies_by_month(self.cur)
            || !self.satisfies_by_year_day(self.cur)
            || !self.satisfies_by_month_day(self.cur)
            || !self.satisfies_by_day(self.cur)
            || !self.satisfies_by_hour(self.cur)
            || !self.satisfies_by_minute(self.cur)
        {
            return;
        }
        set.insert(self.cur);
        self.expand_by_second(set);
    }

    fn secondly(&self, set: &mut CandidateSet) {
        if !self.satisfies_by_month(self.cur)
            || !self.satisfies_by_year_day(self.cur)
            || !self.satisfies_by_month_day(self.cur)
            || !self.satisfies_by_day(self.cur)
            || !self.satisfies_by_hour(self.cur)
            || !self.satisfies_by_minute(self.cur)
            || !self.satisfies_by_second(self.cur)
        {
            return;
        }
        set.insert(self.cur);
    }

    fn satisfies_by_month(&self, dt: DateTime) -> bool {
        let by = self.rule.by_month();
        by.is_empty() || by.contains(&dt.month())
    }

    fn satisfies_by_year_day(&self, dt: DateTime) -> bool {
        let by = self.rule.by_year_day();
        if by.is_empty() {
            return true;
        }
        let positive = dt.day_of_year();
        // Minus one because -1 is the last day and days are 1-indexed.
        let negative = positive - 1 - dt.days_in_year();
        by.contains(&positive) || by.contains(&negative)
    }

    fn satisfies_by_month_day(&self, dt: DateTime) -> bool {
        let by = self.rule.by_month_day();
        if by.is_empty() {
            return true;
        }
        let positive = dt.day();
        let negative = positive - 1 - dt.days_in_month();
        by.contains(&positive) || by.contains(&negative)
    }

    /// Weekday match only; ordinals never apply at the frequencies this
    /// is called from (rule construction rejects them there).
    fn satisfies_by_day(&self, dt: DateTime) -> bool {
        let by = self.rule.by_day();
        if by.is_empty() {
            return true;
        }
        let weekday = datetime::day_of_week(dt.date());
        by.iter().any(|entry| entry.weekday == weekday)
    }

    fn satisfies_by_hour(&self, dt: DateTime) -> bool {
        let by = self.rule.by_hour();
        by.is_empty() || by.contains(&dt.hour())
    }

    fn satisfies_by_minute(&self, dt: DateTime) -> bool {
        let by = self.rule.by_minute();
        by.is_empty() || by.contains(&dt.minute())
    }

    fn satisfies_by_second(&self, dt: DateTime) -> bool {
        let by = self.rule.by_second();
        by.is_empty() || by.contains(&dt.second())
    }

    fn limit_by_month(&self, set: &mut CandidateSet) {
        if self.rule.by_month().is_empty() {
            return;
        }
        set.retain(|dt| self.satisfies_by_month(*dt));
    }

    fn limit_by_year_day(&self, set: &mut CandidateSet) {
        if self.rule.by_year_day().is_empty() {
            return;
        }
        set.retain(|dt| self.satisfies_by_year_day(*dt));
    }

    fn limit_by_month_day(&self, set: &mut CandidateSet) {
        if self.rule.by_month_day().is_empty() {
            return;
        }
        set.retain(|dt| self.satisfies_by_month_day(*dt));
    }

    fn expand_by_month(&self, set: &mut CandidateSet) {
        if self.rule.by_month().is_empty() {
            return;
        }
        // Pull the day from the seed, not the anchor: the anchor's day
        // may have been constrained (Feb 29 seeds). When a later part
        // overrides the day anyway, pin the 1st so short months are not
        // dropped before that part runs.
        let day = if self.rule.by_month_day().is_empty() && self.rule.by_day().is_empty() {
            self.seed.day()
        } else {
            1
        };
        set.expand(|dt| {
            self.rule
                .by_month()
                .iter()
                .copied()
                .filter_map(move |month| dt.with().month(month).day(day).build().ok())
        });
    }

    fn expand_by_week(&self, set: &mut CandidateSet) {
        if self.rule.by_week_no().is_empty() {
            return;
        }
        let week_start = self.rule.week_start();
        set.expand(|dt| {
            let year = dt.year();
            let weeks = datetime::weeks_in_year(year, week_start);
            self.rule
                .by_week_no()
                .iter()
                .copied()
                .filter_map(move |mut week| {
                    if week < 0 {
                        // Plus one because -1 is the last week and weeks
                        // are 1-indexed.
                        week = weeks + week + 1;
                    }
                    let start = datetime::week_start_date(year, week, week_start)?;
                    dt.with().date(start).build().ok()
                })
        });
    }

    fn expand_by_year_day(&self, set: &mut CandidateSet) {
        if self.rule.by_year_day().is_empty() {
            return;
        }
        set.expand(|dt| {
            let days_in_year = dt.days_in_year();
            self.rule
                .by_year_day()
                .iter()
                .copied()
                .filter_map(move |mut day| {
                    if day < 0 {
                        day = days_in_year.checked_add(day + 1)?;
                    }
                    dt.with().day_of_year(day).build().ok()
                })
        });
    }

    fn expand_by_month_day(&self, set: &mut CandidateSet) {
        if self.rule.by_month_day().is_empty() {
            return;
        }
        set.expand(|dt| {
            let days_in_month = dt.days_in_month();
            self.rule
                .by_month_day()
                .iter()
                .copied()
                .filter_map(move |mut day| {
                    if day < 0 {
                        day = days_in_month.checked_add(day + 1)?;
                    }
                    // Nonexistent targets (Apr 31) fail to build and are
                    // silently skipped for this period.
                    dt.with().day(day).build().ok()
                })
        });
    }

    fn expand_by_day_yearly(&self, set: &mut CandidateSet) {
        if self.rule.by_day().is_empty() {
            return;
        }
        set.expand(|dt| {
            let start = dt.first_of_year();
            let end = dt.last_of_year();
            self.rule
                .by_day()
                .iter()
                .copied()
                .flat_map(move |entry| weekday_num_candidates(entry, start, end))
        });
    }

    fn expand_by_day_monthly(&self, set: &mut CandidateSet) {
        if self.rule.by_day().is_empty() {
            return;
        }
        set.expand(|dt| {
            let start = dt.first_of_month();
            let end = dt.last_of_month();
            self.rule
                .by_day()
                .iter()
                .copied()
                .flat_map(move |entry| weekday_num_candidates(entry, start, end))
        });
    }

    fn expand_by_day_weekly(&self, set: &mut CandidateSet) {
        if self.rule.by_day().is_empty() {
            return;
        }
        let week_start = self.rule.week_start();
        set.expand(|dt| {
            let start = datetime::first_of_week(dt.date(), week_start).to_datetime(dt.time());
            let end = datetime::last_of_week(dt.date(), week_start).to_datetime(dt.time());
            self.rule
                .by_day()
                .iter()
                .copied()
                .flat_map(move |entry| weekday_num_candidates(entry, start, end))
        });
    }

    fn expand_by_hour(&self, set: &mut CandidateSet) {
        if self.rule.by_hour().is_empty() {
            return;
        }
        set.expand(|dt| {
            self.rule
                .by_hour()
                .iter()
                .copied()
                .filter_map(move |hour| dt.with().hour(hour).build().ok())
        });
    }

    fn expand_by_minute(&self, set: &mut CandidateSet) {
        if self.rule.by_minute().is_empty() {
            return;
        }
        set.expand(|dt| {
            self.rule
                .by_minute()
                .iter()
                .copied()
                .filter_map(move |minute| dt.with().minute(minute).build().ok())
        });
    }

    fn expand_by_second(&self, set: &mut CandidateSet) {
        if self.rule.by_second().is_empty() {
            return;
        }
        set.expand(|dt| {
            self.rule
                .by_second()
                .iter()
                .copied()
                .filter_map(move |second| dt.with().second(second).build().ok())
        });
    }
}

/// Two-armed iterator, for branches that build different iterator types.
enum Either<L, R> {
    Left(L),
    Right(R),
}

impl<L, R, I> Iterator for Either<L, R>
where
    L: Iterator<Item = I>,
    R: Iterator<Item = I>,
{
    type Item = I;

    fn next(&mut self) -> Option<I> {
        match self {
            Either::Left(iter) => iter.next(),
            Either::Right(iter) => iter.next(),
        }
    }
}

/// Candidates a single BYDAY entry contributes within `start..=end`.
///
/// An ordinal entry contributes at most one date: the nth matching
/// weekday counted from the start (positive) or the end (negative) of
/// the range. An entry without ordinal contributes every matching
/// weekday in the range.
fn weekday_num_candidates(
    entry: WeekdayNum,
    start: DateTime,
    end: DateTime,
) -> impl Iterator<Item = DateTime> {
    let weekday = entry.weekday.to_civil();
    match entry.ordinal {
        None => Either::Left(weekdays_between(weekday, start, end)),
        Some(nth) => Either::Right(nth_weekday_in(nth, weekday, start, end).into_iter()),
    }
}

/// The nth weekday within `start..=end`, or `None` when the range has
/// fewer matching weekdays than `|nth|`.
fn nth_weekday_in(
    nth: i8,
    weekday: civil::Weekday,
    start: DateTime,
    end: DateTime,
) -> Option<DateTime> {
    if nth > 0 {
        let mut n = i32::from(nth);
        if start.weekday() == weekday {
            n -= 1;
        }
        if n == 0 {
            return Some(start);
        }
        let dt = start.nth_weekday(n, weekday).ok()?;
        (dt <= end).then_some(dt)
    } else {
        let mut n = i32::from(nth);
        if end.weekday() == weekday {
            n += 1;
        }
        if n == 0 {
            return Some(end);
        }
        let dt = end.nth_weekday(n, weekday).ok()?;
        (dt >= start).then_some(dt)
    }
}

/// Every date with the given weekday between `start` and `end`,
/// inclusive, carrying the start's time of day.
fn weekdays_between(
    weekday: civil::Weekday,
    start: DateTime,
    end: DateTime,
) -> impl Iterator<Item = DateTime> {
    (start.weekday() == weekday)
        .then_some(start)
        .into_iter()
        .chain({
            let mut cur = start.nth_weekday(1, weekday).ok();
            std::iter::from_fn(move || {
                let next = cur.take()?;
                if next > end {
                    return None;
                }
                cur = next.nth_weekday(1, weekday).ok();
                Some(next)
            })
        })
}

/// One period's worth of candidates.
///
/// Kept descending so `pop` yields candidates in ascending order without
/// shifting the vector.
#[derive(Debug, Clone, Default)]
struct CandidateSet {
    items: Vec<DateTime>,
}

impl CandidateSet {
    fn insert(&mut self, dt: DateTime) {
        self.items.push(dt);
    }

    fn clear(&mut self) {
        self.items.clear();
    }

    fn pop(&mut self) -> Option<DateTime> {
        self.items.pop()
    }

    fn retain(&mut self, keep: impl FnMut(&DateTime) -> bool) {
        self.items.retain(keep);
    }

    /// Replace every candidate with its expansion.
    fn expand<E, I>(&mut self, expand: E)
    where
        E: Fn(DateTime) -> I,
        I: Iterator<Item = DateTime>,
    {
        let len = self.items.len();
        for i in 0..len {
            let expanded = expand(self.items[i]);
            self.items.extend(expanded);
        }
        self.items.drain(..len);
    }

    fn canonicalize(&mut self) {
        self.items.sort_unstable_by(|a, b| b.cmp(a));
        self.items.dedup();
    }

    /// Keep only the positions BYSETPOS names, 1-based from the front,
    /// negative from the back of the ascending set.
    fn apply_set_pos(&mut self, positions: &[i16]) {
        self.items.sort_unstable();
        self.items.dedup();
        let len = self.items.len() as i64;
        let mut index: i64 = 0;
        self.items.retain(|_| {
            let positive = index + 1;
            let negative = positive - 1 - len;
            index += 1;
            positions
                .iter()
                .any(|&p| i64::from(p) == positive || i64::from(p) == negative)
        });
        self.items.reverse();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(s: &str) -> CalDateTime {
        s.parse().unwrap()
    }

    fn rule(s: &str) -> RecurrenceRule {
        s.parse().unwrap()
    }

    fn expand(rule_text: &str, seed_text: &str, take: usize) -> Vec<String> {
        rule(rule_text)
            .occurrences(&seed(seed_text), None)
            .unwrap()
            .take(take)
            .map(|dt| dt.to_string())
            .collect()
    }

    #[test]
    fn daily_count() {
        assert_eq!(
            expand("FREQ=DAILY;COUNT=3", "20250101T090000", 10),
            ["20250101T090000", "20250102T090000", "20250103T090000"]
        );
    }

    #[test]
    fn daily_interval() {
        assert_eq!(
            expand("FREQ=DAILY;INTERVAL=10;COUNT=5", "19970902T090000Z", 10),
            [
                "19970902T090000Z",
                "19970912T090000Z",
                "19970922T090000Z",
                "19971002T090000Z",
                "19971012T090000Z",
            ]
        );
    }

    #[test]
    fn daily_until_is_inclusive() {
        let occurrences = expand(
            "FREQ=DAILY;UNTIL=19970905T090000Z",
            "19970902T090000Z",
            100,
        );
        assert_eq!(
            occurrences,
            [
                "19970902T090000Z",
                "19970903T090000Z",
                "19970904T090000Z",
                "19970905T090000Z",
            ]
        );
    }

    #[test]
    fn count_yields_strictly_increasing() {
        let rule = rule("FREQ=MONTHLY;COUNT=24;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=1");
        let seed = seed("20240101T080000");
        let occurrences: Vec<_> = rule.occurrences(&seed, None).unwrap().collect();
        assert_eq!(occurrences.len(), 24);
        for pair in occurrences.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn weekly_on_tuesday_and_thursday() {
        assert_eq!(
            expand(
                "FREQ=WEEKLY;UNTIL=19971007T000000Z;WKST=SU;BYDAY=TU,TH",
                "19970902T090000Z",
                100
            ),
            [
                "19970902T090000Z",
                "19970904T090000Z",
                "19970909T090000Z",
                "19970911T090000Z",
                "19970916T090000Z",
                "19970918T090000Z",
                "19970923T090000Z",
                "19970925T090000Z",
                "19970930T090000Z",
                "19971002T090000Z",
            ]
        );
    }

    #[test]
    fn biweekly_week_start_changes_weeks() {
        // RFC 5545: the WKST rule part alters which days fall in an
        // "on" week for an every-other-week rule.
        assert_eq!(
            expand(
                "FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU;WKST=MO",
                "19970805T090000",
                10
            ),
            [
                "19970805T090000",
                "19970810T090000",
                "19970819T090000",
                "19970824T090000",
            ]
        );
        assert_eq!(
            expand(
                "FREQ=WEEKLY;INTERVAL=2;COUNT=4;BYDAY=TU,SU;WKST=SU",
                "19970805T090000",
                10
            ),
            [
                "19970805T090000",
                "19970817T090000",
                "19970819T090000",
                "19970831T090000",
            ]
        );
    }

    #[test]
    fn monthly_last_friday() {
        assert_eq!(
            expand("FREQ=MONTHLY;COUNT=4;BYDAY=-1FR", "20240101T120000", 10),
            [
                "20240126T120000",
                "20240223T120000",
                "20240329T120000",
                "20240426T120000",
            ]
        );
    }

    #[test]
    fn monthly_first_and_last_sunday() {
        assert_eq!(
            expand(
                "FREQ=MONTHLY;INTERVAL=2;COUNT=6;BYDAY=1SU,-1SU",
                "19970907T023000",
                10
            ),
            [
                "19970907T023000",
                "19970928T023000",
                "19971102T023000",
                "19971130T023000",
                "19980104T023000",
                "19980125T023000",
            ]
        );
    }

    #[test]
    fn monthly_short_months_skip_missing_days() {
        // The 31st simply does not occur in 30-day months.
        assert_eq!(
            expand("FREQ=MONTHLY;COUNT=4;BYMONTHDAY=31", "20250131T080000", 10),
            [
                "20250131T080000",
                "20250331T080000",
                "20250531T080000",
                "20250731T080000",
            ]
        );
    }

    #[test]
    fn monthly_negative_month_day() {
        assert_eq!(
            expand("FREQ=MONTHLY;COUNT=3;BYMONTHDAY=-1", "20250101T070000", 10),
            ["20250131T070000", "20250228T070000", "20250331T070000"]
        );
    }

    #[test]
    fn monthly_from_month_end_skips_constrained_anchors() {
        // Seeded on Jan 31 with no date-selecting parts, only 31-day
        // months recur.
        assert_eq!(
            expand("FREQ=MONTHLY;COUNT=4", "20250131T100000", 10),
            [
                "20250131T100000",
                "20250331T100000",
                "20250531T100000",
                "20250731T100000",
            ]
        );
    }

    #[test]
    fn yearly_leap_day_skips_common_years() {
        assert_eq!(
            expand(
                "FREQ=YEARLY;COUNT=3;BYMONTH=2;BYMONTHDAY=29",
                "20240229T120000",
                10
            ),
            ["20240229T120000", "20280229T120000", "20320229T120000"]
        );
    }

    #[test]
    fn yearly_plain_leap_day_seed() {
        assert_eq!(
            expand("FREQ=YEARLY;COUNT=3", "20240229T120000", 10),
            ["20240229T120000", "20280229T120000", "20320229T120000"]
        );
    }

    #[test]
    fn yearly_by_month_recurs_on_seed_day() {
        assert_eq!(
            expand("FREQ=YEARLY;COUNT=6;BYMONTH=6,7", "19970610T090000", 10),
            [
                "19970610T090000",
                "19970710T090000",
                "19980610T090000",
                "19980710T090000",
                "19990610T090000",
                "19990710T090000",
            ]
        );
    }

    #[test]
    fn yearly_negative_year_day() {
        assert_eq!(
            expand("FREQ=YEARLY;COUNT=3;BYYEARDAY=-1", "20240101T000000", 10),
            ["20241231T000000", "20251231T000000", "20261231T000000"]
        );
    }

    #[test]
    fn yearly_day_366_only_in_leap_years() {
        assert_eq!(
            expand("FREQ=YEARLY;COUNT=2;BYYEARDAY=366", "20240101T000000", 10),
            ["20241231T000000", "20281231T000000"]
        );
    }

    #[test]
    fn yearly_week_no_monday() {
        assert_eq!(
            expand("FREQ=YEARLY;COUNT=3;BYWEEKNO=20;BYDAY=MO", "19970512T090000", 10),
            ["19970512T090000", "19980511T090000", "19990517T090000"]
        );
    }

    #[test]
    fn yearly_twentieth_monday() {
        assert_eq!(
            expand("FREQ=YEARLY;COUNT=3;BYDAY=20MO", "19970519T090000", 10),
            ["19970519T090000", "19980518T090000", "19990517T090000"]
        );
    }

    #[test]
    fn yearly_last_monday_of_leap_year() {
        // 2024 starts on a Monday and ends on a Tuesday; the last Monday
        // is Dec 30, not Dec 31.
        assert_eq!(
            expand("FREQ=YEARLY;COUNT=1;BYDAY=-1MO", "20240101T090000", 10),
            ["20241230T090000"]
        );
    }

    #[test]
    fn last_workday_of_month() {
        assert_eq!(
            expand(
                "FREQ=MONTHLY;COUNT=3;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1",
                "20250101T170000",
                10
            ),
            ["20250131T170000", "20250228T170000", "20250331T170000"]
        );
    }

    #[test]
    fn set_pos_with_ordinal_by_day() {
        // BYSETPOS applies to the already-reduced set: the second Monday
        // is the only candidate, and -1 selects it.
        assert_eq!(
            expand(
                "FREQ=MONTHLY;COUNT=2;BYDAY=2MO;BYSETPOS=-1",
                "20250101T080000",
                10
            ),
            ["20250113T080000", "20250210T080000"]
        );
    }

    #[test]
    fn hourly_with_by_minute() {
        assert_eq!(
            expand(
                "FREQ=HOURLY;INTERVAL=3;COUNT=4;BYMINUTE=0,30",
                "20250101T090000",
                10
            ),
            [
                "20250101T090000",
                "20250101T093000",
                "20250101T120000",
                "20250101T123000",
            ]
        );
    }

    #[test]
    fn minutely_simple() {
        assert_eq!(
            expand("FREQ=MINUTELY;INTERVAL=15;COUNT=3", "20250101T090000", 10),
            ["20250101T090000", "20250101T091500", "20250101T093000"]
        );
    }

    #[test]
    fn daily_by_hour_expands_within_day() {
        assert_eq!(
            expand("FREQ=DAILY;COUNT=4;BYHOUR=9,16", "20250101T090000", 10),
            [
                "20250101T090000",
                "20250101T160000",
                "20250102T090000",
                "20250102T160000",
            ]
        );
    }

    #[test]
    fn seed_not_matching_filters_is_not_forced() {
        // Jan 1 2025 is a Wednesday; a MO-only weekly rule starts on
        // the following Monday.
        assert_eq!(
            expand("FREQ=WEEKLY;COUNT=2;BYDAY=MO", "20250101T100000", 10),
            ["20250106T100000", "20250113T100000"]
        );
    }

    #[test]
    fn date_only_seed_yields_date_only_occurrences() {
        let occurrences: Vec<CalDateTime> = rule("FREQ=DAILY;COUNT=2")
            .occurrences(&seed("20250101"), None)
            .unwrap()
            .collect();
        assert!(occurrences.iter().all(CalDateTime::is_date_only));
        assert_eq!(occurrences[1].to_string(), "20250102");
    }

    #[test]
    fn unbounded_requires_window() {
        let rule = rule("FREQ=DAILY");
        let result = rule.occurrences(&seed("20250101T090000"), None);
        assert_eq!(result.unwrap_err(), ExpandError::UnboundedWithoutWindow);
    }

    #[test]
    fn unbounded_with_window_clips_inclusively() {
        let window = Window::new(seed("20250103T090000"), seed("20250105T090000"));
        let rule = rule("FREQ=DAILY");
        let occurrences: Vec<String> = rule
            .occurrences(&seed("20250101T090000"), Some(&window))
            .unwrap()
            .map(|dt| dt.to_string())
            .collect();
        assert_eq!(
            occurrences,
            ["20250103T090000", "20250104T090000", "20250105T090000"]
        );
    }

    #[test]
    fn window_clipped_occurrences_still_consume_count() {
        let window = Window::new(seed("20250103T000000"), seed("20250131T000000"));
        let rule = rule("FREQ=DAILY;COUNT=5");
        let occurrences: Vec<String> = rule
            .occurrences(&seed("20250101T090000"), Some(&window))
            .unwrap()
            .map(|dt| dt.to_string())
            .collect();
        // Jan 1 and Jan 2 count against COUNT=5 but fall before the
        // window.
        assert_eq!(
            occurrences,
            ["20250103T090000", "20250104T090000", "20250105T090000"]
        );
    }

    #[test]
    fn iteration_is_restartable() {
        let rule = rule("FREQ=MONTHLY;COUNT=12;BYDAY=2TU");
        let seed = seed("20250101T090000");
        let first: Vec<_> = rule.occurrences(&seed, None).unwrap().collect();
        let second: Vec<_> = rule.occurrences(&seed, None).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn occurrences_carry_seed_kind() {
        let zoned = seed("20250101T090000").with_zone("Europe/Berlin");
        let occurrences: Vec<CalDateTime> = rule("FREQ=DAILY;COUNT=2")
            .occurrences(&zoned, None)
            .unwrap()
            .collect();
        assert!(occurrences
            .iter()
            .all(|dt| dt.kind() == &TimeKind::Zoned("Europe/Berlin".to_owned())));
    }
}
