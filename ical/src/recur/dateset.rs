// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Ordered date-time sets and RDATE/EXDATE reconciliation.

use crate::datetime::CalDateTime;

/// An ordered, deduplicated set of date-time values.
///
/// Backs RDATE and EXDATE properties and the reconciled occurrence set of
/// a component. Membership is exact date-time equality; there is no
/// same-day fuzzy matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateSet {
    values: Vec<CalDateTime>,
}

impl DateSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, keeping the set ordered. Returns whether the
    /// value was new.
    pub fn insert(&mut self, value: CalDateTime) -> bool {
        match self.values.binary_search(&value) {
            Ok(_) => false,
            Err(index) => {
                self.values.insert(index, value);
                true
            }
        }
    }

    /// Exact-match membership test.
    #[must_use]
    pub fn contains(&self, value: &CalDateTime) -> bool {
        self.values.binary_search(value).is_ok()
    }

    /// Number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The values in ascending order.
    pub fn iter(&self) -> std::slice::Iter<'_, CalDateTime> {
        self.values.iter()
    }

    /// The values in ascending order, as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[CalDateTime] {
        &self.values
    }

    /// All values of both sets.
    #[must_use]
    pub fn union(&self, other: &DateSet) -> DateSet {
        let mut values = Vec::with_capacity(self.len() + other.len());
        values.extend_from_slice(&self.values);
        values.extend_from_slice(&other.values);
        values.sort();
        values.dedup();
        DateSet { values }
    }

    /// The values of `self` not present in `other`.
    #[must_use]
    pub fn difference(&self, other: &DateSet) -> DateSet {
        DateSet {
            values: self
                .values
                .iter()
                .filter(|value| !other.contains(value))
                .cloned()
                .collect(),
        }
    }

    /// Drop values outside `start..=end`.
    pub(crate) fn clip(&mut self, start: &CalDateTime, end: &CalDateTime) {
        self.values.retain(|value| value >= start && value <= end);
    }
}

impl FromIterator<CalDateTime> for DateSet {
    fn from_iter<I: IntoIterator<Item = CalDateTime>>(iter: I) -> Self {
        let mut values: Vec<CalDateTime> = iter.into_iter().collect();
        values.sort();
        values.dedup();
        DateSet { values }
    }
}

impl IntoIterator for DateSet {
    type Item = CalDateTime;
    type IntoIter = std::vec::IntoIter<CalDateTime>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a DateSet {
    type Item = &'a CalDateTime;
    type IntoIter = std::slice::Iter<'a, CalDateTime>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Combine generated occurrences with explicit inclusions and
/// exclusions: `(generated ∪ rdate) − exdate`, ascending, deduplicated.
///
/// Exclusion is exact-match only. Absent sets are empty sets; the
/// operation never fails and is idempotent.
#[must_use]
pub fn reconcile(
    generated: impl IntoIterator<Item = CalDateTime>,
    rdate: &DateSet,
    exdate: &DateSet,
) -> DateSet {
    let base: DateSet = generated.into_iter().collect();
    base.union(rdate).difference(exdate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> CalDateTime {
        s.parse().unwrap()
    }

    fn set(values: &[&str]) -> DateSet {
        values.iter().map(|s| dt(s)).collect()
    }

    #[test]
    fn keeps_values_sorted_and_unique() {
        let mut dates = DateSet::new();
        assert!(dates.insert(dt("20250103T090000")));
        assert!(dates.insert(dt("20250101T090000")));
        assert!(!dates.insert(dt("20250101T090000")));
        assert_eq!(dates.len(), 2);
        assert_eq!(dates.as_slice()[0], dt("20250101T090000"));
    }

    #[test]
    fn reconciles_rdate_and_exdate() {
        // The DAILY;COUNT=3 example: add March 1, drop January 2.
        let generated = [
            dt("20250101T090000"),
            dt("20250102T090000"),
            dt("20250103T090000"),
        ];
        let rdate = set(&["20250301T090000"]);
        let exdate = set(&["20250102T090000"]);
        let result = reconcile(generated, &rdate, &exdate);
        assert_eq!(
            result.as_slice(),
            &[
                dt("20250101T090000"),
                dt("20250103T090000"),
                dt("20250301T090000"),
            ]
        );
    }

    #[test]
    fn reconcile_is_idempotent() {
        let generated = [dt("20250101T090000"), dt("20250102T090000")];
        let rdate = set(&["20250301T090000"]);
        let exdate = set(&["20250102T090000"]);
        let once = reconcile(generated.clone(), &rdate, &exdate);
        let twice = reconcile(once.clone(), &rdate, &exdate);
        assert_eq!(once, twice);
    }

    #[test]
    fn exclusion_is_exact_match_only() {
        // Same day, different time: not excluded.
        let generated = [dt("20250101T090000")];
        let exdate = set(&["20250101T100000"]);
        let result = reconcile(generated, &DateSet::new(), &exdate);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn empty_inputs_are_empty_sets() {
        let result = reconcile(Vec::new(), &DateSet::new(), &DateSet::new());
        assert!(result.is_empty());

        let rdate = set(&["20250101"]);
        let result = reconcile(Vec::new(), &rdate, &DateSet::new());
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn duplicate_rdate_entries_do_not_accumulate() {
        let generated = [dt("20250101T090000")];
        let rdate = set(&["20250101T090000"]);
        let result = reconcile(generated, &rdate, &DateSet::new());
        assert_eq!(result.len(), 1);
    }
}
