// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Round-trip tests: parsing, formatting, and parsing again must yield
//! an equivalent component tree.

use kalends_ical::formatter::{FormatOptions, format};
use kalends_ical::{Component, ComponentKind, PropertyKind};

fn round_trip(src: &str) -> (Vec<Component>, Vec<Component>) {
    let first = Component::parse(src).unwrap();
    let formatted: String = first.iter().map(|c| format(c).unwrap()).collect();
    let second = Component::parse(&formatted).unwrap();
    (first, second)
}

#[test]
fn round_trips_a_simple_calendar() {
    let src = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example Corp.//Cal Client 1.0//EN\r\n\
BEGIN:VEVENT\r\n\
UID:12345@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
DTSTART:20250110T140000Z\r\n\
DTEND:20250110T150000Z\r\n\
SUMMARY:Test Event\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
    let (first, second) = round_trip(src);
    assert_eq!(first, second);
}

#[test]
fn round_trips_recurrence_properties() {
    let src = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:recurring@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
DTSTART;TZID=America/New_York:20250106T090000\r\n\
RRULE:FREQ=WEEKLY;BYDAY=MO,WE,FR;UNTIL=20251231T000000Z\r\n\
RDATE:20250704T090000\r\n\
EXDATE:20250120T090000\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
    let (first, second) = round_trip(src);
    assert_eq!(first, second);

    let event = &first[0].components[0];
    assert!(event.rrule().is_some());
    assert_eq!(event.rdate_set().len(), 1);
    assert_eq!(event.exdate_set().len(), 1);
}

#[test]
fn round_trips_escaped_text_and_folding() {
    let description = "Planning\\, budget\\; and a very long tail that pushes this \
content line well past the seventy-five octet folding limit of RFC 5545";
    let src = format!(
        "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:folded@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
DTSTART:20250110T140000Z\r\n\
DESCRIPTION:{description}\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n"
    );
    let (first, second) = round_trip(&src);
    assert_eq!(first, second);

    let formatted = format(&first[0]).unwrap();
    for line in formatted.split("\r\n") {
        assert!(line.len() <= 75, "unfolded line in output");
    }
}

#[test]
fn round_trips_date_only_values() {
    let src = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:allday@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
DTSTART;VALUE=DATE:20250201\r\n\
EXDATE;VALUE=DATE:20250203,20250204\r\n\
RRULE:FREQ=DAILY;COUNT=5\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
    let (first, second) = round_trip(src);
    assert_eq!(first, second);

    let event = &first[0].components[0];
    assert!(event.dt_start().unwrap().is_date_only());
}

#[test]
fn round_trips_nested_alarms() {
    let src = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:alarmed@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
DTSTART:20250110T140000Z\r\n\
BEGIN:VALARM\r\n\
ACTION:DISPLAY\r\n\
DESCRIPTION:Reminder\r\n\
TRIGGER:-PT15M\r\n\
END:VALARM\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
    let (first, second) = round_trip(src);
    assert_eq!(first, second);
    assert_eq!(first[0].components[0].components[0].kind, ComponentKind::Alarm);
}

#[test]
fn formatting_is_stable_across_a_second_pass() {
    let src = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Example//Example//EN\r\n\
BEGIN:VEVENT\r\n\
UID:stable@example.com\r\n\
DTSTAMP:20250110T120000Z\r\n\
DTSTART:20250110T140000Z\r\n\
RRULE:FREQ=MONTHLY;BYDAY=MO,TU,WE,TH,FR;BYSETPOS=-1\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";
    let first = Component::parse(src).unwrap();
    let once = format(&first[0]).unwrap();
    let twice = format(&Component::parse(&once).unwrap()[0]).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn unfolding_options_match_parser_expectations() {
    let src = "BEGIN:VEVENT\r\n\
UID:x@example.com\r\n\
DTSTAMP:20250101T000000Z\r\n\
SUMMARY:short\r\n\
END:VEVENT\r\n";
    let component = &Component::parse(src).unwrap()[0];
    let unfolded = FormatOptions::default()
        .folding(None)
        .write_to_string(component)
        .unwrap();
    assert_eq!(
        Component::parse(&unfolded).unwrap()[0]
            .property(&PropertyKind::Summary)
            .unwrap()
            .text(),
        Some("short")
    );
}
