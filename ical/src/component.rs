// SPDX-FileCopyrightText: 2026 Kalends Contributors
//
// SPDX-License-Identifier: Apache-2.0

//! Components (RFC 5545 Section 3.6): the BEGIN/END tree, table-driven
//! structural validation, property filtering, and the wiring from a
//! component's DTSTART/RRULE/RDATE/EXDATE to its reconciled occurrence
//! set.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::datetime::CalDateTime;
use crate::keyword::{KW_BEGIN, KW_END};
use crate::property::{Property, PropertyError, PropertyKind, PropertyValue};
use crate::recur::{DateSet, ExpandError, RecurrenceRule, Window, reconcile};
use crate::syntax::{self, SyntaxError};

/// Registry of component names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[expect(missing_docs)]
pub enum ComponentKind {
    #[strum(serialize = "VCALENDAR")]
    Calendar,
    #[strum(serialize = "VEVENT")]
    Event,
    #[strum(serialize = "VTODO")]
    Todo,
    #[strum(serialize = "VJOURNAL")]
    Journal,
    #[strum(serialize = "VFREEBUSY")]
    FreeBusy,
    #[strum(serialize = "VTIMEZONE")]
    TimeZone,
    #[strum(serialize = "VALARM")]
    Alarm,
    /// Any other component name.
    #[strum(default, to_string = "{0}")]
    Other(String),
}

/// A component: a kind, its properties, and nested components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// The component name.
    pub kind: ComponentKind,
    /// The component's properties, in source order.
    pub properties: Vec<Property>,
    /// Nested components, in source order.
    pub components: Vec<Component>,
}

/// Errors from building a component tree out of source text.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The content-line scan failed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A property value failed to parse.
    #[error(transparent)]
    Property(#[from] PropertyError),

    /// An `END` with no matching `BEGIN`.
    #[error("unmatched END:{name}")]
    UnmatchedEnd {
        /// The component name on the END line.
        name: String,
    },

    /// `END` closing a different component than the open one.
    #[error("mismatched nesting: expected END:{expected}, found END:{found}")]
    MismatchedEnd {
        /// The open component's name.
        expected: String,
        /// The name on the END line.
        found: String,
    },

    /// A `BEGIN` that was never closed.
    #[error("unclosed BEGIN:{name}")]
    UnclosedComponent {
        /// The unclosed component's name.
        name: String,
    },

    /// A property before any `BEGIN`.
    #[error("content line outside any component")]
    ContentOutsideComponent,
}

impl Component {
    /// An empty component of the given kind.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind,
            properties: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Parse source text into its top-level components.
    ///
    /// # Errors
    ///
    /// Any scan, property or nesting failure aborts with a
    /// [`ParseError`].
    pub fn parse(src: &str) -> Result<Vec<Component>, ParseError> {
        let lines = syntax::scan(src)?;
        let mut roots = Vec::new();
        let mut stack: Vec<Component> = Vec::new();

        for line in lines {
            if line.name == KW_BEGIN {
                let kind = ComponentKind::from_str(&line.value)
                    .unwrap_or(ComponentKind::Other(line.value));
                stack.push(Component::new(kind));
            } else if line.name == KW_END {
                let Some(component) = stack.pop() else {
                    return Err(ParseError::UnmatchedEnd { name: line.value });
                };
                let expected = component.kind.to_string();
                if expected != line.value {
                    return Err(ParseError::MismatchedEnd {
                        expected,
                        found: line.value,
                    });
                }
                match stack.last_mut() {
                    Some(parent) => parent.components.push(component),
                    None => roots.push(component),
                }
            } else {
                let property = Property::from_content_line(line)?;
                match stack.last_mut() {
                    Some(open) => open.properties.push(property),
                    None => return Err(ParseError::ContentOutsideComponent),
                }
            }
        }

        if let Some(open) = stack.pop() {
            return Err(ParseError::UnclosedComponent {
                name: open.kind.to_string(),
            });
        }
        Ok(roots)
    }

    /// The first property of the given kind.
    #[must_use]
    pub fn property(&self, kind: &PropertyKind) -> Option<&Property> {
        self.properties.iter().find(|p| &p.kind == kind)
    }

    /// All properties of the given kind.
    pub fn properties_of<'a>(
        &'a self,
        kind: &'a PropertyKind,
    ) -> impl Iterator<Item = &'a Property> {
        self.properties.iter().filter(move |p| &p.kind == kind)
    }

    /// The DTSTART seed, if present.
    #[must_use]
    pub fn dt_start(&self) -> Option<&CalDateTime> {
        self.property(&PropertyKind::DtStart)?
            .date_times()?
            .first()
    }

    /// The RRULE, if present.
    #[must_use]
    pub fn rrule(&self) -> Option<&RecurrenceRule> {
        self.property(&PropertyKind::RRule)?.rule()
    }

    /// All RDATE values as a set.
    #[must_use]
    pub fn rdate_set(&self) -> DateSet {
        self.date_property_set(&PropertyKind::RDate)
    }

    /// All EXDATE values as a set.
    #[must_use]
    pub fn exdate_set(&self) -> DateSet {
        self.date_property_set(&PropertyKind::ExDate)
    }

    fn date_property_set(&self, kind: &PropertyKind) -> DateSet {
        self.properties_of(kind)
            .filter_map(Property::date_times)
            .flatten()
            .cloned()
            .collect()
    }

    /// The reconciled occurrence set of this component within `window`:
    /// rule-generated occurrences (or the bare DTSTART when there is no
    /// rule), plus RDATE, minus EXDATE, clipped to the window.
    ///
    /// A component without DTSTART has no occurrences.
    ///
    /// # Errors
    ///
    /// Propagates [`ExpandError`] from the occurrence generator. The
    /// reconciliation itself never fails.
    pub fn occurrences_within(&self, window: &Window) -> Result<DateSet, ExpandError> {
        let Some(seed) = self.dt_start() else {
            return Ok(DateSet::new());
        };
        let generated: Vec<CalDateTime> = match self.rrule() {
            Some(rule) => rule.occurrences(seed, Some(window))?.collect(),
            None => vec![seed.clone()],
        };
        tracing::debug!(
            component = %self.kind,
            generated = generated.len(),
            "reconciling occurrence set"
        );
        let mut set = reconcile(generated, &self.rdate_set(), &self.exdate_set());
        set.clip(&window.start, &window.end);
        Ok(set)
    }

    /// Check this component and its children against the cardinality
    /// tables, collecting every violation.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for rule in cardinalities(&self.kind) {
            let count = self.properties_of(&rule.property).count();
            if count < usize::from(rule.min) {
                errors.push(ValidationError::MissingProperty {
                    component: self.kind.to_string(),
                    property: rule.property.to_string(),
                });
            }
            if let Some(max) = rule.max {
                if count > usize::from(max) {
                    errors.push(ValidationError::TooManyProperties {
                        component: self.kind.to_string(),
                        property: rule.property.to_string(),
                        count,
                    });
                }
            }
        }
        for child in &self.components {
            errors.extend(child.validate());
        }
        errors
    }
}

impl Display for Component {
    /// Unfolded text form; use the formatter for folded output.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{KW_BEGIN}:{}\r", self.kind)?;
        for property in &self.properties {
            writeln!(f, "{property}\r")?;
        }
        for component in &self.components {
            write!(f, "{component}")?;
        }
        writeln!(f, "{KW_END}:{}\r", self.kind)
    }
}

/// Structural violations reported by [`Component::validate`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required property is absent.
    #[error("{component} is missing required property {property}")]
    MissingProperty {
        /// The component name.
        component: String,
        /// The missing property name.
        property: String,
    },

    /// A property occurs more often than allowed.
    #[error("{component} has {count} {property} properties")]
    TooManyProperties {
        /// The component name.
        component: String,
        /// The repeated property name.
        property: String,
        /// How often it occurred.
        count: usize,
    },
}

/// One row of a component's cardinality table.
#[derive(Debug, Clone)]
struct Cardinality {
    property: PropertyKind,
    min: u8,
    max: Option<u8>,
}

const fn required_once(property: PropertyKind) -> Cardinality {
    Cardinality {
        property,
        min: 1,
        max: Some(1),
    }
}

const fn at_most_once(property: PropertyKind) -> Cardinality {
    Cardinality {
        property,
        min: 0,
        max: Some(1),
    }
}

/// Cardinality rules per component kind, applied generically instead of
/// per-component validation code.
fn cardinalities(kind: &ComponentKind) -> &'static [Cardinality] {
    static CALENDAR: &[Cardinality] = &[
        required_once(PropertyKind::ProdId),
        required_once(PropertyKind::Version),
        at_most_once(PropertyKind::CalScale),
        at_most_once(PropertyKind::Method),
    ];
    static EVENT: &[Cardinality] = &[
        required_once(PropertyKind::Uid),
        required_once(PropertyKind::DtStamp),
        at_most_once(PropertyKind::DtStart),
        at_most_once(PropertyKind::DtEnd),
        at_most_once(PropertyKind::Summary),
        at_most_once(PropertyKind::Description),
        at_most_once(PropertyKind::Location),
        at_most_once(PropertyKind::Status),
        at_most_once(PropertyKind::Transp),
        at_most_once(PropertyKind::RRule),
        at_most_once(PropertyKind::Sequence),
    ];
    static TODO: &[Cardinality] = &[
        required_once(PropertyKind::Uid),
        required_once(PropertyKind::DtStamp),
        at_most_once(PropertyKind::DtStart),
        at_most_once(PropertyKind::Due),
        at_most_once(PropertyKind::Completed),
        at_most_once(PropertyKind::Summary),
        at_most_once(PropertyKind::Status),
        at_most_once(PropertyKind::RRule),
    ];
    static JOURNAL: &[Cardinality] = &[
        required_once(PropertyKind::Uid),
        required_once(PropertyKind::DtStamp),
        at_most_once(PropertyKind::DtStart),
        at_most_once(PropertyKind::Summary),
        at_most_once(PropertyKind::RRule),
    ];
    static TIMEZONE: &[Cardinality] = &[required_once(PropertyKind::TzId)];

    match kind {
        ComponentKind::Calendar => CALENDAR,
        ComponentKind::Event => EVENT,
        ComponentKind::Todo => TODO,
        ComponentKind::Journal => JOURNAL,
        ComponentKind::TimeZone => TIMEZONE,
        _ => &[],
    }
}

/// A predicate matching components that carry a given property value.
///
/// The equality is exact over the typed value; parameters are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyFilter {
    kind: PropertyKind,
    value: PropertyValue,
}

impl PropertyFilter {
    /// Match components with a `kind` property equal to `value`.
    #[must_use]
    pub fn new(kind: PropertyKind, value: PropertyValue) -> Self {
        Self { kind, value }
    }

    /// Whether the component carries the property value.
    #[must_use]
    pub fn matches(&self, component: &Component) -> bool {
        component
            .properties_of(&self.kind)
            .any(|p| p.value == self.value)
    }
}
