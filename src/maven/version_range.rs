use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::maven::version::{GenericVersion, VersionParseError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionConstraintError {
    #[error("invalid version constraint {constraint:?}: {reason}")]
    Syntax {
        constraint: String,
        reason: String,
    },
    #[error("invalid bound in version constraint {constraint:?}: {source}")]
    Bound {
        constraint: String,
        #[source]
        source: VersionParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: GenericVersion,
    pub inclusive: bool,
}

/// A single interval. A missing bound means the interval is unbounded on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRange {
    pub lower: Option<Bound>,
    pub upper: Option<Bound>,
}
impl VersionRange {
    pub fn contains(&self, version: &GenericVersion) -> bool {
        if let Some(lower) = &self.lower {
            match version.cmp(&lower.version) {
                Ordering::Less => return false,
                Ordering::Equal if !lower.inclusive => return false,
                _ => {}
            }
        }
        if let Some(upper) = &self.upper {
            match version.cmp(&upper.version) {
                Ordering::Greater => return false,
                Ordering::Equal if !upper.inclusive => return false,
                _ => {}
            }
        }
        true
    }

    fn parse(range: &str, constraint: &str) -> Result<VersionRange, VersionConstraintError> {
        let syntax_error = |reason: &str| VersionConstraintError::Syntax {
            constraint: constraint.to_string(),
            reason: reason.to_string(),
        };
        let parse_bound = |s: &str| GenericVersion::parse(s).map_err(|source| VersionConstraintError::Bound {
            constraint: constraint.to_string(),
            source,
        });

        let lower_inclusive = range.starts_with('[');
        let upper_inclusive = range.ends_with(']');
        let inner = range[1..range.len() - 1].trim();

        if let Some((lower, upper)) = inner.split_once(',') {
            let (lower, upper) = (lower.trim(), upper.trim());
            if upper.contains(',') {
                return Err(syntax_error("a range may only have two bounds"));
            }

            let lower = if lower.is_empty() { None } else { Some(Bound { version: parse_bound(lower)?, inclusive: lower_inclusive }) };
            let upper = if upper.is_empty() { None } else { Some(Bound { version: parse_bound(upper)?, inclusive: upper_inclusive }) };

            if let (Some(l), Some(u)) = (&lower, &upper) {
                match l.version.cmp(&u.version) {
                    Ordering::Greater => return Err(syntax_error("lower bound is greater than upper bound")),
                    Ordering::Equal if !(l.inclusive && u.inclusive) => return Err(syntax_error("range is empty")),
                    _ => {}
                }
            }

            Ok(VersionRange { lower, upper })
        }
        else {
            if !(lower_inclusive && upper_inclusive) {
                return Err(syntax_error("a single version range must be inclusive on both sides"));
            }
            if inner.is_empty() {
                return Err(syntax_error("empty range"));
            }

            let (lower, upper) = match inner.strip_suffix(".*") {
                Some(prefix) => (parse_bound(&format!("{}.min", prefix))?, parse_bound(&format!("{}.max", prefix))?),
                None => (parse_bound(inner)?, parse_bound(inner)?),
            };
            Ok(VersionRange {
                lower: Some(Bound { version: lower, inclusive: true }),
                upper: Some(Bound { version: upper, inclusive: true }),
            })
        }
    }
}

/// Either a 'soft' pinned version ("1.0") or a union of intervals ("[1.0,2.0),[3.0,)")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    text: String,
    ranges: Vec<VersionRange>,
    pinned: Option<GenericVersion>,
}
impl VersionConstraint {
    pub fn parse(constraint: &str) -> Result<VersionConstraint, VersionConstraintError> {
        let constraint = constraint.trim();
        let mut ranges = Vec::new();

        let mut rest = constraint;
        while rest.starts_with('[') || rest.starts_with('(') {
            let end = match (rest.find(')'), rest.find(']')) {
                (Some(a), Some(b)) => a.min(b),
                (Some(a), None) => a,
                (None, Some(b)) => b,
                (None, None) => return Err(VersionConstraintError::Syntax {
                    constraint: constraint.to_string(),
                    reason: "unbounded range".to_string(),
                }),
            };
            ranges.push(VersionRange::parse(&rest[..=end], constraint)?);

            rest = rest[end + 1..].trim();
            if let Some(after_comma) = rest.strip_prefix(',') {
                rest = after_comma.trim();
            }
        }

        if !ranges.is_empty() {
            if !rest.is_empty() {
                return Err(VersionConstraintError::Syntax {
                    constraint: constraint.to_string(),
                    reason: format!("expected '[' or '(' but got {:?}", rest),
                });
            }
            return Ok(VersionConstraint {
                text: constraint.to_string(),
                ranges,
                pinned: None,
            });
        }

        let pinned = GenericVersion::parse(constraint).map_err(|source| VersionConstraintError::Bound {
            constraint: constraint.to_string(),
            source,
        })?;
        Ok(VersionConstraint {
            text: constraint.to_string(),
            ranges,
            pinned: Some(pinned),
        })
    }

    /// the version of a constraint without intervals
    pub fn pinned(&self) -> Option<&GenericVersion> {
        self.pinned.as_ref()
    }

    pub fn contains(&self, version: &GenericVersion) -> bool {
        match &self.pinned {
            Some(pinned) => pinned == version,
            None => self.ranges.iter().any(|r| r.contains(version)),
        }
    }
}
impl Display for VersionConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}
