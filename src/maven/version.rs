//! Generic ordering of version strings.
//!
//! A version is split into items at '.', '-' and '_' as well as at every transition between
//!  digits and letters. Numeric items compare numerically, well-known qualifiers have a fixed
//!  order (alpha < beta < milestone < rc < snapshot < release < sp), unknown qualifiers come
//!  after the well-known ones in case-insensitive lexical order, and numbers come after any
//!  qualifier. Padding ("0" and the release qualifiers) is trimmed from the end of every run of
//!  numbers and of qualifiers when parsing, and missing trailing items compare like padding.
//!  So "1", "1.0", "1-ga" and "1.0.0-final" are all equal, and so are "1.0-alpha" and "1-alpha".
//!
//! The special items "min" and "max" compare below / above everything else. They only make
//!  sense as the last item and are used to express wildcard ranges like `[1.2.*]`.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid version {version:?}: {reason}")]
pub struct VersionParseError {
    pub version: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Item {
    Min,
    Qualifier(i32),
    Text(String),
    /// digits without leading zeros, so comparison is by length first - no overflow for huge numbers
    Number(String),
    Max,
}
impl Item {
    fn kind_rank(&self) -> u8 {
        match self {
            Item::Min => 0,
            Item::Qualifier(_) => 2,
            Item::Text(_) => 3,
            Item::Number(_) => 4,
            Item::Max => 8,
        }
    }

    fn compare(&self, other: &Item) -> Ordering {
        match (self, other) {
            (Item::Number(a), Item::Number(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Item::Qualifier(a), Item::Qualifier(b)) => a.cmp(b),
            (Item::Text(a), Item::Text(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }

    /// compares against an item that is missing because the other version is shorter
    fn compare_to_padding(&self) -> Ordering {
        match self {
            Item::Min => Ordering::Less,
            Item::Qualifier(q) => q.cmp(&0),
            Item::Text(_) => Ordering::Greater,
            Item::Number(n) => if n == "0" { Ordering::Equal } else { Ordering::Greater },
            Item::Max => Ordering::Greater,
        }
    }

    fn is_number(&self) -> bool {
        matches!(self, Item::Number(_))
    }

    fn is_padding(&self) -> bool {
        self.compare_to_padding() == Ordering::Equal
    }

    fn number(digits: &str) -> Item {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Item::Number("0".to_string())
        }
        else {
            Item::Number(trimmed.to_string())
        }
    }

    fn text(token: &str, followed_by_digit: bool) -> Item {
        let lower = token.to_ascii_lowercase();

        // single letter aliases only count when glued to a number, e.g. "1.0a1"
        let lower = match (lower.as_str(), followed_by_digit) {
            ("a", true) => "alpha".to_string(),
            ("b", true) => "beta".to_string(),
            ("m", true) => "milestone".to_string(),
            _ => lower,
        };

        match lower.as_str() {
            "min" => Item::Min,
            "max" => Item::Max,
            "alpha" => Item::Qualifier(-5),
            "beta" => Item::Qualifier(-4),
            "milestone" => Item::Qualifier(-3),
            "cr" | "rc" => Item::Qualifier(-2),
            "snapshot" => Item::Qualifier(-1),
            "ga" | "final" | "release" => Item::Qualifier(0),
            "sp" => Item::Qualifier(1),
            _ => Item::Text(lower),
        }
    }
}

/// A parsed version with a total order. Equality follows the order, i.e. "1.0" == "1".
#[derive(Debug, Clone)]
pub struct GenericVersion {
    text: String,
    items: Vec<Item>,
}
impl GenericVersion {
    pub fn parse(version: &str) -> Result<GenericVersion, VersionParseError> {
        if version.is_empty() {
            return Err(VersionParseError { version: version.to_string(), reason: "empty version" });
        }
        if version.chars().any(|c| c.is_whitespace() || "[](),".contains(c)) {
            return Err(VersionParseError { version: version.to_string(), reason: "contains whitespace or range delimiters" });
        }

        let mut items = tokenize(version);
        trim_padding(&mut items);
        Ok(GenericVersion {
            text: version.to_string(),
            items,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

fn tokenize(version: &str) -> Vec<Item> {
    let chars = version.chars().collect::<Vec<_>>();
    let mut items = Vec::new();

    let mut start = 0;
    let mut i = 0;
    while i <= chars.len() {
        let at_end = i == chars.len();
        let is_separator = !at_end && matches!(chars[i], '.' | '-' | '_');
        let is_transition = !at_end && !is_separator && i > start
            && chars[i].is_ascii_digit() != chars[i - 1].is_ascii_digit();

        if at_end || is_separator || is_transition {
            let token = chars[start..i].iter().collect::<String>();
            if token.is_empty() {
                // empty segments like in "1..2" count as 0
                if !at_end || !items.is_empty() {
                    items.push(Item::number("0"));
                }
            }
            else if token.chars().all(|c| c.is_ascii_digit()) {
                items.push(Item::number(&token));
            }
            else {
                items.push(Item::text(&token, is_transition));
            }

            start = if is_transition { i } else { i + 1 };
        }
        i += 1;
    }
    items
}

/// Removes padding items from the end of each run of numbers and each run of non-numbers, so that
///  equal versions have identical items. The first item is always kept.
fn trim_padding(items: &mut Vec<Item>) {
    let mut run_is_number = None;
    let mut run_end = items.len().saturating_sub(1);
    for i in (1..items.len()).rev() {
        let is_number = items[i].is_number();
        if run_is_number != Some(is_number) {
            run_end = i;
            run_is_number = Some(is_number);
        }

        let trailing = i == items.len() - 1 || items[i - 1].is_number() == is_number;
        if run_end == i && trailing && items[i].is_padding() {
            items.remove(i);
            run_end -= 1;
        }
    }
}

impl Ord for GenericVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.items.len().max(other.items.len());
        for idx in 0..len {
            match (self.items.get(idx), other.items.get(idx)) {
                (Some(a), Some(b)) => {
                    let rel = a.compare(b);
                    if rel != Ordering::Equal {
                        return rel;
                    }
                }
                (Some(_), None) => return compare_padding(&self.items[idx..]),
                (None, Some(_)) => return compare_padding(&other.items[idx..]).reverse(),
                (None, None) => break,
            }
        }
        Ordering::Equal
    }
}

fn compare_padding(rest: &[Item]) -> Ordering {
    rest.iter()
        .map(|item| item.compare_to_padding())
        .find(|rel| *rel != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

impl PartialOrd for GenericVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for GenericVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for GenericVersion {}

impl Display for GenericVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod test {
    use rstest::*;
    use super::*;

    fn v(s: &str) -> GenericVersion {
        GenericVersion::parse(s).unwrap()
    }

    #[rstest]
    #[case::numeric("1.2", "1.10")]
    #[case::more_segments("1.2", "1.2.1")]
    #[case::snapshot_before_release("1.0-SNAPSHOT", "1.0")]
    #[case::alpha_before_beta("1.0-alpha-1", "1.0-beta-1")]
    #[case::beta_before_milestone("1.0-beta", "1.0-milestone")]
    #[case::milestone_before_rc("1.0-m2", "1.0-rc1")]
    #[case::rc_before_snapshot("1.0-rc1", "1.0-SNAPSHOT")]
    #[case::release_before_sp("1.0", "1.0-sp1")]
    #[case::sp_before_unknown("1.0-sp", "1.0-foo")]
    #[case::unknown_lexical("1.0-bar", "1.0-foo")]
    #[case::qualifier_before_number("1.0-foo", "1.0.1")]
    #[case::alias_glued_to_number("1.0a1", "1.0b1")]
    #[case::huge_numbers("1.99999999999999999999", "1.100000000000000000000")]
    #[case::timestamped_snapshot("1.0-20230101.120000-1", "1.0-20230101.120000-2")]
    #[case::next_snapshot_after_release("1.0.0", "1.0.1-SNAPSHOT")]
    #[case::min_below_everything("1.2.min", "1.2.0-alpha")]
    #[case::max_above_everything("1.2.99-sp", "1.2.max")]
    fn test_less_than(#[case] lower: &str, #[case] higher: &str) {
        assert!(v(lower) < v(higher), "{} < {}", lower, higher);
        assert!(v(higher) > v(lower), "{} > {}", higher, lower);
    }

    #[rstest]
    #[case::trailing_zero("1", "1.0")]
    #[case::trailing_zeros("1.0", "1.0.0")]
    #[case::ga("1.0", "1.0-ga")]
    #[case::final_("1.0.final", "1")]
    #[case::release("1-release", "1.0")]
    #[case::case_insensitive("1.0-RC1", "1.0-rc1")]
    #[case::cr_is_rc("1.0-cr1", "1.0-rc1")]
    #[case::leading_zeros("1.01", "1.1")]
    #[case::underscore("1_0", "1.0")]
    #[case::ga_vs_zero("1-ga", "1.0")]
    #[case::final_vs_zeros("1.0.0-final", "1.0")]
    #[case::zero_before_qualifier("1.0-alpha", "1-alpha")]
    #[case::zeros_before_qualifier("1.0.0-rc1", "1-rc-1")]
    fn test_equal(#[case] a: &str, #[case] b: &str) {
        assert_eq!(v(a), v(b));
    }

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("1 .0")]
    #[case::bracket("[1.0")]
    #[case::comma("1,0")]
    fn test_invalid(#[case] s: &str) {
        assert!(GenericVersion::parse(s).is_err());
    }

    #[test]
    fn test_sorting() {
        let mut versions = vec!["1.10", "1.0-SNAPSHOT", "1.2", "1.0", "1.1-SNAPSHOT", "1.0-alpha"]
            .into_iter()
            .map(v)
            .collect::<Vec<_>>();
        versions.sort();

        let sorted = versions.iter().map(|v| v.as_str()).collect::<Vec<_>>();
        assert_eq!(sorted, vec!["1.0-alpha", "1.0-SNAPSHOT", "1.0", "1.1-SNAPSHOT", "1.2", "1.10"]);
    }

    const MIXED: &[&str] = &[
        "1", "1.0", "1.0.0", "1-ga", "1-final", "1-release", "1.ga", "1.0-ga", "1.0.0.final",
        "1-alpha", "1.0-alpha", "1.0.0-alpha-1", "1-SNAPSHOT", "1.0-SNAPSHOT", "1.0.1",
        "1.ga.1", "1-sp", "1.0-sp1", "1-foo", "1.0.foo", "1.min", "1.max", "0", "0.ga", "ga", "2",
    ];

    #[test]
    fn test_order_is_consistent() {
        let versions = MIXED.iter().map(|s| v(s)).collect::<Vec<_>>();

        for a in &versions {
            for b in &versions {
                assert_eq!(a.cmp(b), b.cmp(a).reverse(), "{} vs {}", a, b);
                for c in &versions {
                    if a <= b && b <= c {
                        assert!(a <= c, "{} <= {} <= {}", a, b, c);
                    }
                    if a == b {
                        assert_eq!(a.cmp(c), b.cmp(c), "{} == {} vs {}", a, b, c);
                    }
                }
            }
        }
    }

    #[test]
    fn test_sorting_equivalent_spellings() {
        let mut versions = MIXED.iter().rev()
            .chain(MIXED.iter())
            .map(|s| v(s))
            .collect::<Vec<_>>();
        versions.sort();

        assert!(versions.windows(2).all(|w| w[0] <= w[1]));
        let first_release = versions.iter().position(|x| x == &v("1")).unwrap();
        let last_release = versions.iter().rposition(|x| x == &v("1")).unwrap();
        assert_eq!(last_release - first_release + 1, 18);
    }

    #[test]
    fn test_display_keeps_original_text() {
        assert_eq!(v("1.0-RC1").to_string(), "1.0-RC1");
    }
}
