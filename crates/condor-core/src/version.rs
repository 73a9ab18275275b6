//! Totally ordered release versions for unions and members.
//!
//! Ordering follows the Maven convention so that platform release lines sort
//! the way their artifacts do:
//! - segments are split on `.`, `-` and digit/letter transitions
//!   (`rc1` is `rc`, `1`)
//! - `ga`, `final` and `release` are dropped, and so are zeros at the end
//!   or in front of a qualifier (`1.0.0-rc1` is `1-rc1`, `1.0` is `1`)
//! - the normalized segments compare left to right, an absent segment
//!   standing for the release itself:
//!   `alpha` < `beta` < `milestone` < `rc` < `snapshot` < other text <
//!   release < `sp` < any number

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed version. Equality and ordering use the normalized segments;
/// the text is kept as written for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    original: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
enum Segment {
    Number(u64),
    Qualifier(Qualifier),
    Text(String),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum Qualifier {
    Alpha,
    Beta,
    Milestone,
    Rc,
    Snapshot,
    Sp,
}

impl Version {
    /// Parse a version string. Returns `None` for blank input.
    pub fn parse(version: &str) -> Option<Self> {
        let trimmed = version.trim();
        let tokens: Vec<&str> = trimmed
            .split(['.', '-'])
            .flat_map(split_digit_runs)
            .filter(|token| !token.is_empty())
            .collect();
        if tokens.is_empty() {
            return None;
        }

        let mut segments: Vec<Segment> = Vec::with_capacity(tokens.len());
        for segment in tokens.into_iter().filter_map(Segment::classify) {
            if !matches!(segment, Segment::Number(_)) {
                trim_zeros(&mut segments);
            }
            segments.push(segment);
        }
        trim_zeros(&mut segments);

        Some(Self {
            original: trimmed.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }
}

fn split_digit_runs(token: &str) -> Vec<&str> {
    let bytes = token.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    for i in 1..bytes.len() {
        if bytes[i].is_ascii_digit() != bytes[i - 1].is_ascii_digit() {
            parts.push(&token[start..i]);
            start = i;
        }
    }
    parts.push(&token[start..]);
    parts
}

fn trim_zeros(segments: &mut Vec<Segment>) {
    while matches!(segments.last(), Some(Segment::Number(0))) {
        segments.pop();
    }
}

impl Segment {
    /// `None` for the release markers, which normalize away.
    fn classify(token: &str) -> Option<Self> {
        if let Ok(n) = token.parse::<u64>() {
            return Some(Segment::Number(n));
        }
        let qualifier = match token.to_ascii_lowercase().as_str() {
            "alpha" | "a" => Qualifier::Alpha,
            "beta" | "b" => Qualifier::Beta,
            "milestone" | "m" => Qualifier::Milestone,
            "rc" | "cr" => Qualifier::Rc,
            "snapshot" => Qualifier::Snapshot,
            "ga" | "final" | "release" => return None,
            "sp" => Qualifier::Sp,
            text => return Some(Segment::Text(text.to_string())),
        };
        Some(Segment::Qualifier(qualifier))
    }
}

/// Position of a segment, or of an absent one, in the segment order.
fn rank(segment: Option<&Segment>) -> u8 {
    match segment {
        Some(Segment::Qualifier(Qualifier::Sp)) => 3,
        Some(Segment::Qualifier(_)) => 0,
        Some(Segment::Text(_)) => 1,
        None => 2,
        Some(Segment::Number(_)) => 4,
    }
}

fn compare_segments(a: Option<&Segment>, b: Option<&Segment>) -> Ordering {
    rank(a).cmp(&rank(b)).then_with(|| match (a, b) {
        (Some(Segment::Number(x)), Some(Segment::Number(y))) => x.cmp(y),
        (Some(Segment::Qualifier(x)), Some(Segment::Qualifier(y))) => x.cmp(y),
        (Some(Segment::Text(x)), Some(Segment::Text(y))) => x.cmp(y),
        _ => Ordering::Equal,
    })
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| compare_segments(self.segments.get(i), other.segments.get(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.segments == other.segments
    }
}

impl Eq for Version {}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl FromStr for Version {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid version `{s}`"))
    }
}

impl TryFrom<String> for Version {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.original
    }
}
