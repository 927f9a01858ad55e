//! # Editor Version Identifiers
//!
//! Editor releases are named `major.minor.patch<channel><iteration>`, for
//! example `2021.3.5f1`. This module parses those names into `EditorVersion`
//! values and defines the canonical ordering used everywhere else: sorting
//! installations, picking the latest install, and keying reconciliation.
//!
//! ## Parsing
//!
//! `EditorVersion::parse` never fails. A string that does not start with the
//! canonical pattern yields the null sentinel `0.0.0a0`, which callers treat
//! as "no version". Use `EditorVersion::is_valid` or `try_parse` when the
//! distinction matters. Only a prefix must match, so directory names such as
//! `2021.3.5f1-arm64` still parse.
//!
//! ## Ordering
//!
//! Versions compare field by field: major, minor, patch, channel, iteration.
//! Channels compare by their letter (`a < b < c < f < p`), so a China release
//! sorts below the final release with the same numbers.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)([abfpc])(\d+)").expect("version pattern compiles")
});

/// `(major, minor)` branches with long-term support.
const LTS_BRANCHES: &[(u32, u32)] = &[(2017, 4), (2018, 4), (2019, 4), (2020, 3), (2021, 3)];

/// Release channel of an editor version.
///
/// Variants are declared in letter order so the derived ordering matches the
/// letter comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Alpha,
    Beta,
    China,
    Final,
    Patch,
}

impl Channel {
    /// The single-letter channel code used in version strings.
    pub fn letter(self) -> char {
        match self {
            Channel::Alpha => 'a',
            Channel::Beta => 'b',
            Channel::China => 'c',
            Channel::Final => 'f',
            Channel::Patch => 'p',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'a' => Some(Channel::Alpha),
            'b' => Some(Channel::Beta),
            'c' => Some(Channel::China),
            'f' => Some(Channel::Final),
            'p' => Some(Channel::Patch),
            _ => None,
        }
    }
}

/// A parsed editor version such as `2021.3.5f1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditorVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub channel: Channel,
    pub iteration: u32,
}

impl EditorVersion {
    /// The sentinel returned for unparseable input.
    pub const NULL: EditorVersion = EditorVersion {
        major: 0,
        minor: 0,
        patch: 0,
        channel: Channel::Alpha,
        iteration: 0,
    };

    /// Parses a version string, returning [`EditorVersion::NULL`] when it does
    /// not match.
    pub fn parse(input: &str) -> Self {
        Self::try_parse(input).unwrap_or_else(|| {
            log::debug!("'{}' is not a valid editor version", input);
            Self::NULL
        })
    }

    /// Parses a version string, returning `None` when it does not match or a
    /// numeric field overflows.
    pub fn try_parse(input: &str) -> Option<Self> {
        let caps = VERSION_PATTERN.captures(input)?;
        let number = |index: usize| caps.get(index)?.as_str().parse::<u32>().ok();
        let channel = caps.get(4)?.as_str().chars().next().and_then(Channel::from_letter)?;

        Some(Self {
            major: number(1)?,
            minor: number(2)?,
            patch: number(3)?,
            channel,
            iteration: number(5)?,
        })
    }

    /// Reports whether `input` matches the version pattern with all five
    /// components present.
    pub fn is_valid(input: &str) -> bool {
        VERSION_PATTERN
            .captures(input)
            .is_some_and(|caps| caps.len() == 6 && caps.iter().all(|group| group.is_some()))
    }

    /// True for the sentinel produced by a failed parse.
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// The `major.minor` release branch, e.g. `2021.3`.
    pub fn branch(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }

    pub fn is_lts(&self) -> bool {
        LTS_BRANCHES.contains(&(self.major, self.minor))
    }

    pub fn is_alpha(&self) -> bool {
        self.channel == Channel::Alpha
    }

    pub fn is_beta(&self) -> bool {
        self.channel == Channel::Beta
    }

    pub fn is_prerelease(&self) -> bool {
        self.is_alpha() || self.is_beta()
    }

    /// True for final (`f`) releases.
    pub fn is_official(&self) -> bool {
        self.channel == Channel::Final
    }
}

impl Default for EditorVersion {
    fn default() -> Self {
        Self::NULL
    }
}

impl Ord for EditorVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then(self.channel.letter().cmp(&other.channel.letter()))
            .then(self.iteration.cmp(&other.iteration))
    }
}

impl PartialOrd for EditorVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EditorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}{}{}",
            self.major,
            self.minor,
            self.patch,
            self.channel.letter(),
            self.iteration
        )
    }
}

impl std::str::FromStr for EditorVersion {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_parse(s).ok_or_else(|| crate::error::Error::InvalidVersion {
            input: s.to_string(),
        })
    }
}

impl Serialize for EditorVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EditorVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> EditorVersion {
        EditorVersion::parse(s)
    }

    #[test]
    fn test_parse_components() {
        let version = v("2021.3.5f1");
        assert_eq!(version.major, 2021);
        assert_eq!(version.minor, 3);
        assert_eq!(version.patch, 5);
        assert_eq!(version.channel(), Channel::Final);
        assert_eq!(version.iteration, 1);
        assert_eq!(version.to_string(), "2021.3.5f1");
    }

    #[test]
    fn test_parse_accepts_suffix() {
        assert_eq!(v("2022.1.0b12-arm64"), v("2022.1.0b12"));
        assert!(EditorVersion::is_valid("2022.1.0b12 (Apple silicon)"));
    }

    #[test]
    fn test_parse_failure_yields_null() {
        for input in ["", "scratch", "2021.3", "2021.3.5", "2021.3.5x1", "v2021.3.5f1"] {
            assert!(v(input).is_null(), "{input} should not parse");
            assert!(!EditorVersion::is_valid(input));
        }
    }

    #[test]
    fn test_overflow_is_unparseable() {
        assert!(EditorVersion::try_parse("99999999999.1.0f1").is_none());
    }

    #[test]
    fn test_compare_basic() {
        assert_eq!(v("2021.3.0f1").cmp(&v("2021.3.0f1")), Ordering::Equal);
        assert_eq!(v("2020.3.1f1").cmp(&v("2021.3.0f1")), Ordering::Less);
        assert!(v("2021.3.10f1") > v("2021.3.9f1"));
        assert!(v("2021.3.0f2") > v("2021.3.0f1"));
    }

    #[test]
    fn test_channel_ordering_is_by_letter() {
        assert!(v("2021.3.0c1") < v("2021.3.0f1"));
        assert!(v("2021.3.0a1") < v("2021.3.0b1"));
        assert!(v("2021.3.0b9") < v("2021.3.0c1"));
        assert!(v("2021.3.0f9") < v("2021.3.0p1"));
    }

    #[test]
    fn test_lts_table() {
        assert!(v("2019.4.0f1").is_lts());
        assert!(!v("2019.3.0f1").is_lts());
        assert!(v("2021.3.5f1").is_lts());
        assert!(v("2017.4.40f1").is_lts());
        assert!(!v("2022.3.0f1").is_lts());
    }

    #[test]
    fn test_channel_predicates() {
        assert!(v("2023.1.0a3").is_prerelease());
        assert!(v("2023.1.0b3").is_prerelease());
        assert!(!v("2023.1.0f1").is_prerelease());
        assert!(v("2023.1.0f1").is_official());
        assert!(!v("2023.1.0p1").is_official());
        assert_eq!(v("2023.1.0p1").branch(), "2023.1");
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&v("2020.3.30f1")).unwrap();
        assert_eq!(json, "\"2020.3.30f1\"");
        let back: EditorVersion = serde_json::from_str("\"garbage\"").unwrap();
        assert!(back.is_null());
    }

    #[test]
    fn test_from_str_rejects_invalid() {
        assert!("2021.3.5f1".parse::<EditorVersion>().is_ok());
        assert!("nope".parse::<EditorVersion>().is_err());
    }
}
