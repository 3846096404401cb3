//! PEP 440 version handling.
//!
//! This module provides the version and constraint types used throughout
//! Stanza:
//!
//! - Release versions: `1.2.3`, `v3.10`, `2.0.0.1`
//! - Epochs: `1!2.0`
//! - Pre-releases: `3.10.0a1`, `2.0b2`, `1.0rc1`
//! - Dev releases: `3.12.0.dev2`
//!
//! Constraints supported:
//! - Exact: `3.8.1`, `==3.8.1`
//! - Range: `>=3.8 <4.0`, `>=3.8,<4.0`
//! - Hyphen range: `2.7 - 3.4`
//! - Wildcard: `3.8.*`, `3.*`, `==3.8.*`
//! - Tilde: `~3.8` (>=3.8 <3.9)
//! - Compatible release: `~=3.8` (>=3.8 <4.0)
//! - Caret: `^3.8` (>=3.8 <4.0)
//! - OR: `~2.7 || >=3.4`

use parking_lot::RwLock;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use version_ranges::Ranges;

/// Cache for parsed versions to avoid repeated parsing.
static VERSION_CACHE: LazyLock<RwLock<ahash::AHashMap<Arc<str>, PythonVersion>>> =
    LazyLock::new(|| RwLock::new(ahash::AHashMap::with_capacity(1024)));

/// Cache for parsed constraints.
static CONSTRAINT_CACHE: LazyLock<RwLock<ahash::AHashMap<Arc<str>, VersionConstraint>>> =
    LazyLock::new(|| RwLock::new(ahash::AHashMap::with_capacity(1024)));

/// Maximum cache size before eviction.
const MAX_CACHE_SIZE: usize = 16384;

/// Pre-release phase of a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PreReleasePhase {
    /// Alpha release (`a` / `alpha`).
    Alpha = 0,
    /// Beta release (`b` / `beta`).
    Beta = 1,
    /// Release candidate (`c` / `rc` / `pre` / `preview`).
    Rc = 2,
}

impl PreReleasePhase {
    /// Parse a PEP 440 pre-release spelling.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "alpha" => Some(Self::Alpha),
            "b" | "beta" => Some(Self::Beta),
            "c" | "rc" | "pre" | "preview" => Some(Self::Rc),
            _ => None,
        }
    }
}

impl fmt::Display for PreReleasePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alpha => write!(f, "a"),
            Self::Beta => write!(f, "b"),
            Self::Rc => write!(f, "rc"),
        }
    }
}

/// Pre-release segment (phase plus number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    /// Phase (alpha, beta, rc).
    pub phase: PreReleasePhase,
    /// Sequence number; `3.10.0a1` has number 1.
    pub number: u64,
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.phase, self.number)
    }
}

/// A PEP 440 version.
///
/// Versions keep their original spelling for display and remember how many
/// release segments were written, which tilde-style constraints key off.
#[derive(Clone)]
pub struct PythonVersion {
    /// Version epoch (`1!2.0` has epoch 1).
    pub epoch: u64,
    /// Major version component.
    pub major: u64,
    /// Minor version component.
    pub minor: u64,
    /// Patch version component.
    pub patch: u64,
    /// Fourth release component (PEP 440 allows arbitrary depth; four is
    /// what CPython interpreter versions ever use).
    pub fourth: u64,
    /// Pre-release segment, if any.
    pub pre_release: Option<PreRelease>,
    /// Dev release number, if any (`3.12.0.dev2` has dev 2).
    pub dev: Option<u64>,
    /// Number of release segments written in the original (1..=4).
    precision: u8,
    /// Original string representation.
    original: Arc<str>,
    /// Packed release components for fast comparison.
    packed: u64,
}

impl PythonVersion {
    /// Create a new version with major.minor.patch components.
    #[must_use]
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        let original: Arc<str> = Arc::from(format!("{major}.{minor}.{patch}"));
        Self {
            epoch: 0,
            major,
            minor,
            patch,
            fourth: 0,
            pre_release: None,
            dev: None,
            precision: 3,
            packed: Self::pack(major, minor, patch, 0),
            original,
        }
    }

    /// Parse a PEP 440 version string.
    ///
    /// # Examples
    ///
    /// ```
    /// use stanza_package::version::PythonVersion;
    ///
    /// let v = PythonVersion::parse("3.10.2").unwrap();
    /// assert_eq!((v.major, v.minor, v.patch), (3, 10, 2));
    ///
    /// let v = PythonVersion::parse("3.11.0b4").unwrap();
    /// assert!(v.is_prerelease());
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        // Check cache first
        {
            let cache = VERSION_CACHE.read();
            if let Some(cached) = cache.get(input) {
                return Some(cached.clone());
            }
        }

        let result = Self::parse_uncached(input)?;

        // Cache the result
        {
            let mut cache = VERSION_CACHE.write();
            if cache.len() >= MAX_CACHE_SIZE {
                // Simple eviction: clear half the cache
                let keys: Vec<_> = cache.keys().take(MAX_CACHE_SIZE / 2).cloned().collect();
                for key in keys {
                    cache.remove(&key);
                }
            }
            cache.insert(Arc::from(input), result.clone());
        }

        Some(result)
    }

    fn parse_uncached(input: &str) -> Option<Self> {
        // Remove 'v' or 'V' prefix
        let version_part = input
            .strip_prefix('v')
            .or_else(|| input.strip_prefix('V'))
            .unwrap_or(input);

        static VERSION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(
                r"(?ix)
                ^
                (?:(\d+)!)?                     # epoch
                (\d+)                           # major
                (?:\.(\d+))?                    # minor
                (?:\.(\d+))?                    # patch
                (?:\.(\d+))?                    # fourth
                (?:
                    [-._]?
                    (a|b|c|rc|alpha|beta|pre|preview)   # pre-release phase
                    [-._]?
                    (\d+)?                      # pre-release number
                )?
                (?:
                    [-._]?
                    dev
                    [-._]?
                    (\d+)?                      # dev number
                )?
                $
                ",
            )
            .expect("valid regex")
        });

        let caps = VERSION_REGEX.captures(version_part)?;

        let epoch: u64 = caps.get(1).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let major: u64 = caps.get(2)?.as_str().parse().ok()?;
        let minor: u64 = caps.get(3).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let patch: u64 = caps.get(4).map_or(0, |m| m.as_str().parse().unwrap_or(0));
        let fourth: u64 = caps.get(5).map_or(0, |m| m.as_str().parse().unwrap_or(0));

        let precision = 1
            + u8::from(caps.get(3).is_some())
            + u8::from(caps.get(4).is_some())
            + u8::from(caps.get(5).is_some());

        let pre_release = caps.get(6).and_then(|phase| {
            let phase = PreReleasePhase::parse(phase.as_str())?;
            let number = caps
                .get(7)
                .map_or(0, |m| m.as_str().parse().unwrap_or(0));
            Some(PreRelease { phase, number })
        });

        // Group 6 matched but was not a valid phase spelling: reject
        if caps.get(6).is_some() && pre_release.is_none() {
            return None;
        }

        let dev = if input.to_ascii_lowercase().contains("dev") {
            Some(caps.get(8).map_or(0, |m| m.as_str().parse().unwrap_or(0)))
        } else {
            None
        };

        Some(Self {
            epoch,
            major,
            minor,
            patch,
            fourth,
            pre_release,
            dev,
            precision,
            packed: Self::pack(major, minor, patch, fourth),
            original: Arc::from(input),
        })
    }

    /// Pack release components into a single u64 for fast comparison.
    #[inline]
    #[must_use]
    const fn pack(major: u64, minor: u64, patch: u64, fourth: u64) -> u64 {
        // Use 16 bits for each component (supports up to 65535)
        ((major & 0xFFFF) << 48)
            | ((minor & 0xFFFF) << 32)
            | ((patch & 0xFFFF) << 16)
            | (fourth & 0xFFFF)
    }

    /// Get the original string representation.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Number of release segments written in the original string.
    #[must_use]
    #[inline]
    pub const fn precision(&self) -> u8 {
        self.precision
    }

    /// Check if this is a pre-release or dev version.
    #[must_use]
    #[inline]
    pub const fn is_prerelease(&self) -> bool {
        self.pre_release.is_some() || self.dev.is_some()
    }

    /// Get the next major version.
    #[must_use]
    pub fn bump_major(&self) -> Self {
        Self::new(self.major.saturating_add(1), 0, 0)
    }

    /// Get the next minor version.
    #[must_use]
    pub fn bump_minor(&self) -> Self {
        Self::new(self.major, self.minor.saturating_add(1), 0)
    }

    /// Get the next patch version.
    #[must_use]
    pub fn bump_patch(&self) -> Self {
        Self::new(self.major, self.minor, self.patch.saturating_add(1))
    }

    /// Get the lowest possible version.
    #[must_use]
    pub fn lowest() -> Self {
        Self::new(0, 0, 0)
    }

    /// Ordering key per PEP 440: dev < pre-release < final within the same
    /// release; a dev of a pre-release sorts just below that pre-release.
    fn order_key(&self) -> (u64, u64, u8, u64, u64) {
        match (self.pre_release, self.dev) {
            (None, Some(dev)) => (self.epoch, self.packed, 0, 0, dev),
            (Some(pre), dev) => (
                self.epoch,
                self.packed,
                1 + pre.phase as u8,
                pre.number,
                dev.map_or(u64::MAX, |d| d),
            ),
            (None, None) => (self.epoch, self.packed, 4, 0, 0),
        }
    }
}

impl Default for PythonVersion {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl fmt::Debug for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PythonVersion")
            .field("epoch", &self.epoch)
            .field("major", &self.major)
            .field("minor", &self.minor)
            .field("patch", &self.patch)
            .field("pre_release", &self.pre_release)
            .field("dev", &self.dev)
            .finish()
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl PartialEq for PythonVersion {
    fn eq(&self, other: &Self) -> bool {
        self.order_key() == other.order_key()
    }
}

impl Eq for PythonVersion {}

impl Hash for PythonVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order_key().hash(state);
    }
}

impl PartialOrd for PythonVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PythonVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl FromStr for PythonVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| VersionParseError(s.to_string()))
    }
}

impl Serialize for PythonVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

impl<'de> Deserialize<'de> for PythonVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid version: {s}")))
    }
}

/// Error when parsing a version string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid version string: {0}")]
pub struct VersionParseError(pub String);

/// A version constraint over [`PythonVersion`].
///
/// This wraps `version_ranges::Ranges` with the Poetry/PEP 440 grammar.
/// Equality and hashing use the original constraint string, so constraints
/// with the same meaning but different spellings are considered different.
#[derive(Clone)]
pub struct VersionConstraint {
    /// The version ranges (union of ranges).
    ranges: Ranges<PythonVersion>,
    /// Original constraint string.
    original: Arc<str>,
}

impl VersionConstraint {
    /// Create a constraint matching any version.
    #[must_use]
    pub fn any() -> Self {
        Self {
            ranges: Ranges::full(),
            original: Arc::from("*"),
        }
    }

    /// Create a constraint matching no versions.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            ranges: Ranges::empty(),
            original: Arc::from("<0"),
        }
    }

    /// Create an exact version constraint.
    #[must_use]
    pub fn exact(version: PythonVersion) -> Self {
        let original = Arc::from(version.to_string());
        Self {
            ranges: Ranges::singleton(version),
            original,
        }
    }

    /// Parse a constraint string.
    ///
    /// # Examples
    ///
    /// ```
    /// use stanza_package::version::{PythonVersion, VersionConstraint};
    ///
    /// let c = VersionConstraint::parse("~2.7 || >=3.4").unwrap();
    /// assert!(c.matches(&PythonVersion::parse("2.7.18").unwrap()));
    /// assert!(c.matches(&PythonVersion::parse("3.10.0").unwrap()));
    /// assert!(!c.matches(&PythonVersion::parse("3.0.0").unwrap()));
    /// ```
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        // Check cache first
        {
            let cache = CONSTRAINT_CACHE.read();
            if let Some(cached) = cache.get(input) {
                return Some(cached.clone());
            }
        }

        let result = Self::parse_uncached(input)?;

        // Cache the result
        {
            let mut cache = CONSTRAINT_CACHE.write();
            if cache.len() >= MAX_CACHE_SIZE {
                let keys: Vec<_> = cache.keys().take(MAX_CACHE_SIZE / 2).cloned().collect();
                for key in keys {
                    cache.remove(&key);
                }
            }
            cache.insert(Arc::from(input), result.clone());
        }

        Some(result)
    }

    fn parse_uncached(input: &str) -> Option<Self> {
        if input == "*" {
            return Some(Self::any());
        }

        // Handle OR constraints (|| or |)
        if input.contains('|') {
            // Split by | to handle both | and || (|| yields empty intermediate parts)
            let parts: Vec<&str> = input
                .split('|')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect();

            let mut ranges = Ranges::empty();
            for part in parts {
                let parsed = Self::parse_single_or_and(part)?;
                ranges = ranges.union(&parsed.ranges);
            }

            return Some(Self {
                ranges,
                original: Arc::from(input),
            });
        }

        // Parse single constraint or AND constraints
        let mut result = Self::parse_single_or_and(input)?;
        result.original = Arc::from(input);
        Some(result)
    }

    fn parse_single_or_and(input: &str) -> Option<Self> {
        let input = input.trim();

        // Handle AND constraints (comma or space separated)
        let parts: Vec<String> = if input.contains(',') {
            input.split(',').map(|s| s.trim().to_string()).collect()
        } else {
            Self::split_and_constraints(input)
        };

        if parts.len() == 1 {
            return Self::parse_single(&parts[0]);
        }

        // Check for hyphen range: "2.7 - 3.4" (inclusive on both ends)
        if parts.len() == 3 && parts[1] == "-" {
            let lower = PythonVersion::parse(&parts[0])?;
            let upper = PythonVersion::parse(&parts[2])?;
            return Some(Self {
                ranges: Ranges::higher_than(lower).intersection(&Ranges::lower_than(upper)),
                original: Arc::from(input),
            });
        }

        // AND all constraints together
        let mut result = Ranges::full();
        for part in &parts {
            let parsed = Self::parse_single(part)?;
            result = result.intersection(&parsed.ranges);
        }

        Some(Self {
            ranges: result,
            original: Arc::from(input),
        })
    }

    /// Split whitespace-separated AND constraints, re-joining operators with
    /// their operands (">= 3.8" becomes ">=3.8").
    fn split_and_constraints(input: &str) -> Vec<String> {
        let mut merged = Vec::new();
        let mut parts = input.split_whitespace().peekable();
        while let Some(part) = parts.next() {
            let is_operator = matches!(part, ">" | "<" | ">=" | "<=" | "==" | "=" | "!=" | "~=");
            if is_operator {
                // A dangling trailing operator stays unmerged and fails later parsing
                match parts.next() {
                    Some(operand) => merged.push(format!("{part}{operand}")),
                    None => merged.push(part.to_string()),
                }
            } else {
                merged.push(part.to_string());
            }
        }
        merged
    }

    #[allow(clippy::too_many_lines)]
    fn parse_single(input: &str) -> Option<Self> {
        let input = input.trim();

        // Wildcard
        if input == "*" {
            return Some(Self::any());
        }

        // Operators; multi-character prefixes must be tried first
        if let Some(rest) = input.strip_prefix(">=") {
            let version = PythonVersion::parse(rest.trim())?;
            return Some(Self {
                ranges: Ranges::higher_than(version),
                original: Arc::from(input),
            });
        }

        if let Some(rest) = input.strip_prefix("<=") {
            let version = PythonVersion::parse(rest.trim())?;
            return Some(Self {
                ranges: Ranges::lower_than(version),
                original: Arc::from(input),
            });
        }

        if let Some(rest) = input.strip_prefix('>') {
            let version = PythonVersion::parse(rest.trim())?;
            return Some(Self {
                ranges: Ranges::strictly_higher_than(version),
                original: Arc::from(input),
            });
        }

        if let Some(rest) = input.strip_prefix('<') {
            let version = PythonVersion::parse(rest.trim())?;
            return Some(Self {
                ranges: Ranges::strictly_lower_than(version),
                original: Arc::from(input),
            });
        }

        if let Some(rest) = input.strip_prefix("!=") {
            let version = PythonVersion::parse(rest.trim())?;
            return Some(Self {
                ranges: Ranges::singleton(version).complement(),
                original: Arc::from(input),
            });
        }

        // Compatible release: ~=3.8 means >=3.8 <4.0, ~=3.8.1 means >=3.8.1 <3.9
        if let Some(rest) = input.strip_prefix("~=") {
            let version = PythonVersion::parse(rest.trim())?;
            // PEP 440 requires at least two release segments
            if version.precision() < 2 {
                return None;
            }
            let upper = if version.precision() == 2 {
                version.bump_major()
            } else {
                version.bump_minor()
            };
            return Some(Self {
                ranges: Ranges::between(version, upper),
                original: Arc::from(input),
            });
        }

        if let Some(rest) = input.strip_prefix("==") {
            let rest = rest.trim();
            if rest.ends_with(".*") || rest.ends_with(".x") {
                let mut result = Self::parse_wildcard(rest)?;
                result.original = Arc::from(input);
                return Some(result);
            }
            let version = PythonVersion::parse(rest)?;
            return Some(Self::exact(version));
        }

        if let Some(rest) = input.strip_prefix('=') {
            let version = PythonVersion::parse(rest.trim())?;
            return Some(Self::exact(version));
        }

        // Caret: ^3.8 means >=3.8 <4.0; ^0.2 means >=0.2 <0.3; ^0.0.3 means >=0.0.3 <0.0.4
        if let Some(rest) = input.strip_prefix('^') {
            let version = PythonVersion::parse(rest.trim())?;
            let upper = if version.major > 0 {
                version.bump_major()
            } else if version.minor > 0 {
                version.bump_minor()
            } else {
                version.bump_patch()
            };
            return Some(Self {
                ranges: Ranges::between(version, upper),
                original: Arc::from(input),
            });
        }

        // Tilde: ~3.8 means >=3.8 <3.9, ~3 means >=3 <4
        if let Some(rest) = input.strip_prefix('~') {
            let version = PythonVersion::parse(rest.trim())?;
            let upper = if version.precision() >= 2 {
                version.bump_minor()
            } else {
                version.bump_major()
            };
            return Some(Self {
                ranges: Ranges::between(version, upper),
                original: Arc::from(input),
            });
        }

        // Wildcard patterns: 3.8.*, 3.*
        if input.ends_with(".*") || input.ends_with(".x") {
            return Self::parse_wildcard(input);
        }

        // Bare version = exact match
        let version = PythonVersion::parse(input)?;
        Some(Self::exact(version))
    }

    fn parse_wildcard(input: &str) -> Option<Self> {
        let prefix = &input[..input.len() - 2];
        let parts: Vec<&str> = prefix.split('.').collect();

        let (lower, upper) = match parts.as_slice() {
            [major] => {
                let major: u64 = major.parse().ok()?;
                (
                    PythonVersion::new(major, 0, 0),
                    PythonVersion::new(major.saturating_add(1), 0, 0),
                )
            }
            [major, minor] => {
                let major: u64 = major.parse().ok()?;
                let minor: u64 = minor.parse().ok()?;
                (
                    PythonVersion::new(major, minor, 0),
                    PythonVersion::new(major, minor.saturating_add(1), 0),
                )
            }
            [major, minor, patch] => {
                let major: u64 = major.parse().ok()?;
                let minor: u64 = minor.parse().ok()?;
                let patch: u64 = patch.parse().ok()?;
                (
                    PythonVersion::new(major, minor, patch),
                    PythonVersion::new(major, minor, patch.saturating_add(1)),
                )
            }
            _ => return None,
        };

        Some(Self {
            ranges: Ranges::between(lower, upper),
            original: Arc::from(input),
        })
    }

    /// Check if a version matches this constraint.
    #[must_use]
    pub fn matches(&self, version: &PythonVersion) -> bool {
        self.ranges.contains(version)
    }

    /// Get the underlying ranges.
    #[must_use]
    pub const fn ranges(&self) -> &Ranges<PythonVersion> {
        &self.ranges
    }

    /// Get the original constraint string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// Check if this constraint is empty (matches nothing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges == Ranges::empty()
    }

    /// Check if this constraint matches every version.
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.ranges == Ranges::full()
    }

    /// Compute the intersection of two constraints.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            ranges: self.ranges.intersection(&other.ranges),
            original: Arc::from(format!("({}) ∩ ({})", self.original, other.original)),
        }
    }

    /// Compute the union of two constraints.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            ranges: self.ranges.union(&other.ranges),
            original: Arc::from(format!("{} || {}", self.original, other.original)),
        }
    }

    /// Compute the complement of this constraint.
    #[must_use]
    pub fn complement(&self) -> Self {
        Self {
            ranges: self.ranges.complement(),
            original: Arc::from(format!("not({})", self.original)),
        }
    }
}

impl Default for VersionConstraint {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Debug for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionConstraint")
            .field("original", &self.original)
            .finish()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.original)
    }
}

impl PartialEq for VersionConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.original == other.original
    }
}

impl Eq for VersionConstraint {}

impl Hash for VersionConstraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.original.hash(state);
    }
}

impl FromStr for VersionConstraint {
    type Err = ConstraintParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ConstraintParseError(s.to_string()))
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

impl<'de> Deserialize<'de> for VersionConstraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid constraint: {s}")))
    }
}

/// Error when parsing a constraint string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid constraint string: {0}")]
pub struct ConstraintParseError(pub String);

impl From<VersionParseError> for stanza_core::Error {
    fn from(err: VersionParseError) -> Self {
        Self::invalid_version(err.0)
    }
}

impl From<ConstraintParseError> for stanza_core::Error {
    fn from(err: ConstraintParseError) -> Self {
        Self::invalid_constraint(err.0)
    }
}

/// Clear the version and constraint caches.
pub fn clear_caches() {
    VERSION_CACHE.write().clear();
    CONSTRAINT_CACHE.write().clear();
}
