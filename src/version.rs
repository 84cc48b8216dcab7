//! Library version requirements.
//!
//! Versions compare numerically component by component. Missing components
//! count as zero, so `1.0` equals `1.0.0`. Only the leading digits of a
//! component are read (`0rc1` is `0`), and components past the third are
//! ignored.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// `major.minor.patch` library version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted version string.
    pub fn parse(s: &str) -> Result<Self, DescriptorError> {
        let invalid = || DescriptorError::InvalidVersion(s.to_string());
        let trimmed = s.trim().trim_start_matches('v');
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut parts = [0u32; 3];
        for (slot, component) in parts.iter_mut().zip(trimmed.split('.')) {
            let digits: &str = &component[..component
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(component.len())];
            *slot = digits.parse().map_err(|_| invalid())?;
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl FromStr for Version {
    type Err = DescriptorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// How a requirement compares against a reported version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `==x.y.z`
    Exact,
    /// `>=x.y.z`
    AtLeast,
}

/// Version a capability contract demands of the wrapped library.
///
/// Written as `==0.44.1` or `>=0.5.0`; a bare version means `==`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionRequirement {
    pub comparator: Comparator,
    pub version: Version,
}

impl VersionRequirement {
    pub const fn exact(version: Version) -> Self {
        Self {
            comparator: Comparator::Exact,
            version,
        }
    }

    pub const fn at_least(version: Version) -> Self {
        Self {
            comparator: Comparator::AtLeast,
            version,
        }
    }

    /// Parse `>=x.y.z`, `==x.y.z` or a bare `x.y.z`.
    pub fn parse(s: &str) -> Result<Self, DescriptorError> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix(">=") {
            Ok(Self::at_least(Version::parse(rest)?))
        } else {
            let rest = s.strip_prefix("==").unwrap_or(s);
            Ok(Self::exact(Version::parse(rest)?))
        }
    }

    /// Returns `true` if `version` satisfies this requirement.
    pub fn matches(&self, version: &Version) -> bool {
        match self.comparator {
            Comparator::Exact => *version == self.version,
            Comparator::AtLeast => *version >= self.version,
        }
    }

    /// Check a version as the library reports it. Unparseable versions
    /// never match.
    pub fn matches_str(&self, version: &str) -> bool {
        Version::parse(version).is_ok_and(|v| self.matches(&v))
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.comparator {
            Comparator::Exact => "==",
            Comparator::AtLeast => ">=",
        };
        write!(f, "{op}{}", self.version)
    }
}

impl TryFrom<String> for VersionRequirement {
    type Error = DescriptorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<VersionRequirement> for String {
    fn from(req: VersionRequirement) -> Self {
        req.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(Version::parse("0.44.1").unwrap(), Version::new(0, 44, 1));
        assert_eq!(Version::parse("1.0").unwrap(), Version::new(1, 0, 0));
        assert_eq!(Version::parse("v2").unwrap(), Version::new(2, 0, 0));
        assert_eq!(Version::parse("1.2.0rc1").unwrap(), Version::new(1, 2, 0));
        assert_eq!(Version::parse("0.5.0.post3").unwrap(), Version::new(0, 5, 0));
        assert!(Version::parse("").is_err());
        assert!(Version::parse("latest").is_err());
        assert!(Version::parse("1..2").is_err());
    }

    #[test]
    fn test_numeric_not_lexical_ordering() {
        assert!(Version::new(0, 10, 0) > Version::new(0, 9, 9));
        let req = VersionRequirement::parse(">=0.5.0").unwrap();
        assert!(req.matches_str("0.10.0"));
        assert!(!req.matches_str("0.4.9"));
    }

    #[test]
    fn test_exact_requirement() {
        let req = VersionRequirement::parse("==0.44.1").unwrap();
        assert!(req.matches_str("0.44.1"));
        assert!(!req.matches_str("0.45.0"));
        assert!(!req.matches_str("garbage"));
        assert_eq!(VersionRequirement::parse("0.44.1").unwrap(), req);
    }

    #[test]
    fn test_requirement_serde_as_string() {
        let req = VersionRequirement::at_least(Version::new(1, 0, 0));
        let encoded = serde_json::to_value(req).unwrap();
        assert_eq!(encoded, serde_json::json!(">=1.0.0"));
        let decoded: VersionRequirement = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded, req);
        assert!(serde_json::from_str::<VersionRequirement>("\">=soon\"").is_err());
    }
}
