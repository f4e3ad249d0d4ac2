use std::{cmp::Ordering, fmt, str::FromStr};

#[cfg(feature = "miette")]
use miette::Diagnostic;
use thiserror::Error;

/// The version a release note is keyed by, e.g. `1.0.1` or `2.0.0-rc.1`.
///
/// Every version has exactly one spelling: numbers without leading zeros or signs, and a
/// lowercase prerelease label. Displaying a parsed version gives back the text it came from,
/// which is also the stem of its note's file name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Version {
    major: u64,
    minor: u64,
    patch: u64,
    pre: Option<Prerelease>,
}

impl Version {
    #[must_use]
    pub const fn stable(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre: None,
        }
    }

    #[must_use]
    pub const fn major(&self) -> u64 {
        self.major
    }

    #[must_use]
    pub const fn minor(&self) -> u64 {
        self.minor
    }

    #[must_use]
    pub const fn patch(&self) -> u64 {
        self.patch
    }

    #[must_use]
    pub const fn prerelease(&self) -> Option<&Prerelease> {
        self.pre.as_ref()
    }

    #[must_use]
    pub const fn is_prerelease(&self) -> bool {
        self.pre.is_some()
    }

    const fn release(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

/// A release sorts after every one of its prereleases.
impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.release()
            .cmp(&other.release())
            .then_with(|| match (&self.pre, &other.pre) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(pre), Some(other_pre)) => pre.cmp(other_pre),
            })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre {
            write!(f, "-{pre}")?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| InvalidVersion {
            version: s.to_string(),
            reason,
        };
        let (release, pre) = match s.split_once('-') {
            Some((release, pre)) => (release, Some(pre)),
            None => (s, None),
        };
        let parts: Vec<&str> = release.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(invalid(Reason::PartCount));
        };
        let number = |part: &str| canonical_number(part).ok_or_else(|| invalid(Reason::Number));
        Ok(Self {
            major: number(*major)?,
            minor: number(*minor)?,
            patch: number(*patch)?,
            pre: pre.map(Prerelease::parse).transpose().map_err(invalid)?,
        })
    }
}

/// Digits only, and no leading zero unless the number is zero.
fn canonical_number(part: &str) -> Option<u64> {
    let digits_only = !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit());
    if !digits_only || (part.len() > 1 && part.starts_with('0')) {
        return None;
    }
    part.parse().ok()
}

/// The `rc.1` in `2.0.0-rc.1`. Labels compare alphabetically, then numbers numerically.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Prerelease {
    label: String,
    number: u64,
}

impl Prerelease {
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    fn parse(s: &str) -> Result<Self, Reason> {
        let (label, number) = s.split_once('.').ok_or(Reason::PrereleaseShape)?;
        let label_ok = !label.is_empty()
            && label
                .bytes()
                .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit());
        if !label_ok {
            return Err(Reason::Label);
        }
        Ok(Self {
            label: label.to_string(),
            number: canonical_number(number).ok_or(Reason::Number)?,
        })
    }
}

impl fmt::Display for Prerelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.label, self.number)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Reason {
    PartCount,
    Number,
    PrereleaseShape,
    Label,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PartCount => "expected MAJOR.MINOR.PATCH",
            Self::Number => "numbers are plain digits with no leading zeros",
            Self::PrereleaseShape => "a prerelease looks like label.N",
            Self::Label => "a prerelease label is lowercase letters and digits",
        })
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[cfg_attr(feature = "miette", derive(Diagnostic))]
#[error("{version} isn't a release version: {reason}")]
#[cfg_attr(
    feature = "miette",
    diagnostic(
        code(version::invalid),
        help("Release notes are keyed by versions like 1.0.1 or 2.0.0-rc.1")
    )
)]
pub struct InvalidVersion {
    pub version: String,
    reason: Reason,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod test_version {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_stable() {
        let version = Version::from_str("1.0.1").unwrap();
        assert_eq!(version, Version::stable(1, 0, 1));
        assert!(!version.is_prerelease());
    }

    #[test]
    fn parse_prerelease() {
        let version = Version::from_str("2.0.0-rc.3").unwrap();
        assert_eq!(version.major(), 2);
        let pre = version.prerelease().unwrap();
        assert_eq!(pre.label(), "rc");
        assert_eq!(pre.number(), 3);
    }

    #[test]
    fn display_round_trips() {
        for version in ["0.1.2", "10.20.30", "1.0.0-beta.0", "3.0.0-rc2.10"] {
            assert_eq!(Version::from_str(version).unwrap().to_string(), version);
        }
    }

    #[test]
    fn reject_garbage() {
        for version in ["", "1.0", "1.0.0.0", "v1.0.0", "1.0.0-rc", "1.0.0-.1", "1.0.x"] {
            let err = Version::from_str(version).unwrap_err();
            assert_eq!(err.version, version);
        }
    }

    #[test]
    fn reject_other_spellings() {
        for version in [
            "+1.0.0",
            "01.0.0",
            "1.00.0",
            "1.0.+1",
            "1.0.0-RC.1",
            "1.0.0-rc.01",
            "1.0.0-rc.+1",
            " 1.0.0",
        ] {
            assert!(Version::from_str(version).is_err(), "{version} parsed");
        }
    }

    #[test]
    fn prerelease_before_stable() {
        let pre = Version::from_str("1.0.0-rc.1").unwrap();
        let stable = Version::from_str("1.0.0").unwrap();
        let older = Version::from_str("0.9.9").unwrap();
        assert!(older < pre);
        assert!(pre < stable);
    }

    #[test]
    fn prerelease_ordering() {
        let alpha = Version::from_str("1.0.0-alpha.2").unwrap();
        let beta = Version::from_str("1.0.0-beta.1").unwrap();
        let beta_2 = Version::from_str("1.0.0-beta.2").unwrap();
        let beta_10 = Version::from_str("1.0.0-beta.10").unwrap();
        assert!(alpha < beta);
        assert!(beta < beta_2);
        assert!(beta_2 < beta_10);
    }

    #[test]
    fn numeric_not_lexical() {
        let nine = Version::from_str("1.9.0").unwrap();
        let ten = Version::from_str("1.10.0").unwrap();
        assert!(nine < ten);
    }
}
