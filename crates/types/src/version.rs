//! Title versions
//!
//! A title version is a raw 32-bit ordinal. For system titles the ordinal
//! packs a display triple:
//!
//! ```text
//!  31      26 25     20 19  16 15              0
//! +----------+---------+------+-----------------+
//! |  major   |  minor  | patch|    revision     |
//! +----------+---------+------+-----------------+
//! ```
//!
//! Ordering and equality only ever look at the raw ordinal.

use nxfw_errors::VersionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleVersion(u32);

impl TitleVersion {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Pack a display triple into an ordinal with revision 0
    ///
    /// Components wider than their bit field are masked.
    #[must_use]
    pub const fn from_parts(major: u32, minor: u32, patch: u32) -> Self {
        Self(((major & 0x3f) << 26) | ((minor & 0x3f) << 20) | ((patch & 0xf) << 16))
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn major(self) -> u32 {
        (self.0 >> 26) & 0x3f
    }

    #[must_use]
    pub const fn minor(self) -> u32 {
        (self.0 >> 20) & 0x3f
    }

    #[must_use]
    pub const fn patch(self) -> u32 {
        (self.0 >> 16) & 0xf
    }

    #[must_use]
    pub const fn revision(self) -> u32 {
        self.0 & 0xffff
    }
}

impl fmt::Display for TitleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

impl FromStr for TitleVersion {
    type Err = VersionError;

    /// Parse the decimal ordinal, as stored in a system version file
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| VersionError::InvalidVersion {
                input: s.to_string(),
            })
    }
}

impl From<u32> for TitleVersion {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_firmware_ordinal() {
        // 11.0.1 as published by the CDN
        let v = TitleVersion::new(738_263_040);
        assert_eq!((v.major(), v.minor(), v.patch()), (11, 0, 1));
        assert_eq!(v.to_string(), "11.0.1");
    }

    #[test]
    fn test_from_parts() {
        let v = TitleVersion::from_parts(16, 1, 0);
        assert_eq!(v.to_string(), "16.1.0");
        assert_eq!(v.revision(), 0);
    }

    #[test]
    fn test_parse_trims_version_file_contents() {
        let v: TitleVersion = "1073741824\n".parse().unwrap();
        assert_eq!(v.raw(), 1_073_741_824);
        assert!("abc".parse::<TitleVersion>().is_err());
        assert!("-1".parse::<TitleVersion>().is_err());
    }

    #[test]
    fn test_ordering_uses_raw_ordinal() {
        assert!(TitleVersion::new(50) < TitleVersion::new(100));
        assert_eq!(TitleVersion::new(100), TitleVersion::new(100));
        // Same display triple, different revision: not equal
        assert_ne!(TitleVersion::new(0x0400_0000), TitleVersion::new(0x0400_0001));
    }
}
