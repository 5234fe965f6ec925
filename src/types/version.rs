//! Engine version tokens and schema era selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TranscodeError;

/// A four-component engine version, totally ordered.
///
/// Compared lexicographically: major, then minor, patch and build stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct EngineVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
    pub build: u16,
}

impl EngineVersion {
    pub const fn new(major: u16, minor: u16, patch: u16, build: u16) -> Self {
        Self {
            major,
            minor,
            patch,
            build,
        }
    }

    /// The schema era this version serializes vertex data in.
    pub fn era(&self) -> SchemaEra {
        SchemaEra::from_version(*self)
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.patch, self.build
        )
    }
}

impl FromStr for EngineVersion {
    type Err = TranscodeError;

    /// Parse a dotted version token such as `"2018.1.0.0"`.
    ///
    /// Up to four components; missing trailing components default to zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut components = [0u16; 4];
        let mut count = 0;
        for part in s.split('.') {
            if count == components.len() {
                return Err(TranscodeError::InvalidVersion(s.to_string()));
            }
            components[count] = part
                .parse()
                .map_err(|_| TranscodeError::InvalidVersion(s.to_string()))?;
            count += 1;
        }
        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

/// First version of the six-channel era.
const SIX_CHANNEL_VERSION: EngineVersion = EngineVersion::new(4, 0, 0, 0);
/// First version of the eight-channel era.
const EIGHT_CHANNEL_VERSION: EngineVersion = EngineVersion::new(5, 0, 0, 0);
/// First version of the fourteen-channel era.
const FOURTEEN_CHANNEL_VERSION: EngineVersion = EngineVersion::new(2018, 1, 0, 0);

/// One of the four historical vertex attribute indexing schemes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SchemaEra {
    /// Per-stream descriptors, no channel array.
    Legacy,
    /// Six-entry channel array.
    SixChannel,
    /// Eight-entry channel array, two extra UV sets.
    EightChannel,
    /// Fourteen-entry channel array with native skin channels.
    FourteenChannel,
}

impl SchemaEra {
    /// Select the era a given engine version serializes vertex data in.
    pub fn from_version(version: EngineVersion) -> SchemaEra {
        if version < SIX_CHANNEL_VERSION {
            SchemaEra::Legacy
        } else if version < EIGHT_CHANNEL_VERSION {
            SchemaEra::SixChannel
        } else if version < FOURTEEN_CHANNEL_VERSION {
            SchemaEra::EightChannel
        } else {
            SchemaEra::FourteenChannel
        }
    }

    /// The serialized vertex-data schema version this era writes.
    ///
    /// Version 2 marks serializers with native skin channels; every older era
    /// writes version 1.
    pub fn serialized_version(&self) -> u32 {
        match self {
            SchemaEra::FourteenChannel => 2,
            _ => 1,
        }
    }

    /// Whether loaders of this era ignore explicit channel offsets and assume
    /// tight in-array-order packing per stream.
    pub fn loader_ignores_offsets(&self) -> bool {
        matches!(self, SchemaEra::SixChannel | SchemaEra::EightChannel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_era_thresholds() {
        assert_eq!(EngineVersion::new(3, 5, 7, 0).era(), SchemaEra::Legacy);
        assert_eq!(EngineVersion::new(4, 0, 0, 0).era(), SchemaEra::SixChannel);
        assert_eq!(EngineVersion::new(4, 7, 2, 1).era(), SchemaEra::SixChannel);
        assert_eq!(EngineVersion::new(5, 0, 0, 0).era(), SchemaEra::EightChannel);
        assert_eq!(
            EngineVersion::new(2017, 4, 40, 0).era(),
            SchemaEra::EightChannel
        );
        assert_eq!(
            EngineVersion::new(2018, 0, 0, 0).era(),
            SchemaEra::EightChannel
        );
        assert_eq!(
            EngineVersion::new(2018, 1, 0, 0).era(),
            SchemaEra::FourteenChannel
        );
        assert_eq!(
            EngineVersion::new(2019, 4, 31, 1).era(),
            SchemaEra::FourteenChannel
        );
    }

    #[test]
    fn test_version_ordering() {
        assert!(EngineVersion::new(4, 7, 2, 0) < EngineVersion::new(5, 0, 0, 0));
        assert!(EngineVersion::new(2017, 4, 0, 0) < EngineVersion::new(2018, 1, 0, 0));
        assert!(EngineVersion::new(5, 6, 0, 1) > EngineVersion::new(5, 6, 0, 0));
    }

    #[test]
    fn test_serialized_versions() {
        assert_eq!(SchemaEra::Legacy.serialized_version(), 1);
        assert_eq!(SchemaEra::SixChannel.serialized_version(), 1);
        assert_eq!(SchemaEra::EightChannel.serialized_version(), 1);
        assert_eq!(SchemaEra::FourteenChannel.serialized_version(), 2);
    }

    #[test]
    fn test_parse_version_tokens() {
        let version: EngineVersion = "2018.1.0.0".parse().unwrap();
        assert_eq!(version, EngineVersion::new(2018, 1, 0, 0));

        // Missing trailing components default to zero.
        let version: EngineVersion = "5.6".parse().unwrap();
        assert_eq!(version, EngineVersion::new(5, 6, 0, 0));

        assert!("".parse::<EngineVersion>().is_err());
        assert!("4.x".parse::<EngineVersion>().is_err());
        assert!("1.2.3.4.5".parse::<EngineVersion>().is_err());
    }

    #[test]
    fn test_version_display_round_trip() {
        let version = EngineVersion::new(2019, 2, 0, 3);
        let parsed: EngineVersion = version.to_string().parse().unwrap();
        assert_eq!(parsed, version);
    }

    #[test]
    fn test_era_ordering() {
        assert!(SchemaEra::Legacy < SchemaEra::SixChannel);
        assert!(SchemaEra::SixChannel < SchemaEra::EightChannel);
        assert!(SchemaEra::EightChannel < SchemaEra::FourteenChannel);
    }
}
