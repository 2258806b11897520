//! Street-network flavour selector.
//!
//! The network type decides which OSM ways become graph edges and whether
//! one-way restrictions apply.  It does not imply a travel speed: the speed
//! used for time estimates is a separate [`RouteConfig`](crate::RouteConfig)
//! value chosen by the deployment.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Which ways of the street network are routable.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    /// Pedestrian-accessible ways; every way is traversable in both directions.
    Walk,
    /// Car-drivable ways; `oneway` restrictions are honoured.
    #[default]
    Drive,
}

impl NetworkType {
    /// Stable lowercase label, used in cache file names and config files.
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkType::Walk  => "walk",
            NetworkType::Drive => "drive",
        }
    }

    /// `true` if one-way tags restrict traversal direction.
    #[inline]
    pub fn honours_oneway(self) -> bool {
        matches!(self, NetworkType::Drive)
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NetworkType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk" | "pedestrian" => Ok(NetworkType::Walk),
            "drive" | "car"       => Ok(NetworkType::Drive),
            other => Err(CoreError::InvalidConfig {
                field:  "network_type",
                reason: format!("unknown network type {other:?}; expected \"walk\" or \"drive\""),
            }),
        }
    }
}
