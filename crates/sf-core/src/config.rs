//! Route pipeline configuration.
//!
//! One `RouteConfig` parameterizes the whole pipeline: which area and
//! network to load, which candidates count as "nearby", and how distance is
//! turned into a time estimate.
//!
//! # TOML
//!
//! Every key is optional; missing keys take the defaults below.
//!
//! ```toml
//! area                 = "Lviv, Ukraine"
//! network_type         = "walk"
//! radius_min_km        = 0.2
//! radius_max_km        = 1.0
//! assumed_speed_kmh    = 5.0
//! city_qualifier       = "Львів, Україна"
//! geocode_timeout_ms   = 10000
//! max_snap_distance_m  = 250.0
//! ```
//!
//! | Key                    | Default            |
//! |------------------------|--------------------|
//! | `area`                 | `"Lviv, Ukraine"`  |
//! | `network_type`         | `"drive"`          |
//! | `radius_min_km`        | `0.0`              |
//! | `radius_max_km`        | `1.0`              |
//! | `assumed_speed_kmh`    | `5.0`              |
//! | `city_qualifier`       | `"Львів, Україна"` |
//! | `geocode_timeout_ms`   | `10000`            |
//! | `max_snap_distance_m`  | unset (no limit)   |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult, NetworkType};

// ── RadiusBand ────────────────────────────────────────────────────────────────

/// Inclusive geodesic distance band, in kilometres, that a destination must
/// fall into to be considered a candidate.
///
/// Two policies are in use: an upper bound only (`0 ..= max`) and a band
/// that also excludes very close destinations (`min ..= max`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RadiusBand {
    pub min_km: f64,
    pub max_km: f64,
}

impl RadiusBand {
    /// Keep everything up to `max_km`.
    pub const fn upper_bound(max_km: f64) -> Self {
        Self { min_km: 0.0, max_km }
    }

    /// Keep destinations between `min_km` and `max_km`, both inclusive.
    pub const fn band(min_km: f64, max_km: f64) -> Self {
        Self { min_km, max_km }
    }

    #[inline]
    pub fn contains(&self, distance_km: f64) -> bool {
        distance_km >= self.min_km && distance_km <= self.max_km
    }
}

// ── RouteConfig ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouteConfig {
    /// Place name of the street graph, also the cache key.
    pub area: String,

    /// Pedestrian or drivable network.
    pub network_type: NetworkType,

    /// Lower bound of the candidate radius, km.  `0.0` disables it.
    pub radius_min_km: f64,

    /// Upper bound of the candidate radius, km.
    pub radius_max_km: f64,

    /// Speed used to turn route length into minutes.  Pick a value that
    /// matches `network_type`; nothing here infers one from the other.
    pub assumed_speed_kmh: f64,

    /// Appended to free-text addresses before geocoding.
    pub city_qualifier: String,

    /// Upper bound on one geocoding request, milliseconds.
    pub geocode_timeout_ms: u64,

    /// Maximum geodesic distance between a point and its snapped graph node.
    pub max_snap_distance_m: Option<f64>,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            area:                 "Lviv, Ukraine".to_owned(),
            network_type:         NetworkType::Drive,
            radius_min_km:        0.0,
            radius_max_km:        1.0,
            assumed_speed_kmh:    5.0,
            city_qualifier:       "Львів, Україна".to_owned(),
            geocode_timeout_ms:   10_000,
            max_snap_distance_m:  None,
        }
    }
}

impl RouteConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> CoreResult<Self> {
        let config: RouteConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = area.into();
        self
    }

    pub fn with_network_type(mut self, network_type: NetworkType) -> Self {
        self.network_type = network_type;
        self
    }

    pub fn with_radius(mut self, band: RadiusBand) -> Self {
        self.radius_min_km = band.min_km;
        self.radius_max_km = band.max_km;
        self
    }

    pub fn with_speed_kmh(mut self, speed: f64) -> Self {
        self.assumed_speed_kmh = speed;
        self
    }

    pub fn with_city_qualifier(mut self, qualifier: impl Into<String>) -> Self {
        self.city_qualifier = qualifier.into();
        self
    }

    pub fn with_geocode_timeout(mut self, timeout: Duration) -> Self {
        self.geocode_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_max_snap_distance_m(mut self, metres: Option<f64>) -> Self {
        self.max_snap_distance_m = metres;
        self
    }

    pub fn radius_band(&self) -> RadiusBand {
        RadiusBand::band(self.radius_min_km, self.radius_max_km)
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_millis(self.geocode_timeout_ms)
    }

    /// Check every numeric field for values the pipeline cannot work with.
    pub fn validate(&self) -> CoreResult<()> {
        if self.area.trim().is_empty() {
            return Err(invalid("area", "must not be empty".to_owned()));
        }
        if !self.radius_min_km.is_finite() || self.radius_min_km < 0.0 {
            return Err(invalid(
                "radius_min_km",
                format!("must be a finite value >= 0, got {}", self.radius_min_km),
            ));
        }
        if !self.radius_max_km.is_finite() || self.radius_max_km < self.radius_min_km {
            return Err(invalid(
                "radius_max_km",
                format!(
                    "must be finite and >= radius_min_km ({}), got {}",
                    self.radius_min_km, self.radius_max_km
                ),
            ));
        }
        if !self.assumed_speed_kmh.is_finite() || self.assumed_speed_kmh <= 0.0 {
            return Err(invalid(
                "assumed_speed_kmh",
                format!("must be a finite value > 0, got {}", self.assumed_speed_kmh),
            ));
        }
        if self.geocode_timeout_ms == 0 {
            return Err(invalid("geocode_timeout_ms", "must be at least 1".to_owned()));
        }
        if let Some(m) = self.max_snap_distance_m {
            if !m.is_finite() || m < 0.0 {
                return Err(invalid(
                    "max_snap_distance_m",
                    format!("must be a finite value >= 0, got {m}"),
                ));
            }
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> CoreError {
    CoreError::InvalidConfig { field, reason }
}
