//! Routing parameters.
//!
//! All thresholds that influence classification and search live here so that every entry point
//! (pure functions, [Router](crate::router::Router), the demo) agrees on one set of defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RouteError};

/// Default values used by serde when a field is missing.
pub mod defaults {
    /// Integer downsample factor between image pixels and grid cells.
    pub fn scale() -> u32 {
        3
    }

    /// Saturation ceiling on a 0-255 scale (exclusive).
    pub fn sat_max() -> u8 {
        40
    }

    /// Value floor on a 0-255 scale (exclusive).
    pub fn val_min() -> u8 {
        200
    }

    /// Node expansions allowed per search phase.
    pub fn max_expansions() -> usize {
        4_000_000
    }

    pub fn enabled() -> bool {
        true
    }
}

/// Tunable parameters of a routing request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteParams {
    /// Downsample factor, must be at least 1
    #[serde(default = "defaults::scale")]
    pub scale: u32,

    /// A cell is walkable only if its saturation is below this
    #[serde(default = "defaults::sat_max")]
    pub sat_max: u8,

    /// A cell is walkable only if its value is above this
    #[serde(default = "defaults::val_min")]
    pub val_min: u8,

    /// Budget for each snap and A* phase
    #[serde(default = "defaults::max_expansions")]
    pub max_expansions: usize,

    /// Draw a straight line when no walkway connects the endpoints
    #[serde(default = "defaults::enabled")]
    pub fallback: bool,
}

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            scale: defaults::scale(),
            sat_max: defaults::sat_max(),
            val_min: defaults::val_min(),
            max_expansions: defaults::max_expansions(),
            fallback: defaults::enabled(),
        }
    }
}

impl RouteParams {
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    /// Rejects parameter sets the classifier cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.scale == 0 {
            return Err(RouteError::InvalidParams(
                "downsample scale must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    /// Parses parameters from JSON, filling in defaults for missing fields.
    pub fn from_json(text: &str) -> Result<Self> {
        let params: RouteParams = serde_json::from_str(text)?;
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_campus_thresholds() {
        let params = RouteParams::default();
        assert_eq!(params.scale, 3);
        assert_eq!(params.sat_max, 40);
        assert_eq!(params.val_min, 200);
        assert!(params.fallback);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let params = RouteParams::from_json(r#"{ "scale": 2, "fallback": false }"#).unwrap();
        assert_eq!(params.scale, 2);
        assert_eq!(params.val_min, 200);
        assert!(!params.fallback);
    }

    #[test]
    fn zero_scale_is_rejected() {
        assert!(matches!(
            RouteParams::from_json(r#"{ "scale": 0 }"#),
            Err(RouteError::InvalidParams(_))
        ));
    }
}
