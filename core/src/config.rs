use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// Distance reported for an edge that is not present.
pub const DEFAULT_DISTANCE: f64 = 1.0;

/// Speed limit reported for an edge that is not present.
pub const DEFAULT_SPEED_LIMIT: f64 = 30.0;

/// Node count above which quadratic and cubic analyses log a warning.
pub const DEFAULT_ANALYSIS_NODE_CEILING: usize = 500;

/// Which derived scalar the algorithms treat as an edge's weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricMode {
    #[default]
    Distance,
    /// `distance / speed_limit`.
    Time,
}

impl MetricMode {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricMode::Distance => "distance",
            MetricMode::Time => "time",
        }
    }
}

impl fmt::Display for MetricMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricMode {
    type Err = GraphError;

    /// Accepts "distance" / "time" (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "distance" | "dist" => Ok(MetricMode::Distance),
            "time" => Ok(MetricMode::Time),
            other => Err(GraphError::InvalidConfig(format!(
                "unknown metric mode '{other}', use 'distance' or 'time'"
            ))),
        }
    }
}

/// Runtime settings of a [`RoadGraph`](crate::RoadGraph) instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    pub metric_mode: MetricMode,
    pub default_distance: f64,
    pub default_speed_limit: f64,
    /// Only affects logging, never results.
    pub analysis_node_ceiling: usize,
}

impl GraphConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.default_distance.is_finite() && self.default_distance > 0.0) {
            return Err(GraphError::InvalidConfig(format!(
                "default_distance must be positive, got {}",
                self.default_distance
            )));
        }
        if !(self.default_speed_limit.is_finite() && self.default_speed_limit > 0.0) {
            return Err(GraphError::InvalidConfig(format!(
                "default_speed_limit must be positive, got {}",
                self.default_speed_limit
            )));
        }
        Ok(())
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            metric_mode: MetricMode::Distance,
            default_distance: DEFAULT_DISTANCE,
            default_speed_limit: DEFAULT_SPEED_LIMIT,
            analysis_node_ceiling: DEFAULT_ANALYSIS_NODE_CEILING,
        }
    }
}
