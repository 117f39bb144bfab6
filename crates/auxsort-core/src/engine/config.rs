use crate::core::models::naming::Subsystem;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tolerance (cm) applied to module centers when no other value is configured.
pub const DEFAULT_MODULE_TOLERANCE_CM: f64 = 0.1;
/// Tolerance (cm) applied to strip centers when no other value is configured.
pub const DEFAULT_SENSITIVE_TOLERANCE_CM: f64 = 0.001;
/// Largest accepted numbering origin. A slice never holds more than `isize::MAX`
/// elements, so indices counted from here cannot overflow `usize`.
pub const MAX_FIRST_INDEX: usize = isize::MAX as usize;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Tolerance for axis {axis} must be finite and non-negative, got {tolerance}")]
    InvalidTolerance { axis: Axis, tolerance: f64 },

    #[error("Axis {0} appears more than once in the axis order")]
    DuplicateAxis(Axis),

    #[error("Axis order must name at least one axis")]
    EmptyAxisOrder,

    #[error("Invalid axis key '{0}'. Expected '<x|y|z><+|->[@tolerance]' (e.g. 'z+@0.1')")]
    InvalidAxisKey(String),

    #[error("Invalid sort strategy '{0}'. Expected 'spatial' or 'volume-name'")]
    InvalidStrategy(String),

    #[error("First index {0} is too large; the maximum is {MAX_FIRST_INDEX}")]
    FirstIndexOutOfRange(usize),
}

/// A Cartesian axis of the reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Picks this axis' component out of a point.
    #[inline]
    pub fn component(self, point: &Point3<f64>) -> f64 {
        match self {
            Axis::X => point.x,
            Axis::Y => point.y,
            Axis::Z => point.z,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        })
    }
}

impl FromStr for Axis {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(ConfigError::InvalidAxisKey(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// One level of the spatial ordering: an axis, its direction, and the tolerance
/// below which two coordinates on that axis count as equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisKey {
    pub axis: Axis,
    pub direction: Direction,
    pub tolerance: f64,
}

impl AxisKey {
    pub fn ascending(axis: Axis, tolerance: f64) -> Self {
        Self {
            axis,
            direction: Direction::Ascending,
            tolerance,
        }
    }

    pub fn descending(axis: Axis, tolerance: f64) -> Self {
        Self {
            axis,
            direction: Direction::Descending,
            tolerance,
        }
    }

    /// The coordinate of `point` on this axis, negated for descending keys so that
    /// the ordering code only ever sorts ascending.
    #[inline]
    pub fn oriented_value(&self, point: &Point3<f64>) -> f64 {
        let value = self.axis.component(point);
        match self.direction {
            Direction::Ascending => value,
            Direction::Descending => -value,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance.is_finite() && self.tolerance >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidTolerance {
                axis: self.axis,
                tolerance: self.tolerance,
            })
        }
    }
}

impl fmt::Display for AxisKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.direction {
            Direction::Ascending => '+',
            Direction::Descending => '-',
        };
        write!(f, "{}{}@{}", self.axis, sign, self.tolerance)
    }
}

/// Validated, ordered list of axis keys: primary axis first.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisOrder {
    keys: Vec<AxisKey>,
}

impl AxisOrder {
    /// Builds an axis order, rejecting empty lists, repeated axes and invalid tolerances.
    pub fn new(keys: Vec<AxisKey>) -> Result<Self, ConfigError> {
        if keys.is_empty() {
            return Err(ConfigError::EmptyAxisOrder);
        }
        for (i, key) in keys.iter().enumerate() {
            key.validate()?;
            if keys[..i].iter().any(|k| k.axis == key.axis) {
                return Err(ConfigError::DuplicateAxis(key.axis));
            }
        }
        Ok(Self { keys })
    }

    /// Standard module ordering: along the beam (z) first, then across (x), then
    /// vertically (y), all ascending.
    pub fn standard_modules() -> Self {
        Self {
            keys: vec![
                AxisKey::ascending(Axis::Z, DEFAULT_MODULE_TOLERANCE_CM),
                AxisKey::ascending(Axis::X, DEFAULT_MODULE_TOLERANCE_CM),
                AxisKey::ascending(Axis::Y, DEFAULT_MODULE_TOLERANCE_CM),
            ],
        }
    }

    /// Standard strip ordering for two-layer modules: top layer first, then across
    /// the module (x), then along it (z).
    pub fn standard_sensitive() -> Self {
        Self {
            keys: vec![
                AxisKey::descending(Axis::Y, DEFAULT_SENSITIVE_TOLERANCE_CM),
                AxisKey::ascending(Axis::X, DEFAULT_SENSITIVE_TOLERANCE_CM),
                AxisKey::ascending(Axis::Z, DEFAULT_SENSITIVE_TOLERANCE_CM),
            ],
        }
    }

    /// Standard strip ordering for single-layer MINOS modules, whose strips are
    /// stacked along the local y axis.
    pub fn standard_minos_sensitive() -> Self {
        Self {
            keys: vec![
                AxisKey::ascending(Axis::Y, DEFAULT_SENSITIVE_TOLERANCE_CM),
                AxisKey::ascending(Axis::X, DEFAULT_SENSITIVE_TOLERANCE_CM),
                AxisKey::ascending(Axis::Z, DEFAULT_SENSITIVE_TOLERANCE_CM),
            ],
        }
    }

    pub fn keys(&self) -> &[AxisKey] {
        &self.keys
    }

    /// Returns a copy with every tolerance replaced by `tolerance`.
    pub fn with_uniform_tolerance(&self, tolerance: f64) -> Result<Self, ConfigError> {
        Self::new(
            self.keys
                .iter()
                .map(|k| AxisKey { tolerance, ..*k })
                .collect(),
        )
    }
}

impl fmt::Display for AxisOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", key)?;
        }
        Ok(())
    }
}

impl FromStr for AxisOrder {
    type Err = ConfigError;

    /// Parses the compact form `z+@0.1,x+@0.1,y-`. A missing tolerance means exact
    /// comparison on that axis; a missing sign means ascending.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keys = s
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(parse_axis_key)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(keys)
    }
}

fn parse_axis_key(token: &str) -> Result<AxisKey, ConfigError> {
    let invalid = || ConfigError::InvalidAxisKey(token.to_string());

    let (head, tolerance) = match token.split_once('@') {
        Some((head, tol)) => (head, tol.trim().parse::<f64>().map_err(|_| invalid())?),
        None => (token, 0.0),
    };
    let head = head.trim();
    let (axis_str, direction) = if let Some(a) = head.strip_suffix('+') {
        (a, Direction::Ascending)
    } else if let Some(a) = head.strip_suffix('-') {
        (a, Direction::Descending)
    } else {
        (head, Direction::Ascending)
    };
    let axis = axis_str.parse::<Axis>().map_err(|_| invalid())?;

    let key = AxisKey {
        axis,
        direction,
        tolerance,
    };
    key.validate()?;
    Ok(key)
}

/// How sort keys are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortStrategy {
    /// Tolerance bands over the configured axes.
    #[default]
    Spatial,
    /// Module and strip numbers from the volume names; spatial order breaks ties
    /// and places descriptors whose names do not follow the convention.
    VolumeName,
}

impl fmt::Display for SortStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortStrategy::Spatial => "spatial",
            SortStrategy::VolumeName => "volume-name",
        })
    }
}

impl FromStr for SortStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spatial" => Ok(SortStrategy::Spatial),
            "volume-name" | "volume_name" | "name" => Ok(SortStrategy::VolumeName),
            _ => Err(ConfigError::InvalidStrategy(s.to_string())),
        }
    }
}

/// Everything the standard sorters need to know.
#[derive(Debug, Clone, PartialEq)]
pub struct SortConfig {
    pub strategy: SortStrategy,
    /// Number given to the first descriptor after sorting (0- or 1-based numbering).
    /// At most [`MAX_FIRST_INDEX`].
    pub first_index: usize,
    pub module_order: AxisOrder,
    pub sensitive_order: AxisOrder,
    /// Strip orderings that replace `sensitive_order` for specific subsystems.
    pub sensitive_overrides: HashMap<Subsystem, AxisOrder>,
}

impl SortConfig {
    /// The strip ordering that applies to modules of `subsystem`.
    pub fn sensitive_order_for(&self, subsystem: Option<Subsystem>) -> &AxisOrder {
        subsystem
            .and_then(|s| self.sensitive_overrides.get(&s))
            .unwrap_or(&self.sensitive_order)
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        let mut sensitive_overrides = HashMap::new();
        sensitive_overrides.insert(Subsystem::Minos, AxisOrder::standard_minos_sensitive());
        Self {
            strategy: SortStrategy::default(),
            first_index: 0,
            module_order: AxisOrder::standard_modules(),
            sensitive_order: AxisOrder::standard_sensitive(),
            sensitive_overrides,
        }
    }
}

#[derive(Default)]
pub struct SortConfigBuilder {
    strategy: Option<SortStrategy>,
    first_index: Option<usize>,
    module_order: Option<Vec<AxisKey>>,
    sensitive_order: Option<Vec<AxisKey>>,
    sensitive_overrides: HashMap<Subsystem, Vec<AxisKey>>,
    clear_default_overrides: bool,
}

impl SortConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy(mut self, strategy: SortStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }
    pub fn first_index(mut self, first_index: usize) -> Self {
        self.first_index = Some(first_index);
        self
    }
    pub fn module_order(mut self, keys: Vec<AxisKey>) -> Self {
        self.module_order = Some(keys);
        self
    }
    pub fn sensitive_order(mut self, keys: Vec<AxisKey>) -> Self {
        self.sensitive_order = Some(keys);
        self
    }
    pub fn sensitive_override(mut self, subsystem: Subsystem, keys: Vec<AxisKey>) -> Self {
        self.sensitive_overrides.insert(subsystem, keys);
        self
    }
    /// Drops the built-in per-subsystem strip orderings.
    pub fn without_default_overrides(mut self) -> Self {
        self.clear_default_overrides = true;
        self
    }

    /// Fills unset values from [`SortConfig::default`] and validates every axis order
    /// and the numbering origin.
    pub fn build(self) -> Result<SortConfig, ConfigError> {
        let defaults = SortConfig::default();

        let first_index = self.first_index.unwrap_or(defaults.first_index);
        if first_index > MAX_FIRST_INDEX {
            return Err(ConfigError::FirstIndexOutOfRange(first_index));
        }

        let module_order = match self.module_order {
            Some(keys) => AxisOrder::new(keys)?,
            None => defaults.module_order,
        };
        let sensitive_order = match self.sensitive_order {
            Some(keys) => AxisOrder::new(keys)?,
            None => defaults.sensitive_order,
        };

        let mut sensitive_overrides = if self.clear_default_overrides {
            HashMap::new()
        } else {
            defaults.sensitive_overrides
        };
        for (subsystem, keys) in self.sensitive_overrides {
            sensitive_overrides.insert(subsystem, AxisOrder::new(keys)?);
        }

        Ok(SortConfig {
            strategy: self.strategy.unwrap_or(defaults.strategy),
            first_index,
            module_order,
            sensitive_order,
            sensitive_overrides,
        })
    }
}
