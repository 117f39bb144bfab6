use phf::{Map, phf_map};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The three CRT module styles found in the detector geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Subsystem {
    /// Single-layer MINOS scintillator modules covering the side walls.
    Minos,
    /// Two-layer CERN modules covering the top.
    Cern,
    /// Two-layer Double Chooz modules covering the bottom.
    DoubleChooz,
}

/// Location of a module within the CRT shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Top,
    RimNorth,
    RimSouth,
    RimWest,
    RimEast,
    South,
    North,
    WestSouth,
    WestCenter,
    WestNorth,
    EastSouth,
    EastCenter,
    EastNorth,
    Bottom,
}

/// Layer of a two-layer (CERN) module a strip belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Top,
    Bottom,
}

#[rustfmt::skip]
static SUBSYSTEM_TAGS: Map<&'static str, Subsystem> = phf_map! {
    "MINOS" => Subsystem::Minos,
    "CERN"  => Subsystem::Cern,
    "DC"    => Subsystem::DoubleChooz,
};

#[rustfmt::skip]
static REGION_NAMES: Map<&'static str, Region> = phf_map! {
    "Top"        => Region::Top,
    "RimNorth"   => Region::RimNorth,
    "RimSouth"   => Region::RimSouth,
    "RimWest"    => Region::RimWest,
    "RimEast"    => Region::RimEast,
    "South"      => Region::South,
    "North"      => Region::North,
    "WestSouth"  => Region::WestSouth,
    "WestCenter" => Region::WestCenter,
    "WestNorth"  => Region::WestNorth,
    "EastSouth"  => Region::EastSouth,
    "EastCenter" => Region::EastCenter,
    "EastNorth"  => Region::EastNorth,
    "Bottom"     => Region::Bottom,
};

// Two-letter codes used by the geometry generator when building module volumes.
#[rustfmt::skip]
static REGION_CODES: Map<&'static str, Region> = phf_map! {
    "tt" => Region::Top,
    "rn" => Region::RimNorth, "rs" => Region::RimSouth,
    "rw" => Region::RimWest,  "re" => Region::RimEast,
    "ss" => Region::South,    "nn" => Region::North,
    "ws" => Region::WestSouth, "wc" => Region::WestCenter, "wn" => Region::WestNorth,
    "es" => Region::EastSouth, "ec" => Region::EastCenter, "en" => Region::EastNorth,
    "bt" => Region::Bottom,
};

const MODULE_PREFIX: &str = "AuxDet";
const SENSITIVE_PREFIX: &str = "AuxDetSensitive";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseVolumeNameError {
    #[error("Volume name '{0}' is not an auxiliary detector volume")]
    NotAuxDet(String),
    #[error("Unknown CRT subsystem tag '{tag}' in volume name '{name}'")]
    UnknownSubsystem { tag: String, name: String },
    #[error("Unknown CRT region '{region}' in volume name '{name}'")]
    UnknownRegion { region: String, name: String },
    #[error("Malformed {field} in volume name '{name}'")]
    Malformed { field: &'static str, name: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid {kind} string: '{value}'")]
pub struct ParseTagError {
    kind: &'static str,
    value: String,
}

impl Subsystem {
    /// The tag used for this subsystem inside volume names.
    pub fn tag(self) -> &'static str {
        match self {
            Subsystem::Minos => "MINOS",
            Subsystem::Cern => "CERN",
            Subsystem::DoubleChooz => "DC",
        }
    }
}

impl FromStr for Subsystem {
    type Err = ParseTagError;

    /// Accepts the volume-name tags (`MINOS`, `CERN`, `DC`) case-insensitively, plus
    /// the spelled-out `double-chooz`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        if let Some(subsystem) = SUBSYSTEM_TAGS.get(upper.as_str()) {
            return Ok(*subsystem);
        }
        match upper.as_str() {
            "DOUBLE-CHOOZ" | "DOUBLE_CHOOZ" | "DOUBLECHOOZ" => Ok(Subsystem::DoubleChooz),
            _ => Err(ParseTagError {
                kind: "subsystem",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Region {
    /// The two-letter code the geometry generator uses for this region.
    pub fn code(self) -> &'static str {
        REGION_CODES
            .entries()
            .find(|(_, region)| **region == self)
            .map(|(code, _)| *code)
            .unwrap_or("??")
    }

    /// The suffix appended to module volume names in this region.
    pub fn volume_suffix(self) -> &'static str {
        REGION_NAMES
            .entries()
            .find(|(_, region)| **region == self)
            .map(|(name, _)| *name)
            .unwrap_or("Unknown")
    }
}

impl FromStr for Region {
    type Err = ParseTagError;

    /// Parses either the volume suffix (`WestNorth`) or the two-letter code (`wn`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        REGION_NAMES
            .get(trimmed)
            .or_else(|| REGION_CODES.get(trimmed.to_ascii_lowercase().as_str()))
            .copied()
            .ok_or_else(|| ParseTagError {
                kind: "region",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.volume_suffix())
    }
}

/// Structured form of a CRT volume name.
///
/// Module volumes look like `volAuxDet_<SUB>_module_<NNN>_[cut<LEN>_]<Region>` and
/// strip volumes like `volAuxDetSensitive_<SUB>_module_<NNN>_[cut<LEN>_][top_|bot_]strip_<NN>`.
/// The leading `vol` is optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeName {
    pub subsystem: Subsystem,
    pub module_number: u32,
    /// Length in cm of a cut (shortened) MINOS module.
    pub cut_length: Option<u32>,
    /// Region suffix; present on module volumes only.
    pub region: Option<Region>,
    /// Layer of a CERN strip.
    pub layer: Option<Layer>,
    /// Strip number; present on sensitive volumes only.
    pub strip_number: Option<u32>,
}

impl VolumeName {
    pub fn is_sensitive(&self) -> bool {
        self.strip_number.is_some()
    }
}

impl FromStr for VolumeName {
    type Err = ParseVolumeNameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let not_aux_det = || ParseVolumeNameError::NotAuxDet(name.to_string());
        let malformed = |field| ParseVolumeNameError::Malformed {
            field,
            name: name.to_string(),
        };

        let bare = name.strip_prefix("vol").unwrap_or(name);
        let mut tokens = bare.split('_').peekable();

        let sensitive = match tokens.next() {
            Some(SENSITIVE_PREFIX) => true,
            Some(MODULE_PREFIX) => false,
            _ => return Err(not_aux_det()),
        };

        let tag = tokens.next().ok_or_else(not_aux_det)?;
        let subsystem =
            SUBSYSTEM_TAGS
                .get(tag)
                .copied()
                .ok_or_else(|| ParseVolumeNameError::UnknownSubsystem {
                    tag: tag.to_string(),
                    name: name.to_string(),
                })?;

        if tokens.next() != Some("module") {
            return Err(malformed("module keyword"));
        }
        let module_number = tokens
            .next()
            .and_then(|t| t.parse::<u32>().ok())
            .ok_or_else(|| malformed("module number"))?;

        let cut_length = match tokens.peek().copied().and_then(|t| t.strip_prefix("cut")) {
            Some(digits) => {
                let length = digits
                    .parse::<u32>()
                    .map_err(|_| malformed("cut length"))?;
                tokens.next();
                Some(length)
            }
            None => None,
        };

        if sensitive {
            let layer = match tokens.peek() {
                Some(&"top") => Some(Layer::Top),
                Some(&"bot") => Some(Layer::Bottom),
                _ => None,
            };
            if layer.is_some() {
                tokens.next();
            }
            if tokens.next() != Some("strip") {
                return Err(malformed("strip keyword"));
            }
            let strip_number = tokens
                .next()
                .and_then(|t| t.parse::<u32>().ok())
                .ok_or_else(|| malformed("strip number"))?;
            if tokens.next().is_some() {
                return Err(malformed("trailing suffix"));
            }
            Ok(VolumeName {
                subsystem,
                module_number,
                cut_length,
                region: None,
                layer,
                strip_number: Some(strip_number),
            })
        } else {
            let region = match tokens.next() {
                None => None,
                Some(suffix) => Some(REGION_NAMES.get(suffix).copied().ok_or_else(|| {
                    ParseVolumeNameError::UnknownRegion {
                        region: suffix.to_string(),
                        name: name.to_string(),
                    }
                })?),
            };
            // The air volume holding the strips is named `<module>_inner`.
            let rest: Vec<&str> = tokens.collect();
            if !(rest.is_empty() || rest == ["inner"]) {
                return Err(malformed("trailing suffix"));
            }
            Ok(VolumeName {
                subsystem,
                module_number,
                cut_length,
                region,
                layer: None,
                strip_number: None,
            })
        }
    }
}
