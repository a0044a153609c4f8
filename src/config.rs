//! Bin descriptions loaded from TOML.
//!
//! ```toml
//! grid = "##/#."        # or "2x3"
//! height = 3            # units of 7 mm
//! divisions = [2, 1]
//! cutout = 12.0
//! label = true
//! scoops = ["left"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{HEIGHT_UNIT, WALL_THICKNESS};
use crate::export::{BinFeatures, ExportFormat};
use crate::grid::{Grid, GridError};
use crate::options::{DEFAULT_ARC_SEGMENTS, ModelOptions};
use crate::parts::{Bin, Compartment, ScoopSide, SlidingLidBin};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse bin config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("height must be positive, got {0} units")]
    InvalidHeight(f64),
}

/// One bin, as written in a config file or assembled from CLI flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinConfig {
    /// `WxH` size or ASCII layout.
    pub grid: String,
    /// Height in units of 7 mm.
    pub height: f64,
    pub divisions: (usize, usize),
    /// Width of the notch in each divider, 0 for none.
    pub cutout: f64,
    pub label: bool,
    pub scoops: Vec<ScoopSide>,
    pub wall_thickness: f64,
    pub stacking_lip: bool,
    pub screw_holes: bool,
    pub sliding_lid: bool,
    pub arc_segments: usize,
    pub format: ExportFormat,
}

impl Default for BinConfig {
    fn default() -> Self {
        Self {
            grid: "1x1".to_owned(),
            height: 3.0,
            divisions: (1, 1),
            cutout: 0.0,
            label: false,
            scoops: Vec::new(),
            wall_thickness: WALL_THICKNESS,
            stacking_lip: true,
            screw_holes: false,
            sliding_lid: false,
            arc_segments: DEFAULT_ARC_SEGMENTS,
            format: ExportFormat::Stl,
        }
    }
}

impl BinConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        log::debug!("loaded bin config from {}", path.display());
        Ok(config)
    }

    pub fn grid(&self) -> Result<Grid, ConfigError> {
        Ok(self.grid.parse()?)
    }

    /// Height in millimetres.
    pub fn height_mm(&self) -> Result<f64, ConfigError> {
        if self.height.is_finite() && self.height > 0.0 {
            Ok(self.height * HEIGHT_UNIT)
        } else {
            Err(ConfigError::InvalidHeight(self.height))
        }
    }

    #[must_use]
    pub fn options(&self) -> ModelOptions {
        ModelOptions::new(self.arc_segments)
    }

    #[must_use]
    pub fn features(&self) -> BinFeatures {
        BinFeatures {
            cutout: self.cutout > 0.0,
            label: self.label,
            scoop: !self.scoops.is_empty(),
        }
    }

    /// Compartment one height unit shallower than the bin.
    pub fn compartment(&self, grid: &Grid) -> Result<Compartment, ConfigError> {
        let (div_x, div_y) = self.divisions;
        Ok(Compartment::subdivided(grid, self.height_mm()? - HEIGHT_UNIT, div_x, div_y)
            .with_cutout(self.cutout)
            .with_label(self.label)
            .with_scoops(self.scoops.iter().copied())
            .with_wall_thickness(self.wall_thickness))
    }

    pub fn bin(&self, grid: &Grid) -> Result<Bin, ConfigError> {
        Ok(Bin::new(grid, self.height_mm()?)
            .with_stacking_lip(self.stacking_lip)
            .with_compartment(self.compartment(grid)?)
            .with_screw_holes(self.screw_holes))
    }

    pub fn sliding_lid_bin(&self, grid: &Grid) -> Result<SlidingLidBin, ConfigError> {
        let (div_x, div_y) = self.divisions;
        Ok(SlidingLidBin::new(grid, self.height_mm()?)
            .with_divisions(div_x, div_y)
            .with_scoops(self.scoops.iter().copied()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = BinConfig::from_toml_str("").unwrap();
        assert_eq!(config, BinConfig::default());
        assert!((config.height_mm().unwrap() - 21.0).abs() < 1e-12);
        assert_eq!(config.grid().unwrap().occupied_count(), 1);
    }

    #[test]
    fn full_config_round_trips_into_parts() {
        let config = BinConfig::from_toml_str(
            r###"
            grid = "##/#."
            height = 4
            divisions = [2, 1]
            cutout = 12.0
            label = true
            scoops = ["left", "front"]
            screw_holes = true
            format = "stl-ascii"
            "###,
        )
        .unwrap();
        assert_eq!(config.scoops, vec![ScoopSide::Left, ScoopSide::Front]);
        assert_eq!(config.format, ExportFormat::StlAscii);
        assert!(config.features().scoop);

        let grid = config.grid().unwrap();
        let compartment = config.compartment(&grid).unwrap();
        assert!((compartment.depth() - 21.0).abs() < 1e-12);
        assert_eq!(compartment.divisions(), (2, 1));
        let bin = config.bin(&grid).unwrap();
        assert!(bin.validate().is_ok());
    }

    #[test]
    fn unknown_keys_and_bad_heights_are_rejected() {
        assert!(matches!(BinConfig::from_toml_str("colour = 1"), Err(ConfigError::Parse(_))));
        let config = BinConfig {
            height: 0.0,
            ..BinConfig::default()
        };
        assert!(matches!(config.height_mm(), Err(ConfigError::InvalidHeight(_))));
    }
}
