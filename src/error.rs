//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::export::ExportError;
use crate::geom::{BooleanError, ExtrusionError, FilletChamferError, LoftError};
use crate::grid::GridError;
use crate::parts::PartError;
use crate::sketch::SketchError;

pub type Result<T> = std::result::Result<T, GridfinityError>;

/// Any failure while turning a grid description into a mesh file.
#[derive(Debug, Error)]
pub enum GridfinityError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Sketch(#[from] SketchError),
    #[error(transparent)]
    Extrusion(#[from] ExtrusionError),
    #[error(transparent)]
    Loft(#[from] LoftError),
    #[error(transparent)]
    Fillet(#[from] FilletChamferError),
    #[error(transparent)]
    Boolean(#[from] BooleanError),
    #[error(transparent)]
    Part(#[from] PartError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
