//! Gridfinity solids.
//!
//! Every part is built at the origin, centred on its grid, and tessellated
//! into a closed [`GeomMesh`]. Parts that are placed elsewhere in an
//! assembly (the stacking lip, compartment cutters, the lid slot) are built
//! at their own datum and translated by the assembly.

mod base;
mod bin;
mod compartment;
mod lid;
mod lip;
mod screw_hole;

pub use base::Base;
pub use bin::Bin;
pub use compartment::{Compartment, ScoopSide, SubdividedCompartment};
pub use lid::{InnerLid, Lid, SlidingLidBin, SlidingLidCut, sliding_lid_bin};
pub use lip::StackingLip;
pub use screw_hole::{ScrewHole, screw_holes};

use thiserror::Error;

use crate::geom::{
    BooleanError, BooleanOp, ExtrusionError, FilletChamferError, GeomMesh, LoftError,
    boolean_meshes,
};
use crate::options::ModelOptions;
use crate::sketch::SketchError;

#[derive(Debug, Error)]
pub enum PartError {
    #[error("bin height {height} must exceed the base height {min}")]
    HeightTooSmall { height: f64, min: f64 },
    #[error("compartment depth must be positive, got {depth}")]
    InvalidDepth { depth: f64 },
    #[error("wall thickness must not be negative, got {thickness}")]
    InvalidWallThickness { thickness: f64 },
    #[error("divisions must be at least 1x1, got {div_x}x{div_y}")]
    InvalidDivisions { div_x: usize, div_y: usize },
    #[error("lid thickness must be positive, got {thickness}")]
    InvalidThickness { thickness: f64 },
    #[error("compartment cavity is empty at inset {inset}")]
    EmptyCavity { inset: f64 },
    #[error("compartment leaves a floor at {floor}, below the base height {min}")]
    CompartmentTooDeep { floor: f64, min: f64 },
    #[error("compartment has no pocket wide enough to cut")]
    NoPockets,
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
}

/// A solid that tessellates to a closed mesh.
pub trait Part {
    fn name(&self) -> &'static str;

    fn mesh(&self, options: &ModelOptions) -> Result<GeomMesh, PartError>;
}

/// Boolean step with the result logged.
pub(crate) fn combine(
    a: &GeomMesh,
    b: &GeomMesh,
    op: BooleanOp,
    options: &ModelOptions,
) -> Result<GeomMesh, PartError> {
    let result = boolean_meshes(a, b, op, options.tolerance)?;
    for warning in &result.diagnostics.warnings {
        log::warn!("{op:?}: {warning}");
    }
    Ok(result.mesh)
}

/// Fold `meshes` into `first` with `op`, left to right.
pub(crate) fn combine_all<'a>(
    first: GeomMesh,
    meshes: impl IntoIterator<Item = &'a GeomMesh>,
    op: BooleanOp,
    options: &ModelOptions,
) -> Result<GeomMesh, PartError> {
    meshes
        .into_iter()
        .try_fold(first, |acc, mesh| combine(&acc, mesh, op, options))
}

cfg_if::cfg_if! {
    if #[cfg(feature = "parallel")] {
        /// Build one mesh per item on the rayon pool.
        pub(crate) fn try_map<T, U, F>(items: &[T], f: F) -> Result<Vec<U>, PartError>
        where
            T: Sync,
            U: Send,
            F: Fn(&T) -> Result<U, PartError> + Sync + Send,
        {
            use rayon::prelude::*;
            items.par_iter().map(f).collect()
        }
    } else {
        /// Build one mesh per item.
        pub(crate) fn try_map<T, U, F>(items: &[T], f: F) -> Result<Vec<U>, PartError>
        where
            T: Sync,
            U: Send,
            F: Fn(&T) -> Result<U, PartError> + Sync + Send,
        {
            items.iter().map(f).collect()
        }
    }
}
