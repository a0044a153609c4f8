//! Parametric Gridfinity bins as triangle meshes.
//!
//! A [`Grid`] describes which cells a bin occupies. Parts ([`Bin`],
//! [`Compartment`], [`StackingLip`], [`ScrewHole`], [`Lid`], ...) turn it
//! into closed [`geom::GeomMesh`] solids using the mesh kernel in [`geom`],
//! and [`export`] writes them as STL or OBJ.
//!
//! ```no_run
//! use gridfinity::{Bin, Compartment, Grid, ModelOptions, Part, ScoopSide};
//!
//! let grid: Grid = "2x1".parse()?;
//! let compartment = Compartment::subdivided(&grid, 14.0, 2, 1)
//!     .with_label(true)
//!     .with_scoops([ScoopSide::Left]);
//! let mesh = Bin::new(&grid, 21.0).with_compartment(compartment).mesh(&ModelOptions::default())?;
//! # Ok::<(), gridfinity::GridfinityError>(())
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::similar_names,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod geom;
pub mod grid;
pub mod options;
pub mod parts;
pub mod sketch;

pub use config::{BinConfig, ConfigError};
pub use error::{GridfinityError, Result};
pub use grid::{Grid, GridError};
pub use options::ModelOptions;
pub use parts::{
    Base, Bin, Compartment, InnerLid, Lid, Part, PartError, ScoopSide, ScrewHole, SlidingLidBin,
    SlidingLidCut, StackingLip, SubdividedCompartment, screw_holes, sliding_lid_bin,
};
pub use sketch::{GridSketch, SketchError};
