//! Bin assembly.

use crate::constants::{BASE_HEIGHT, OUTLINE_INSET};
use crate::geom::{BooleanOp, GeomMesh, Vec3};
use crate::grid::Grid;
use crate::options::ModelOptions;
use crate::sketch::GridSketch;

use super::{Base, Compartment, Part, PartError, ScrewHole, StackingLip, combine};

/// How far the screw-hole cutter starts below the bin's bottom face.
const HOLE_OVERRUN: f64 = 1.0;

/// A bin on `grid`, `height` millimetres tall without its stacking lip.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    grid: Grid,
    height: f64,
    stacking_lip: bool,
    compartment: Option<Compartment>,
    screw_holes: bool,
}

impl Bin {
    /// Solid bin with a stacking lip.
    #[must_use]
    pub fn new(grid: &Grid, height: f64) -> Self {
        Self {
            grid: grid.clone(),
            height,
            stacking_lip: true,
            compartment: None,
            screw_holes: false,
        }
    }

    #[must_use]
    pub fn without_stacking_lip(mut self) -> Self {
        self.stacking_lip = false;
        self
    }

    #[must_use]
    pub fn with_stacking_lip(mut self, stacking_lip: bool) -> Self {
        self.stacking_lip = stacking_lip;
        self
    }

    /// Cut `compartment` down from the top.
    #[must_use]
    pub fn with_compartment(mut self, compartment: Compartment) -> Self {
        self.compartment = Some(compartment);
        self
    }

    #[must_use]
    pub fn with_screw_holes(mut self, screw_holes: bool) -> Self {
        self.screw_holes = screw_holes;
        self
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn compartment(&self) -> Option<&Compartment> {
        self.compartment.as_ref()
    }

    pub fn validate(&self) -> Result<(), PartError> {
        if !self.height.is_finite() || self.height <= BASE_HEIGHT {
            return Err(PartError::HeightTooSmall {
                height: self.height,
                min: BASE_HEIGHT,
            });
        }
        if let Some(compartment) = &self.compartment {
            compartment.validate()?;
            let floor = self.height - compartment.depth() - compartment.lowered_by();
            if floor <= BASE_HEIGHT {
                return Err(PartError::CompartmentTooDeep { floor, min: BASE_HEIGHT });
            }
        }
        Ok(())
    }
}

impl Part for Bin {
    fn name(&self) -> &'static str {
        "bin"
    }

    fn mesh(&self, options: &ModelOptions) -> Result<GeomMesh, PartError> {
        self.validate()?;
        let base = Base::new(&self.grid).mesh(options)?;
        let (body, _) = GridSketch::new(&self.grid, OUTLINE_INSET)?.extrude(
            BASE_HEIGHT,
            self.height,
            options.arc_segments,
            options.tolerance,
        )?;
        let mut shell = combine(&base, &body, BooleanOp::Union, options)?;

        if let Some(compartment) = &self.compartment {
            let cutter = compartment.mesh(options)?.translated(Vec3::new(0.0, 0.0, self.height));
            shell = combine(&shell, &cutter, BooleanOp::Difference, options)?;
        }
        if self.stacking_lip {
            let lip = StackingLip::new(&self.grid)
                .mesh(options)?
                .translated(Vec3::new(0.0, 0.0, self.height));
            shell = combine(&shell, &lip, BooleanOp::Union, options)?;
        }
        if self.screw_holes {
            let holes = ScrewHole::new(true)
                .extended_below(HOLE_OVERRUN)
                .pattern(&self.grid, options)?;
            shell = combine(&shell, &holes, BooleanOp::Difference, options)?;
        }
        log::debug!(
            "bin {} h{}: {} triangles",
            self.grid.size_label(),
            self.height,
            shell.triangle_count()
        );
        Ok(shell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::mesh_diagnostics;

    #[test]
    fn height_must_clear_the_base() {
        let grid = Grid::filled(1, 1).unwrap();
        let err = Bin::new(&grid, 4.0).validate().unwrap_err();
        assert!(matches!(err, PartError::HeightTooSmall { .. }));
    }

    #[test]
    fn compartment_must_leave_a_floor() {
        let grid = Grid::filled(1, 1).unwrap();
        let bin = Bin::new(&grid, 21.0).with_compartment(Compartment::new(&grid, 14.0));
        assert!(bin.validate().is_ok());

        let bin =
            Bin::new(&grid, 21.0).with_compartment(Compartment::new(&grid, 14.0).lowered(3.0));
        match bin.validate() {
            Err(PartError::CompartmentTooDeep { floor, min }) => {
                assert!((floor - 4.0).abs() < 1e-12);
                assert!((min - BASE_HEIGHT).abs() < 1e-12);
            }
            other => panic!("expected CompartmentTooDeep, got {other:?}"),
        }
    }

    #[test]
    fn solid_bin_without_lip_is_base_plus_body() {
        let options = ModelOptions::new(2);
        let grid = Grid::filled(1, 1).unwrap();
        let bin = Bin::new(&grid, 14.0).without_stacking_lip().mesh(&options).unwrap();
        assert!(mesh_diagnostics(&bin).is_valid_solid());

        let base = Base::new(&grid).mesh(&options).unwrap();
        let (body, _) = GridSketch::new(&grid, OUTLINE_INSET)
            .unwrap()
            .extrude(BASE_HEIGHT, 14.0, 2, options.tolerance)
            .unwrap();
        assert!((bin.volume() - base.volume() - body.volume()).abs() < 1e-3 * bin.volume());

        let bbox = bin.bbox().unwrap();
        assert!(bbox.min.z.abs() < 1e-9);
        assert!((bbox.max.z - 14.0).abs() < 1e-9);
    }
}
