//! Gridfinity dimensions, in millimetres.

/// Grid pitch in X and Y.
pub const PITCH: f64 = 42.0;
/// One height unit.
pub const HEIGHT_UNIT: f64 = 7.0;

/// Gap between the cell square and the bin outline.
pub const OUTLINE_INSET: f64 = 0.25;
/// Corner radius of the cell square itself; the radius at inset `d` is `4 - d`.
pub const CELL_RADIUS: f64 = 4.0;

/// Base profile, top down: 45° taper, vertical section, 45° taper.
pub const BASE_TAPER_TOP: f64 = 2.15;
pub const BASE_STRAIGHT: f64 = 1.8;
pub const BASE_TAPER_BOTTOM: f64 = 0.8;
pub const BASE_HEIGHT: f64 = BASE_TAPER_TOP + BASE_STRAIGHT + BASE_TAPER_BOTTOM;

/// Stacking lip: inner taper, vertical section, bottom taper.
pub const LIP_TAPER_TOP: f64 = 1.9;
pub const LIP_STRAIGHT: f64 = 1.8;
pub const LIP_TAPER_BOTTOM: f64 = 0.7;
pub const LIP_HEIGHT: f64 = LIP_TAPER_TOP + LIP_STRAIGHT + LIP_TAPER_BOTTOM;
/// Support below the lip: vertical drop, then a 45° return to the outer wall.
pub const LIP_SUPPORT_STRAIGHT: f64 = 1.2;
pub const LIP_SUPPORT_TAPER: f64 = LIP_TAPER_TOP + LIP_TAPER_BOTTOM;
pub const LIP_TOP_FILLET: f64 = 0.6;

pub const WALL_THICKNESS: f64 = 1.0;
pub const DIVIDER_THICKNESS: f64 = 1.0;
pub const DIVIDER_TOP_FILLET: f64 = 0.45;
pub const CUTOUT_FILLET: f64 = 2.0;
/// Divider cutouts are at most `PITCH - CUTOUT_CLEARANCE` wide.
pub const CUTOUT_CLEARANCE: f64 = 10.0;
/// Divider cutouts stop this far above the compartment floor.
pub const CUTOUT_FLOOR_MARGIN: f64 = 5.0;
/// Pockets narrower than this are not cut.
pub const MIN_POCKET_WIDTH: f64 = 1.0;

pub const LABEL_WIDTH: f64 = 14.0;
pub const LABEL_SLOPE: f64 = 0.7;
pub const LABEL_FLOOR_MARGIN: f64 = 2.2;
pub const LABEL_TIP_FILLET: f64 = 0.6;

pub const SCOOP_RADIUS: f64 = 7.0;
/// How far the stacking lip overhangs the wall; scoops start behind it.
pub const SCOOP_LIP_COMPENSATION: f64 = LIP_STRAIGHT + BASE_TAPER_BOTTOM;

pub const SCREW_COUNTERBORE_RADIUS: f64 = 3.25;
pub const SCREW_COUNTERBORE_DEPTH: f64 = 2.4;
pub const SCREW_HOLE_RADIUS: f64 = 1.5;
pub const SCREW_HOLE_DEPTH: f64 = 5.0;
pub const SCREW_BRIDGE_WIDTH: f64 = 3.0;
pub const SCREW_BRIDGE_HEIGHT: f64 = 2.6;
pub const SCREW_SPACING: f64 = 26.0;

pub const LID_THICKNESS: f64 = 0.6 + 2.0 * LID_TOLERANCE;
pub const LID_INSET: f64 = 1.0;
pub const LID_TOLERANCE: f64 = 0.1;
pub const LID_CLICK_RADIUS: f64 = 0.3;
pub const LID_CLICK_OFFSET: f64 = 7.0;
pub const LID_SLOT_WIDTH: f64 = 3.75;
pub const LID_SLOT_HEIGHT: f64 = 20.0;
/// Top of the inner lid above the lid plane: the lip's bottom taper.
pub const LID_RAIL_HEIGHT: f64 = LIP_TAPER_BOTTOM;

/// Outline corner radius for a sketch inset `inset` from the cell square.
#[must_use]
pub fn corner_radius(inset: f64) -> f64 {
    CELL_RADIUS - inset
}
