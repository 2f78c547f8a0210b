/// Offset that moves a cell index onto the cell centre.
pub const HALF_CELL: f64 = 0.5;

/// Number of positions on the threshold slider (0..=100 %).
pub const THRESHOLD_SLIDER_STEPS: u32 = 100;

/// Default number of rows shown in the best-position table.
pub const DEFAULT_BEST_POSITIONS: usize = 10;

/// Number of y-axis ticks drawn for line scans.
pub const LINE_AXIS_TICKS: usize = 5;

/// Default omega motor name used for line-scan centring points.
pub const DEFAULT_OMEGA_MOTOR: &str = "phi";
