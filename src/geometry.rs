use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Motor name -> position snapshot.
pub type MotorPositions = BTreeMap<String, f64>;

/// An image located inside the acquisition sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Index of the image within its line.
    pub image: usize,
    /// Index of the acquisition line.
    pub line: usize,
    /// File number as written by the detector.
    pub image_num: usize,
}

/// Spatial layout of a mesh scan. Rows are in the physical orientation of
/// the acquisition hardware (row 0 at the bottom of the sample view).
pub trait GridGeometry {
    /// `(cols, rows)`.
    fn size(&self) -> (usize, usize);

    fn col_row_from_line_image(&self, line: usize, image: usize) -> (usize, usize);

    fn image_from_col_row(&self, col: f64, row: f64) -> ImageRef;

    /// `col`/`row` are fractional grid coordinates; cell centres sit at `+0.5`.
    fn motor_positions_from_col_row(&self, col: f64, row: f64, osc_range: f64) -> MotorPositions;
}

fn default_first_image() -> usize {
    1
}

fn default_horizontal_motor() -> String {
    "phiy".to_string()
}

fn default_vertical_motor() -> String {
    "phiz".to_string()
}

fn default_omega_motor() -> String {
    "phi".to_string()
}

/// Mesh acquired line by line, one line per grid column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshGrid {
    pub steps_x: usize,
    pub steps_y: usize,
    /// Cell pitch along x and y, in motor units.
    pub spacing: (f64, f64),
    /// Motor snapshot at the centre of the grid.
    pub centre: MotorPositions,
    #[serde(default = "default_first_image")]
    pub first_image_num: usize,
    /// Odd lines are acquired top to bottom.
    #[serde(default)]
    pub serpentine: bool,
    #[serde(default = "default_horizontal_motor")]
    pub horizontal_motor: String,
    #[serde(default = "default_vertical_motor")]
    pub vertical_motor: String,
    #[serde(default = "default_omega_motor")]
    pub omega_motor: String,
}

impl MeshGrid {
    pub fn new(steps_x: usize, steps_y: usize, spacing: (f64, f64), centre: MotorPositions) -> Self {
        Self {
            steps_x,
            steps_y,
            spacing,
            centre,
            first_image_num: default_first_image(),
            serpentine: false,
            horizontal_motor: default_horizontal_motor(),
            vertical_motor: default_vertical_motor(),
            omega_motor: default_omega_motor(),
        }
    }

    pub fn serpentine(mut self, serpentine: bool) -> Self {
        self.serpentine = serpentine;
        self
    }

    pub fn num_images(&self) -> usize {
        self.steps_x * self.steps_y
    }

    fn reversed(&self, line: usize) -> bool {
        self.serpentine && line % 2 == 1
    }
}

impl GridGeometry for MeshGrid {
    fn size(&self) -> (usize, usize) {
        (self.steps_x, self.steps_y)
    }

    fn col_row_from_line_image(&self, line: usize, image: usize) -> (usize, usize) {
        let rows = self.steps_y.max(1);
        let image = image.min(rows - 1);
        let row = if self.reversed(line) {
            rows - image - 1
        } else {
            image
        };
        (line, row)
    }

    fn image_from_col_row(&self, col: f64, row: f64) -> ImageRef {
        let max_col = self.steps_x.saturating_sub(1);
        let max_row = self.steps_y.saturating_sub(1);
        let line = (col.max(0.0) as usize).min(max_col);
        let row = (row.max(0.0) as usize).min(max_row);
        let image = if self.reversed(line) {
            max_row - row
        } else {
            row
        };
        ImageRef {
            image,
            line,
            image_num: self.first_image_num + line * self.steps_y + image,
        }
    }

    fn motor_positions_from_col_row(&self, col: f64, row: f64, osc_range: f64) -> MotorPositions {
        let mut positions = self.centre.clone();
        let dx = (col - self.steps_x as f64 / 2.0) * self.spacing.0;
        let dy = (row - self.steps_y as f64 / 2.0) * self.spacing.1;

        *positions.entry(self.horizontal_motor.clone()).or_insert(0.0) += dx;
        *positions.entry(self.vertical_motor.clone()).or_insert(0.0) += dy;

        if osc_range != 0.0 {
            let image = self.image_from_col_row(col, row).image;
            *positions.entry(self.omega_motor.clone()).or_insert(0.0) += osc_range * image as f64;
        }
        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> MeshGrid {
        let centre = MotorPositions::from([
            ("phiy".to_string(), 1.0),
            ("phiz".to_string(), -0.5),
            ("phi".to_string(), 90.0),
        ]);
        MeshGrid::new(4, 3, (0.01, 0.02), centre)
    }

    #[test]
    fn test_centre_of_grid_maps_to_centre_snapshot() {
        let g = grid();
        let pos = g.motor_positions_from_col_row(2.0, 1.5, 0.0);
        assert!((pos["phiy"] - 1.0).abs() < 1e-12);
        assert!((pos["phiz"] + 0.5).abs() < 1e-12);
        assert_eq!(pos["phi"], 90.0);
    }

    #[test]
    fn test_osc_range_advances_omega_per_image() {
        let g = grid();
        let pos = g.motor_positions_from_col_row(0.5, 2.5, 0.1);
        assert!((pos["phi"] - 90.2).abs() < 1e-9);
    }

    #[test]
    fn test_serpentine_lines_run_backwards() {
        let g = grid().serpentine(true);
        assert_eq!(g.col_row_from_line_image(0, 0), (0, 0));
        assert_eq!(g.col_row_from_line_image(1, 0), (1, 2));
        let img = g.image_from_col_row(1.0, 2.0);
        assert_eq!((img.line, img.image, img.image_num), (1, 0, 4));
    }
}
