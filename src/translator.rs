use crate::geometry::{GridGeometry, MotorPositions};
use crate::results::Shape;
use serde::Serialize;

/// Fractional grid coordinate. Integer parts select the cell.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct GridPoint {
    pub x: f64,
    pub y: f64,
}

impl GridPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn col(&self) -> usize {
        self.x.max(0.0) as usize
    }

    pub fn row(&self) -> usize {
        self.y.max(0.0) as usize
    }
}

/// Converts a row index between display orientation (row 0 on top) and the
/// physical orientation used by the grid geometry. The mapping is its own
/// inverse.
pub fn flip_row(row: usize, rows: usize) -> usize {
    rows.saturating_sub(row + 1)
}

/// Same as `flip_row` for fractional coordinates: a cell centre `r + 0.5`
/// maps onto `flip_row(r) + 0.5`.
pub fn flip_y(y: f64, rows: usize) -> f64 {
    rows as f64 - y
}

/// Short-lived view over the borrowed grid and the current store shape.
pub struct CoordinateTranslator<'a> {
    grid: Option<&'a dyn GridGeometry>,
    shape: Option<Shape>,
    osc_range: f64,
}

impl<'a> CoordinateTranslator<'a> {
    pub fn new(grid: Option<&'a dyn GridGeometry>, shape: Option<Shape>, osc_range: f64) -> Self {
        Self {
            grid,
            shape,
            osc_range,
        }
    }

    pub fn has_grid(&self) -> bool {
        self.grid.is_some()
    }

    fn display_rows(&self) -> Option<usize> {
        match self.shape {
            Some(Shape::Mesh { rows, .. }) => Some(rows),
            _ => None,
        }
    }

    /// Cell holding an acquired image, in display orientation when mesh
    /// scores are loaded. `None` without a grid.
    pub fn image_line_to_col_row(&self, image: usize, line: usize) -> Option<(usize, usize)> {
        let grid = self.grid?;
        let (col, row) = grid.col_row_from_line_image(line, image);
        match self.display_rows() {
            Some(rows) => Some((col, flip_row(row, rows))),
            None => Some((col, row)),
        }
    }

    /// Display-space point -> geometry-space point.
    pub fn display_to_grid(&self, point: GridPoint) -> GridPoint {
        match self.display_rows() {
            Some(rows) => GridPoint::new(point.x, flip_y(point.y, rows)),
            None => point,
        }
    }

    /// Display-space point -> geometry-space point inside the mirrored cell.
    /// `display_to_grid` mirrors the continuous axis, which moves integer
    /// rows onto a cell boundary; cell lookups go through here instead.
    pub fn display_cell_to_grid(&self, point: GridPoint) -> GridPoint {
        match self.display_rows() {
            Some(rows) => GridPoint::new(
                point.x,
                flip_row(point.row(), rows) as f64 + point.y.fract().max(0.0),
            ),
            None => point,
        }
    }

    /// `col`/`row` in geometry space.
    pub fn col_row_to_motor_positions(&self, col: f64, row: f64) -> Option<MotorPositions> {
        self.grid
            .map(|grid| grid.motor_positions_from_col_row(col, row, self.osc_range))
    }

    /// Plot coordinates -> grid coordinates. Plots report either normalized
    /// `[0, 1)` coordinates or absolute cell units; line scans always give
    /// an absolute image index on x.
    pub fn pixel_to_grid(&self, pos_x: f64, pos_y: f64) -> GridPoint {
        let Some(grid) = self.grid else {
            return GridPoint::new(pos_x, 0.0);
        };

        let normalized = (0.0..1.0).contains(&pos_x) && (0.0..1.0).contains(&pos_y);
        if normalized {
            let (cols, rows) = grid.size();
            GridPoint::new(pos_x * cols as f64, pos_y * rows as f64)
        } else {
            GridPoint::new(pos_x, pos_y)
        }
    }
}
