use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, Color, Table};
use hitmap::palette::{Palette, Rgb};
use hitmap::{HitMapViewer, Shape};

pub mod heatmap;
pub mod tables;

pub fn color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.0,
        g: rgb.1,
        b: rgb.2,
    }
}

pub fn status_table(viewer: &HitMapViewer, palette: &Palette) -> Table {
    let name = viewer
        .collection()
        .map(|c| c.name.clone())
        .unwrap_or_else(|| "-".to_string());
    let shape = match viewer.shape() {
        Some(Shape::Mesh { cols, rows }) => format!("mesh {}x{}", cols, rows),
        Some(Shape::Line(n)) => format!("line, {} images", n),
        None => "empty".to_string(),
    };
    let state = viewer.state();

    let mut table = Table::new();
    table.load_preset(ASCII_FULL);
    table.add_row(vec![
        Cell::new(format!("{} ({})", name, shape)).add_attribute(Attribute::Bold),
        Cell::new(state).fg(color(palette.state(state))),
        Cell::new(format!(
            "{} >= {:.0}%",
            viewer.kind().label(),
            viewer.threshold() * 100.0
        )),
    ]);
    table
}

pub fn print_status(viewer: &HitMapViewer, palette: &Palette) {
    println!("\n{}", status_table(viewer, palette));
}
