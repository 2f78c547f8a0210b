use super::color;
use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use hitmap::filter::max_value;
use hitmap::palette::Palette;
use hitmap::{HitMapViewer, ScoreKind, Shape};

const BAR_WIDTH: usize = 40;

fn format_value(kind: ScoreKind, value: f32) -> String {
    if value == 0.0 {
        return ".".to_string();
    }
    match kind {
        ScoreKind::Resolution => format!("{:.2}", value),
        ScoreKind::Score => format!("{:.1}", value),
        ScoreKind::SpotsNum => format!("{:.0}", value),
    }
}

/// Rows top to bottom as displayed, one column per acquisition line.
pub fn mesh_table(viewer: &HitMapViewer, palette: &Palette) -> Option<Table> {
    let (Some(Shape::Mesh { cols, rows }), Some(values)) = (viewer.shape(), viewer.display_values())
    else {
        return None;
    };
    let max = max_value(&values);
    let kind = viewer.kind();

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("").add_attribute(Attribute::Bold)];
    header.extend((0..cols).map(|c| {
        Cell::new(c)
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Center)
    }));
    table.add_row(header);

    for row in 0..rows {
        let mut cells = vec![Cell::new(row).add_attribute(Attribute::Bold)];
        for col in 0..cols {
            let value = values[col * rows + row];
            let fraction = if max > 0.0 { value / max } else { 0.0 };
            cells.push(
                Cell::new(format_value(kind, value))
                    .fg(color(palette.intensity(fraction)))
                    .set_alignment(CellAlignment::Right),
            );
        }
        table.add_row(cells);
    }
    Some(table)
}

pub fn print_mesh(viewer: &HitMapViewer, palette: &Palette) {
    if let Some(table) = mesh_table(viewer, palette) {
        println!("{}", table);
    }
}

/// One bar per image.
pub fn line_table(viewer: &HitMapViewer, palette: &Palette) -> Option<Table> {
    let values = viewer.display_values()?;
    let max = max_value(&values);
    let kind = viewer.kind();

    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(vec![
        Cell::new("Image").add_attribute(Attribute::Bold),
        Cell::new(kind.label()).add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    if let Some(col) = table.column_mut(1) {
        col.set_cell_alignment(CellAlignment::Right);
    }

    for (image, &value) in values.iter().enumerate() {
        let fraction = if max > 0.0 { value / max } else { 0.0 };
        let bar = "#".repeat((fraction.clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize);
        table.add_row(vec![
            Cell::new(image),
            Cell::new(format_value(kind, value)),
            Cell::new(bar).fg(color(palette.intensity(fraction))),
        ]);
    }
    Some(table)
}

/// Bar table followed by the y-axis ticks a plot would carry.
pub fn print_line(viewer: &HitMapViewer, palette: &Palette, ticks: usize) {
    let Some(table) = line_table(viewer, palette) else {
        return;
    };
    println!("{}", table);

    let labels: Vec<String> = viewer
        .axis_ticks(ticks)
        .into_iter()
        .map(|(_, label)| label)
        .collect();
    println!("Axis: {}", labels.join(" | "));
}
