use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use hitmap::geometry::MotorPositions;
use hitmap::ranking::BestPosition;
use hitmap::requests::Request;
use hitmap::results::Position;
use hitmap::viewer::HitPoint;

fn format_motors(motors: &MotorPositions) -> String {
    motors
        .iter()
        .map(|(name, pos)| format!("{}={:.4}", name, pos))
        .collect::<Vec<_>>()
        .join(" ")
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.add_row(
        header
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );
    table
}

pub fn print_best_positions(positions: &[BestPosition]) {
    if positions.is_empty() {
        println!("\n(no best positions)");
        return;
    }

    let mut table = new_table(&[
        "No.",
        "Score",
        "Spots num",
        "Spots int aver",
        "Resolution",
        "Path",
        "Col",
        "Row",
        "Motor positions",
    ]);
    for i in [0, 1, 2, 3, 4, 6, 7] {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }

    for (rank, p) in positions.iter().enumerate() {
        let score = Cell::new(format!("{:.2}", p.score));
        table.add_row(vec![
            Cell::new(p.index + 1),
            if rank == 0 { score.fg(Color::Green) } else { score },
            Cell::new(p.spots_num),
            Cell::new(format!("{:.2}", p.spots_int_aver)),
            Cell::new(format!("{:.2}", p.spots_resolution)),
            Cell::new(&p.filename),
            Cell::new(p.col),
            Cell::new(p.row),
            Cell::new(p.cpos.as_ref().map(format_motors).unwrap_or_default()),
        ]);
    }
    println!("{}", table);
}

pub fn print_hit_points(points: &[HitPoint]) {
    let mut table = new_table(&["Cell", "Value", "Centre", "Motor positions"]);
    for p in points {
        let cell = match p.cell {
            Position::Cell { col, row } => format!("{},{}", col, row),
            Position::Image(i) => i.to_string(),
        };
        table.add_row(vec![
            Cell::new(cell),
            Cell::new(format!("{:.1}", p.value)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1},{:.1}", p.grid.x, p.grid.y)),
            Cell::new(format_motors(&p.motors)),
        ]);
    }
    println!("{}", table);
}

pub fn print_requests(requests: &[Request]) {
    if requests.is_empty() {
        println!("\n(no requests)");
        return;
    }
    let mut table = new_table(&["#", "Request", "Detail"]);
    for (i, r) in requests.iter().enumerate() {
        let (name, detail) = match r {
            Request::CreateCentringPoint { motors } => ("Create centring point", format_motors(motors)),
            Request::SelectAllPoints => ("Select all points", String::new()),
            Request::CreateHelicalLine { motors } => (
                "Create helical line",
                motors.as_ref().map(format_motors).unwrap_or_default(),
            ),
            Request::MoveToPositions { motors, wait } => (
                "Move to positions",
                format!("{}{}", format_motors(motors), if *wait { " (wait)" } else { "" }),
            ),
            Request::MoveOmegaRelative { degrees } => ("Rotate omega", format!("{:+.1} deg", degrees)),
            Request::DisplayImage { path } => ("Display image", path.clone()),
            Request::RelaunchProcessing { collection } => ("Relaunch processing", collection.clone()),
        };
        table.add_row(vec![Cell::new(i + 1), Cell::new(name).fg(Color::Cyan), Cell::new(detail)]);
    }
    println!("\n{}", table);
}
