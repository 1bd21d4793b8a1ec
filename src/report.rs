use crate::analysis::Summary;
use crate::model::SamplePoint;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

const END_OF_LIFE_SOH: f64 = 80.0;
const SEVERE_SOH: f64 = 60.0;

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}

fn soh_color(soh_percent: f64) -> Color {
    if soh_percent >= END_OF_LIFE_SOH {
        Color::Green
    } else if soh_percent >= SEVERE_SOH {
        Color::DarkYellow
    } else {
        Color::Red
    }
}

pub fn build_samples_table(samples: &[SamplePoint]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Year", "Capacity (Wh)", "SoH (%)"]);
    for sample in samples {
        table.add_row(vec![
            Cell::new(sample.year).add_attribute(Attribute::Dim),
            Cell::new(format!("{:.2}", sample.remaining_capacity))
                .set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", sample.soh_percent))
                .set_alignment(CellAlignment::Right)
                .fg(soh_color(sample.soh_percent)),
        ]);
    }
    table
}

pub fn build_summary_table(summary: &Summary) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Result", "Value"]);
    table.add_row(vec![
        Cell::new("Initial capacity"),
        Cell::new(format!("{:.0} Wh", summary.initial_capacity)),
    ]);
    table.add_row(vec![
        Cell::new(format!("Final capacity after {} years", summary.years)),
        Cell::new(format!("{:.0} Wh", summary.final_capacity)),
    ]);
    table.add_row(vec![
        Cell::new(format!("Final SoH after {} years", summary.years)),
        Cell::new(format!("{:.2}%", summary.final_soh_percent))
            .fg(soh_color(summary.final_soh_percent)),
    ]);
    table.add_row(vec![
        Cell::new("Average yearly loss"),
        Cell::new(format!("{:.2}%", summary.average_yearly_loss_percent)),
    ]);
    for crossing in &summary.crossings {
        let label = format!("Below {}% SoH", crossing.soh_percent);
        let value = match crossing.year {
            Some(year) => Cell::new(format!("after {year:.1} years")).fg(Color::Red),
            None => Cell::new("not reached").fg(Color::Green),
        };
        table.add_row(vec![Cell::new(label), value]);
    }
    table
}
