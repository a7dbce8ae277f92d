//! Plain-text depot list for the `list` command

use depot_model::{BarrelCounts, Depot};
use std::fmt::Write;

/// One line per depot: name, type, position, then whatever it tracks
#[must_use]
pub fn render_line(depot: &Depot) -> String {
    let mut line = format!(
        "{}\t{}\t{:.5},{:.5}",
        depot.name, depot.depot_type, depot.position.lat, depot.position.lng
    );
    if let Some(BarrelCounts { full, empty }) = depot.visible_barrels() {
        let _ = write!(line, "\tbarrels {full}/{empty}\ttank {}\ttrailer {}", depot.tank, depot.trailer);
    }
    if !depot.equipment.is_empty() {
        let _ = write!(line, "\t[{}]", depot.equipment.join(", "));
    }
    if let Some(note) = &depot.note {
        let _ = write!(line, "\t\"{note}\"");
    }
    line
}

/// Render a whole list
#[must_use]
pub fn render_list(depots: &[&Depot]) -> String {
    depots
        .iter()
        .map(|d| render_line(d))
        .collect::<Vec<_>>()
        .join("\n")
}
