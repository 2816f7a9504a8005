//! Run summary rendering.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use pheno_model::{LinkMode, MatchPolicy, SourceKind, default_sources};

use crate::pipeline::LinkResult;

pub fn print_summary(result: &LinkResult) {
    println!("Output: {}", result.output_path.display());
    println!("Provenance: {}", result.provenance_path.display());
    println!(
        "Subjects: {}  Sessions: {}",
        result.diagnostics.subjects, result.diagnostics.sessions
    );
    if result.diagnostics.fusion_failures > 0 {
        println!(
            "Fusion failures (sentinel-filled): {}",
            result.diagnostics.fusion_failures
        );
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("File"),
        header_cell("Records"),
        header_cell("Bad dates"),
        header_cell("Matched"),
        header_cell("Rejected"),
        header_cell("Hand mismatch"),
    ]);
    apply_table_style(&mut table);
    for index in 2..=6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for kind in SourceKind::ALL {
        let stats = result.diagnostics.source(kind);
        table.add_row(vec![
            source_cell(kind),
            file_cell(stats.missing_file),
            Cell::new(stats.records),
            count_cell(stats.unparseable_dates),
            Cell::new(stats.matched),
            count_cell(stats.rejected_over_tolerance),
            count_cell(stats.hand_mismatches),
        ]);
    }
    println!("{table}");
}

/// Renders the `sources` subcommand: the built-in source configuration.
pub fn print_sources() {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("Description"),
        header_cell("Subject column"),
        header_cell("Date column"),
        header_cell("Matching"),
        header_cell("Values"),
    ]);
    apply_table_style(&mut table);
    for spec in default_sources() {
        let policy = match spec.link {
            LinkMode::SubjectLevel => "subject-level".to_string(),
            LinkMode::PerSession(MatchPolicy::ExactDate) => "exact date".to_string(),
            LinkMode::PerSession(MatchPolicy::Tolerance { max_lag_days }) => {
                format!("nearest within {max_lag_days} d")
            }
        };
        table.add_row(vec![
            source_cell(spec.kind),
            Cell::new(spec.kind.description()),
            Cell::new(spec.subject_column),
            Cell::new(spec.date_column),
            Cell::new(policy),
            Cell::new(spec.value_columns.join(", ")),
        ]);
    }
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(comfy_table::Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn source_cell(kind: SourceKind) -> Cell {
    Cell::new(kind.code())
        .fg(comfy_table::Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn file_cell(missing: bool) -> Cell {
    if missing {
        Cell::new("missing").fg(comfy_table::Color::Yellow)
    } else {
        Cell::new("✓").fg(comfy_table::Color::Green)
    }
}

fn count_cell(value: usize) -> Cell {
    if value > 0 {
        Cell::new(value)
            .fg(comfy_table::Color::Yellow)
            .add_attribute(Attribute::Bold)
    } else {
        Cell::new(value).fg(comfy_table::Color::DarkGrey)
    }
}
