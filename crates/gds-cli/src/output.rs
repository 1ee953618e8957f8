//! Terminal output.

use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use gds_client::DataFrame;
use serde_json::Value;

/// Table with the given header.
pub fn table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Prints every column of `frame`.
pub fn print_frame(frame: &DataFrame) {
    let columns: Vec<&str> = frame.columns().iter().map(String::as_str).collect();
    print_columns(frame, &columns);
}

/// Prints the columns of `frame` listed in `columns`, skipping absent ones.
pub fn print_columns(frame: &DataFrame, columns: &[&str]) {
    let present: Vec<&str> = columns
        .iter()
        .copied()
        .filter(|c| frame.has_column(c))
        .collect();

    let mut table = table(&present);
    for row in frame.rows() {
        table.add_row(
            present
                .iter()
                .map(|c| row.get(*c).map(cell).unwrap_or_default())
                .collect::<Vec<_>>(),
        );
    }
    println!("{table}");
    println!("{} row(s)\n", frame.len());
}

/// Prints the statements recorded in dry-run mode.
pub fn print_statements(statements: &[String]) {
    println!("{}", "Dry run, statements that would be sent:".bold());
    for statement in statements {
        println!("  {statement}");
    }
}
