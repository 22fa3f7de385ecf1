pub use crate::error::Error;

pub use anstream::eprintln;
pub use anstream::println;
pub use color_eyre::eyre::{eyre, Context, Result};

pub fn new_table() -> prettytable::Table {
    let mut table = prettytable::Table::new();

    let format = prettytable::format::FormatBuilder::new()
        .padding(1, 1)
        .build();

    table.set_format(format);

    table
}

/// Pull a display string out of a JSON object, empty when absent
pub fn field(item: &serde_json::Value, key: &str) -> String {
    match item.get(key) {
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(serde_json::Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Items of a listing response: `{ "items": [...] }` or a bare array
pub fn listing_items(value: &serde_json::Value) -> &[serde_json::Value] {
    value
        .get("items")
        .unwrap_or(value)
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Print JSON items as a table of `(header, field)` columns
pub fn print_items(items: &[serde_json::Value], columns: &[(&str, &str)]) {
    use prettytable::{Cell, Row};

    let mut table = new_table();
    table.add_row(Row::new(
        columns.iter().map(|(header, _)| Cell::new(header)).collect(),
    ));

    for item in items {
        table.add_row(Row::new(
            columns
                .iter()
                .map(|(_, key)| Cell::new(&field(item, key)))
                .collect(),
        ));
    }

    table.printstd();
}

/// Point the user at the next page of a single-page listing
pub fn print_next_page_hint(value: &serde_json::Value, command: &str) {
    if let Some(cursor) = value
        .get(instantly_core::pagination::NEXT_CURSOR_FIELD)
        .and_then(serde_json::Value::as_str)
    {
        eprintln!("\nTo fetch the next page, run:\n  instantly-mcp {command} --starting-after {cursor}");
    }
}
