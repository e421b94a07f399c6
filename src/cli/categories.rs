use tabled::Table;

use crate::{types::CategoryTableRow, utils};

/// Prints the known category keys, optionally filtered by a substring.
pub fn categories(search: Option<String>) {
    let mut rows: Vec<CategoryTableRow> = utils::KNOWN_CATEGORIES
        .iter()
        .map(|key| CategoryTableRow {
            key: key.to_string(),
        })
        .collect();

    if let Some(search) = search {
        let search_term = search.to_lowercase();
        rows.retain(|r| r.key.contains(&search_term));
    }

    rows.sort_by(|a, b| a.key.cmp(&b.key));
    println!("{}", Table::new(rows));
}
