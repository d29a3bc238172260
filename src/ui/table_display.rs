use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::config::config::IconConfig;
use crate::data::{Character, PageInfo};

const HEADERS: [&str; 6] = ["ID", "Name", "Status", "Species", "Gender", "Origin"];

/// Build the plain-text table for a character set
pub fn build_table(characters: &[Character], icons: &IconConfig) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    let headers: Vec<Cell> = HEADERS
        .iter()
        .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
        .collect();
    table.set_header(headers);

    for character in characters {
        table.add_row(vec![
            character.id.to_string(),
            character.name.clone(),
            format!("{} {}", icons.for_status(&character.status), character.status),
            character.species_label(),
            character.gender.clone(),
            character.origin.name.clone(),
        ]);
    }

    table
}

/// One-line summary such as "20 of 826 characters"
pub fn summary_line(shown: usize, info: Option<&PageInfo>) -> String {
    match info {
        Some(info) if info.count as usize > shown => {
            format!("{} of {} characters", shown, info.count)
        }
        _ => format!("{} characters", shown),
    }
}

pub fn display_characters(characters: &[Character], info: Option<&PageInfo>, icons: &IconConfig) {
    if characters.is_empty() {
        println!("{}", "No characters to show.".yellow());
        return;
    }

    println!("{}", build_table(characters, icons));
    println!("\n{}", summary_line(characters.len(), info).green());
}

pub fn display_json(characters: &[Character]) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(characters)?);
    Ok(())
}
