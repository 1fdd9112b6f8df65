//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use console::style;
use std::path::PathBuf;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::project::Project;
use crate::yaml::parse_yaml_file;

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
/// This provides a consistent display format across all list/table outputs.
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len.saturating_sub(3)])
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// Load every parseable entity of a type, warning about broken files
pub fn load_entities<T: Entity + 'static>(project: &Project, prefix: EntityPrefix) -> Vec<(T, PathBuf)> {
    let mut entities = Vec::new();
    for path in project.iter_entity_files(prefix) {
        match parse_yaml_file::<T>(&path) {
            Ok(entity) => entities.push((entity, path)),
            Err(e) => {
                eprintln!(
                    "{} Failed to parse {}: {}",
                    style("!").yellow(),
                    path.display(),
                    e
                );
            }
        }
    }
    entities
}

/// Find an entity by ID prefix match or fuzzy title match
pub fn find_entity<T: Entity + 'static>(
    project: &Project,
    prefix: EntityPrefix,
    query: &str,
) -> miette::Result<(T, PathBuf)> {
    let mut matches: Vec<(T, PathBuf)> = Vec::new();

    for (entity, path) in load_entities::<T>(project, prefix) {
        let id_str = entity.id().to_string();
        if id_str.starts_with(query) || id_str == query {
            matches.push((entity, path));
        } else if entity.title().to_lowercase().contains(&query.to_lowercase()) {
            matches.push((entity, path));
        }
    }

    match matches.len() {
        0 => Err(miette::miette!(
            "No {} record found matching '{}'",
            prefix.as_str(),
            query
        )),
        1 => Ok(matches.remove(0)),
        _ => {
            println!("{} Multiple matches found:", style("!").yellow());
            for (entity, _path) in &matches {
                println!("  {} - {}", format_short_id(entity.id()), entity.title());
            }
            Err(miette::miette!(
                "Ambiguous query '{}'. Please be more specific.",
                query
            ))
        }
    }
}
