// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Event and role loaders. Format is inferred from the file extension:
//! `.json` (array), `.jsonl`/`.ndjson` (one record per line), or `.csv`
//! with a header row naming the columns.

use crate::error::CliError;
use archetype_core::{Handedness, RawEvent};
use archetype_features::{RoleEntry, RoleTable};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    JsonLines,
    Csv,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let extension = path
            .extension()
            .and_then(|value| value.to_str())
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "json" => Ok(Self::Json),
            "jsonl" | "ndjson" => Ok(Self::JsonLines),
            "csv" => Ok(Self::Csv),
            _ => Err(CliError::invalid_input(format!(
                "unable to infer input format for '{}'; expected .json, .jsonl, or .csv",
                path.display()
            ))),
        }
    }
}

pub fn load_events(path: &Path) -> Result<Vec<RawEvent>, CliError> {
    let format = InputFormat::from_path(path)?;
    let raw = read_text(path)?;
    let events = match format {
        InputFormat::Json => parse_json_array(&raw, path)?,
        InputFormat::JsonLines => parse_json_lines(&raw, path)?,
        InputFormat::Csv => parse_event_csv(&raw)?,
    };
    info!(path = %path.display(), events = events.len(), "loaded events");
    Ok(events)
}

/// A missing path yields an empty table and a warning; every row then
/// reads the default starter ratio.
pub fn load_roles(path: Option<&Path>) -> Result<RoleTable, CliError> {
    let Some(path) = path.filter(|p| p.exists()) else {
        warn!(
            path = ?path.map(Path::display).map(|d| d.to_string()),
            default = RoleTable::DEFAULT_RATIO,
            "role file unavailable; every starter ratio uses the default"
        );
        return Ok(RoleTable::default());
    };
    let raw = read_text(path)?;
    let entries: Vec<RoleEntry> = match InputFormat::from_path(path)? {
        InputFormat::Json => parse_json_array(&raw, path)?,
        InputFormat::JsonLines => parse_json_lines(&raw, path)?,
        InputFormat::Csv => parse_role_csv(&raw)?,
    };
    let table = RoleTable::from_entries(entries);
    info!(path = %path.display(), roles = table.len(), "loaded roles");
    Ok(table)
}

fn read_text(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))
}

fn parse_json_array<T: DeserializeOwned>(raw: &str, path: &Path) -> Result<Vec<T>, CliError> {
    serde_json::from_str(raw)
        .map_err(|source| CliError::json(format!("invalid JSON in '{}'", path.display()), source))
}

fn parse_json_lines<T: DeserializeOwned>(raw: &str, path: &Path) -> Result<Vec<T>, CliError> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line).map_err(|source| {
                CliError::json(format!("invalid record on line {} of '{}'", idx + 1, path.display()), source)
            })
        })
        .collect()
}

/// Column lookup for one header-driven CSV record.
struct CsvRecord<'a> {
    line: usize,
    columns: &'a HashMap<String, usize>,
    fields: Vec<String>,
}

impl CsvRecord<'_> {
    fn text(&self, column: &str) -> Option<String> {
        let idx = *self.columns.get(column)?;
        let value = self.fields.get(idx)?.trim();
        if value.is_empty() || matches!(value, "NA" | "NaN" | "null" | "None") {
            None
        } else {
            Some(value.to_string())
        }
    }

    fn parsed<T: std::str::FromStr>(&self, column: &str) -> Result<Option<T>, CliError> {
        match self.text(column) {
            None => Ok(None),
            Some(value) => value.parse::<T>().map(Some).map_err(|_| {
                CliError::invalid_input(format!(
                    "line {}: column '{column}' has unparseable value '{value}'",
                    self.line
                ))
            }),
        }
    }

    /// Integer column that may be written as a float (`2024.0`).
    fn integer<T: TryFrom<i64>>(&self, column: &str) -> Result<Option<T>, CliError> {
        let Some(value) = self.parsed::<f64>(column)? else {
            return Ok(None);
        };
        let whole = value.trunc();
        if whole != value || !whole.is_finite() {
            return Err(CliError::invalid_input(format!(
                "line {}: column '{column}' expects an integer, got {value}",
                self.line
            )));
        }
        T::try_from(whole as i64).map(Some).map_err(|_| {
            CliError::invalid_input(format!(
                "line {}: column '{column}' is out of range: {value}",
                self.line
            ))
        })
    }

    fn required<T>(&self, column: &str, value: Result<Option<T>, CliError>) -> Result<T, CliError> {
        value?.ok_or_else(|| {
            CliError::invalid_input(format!("line {}: missing required column '{column}'", self.line))
        })
    }
}

fn csv_records<'a>(
    raw: &'a str,
    columns: &'a mut HashMap<String, usize>,
) -> Result<impl Iterator<Item = CsvRecord<'a>> + 'a, CliError> {
    let mut lines = raw.lines().enumerate().filter(|(_, line)| !line.trim().is_empty());
    let (_, header) = lines
        .next()
        .ok_or_else(|| CliError::invalid_input("CSV input is empty"))?;
    for (idx, name) in split_csv_line(header).into_iter().enumerate() {
        columns.insert(name.trim().trim_start_matches('\u{feff}').to_string(), idx);
    }
    let columns: &'a HashMap<String, usize> = columns;
    Ok(lines.map(move |(idx, line)| CsvRecord {
        line: idx + 1,
        columns,
        fields: split_csv_line(line),
    }))
}

pub fn parse_event_csv(raw: &str) -> Result<Vec<RawEvent>, CliError> {
    let mut columns = HashMap::new();
    let mut events = Vec::new();
    for record in csv_records(raw, &mut columns)? {
        let pitcher = record.required("pitcher", record.integer::<u64>("pitcher"))?;
        let game_year = record.required("game_year", record.integer::<u16>("game_year"))?;
        let p_throws = record.required("p_throws", record.parsed::<Handedness>("p_throws"))?;
        let mut event = RawEvent::new(pitcher, game_year, p_throws);
        event.player_name = record.text("player_name");
        event.pitch_type = record.text("pitch_type");
        event.stand = record.parsed("stand")?;
        event.release_speed = record.parsed("release_speed")?;
        event.release_spin_rate = record.parsed("release_spin_rate")?;
        event.release_pos_x = record.parsed("release_pos_x")?;
        event.release_pos_z = record.parsed("release_pos_z")?;
        event.release_extension = record.parsed("release_extension")?;
        event.pfx_x = record.parsed("pfx_x")?;
        event.pfx_z = record.parsed("pfx_z")?;
        event.plate_x = record.parsed("plate_x")?;
        event.plate_z = record.parsed("plate_z")?;
        event.sz_top = record.parsed("sz_top")?;
        event.sz_bot = record.parsed("sz_bot")?;
        event.zone = record.integer("zone")?;
        event.description = record.text("description");
        event.result_type = record.text("type");
        event.bb_type = record.text("bb_type");
        events.push(event);
    }
    Ok(events)
}

pub fn parse_role_csv(raw: &str) -> Result<Vec<RoleEntry>, CliError> {
    let mut columns = HashMap::new();
    let mut entries = Vec::new();
    for record in csv_records(raw, &mut columns)? {
        entries.push(RoleEntry {
            pitcher: record.required("pitcher", record.integer::<u64>("pitcher"))?,
            game_year: record.required("game_year", record.integer::<u16>("game_year"))?,
            games: record.integer("games")?,
            starts: record.integer("starts")?,
            role: record.text("role"),
        });
    }
    Ok(entries)
}

/// Splits one CSV line, honoring double-quoted fields and `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();
    while let Some(c) = chars.next() {
        match (c, quoted) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', _) => quoted = !quoted,
            (',', false) => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

#[cfg(test)]
mod tests {
    use super::{InputFormat, load_roles, parse_event_csv, parse_role_csv, split_csv_line};
    use archetype_core::{Handedness, SeasonKey};
    use std::path::Path;

    #[test]
    fn format_follows_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a/b.JSON")).unwrap(), InputFormat::Json);
        assert_eq!(InputFormat::from_path(Path::new("b.jsonl")).unwrap(), InputFormat::JsonLines);
        assert_eq!(InputFormat::from_path(Path::new("b.csv")).unwrap(), InputFormat::Csv);
        assert!(InputFormat::from_path(Path::new("b.parquet")).is_err());
    }

    #[test]
    fn quoted_fields_keep_commas() {
        assert_eq!(
            split_csv_line("1,\"Cole, Gerrit\",FF,\"say \"\"hi\"\"\"\r"),
            vec!["1", "Cole, Gerrit", "FF", "say \"hi\""]
        );
    }

    #[test]
    fn event_csv_is_header_driven() {
        let raw = "game_year,pitcher,player_name,p_throws,pitch_type,release_speed,zone,type,extra\n\
                   2024.0,543037,\"Cole, Gerrit\",R,FF,97.1,5,S,ignored\n\
                   2024,543037,\"Cole, Gerrit\",R,SL,,NA,X,\n";
        let events = parse_event_csv(raw).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].pitcher, 543037);
        assert_eq!(events[0].game_year, 2024);
        assert_eq!(events[0].p_throws, Handedness::Right);
        assert_eq!(events[0].player_name.as_deref(), Some("Cole, Gerrit"));
        assert_eq!(events[0].release_speed, Some(97.1));
        assert_eq!(events[0].zone, Some(5));
        assert_eq!(events[1].release_speed, None);
        assert_eq!(events[1].zone, None);
        assert_eq!(events[1].result_type.as_deref(), Some("X"));
    }

    #[test]
    fn event_csv_reports_bad_values() {
        let raw = "pitcher,game_year,p_throws,release_speed\n1,2024,R,fast\n";
        let err = parse_event_csv(raw).unwrap_err();
        assert!(err.to_string().contains("release_speed"));
        let missing = "pitcher,game_year\n1,2024\n";
        assert!(parse_event_csv(missing).unwrap_err().to_string().contains("p_throws"));
    }

    #[test]
    fn role_csv_and_missing_file() {
        let entries = parse_role_csv("pitcher,game_year,games,starts,role\n7,2023,30,30,\n8,2023,,,RP\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].starter_ratio(), Some(1.0));
        assert_eq!(entries[1].starter_ratio(), Some(0.0));

        let table = load_roles(Some(Path::new("/nonexistent/roles.csv"))).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.starter_ratio(SeasonKey::new(7, 2023)), 0.0);
    }
}
