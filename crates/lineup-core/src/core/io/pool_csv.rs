//! Reader for the cleaned player CSV produced upstream by the projection/salary collectors.
//!
//! Required columns (case-insensitive): `player_name`, `player_position_id`, `team` (or
//! `player_team_id`), `salary`, `projected_points`. Optional: `floor`, `ceiling`, `variance`,
//! `ownership_projection`, and a site identifier in `draftable_id` or `dk_player_id`.

use crate::core::models::player::{Player, PlayerPool, PoolError, Position};
use csv::StringRecord;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const REQUIRED_COLUMNS: [&str; 5] = [
    "player_name",
    "player_position_id",
    "team",
    "salary",
    "projected_points",
];

const SITE_ID_COLUMNS: [&str; 2] = ["draftable_id", "dk_player_id"];

#[derive(Debug, Error)]
pub enum PoolLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("Line {line}: column '{column}' has non-numeric value '{value}'")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("Line {line}: unrecognized position '{value}'")]
    UnknownPosition { line: u64, value: String },
    #[error("Invalid player pool: {0}")]
    Pool(#[from] PoolError),
}

pub fn read_pool_from_path(path: &Path) -> Result<PlayerPool, PoolLoadError> {
    let file = std::fs::File::open(path).map_err(|e| PoolLoadError::Io {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;
    let pool = read_pool(file)?;
    info!(path = %path.display(), players = pool.len(), "Loaded player pool.");
    Ok(pool)
}

pub fn read_pool<R: Read>(reader: R) -> Result<PlayerPool, PoolLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;

    let mut players = Vec::new();
    let mut dropped = 0usize;
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        match columns.parse_row(&record, line)? {
            Some(player) => players.push(player),
            None => {
                dropped += 1;
                debug!(line, "Dropping row with empty required fields.");
            }
        }
    }
    if dropped > 0 {
        info!(dropped, "Dropped rows with missing required values.");
    }

    Ok(PlayerPool::new(players)?)
}

struct ColumnIndex {
    name: usize,
    position: usize,
    team: usize,
    salary: usize,
    projected_points: usize,
    floor: Option<usize>,
    ceiling: Option<usize>,
    variance: Option<usize>,
    ownership: Option<usize>,
    site_id: Option<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord) -> Result<Self, PoolLoadError> {
        let lookup: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_lowercase(), i))
            .collect();
        let find = |name: &str| lookup.get(name).copied();
        let team = find("team").or_else(|| find("player_team_id"));

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&col| {
                if col == "team" {
                    team.is_none()
                } else {
                    find(col).is_none()
                }
            })
            .map(|col| col.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(PoolLoadError::MissingColumns(missing));
        }

        Ok(Self {
            name: find("player_name").unwrap_or_default(),
            position: find("player_position_id").unwrap_or_default(),
            team: team.unwrap_or_default(),
            salary: find("salary").unwrap_or_default(),
            projected_points: find("projected_points").unwrap_or_default(),
            floor: find("floor"),
            ceiling: find("ceiling"),
            variance: find("variance"),
            ownership: find("ownership_projection"),
            site_id: SITE_ID_COLUMNS.iter().find_map(|c| find(c)),
        })
    }

    /// Returns `Ok(None)` for rows that must be dropped because a required field is empty.
    fn parse_row(&self, record: &StringRecord, line: u64) -> Result<Option<Player>, PoolLoadError> {
        let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");

        let name = field(self.name);
        let position = field(self.position);
        let team = field(self.team);
        let salary = field(self.salary);
        let points = field(self.projected_points);
        if [name, position, team, salary, points]
            .iter()
            .any(|v| v.is_empty() || v.eq_ignore_ascii_case("nan"))
        {
            return Ok(None);
        }

        let position: Position = position.parse().map_err(|_| PoolLoadError::UnknownPosition {
            line,
            value: position.to_string(),
        })?;
        let salary = parse_salary(salary).ok_or_else(|| PoolLoadError::InvalidNumber {
            line,
            column: "salary",
            value: salary.to_string(),
        })?;
        let projected_points =
            parse_number(points).ok_or_else(|| PoolLoadError::InvalidNumber {
                line,
                column: "projected_points",
                value: points.to_string(),
            })?;

        let mut player = Player::new(name, position, team, salary, projected_points);
        player.floor = self.optional(record, self.floor, "floor", line)?;
        player.ceiling = self.optional(record, self.ceiling, "ceiling", line)?;
        player.variance = self.optional(record, self.variance, "variance", line)?;
        player.ownership_projection =
            self.optional(record, self.ownership, "ownership_projection", line)?;
        player.site_id = self
            .site_id
            .and_then(|idx| record.get(idx))
            .map(normalize_site_id)
            .filter(|id| !id.is_empty());
        Ok(Some(player))
    }

    fn optional(
        &self,
        record: &StringRecord,
        idx: Option<usize>,
        column: &'static str,
        line: u64,
    ) -> Result<Option<f64>, PoolLoadError> {
        let Some(raw) = idx.and_then(|i| record.get(i)).map(str::trim) else {
            return Ok(None);
        };
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            return Ok(None);
        }
        parse_number(raw)
            .map(Some)
            .ok_or_else(|| PoolLoadError::InvalidNumber {
                line,
                column,
                value: raw.to_string(),
            })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepts values like `4500`, `4500.0` and `$4,500`.
fn parse_salary(raw: &str) -> Option<u32> {
    let cleaned: String = raw.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    let value = parse_number(cleaned.trim())?;
    if value <= 0.0 || value > u32::MAX as f64 {
        return None;
    }
    Some(value.round() as u32)
}

/// Identifiers exported from spreadsheets often arrive as floats (`12345.0`).
pub(crate) fn normalize_site_id(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.strip_suffix(".0") {
        Some(head) if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) => {
            head.to_string()
        }
        _ => trimmed.to_string(),
    }
}
