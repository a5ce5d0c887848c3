//! DraftKings classic-contest upload format.

use super::pool_csv::normalize_site_id;
use crate::core::models::lineup::{Lineup, ROSTER_SIZE, Slot};
use crate::core::models::player::PlayerPool;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

pub const DK_HEADER: [&str; ROSTER_SIZE] = ["QB", "RB", "RB", "WR", "WR", "WR", "TE", "FLEX", "DST"];

const NAME_COLUMNS: [&str; 3] = ["player_name", "name", "displayname"];
const ID_COLUMNS: [&str; 3] = ["draftable_id", "dk_player_id", "id"];

/// Canonical form used to match lineup players against slate rows.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Slate file has no {kind} column (looked for {candidates})")]
    MissingColumn {
        kind: &'static str,
        candidates: String,
    },
}

/// A lineup that could not be written because some of its players have no site identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lineup {lineup_number} has unresolved players: {}", .unresolved.join(", "))]
pub struct ExportMappingError {
    /// 1-based position of the lineup in the requested batch.
    pub lineup_number: usize,
    pub unresolved: Vec<String>,
}

/// Player name → site identifier for the current slate.
#[derive(Debug, Clone, Default)]
pub struct SlateIdentifiers {
    ids: HashMap<String, String>,
}

impl SlateIdentifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, id: impl Into<String>) {
        self.ids.insert(normalize_name(name), id.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.ids.get(&normalize_name(name)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Identifiers carried by the pool itself (`draftable_id`/`dk_player_id` columns).
    pub fn from_pool(pool: &PlayerPool) -> Self {
        let mut ids = Self::new();
        for player in pool.iter() {
            if let Some(id) = &player.site_id {
                ids.insert(&player.name, id.clone());
            }
        }
        ids
    }

    /// Identifiers carried by the players of already-built lineups.
    pub fn from_lineups(lineups: &[Lineup]) -> Self {
        let mut ids = Self::new();
        for player in lineups.iter().flat_map(Lineup::players) {
            if let Some(id) = &player.site_id {
                ids.insert(&player.name, id.clone());
            }
        }
        ids
    }

    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        let file = std::fs::File::open(path).map_err(|e| ExportError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let ids = Self::from_reader(file)?;
        info!(path = %path.display(), entries = ids.len(), "Loaded slate identifiers.");
        Ok(ids)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ExportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);
        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        let find = |candidates: &[&str]| {
            candidates
                .iter()
                .find_map(|c| headers.iter().position(|h| h == c))
        };
        let name_idx = find(&NAME_COLUMNS[..]).ok_or_else(|| ExportError::MissingColumn {
            kind: "name",
            candidates: NAME_COLUMNS.join(", "),
        })?;
        let id_idx = find(&ID_COLUMNS[..]).ok_or_else(|| ExportError::MissingColumn {
            kind: "identifier",
            candidates: ID_COLUMNS.join(", "),
        })?;

        let mut ids = Self::new();
        for record in csv_reader.records() {
            let record = record?;
            let (Some(name), Some(id)) = (record.get(name_idx), record.get(id_idx)) else {
                continue;
            };
            let id = normalize_site_id(id);
            if name.trim().is_empty() || id.is_empty() {
                continue;
            }
            ids.insert(name, id);
        }
        Ok(ids)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub lineup_number: usize,
    pub ids: [String; ROSTER_SIZE],
}

/// Rows that resolved fully, plus the lineups that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub rows: Vec<ExportRow>,
    pub rejected: Vec<ExportMappingError>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(DK_HEADER)?;
        for row in &self.rows {
            csv_writer.write_record(&row.ids)?;
        }
        csv_writer.flush().map_err(|e| ExportError::Io {
            path: "<writer>".to_string(),
            source: e,
        })?;
        Ok(())
    }

    pub fn write_to_path(&self, path: &Path) -> Result<(), ExportError> {
        let file = std::fs::File::create(path).map_err(|e| ExportError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        self.write_csv(file)?;
        info!(path = %path.display(), rows = self.rows.len(), "Wrote upload file.");
        Ok(())
    }
}

/// Maps each lineup's players to site identifiers in upload column order.
pub fn build_export(lineups: &[Lineup], ids: &SlateIdentifiers) -> ExportReport {
    let mut report = ExportReport::default();
    for (idx, lineup) in lineups.iter().enumerate() {
        let lineup_number = idx + 1;
        let mut row: [String; ROSTER_SIZE] = Default::default();
        let mut unresolved = Vec::new();
        for (col, slot) in Slot::ALL.iter().enumerate() {
            match lineup.player(*slot) {
                Some(player) => match ids.get(&player.name) {
                    Some(id) => row[col] = id.to_string(),
                    None => unresolved.push(player.name.clone()),
                },
                None => unresolved.push(format!("<empty {slot}>")),
            }
        }
        if unresolved.is_empty() {
            report.rows.push(ExportRow {
                lineup_number,
                ids: row,
            });
        } else {
            warn!(lineup_number, unresolved = ?unresolved, "Lineup excluded from upload file.");
            report.rejected.push(ExportMappingError {
                lineup_number,
                unresolved,
            });
        }
    }
    report
}
