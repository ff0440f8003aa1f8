use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::warn;

use crate::simulation::events::EventKind;
use crate::simulation::weather::WeatherSample;
use crate::world::{Axial, Cell, Grid, TerrainType};

/// On-disk encoding for exported history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryFormat {
    #[default]
    Json,
    Bincode,
}

impl HistoryFormat {
    pub fn extension(self) -> &'static str {
        match self {
            HistoryFormat::Json => "json",
            HistoryFormat::Bincode => "bin",
        }
    }

    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(HistoryFormat::Json),
            "bin" => Some(HistoryFormat::Bincode),
            _ => None,
        }
    }
}

impl std::str::FromStr for HistoryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(HistoryFormat::Json),
            "bincode" | "bin" => Ok(HistoryFormat::Bincode),
            other => Err(format!("Unknown history format '{}' (expected json or bincode)", other)),
        }
    }
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("Cannot tell history format of {} (expected .json or .bin)", .0.display())]
    UnknownFormat(PathBuf),
    #[error("Corrupt history {}: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },
}

/// Per-cell values recorded in a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellRecord {
    pub height: f64,
    pub water_level: f64,
    pub terrain_type: TerrainType,
    pub vegetation: f64,
    pub temperature: f64,
}

impl From<&Cell> for CellRecord {
    fn from(cell: &Cell) -> Self {
        Self {
            height: cell.height,
            water_level: cell.water_level,
            terrain_type: cell.terrain_type,
            vegetation: cell.vegetation,
            temperature: cell.temperature,
        }
    }
}

/// Cells of one snapshot in grid order. Serialized as a map keyed by
/// `"(q,r)"`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellTable(Vec<(Axial, CellRecord)>);

impl CellTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Axial, CellRecord)> {
        self.0.iter()
    }

    pub fn get(&self, coord: Axial) -> Option<&CellRecord> {
        self.0.iter().find(|(c, _)| *c == coord).map(|(_, rec)| rec)
    }
}

impl Serialize for CellTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (coord, record) in &self.0 {
            map.serialize_entry(&coord.to_string(), record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CellTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = CellTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of \"(q,r)\" keys to cell records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CellTable, A::Error> {
                // The length comes from the file; never preallocate on its word.
                let mut cells = Vec::with_capacity(access.size_hint().unwrap_or(0).min(4096));
                while let Some((key, record)) = access.next_entry::<String, CellRecord>()? {
                    let coord = key.parse::<Axial>().map_err(de::Error::custom)?;
                    cells.push((coord, record));
                }
                Ok(CellTable(cells))
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Immutable record of one simulated day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Zero-based day index.
    pub day: u64,
    pub weather: WeatherSample,
    pub event: Option<EventKind>,
    pub terrain: CellTable,
}

impl Snapshot {
    pub fn capture(day: u64, weather: WeatherSample, event: Option<EventKind>, grid: &Grid) -> Self {
        let cells = grid.iter().map(|c| (c.coord, CellRecord::from(c))).collect();
        Self {
            day,
            weather,
            event,
            terrain: CellTable(cells),
        }
    }

    /// Rebuild a grid from the recorded cells.
    pub fn to_grid(&self) -> Grid {
        let cells = self
            .terrain
            .iter()
            .map(|(coord, rec)| Cell {
                coord: *coord,
                height: rec.height,
                terrain_type: rec.terrain_type,
                water_level: rec.water_level,
                vegetation: rec.vegetation,
                temperature: rec.temperature,
            })
            .collect();
        Grid::from_cells(cells)
    }
}

/// Append-only sequence of daily snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimulationHistory {
    snapshots: Vec<Snapshot>,
}

impl SimulationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    pub fn get(&self, day: u64) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.day == day)
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }
}

/// Build a history filename from day count and timestamp.
fn history_filename(days: usize, timestamp: u64, format: HistoryFormat) -> String {
    format!(
        "simulation_history-day{}-{}.{}",
        days,
        timestamp,
        format.extension()
    )
}

fn unix_timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn encode(history: &SimulationHistory, format: HistoryFormat) -> Result<Vec<u8>, HistoryError> {
    Ok(match format {
        HistoryFormat::Json => serde_json::to_vec_pretty(history)?,
        HistoryFormat::Bincode => bincode::serialize(history)?,
    })
}

/// Export the history into `dir` using atomic write.
///
/// Writes to a temporary file first, then renames it into place, so a
/// failed export never leaves a truncated history behind.
pub fn export_history(
    history: &SimulationHistory,
    dir: &Path,
    format: HistoryFormat,
) -> Result<PathBuf, HistoryError> {
    fs::create_dir_all(dir)?;

    let filename = history_filename(history.len(), unix_timestamp_now(), format);
    let target = dir.join(&filename);
    let tmp = dir.join(format!(".{}.tmp", filename));

    let encoded = encode(history, format)?;

    if let Err(e) = fs::write(&tmp, &encoded) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp history file");
        }
        return Err(HistoryError::Io(e));
    }

    if let Err(e) = fs::rename(&tmp, &target) {
        if let Err(cleanup) = fs::remove_file(&tmp) {
            warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp history file");
        }
        return Err(HistoryError::Io(e));
    }

    Ok(target)
}

/// Load an exported history, choosing the decoder from the extension.
///
/// Rejects files whose snapshots disagree on cell count.
pub fn load_history(path: &Path) -> Result<SimulationHistory, HistoryError> {
    let format =
        HistoryFormat::from_path(path).ok_or_else(|| HistoryError::UnknownFormat(path.to_path_buf()))?;
    let data = fs::read(path)?;
    let history: SimulationHistory = match format {
        HistoryFormat::Json => serde_json::from_slice(&data)?,
        HistoryFormat::Bincode => bincode::deserialize(&data)?,
    };

    if let Some(first) = history.snapshots.first() {
        let expected = first.terrain.len();
        if let Some(bad) = history.iter().find(|s| s.terrain.len() != expected) {
            return Err(HistoryError::Corrupt {
                path: path.to_path_buf(),
                reason: format!(
                    "day {} has {} cells, day {} has {}",
                    bad.day,
                    bad.terrain.len(),
                    first.day,
                    expected
                ),
            });
        }
    }

    Ok(history)
}
