use serde::{Deserialize, Serialize};

// === Enums ===

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainType {
    Default,
    Ocean,
    Desert,
    Plains,
    Forest,
    Mountains,
    Arctic,
}

impl TerrainType {
    pub fn all() -> &'static [TerrainType] {
        &[
            TerrainType::Default,
            TerrainType::Ocean,
            TerrainType::Desert,
            TerrainType::Plains,
            TerrainType::Forest,
            TerrainType::Mountains,
            TerrainType::Arctic,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            TerrainType::Default => "default",
            TerrainType::Ocean => "ocean",
            TerrainType::Desert => "desert",
            TerrainType::Plains => "plains",
            TerrainType::Forest => "forest",
            TerrainType::Mountains => "mountains",
            TerrainType::Arctic => "arctic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub fn next(self) -> Season {
        match self {
            Season::Spring => Season::Summer,
            Season::Summer => Season::Autumn,
            Season::Autumn => Season::Winter,
            Season::Winter => Season::Spring,
        }
    }
}

// === Coordinates ===

/// Axial hex coordinate. Ordering is lexicographic on `(q, r)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Axial {
    pub q: i32,
    pub r: i32,
}

impl Axial {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Hex distance from the origin.
    pub fn distance_from_origin(self) -> i32 {
        self.q.abs().max(self.r.abs()).max((self.q + self.r).abs())
    }

    pub fn offset(self, dq: i32, dr: i32) -> Self {
        Self::new(self.q + dq, self.r + dr)
    }
}

impl std::fmt::Display for Axial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.q, self.r)
    }
}

impl std::str::FromStr for Axial {
    type Err = String;

    /// Parses the `"(q,r)"` form produced by `Display`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .trim()
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| format!("Expected \"(q,r)\", got {:?}", s))?;
        let (q, r) = inner
            .split_once(',')
            .ok_or_else(|| format!("Missing ',' in coordinate {:?}", s))?;
        let q = q
            .trim()
            .parse::<i32>()
            .map_err(|e| format!("Bad q in {:?}: {}", s, e))?;
        let r = r
            .trim()
            .parse::<i32>()
            .map_err(|e| format!("Bad r in {:?}: {}", s, e))?;
        Ok(Axial::new(q, r))
    }
}

// === Cell ===

pub const DEFAULT_TEMPERATURE: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub coord: Axial,
    pub height: f64,
    pub terrain_type: TerrainType,
    pub water_level: f64,
    pub vegetation: f64,
    /// Degrees Celsius. Stored and exported; no update rule changes it.
    pub temperature: f64,
}

impl Cell {
    /// Create a cell with neutral values. Generation overwrites height and
    /// classification.
    pub fn new_default(coord: Axial, terrain_type: TerrainType) -> Self {
        Self {
            coord,
            height: 0.0,
            terrain_type,
            water_level: 0.0,
            vegetation: 0.0,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}
