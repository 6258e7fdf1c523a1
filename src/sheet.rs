// Canonical box-score row model and column schema.
//
// A `Row` is one player's statistical line for one game. The 21 columns and
// their order are fixed; every import path produces exactly this shape.

use serde::{Deserialize, Serialize};

use crate::stats::numeric::to_number;

/// Game identifier used when a source does not name the game.
pub const DEFAULT_GAME: &str = "G1";

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// The 16 numeric counting stats of a row, in canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    Min,
    Pts,
    Fgm,
    Fga,
    Tpm,
    Tpa,
    Ftm,
    Fta,
    Oreb,
    Dreb,
    Reb,
    Ast,
    Stl,
    Blk,
    Tov,
    Pf,
}

impl Stat {
    pub const ALL: [Stat; 16] = [
        Stat::Min,
        Stat::Pts,
        Stat::Fgm,
        Stat::Fga,
        Stat::Tpm,
        Stat::Tpa,
        Stat::Ftm,
        Stat::Fta,
        Stat::Oreb,
        Stat::Dreb,
        Stat::Reb,
        Stat::Ast,
        Stat::Stl,
        Stat::Blk,
        Stat::Tov,
        Stat::Pf,
    ];

    /// Header text of the stat's column.
    pub fn name(self) -> &'static str {
        match self {
            Stat::Min => "MIN",
            Stat::Pts => "PTS",
            Stat::Fgm => "FGM",
            Stat::Fga => "FGA",
            Stat::Tpm => "3PM",
            Stat::Tpa => "3PA",
            Stat::Ftm => "FTM",
            Stat::Fta => "FTA",
            Stat::Oreb => "OREB",
            Stat::Dreb => "DREB",
            Stat::Reb => "REB",
            Stat::Ast => "AST",
            Stat::Stl => "STL",
            Stat::Blk => "BLK",
            Stat::Tov => "TOV",
            Stat::Pf => "PF",
        }
    }
}

/// Numeric part of a row. Minutes are fractional; the rest are counts but
/// stay `f64` because CSV input may carry any numeric text.
///
/// `reb` is stored as supplied and never recomputed from `oreb + dreb`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatLine {
    #[serde(rename = "MIN")]
    pub min: f64,
    #[serde(rename = "PTS")]
    pub pts: f64,
    #[serde(rename = "FGM")]
    pub fgm: f64,
    #[serde(rename = "FGA")]
    pub fga: f64,
    #[serde(rename = "3PM")]
    pub tpm: f64,
    #[serde(rename = "3PA")]
    pub tpa: f64,
    #[serde(rename = "FTM")]
    pub ftm: f64,
    #[serde(rename = "FTA")]
    pub fta: f64,
    #[serde(rename = "OREB")]
    pub oreb: f64,
    #[serde(rename = "DREB")]
    pub dreb: f64,
    #[serde(rename = "REB")]
    pub reb: f64,
    #[serde(rename = "AST")]
    pub ast: f64,
    #[serde(rename = "STL")]
    pub stl: f64,
    #[serde(rename = "BLK")]
    pub blk: f64,
    #[serde(rename = "TOV")]
    pub tov: f64,
    #[serde(rename = "PF")]
    pub pf: f64,
}

impl StatLine {
    pub fn get(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Min => self.min,
            Stat::Pts => self.pts,
            Stat::Fgm => self.fgm,
            Stat::Fga => self.fga,
            Stat::Tpm => self.tpm,
            Stat::Tpa => self.tpa,
            Stat::Ftm => self.ftm,
            Stat::Fta => self.fta,
            Stat::Oreb => self.oreb,
            Stat::Dreb => self.dreb,
            Stat::Reb => self.reb,
            Stat::Ast => self.ast,
            Stat::Stl => self.stl,
            Stat::Blk => self.blk,
            Stat::Tov => self.tov,
            Stat::Pf => self.pf,
        }
    }

    pub fn set(&mut self, stat: Stat, value: f64) {
        let slot = match stat {
            Stat::Min => &mut self.min,
            Stat::Pts => &mut self.pts,
            Stat::Fgm => &mut self.fgm,
            Stat::Fga => &mut self.fga,
            Stat::Tpm => &mut self.tpm,
            Stat::Tpa => &mut self.tpa,
            Stat::Ftm => &mut self.ftm,
            Stat::Fta => &mut self.fta,
            Stat::Oreb => &mut self.oreb,
            Stat::Dreb => &mut self.dreb,
            Stat::Reb => &mut self.reb,
            Stat::Ast => &mut self.ast,
            Stat::Stl => &mut self.stl,
            Stat::Blk => &mut self.blk,
            Stat::Tov => &mut self.tov,
            Stat::Pf => &mut self.pf,
        };
        *slot = value;
    }

    /// Add every stat of `other` into `self`.
    pub fn accumulate(&mut self, other: &StatLine) {
        for stat in Stat::ALL {
            self.set(stat, self.get(stat) + other.get(stat));
        }
    }
}

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// One of the 21 canonical columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Game,
    Date,
    Team,
    Player,
    No,
    Stat(Stat),
}

impl Column {
    /// Canonical column order, shared by CSV headers, templates and exports.
    pub const ALL: [Column; 21] = [
        Column::Game,
        Column::Date,
        Column::Team,
        Column::Player,
        Column::No,
        Column::Stat(Stat::Min),
        Column::Stat(Stat::Pts),
        Column::Stat(Stat::Fgm),
        Column::Stat(Stat::Fga),
        Column::Stat(Stat::Tpm),
        Column::Stat(Stat::Tpa),
        Column::Stat(Stat::Ftm),
        Column::Stat(Stat::Fta),
        Column::Stat(Stat::Oreb),
        Column::Stat(Stat::Dreb),
        Column::Stat(Stat::Reb),
        Column::Stat(Stat::Ast),
        Column::Stat(Stat::Stl),
        Column::Stat(Stat::Blk),
        Column::Stat(Stat::Tov),
        Column::Stat(Stat::Pf),
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::Game => "Game",
            Column::Date => "Date",
            Column::Team => "Team",
            Column::Player => "Player",
            Column::No => "No",
            Column::Stat(stat) => stat.name(),
        }
    }

    /// Identity columns hold text; every other column is numeric.
    pub fn is_identity(self) -> bool {
        matches!(
            self,
            Column::Game | Column::Date | Column::Team | Column::Player
        )
    }

    /// Case-insensitive, whitespace-tolerant exact lookup by header name.
    /// There is no synonym table: `"pts"` and `" PTS "` match, `"points"`
    /// does not.
    pub fn lookup(name: &str) -> Option<Column> {
        let wanted = name.trim().to_lowercase();
        Column::ALL
            .into_iter()
            .find(|column| column.name().to_lowercase() == wanted)
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One player's statistical line for one game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "Game")]
    pub game: String,
    /// ISO `YYYY-MM-DD`, empty when unknown.
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "No")]
    pub no: u32,
    #[serde(flatten)]
    pub stats: StatLine,
}

impl Row {
    /// An empty row for manual entry: identity text blank, all stats zero.
    pub fn blank(game: &str, date: &str) -> Self {
        Row {
            game: game.to_string(),
            date: date.to_string(),
            ..Row::default()
        }
    }

    /// Aggregation identity: team and player name, never the jersey.
    pub fn identity_key(&self) -> String {
        format!("{} • {}", self.team, self.player)
    }

    /// Text of one cell as written to CSV exports.
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Game => self.game.clone(),
            Column::Date => self.date.clone(),
            Column::Team => self.team.clone(),
            Column::Player => self.player.clone(),
            Column::No => self.no.to_string(),
            Column::Stat(stat) => self.stats.get(stat).to_string(),
        }
    }

    /// All 21 cells in canonical order.
    pub fn cells(&self) -> Vec<String> {
        Column::ALL.iter().map(|&c| self.cell(c)).collect()
    }

    /// Store raw text into a cell. Identity columns keep the text verbatim;
    /// numeric columns are coerced, with garbage becoming 0.
    pub fn set_cell(&mut self, column: Column, raw: &str) {
        match column {
            Column::Game => self.game = raw.to_string(),
            Column::Date => self.date = raw.to_string(),
            Column::Team => self.team = raw.to_string(),
            Column::Player => self.player = raw.to_string(),
            Column::No => self.no = jersey_number(to_number(raw)),
            Column::Stat(stat) => self.stats.set(stat, to_number(raw)),
        }
    }
}

/// Jersey numbers are non-negative integers; fractions truncate.
pub fn jersey_number(value: f64) -> u32 {
    value.max(0.0) as u32
}
