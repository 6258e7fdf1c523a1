// Per-player and per-team aggregation.
//
// Rates are computed once per group from summed totals (summed makes over
// summed attempts), never by averaging per-game percentages.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::sheet::{Row, StatLine};
use crate::stats::numeric::{
    effective_field_goal_pct, format_percentage, format_rate, true_shooting_pct,
};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Per-game averages of the 14 counting stats shown in aggregate views.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PerGame {
    #[serde(rename = "MIN")]
    pub min: f64,
    #[serde(rename = "PTS")]
    pub pts: f64,
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
}

impl PerGame {
    fn from_totals(totals: &StatLine, games: usize) -> Self {
        let g = games as f64;
        PerGame {
            min: totals.min / g,
            pts: totals.pts / g,
            reb: totals.reb / g,
            ast: totals.ast / g,
            stl: totals.stl / g,
            blk: totals.blk / g,
            tov: totals.tov / g,
            pf: totals.pf / g,
            fgm: totals.fgm / g,
            fga: totals.fga / g,
            tpm: totals.tpm / g,
            tpa: totals.tpa / g,
            ftm: totals.ftm / g,
            fta: totals.fta / g,
        }
    }

    /// Label/value pairs in display order.
    pub fn entries(&self) -> [(&'static str, f64); 14] {
        [
            ("MIN", self.min),
            ("PTS", self.pts),
            ("REB", self.reb),
            ("AST", self.ast),
            ("STL", self.stl),
            ("BLK", self.blk),
            ("TOV", self.tov),
            ("PF", self.pf),
            ("FGM", self.fgm),
            ("FGA", self.fga),
            ("3PM", self.tpm),
            ("3PA", self.tpa),
            ("FTM", self.ftm),
            ("FTA", self.fta),
        ]
    }
}

/// Formatted shooting rates. FG/3P/FT show `-` without attempts; eFG and TS
/// always show a number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rates {
    #[serde(rename = "FG")]
    pub fg: String,
    #[serde(rename = "3P")]
    pub three: String,
    #[serde(rename = "FT")]
    pub ft: String,
    #[serde(rename = "eFG")]
    pub efg: String,
    #[serde(rename = "TS")]
    pub ts: String,
}

impl Rates {
    fn from_totals(t: &StatLine) -> Self {
        Rates {
            fg: format_percentage(t.fgm, t.fga),
            three: format_percentage(t.tpm, t.tpa),
            ft: format_percentage(t.ftm, t.fta),
            efg: format_rate(effective_field_goal_pct(t.fgm, t.fga, t.tpm)),
            ts: format_rate(true_shooting_pct(t.pts, t.fga, t.fta)),
        }
    }

    pub fn entries(&self) -> [(&'static str, &str); 5] {
        [
            ("FG%", self.fg.as_str()),
            ("3P%", self.three.as_str()),
            ("FT%", self.ft.as_str()),
            ("eFG%", self.efg.as_str()),
            ("TS%", self.ts.as_str()),
        ]
    }
}

/// Aggregate over one group of rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// Distinct game identifiers in the group, never less than 1.
    pub games: usize,
    pub rows: usize,
    pub per_game: PerGame,
    pub rates: Rates,
}

/// Aggregate for one `(team, player)` identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerAggregate {
    /// `"{team} • {player}"`, the grouping and sort key.
    pub key: String,
    pub team: String,
    pub player: String,
    #[serde(flatten)]
    pub summary: GroupSummary,
}

/// Aggregate over the whole row collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamAggregate {
    #[serde(flatten)]
    pub summary: GroupSummary,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Summarize a group of rows: distinct games, per-game averages, rates.
pub fn summarize<'a, I>(rows: I) -> GroupSummary
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut totals = StatLine::default();
    let mut games: HashSet<&str> = HashSet::new();
    let mut count = 0;
    for row in rows {
        totals.accumulate(&row.stats);
        games.insert(row.game.as_str());
        count += 1;
    }
    let games = games.len().max(1);
    GroupSummary {
        games,
        rows: count,
        per_game: PerGame::from_totals(&totals, games),
        rates: Rates::from_totals(&totals),
    }
}

/// Partition rows by `(team, player)` identity. Keys iterate in ascending
/// lexicographic order; every row lands in exactly one group.
pub fn group_by_player(rows: &[Row]) -> BTreeMap<String, Vec<&Row>> {
    let mut groups: BTreeMap<String, Vec<&Row>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.identity_key()).or_default().push(row);
    }
    groups
}

/// Per-player aggregates sorted by identity key.
pub fn player_aggregates(rows: &[Row]) -> Vec<PlayerAggregate> {
    group_by_player(rows)
        .into_iter()
        .map(|(key, group)| {
            // Every group has at least one row.
            let first = group[0];
            PlayerAggregate {
                team: first.team.clone(),
                player: first.player.clone(),
                summary: summarize(group.iter().copied()),
                key,
            }
        })
        .collect()
}

/// Whole-collection aggregate without player grouping.
pub fn team_aggregate(rows: &[Row]) -> TeamAggregate {
    TeamAggregate {
        summary: summarize(rows),
    }
}
