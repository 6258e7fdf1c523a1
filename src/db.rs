// SQLite persistence for the working row set.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::import::ImportKind;
use crate::sheet::{Row, StatLine};

/// Provenance of the rows currently stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub kind: ImportKind,
    pub source: String,
    pub rows: usize,
    pub imported_at: DateTime<Utc>,
}

/// SQLite-backed persistence for session rows and key-value session state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS sheet_rows (
                position  INTEGER PRIMARY KEY,
                game      TEXT NOT NULL,
                game_date TEXT NOT NULL,
                team      TEXT NOT NULL,
                player    TEXT NOT NULL,
                jersey    INTEGER NOT NULL,
                min       REAL NOT NULL,
                pts       REAL NOT NULL,
                fgm       REAL NOT NULL,
                fga       REAL NOT NULL,
                tpm       REAL NOT NULL,
                tpa       REAL NOT NULL,
                ftm       REAL NOT NULL,
                fta       REAL NOT NULL,
                oreb      REAL NOT NULL,
                dreb      REAL NOT NULL,
                reb       REAL NOT NULL,
                ast       REAL NOT NULL,
                stl       REAL NOT NULL,
                blk       REAL NOT NULL,
                tov       REAL NOT NULL,
                pf        REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS session_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Panics if the mutex is poisoned.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    /// All stored rows in session order.
    pub fn load_rows(&self) -> Result<Vec<Row>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT game, game_date, team, player, jersey,
                        min, pts, fgm, fga, tpm, tpa, ftm, fta,
                        oreb, dreb, reb, ast, stl, blk, tov, pf
                 FROM sheet_rows ORDER BY position",
            )
            .context("failed to prepare load_rows query")?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Row {
                    game: row.get(0)?,
                    date: row.get(1)?,
                    team: row.get(2)?,
                    player: row.get(3)?,
                    no: row.get(4)?,
                    stats: StatLine {
                        min: row.get(5)?,
                        pts: row.get(6)?,
                        fgm: row.get(7)?,
                        fga: row.get(8)?,
                        tpm: row.get(9)?,
                        tpa: row.get(10)?,
                        ftm: row.get(11)?,
                        fta: row.get(12)?,
                        oreb: row.get(13)?,
                        dreb: row.get(14)?,
                        reb: row.get(15)?,
                        ast: row.get(16)?,
                        stl: row.get(17)?,
                        blk: row.get(18)?,
                        tov: row.get(19)?,
                        pf: row.get(20)?,
                    },
                })
            })
            .context("failed to query sheet rows")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map sheet rows")?;

        Ok(rows)
    }

    /// Replace every stored row in one transaction.
    pub fn replace_rows(&self, rows: &[Row]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute("DELETE FROM sheet_rows", [])
            .context("failed to clear sheet rows")?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO sheet_rows
                        (position, game, game_date, team, player, jersey,
                         min, pts, fgm, fga, tpm, tpa, ftm, fta,
                         oreb, dreb, reb, ast, stl, blk, tov, pf)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                             ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)",
                )
                .context("failed to prepare row insert")?;

            for (position, row) in rows.iter().enumerate() {
                let s = &row.stats;
                stmt.execute(params![
                    position as i64,
                    row.game,
                    row.date,
                    row.team,
                    row.player,
                    row.no,
                    s.min,
                    s.pts,
                    s.fgm,
                    s.fga,
                    s.tpm,
                    s.tpa,
                    s.ftm,
                    s.fta,
                    s.oreb,
                    s.dreb,
                    s.reb,
                    s.ast,
                    s.stl,
                    s.blk,
                    s.tov,
                    s.pf,
                ])
                .context("failed to insert sheet row")?;
            }
        }

        tx.commit().context("failed to commit replace_rows")?;
        Ok(())
    }

    /// Persist an arbitrary JSON value under `key`, overwriting any previous
    /// value.
    pub fn save_state(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        let conn = self.conn();
        let json_str =
            serde_json::to_string(value).context("failed to serialize state value")?;
        conn.execute(
            "INSERT OR REPLACE INTO session_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )
        .context("failed to save state")?;
        Ok(())
    }

    pub fn load_state(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM session_state WHERE key = ?1")
            .context("failed to prepare load_state query")?;

        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("failed to query session state")?;

        match rows.next() {
            Some(row_result) => {
                let json_str = row_result.context("failed to read state row")?;
                let value: serde_json::Value = serde_json::from_str(&json_str)
                    .context("failed to deserialize state value")?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Import provenance
    // ------------------------------------------------------------------

    const LAST_IMPORT_KEY: &'static str = "last_import";

    /// Remember where the current rows came from, stamped with the current
    /// UTC time.
    pub fn record_import(&self, kind: ImportKind, source: &str, rows: usize) -> Result<()> {
        let record = ImportRecord {
            kind,
            source: source.to_string(),
            rows,
            imported_at: Utc::now(),
        };
        let value = serde_json::to_value(&record).context("failed to serialize import record")?;
        self.save_state(Self::LAST_IMPORT_KEY, &value)
    }

    pub fn last_import(&self) -> Result<Option<ImportRecord>> {
        match self.load_state(Self::LAST_IMPORT_KEY)? {
            Some(value) => {
                let record =
                    serde_json::from_value(value).context("failed to decode import record")?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}
