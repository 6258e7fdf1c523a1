// Document layout grammars.
//
// A grammar knows how one printed box-score layout flattens into text: where
// each team's table starts, how the report date is written, and the column
// sequence of a player line. `FfbbBoxScore` is the only layout today.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::config::{PdfConfig, TeamMarkerConfig};
use crate::import::pdf::date;
use crate::import::pdf::tokens::{self, ShotPair};
use crate::sheet::{Row, StatLine};

// ---------------------------------------------------------------------------
// Parsed values
// ---------------------------------------------------------------------------

/// One player line with every column named.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerLine {
    pub jersey: u32,
    pub starter: bool,
    pub name: String,
    pub clock: String,
    pub field_goals: ShotPair,
    pub two_pointers: ShotPair,
    pub three_pointers: ShotPair,
    pub free_throws: ShotPair,
    pub oreb: u32,
    pub dreb: u32,
    pub reb: u32,
    pub ast: u32,
    pub tov: u32,
    pub stl: u32,
    pub blk: u32,
    pub pf: u32,
    pub pts: u32,
}

impl PlayerLine {
    pub fn into_row(self, game: &str, date: &str, team: &str) -> Row {
        Row {
            game: game.to_string(),
            date: date.to_string(),
            team: team.to_string(),
            no: self.jersey,
            stats: StatLine {
                min: tokens::clock_to_minutes(&self.clock),
                pts: f64::from(self.pts),
                fgm: f64::from(self.field_goals.made),
                fga: f64::from(self.field_goals.attempted),
                tpm: f64::from(self.three_pointers.made),
                tpa: f64::from(self.three_pointers.attempted),
                ftm: f64::from(self.free_throws.made),
                fta: f64::from(self.free_throws.attempted),
                oreb: f64::from(self.oreb),
                dreb: f64::from(self.dreb),
                reb: f64::from(self.reb),
                ast: f64::from(self.ast),
                stl: f64::from(self.stl),
                blk: f64::from(self.blk),
                tov: f64::from(self.tov),
                pf: f64::from(self.pf),
            },
            player: self.name,
        }
    }
}

/// The text region attributed to one team. `block` is empty when the team's
/// marker is absent from the document.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamSection<'t> {
    pub team: String,
    pub block: &'t str,
}

// ---------------------------------------------------------------------------
// Grammar trait
// ---------------------------------------------------------------------------

pub trait DocumentLayoutGrammar: Send + Sync {
    fn name(&self) -> &str;

    /// Game identifier stamped on every extracted row.
    fn game(&self) -> &str;

    fn recover_date(&self, text: &str) -> Option<String>;

    /// Split the document into per-team blocks, in team order.
    fn sections<'t>(&self, text: &'t str) -> Vec<TeamSection<'t>>;

    /// Try to read one player line starting at `tokens[0]`. Returns the line
    /// and the number of tokens consumed.
    fn parse_line(&self, tokens: &[&str]) -> Option<(PlayerLine, usize)>;

    /// Every player line in a block: a failed attempt advances one token, a
    /// match resumes right after the consumed tokens.
    fn scan_block(&self, block: &str) -> Vec<PlayerLine> {
        let toks: Vec<&str> = block.split_whitespace().collect();
        let mut lines = Vec::new();
        let mut pos = 0;
        while pos < toks.len() {
            match self.parse_line(&toks[pos..]) {
                Some((line, consumed)) => {
                    lines.push(line);
                    pos += consumed.max(1);
                }
                None => pos += 1,
            }
        }
        lines
    }

    /// Rows for every team section, tagged with team code, date and game.
    fn extract(&self, text: &str) -> Vec<Row> {
        let date = self.recover_date(text).unwrap_or_default();
        if date.is_empty() {
            debug!("{}: no report date found", self.name());
        }
        let mut rows = Vec::new();
        for section in self.sections(text) {
            let lines = self.scan_block(section.block);
            debug!(
                "{}: {} player lines for {}",
                self.name(),
                lines.len(),
                section.team
            );
            rows.extend(
                lines
                    .into_iter()
                    .map(|line| line.into_row(self.game(), &date, &section.team)),
            );
        }
        rows
    }
}

// ---------------------------------------------------------------------------
// FFBB box score
// ---------------------------------------------------------------------------

/// A team code and the header that introduces its table.
#[derive(Debug, Clone)]
pub struct TeamMarker {
    pub code: String,
    pub marker: Regex,
}

impl TeamMarker {
    /// Compile a case-insensitive marker pattern.
    pub fn new(code: &str, pattern: &str) -> Result<Self, regex::Error> {
        let marker = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(TeamMarker {
            code: code.to_string(),
            marker,
        })
    }
}

/// French federation (FFBB) box-score sheet.
///
/// Player line columns: `[*]No Name MM:SS FGM/FGA % 2PM/2PA % 3PM/3PA %
/// FTM/FTA % OREB DREB REB AST TOV STL BLK PF ± ± PTS`. The two-point pair
/// and the signed pair are read but not kept.
#[derive(Debug, Clone)]
pub struct FfbbBoxScore {
    teams: Vec<TeamMarker>,
    game: String,
}

impl FfbbBoxScore {
    pub fn new(teams: Vec<TeamMarker>, game: impl Into<String>) -> Self {
        FfbbBoxScore {
            teams,
            game: game.into(),
        }
    }

    pub fn from_config(config: &PdfConfig) -> Result<Self, regex::Error> {
        let teams = config
            .teams
            .iter()
            .map(|TeamMarkerConfig { code, marker }| TeamMarker::new(code, marker))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(teams, config.default_game.clone()))
    }

    /// The two-team layout with the built-in marker defaults.
    pub fn standard() -> Result<Self, regex::Error> {
        Self::from_config(&PdfConfig::default())
    }

    pub fn teams(&self) -> &[TeamMarker] {
        &self.teams
    }
}

/// Sequential consumer over a token slice.
struct Cursor<'a, 'b> {
    toks: &'a [&'b str],
    pos: usize,
}

impl<'a, 'b> Cursor<'a, 'b> {
    fn new(toks: &'a [&'b str]) -> Self {
        Cursor { toks, pos: 0 }
    }

    fn peek(&self) -> Option<&'b str> {
        self.toks.get(self.pos).copied()
    }

    /// Consume the next token if `read` accepts it.
    fn take<T>(&mut self, read: impl Fn(&str) -> Option<T>) -> Option<T> {
        let value = read(self.peek()?)?;
        self.pos += 1;
        Some(value)
    }

    fn expect(&mut self, accept: impl Fn(&str) -> bool) -> Option<()> {
        self.take(|t| accept(t).then_some(()))
    }

    /// A shot pair followed by its (discarded) percentage.
    fn shooting(&mut self) -> Option<ShotPair> {
        let pair = self.take(tokens::shot_pair)?;
        self.expect(tokens::is_percentage)?;
        Some(pair)
    }
}

impl DocumentLayoutGrammar for FfbbBoxScore {
    fn name(&self) -> &str {
        "ffbb"
    }

    fn game(&self) -> &str {
        &self.game
    }

    fn recover_date(&self, text: &str) -> Option<String> {
        date::recover_date(text)
    }

    fn sections<'t>(&self, text: &'t str) -> Vec<TeamSection<'t>> {
        let found: Vec<Option<(usize, usize)>> = self
            .teams
            .iter()
            .map(|t| t.marker.find(text).map(|m| (m.start(), m.end())))
            .collect();

        self.teams
            .iter()
            .zip(&found)
            .map(|(team, hit)| {
                let block = match *hit {
                    Some((_, end)) => {
                        let next = found
                            .iter()
                            .flatten()
                            .map(|&(start, _)| start)
                            .filter(|&start| start >= end)
                            .min()
                            .unwrap_or(text.len());
                        &text[end..next]
                    }
                    None => "",
                };
                TeamSection {
                    team: team.code.clone(),
                    block,
                }
            })
            .collect()
    }

    fn parse_line(&self, toks: &[&str]) -> Option<(PlayerLine, usize)> {
        let mut c = Cursor::new(toks);

        let first = c.peek()?;
        let jersey = c.take(tokens::jersey)?;
        let starter = first.starts_with('*');

        let mut words: Vec<&str> = Vec::new();
        while let Some(tok) = c.peek() {
            if tokens::is_clock(tok) || !tokens::is_name_word(tok) {
                break;
            }
            words.push(tok);
            c.pos += 1;
        }
        if words.is_empty() {
            return None;
        }
        let clock = c.take(|t| tokens::is_clock(t).then(|| t.to_string()))?;

        let field_goals = c.shooting()?;
        let two_pointers = c.shooting()?;
        let three_pointers = c.shooting()?;
        let free_throws = c.shooting()?;

        let oreb = c.take(tokens::count)?;
        let dreb = c.take(tokens::count)?;
        let reb = c.take(tokens::count)?;
        let ast = c.take(tokens::count)?;
        let tov = c.take(tokens::count)?;
        let stl = c.take(tokens::count)?;
        let blk = c.take(tokens::count)?;
        let pf = c.take(tokens::count)?;
        c.expect(tokens::is_signed)?;
        c.expect(tokens::is_signed)?;
        let pts = c.take(tokens::count)?;

        let line = PlayerLine {
            jersey,
            starter,
            name: words.join(" "),
            clock,
            field_goals,
            two_pointers,
            three_pointers,
            free_throws,
            oreb,
            dreb,
            reb,
            ast,
            tov,
            stl,
            blk,
            pf,
            pts,
        };
        Some((line, c.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DUPONT: &str =
        "*7 Dupont 28:30 6/12 50 4/7 57.1 2/5 40 2/3 66.7 2 5 7 4 2 1 0 3 -2 8 16";
    const MARTIN: &str = "11 Jean-Luc Martin 22:00 4/10 40 3/7 42.9 1/3 33.3 0/0 0 1 3 4 2 1 2 1 2 5 3 9";

    fn grammar() -> FfbbBoxScore {
        FfbbBoxScore::standard().unwrap()
    }

    fn toks(s: &str) -> Vec<&str> {
        s.split_whitespace().collect()
    }

    #[test]
    fn parses_a_full_line_with_named_columns() {
        let (line, consumed) = grammar().parse_line(&toks(DUPONT)).unwrap();
        assert_eq!(consumed, 22);
        assert_eq!(line.jersey, 7);
        assert!(line.starter);
        assert_eq!(line.name, "Dupont");
        assert_eq!(line.clock, "28:30");
        assert_eq!(line.field_goals, ShotPair { made: 6, attempted: 12 });
        assert_eq!(line.two_pointers, ShotPair { made: 4, attempted: 7 });
        assert_eq!(line.three_pointers, ShotPair { made: 2, attempted: 5 });
        assert_eq!(line.free_throws, ShotPair { made: 2, attempted: 3 });
        assert_eq!(
            (line.oreb, line.dreb, line.reb, line.ast, line.tov, line.stl, line.blk, line.pf),
            (2, 5, 7, 4, 2, 1, 0, 3)
        );
        assert_eq!(line.pts, 16);
    }

    #[test]
    fn multi_word_names_are_joined() {
        let (line, _) = grammar().parse_line(&toks(MARTIN)).unwrap();
        assert_eq!(line.name, "Jean-Luc Martin");
        assert!(!line.starter);
        assert_eq!(line.pts, 9);
    }

    #[test]
    fn line_to_row_converts_clock_and_tags() {
        let (line, _) = grammar().parse_line(&toks(DUPONT)).unwrap();
        let row = line.into_row("G1", "2025-10-04", "ROU");
        assert_eq!(row.game, "G1");
        assert_eq!(row.date, "2025-10-04");
        assert_eq!(row.team, "ROU");
        assert_eq!(row.player, "Dupont");
        assert_eq!(row.no, 7);
        assert_eq!(row.stats.min, 28.5);
        assert_eq!(row.stats.fgm, 6.0);
        assert_eq!(row.stats.tpa, 5.0);
        assert_eq!(row.stats.reb, 7.0);
        assert_eq!(row.stats.pf, 3.0);
        assert_eq!(row.stats.pts, 16.0);
    }

    #[test]
    fn truncated_line_does_not_match() {
        let cut = "*7 Dupont 28:30 6/12 50 4/7 57.1 2/5 40 2/3 66.7 2 5 7 4";
        assert!(grammar().parse_line(&toks(cut)).is_none());
    }

    #[test]
    fn missing_percentage_does_not_match() {
        let bad = "7 Dupont 28:30 6/12 4/7 57.1 2/5 40 2/3 66.7 2 5 7 4 2 1 0 3 -2 8 16";
        assert!(grammar().parse_line(&toks(bad)).is_none());
    }

    #[test]
    fn scan_skips_noise_between_lines() {
        let block = format!("No Joueur Min Tirs 2pts 3pts LF {DUPONT} Total {MARTIN} Entraîneur X");
        let lines = grammar().scan_block(&block);
        let names: Vec<&str> = lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Dupont", "Jean-Luc Martin"]);
    }

    #[test]
    fn sections_split_at_next_marker() {
        let text = format!(
            "En-tête Ail de Rousset (ROU) {DUPONT} Saint Vallier Basket Drome 1 (STV) {MARTIN}"
        );
        let g = grammar();
        let sections = g.sections(&text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].team, "ROU");
        assert_eq!(sections[0].block.trim(), DUPONT);
        assert_eq!(sections[1].team, "STV");
        assert_eq!(sections[1].block.trim(), MARTIN);
    }

    #[test]
    fn sections_in_team_order_even_when_document_order_differs() {
        let text = format!(
            "SAINT VALLIER BASKET DROME (STV) {MARTIN} ail de rousset (rou) {DUPONT}"
        );
        let g = grammar();
        let sections = g.sections(&text);
        assert_eq!(sections[0].team, "ROU");
        assert_eq!(sections[0].block.trim(), DUPONT);
        assert_eq!(sections[1].team, "STV");
        assert_eq!(sections[1].block.trim(), MARTIN);
    }

    #[test]
    fn missing_marker_gives_empty_block() {
        let text = format!("Ail de Rousset (ROU) {DUPONT}");
        let g = grammar();
        let sections = g.sections(&text);
        assert_eq!(sections[1].team, "STV");
        assert_eq!(sections[1].block, "");
    }

    #[test]
    fn extract_tags_rows_with_team_date_and_game() {
        let text = format!(
            "Rencontre du 4 oct. 2025 Ail de Rousset (ROU) {DUPONT} \
             Saint Vallier Basket Drome (STV) {MARTIN}"
        );
        let rows = grammar().extract(&text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].team, "ROU");
        assert_eq!(rows[1].team, "STV");
        for row in &rows {
            assert_eq!(row.date, "2025-10-04");
            assert_eq!(row.game, "G1");
        }
    }

    #[test]
    fn extract_without_markers_is_empty() {
        assert!(grammar().extract(DUPONT).is_empty());
    }

    #[test]
    fn custom_markers_and_game() {
        let g = FfbbBoxScore::new(
            vec![TeamMarker::new("HOME", r"Locaux").unwrap()],
            "J12",
        );
        let rows = g.extract(&format!("LOCAUX {DUPONT}"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team, "HOME");
        assert_eq!(rows[0].game, "J12");
        assert_eq!(rows[0].date, "");
    }
}
