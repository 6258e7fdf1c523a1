// Token classifiers for box-score text.
//
// The extracted PDF text is a flat stream of whitespace-separated tokens.
// Each function here recognizes one kind of column value; the layout grammar
// strings them together.

use std::sync::LazyLock;

use regex::Regex;

/// Made/attempted pair such as `6/12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShotPair {
    pub made: u32,
    pub attempted: u32,
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Integer coercion that never fails: the leading digit run, saturating at
/// `u32::MAX`, or 0 when there is none.
pub fn safe_int(s: &str) -> u32 {
    s.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u32, |acc, b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        })
}

/// Jersey number: one or two digits, optionally prefixed by the `*` starter
/// marker.
pub fn jersey(tok: &str) -> Option<u32> {
    let digits = tok.strip_prefix('*').unwrap_or(tok);
    (all_digits(digits) && digits.len() <= 2).then(|| safe_int(digits))
}

/// Player-name word: letters (accented included) and `' ’ . -`.
pub fn is_name_word(tok: &str) -> bool {
    !tok.is_empty()
        && tok
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, '\'' | '’' | '.' | '-'))
}

/// Playing time in the `MM:SS` column format.
pub fn is_clock(tok: &str) -> bool {
    match tok.split_once(':') {
        Some((m, s)) => m.len() == 2 && s.len() == 2 && all_digits(m) && all_digits(s),
        None => false,
    }
}

/// `made/attempted`.
pub fn shot_pair(tok: &str) -> Option<ShotPair> {
    let (made, attempted) = tok.split_once('/')?;
    (all_digits(made) && all_digits(attempted)).then(|| ShotPair {
        made: safe_int(made),
        attempted: safe_int(attempted),
    })
}

/// Shooting percentage printed after each shot pair: up to three digits with
/// an optional one-digit decimal (`50`, `33.3`, `100`, `66,7`).
pub fn is_percentage(tok: &str) -> bool {
    let (int, frac) = match tok.find(&['.', ','][..]) {
        Some(idx) => (&tok[..idx], Some(&tok[idx + 1..])),
        None => (tok, None),
    };
    let int_ok = all_digits(int) && int.len() <= 3;
    let frac_ok = match frac {
        None => true,
        Some(f) => f.is_empty() || (f.len() == 1 && all_digits(f)),
    };
    int_ok && frac_ok
}

/// Bare non-negative count.
pub fn count(tok: &str) -> Option<u32> {
    all_digits(tok).then(|| safe_int(tok))
}

/// Signed value such as a plus/minus (`-4`, `−4`, `+2`, `7`).
pub fn is_signed(tok: &str) -> bool {
    let digits = tok
        .strip_prefix(&['-', '−', '+'][..])
        .unwrap_or(tok);
    all_digits(digits)
}

/// Convert the first `M:SS`/`MM:SS` occurrence in `s` to fractional
/// minutes. Returns 0 when no clock is present.
pub fn clock_to_minutes(s: &str) -> f64 {
    static CLOCK: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"([0-9]{1,2}):([0-9]{2})").expect("clock pattern is valid")
    });
    match CLOCK.captures(s) {
        Some(caps) => {
            let minutes = safe_int(&caps[1]);
            let seconds = safe_int(&caps[2]);
            f64::from(minutes) + f64::from(seconds) / 60.0
        }
        None => 0.0,
    }
}
