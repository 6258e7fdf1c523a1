// Report date recovery for French-language box scores.
//
// The date is printed as `<day> <month abbreviation> <year>`, e.g.
// `12 oct. 2025`. All locale knowledge lives in `FRENCH_MONTHS`.

/// French month abbreviations as printed on FFBB sheets, with month numbers.
/// Matching is case-insensitive and tolerates a missing or extra final `.`.
pub const FRENCH_MONTHS: [(&str, u32); 12] = [
    ("janv.", 1),
    ("févr.", 2),
    ("mars", 3),
    ("avr.", 4),
    ("mai", 5),
    ("juin", 6),
    ("juil.", 7),
    ("août", 8),
    ("sept.", 9),
    ("oct.", 10),
    ("nov.", 11),
    ("déc.", 12),
];

/// Month number for a French abbreviation token.
pub fn month_number(token: &str) -> Option<u32> {
    let wanted = token.to_lowercase();
    let wanted = wanted.trim_end_matches('.');
    FRENCH_MONTHS
        .iter()
        .find(|(name, _)| name.trim_end_matches('.') == wanted)
        .map(|&(_, number)| number)
}

/// Trailing run of at most two digits: the day in `…12 oct.`.
fn trailing_day(token: &str) -> Option<u32> {
    let digits = token
        .bytes()
        .rev()
        .take_while(u8::is_ascii_digit)
        .count()
        .min(2);
    if digits == 0 {
        return None;
    }
    token[token.len() - digits..].parse().ok()
}

/// Leading four-digit year: `2025` in `2025`, `2025.` or `2025-`.
fn leading_year(token: &str) -> Option<u32> {
    let head = token.get(..4)?;
    if head.bytes().all(|b| b.is_ascii_digit()) {
        head.parse().ok()
    } else {
        None
    }
}

/// Find the first `<day> <month> <year>` triple in whitespace-collapsed text
/// and return it as ISO `YYYY-MM-DD`.
pub fn recover_date(text: &str) -> Option<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.windows(3).find_map(|w| {
        let day = trailing_day(w[0])?;
        let month = month_number(w[1])?;
        let year = leading_year(w[2])?;
        Some(format!("{year:04}-{month:02}-{day:02}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_month_maps() {
        let expected = [
            ("janv.", 1),
            ("FÉVR.", 2),
            ("Mars", 3),
            ("avr.", 4),
            ("mai", 5),
            ("juin", 6),
            ("juil.", 7),
            ("août", 8),
            ("sept.", 9),
            ("oct.", 10),
            ("nov.", 11),
            ("déc.", 12),
        ];
        for (token, number) in expected {
            assert_eq!(month_number(token), Some(number), "{token}");
        }
    }

    #[test]
    fn optional_trailing_period() {
        assert_eq!(month_number("sept"), Some(9));
        assert_eq!(month_number("mars."), Some(3));
        assert_eq!(month_number("september"), None);
        assert_eq!(month_number("oct"), Some(10));
    }

    #[test]
    fn recovers_and_pads() {
        let text = "Match du samedi 4 oct. 2025 Salle Omnisport";
        assert_eq!(recover_date(text).as_deref(), Some("2025-10-04"));
    }

    #[test]
    fn first_match_wins() {
        let text = "17 mai 2025 puis 18 juin 2025";
        assert_eq!(recover_date(text).as_deref(), Some("2025-05-17"));
    }

    #[test]
    fn year_with_trailing_punctuation() {
        let text = "le 21 déc. 2024. fin";
        assert_eq!(recover_date(text).as_deref(), Some("2024-12-21"));
    }

    #[test]
    fn day_uses_last_two_digits() {
        assert_eq!(recover_date("123 mars 2025").as_deref(), Some("2025-03-23"));
    }

    #[test]
    fn no_date_found() {
        assert_eq!(recover_date(""), None);
        assert_eq!(recover_date("4 October 2025"), None);
        assert_eq!(recover_date("oct. 2025"), None);
        assert_eq!(recover_date("4 oct. 25"), None);
    }
}
