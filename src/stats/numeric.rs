// Numeric coercion and shooting-efficiency formulas.

/// Floor applied to field-goal attempts in the eFG% denominator.
const ATTEMPT_EPSILON: f64 = 1e-9;

/// Free-throw weight in the true-shooting possession estimate.
const TS_FTA_WEIGHT: f64 = 0.44;

/// Placeholder shown for a rate with no attempts.
pub const NO_ATTEMPTS: &str = "-";

/// Coerce loosely-typed cell text into a number.
///
/// The first decimal comma is treated as a decimal point, leading whitespace
/// is skipped and the longest numeric prefix is parsed (`"12,5"` -> 12.5,
/// `"7 pts"` -> 7). Anything without a numeric prefix, or a prefix that does
/// not produce a finite value, yields 0.
pub fn to_number(input: &str) -> f64 {
    let text = input.replacen(',', ".", 1);
    let text = text.trim_start();
    let prefix = &text[..numeric_prefix_len(text)];
    match prefix.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Length in bytes of the leading `[+-]digits[.digits][e[+-]digits]` run.
/// Returns 0 when no digit is present in the mantissa.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut mantissa_digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if mantissa_digits > 0 || j > frac_start {
            mantissa_digits += j - frac_start;
            i = j;
        }
    }
    if mantissa_digits == 0 {
        return 0;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

/// `made / attempted` as a percentage with one decimal, or `"-"` when there
/// were no attempts. A rate without attempts is undefined, not 0%.
pub fn format_percentage(made: f64, attempted: f64) -> String {
    if attempted <= 0.0 {
        return NO_ATTEMPTS.to_string();
    }
    format_rate(made / attempted * 100.0)
}

/// Format an already-scaled percentage with one decimal and a `%` suffix.
pub fn format_rate(value: f64) -> String {
    format!("{value:.1}%")
}

/// Effective field-goal percentage: three-pointers count 1.5x.
///
/// The attempt count is floored at a tiny epsilon instead of being
/// zero-checked, so zero makes on zero attempts gives 0.
pub fn effective_field_goal_pct(made: f64, attempted: f64, threes_made: f64) -> f64 {
    let attempted = attempted.max(ATTEMPT_EPSILON);
    (made + 0.5 * threes_made) / attempted * 100.0
}

/// True-shooting percentage: `PTS / (2 * (FGA + 0.44 * FTA))`.
///
/// Returns 0 when the denominator is not positive. Unlike
/// [`format_percentage`] there is no "no data" placeholder here.
pub fn true_shooting_pct(points: f64, attempted: f64, free_throw_attempts: f64) -> f64 {
    let denominator = 2.0 * (attempted + TS_FTA_WEIGHT * free_throw_attempts);
    if denominator <= 0.0 {
        return 0.0;
    }
    points / denominator * 100.0
}
