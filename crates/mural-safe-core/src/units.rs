//! Ether amounts and human readable time offsets.

use alloy::primitives::U256;

use crate::ports::PortError;

const ETHER_DECIMALS: usize = 18;

/// Formats wei as ether: trailing zeros trimmed, always one fractional digit.
///
/// `1_000_000_000_000_000_000` renders as `1.0`, `1` renders as
/// `0.000000000000000001`.
pub fn format_ether(wei: U256) -> String {
    let digits = wei.to_string();
    let padded = if digits.len() <= ETHER_DECIMALS {
        format!("{}{}", "0".repeat(ETHER_DECIMALS + 1 - digits.len()), digits)
    } else {
        digits
    };
    let split = padded.len() - ETHER_DECIMALS;
    let (whole, fraction) = padded.split_at(split);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{whole}.0")
    } else {
        format!("{whole}.{fraction}")
    }
}

/// Parses a decimal ether amount into wei.
pub fn parse_ether(input: &str) -> Result<U256, PortError> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(PortError::Validation("amount is required".to_owned()));
    }
    if raw.starts_with('-') {
        return Err(PortError::Validation("amount must not be negative".to_owned()));
    }
    let raw = raw.strip_prefix('+').unwrap_or(raw);

    let (whole, fraction) = match raw.split_once('.') {
        Some((w, f)) => (w, f),
        None => (raw, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(PortError::Validation(format!("invalid amount: {input}")));
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) {
        return Err(PortError::Validation(format!("invalid amount: {input}")));
    }

    let fraction = fraction.trim_end_matches('0');
    if fraction.len() > ETHER_DECIMALS {
        return Err(PortError::Validation(format!(
            "amount has more than {ETHER_DECIMALS} decimals: {input}"
        )));
    }

    let whole = if whole.is_empty() { "0" } else { whole };
    let combined = format!(
        "{whole}{fraction}{}",
        "0".repeat(ETHER_DECIMALS - fraction.len())
    );
    U256::from_str_radix(&combined, 10)
        .map_err(|e| PortError::Validation(format!("amount out of range: {e}")))
}

#[derive(Clone, Copy)]
enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl Unit {
    fn seconds(self) -> f64 {
        match self {
            Unit::Second => 1.0,
            Unit::Minute => 60.0,
            Unit::Hour => 3_600.0,
            Unit::Day => 86_400.0,
            Unit::Month => 86_400.0 * 30.436_875,
            Unit::Year => 86_400.0 * 365.242_5,
        }
    }
}

/// One step of the relative-time ladder: the unit the amount is measured in
/// (if it changes at this step), the upper bound for this step, and the label.
struct Step {
    unit: Option<Unit>,
    max: Option<i64>,
    label: Label,
}

enum Label {
    FewSeconds,
    Singular(&'static str),
    Plural(&'static str),
}

const STEPS: &[Step] = &[
    Step { unit: Some(Unit::Second), max: Some(44), label: Label::FewSeconds },
    Step { unit: None, max: Some(89), label: Label::Singular("a minute") },
    Step { unit: Some(Unit::Minute), max: Some(44), label: Label::Plural("minutes") },
    Step { unit: None, max: Some(89), label: Label::Singular("an hour") },
    Step { unit: Some(Unit::Hour), max: Some(21), label: Label::Plural("hours") },
    Step { unit: None, max: Some(35), label: Label::Singular("a day") },
    Step { unit: Some(Unit::Day), max: Some(25), label: Label::Plural("days") },
    Step { unit: None, max: Some(45), label: Label::Singular("a month") },
    Step { unit: Some(Unit::Month), max: Some(10), label: Label::Plural("months") },
    Step { unit: None, max: Some(17), label: Label::Singular("a year") },
    Step { unit: Some(Unit::Year), max: None, label: Label::Plural("years") },
];

/// Describes `then` relative to `now` (both unix seconds): "a few seconds ago",
/// "3 hours ago", "in a day".
pub fn relative_time(now_secs: u64, then_secs: u64) -> String {
    let future = then_secs > now_secs;
    let delta = now_secs.abs_diff(then_secs) as f64;

    let mut amount = 0_i64;
    let mut chosen = STEPS.len() - 1;
    for (i, step) in STEPS.iter().enumerate() {
        if let Some(unit) = step.unit {
            amount = (delta / unit.seconds()).round() as i64;
        }
        if step.max.map_or(true, |max| amount <= max) {
            // A plural step holding exactly one unit reads as its singular neighbour.
            chosen = if amount <= 1 && i > 0 && matches!(step.label, Label::Plural(_)) {
                i - 1
            } else {
                i
            };
            break;
        }
    }

    let phrase = match STEPS[chosen].label {
        Label::FewSeconds => "a few seconds".to_owned(),
        Label::Singular(s) => s.to_owned(),
        Label::Plural(unit) => format!("{amount} {unit}"),
    };
    if future {
        format!("in {phrase}")
    } else {
        format!("{phrase} ago")
    }
}
