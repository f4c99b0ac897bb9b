//! Duration flag parsing.
//!
//! Accepts Go-style duration strings (`500ms`, `90s`, `30m`, `720h`, `1h30m`).

use std::time::Duration;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Parses a duration flag. A bare integer is read as seconds.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if let Ok(secs) = input.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    parse_units(input)
}

/// Parses the expiration threshold. A bare integer is read as days, as the
/// older `--threshold N` flag did.
pub fn parse_threshold(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if let Ok(days) = input.parse::<u64>() {
        return days
            .checked_mul(SECONDS_PER_DAY)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("threshold too large: {input}"));
    }
    parse_units(input)
}

fn parse_units(input: &str) -> Result<Duration, String> {
    if input.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total_nanos: u128 = 0;
    let mut rest = input;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(|| format!("missing unit in duration {input:?}"))?;
        if number_len == 0 {
            return Err(format!("invalid duration {input:?}"));
        }
        let (whole, fraction) = match rest[..number_len].split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (&rest[..number_len], ""),
        };
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_nanos: u128 = match &rest[..unit_len] {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60 * 1_000_000_000,
            "h" => 3_600 * 1_000_000_000,
            "d" => SECONDS_PER_DAY as u128 * 1_000_000_000,
            unit => return Err(format!("unknown unit {unit:?} in duration {input:?}")),
        };
        rest = &rest[unit_len..];

        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| format!("invalid number in duration {input:?}"))?
        };
        let mut nanos = whole
            .checked_mul(unit_nanos)
            .ok_or_else(|| format!("duration {input:?} out of range"))?;
        if !fraction.is_empty() {
            if fraction.len() > 18 || fraction.contains('.') {
                return Err(format!("invalid number in duration {input:?}"));
            }
            let digits: u128 = fraction
                .parse()
                .map_err(|_| format!("invalid number in duration {input:?}"))?;
            nanos += digits * unit_nanos / 10u128.pow(fraction.len() as u32);
        }
        total_nanos = total_nanos
            .checked_add(nanos)
            .ok_or_else(|| format!("duration {input:?} out of range"))?;
    }

    let secs = u64::try_from(total_nanos / 1_000_000_000)
        .map_err(|_| format!("duration {input:?} out of range"))?;
    Ok(Duration::new(secs, (total_nanos % 1_000_000_000) as u32))
}
