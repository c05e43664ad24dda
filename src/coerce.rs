//! Type-directed value coercion.
//!
//! A single conversion path serves every producer: string-valued
//! command-line and environment adapters, loosely-typed document values
//! (where a TOML array arrives as a list of mixed scalars needing
//! per-element narrowing), and programmatic callers passing already-typed
//! values. None of the adapters need to know the destination's exact kind.

use std::time::Duration;

use crate::error::CoerceError;
use crate::value::{Kind, Value};

/// Converts `raw` into a value of kind `target`.
///
/// Rules, applied in order:
///
/// 1. A value that already has the target kind is returned unchanged.
/// 2. A list coerces element-wise into a list of the target's element kind;
///    any failing element fails the whole conversion.
/// 3. A scalar aimed at a list kind, when `existing` holds the previous
///    list, coerces to the element kind and is appended to a copy of the
///    previous list. Repeated single-value sources (a flag given several
///    times, a config key repeated across drop-in files) accumulate one
///    element per call instead of replacing the list.
/// 4. A string parses according to the target kind: integers accept the
///    standard base prefixes (`0x`, `0o`, `0b`, leading `0` for octal);
///    booleans treat the empty string and anything starting with a
///    `0`/`n`/`f` token (`0`, `no`, `false`, ...) as false and every other
///    non-empty string as true; durations use compound unit syntax
///    (`5s`, `2h30m`, `1.5h`).
/// 5. Otherwise there is no coercion path and an error is returned.
///
/// The caller's `existing` value is never mutated; the append case returns
/// a new list.
pub fn coerce(raw: Value, target: &Kind, existing: Option<&Value>) -> Result<Value, CoerceError> {
    if raw.matches(target) {
        return Ok(raw);
    }

    let no_path = |raw: &Value| CoerceError::NoPath {
        from: raw.shape(),
        to: target.clone(),
    };

    match (raw, target) {
        (Value::List(items), Kind::List(elem)) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                let coerced = coerce(item, elem, None).map_err(|source| CoerceError::Element {
                    index,
                    source: Box::new(source),
                })?;
                out.push(coerced);
            }
            Ok(Value::List(out))
        }
        (raw, Kind::List(elem)) if matches!(existing, Some(Value::List(_))) => {
            let Some(Value::List(prev)) = existing else {
                unreachable!()
            };
            let coerced = coerce(raw, elem, None)?;
            let mut items = prev.clone();
            items.push(coerced);
            Ok(Value::List(items))
        }
        (Value::String(text), kind) => parse_text(&text, kind),
        (raw, _) => Err(no_path(&raw)),
    }
}

fn parse_text(text: &str, kind: &Kind) -> Result<Value, CoerceError> {
    match kind {
        Kind::Int => parse_int(text).map(Value::Int),
        Kind::Bool => Ok(Value::Bool(!text.is_empty() && !looks_false(text))),
        Kind::Duration => parse_duration(text).map(Value::Duration),
        Kind::String => Ok(Value::String(text.to_string())),
        Kind::List(_) => Err(CoerceError::NoPath {
            from: "string",
            to: kind.clone(),
        }),
    }
}

/// The "looks false" check: a leading `0`, `n`, or `f` token (`0`, `00`,
/// `n`, `no`, `f`, `false`, case-insensitive, trailing characters allowed)
/// denotes false.
fn looks_false(text: &str) -> bool {
    matches!(
        text.as_bytes().first(),
        Some(b'0' | b'n' | b'N' | b'f' | b'F')
    )
}

/// Parses a signed integer literal, accepting the standard base prefixes:
/// `0x`/`0X` hex, `0o`/`0O` octal, `0b`/`0B` binary, and a bare leading
/// zero for octal.
fn parse_int(text: &str) -> Result<i64, CoerceError> {
    let err = || CoerceError::Int {
        text: text.to_string(),
    };

    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(rest) = strip_prefix_ci(body, "0x") {
        (16, rest)
    } else if let Some(rest) = strip_prefix_ci(body, "0o") {
        (8, rest)
    } else if let Some(rest) = strip_prefix_ci(body, "0b") {
        (2, rest)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    let magnitude = i128::from_str_radix(digits, radix).map_err(|_| err())?;
    if magnitude < 0 {
        // Sign inside the digits (e.g. "0x-1") is not a valid literal.
        return Err(err());
    }
    let signed = if negative { -magnitude } else { magnitude };
    i64::try_from(signed).map_err(|_| err())
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

/// Parses a compound human-readable duration such as `"300ms"`, `"5s"`,
/// `"2h30m"` or `"1.5h"`. Units: `ns`, `us`, `ms`, `s`, `m`, `h`.
fn parse_duration(text: &str) -> Result<Duration, CoerceError> {
    let err = |reason: &'static str| CoerceError::Duration {
        text: text.to_string(),
        reason,
    };

    if text.is_empty() {
        return Err(err("empty string"));
    }
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total: u128 = 0;
    let mut chars = text.chars().peekable();

    while chars.peek().is_some() {
        // Integer part.
        let mut int_part: u128 = 0;
        let mut saw_int = false;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            saw_int = true;
            int_part = int_part
                .checked_mul(10)
                .and_then(|v| v.checked_add(u128::from(d)))
                .ok_or_else(|| err("value out of range"))?;
            chars.next();
        }

        // Optional fraction.
        let mut frac_digits = Vec::new();
        if chars.peek() == Some(&'.') {
            chars.next();
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                frac_digits.push(d);
                chars.next();
            }
        }

        if !saw_int && frac_digits.is_empty() {
            return Err(err("expected a number"));
        }

        // Unit.
        let mut unit = String::new();
        while let Some(c) = chars.peek().copied() {
            if c.is_alphabetic() {
                unit.push(c);
                chars.next();
            } else {
                break;
            }
        }
        let unit_nanos: u128 = match unit.as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            "" => return Err(err("missing unit")),
            _ => return Err(err("unknown unit")),
        };

        total = int_part
            .checked_mul(unit_nanos)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| err("value out of range"))?;

        // Fractional digits scale down from the unit; truncation below a
        // nanosecond is accepted.
        let mut scale = unit_nanos;
        for d in frac_digits {
            scale /= 10;
            total = total
                .checked_add(u128::from(d) * scale)
                .ok_or_else(|| err("value out of range"))?;
        }
    }

    let secs = total / 1_000_000_000;
    let secs = u64::try_from(secs).map_err(|_| err("value out of range"))?;
    Ok(Duration::new(secs, (total % 1_000_000_000) as u32))
}
