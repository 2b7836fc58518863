use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::QuantityError;

/// Quantities are normalised to nano-units (10^-9), the finest decimal suffix.
const NANO_EXPONENT: i64 = 9;
const NANOS_PER_UNIT: i128 = 1_000_000_000;

/// A resource quantity such as `2Gi`, `500m`, `1.5` or `1e3`.
///
/// Equality and ordering compare the normalised magnitude, so `1Gi == 1024Mi`
/// and `1500m == 1.5`. `Display` prints the text the quantity was parsed from.
#[derive(Debug, Clone)]
pub struct Quantity {
    nanos: i128,
    text: String,
}

impl Quantity {
    /// Build a quantity from a nano-unit count, rendered in the coarsest
    /// exact decimal suffix.
    pub fn from_nanos(nanos: i128) -> Self {
        let text = if nanos % NANOS_PER_UNIT == 0 {
            format!("{}", nanos / NANOS_PER_UNIT)
        } else if nanos % 1_000_000 == 0 {
            format!("{}m", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            format!("{}u", nanos / 1_000)
        } else {
            format!("{}n", nanos)
        };
        Self { nanos, text }
    }

    /// Magnitude in nano-units.
    pub fn nanos(&self) -> i128 {
        self.nanos
    }

    pub fn checked_add(&self, other: &Quantity) -> Option<Quantity> {
        self.nanos.checked_add(other.nanos).map(Quantity::from_nanos)
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(QuantityError::Empty);
        }

        let (negative, unsigned) = match s.as_bytes()[0] {
            b'-' => (true, &s[1..]),
            b'+' => (false, &s[1..]),
            _ => (false, s),
        };

        let int_len = unsigned.bytes().take_while(|b| b.is_ascii_digit()).count();
        let (int_part, rest) = unsigned.split_at(int_len);
        let (frac_part, suffix) = match rest.strip_prefix('.') {
            Some(tail) => tail.split_at(tail.bytes().take_while(|b| b.is_ascii_digit()).count()),
            None => ("", rest),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(QuantityError::InvalidNumber(s.to_string()));
        }

        let (exp10, pow2) = parse_suffix(suffix).ok_or_else(|| QuantityError::UnknownSuffix {
            input: s.to_string(),
            suffix: suffix.to_string(),
        })?;

        let magnitude = to_nanos(int_part, frac_part, exp10, pow2)
            .ok_or_else(|| QuantityError::OutOfRange(s.to_string()))?;

        Ok(Self {
            nanos: if negative { -magnitude } else { magnitude },
            text: s.to_string(),
        })
    }
}

/// Map a suffix to `(decimal exponent, binary exponent)`.
fn parse_suffix(suffix: &str) -> Option<(i64, u32)> {
    let decimal = match suffix {
        "" => Some(0),
        "n" => Some(-9),
        "u" => Some(-6),
        "m" => Some(-3),
        "k" => Some(3),
        "M" => Some(6),
        "G" => Some(9),
        "T" => Some(12),
        "P" => Some(15),
        "E" => Some(18),
        _ => None,
    };
    if let Some(exp) = decimal {
        return Some((exp, 0));
    }

    let binary = match suffix {
        "Ki" => Some(10),
        "Mi" => Some(20),
        "Gi" => Some(30),
        "Ti" => Some(40),
        "Pi" => Some(50),
        "Ei" => Some(60),
        _ => None,
    };
    if let Some(pow2) = binary {
        return Some((0, pow2));
    }

    // Decimal exponent: e3, E-2, e+6.
    let exp = suffix.strip_prefix(['e', 'E'])?;
    let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    exp.parse::<i64>().ok().map(|e| (e, 0))
}

/// Exact nano-unit magnitude of `<int>.<frac> * 10^exp10 * 2^pow2`,
/// rounding sub-nano remainders up. `None` when it does not fit an `i128`.
fn to_nanos(int_part: &str, frac_part: &str, exp10: i64, pow2: u32) -> Option<i128> {
    let frac = frac_part.trim_end_matches('0');
    let digits = format!("{int_part}{frac}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }

    let mantissa: i128 = digits.parse().ok()?;
    let mantissa = mantissa.checked_mul(1i128 << pow2)?;

    let exponent = exp10
        .checked_sub(i64::try_from(frac.len()).ok()?)?
        .checked_add(NANO_EXPONENT)?;

    if exponent >= 0 {
        let factor = 10i128.checked_pow(u32::try_from(exponent).ok()?)?;
        return mantissa.checked_mul(factor);
    }

    let divisor = u32::try_from(exponent.unsigned_abs())
        .ok()
        .and_then(|e| 10i128.checked_pow(e));
    match divisor {
        Some(d) => Some(mantissa / d + i128::from(mantissa % d != 0)),
        // Far below one nano-unit; rounds up to the smallest step.
        None => Some(1),
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }
}
