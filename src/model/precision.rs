//! Significant-digit formatting for the duration column.
//!
//! Matches the output of JavaScript's `Number.prototype.toPrecision`, which
//! the existing reports were produced with: fixed notation unless the
//! exponent is below -6 or at least `precision`, then `d.dde+N` notation.
//! Rounding is done on the exact decimal value of the double, and an exact
//! tie rounds away from zero (`1.125` gives `1.13`).

/// Enough fractional digits to spell out any finite double exactly.
const EXACT_DIGITS: usize = 800;

pub fn to_precision(value: f64, precision: usize) -> String {
    let precision = precision.max(1);

    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return format!("{:.*}", precision - 1, 0.0);
    }

    let (digits, exp) = significant_digits(value.abs(), precision);
    let body = if exp < -6 || exp >= precision as i32 {
        let sign = if exp < 0 { '-' } else { '+' };
        if digits.len() > 1 {
            format!("{}.{}e{}{}", &digits[..1], &digits[1..], sign, exp.abs())
        } else {
            format!("{}e{}{}", digits, sign, exp.abs())
        }
    } else if exp >= 0 {
        let (int, frac) = digits.split_at(exp as usize + 1);
        if frac.is_empty() {
            int.to_string()
        } else {
            format!("{}.{}", int, frac)
        }
    } else {
        format!("0.{}{}", "0".repeat((-exp - 1) as usize), digits)
    };

    if value < 0.0 {
        format!("-{}", body)
    } else {
        body
    }
}

/// The first `precision` significant digits of a positive finite `value`,
/// rounded half up, with the decimal exponent of the first digit.
fn significant_digits(value: f64, precision: usize) -> (String, i32) {
    let exact = format!("{:.*e}", EXACT_DIGITS, value);
    let (mantissa, exp) = exact.split_once('e').unwrap_or((exact.as_str(), "0"));
    let mut exp: i32 = exp.parse().unwrap_or(0);

    let mut digits: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();
    let round_up = digits.get(precision).is_some_and(|&d| d >= b'5');
    digits.resize(precision, b'0');

    if round_up {
        let mut carried = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carried = false;
                break;
            }
        }
        // 9.99 -> 10.0: keep the width, shift the exponent.
        if carried {
            digits.insert(0, b'1');
            digits.truncate(precision);
            exp += 1;
        }
    }

    (digits.into_iter().map(char::from).collect(), exp)
}
