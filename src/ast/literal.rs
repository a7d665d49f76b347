//! Conversion of literal token text into typed values
//!
//! Both parsers read the longest numeric prefix of the text, then decide:
//! a value that does not fit the target type is an out-of-range error in the
//! input program, while leftover characters after the prefix mean the lexer
//! produced a malformed token, which is an internal error. The range check runs
//! first, so `99999999999x` reports out of range.

use super::nodes::{LiteralType, LiteralValue};
use crate::constants::INT_CONVERSION_BASE;
use crate::dstring::DString;
use crate::error::{CompileError, Result};

/// Parse an `i32` literal in base 10
pub fn parse_int_literal(text: &str) -> Result<i32> {
    parse_int_radix(text, INT_CONVERSION_BASE)
}

/// Parse an integer literal written in `radix`, which must be within 2..=36
pub fn parse_int_radix(text: &str, radix: u32) -> Result<i32> {
    if !(2..=36).contains(&radix) {
        return Err(CompileError::internal(format!(
            "unsupported integer base {} for literal '{}'",
            radix, text
        )));
    }

    let bytes = text.as_bytes();
    let mut pos = 0;

    let negative = match bytes.first() {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let digits_start = pos;
    let mut value: i64 = 0;
    let mut overflowed = false;
    while let Some(digit) = bytes.get(pos).and_then(|&b| (b as char).to_digit(radix)) {
        if !overflowed {
            match value
                .checked_mul(radix as i64)
                .and_then(|v| v.checked_add(digit as i64))
            {
                Some(v) => value = v,
                None => overflowed = true,
            }
        }
        pos += 1;
    }

    if pos == digits_start {
        return Err(CompileError::internal(format!(
            "malformed integer literal '{}'",
            text
        )));
    }

    let value = if negative { -value } else { value };
    if overflowed || value < i32::MIN as i64 || value > i32::MAX as i64 {
        return Err(CompileError::out_of_range(text));
    }

    if pos != bytes.len() {
        return Err(CompileError::internal(format!(
            "malformed integer literal '{}'",
            text
        )));
    }

    Ok(value as i32)
}

/// Parse an `f64` literal
pub fn parse_float_literal(text: &str) -> Result<f64> {
    let end = float_prefix_len(text.as_bytes());
    if end == 0 {
        return Err(CompileError::internal(format!(
            "malformed float literal '{}'",
            text
        )));
    }

    let value: f64 = text[..end].parse().map_err(|_| {
        CompileError::internal(format!("malformed float literal '{}'", text))
    })?;
    if value.is_infinite() {
        return Err(CompileError::out_of_range(text));
    }

    if end != text.len() {
        return Err(CompileError::internal(format!(
            "malformed float literal '{}'",
            text
        )));
    }

    Ok(value)
}

/// Length of the longest prefix that forms a decimal float, 0 if none
fn float_prefix_len(bytes: &[u8]) -> usize {
    let digits = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut pos = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        pos += 1;
    }

    let int_digits = digits(pos);
    pos += int_digits;

    let mut frac_digits = 0;
    if bytes.get(pos) == Some(&b'.') {
        frac_digits = digits(pos + 1);
        if int_digits > 0 || frac_digits > 0 {
            pos += 1 + frac_digits;
        }
    }

    if int_digits == 0 && frac_digits == 0 {
        return 0;
    }

    // Exponent only counts if at least one digit follows it
    if matches!(bytes.get(pos), Some(b'e') | Some(b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'+') | Some(b'-')) {
            exp += 1;
        }
        let exp_digits = digits(exp);
        if exp_digits > 0 {
            pos = exp + exp_digits;
        }
    }

    pos
}

/// Turn the raw token text of a literal into its value
///
/// Numeric text is consumed by the conversion, integers in `radix`. String
/// text is moved into the value as is.
pub fn materialize(
    literal_type: LiteralType,
    text: Option<DString>,
    radix: u32,
) -> Result<LiteralValue> {
    match literal_type {
        LiteralType::Int => {
            let text = numeric_text(text, "integer")?;
            parse_int_radix(&text, radix).map(LiteralValue::Int)
        }
        LiteralType::Float => {
            let text = numeric_text(text, "float")?;
            parse_float_literal(&text).map(LiteralValue::Float)
        }
        LiteralType::String => Ok(LiteralValue::Str(text.unwrap_or_default())),
        LiteralType::Null => Ok(LiteralValue::Null),
        LiteralType::Bool => Ok(LiteralValue::Bool),
        LiteralType::NotDefined => Ok(LiteralValue::Undefined),
    }
}

fn numeric_text(text: Option<DString>, what: &str) -> Result<String> {
    let text = text.ok_or_else(|| CompileError::internal(format!("{} literal without text", what)))?;
    text.as_str()
        .map(str::to_owned)
        .ok_or_else(|| CompileError::internal(format!("{} literal is not valid text", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_int_bounds() {
        assert_eq!(parse_int_literal("2147483647").unwrap(), i32::MAX);
        assert_eq!(parse_int_literal("-2147483648").unwrap(), i32::MIN);
        assert_eq!(parse_int_literal("0").unwrap(), 0);
        assert_eq!(
            parse_int_literal("2147483648").unwrap_err().kind(),
            ErrorKind::SemOther
        );
        assert_eq!(
            parse_int_literal("-2147483649").unwrap_err().kind(),
            ErrorKind::SemOther
        );
    }

    #[test]
    fn test_int_malformed() {
        assert!(parse_int_literal("12a").unwrap_err().is_internal());
        assert!(parse_int_literal("").unwrap_err().is_internal());
        assert!(parse_int_literal("-").unwrap_err().is_internal());
    }

    #[test]
    fn test_int_range_checked_before_trailing_text() {
        let err = parse_int_literal("99999999999999999999999x").unwrap_err();
        assert_eq!(err, CompileError::out_of_range("99999999999999999999999x"));
    }

    #[test]
    fn test_int_other_radix() {
        assert_eq!(parse_int_radix("ff", 16).unwrap(), 255);
        assert!(parse_int_radix("19", 8).unwrap_err().is_internal());
        assert_eq!(
            materialize(LiteralType::Int, Some(DString::from("17")), 8).unwrap(),
            LiteralValue::Int(15)
        );
    }

    #[test]
    fn test_int_radix_out_of_bounds() {
        assert!(parse_int_radix("10", 0).unwrap_err().is_internal());
        assert!(parse_int_radix("10", 1).unwrap_err().is_internal());
        assert!(parse_int_radix("10", 37).unwrap_err().is_internal());
        assert_eq!(parse_int_radix("z", 36).unwrap(), 35);
    }

    #[test]
    fn test_float() {
        assert_eq!(parse_float_literal("3.25").unwrap(), 3.25);
        assert_eq!(parse_float_literal("1e3").unwrap(), 1000.0);
        assert_eq!(parse_float_literal("2.5E-1").unwrap(), 0.25);
        assert_eq!(parse_float_literal("-.5").unwrap(), -0.5);
    }

    #[test]
    fn test_float_errors() {
        assert_eq!(
            parse_float_literal("1e999").unwrap_err().kind(),
            ErrorKind::SemOther
        );
        assert!(parse_float_literal("1.5x").unwrap_err().is_internal());
        assert!(parse_float_literal("1e").unwrap_err().is_internal());
        assert!(parse_float_literal(".").unwrap_err().is_internal());
    }

    #[test]
    fn test_materialize() {
        assert_eq!(
            materialize(LiteralType::Int, Some(DString::from("42")), INT_CONVERSION_BASE).unwrap(),
            LiteralValue::Int(42)
        );
        assert_eq!(
            materialize(LiteralType::String, Some(DString::from("hi")), INT_CONVERSION_BASE).unwrap(),
            LiteralValue::Str(DString::from("hi"))
        );
        assert_eq!(materialize(LiteralType::Null, None, INT_CONVERSION_BASE).unwrap(), LiteralValue::Null);
        assert_eq!(
            materialize(LiteralType::NotDefined, None, INT_CONVERSION_BASE).unwrap(),
            LiteralValue::Undefined
        );
        assert!(materialize(LiteralType::Float, None, INT_CONVERSION_BASE).unwrap_err().is_internal());
    }
}
