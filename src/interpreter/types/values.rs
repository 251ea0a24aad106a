//! Runtime value types

use num_bigint::BigInt;
use num_traits::{FromPrimitive, ToPrimitive};
use std::fmt;

use crate::interpreter::errors::{Fault, FaultResult};

/// Largest magnitude a reparsed float may have
pub const FLOAT_MAGNITUDE_LIMIT: f64 = 1e303;

/// Runtime value held by the variable store
#[derive(Debug, Clone, PartialEq)]
pub enum Val {
    Str(String),
    Int(BigInt),
    Float(f64),
}

impl Val {
    pub fn int(v: i64) -> Self {
        Val::Int(BigInt::from(v))
    }

    /// Value equality used by conditions: numbers compare across int/float,
    /// strings only equal strings
    pub fn loosely_equals(&self, other: &Val) -> bool {
        match (self, other) {
            (Val::Str(a), Val::Str(b)) => a == b,
            (Val::Int(a), Val::Int(b)) => a == b,
            (Val::Float(a), Val::Float(b)) => a == b,
            (Val::Int(i), Val::Float(f)) | (Val::Float(f), Val::Int(i)) => {
                f.is_finite() && f.fract() == 0.0 && BigInt::from_f64(*f).as_ref() == Some(i)
            }
            _ => false,
        }
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Val::Str(s) => f.write_str(s),
            Val::Int(i) => write!(f, "{}", i),
            Val::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/* ===================== Float formatting ===================== */

/// Shortest round-trip rendering: fixed notation for exponents in
/// `-4..16` (always with a fractional part), scientific otherwise
/// (`1e+16`, `1.5e-05`)
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let sign = if x.is_sign_negative() { "-" } else { "" };
    let sci = format!("{:e}", x.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let body = if (-4..16).contains(&exp) {
        if exp >= 0 {
            let point = exp as usize + 1;
            if digits.len() > point {
                format!("{}.{}", &digits[..point], &digits[point..])
            } else {
                format!("{}{}.0", digits, "0".repeat(point - digits.len()))
            }
        } else {
            format!("0.{}{}", "0".repeat((-exp - 1) as usize), digits)
        }
    } else {
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, exp_sign, exp.abs())
    };

    format!("{}{}", sign, body)
}

/* ===================== Reparsing ===================== */

/// `-?(digits(.digits*(exp)?|exp)|.digits(exp)?)`
fn is_float_shape(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    let bytes = s.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - start
    };
    let exponent = |i: &mut usize| {
        if *i < bytes.len() && (bytes[*i] == b'e' || bytes[*i] == b'E') {
            let mut j = *i + 1;
            if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
                j += 1;
            }
            let start = j;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j > start {
                *i = j;
                return true;
            }
        }
        false
    };

    if digits(&mut i) > 0 {
        if i < bytes.len() && bytes[i] == b'.' {
            i += 1;
            digits(&mut i);
            exponent(&mut i);
        } else if !exponent(&mut i) {
            return false;
        }
    } else if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        if digits(&mut i) == 0 {
            return false;
        }
        exponent(&mut i);
    } else {
        return false;
    }
    i == bytes.len()
}

fn is_int_shape(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Opportunistically turn text into a number
///
/// Float shapes become floats (faulting beyond ±1e303), integer shapes become
/// integers (faulting outside the signed 64-bit range), anything else stays text.
pub fn reparse(text: &str) -> FaultResult<Val> {
    if is_float_shape(text) {
        let value: f64 = text
            .parse()
            .map_err(|e| Fault::Internal(format!("cannot read float {:?}: {}", text, e)))?;
        if !(-FLOAT_MAGNITUDE_LIMIT..=FLOAT_MAGNITUDE_LIMIT).contains(&value) {
            return Err(Fault::NumberTooLarge);
        }
        return Ok(Val::Float(value));
    }
    if is_int_shape(text) {
        let value: BigInt = text
            .parse()
            .map_err(|e| Fault::Internal(format!("cannot read integer {:?}: {}", text, e)))?;
        if value.to_i64().is_none() {
            return Err(Fault::IntegerOverflow(text.to_string()));
        }
        return Ok(Val::Int(value));
    }
    Ok(Val::Str(text.to_string()))
}
