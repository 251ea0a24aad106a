//! Binary arithmetic on runtime values
//!
//! Integers wrap at 64 bits in bounded mode and grow without limit otherwise.
//! True division, negative exponents and any float operand produce floats.
//! Floor division and modulo round toward negative infinity.
//! Text only supports concatenation and repetition by an integer.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::interpreter::errors::{Fault, FaultResult};
use crate::interpreter::types::{OpKind, Val};

/* ===================== Public API ===================== */

pub fn apply(kind: OpKind, lhs: &Val, rhs: &Val, bounded: bool) -> FaultResult<Val> {
    match (lhs, rhs) {
        (Val::Str(a), Val::Str(b)) if kind == OpKind::Add => Ok(Val::Str(format!("{}{}", a, b))),
        (Val::Str(text), Val::Int(count)) | (Val::Int(count), Val::Str(text))
            if kind == OpKind::Mult =>
        {
            repeat(text, count)
        }
        (Val::Str(_), _) | (_, Val::Str(_)) => Err(Fault::Internal(format!(
            "cannot {} {:?} and {:?}",
            kind.keyword(),
            lhs.to_string(),
            rhs.to_string()
        ))),
        (Val::Int(a), Val::Int(b)) if bounded => bounded_int(kind, narrow(a)?, narrow(b)?),
        (Val::Int(a), Val::Int(b)) => unbounded_int(kind, a, b),
        _ => float_op(kind, widen(lhs)?, widen(rhs)?),
    }
}

/* ===================== Text ===================== */

fn repeat(text: &str, count: &BigInt) -> FaultResult<Val> {
    if !count.is_positive() {
        return Ok(Val::Str(String::new()));
    }
    let too_long = || Fault::Internal(format!("cannot repeat {:?} {} times", text, count));
    let times = count.to_usize().ok_or_else(too_long)?;
    text.len()
        .checked_mul(times)
        .filter(|len| *len <= isize::MAX as usize)
        .ok_or_else(too_long)?;
    Ok(Val::Str(text.repeat(times)))
}

/* ===================== Integers ===================== */

fn narrow(value: &BigInt) -> FaultResult<i64> {
    value
        .to_i64()
        .ok_or_else(|| Fault::IntegerOverflow(value.to_string()))
}

fn widen(value: &Val) -> FaultResult<f64> {
    let wide = match value {
        Val::Float(f) => return Ok(*f),
        Val::Int(i) => i.to_f64().unwrap_or(f64::INFINITY),
        Val::Str(s) => return Err(Fault::Internal(format!("{:?} is not a number", s))),
    };
    if wide.is_finite() {
        Ok(wide)
    } else {
        Err(Fault::Internal("integer too large to convert to float".to_string()))
    }
}

fn division_by_zero() -> Fault {
    Fault::Internal("division by zero".to_string())
}

fn bounded_int(kind: OpKind, a: i64, b: i64) -> FaultResult<Val> {
    let value = match kind {
        OpKind::Add => a.wrapping_add(b),
        OpKind::Sub => a.wrapping_sub(b),
        OpKind::Mult => a.wrapping_mul(b),
        OpKind::IntDiv => floor_div(a, b)?,
        OpKind::Mod => floor_mod(a, b)?,
        OpKind::TrueDiv => return float_op(kind, a as f64, b as f64),
        OpKind::Exp if b < 0 => return float_op(kind, a as f64, b as f64),
        OpKind::Exp => wrapping_pow(a, b as u64),
    };
    Ok(Val::int(value))
}

fn floor_div(a: i64, b: i64) -> FaultResult<i64> {
    if b == 0 {
        return Err(division_by_zero());
    }
    let q = a.wrapping_div(b);
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn floor_mod(a: i64, b: i64) -> FaultResult<i64> {
    if b == 0 {
        return Err(division_by_zero());
    }
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

/// Square-and-multiply modulo 2^64
fn wrapping_pow(base: i64, mut exp: u64) -> i64 {
    let mut result: i64 = 1;
    let mut base = base;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    result
}

fn unbounded_int(kind: OpKind, a: &BigInt, b: &BigInt) -> FaultResult<Val> {
    let value = match kind {
        OpKind::Add => a + b,
        OpKind::Sub => a - b,
        OpKind::Mult => a * b,
        OpKind::IntDiv | OpKind::Mod if b.is_zero() => return Err(division_by_zero()),
        OpKind::IntDiv => a.div_floor(b),
        OpKind::Mod => a.mod_floor(b),
        OpKind::TrueDiv => return float_op(kind, widen_int(a)?, widen_int(b)?),
        OpKind::Exp if b.is_negative() => return float_op(kind, widen_int(a)?, widen_int(b)?),
        OpKind::Exp => big_pow(a, b)?,
    };
    Ok(Val::Int(value))
}

fn widen_int(value: &BigInt) -> FaultResult<f64> {
    widen(&Val::Int(value.clone()))
}

fn big_pow(base: &BigInt, exp: &BigInt) -> FaultResult<BigInt> {
    if let Some(exp) = exp.to_u32() {
        return Ok(base.pow(exp));
    }
    // Only trivial bases survive an exponent this large
    if base.is_zero() || base.is_one() {
        Ok(base.clone())
    } else if *base == -BigInt::one() {
        Ok(if exp.is_even() { BigInt::one() } else { -BigInt::one() })
    } else {
        Err(Fault::Internal(format!("exponent {} is too large", exp)))
    }
}

/* ===================== Floats ===================== */

fn float_op(kind: OpKind, a: f64, b: f64) -> FaultResult<Val> {
    let value = match kind {
        OpKind::Add => a + b,
        OpKind::Sub => a - b,
        OpKind::Mult => a * b,
        OpKind::TrueDiv if b == 0.0 => return Err(division_by_zero()),
        OpKind::TrueDiv => a / b,
        OpKind::IntDiv => float_divmod(a, b)?.0,
        OpKind::Mod => float_divmod(a, b)?.1,
        OpKind::Exp => float_pow(a, b)?,
    };
    Ok(Val::Float(value))
}

/// Floor quotient and remainder with the remainder taking the divisor's sign
fn float_divmod(a: f64, b: f64) -> FaultResult<(f64, f64)> {
    if b == 0.0 {
        return Err(division_by_zero());
    }
    let mut rem = a % b;
    let mut div = (a - rem) / b;
    if rem != 0.0 {
        if (b < 0.0) != (rem < 0.0) {
            rem += b;
            div -= 1.0;
        }
    } else {
        rem = 0.0_f64.copysign(b);
    }
    let floor = if div != 0.0 {
        let floor = div.floor();
        if div - floor > 0.5 {
            floor + 1.0
        } else {
            floor
        }
    } else {
        0.0_f64.copysign(a / b)
    };
    Ok((floor, rem))
}

fn float_pow(a: f64, b: f64) -> FaultResult<f64> {
    if a == 0.0 && b < 0.0 {
        return Err(Fault::Internal(
            "zero cannot be raised to a negative power".to_string(),
        ));
    }
    if a < 0.0 && b.is_finite() && b.fract() != 0.0 {
        return Err(Fault::Internal(format!(
            "{} has no real power {}",
            a, b
        )));
    }
    let value = a.powf(b);
    if !value.is_finite() && a.is_finite() && b.is_finite() {
        return Err(Fault::Internal("numerical result out of range".to_string()));
    }
    Ok(value)
}
