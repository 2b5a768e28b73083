use std::io::{self, Read};

use byteorder::{NativeEndian, ReadBytesExt};

use crate::{
    header::{Endianness, ScalarType},
    Error,
};

/// One decoded PLY scalar, kept in its declared type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScalarValue {
    Char(i8),
    UChar(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Float(f32),
    Double(f64),
}

impl ScalarValue {
    pub fn as_f32(&self) -> f32 {
        match *self {
            ScalarValue::Char(v) => v as f32,
            ScalarValue::UChar(v) => v as f32,
            ScalarValue::Short(v) => v as f32,
            ScalarValue::UShort(v) => v as f32,
            ScalarValue::Int(v) => v as f32,
            ScalarValue::UInt(v) => v as f32,
            ScalarValue::Float(v) => v,
            ScalarValue::Double(v) => v as f32,
        }
    }

    /// Integer value, or `None` for floating point values.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ScalarValue::Char(v) => Some(v.into()),
            ScalarValue::UChar(v) => Some(v.into()),
            ScalarValue::Short(v) => Some(v.into()),
            ScalarValue::UShort(v) => Some(v.into()),
            ScalarValue::Int(v) => Some(v.into()),
            ScalarValue::UInt(v) => Some(v.into()),
            ScalarValue::Float(_) | ScalarValue::Double(_) => None,
        }
    }

    /// Color channel in `[0, 1]`. Integers are scaled by their type's
    /// maximum, floats are taken as they are.
    pub fn as_color(&self) -> f32 {
        match *self {
            ScalarValue::Char(v) => v.max(0) as f32 / i8::MAX as f32,
            ScalarValue::UChar(v) => v as f32 / u8::MAX as f32,
            ScalarValue::Short(v) => v.max(0) as f32 / i16::MAX as f32,
            ScalarValue::UShort(v) => v as f32 / u16::MAX as f32,
            ScalarValue::Int(v) => (v.max(0) as f64 / i32::MAX as f64) as f32,
            ScalarValue::UInt(v) => (v as f64 / u32::MAX as f64) as f32,
            ScalarValue::Float(v) => v,
            ScalarValue::Double(v) => v as f32,
        }
    }

    /// Parses an ASCII token as the given type.
    pub fn parse(token: &str, ty: ScalarType) -> Result<Self, Error> {
        Ok(match ty {
            ScalarType::Char => ScalarValue::Char(token.parse()?),
            ScalarType::UChar => ScalarValue::UChar(token.parse()?),
            ScalarType::Short => ScalarValue::Short(token.parse()?),
            ScalarType::UShort => ScalarValue::UShort(token.parse()?),
            ScalarType::Int => ScalarValue::Int(token.parse()?),
            ScalarType::UInt => ScalarValue::UInt(token.parse()?),
            ScalarType::Float => ScalarValue::Float(parse_finite(token)?),
            ScalarType::Double => ScalarValue::Double(parse_finite::<f64>(token)?),
        })
    }
}

fn parse_finite<T>(token: &str) -> Result<T, Error>
where
    T: std::str::FromStr<Err = std::num::ParseFloatError> + Into<f64> + Copy,
{
    let value: T = token.parse()?;
    if value.into().is_finite() {
        Ok(value)
    } else {
        Err(Error::OutOfRange(token.to_string()))
    }
}

/// Reads binary PLY scalars, swapping bytes when the file's byte order
/// differs from the host's.
pub struct BinValReader<R: Read> {
    reader: R,
    swap: bool,
}

impl<R: Read> BinValReader<R> {
    pub fn new(reader: R, file: Endianness, host: Endianness) -> Self {
        Self {
            reader,
            swap: file != host,
        }
    }

    pub fn read_scalar(&mut self, ty: ScalarType) -> Result<ScalarValue, Error> {
        let swap = self.swap;
        let r = &mut self.reader;
        Ok(match ty {
            ScalarType::Char => ScalarValue::Char(r.read_i8()?),
            ScalarType::UChar => ScalarValue::UChar(r.read_u8()?),
            ScalarType::Short => {
                let v = r.read_i16::<NativeEndian>()?;
                ScalarValue::Short(if swap { v.swap_bytes() } else { v })
            }
            ScalarType::UShort => {
                let v = r.read_u16::<NativeEndian>()?;
                ScalarValue::UShort(if swap { v.swap_bytes() } else { v })
            }
            ScalarType::Int => {
                let v = r.read_i32::<NativeEndian>()?;
                ScalarValue::Int(if swap { v.swap_bytes() } else { v })
            }
            ScalarType::UInt => {
                let v = r.read_u32::<NativeEndian>()?;
                ScalarValue::UInt(if swap { v.swap_bytes() } else { v })
            }
            ScalarType::Float => {
                let bits = r.read_u32::<NativeEndian>()?;
                ScalarValue::Float(f32::from_bits(if swap { bits.swap_bytes() } else { bits }))
            }
            ScalarType::Double => {
                let bits = r.read_u64::<NativeEndian>()?;
                ScalarValue::Double(f64::from_bits(if swap { bits.swap_bytes() } else { bits }))
            }
        })
    }

    /// Reads a list count or index, which must be an integer type.
    pub fn read_integer(&mut self, ty: ScalarType) -> Result<i64, Error> {
        if !ty.is_integer() {
            return Err(Error::UnsupportedType(format!(
                "{ty} cannot be used as a list count or index"
            )));
        }
        Ok(self.read_scalar(ty)?.as_i64().unwrap_or_default())
    }

    /// Moves forward over `count` values of `ty` without decoding them.
    pub fn skip(&mut self, ty: ScalarType, count: usize) -> Result<(), Error> {
        let len = (ty.size_bytes() as u64).saturating_mul(count as u64);
        let skipped = io::copy(&mut self.reader.by_ref().take(len), &mut io::sink())?;
        if skipped < len {
            return Err(io::Error::from(io::ErrorKind::UnexpectedEof).into());
        }
        Ok(())
    }
}
