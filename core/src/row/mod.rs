//! Typed extraction from records and values.
//!
//! [`FromRecord`] turns one result record into a Rust value; [`FromValue`]
//! does the same for a single column value. Tuples of `FromValue` types read
//! columns by position:
//!
//! ```
//! use quarry_core::{FromRecord, record};
//!
//! let row = record! { "id" => 7, "name" => "alice" };
//! let (id, name) = <(i64, String)>::from_record(&row)?;
//! assert_eq!((id, name.as_str()), (7, "alice"));
//! # Ok::<(), quarry_core::QuarryError>(())
//! ```

use crate::error::{QuarryError, Result};
use crate::record::Record;
use crate::value::Value;

// =============================================================================
// FromValue
// =============================================================================

/// Converts one column value into a Rust value.
#[diagnostic::on_unimplemented(
    message = "cannot convert a query value into `{Self}`",
    label = "this type does not implement FromValue"
)]
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self>;
}

fn mismatch<T>(expected: &str, value: &Value) -> Result<T> {
    Err(QuarryError::Mapping(format!(
        "expected {expected}, found {value}"
    )))
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(*i),
            other => mismatch("integer", other),
        }
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self> {
        let i = i64::from_value(value)?;
        u64::try_from(i).map_err(|_| QuarryError::Mapping(format!("{i} is negative")))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self> {
        let i = i64::from_value(value)?;
        i32::try_from(i).map_err(|_| QuarryError::Mapping(format!("{i} does not fit in i32")))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self> {
        value.as_f64().map_or_else(|| mismatch("number", value), Ok)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            Value::Integer(0) => Ok(false),
            Value::Integer(1) => Ok(true),
            other => mismatch("boolean", other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => mismatch("text", other),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Blob(b) => Ok(b.to_vec()),
            other => mismatch("blob", other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

// =============================================================================
// FromRecord
// =============================================================================

/// Builds a Rust value from one result record.
///
/// Scalar types read the record's first column, so `count`-style
/// single-column rows cast directly.
#[diagnostic::on_unimplemented(
    message = "cannot build `{Self}` from a query record",
    label = "this type does not implement FromRecord",
    note = "implement FromRecord for your type, or cast to `Record` and map manually"
)]
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self>;
}

impl FromRecord for Record {
    fn from_record(record: &Record) -> Result<Self> {
        Ok(record.clone())
    }
}

macro_rules! impl_from_record_scalar {
    ($($ty:ty),+) => {
        $(
            impl FromRecord for $ty {
                fn from_record(record: &Record) -> Result<Self> {
                    let value = record.first_value().ok_or(QuarryError::EmptyRow)?;
                    <$ty>::from_value(value)
                }
            }
        )+
    };
}

impl_from_record_scalar!(Value, i64, u64, i32, f64, bool, String, Vec<u8>);

impl<T: FromValue> FromRecord for Option<T> {
    fn from_record(record: &Record) -> Result<Self> {
        match record.first_value() {
            Some(value) => Option::<T>::from_value(value),
            None => Ok(None),
        }
    }
}

macro_rules! impl_from_record_tuple {
    ($len:literal => $($name:ident : $idx:tt),+) => {
        impl<$($name: FromValue),+> FromRecord for ($($name,)+) {
            fn from_record(record: &Record) -> Result<Self> {
                if record.len() < $len {
                    return Err(QuarryError::Mapping(format!(
                        "expected {} columns, found {}",
                        $len,
                        record.len()
                    )));
                }
                let values: Vec<&Value> = record.iter().map(|(_, v)| v).collect();
                Ok(($($name::from_value(values[$idx])?,)+))
            }
        }
    };
}

impl_from_record_tuple!(1 => A: 0);
impl_from_record_tuple!(2 => A: 0, B: 1);
impl_from_record_tuple!(3 => A: 0, B: 1, C: 2);
impl_from_record_tuple!(4 => A: 0, B: 1, C: 2, D: 3);
