//! The tagged value carried by edges alongside a [`crate::stamp::Stamp`].
//!
//! Replaces the dynamic-cast payload of the original with an explicit
//! variant; the dynamically-typed `data` payload carries its type name
//! as a side-table string so extraction becomes a checked match instead
//! of a runtime cast.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

#[derive(Clone)]
enum Payload {
    Data { type_tag: &'static str, value: Arc<dyn Any + Send + Sync> },
    Empty,
    Complete,
    Error(String),
    Invalid,
}

/// A tagged value flowing through an edge. Immutable once constructed.
#[derive(Clone)]
pub struct Datum {
    payload: Payload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatumKind {
    Data,
    Empty,
    Complete,
    Error,
    Invalid,
}

impl Datum {
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Datum {
            payload: Payload::Data {
                type_tag: std::any::type_name::<T>(),
                value: Arc::new(value),
            },
        }
    }

    pub fn empty() -> Self {
        Datum { payload: Payload::Empty }
    }

    pub fn complete() -> Self {
        Datum { payload: Payload::Complete }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Datum { payload: Payload::Error(message.into()) }
    }

    pub fn invalid() -> Self {
        Datum { payload: Payload::Invalid }
    }

    pub fn kind(&self) -> DatumKind {
        match &self.payload {
            Payload::Data { .. } => DatumKind::Data,
            Payload::Empty => DatumKind::Empty,
            Payload::Complete => DatumKind::Complete,
            Payload::Error(_) => DatumKind::Error,
            Payload::Invalid => DatumKind::Invalid,
        }
    }

    /// Empty unless `kind() == Error`.
    pub fn error_string(&self) -> &str {
        match &self.payload {
            Payload::Error(msg) => msg,
            _ => "",
        }
    }

    /// Typed extraction; fails with [`Error::BadDatumCast`] for
    /// non-`data` kinds or a type-tag mismatch.
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        match &self.payload {
            Payload::Data { type_tag, value } => {
                if *type_tag != std::any::type_name::<T>() {
                    return Err(Error::BadDatumCast);
                }
                value.clone().downcast::<T>().map_err(|_| Error::BadDatumCast)
            }
            _ => Err(Error::BadDatumCast),
        }
    }

    pub fn type_tag(&self) -> Option<&'static str> {
        match &self.payload {
            Payload::Data { type_tag, .. } => Some(type_tag),
            _ => None,
        }
    }
}

impl fmt::Debug for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Data { type_tag, .. } => write!(f, "Datum::Data({type_tag})"),
            Payload::Empty => write!(f, "Datum::Empty"),
            Payload::Complete => write!(f, "Datum::Complete"),
            Payload::Error(msg) => write!(f, "Datum::Error({msg:?})"),
            Payload::Invalid => write!(f, "Datum::Invalid"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_typed_value() {
        let d = Datum::new(42i32);
        assert_eq!(d.kind(), DatumKind::Data);
        assert_eq!(*d.get::<i32>().unwrap(), 42);
    }

    #[test]
    fn mismatched_type_fails() {
        let d = Datum::new(42i32);
        assert!(matches!(d.get::<String>(), Err(Error::BadDatumCast)));
    }

    #[test]
    fn non_data_kinds_fail_extraction() {
        assert!(matches!(Datum::empty().get::<i32>(), Err(Error::BadDatumCast)));
        assert!(matches!(Datum::complete().get::<i32>(), Err(Error::BadDatumCast)));
        assert!(matches!(Datum::error("boom").get::<i32>(), Err(Error::BadDatumCast)));
    }

    #[test]
    fn error_string_only_populated_for_error_kind() {
        assert_eq!(Datum::empty().error_string(), "");
        assert_eq!(Datum::error("boom").error_string(), "boom");
    }
}
