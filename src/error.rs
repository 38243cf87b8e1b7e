//! Error types

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

/// Everything the ePID core can reject.
///
/// Generation itself accepts every application/protocol pair. The variants
/// here describe broken reference tables, a clock that sits before the
/// newest activation floor, and malformed ePID text handed to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EpidError {
    #[error("key config {name}: range minimum {min} exceeds maximum {max}")]
    InvertedKeyRange {
        name: &'static str,
        min: u32,
        max: u32,
    },

    #[error("key config {name}: range maximum {max} does not fit the 3+6 digit key fields")]
    KeyRangeOverflow { name: &'static str, max: u32 },

    #[error("{field} value {value} does not fit in {width} digits")]
    FieldOverflow {
        field: &'static str,
        value: u32,
        width: usize,
    },

    #[error("host OS table is empty")]
    EmptyHostTable,

    #[error("activation floor {floor} is after the current time {now}")]
    FloorAfterNow { floor: NaiveDate, now: NaiveDateTime },

    #[error("unknown {kind} '{input}'")]
    UnknownName { kind: &'static str, input: String },

    #[error("malformed ePID {input:?}: {reason}")]
    Parse { input: String, reason: &'static str },
}
