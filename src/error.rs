/*!
  Errors surfaced by the machine, the exporters, and configuration loading.

  None of the machine faults are fatal. An instruction that would violate an invariant of the
  stack or the memory bank is abandoned before anything is mutated, and the fault is handed to
  the caller. Only export failures involve cleanup, which the exporter performs itself.
*/

use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::address::Address;

/// Coarse classification of a [`Fault`], used by frontends to decide how to present it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum FaultKind {
  /// Malformed numeric or hexadecimal argument.
  Decode,
  /// Attempted write beyond a configured bound.
  Capacity,
  /// Underflow, unoccupied slot, or out-of-range address.
  State,
  /// Division by zero.
  Arithmetic,
  /// Export write failure.
  Io,
  /// The user declined an input request. Not a true error.
  Cancellation
}

impl Display for FaultKind {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      FaultKind::Decode       => write!(f, "Decode error"),
      FaultKind::Capacity     => write!(f, "Capacity error"),
      FaultKind::State        => write!(f, "State error"),
      FaultKind::Arithmetic   => write!(f, "Arithmetic error"),
      FaultKind::Io           => write!(f, "I/O error"),
      FaultKind::Cancellation => write!(f, "Cancelled")
    }
  }
}

#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum Fault {
  #[error("invalid number: `{0}`")]
  InvalidNumber(String),

  #[error("invalid hexadecimal address: `{0}`")]
  InvalidHexadecimal(String),

  #[error("no instruction has selector index {0}")]
  UnknownSelection(u8),

  #[error("stack overflow: the stack already holds its maximum of {capacity} values")]
  StackOverflow { capacity: usize },

  #[error("stack underflow: the instruction needs {required} value(s) but the stack holds {available}")]
  StackUnderflow { required: usize, available: usize },

  #[error("invalid address {address}: memory has {size} slots")]
  InvalidAddress { address: Address, size: usize },

  #[error("memory slot {0} is empty")]
  EmptySlot(Address),

  #[error("division by zero")]
  DivisionByZero,

  #[error("requested size {requested} exceeds the maximum of {ceiling}")]
  CeilingExceeded { requested: usize, ceiling: usize },

  #[error("requested size {requested} would discard live data ({occupied} in use)")]
  ShrinkBelowOccupancy { requested: usize, occupied: usize },

  #[error("instruction cancelled")]
  InputCancelled
}

impl Fault {
  pub fn kind(&self) -> FaultKind {
    match self {

      | Fault::InvalidNumber(_)
      | Fault::InvalidHexadecimal(_)
      | Fault::UnknownSelection(_)      => FaultKind::Decode,

      | Fault::StackOverflow { .. }
      | Fault::CeilingExceeded { .. }
      | Fault::ShrinkBelowOccupancy { .. } => FaultKind::Capacity,

      | Fault::StackUnderflow { .. }
      | Fault::InvalidAddress { .. }
      | Fault::EmptySlot(_)             => FaultKind::State,

      Fault::DivisionByZero             => FaultKind::Arithmetic,

      Fault::InputCancelled             => FaultKind::Cancellation

    }
  }
}

/// A line that is not in the instruction log encoding.
#[derive(Error, Clone, Eq, PartialEq, Debug)]
#[error("not a valid log entry: `{0}`")]
pub struct MalformedEntry(pub String);

#[derive(Error, Debug)]
pub enum ExportError {
  #[error("the instruction log is empty, there is nothing to export")]
  EmptyLog,

  #[error("log line {line} is not a valid instruction: `{text}`")]
  MalformedEntry { line: usize, text: String },

  #[error("could not write {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error
  }
}

impl ExportError {
  pub fn kind(&self) -> FaultKind {
    match self {
      ExportError::EmptyLog                => FaultKind::State,
      ExportError::MalformedEntry { .. }   => FaultKind::Decode,
      ExportError::Io { .. }               => FaultKind::Io
    }
  }
}

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("could not read configuration file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error
  },

  #[error("malformed configuration: {0}")]
  Syntax(#[from] serde_json::Error),

  #[error("{field} of {value} exceeds the maximum of {ceiling}")]
  OutOfRange { field: &'static str, value: usize, ceiling: usize }
}
