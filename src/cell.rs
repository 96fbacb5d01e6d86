use std::fmt::{Display, Formatter};

use crate::address::Address;
use crate::instruction::Word;

/// Contents of one slot of the memory bank.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Cell {
  /// An occupied slot.
  Value(Word),
  /// Unfilled slot. Holds no meaningful value.
  Empty
}

impl Cell {
  pub fn is_occupied(&self) -> bool {
    match self {
      Cell::Value(_) => true,
      Cell::Empty    => false
    }
  }

  pub fn value(&self) -> Option<Word> {
    match self {
      Cell::Value(v) => Some(*v),
      Cell::Empty    => None
    }
  }
}

impl Default for Cell {
  fn default() -> Cell {
    Cell::Empty
  }
}

impl Display for Cell {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self {
      Cell::Value(v) => {
        write!(f, "{}", v)
      },
      Cell::Empty => {
        write!(f, "`")
      },
    }
  }
}

/// A read-only view of a slot together with its address.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct MemorySlot {
  pub address  : Address,
  pub value    : Word,
  pub occupied : bool
}

impl MemorySlot {
  pub fn new(address: Address, cell: Cell) -> MemorySlot {
    MemorySlot {
      address,
      value    : cell.value().unwrap_or_default(),
      occupied : cell.is_occupied()
    }
  }
}
