use std::fmt::{Display, Formatter};

use super::{Opcode, Word};
use crate::address::Address;

/// The decoded argument of an instruction.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Argument {
  /// `PUSHI` literal.
  Immediate(Word),
  /// `PUSH` / `POP` memory address.
  Address(Address),
  /// No argument, either because the opcode takes none or because decoding it failed. An
  /// instruction that needs an argument does nothing when handed this.
  Absent
}

/**
  A validated instruction, produced once per user-issued instruction by
  `Dispatcher::decode` and consumed once by `Dispatcher::execute`.
*/
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct InstructionRecord {
  pub opcode      : Opcode,
  pub argument    : Argument,
  /// The opcode's display name, written at the head of the log entry.
  pub description : &'static str
}

impl InstructionRecord {
  pub fn new(opcode: Opcode, argument: Argument) -> InstructionRecord {
    InstructionRecord {
      opcode,
      argument,
      description: opcode.description()
    }
  }

  /// An instruction that carries no argument.
  pub fn nullary(opcode: Opcode) -> InstructionRecord {
    InstructionRecord::new(opcode, Argument::Absent)
  }

  /// The record produced when an instruction could not be decoded.
  pub fn invalid() -> InstructionRecord {
    InstructionRecord::nullary(Opcode::Invalid)
  }

  pub fn is_invalid(&self) -> bool {
    self.opcode == Opcode::Invalid
  }
}

impl Display for InstructionRecord {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.argument {

      Argument::Immediate(value) => {
        write!(f, "{}({})", self.description, value)
      }

      Argument::Address(address) => {
        write!(f, "{}({})", self.description, address)
      }

      Argument::Absent => {
        write!(f, "{}", self.description)
      }

    }
  }
}
