/*!
  The instruction log and the textual encoding of its entries.

  Each executed instruction is rendered as one line of text:
  ```text
  <OPCODE>
  <OPCODE>    <value>
  <OPCODE>    <value1> <value2>
  ```
  Four literal spaces separate the opcode from its operands and a single space separates the two
  operands of a binary entry. The text form is what the code generators consume, so entries can
  be parsed back with `LogEntry::from_str`.
*/

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use nom::{
  bytes::complete::tag,
  character::complete::{alpha1, char as one_char, digit1},
  combinator::{all_consuming, map, map_res, opt, recognize},
  sequence::{pair, preceded},
  IResult
};

use super::{Opcode, Word};
use crate::error::MalformedEntry;

pub const OPERAND_SEPARATOR: &str = "    ";

/// The values recorded alongside an opcode.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Operands {
  None,
  One(Word),
  /// Binary entries record their operands in pop order: top first, then second.
  Two(Word, Word)
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct LogEntry {
  pub opcode   : Opcode,
  pub operands : Operands
}

impl LogEntry {
  pub fn bare(opcode: Opcode) -> LogEntry {
    LogEntry { opcode, operands: Operands::None }
  }

  pub fn unary(opcode: Opcode, value: Word) -> LogEntry {
    LogEntry { opcode, operands: Operands::One(value) }
  }

  pub fn binary(opcode: Opcode, value1: Word, value2: Word) -> LogEntry {
    LogEntry { opcode, operands: Operands::Two(value1, value2) }
  }

  /**
    Whether the entry carries what replaying it needs. `PUSHI` and `INPUT` need their value and
    `POP` its address. `PUSH` needs the address and may omit the stored value. The remaining
    opcodes are accepted bare or with the values the machine records for them. Addresses are
    never negative.
  */
  pub fn is_well_formed(&self) -> bool {
    match (self.opcode, self.operands) {

      | (Opcode::Pop, Operands::One(address))
      | (Opcode::Push, Operands::One(address))
      | (Opcode::Push, Operands::Two(address, _)) => address >= 0,

      | (Opcode::PushImmediate, Operands::One(_))
      | (Opcode::Input, Operands::One(_)) => true,

      | (Opcode::PushImmediate, _)
      | (Opcode::Input, _)
      | (Opcode::Push, _)
      | (Opcode::Pop, _) => false,

      _ => true

    }
  }
}

impl Display for LogEntry {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    match self.operands {

      Operands::None => {
        write!(f, "{}", self.opcode)
      }

      Operands::One(value) => {
        write!(f, "{}{}{}", self.opcode, OPERAND_SEPARATOR, value)
      }

      Operands::Two(value1, value2) => {
        write!(f, "{}{}{} {}", self.opcode, OPERAND_SEPARATOR, value1, value2)
      }

    }
  }
}

// region Parsers

fn opcode_p(input: &str) -> IResult<&str, Opcode> {
  map_res(alpha1, Opcode::from_str)(input)
}

fn operand_p(input: &str) -> IResult<&str, Word> {
  map_res(
    recognize(pair(opt(one_char('-')), digit1)),
    |text: &str| text.parse::<Word>()
  )(input)
}

fn operands_p(input: &str) -> IResult<&str, Operands> {
  map(
    opt(
      preceded(
        tag(OPERAND_SEPARATOR),
        pair(operand_p, opt(preceded(one_char(' '), operand_p)))
      )
    ),
    |found| {
      match found {
        None                        => Operands::None,
        Some((first, None))         => Operands::One(first),
        Some((first, Some(second))) => Operands::Two(first, second)
      }
    }
  )(input)
}

fn entry_p(input: &str) -> IResult<&str, LogEntry> {
  map(
    pair(opcode_p, operands_p),
    |(opcode, operands)| LogEntry { opcode, operands }
  )(input)
}

// endregion

impl FromStr for LogEntry {
  type Err = MalformedEntry;

  fn from_str(text: &str) -> Result<LogEntry, MalformedEntry> {
    let line = text.trim_end_matches(|c: char| c == '\n' || c == '\r');
    match all_consuming(entry_p)(line) {
      Ok((_rest, entry)) => Ok(entry),
      Err(_e)            => Err(MalformedEntry(text.to_string()))
    }
  }
}

/// The ordered, append-only record of executed instructions. Entries are never edited or
/// removed individually; the log is only ever cleared as a whole.
#[derive(Clone, Default, Eq, PartialEq, Debug)]
pub struct InstructionLog {
  entries: Vec<LogEntry>
}

impl InstructionLog {
  pub fn new() -> InstructionLog {
    InstructionLog { entries: Vec::new() }
  }

  pub fn append(&mut self, entry: LogEntry) {
    self.entries.push(entry);
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn last(&self) -> Option<&LogEntry> {
    self.entries.last()
  }

  /// The log rendered line by line in its text encoding.
  pub fn lines(&self) -> Vec<String> {
    self.entries.iter().map(LogEntry::to_string).collect()
  }
}

impl Display for InstructionLog {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.lines().join("\n"))
  }
}
