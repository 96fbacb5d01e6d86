/*!
  The instruction vocabulary of the machine.

  The machine has a closed set of fourteen opcodes. Thirteen of them can be selected and executed;
  `ERROR` is a sentinel produced when an instruction cannot be decoded and is never executed.
  Opcodes are selected either by name (via the `strum` derives) or by their position in the
  selector list (via the `num_enum` derives), which is how a menu-driven frontend hands them over.

  Order-dependencies: the discriminants below are the selector indices, so the order the opcodes
  are listed in is significant.
*/

mod entries;
mod record;

pub use self::entries::{InstructionLog, LogEntry, Operands, OPERAND_SEPARATOR};
pub use self::record::{Argument, InstructionRecord};

use strum::IntoEnumIterator;
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The machine word. Stack entries and memory slots hold signed 32 bit integers.
pub type Word = i32;

#[derive(
StrumDisplay, IntoStaticStr, EnumString, EnumIter, TryFromPrimitive, IntoPrimitive,
Clone,        Copy,          Eq, PartialEq,  Debug,    Hash
)]
#[repr(u8)]
pub enum Opcode {
  // Instructions taking a textual argument //
  #[strum(serialize = "PUSHI")] PushImmediate, // PUSHI value     -- decimal literal onto the stack
  #[strum(serialize = "PUSH")]  Push,          // PUSH address    -- store top of stack into memory
  #[strum(serialize = "POP")]   Pop,           // POP address     -- load memory slot onto the stack
  // Opcode 3

  // I/O //
  #[strum(serialize = "INPUT")] Input,
  #[strum(serialize = "PRINT")] Print,

  // Binary operations, logged with both operands //
  #[strum(serialize = "ADD")]   Add,
  #[strum(serialize = "SUB")]   Sub,
  #[strum(serialize = "MUL")]   Mul,
  #[strum(serialize = "DIV")]   Div,
  #[strum(serialize = "SWAP")]  Swap,

  // Stack manipulation //
  #[strum(serialize = "DROP")]  Drop,
  #[strum(serialize = "DUP")]   Dup,
  #[strum(serialize = "HLT")]   Halt,
  // Opcode 13

  // Decode failure sentinel, never executed //
  #[strum(serialize = "ERROR")] Invalid,
}

pub const MAX_ARGUMENT_OPCODE: u8 = 3u8;
pub const MAX_SELECTABLE_OPCODE: u8 = 13u8;

impl Opcode {
  pub fn code(&self) -> u8 {
    Into::<u8>::into(*self)
  }

  /// The human readable name, which is also how the opcode is written in the log.
  pub fn description(&self) -> &'static str {
    (*self).into()
  }

  /// Whether the instruction consumes the textual argument supplied with it.
  pub fn takes_argument(&self) -> bool {
    self.code() < MAX_ARGUMENT_OPCODE
  }

  pub fn is_selectable(&self) -> bool {
    self.code() < MAX_SELECTABLE_OPCODE
  }

  /// The opcodes a frontend offers, in selector order.
  pub fn selectable() -> impl Iterator<Item = Opcode> {
    Opcode::iter().filter(Opcode::is_selectable)
  }
}
