/*!
  A tiny Harvard-architecture computer: a bounded LIFO evaluation stack, a separate
  addressable memory bank, and a fourteen-opcode instruction set that moves values between
  them. Every executed instruction is appended to an instruction log, and the log can be
  translated into a standalone assembly or C++ program.

  The moving parts, leaf first:
  ```text
  raw selection + argument -> [`Dispatcher::decode`] -> `InstructionRecord` ->⋯

  ⋯-> [`Dispatcher::execute`] -> `Machine` (`Stack` + `Memory`) -> `InstructionLog` ->⋯

  ⋯-> [`CodeGenerator::export_to_file`] -> `.asm` / `.cpp`
  ```
*/

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;

pub mod address;
pub mod cell;
pub mod codegen;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod frontend;
pub mod instruction;
pub mod machine;
pub mod memory;
pub mod stack;

pub use address::Address;
pub use codegen::{AssemblyGenerator, CodeGenerator, CppGenerator};
pub use config::MachineConfig;
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, ExportError, Fault, FaultKind, MalformedEntry};
pub use frontend::{Frontend, ScriptedFrontend};
pub use instruction::{InstructionLog, InstructionRecord, LogEntry, Opcode, Operands, Word};
pub use machine::Machine;
