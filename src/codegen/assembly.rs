/*!
  Translates a log into x86-64 GNU assembler source (AT&T syntax) for Linux.

  Register use in the generated program:

  | Register | Role                                                   |
  |:---------|:-------------------------------------------------------|
  | `%rsi`   | next free slot of the `stack` region, 4 bytes per slot |
  | `%rdi`   | base of the `memory` region, slot `a` at `4 * a`       |
  | `%eax`   | second operand, result                                 |
  | `%ebx`   | top operand                                            |

  `INPUT` is replayed with the value that was typed when the log was recorded, and `PRINT` only
  retracts the stack pointer, so the program runs without a terminal.
*/

use crate::address::Address;
use crate::instruction::{LogEntry, Opcode, Operands, Word};
use crate::memory::MAX_POSSIBLE_MEM_SIZE;
use crate::stack::MAX_POSSIBLE_SIZE;

use super::CodeGenerator;

const SLOT_WIDTH: usize = 4;

#[derive(Copy, Clone, Default, Debug)]
pub struct AssemblyGenerator;

impl AssemblyGenerator {
  fn prologue(buffer: &mut String) {
    buffer.push_str(
      format!(
        ".section .data\nstack:\n    .skip {}\nmemory:\n    .skip {}\n\n",
        SLOT_WIDTH * MAX_POSSIBLE_SIZE,
        SLOT_WIDTH * MAX_POSSIBLE_MEM_SIZE
      ).as_str()
    );
    buffer.push_str(".section .text\n.global _start\n\n_start:\n");
    emit(buffer, "leaq stack(%rip), %rsi");
    emit(buffer, "leaq memory(%rip), %rdi");
  }

  fn epilogue(buffer: &mut String) {
    buffer.push('\n');
    emit(buffer, "movq $60, %rax");
    emit(buffer, "xorq %rdi, %rdi");
    emit(buffer, "syscall");
  }

  fn entry(buffer: &mut String, entry: &LogEntry) {
    buffer.push_str(format!("\n    # {}\n", entry).as_str());

    match (entry.opcode, entry.operands) {

      | (Opcode::PushImmediate, Operands::One(value))
      | (Opcode::Input, Operands::One(value)) => {
        push_literal(buffer, value);
      }

      | (Opcode::Push, Operands::One(address))
      | (Opcode::Push, Operands::Two(address, _)) => {
        emit(buffer, "subq $4, %rsi");
        emit(buffer, "movl (%rsi), %eax");
        emit(buffer, format!("movl %eax, {}(%rdi)", slot_offset(address)).as_str());
      }

      (Opcode::Pop, Operands::One(address)) => {
        emit(buffer, format!("movl {}(%rdi), %eax", slot_offset(address)).as_str());
        push_eax(buffer);
      }

      (Opcode::Add, _) => arithmetic(buffer, &["addl %ebx, %eax"]),
      (Opcode::Sub, _) => arithmetic(buffer, &["subl %ebx, %eax"]),
      (Opcode::Mul, _) => arithmetic(buffer, &["imull %ebx, %eax"]),
      (Opcode::Div, _) => arithmetic(buffer, &["cltd", "idivl %ebx"]),

      (Opcode::Swap, _) => {
        pop_operands(buffer);
        emit(buffer, "movl %ebx, (%rsi)");
        emit(buffer, "movl %eax, 4(%rsi)");
        emit(buffer, "addq $8, %rsi");
      }

      (Opcode::Dup, _) => {
        emit(buffer, "movl -4(%rsi), %eax");
        push_eax(buffer);
      }

      | (Opcode::Drop, _)
      | (Opcode::Print, _) => {
        emit(buffer, "subq $4, %rsi");
      }

      (Opcode::Halt, _) => {
        emit(buffer, "leaq stack(%rip), %rsi");
      }

      // `ERROR` never changes the machine.
      _ => {}

    }
  }
}

impl CodeGenerator for AssemblyGenerator {
  fn target(&self) -> &'static str {
    "assembly"
  }

  fn default_path(&self) -> &'static str {
    "export.asm"
  }

  fn translate(&self, entries: &[LogEntry]) -> String {
    let mut buffer = String::new();
    AssemblyGenerator::prologue(&mut buffer);
    for entry in entries {
      AssemblyGenerator::entry(&mut buffer, entry);
    }
    AssemblyGenerator::epilogue(&mut buffer);
    buffer
  }
}

// region Emission helpers

fn emit(buffer: &mut String, instruction: &str) {
  buffer.push_str("    ");
  buffer.push_str(instruction);
  buffer.push('\n');
}

// Recorded addresses are non-negative once the log has been checked.
fn slot_offset(address: Word) -> usize {
  Address(address as usize).byte_offset()
}

fn push_literal(buffer: &mut String, value: Word) {
  emit(buffer, format!("movl ${}, (%rsi)", value).as_str());
  emit(buffer, "addq $4, %rsi");
}

fn push_eax(buffer: &mut String) {
  emit(buffer, "movl %eax, (%rsi)");
  emit(buffer, "addq $4, %rsi");
}

/// Top into `%ebx`, second into `%eax`; `%rsi` is left on the second's slot.
fn pop_operands(buffer: &mut String) {
  emit(buffer, "subq $4, %rsi");
  emit(buffer, "movl (%rsi), %ebx");
  emit(buffer, "subq $4, %rsi");
  emit(buffer, "movl (%rsi), %eax");
}

fn arithmetic(buffer: &mut String, compute: &[&str]) {
  pop_operands(buffer);
  for instruction in compute {
    emit(buffer, instruction);
  }
  push_eax(buffer);
}

// endregion
