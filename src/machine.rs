//! The execution engine: a `Stack` and a `Memory` composed into one machine, with one method per
//! instruction.

use std::fmt::{Display, Formatter};

use log::{debug, info};
use prettytable::{format as TableFormat, Table};

use crate::address::Address;
use crate::error::Fault;
use crate::frontend::Frontend;
use crate::instruction::{InstructionLog, LogEntry, Opcode, Word};
use crate::memory::Memory;
use crate::stack::Stack;

pub const INPUT_PROMPT: &str = "Type a number";

/**
  The machine owns its stack and its memory bank exclusively and is the only thing that mutates
  either. Every instruction is an atomic transition: it either moves the machine from one valid
  configuration to another and appends exactly one entry to the instruction log, or it fails
  with a `Fault` and leaves stack, memory, and log exactly as they were.
*/
#[derive(Clone, Default, Debug)]
pub struct Machine {
  stack  : Stack,
  memory : Memory
}

impl Machine {

  // region Display methods

  fn make_register_table<T> (
      name      : char,
      registers : &[(usize, T)],
      highlight : Option<usize>
    ) -> Table
    where T: Display
  {

    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Contents"]);

    for (i, cell) in registers.iter() {
      match Some(*i) == highlight {

        true  => {
          table.add_row(
            row![r->format!("* --> {}[{}] =", name, i), format!("{}", cell)]
          );
        }

        false => {
          table.add_row(
            row![r->format!("{}[{}] =", name, i), format!("{}", cell)]
          );
        }

      } // end match on highlight
    } // end for
    table
  }

  // endregion

  // region Construction and inspection

  pub fn new(max_size: usize, max_mem_size: usize) -> Machine {
    Machine {
      stack  : Stack::new(max_size),
      memory : Memory::new(max_mem_size)
    }
  }

  pub fn stack(&self) -> &Stack {
    &self.stack
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  pub fn clear_stack(&mut self) {
    self.stack.clear();
  }

  pub fn clear_memory(&mut self) {
    self.memory.clear();
  }

  pub fn clear_memory_log(&mut self) {
    self.memory.clear_log();
  }

  pub fn resize_stack(&mut self, new_size: usize) -> Result<(), Fault> {
    self.stack.resize(new_size)?;
    info!("stack resized to {}", new_size);
    Ok(())
  }

  pub fn resize_memory(&mut self, new_size: usize) -> Result<(), Fault> {
    self.memory.resize(new_size)?;
    info!("memory resized to {}", new_size);
    Ok(())
  }

  /// Resizes both stores, or neither if either request is refused.
  pub fn resize(&mut self, stack_size: usize, memory_size: usize) -> Result<(), Fault> {
    self.stack.check_resize(stack_size)?;
    self.memory.check_resize(memory_size)?;
    self.resize_stack(stack_size)?;
    self.resize_memory(memory_size)
  }

  // endregion

  // region Instruction methods

  /// `PUSHI value`: push a literal.
  pub fn push_immediate(&mut self, value: Word, log: &mut InstructionLog) -> Result<(), Fault> {
    self.stack.push(value)?;
    log.append(LogEntry::unary(Opcode::PushImmediate, value));
    debug!("PUSHI {}", value);
    Ok(())
  }

  /**
    `PUSH address`: move the top of the stack into memory. Despite the name this is a store; the
    value leaves the stack and occupies the slot.
  */
  pub fn push(&mut self, address: Address, log: &mut InstructionLog) -> Result<(), Fault> {
    let value = self.stack.top().ok_or(Fault::StackUnderflow { required: 1, available: 0 })?;
    self.memory.check_address(address)?;

    self.memory.store(address, value)?;
    self.stack.pop()?;
    log.append(LogEntry::binary(Opcode::Push, address.idx() as Word, value));
    debug!("PUSH {} <- {}", address, value);
    Ok(())
  }

  /**
    `POP address`: move the value in a memory slot onto the stack. Despite the name this is a
    load; the slot is left empty.
  */
  pub fn pop(&mut self, address: Address, log: &mut InstructionLog) -> Result<(), Fault> {
    self.stack.require_room()?;
    self.memory.check_address(address)?;
    if !self.memory.is_occupied(address) {
      return Err(Fault::EmptySlot(address));
    }

    let value = self.memory.load(address)?;
    self.stack.push(value)?;
    log.append(LogEntry::unary(Opcode::Pop, address.idx() as Word));
    debug!("POP {} -> {}", address, value);
    Ok(())
  }

  /// `INPUT`: ask the frontend for a value and push it. Cancelling leaves everything unchanged.
  pub fn input(&mut self, frontend: &mut dyn Frontend, log: &mut InstructionLog) -> Result<Word, Fault> {
    self.stack.require_room()?;

    match frontend.request_integer(INPUT_PROMPT) {

      Some(value) => {
        self.stack.push(value)?;
        log.append(LogEntry::unary(Opcode::Input, value));
        debug!("INPUT {}", value);
        Ok(value)
      }

      None => Err(Fault::InputCancelled)

    }
  }

  /// `PRINT`: discard the top of the stack and hand it to the frontend.
  pub fn print(&mut self, frontend: &mut dyn Frontend, log: &mut InstructionLog) -> Result<Word, Fault> {
    let value = self.stack.pop()?;
    log.append(LogEntry::unary(Opcode::Print, value));
    debug!("PRINT {}", value);
    frontend.show(value);
    Ok(value)
  }

  pub fn add(&mut self, log: &mut InstructionLog) -> Result<Word, Fault> {
    self.binary_operation(Opcode::Add, log, Word::wrapping_add)
  }

  /// Computes `second - top`.
  pub fn sub(&mut self, log: &mut InstructionLog) -> Result<Word, Fault> {
    self.binary_operation(Opcode::Sub, log, Word::wrapping_sub)
  }

  pub fn mul(&mut self, log: &mut InstructionLog) -> Result<Word, Fault> {
    self.binary_operation(Opcode::Mul, log, Word::wrapping_mul)
  }

  /// Computes `second / top`, truncating toward zero. A zero divisor pops nothing.
  pub fn div(&mut self, log: &mut InstructionLog) -> Result<Word, Fault> {
    self.stack.require(2)?;
    if self.stack.top() == Some(0) {
      return Err(Fault::DivisionByZero);
    }
    self.binary_operation(Opcode::Div, log, Word::wrapping_div)
  }

  /// `SWAP`: exchange the two topmost values.
  pub fn swap(&mut self, log: &mut InstructionLog) -> Result<(), Fault> {
    self.stack.require(2)?;
    let value1 = self.stack.pop()?;
    let value2 = self.stack.pop()?;
    self.stack.push(value1)?;
    self.stack.push(value2)?;
    log.append(LogEntry::binary(Opcode::Swap, value1, value2));
    debug!("SWAP {} {}", value1, value2);
    Ok(())
  }

  /// `DUP`: push a copy of the top of the stack.
  pub fn dup(&mut self, log: &mut InstructionLog) -> Result<Word, Fault> {
    self.stack.require_room()?;
    let value = self.stack.top().ok_or(Fault::StackUnderflow { required: 1, available: 0 })?;
    self.stack.push(value)?;
    log.append(LogEntry::unary(Opcode::Dup, value));
    debug!("DUP {}", value);
    Ok(value)
  }

  /// Pops and returns the top of the stack without recording anything.
  pub fn drop_top(&mut self) -> Result<Word, Fault> {
    self.stack.pop()
  }

  /// `DROP`: pop and return the top of the stack.
  pub fn drop_value(&mut self, log: &mut InstructionLog) -> Result<Word, Fault> {
    let value = self.drop_top()?;
    log.append(LogEntry::unary(Opcode::Drop, value));
    debug!("DROP {}", value);
    Ok(value)
  }

  /// `HLT`: empty the stack, record the halt, and clear the memory operation log.
  pub fn halt(&mut self, log: &mut InstructionLog) {
    self.stack.clear();
    log.append(LogEntry::bare(Opcode::Halt));
    self.memory.clear_log();
    debug!("HLT");
  }

  /**
    Pops `value1` (the top) and then `value2`, pushes `apply(value2, value1)`, and logs both
    operands in pop order. The second-from-top value is always the left operand.
  */
  fn binary_operation<F>(&mut self, opcode: Opcode, log: &mut InstructionLog, apply: F) -> Result<Word, Fault>
    where F: FnOnce(Word, Word) -> Word
  {
    self.stack.require(2)?;
    let value1 = self.stack.pop()?;
    let value2 = self.stack.pop()?;
    let result = apply(value2, value1);
    self.stack.push(result)?;
    log.append(LogEntry::binary(opcode, value1, value2));
    debug!("{} {} {} = {}", opcode, value2, value1, result);
    Ok(result)
  }

  // endregion

}


lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Machine {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let stack_cells: Vec<(usize, Word)> =
      self.stack.values().iter().copied().enumerate().collect();
    let memory_cells: Vec<(usize, Word)> =
      self.memory.occupied_slots().map(|slot| (slot.address.idx(), slot.value)).collect();

    let top = self.stack.len().checked_sub(1);
    let s_table = Machine::make_register_table('S', &stack_cells,  top);
    let m_table = Machine::make_register_table('M', &memory_cells, None);

    let mut combined_table = table!([s_table, m_table]);

    combined_table.set_titles(row![ub->"Stack", ub->"Memory"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(
      f,
      "Stack: {}/{} ({}%)\tMemory: {} of {} slots occupied\n{}",
      self.stack.len(),
      self.stack.max_size(),
      self.stack.usage_percent(),
      self.memory.occupied_count(),
      self.memory.max_mem_size(),
      combined_table
    )
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::frontend::ScriptedFrontend;

  fn machine_with(values: &[Word]) -> (Machine, InstructionLog) {
    let mut machine = Machine::new(8, 16);
    let mut log = InstructionLog::new();
    for v in values {
      machine.push_immediate(*v, &mut log).unwrap();
    }
    log.clear();
    (machine, log)
  }

  #[test]
  fn arithmetic_uses_second_as_left_operand() {
    let (mut machine, mut log) = machine_with(&[10, 3]);
    assert_eq!(machine.sub(&mut log), Ok(7));
    assert_eq!(log.lines(), vec!["SUB    3 10"]);

    let (mut machine, mut log) = machine_with(&[7, -2]);
    assert_eq!(machine.div(&mut log), Ok(-3));
    assert_eq!(machine.stack().values(), &[-3]);
  }

  #[test]
  fn division_by_zero_changes_nothing() {
    let (mut machine, mut log) = machine_with(&[4, 0]);
    assert_eq!(machine.div(&mut log), Err(Fault::DivisionByZero));
    assert_eq!(machine.stack().values(), &[4, 0]);
    assert!(log.is_empty());
  }

  #[test]
  fn binary_operations_need_two_values() {
    let (mut machine, mut log) = machine_with(&[1]);
    let underflow = Err(Fault::StackUnderflow { required: 2, available: 1 });
    assert_eq!(machine.add(&mut log), underflow);
    assert_eq!(machine.div(&mut log), underflow);
    assert_eq!(machine.swap(&mut log), Err(Fault::StackUnderflow { required: 2, available: 1 }));
    assert_eq!(machine.stack().values(), &[1]);
  }

  #[test]
  fn arithmetic_wraps() {
    let (mut machine, mut log) = machine_with(&[Word::MAX, 1]);
    assert_eq!(machine.add(&mut log), Ok(Word::MIN));
    let (mut machine, mut log) = machine_with(&[Word::MIN, -1]);
    assert_eq!(machine.div(&mut log), Ok(Word::MIN));
  }

  #[test]
  fn swap_exchanges_the_top_two() {
    let (mut machine, mut log) = machine_with(&[1, 2, 3]);
    machine.swap(&mut log).unwrap();
    assert_eq!(machine.stack().values(), &[1, 3, 2]);
    assert_eq!(log.lines(), vec!["SWAP    3 2"]);
  }

  #[test]
  fn store_and_load_cycle_through_memory() {
    let (mut machine, mut log) = machine_with(&[5, 9]);
    machine.push(Address(3), &mut log).unwrap();
    assert_eq!(machine.stack().values(), &[5]);
    assert_eq!(machine.memory().peek(Address(3)), Some(9));

    machine.pop(Address(3), &mut log).unwrap();
    assert_eq!(machine.stack().values(), &[5, 9]);
    assert!(!machine.memory().is_occupied(Address(3)));
    assert_eq!(log.lines(), vec!["PUSH    3 9", "POP    3"]);
    assert_eq!(machine.memory().log().len(), 2);
  }

  #[test]
  fn memory_faults_leave_state_alone() {
    let (mut machine, mut log) = machine_with(&[5]);
    assert_eq!(
      machine.push(Address(16), &mut log),
      Err(Fault::InvalidAddress { address: Address(16), size: 16 })
    );
    assert_eq!(machine.pop(Address(2), &mut log), Err(Fault::EmptySlot(Address(2))));
    assert_eq!(machine.stack().values(), &[5]);
    assert!(log.is_empty());
    assert!(machine.memory().log().is_empty());

    let (mut empty, mut log) = machine_with(&[]);
    assert_eq!(
      empty.push(Address(0), &mut log),
      Err(Fault::StackUnderflow { required: 1, available: 0 })
    );
  }

  #[test]
  fn load_into_a_full_stack_overflows() {
    let mut machine = Machine::new(1, 4);
    let mut log = InstructionLog::new();
    machine.push_immediate(1, &mut log).unwrap();
    machine.push(Address(0), &mut log).unwrap();
    machine.push_immediate(2, &mut log).unwrap();
    assert_eq!(machine.pop(Address(0), &mut log), Err(Fault::StackOverflow { capacity: 1 }));
    assert!(machine.memory().is_occupied(Address(0)));
  }

  #[test]
  fn input_and_print_go_through_the_frontend() {
    let (mut machine, mut log) = machine_with(&[]);
    let mut frontend = ScriptedFrontend::with_inputs(vec![Some(42), None]);

    assert_eq!(machine.input(&mut frontend, &mut log), Ok(42));
    assert_eq!(machine.input(&mut frontend, &mut log), Err(Fault::InputCancelled));
    assert_eq!(machine.stack().values(), &[42]);

    assert_eq!(machine.print(&mut frontend, &mut log), Ok(42));
    assert_eq!(frontend.shown, vec![42]);
    assert!(machine.stack().is_empty());
    assert_eq!(log.lines(), vec!["INPUT    42", "PRINT    42"]);
  }

  #[test]
  fn dup_checks_room_then_contents() {
    let (mut machine, mut log) = machine_with(&[]);
    assert_eq!(machine.dup(&mut log), Err(Fault::StackUnderflow { required: 1, available: 0 }));

    let mut full = Machine::new(1, 1);
    full.push_immediate(6, &mut log).unwrap();
    assert_eq!(full.dup(&mut log), Err(Fault::StackOverflow { capacity: 1 }));

    let (mut machine, mut log) = machine_with(&[6]);
    assert_eq!(machine.dup(&mut log), Ok(6));
    assert_eq!(machine.stack().values(), &[6, 6]);
  }

  #[test]
  fn halt_empties_the_stack() {
    let (mut machine, mut log) = machine_with(&[1, 2, 3]);
    machine.push(Address(0), &mut log).unwrap();
    machine.halt(&mut log);
    assert!(machine.stack().is_empty());
    assert_eq!(log.last(), Some(&LogEntry::bare(Opcode::Halt)));
    assert!(machine.memory().log().is_empty());
    assert_eq!(machine.memory().peek(Address(0)), Some(3));
  }

  #[test]
  fn combined_resize_is_all_or_nothing() {
    let (mut machine, _log) = machine_with(&[1, 2, 3]);
    assert!(machine.resize(4, 20000).is_err());
    assert_eq!(machine.stack().max_size(), 8);
    machine.resize(3, 32).unwrap();
    assert_eq!(machine.stack().max_size(), 3);
    assert_eq!(machine.memory().max_mem_size(), 32);
  }

  #[test]
  fn display_shows_both_stores() {
    let (mut machine, mut log) = machine_with(&[11, 22]);
    machine.push(Address(5), &mut log).unwrap();
    let text = machine.to_string();
    assert!(text.starts_with("Stack: 1/8 (12%)"));
    assert!(text.contains("* --> S[0] ="));
    assert!(text.contains("M[5] ="));
  }
}
