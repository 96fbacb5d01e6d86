/*!
  The memory bank: a fixed-length run of addressable slots, independent from the stack, plus a
  human readable log of every transfer into or out of it.

  Only the `Machine` holds a `Memory`, and only the `PUSH` and `POP` instructions move values in
  and out of it.
*/

use crate::address::Address;
use crate::cell::{Cell, MemorySlot};
use crate::error::Fault;
use crate::instruction::Word;

/// Absolute ceiling for the configured number of slots.
pub const MAX_POSSIBLE_MEM_SIZE: usize = 10000;
pub const DEFAULT_MEM_SIZE: usize = 256;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Memory {
  cells : Vec<Cell>,
  log   : Vec<String>
}

impl Memory {
  /// Creates a bank of empty slots. Sizes above the ceiling are clamped to it.
  pub fn new(max_mem_size: usize) -> Memory {
    Memory {
      cells : vec![Cell::Empty; max_mem_size.min(MAX_POSSIBLE_MEM_SIZE)],
      log   : Vec::new()
    }
  }

  // region Queries

  pub fn max_mem_size(&self) -> usize {
    self.cells.len()
  }

  /// Fails unless `address` names a slot of the bank.
  pub fn check_address(&self, address: Address) -> Result<(), Fault> {
    match address.idx() < self.cells.len() {
      true  => Ok(()),
      false => Err(Fault::InvalidAddress { address, size: self.cells.len() })
    }
  }

  pub fn is_occupied(&self, address: Address) -> bool {
    self.cells
        .get(address.idx())
        .map_or(false, Cell::is_occupied)
  }

  /// Reads a slot without disturbing it.
  pub fn peek(&self, address: Address) -> Option<Word> {
    self.cells.get(address.idx()).and_then(Cell::value)
  }

  pub fn slot(&self, address: Address) -> Option<MemorySlot> {
    self.cells
        .get(address.idx())
        .map(|cell| MemorySlot::new(address, *cell))
  }

  pub fn occupied_slots(&self) -> impl Iterator<Item = MemorySlot> + '_ {
    self.cells
        .iter()
        .enumerate()
        .filter(|(_, cell)| cell.is_occupied())
        .map(|(i, cell)| MemorySlot::new(Address(i), *cell))
  }

  pub fn occupied_count(&self) -> usize {
    self.cells.iter().filter(|cell| cell.is_occupied()).count()
  }

  /// One past the highest occupied address; the smallest size that keeps every value.
  pub fn high_water_mark(&self) -> usize {
    self.cells
        .iter()
        .rposition(Cell::is_occupied)
        .map_or(0, |i| i + 1)
  }

  /// The memory operation log, oldest first.
  pub fn log(&self) -> &[String] {
    &self.log
  }

  // endregion

  // region Mutation

  /// Writes `value` into the slot at `address`, marking it occupied.
  pub fn store(&mut self, address: Address, value: Word) -> Result<(), Fault> {
    self.check_address(address)?;
    self.cells[address.idx()] = Cell::Value(value);
    self.log.push(format!("Address {} pushed in memory the value: {}", address.idx(), value));
    Ok(())
  }

  /// Takes the value out of the slot at `address`, leaving the slot empty.
  pub fn load(&mut self, address: Address) -> Result<Word, Fault> {
    self.check_address(address)?;
    let value = self.cells[address.idx()].value().ok_or(Fault::EmptySlot(address))?;
    self.cells[address.idx()] = Cell::Empty;
    self.log.push(
      format!(
        "Address {} removed the value {} from the memory and pushed it to the stack",
        address.idx(),
        value
      )
    );
    Ok(value)
  }

  pub fn clear_log(&mut self) {
    self.log.clear();
  }

  /// Empties every slot. The bank keeps its size.
  pub fn clear(&mut self) {
    for cell in self.cells.iter_mut() {
      *cell = Cell::Empty;
    }
  }

  /**
    Changes the number of slots. Growth is honored up to the ceiling. A shrink is refused only
    when it would cut off an occupied slot, so no live value is ever lost.
  */
  pub fn resize(&mut self, new_size: usize) -> Result<(), Fault> {
    self.check_resize(new_size)?;
    self.cells.resize(new_size, Cell::Empty);
    Ok(())
  }

  /// Validates a resize request without applying it.
  pub fn check_resize(&self, new_size: usize) -> Result<(), Fault> {
    if new_size > MAX_POSSIBLE_MEM_SIZE {
      return Err(Fault::CeilingExceeded { requested: new_size, ceiling: MAX_POSSIBLE_MEM_SIZE });
    }
    let needed = self.high_water_mark();
    if new_size < self.cells.len() && new_size < needed {
      return Err(Fault::ShrinkBelowOccupancy { requested: new_size, occupied: needed });
    }
    Ok(())
  }

  // endregion
}

impl Default for Memory {
  fn default() -> Memory {
    Memory::new(DEFAULT_MEM_SIZE)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn store_then_load_empties_the_slot() {
    let mut memory = Memory::new(4);
    memory.store(Address(2), 99).unwrap();
    assert!(memory.is_occupied(Address(2)));
    assert_eq!(memory.peek(Address(2)), Some(99));
    assert_eq!(memory.load(Address(2)), Ok(99));
    assert!(!memory.is_occupied(Address(2)));
    assert_eq!(memory.load(Address(2)), Err(Fault::EmptySlot(Address(2))));
    assert_eq!(
      memory.log(),
      &[
        "Address 2 pushed in memory the value: 99".to_string(),
        "Address 2 removed the value 99 from the memory and pushed it to the stack".to_string()
      ]
    );
  }

  #[test]
  fn out_of_range_addresses_are_rejected() {
    let mut memory = Memory::new(4);
    assert_eq!(memory.store(Address(4), 1), Err(Fault::InvalidAddress { address: Address(4), size: 4 }));
    assert!(memory.log().is_empty());
    assert_eq!(memory.slot(Address(4)), None);
  }

  #[test]
  fn resize_never_cuts_off_an_occupied_slot() {
    let mut memory = Memory::new(16);
    memory.store(Address(9), 7).unwrap();
    assert_eq!(memory.resize(5), Err(Fault::ShrinkBelowOccupancy { requested: 5, occupied: 10 }));
    memory.resize(10).unwrap();
    assert_eq!(memory.max_mem_size(), 10);
    assert_eq!(memory.peek(Address(9)), Some(7));
    memory.resize(64).unwrap();
    assert_eq!(memory.max_mem_size(), 64);
    assert_eq!(memory.occupied_count(), 1);
    assert!(memory.resize(MAX_POSSIBLE_MEM_SIZE + 1).is_err());
  }

  #[test]
  fn occupied_slots_reports_addresses() {
    let mut memory = Memory::new(8);
    memory.store(Address(1), -4).unwrap();
    memory.store(Address(6), 12).unwrap();
    let slots: Vec<MemorySlot> = memory.occupied_slots().collect();
    assert_eq!(slots.len(), 2);
    assert_eq!(slots[1], MemorySlot { address: Address(6), value: 12, occupied: true });
    memory.clear();
    assert_eq!(memory.occupied_count(), 0);
  }
}
