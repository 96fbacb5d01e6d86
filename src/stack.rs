//! The bounded LIFO evaluation store. The top of the stack is the end of the vector.

use std::fmt::{Display, Formatter};

use crate::error::Fault;
use crate::instruction::Word;

/// Absolute ceiling for the configured stack bound.
pub const MAX_POSSIBLE_SIZE: usize = 10000;
pub const DEFAULT_SIZE: usize = 16;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Stack {
  values   : Vec<Word>,
  max_size : usize
}

impl Stack {
  /// Creates an empty stack. Bounds above the ceiling are clamped to it.
  pub fn new(max_size: usize) -> Stack {
    Stack {
      values   : Vec::new(),
      max_size : max_size.min(MAX_POSSIBLE_SIZE)
    }
  }

  // region Queries

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn is_full(&self) -> bool {
    self.values.len() >= self.max_size
  }

  pub fn max_size(&self) -> usize {
    self.max_size
  }

  pub fn top(&self) -> Option<Word> {
    self.values.last().copied()
  }

  /// The contents from bottom to top.
  pub fn values(&self) -> &[Word] {
    &self.values
  }

  /// How full the stack is, as a truncated percentage of the configured bound.
  pub fn usage_percent(&self) -> usize {
    match self.max_size {
      0 => 100,
      m => self.values.len() * 100 / m
    }
  }

  // endregion

  // region Guards

  /// Fails with an underflow unless at least `required` values are on the stack.
  pub fn require(&self, required: usize) -> Result<(), Fault> {
    match self.values.len() >= required {
      true  => Ok(()),
      false => Err(Fault::StackUnderflow { required, available: self.values.len() })
    }
  }

  /// Fails with an overflow unless one more value fits.
  pub fn require_room(&self) -> Result<(), Fault> {
    match self.is_full() {
      true  => Err(Fault::StackOverflow { capacity: self.max_size }),
      false => Ok(())
    }
  }

  // endregion

  // region Mutation

  pub fn push(&mut self, value: Word) -> Result<(), Fault> {
    self.require_room()?;
    self.values.push(value);
    Ok(())
  }

  pub fn pop(&mut self) -> Result<Word, Fault> {
    self.values
        .pop()
        .ok_or(Fault::StackUnderflow { required: 1, available: 0 })
  }

  pub fn clear(&mut self) {
    self.values.clear();
  }

  /**
    Changes the bound. Growth is honored up to the ceiling. A shrink is refused only when it
    would drop live values, that is when the new bound is below both the current bound and the
    number of values on the stack.
  */
  pub fn resize(&mut self, new_size: usize) -> Result<(), Fault> {
    self.check_resize(new_size)?;
    self.max_size = new_size;
    Ok(())
  }

  /// Validates a resize request without applying it.
  pub fn check_resize(&self, new_size: usize) -> Result<(), Fault> {
    if new_size > MAX_POSSIBLE_SIZE {
      return Err(Fault::CeilingExceeded { requested: new_size, ceiling: MAX_POSSIBLE_SIZE });
    }
    if new_size < self.max_size && new_size < self.values.len() {
      return Err(Fault::ShrinkBelowOccupancy { requested: new_size, occupied: self.values.len() });
    }
    Ok(())
  }

  // endregion
}

impl Default for Stack {
  fn default() -> Stack {
    Stack::new(DEFAULT_SIZE)
  }
}

// Bottom to top, `1 - 2 - 3` with `3` on top.
impl Display for Stack {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "{}",
      self.values
          .iter()
          .map(Word::to_string)
          .collect::<Vec<String>>()
          .join(" - ")
    )
  }
}
