//! The address of a slot in the memory bank, with hexadecimal decoding for user input.

use std::fmt::{Display, Formatter};

use crate::error::Fault;

// `AddressNumberType` is `usize`, as it is naturally an index into the memory bank.
pub type AddressNumberType = usize;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct Address(pub AddressNumberType);

impl Address {
  /// Converts the address to an index into the memory bank.
  pub fn idx(&self) -> AddressNumberType {
    self.0
  }

  /**
    Decodes an address typed by the user. Addresses are always written in hexadecimal,
    optionally prefixed with `0x`. Surrounding whitespace is ignored; a sign is not accepted.
  */
  pub fn from_hex(text: &str) -> Result<Address, Fault> {
    let trimmed = text.trim();
    let digits =
      match trimmed.strip_prefix("0x").or_else(|| trimmed.strip_prefix("0X")) {
        Some(rest) => rest,
        None       => trimmed
      };

    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
      return Err(Fault::InvalidHexadecimal(text.to_string()));
    }

    AddressNumberType::from_str_radix(digits, 16)
      .map(Address)
      .map_err(|_| Fault::InvalidHexadecimal(text.to_string()))
  }

  /// Byte offset of this slot when memory is laid out as consecutive 4 byte words.
  pub fn byte_offset(&self) -> AddressNumberType {
    self.0 * 4
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "M[0x{:X}]", self.0)
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_plain_and_prefixed_hex() {
    assert_eq!(Address::from_hex("1f").unwrap(), Address(31));
    assert_eq!(Address::from_hex("0x1F").unwrap(), Address(31));
    assert_eq!(Address::from_hex("  A ").unwrap(), Address(10));
    assert_eq!(Address::from_hex("0").unwrap(), Address(0));
  }

  #[test]
  fn rejects_malformed_hex() {
    for text in &["", "0x", "-1", "+2", "g", "12 34", "1.5"] {
      match Address::from_hex(text) {
        Err(Fault::InvalidHexadecimal(t)) => assert_eq!(&t, text),
        other => panic!("{:?} decoded to {:?}", text, other)
      }
    }
  }

  #[test]
  fn display_and_offsets() {
    let address = Address(0x2b);
    assert_eq!(address.to_string(), "M[0x2B]");
    assert_eq!(address.byte_offset(), 172);
  }
}
