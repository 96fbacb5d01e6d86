/*!
  Machine configuration. Every field is optional in a JSON configuration file and falls back to
  the program defaults:

  ```json
  { "stack_size": 16, "memory_size": 256, "asm_path": "export.asm", "cpp_path": "export.cpp" }
  ```
*/

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::machine::Machine;
use crate::memory::{DEFAULT_MEM_SIZE, MAX_POSSIBLE_MEM_SIZE};
use crate::stack::{DEFAULT_SIZE, MAX_POSSIBLE_SIZE};

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineConfig {
  #[serde(default = "MachineConfig::default_stack_size")]
  pub stack_size  : usize,
  #[serde(default = "MachineConfig::default_memory_size")]
  pub memory_size : usize,
  #[serde(default = "MachineConfig::default_asm_path")]
  pub asm_path    : PathBuf,
  #[serde(default = "MachineConfig::default_cpp_path")]
  pub cpp_path    : PathBuf
}

impl MachineConfig {
  fn default_stack_size() -> usize {
    DEFAULT_SIZE
  }

  fn default_memory_size() -> usize {
    DEFAULT_MEM_SIZE
  }

  fn default_asm_path() -> PathBuf {
    PathBuf::from("export.asm")
  }

  fn default_cpp_path() -> PathBuf {
    PathBuf::from("export.cpp")
  }

  pub fn from_json_str(text: &str) -> Result<MachineConfig, ConfigError> {
    let config: MachineConfig = serde_json::from_str(text)?;
    config.validate()?;
    Ok(config)
  }

  pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<MachineConfig, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    MachineConfig::from_json_str(&text)
  }

  /// Both sizes must be within the machine's ceilings.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.stack_size > MAX_POSSIBLE_SIZE {
      return Err(
        ConfigError::OutOfRange { field: "stack_size", value: self.stack_size, ceiling: MAX_POSSIBLE_SIZE }
      );
    }
    if self.memory_size > MAX_POSSIBLE_MEM_SIZE {
      return Err(
        ConfigError::OutOfRange { field: "memory_size", value: self.memory_size, ceiling: MAX_POSSIBLE_MEM_SIZE }
      );
    }
    Ok(())
  }

  /// A fresh machine with the configured bounds.
  pub fn build_machine(&self) -> Machine {
    Machine::new(self.stack_size, self.memory_size)
  }
}

impl Default for MachineConfig {
  fn default() -> MachineConfig {
    MachineConfig {
      stack_size  : MachineConfig::default_stack_size(),
      memory_size : MachineConfig::default_memory_size(),
      asm_path    : MachineConfig::default_asm_path(),
      cpp_path    : MachineConfig::default_cpp_path()
    }
  }
}
