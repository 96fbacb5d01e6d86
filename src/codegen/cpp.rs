/*!
  Translates a log into a C++ program built around a `std::stack<int>`.

  Binary entries pop into two temporaries, `v1` (the top) and `v2` (the one below it). The first
  binary entry of a program declares them and every later one reuses them.

  The target has no memory bank. `PUSH` becomes a plain `pop()`, and `POP` pushes the logged
  address in place of the value the slot held; both carry the address in a comment. A program
  whose result depends on a value cycled through memory will therefore differ from the machine.
*/

use crate::instruction::{LogEntry, Opcode, Operands};

use super::CodeGenerator;

const HEADER: &str = "#include <iostream>\n#include <stack>\n\nint main() {\n    std::stack<int> stack;\n";
const FOOTER: &str = "    return 0;\n}\n";

#[derive(Copy, Clone, Default, Debug)]
pub struct CppGenerator;

/// Per-translation state. Lives for one call to `translate`.
struct Emitter {
  buffer   : String,
  declared : bool
}

impl Emitter {
  fn new() -> Emitter {
    Emitter {
      buffer   : String::from(HEADER),
      declared : false
    }
  }

  fn line(&mut self, statement: &str) {
    self.buffer.push_str("    ");
    self.buffer.push_str(statement);
    self.buffer.push('\n');
  }

  /// Pops the two topmost values into `v1` and `v2`, declaring them the first time.
  fn take_operands(&mut self) {
    match self.declared {

      true => {
        self.line("v1 = stack.top(); stack.pop();");
        self.line("v2 = stack.top(); stack.pop();");
      }

      false => {
        self.line("int v1 = stack.top(); stack.pop();");
        self.line("int v2 = stack.top(); stack.pop();");
        self.declared = true;
      }

    }
  }

  fn arithmetic(&mut self, operator: char) {
    self.take_operands();
    self.line(format!("stack.push(v2 {} v1);", operator).as_str());
  }

  fn entry(&mut self, entry: &LogEntry) {
    match (entry.opcode, entry.operands) {

      | (Opcode::PushImmediate, Operands::One(value))
      | (Opcode::Input, Operands::One(value)) => {
        self.line(format!("stack.push({});", value).as_str());
      }

      | (Opcode::Push, Operands::One(address))
      | (Opcode::Push, Operands::Two(address, _)) => {
        self.line(format!("stack.pop(); // stored to memory address {}", address).as_str());
      }

      (Opcode::Pop, Operands::One(address)) => {
        self.line(
          format!("stack.push({0}); // loaded from memory address {0}, value not tracked", address).as_str()
        );
      }

      (Opcode::Add, _) => self.arithmetic('+'),
      (Opcode::Sub, _) => self.arithmetic('-'),
      (Opcode::Mul, _) => self.arithmetic('*'),
      (Opcode::Div, _) => self.arithmetic('/'),

      (Opcode::Swap, _) => {
        self.take_operands();
        self.line("stack.push(v1);");
        self.line("stack.push(v2);");
      }

      (Opcode::Dup, _) => {
        self.line("stack.push(stack.top());");
      }

      (Opcode::Print, _) => {
        self.line("std::cout << stack.top() << std::endl; stack.pop();");
      }

      (Opcode::Drop, _) => {
        self.line("stack.pop();");
      }

      (Opcode::Halt, _) => {
        self.line("while (!stack.empty()) stack.pop();");
      }

      _ => {}

    }
  }

  fn finish(mut self) -> String {
    self.buffer.push_str(FOOTER);
    self.buffer
  }
}

impl CodeGenerator for CppGenerator {
  fn target(&self) -> &'static str {
    "C++"
  }

  fn default_path(&self) -> &'static str {
    "export.cpp"
  }

  fn translate(&self, entries: &[LogEntry]) -> String {
    let mut emitter = Emitter::new();
    for entry in entries {
      emitter.entry(entry);
    }
    emitter.finish()
  }
}
