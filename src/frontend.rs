/*!
  The machine never talks to a user directly. Anything that would need a dialog (reporting a
  fault, asking for an integer, showing a printed value) goes through a `Frontend` supplied by
  the caller. Every call is synchronous: `INPUT` blocks until `request_integer` returns.
*/

use crate::error::FaultKind;
use crate::instruction::Word;

pub trait Frontend {
  /// Surfaces a fault. The machine has already abandoned the offending instruction.
  fn report(&mut self, kind: FaultKind, message: &str);

  /// Asks for one signed integer. `None` means the user cancelled.
  fn request_integer(&mut self, prompt: &str) -> Option<Word>;

  /// Shows a value discarded by `PRINT`.
  fn show(&mut self, value: Word);

  /// An informational message that is not a fault, such as a cancellation notice.
  fn notice(&mut self, message: &str) {
    self.report(FaultKind::Cancellation, message);
  }
}

/**
  A frontend that answers input requests from a queue and records everything else. Useful for
  driving the machine from a script and for tests.
*/
#[derive(Clone, Default, Debug)]
pub struct ScriptedFrontend {
  pub inputs  : Vec<Option<Word>>,
  pub reports : Vec<(FaultKind, String)>,
  pub shown   : Vec<Word>,
  pub notices : Vec<String>
}

impl ScriptedFrontend {
  pub fn new() -> ScriptedFrontend {
    ScriptedFrontend::default()
  }

  /// Queues answers for successive input requests, first answer first.
  pub fn with_inputs(inputs: Vec<Option<Word>>) -> ScriptedFrontend {
    ScriptedFrontend { inputs, ..ScriptedFrontend::default() }
  }
}

impl Frontend for ScriptedFrontend {
  fn report(&mut self, kind: FaultKind, message: &str) {
    self.reports.push((kind, message.to_string()));
  }

  fn request_integer(&mut self, _prompt: &str) -> Option<Word> {
    match self.inputs.is_empty() {
      true  => None,
      false => self.inputs.remove(0)
    }
  }

  fn show(&mut self, value: Word) {
    self.shown.push(value);
  }

  fn notice(&mut self, message: &str) {
    self.notices.push(message.to_string());
  }
}
