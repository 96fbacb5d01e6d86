/*!
  Turns a raw instruction selection plus its textual argument into an `InstructionRecord`, and
  routes records to the matching `Machine` method. The dispatcher owns the instruction log; the
  machine only ever sees it borrowed for the duration of one instruction.
*/

use log::{debug, warn};

use crate::address::Address;
use crate::error::{Fault, FaultKind};
use crate::frontend::Frontend;
use crate::instruction::{Argument, InstructionLog, InstructionRecord, Opcode, Word};
use crate::machine::Machine;

pub const CANCELLATION_NOTICE: &str = "Instruction canceled!";

#[derive(Clone, Default, Debug)]
pub struct Dispatcher {
  log: InstructionLog
}

impl Dispatcher {
  pub fn new() -> Dispatcher {
    Dispatcher { log: InstructionLog::new() }
  }

  pub fn log(&self) -> &InstructionLog {
    &self.log
  }

  pub fn clear_log(&mut self) {
    self.log.clear();
  }

  // region Decoding

  /**
    Decodes `raw` as the argument of `opcode`. `PUSHI` takes a decimal literal, `PUSH` and `POP`
    take a hexadecimal address, and every other opcode ignores `raw` entirely.
  */
  pub fn decode(opcode: Opcode, raw: &str) -> Result<InstructionRecord, Fault> {
    match opcode {

      Opcode::PushImmediate => {
        let value = raw.trim()
                       .parse::<Word>()
                       .map_err(|_| Fault::InvalidNumber(raw.to_string()))?;
        Ok(InstructionRecord::new(opcode, Argument::Immediate(value)))
      }

      | Opcode::Push
      | Opcode::Pop => {
        let address = Address::from_hex(raw)?;
        Ok(InstructionRecord::new(opcode, Argument::Address(address)))
      }

      _ => Ok(InstructionRecord::nullary(opcode))

    }
  }

  /// Like `decode`, with the opcode given by its selector index.
  pub fn decode_selection(selection: u8, raw: &str) -> Result<InstructionRecord, Fault> {
    match Opcode::try_from(selection) {
      Ok(opcode) if opcode.is_selectable() => Dispatcher::decode(opcode, raw),
      _                                    => Err(Fault::UnknownSelection(selection))
    }
  }

  /**
    Decodes a selection the way a menu-driven frontend needs it: a decode failure is reported
    right away and yields a record that executes as a no-op. An undecodable literal for `PUSHI`
    (or an unknown selection) yields the `ERROR` record; an undecodable address for `PUSH` or
    `POP` keeps the opcode but carries no address.
  */
  pub fn handle_instruction(selection: u8, raw: &str, frontend: &mut dyn Frontend) -> InstructionRecord {
    match Dispatcher::decode_selection(selection, raw) {

      Ok(record) => record,

      Err(fault) => {
        warn!("{}", fault);
        frontend.report(fault.kind(), &fault.to_string());
        match fault {
          Fault::InvalidHexadecimal(_) => {
            // The selection is known to be valid here.
            let opcode = Opcode::try_from(selection).unwrap_or(Opcode::Invalid);
            InstructionRecord::nullary(opcode)
          }
          _ => InstructionRecord::invalid()
        }
      }

    }
  }

  // endregion

  // region Execution

  /// Executes one record, returning the fault if the machine refused it.
  pub fn try_execute(
    &mut self,
    machine  : &mut Machine,
    record   : &InstructionRecord,
    frontend : &mut dyn Frontend
  ) -> Result<(), Fault>
  {
    debug!("executing {}", record);
    let log = &mut self.log;

    match (record.opcode, record.argument) {

      (Opcode::PushImmediate, Argument::Immediate(value)) => machine.push_immediate(value, log),
      (Opcode::Push, Argument::Address(address))         => machine.push(address, log),
      (Opcode::Pop,  Argument::Address(address))         => machine.pop(address, log),

      (Opcode::Input, _) => machine.input(frontend, log).map(|_| ()),
      (Opcode::Print, _) => machine.print(frontend, log).map(|_| ()),
      (Opcode::Add,   _) => machine.add(log).map(|_| ()),
      (Opcode::Sub,   _) => machine.sub(log).map(|_| ()),
      (Opcode::Mul,   _) => machine.mul(log).map(|_| ()),
      (Opcode::Div,   _) => machine.div(log).map(|_| ()),
      (Opcode::Swap,  _) => machine.swap(log),
      (Opcode::Drop,  _) => machine.drop_value(log).map(|_| ()),
      (Opcode::Dup,   _) => machine.dup(log).map(|_| ()),

      (Opcode::Halt,  _) => {
        machine.halt(log);
        log.clear();
        Ok(())
      }

      // `ERROR`, or an argument that failed to decode: nothing to do.
      _ => Ok(())

    }
  }

  /// Executes one record. Faults go to the frontend; the machine is ready for the next record.
  pub fn execute(&mut self, machine: &mut Machine, record: &InstructionRecord, frontend: &mut dyn Frontend) {
    if let Err(fault) = self.try_execute(machine, record, frontend) {
      match fault.kind() {

        FaultKind::Cancellation => {
          frontend.notice(CANCELLATION_NOTICE);
        }

        kind => {
          warn!("{} refused: {}", record.description, fault);
          frontend.report(kind, &fault.to_string());
        }

      }
    }

    #[cfg(feature = "trace_computation")] println!("{}", machine);
  }

  /// Decodes and executes a selection in one step.
  pub fn run(&mut self, machine: &mut Machine, selection: u8, raw: &str, frontend: &mut dyn Frontend) {
    let record = Dispatcher::handle_instruction(selection, raw, frontend);
    self.execute(machine, &record, frontend);
  }

  // endregion
}
