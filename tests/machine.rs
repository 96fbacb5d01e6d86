//! Behaviour of the machine driven through the dispatcher, the way a frontend drives it.

use proptest::prelude::*;
use rstest::rstest;

use stack_interpreter::{
  Address,
  Dispatcher,
  Fault,
  FaultKind,
  Machine,
  Opcode,
  ScriptedFrontend
};

fn run(machine: &mut Machine, dispatcher: &mut Dispatcher, frontend: &mut ScriptedFrontend, script: &[(Opcode, &str)]) {
  for (opcode, raw) in script {
    dispatcher.run(machine, opcode.code(), raw, frontend);
  }
}

#[rstest]
#[case(Opcode::Add, 7, -2, 5)]
#[case(Opcode::Sub, 7, -2, 9)]
#[case(Opcode::Mul, 7, -2, -14)]
#[case(Opcode::Div, 7, -2, -3)]
#[case(Opcode::Div, -7, 2, -3)]
#[case(Opcode::Add, i32::MAX, 1, i32::MIN)]
fn arithmetic_uses_second_op_top(#[case] opcode: Opcode, #[case] second: i32, #[case] top: i32, #[case] expected: i32) {
  let mut machine = Machine::default();
  let mut dispatcher = Dispatcher::new();
  let mut frontend = ScriptedFrontend::new();

  let (second, top) = (second.to_string(), top.to_string());
  run(
    &mut machine,
    &mut dispatcher,
    &mut frontend,
    &[(Opcode::PushImmediate, second.as_str()), (Opcode::PushImmediate, top.as_str()), (opcode, "")]
  );

  assert_eq!(machine.stack().values(), &[expected]);
  assert_eq!(
    dispatcher.log().lines().last().cloned(),
    Some(format!("{}    {} {}", opcode, top, second))
  );
  assert!(frontend.reports.is_empty());
}

#[rstest]
#[case(&[], Opcode::Add, FaultKind::State)]
#[case(&["1"], Opcode::Swap, FaultKind::State)]
#[case(&["1", "0"], Opcode::Div, FaultKind::Arithmetic)]
#[case(&[], Opcode::Print, FaultKind::State)]
#[case(&[], Opcode::Dup, FaultKind::State)]
#[case(&["1", "2"], Opcode::PushImmediate, FaultKind::Capacity)]
fn refused_instructions_change_nothing(#[case] setup: &[&str], #[case] opcode: Opcode, #[case] kind: FaultKind) {
  let mut machine = Machine::new(2, 4);
  let mut dispatcher = Dispatcher::new();
  let mut frontend = ScriptedFrontend::new();

  for raw in setup {
    dispatcher.run(&mut machine, Opcode::PushImmediate.code(), raw, &mut frontend);
  }
  let stack_before = machine.stack().clone();
  let log_before = dispatcher.log().clone();

  dispatcher.run(&mut machine, opcode.code(), "3", &mut frontend);

  assert_eq!(machine.stack(), &stack_before);
  assert_eq!(dispatcher.log(), &log_before);
  assert_eq!(frontend.reports.len(), 1);
  assert_eq!(frontend.reports[0].0, kind);
}

#[test]
fn values_round_trip_through_memory() {
  let mut machine = Machine::default();
  let mut dispatcher = Dispatcher::new();
  let mut frontend = ScriptedFrontend::new();

  run(
    &mut machine,
    &mut dispatcher,
    &mut frontend,
    &[(Opcode::PushImmediate, "4"), (Opcode::PushImmediate, "42"), (Opcode::Push, "1F")]
  );
  assert_eq!(machine.stack().values(), &[4]);
  assert_eq!(machine.memory().peek(Address(0x1f)), Some(42));

  run(&mut machine, &mut dispatcher, &mut frontend, &[(Opcode::Pop, "1f")]);
  assert_eq!(machine.stack().values(), &[4, 42]);
  assert!(!machine.memory().is_occupied(Address(0x1f)));
  assert_eq!(
    dispatcher.log().lines(),
    vec!["PUSHI    4", "PUSHI    42", "PUSH    31 42", "POP    31"]
  );
  assert_eq!(machine.memory().log().len(), 2);
}

#[test]
fn memory_faults_are_state_faults() {
  let mut machine = Machine::new(4, 16);
  let mut dispatcher = Dispatcher::new();
  let mut frontend = ScriptedFrontend::new();

  run(
    &mut machine,
    &mut dispatcher,
    &mut frontend,
    &[(Opcode::PushImmediate, "1"), (Opcode::Push, "10"), (Opcode::Pop, "3")]
  );

  assert_eq!(
    frontend.reports,
    vec![
      (FaultKind::State, Fault::InvalidAddress { address: Address(16), size: 16 }.to_string()),
      (FaultKind::State, Fault::EmptySlot(Address(3)).to_string())
    ]
  );
  assert_eq!(machine.stack().values(), &[1]);
}

#[test]
fn input_and_print_go_through_the_frontend() {
  let mut machine = Machine::default();
  let mut dispatcher = Dispatcher::new();
  let mut frontend = ScriptedFrontend::with_inputs(vec![Some(-8), None]);

  run(
    &mut machine,
    &mut dispatcher,
    &mut frontend,
    &[(Opcode::Input, ""), (Opcode::Input, ""), (Opcode::Dup, ""), (Opcode::Print, "")]
  );

  assert_eq!(frontend.shown, vec![-8]);
  assert_eq!(frontend.notices.len(), 1);
  assert!(frontend.reports.is_empty());
  assert_eq!(machine.stack().values(), &[-8]);
  assert_eq!(dispatcher.log().lines(), vec!["INPUT    -8", "DUP    -8", "PRINT    -8"]);
}

#[test]
fn resize_applies_both_bounds_or_neither() {
  let mut machine = Machine::new(8, 16);
  machine.resize(4, 32).unwrap();
  assert_eq!((machine.stack().max_size(), machine.memory().max_mem_size()), (4, 32));

  assert!(machine.resize(6, 10001).is_err());
  assert_eq!((machine.stack().max_size(), machine.memory().max_mem_size()), (4, 32));
}

proptest! {
  #[test]
  fn stack_never_exceeds_its_bound(bound in 0usize..12, pushes in 0usize..24) {
    let mut machine = Machine::new(bound, 4);
    let mut dispatcher = Dispatcher::new();
    let mut frontend = ScriptedFrontend::new();

    for i in 0..pushes {
      dispatcher.run(&mut machine, Opcode::PushImmediate.code(), &i.to_string(), &mut frontend);
    }

    prop_assert_eq!(machine.stack().len(), pushes.min(bound));
    prop_assert_eq!(dispatcher.log().len(), pushes.min(bound));
    prop_assert_eq!(frontend.reports.len(), pushes.saturating_sub(bound));
  }

  #[test]
  fn subtraction_order_matches_pushes(a in any::<i32>(), b in any::<i32>()) {
    let mut machine = Machine::default();
    let mut dispatcher = Dispatcher::new();
    let mut frontend = ScriptedFrontend::new();

    for value in &[a, b] {
      dispatcher.run(&mut machine, Opcode::PushImmediate.code(), &value.to_string(), &mut frontend);
    }
    dispatcher.run(&mut machine, Opcode::Sub.code(), "", &mut frontend);

    prop_assert_eq!(machine.stack().values(), &[a.wrapping_sub(b)]);
  }

  #[test]
  fn stack_shrink_never_drops_values(count in 0usize..10, new_size in 0usize..20) {
    let mut machine = Machine::new(10, 4);
    let mut dispatcher = Dispatcher::new();
    let mut frontend = ScriptedFrontend::new();
    for i in 0..count {
      dispatcher.run(&mut machine, Opcode::PushImmediate.code(), &i.to_string(), &mut frontend);
    }

    let accepted = machine.resize_stack(new_size).is_ok();

    prop_assert_eq!(accepted, new_size >= 10 || new_size >= count);
    prop_assert_eq!(machine.stack().len(), count);
    prop_assert!(machine.stack().len() <= machine.stack().max_size() || !accepted);
  }
}
