/*!
  Command-line driver for the stack interpreter.

  Reads one command per line, from standard input or from a script file:

  ```text
  PUSHI 5          an opcode by name, with its argument if it takes one
  0 5              the same instruction by selector index
  POP 1f           PUSH and POP take a hexadecimal address
  show             machine state tables
  log | memlog     the instruction log, the memory operation log
  resize 32 512    new stack and memory bounds, applied together or not at all
  export asm [path]
  export cpp [path]
  clear log | memlog | stack | memory
  quit
  ```

  `INPUT` reads its value from the next line of the same source.
*/

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::Parser;
use log::{error, info, warn};

use stack_interpreter::{
  AssemblyGenerator,
  CodeGenerator,
  ConfigError,
  CppGenerator,
  Dispatcher,
  ExportError,
  FaultKind,
  Frontend,
  Machine,
  MachineConfig,
  Opcode,
  Word
};

#[derive(Parser, Debug)]
#[command(name = "stackint", version, about = "A stack machine with a separate memory bank and a translatable instruction log")]
struct Cli {
  /// Maximum number of values on the stack.
  #[arg(long)]
  stack_size: Option<usize>,

  /// Number of addressable memory slots.
  #[arg(long)]
  memory_size: Option<usize>,

  /// JSON configuration file.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Read commands from this file instead of standard input.
  #[arg(short, long)]
  script: Option<PathBuf>,

  /// More log output; repeat for more.
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8
}

/// A frontend on a line-oriented text stream.
struct ConsoleFrontend {
  input       : Box<dyn BufRead>,
  interactive : bool
}

impl ConsoleFrontend {
  fn next_line(&mut self) -> Option<String> {
    let mut line = String::new();
    match self.input.read_line(&mut line) {
      Ok(0)  => None,
      Ok(_)  => Some(line.trim().to_string()),
      Err(e) => {
        error!("could not read input: {}", e);
        None
      }
    }
  }

  fn prompt(&self, text: &str) {
    if self.interactive {
      if let Err(e) = show_prompt(&mut io::stdout(), text) {
        warn!("could not show the prompt: {}", e);
      }
    }
  }
}

/// Writes `text` without a trailing newline and flushes it so it is visible before input.
fn show_prompt<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
  out.write_all(text.as_bytes())?;
  out.flush()
}

impl Frontend for ConsoleFrontend {
  fn report(&mut self, kind: FaultKind, message: &str) {
    eprintln!("{} error: {}", kind, message);
  }

  // An empty line or end of input cancels.
  fn request_integer(&mut self, prompt: &str) -> Option<Word> {
    loop {
      self.prompt(format!("{}: ", prompt).as_str());
      let line = self.next_line()?;
      if line.is_empty() {
        return None;
      }
      match line.parse::<Word>() {
        Ok(value) => return Some(value),
        Err(_)    => eprintln!("`{}` is not a number", line)
      }
    }
  }

  fn show(&mut self, value: Word) {
    println!("{}", value);
  }

  fn notice(&mut self, message: &str) {
    println!("{}", message);
  }
}

struct Session {
  machine    : Machine,
  dispatcher : Dispatcher,
  config     : MachineConfig,
  frontend   : ConsoleFrontend
}

impl Session {
  fn run(&mut self) {
    loop {
      self.frontend.prompt("> ");
      let line = match self.frontend.next_line() {
        Some(line) => line,
        None       => break
      };
      if line.is_empty() || line.starts_with('#') {
        continue;
      }
      if !self.command(&line) {
        break;
      }
    }
  }

  /// Runs one command line. Returns false when the session should end.
  fn command(&mut self, line: &str) -> bool {
    let (head, rest) = match line.find(char::is_whitespace) {
      Some(i) => (&line[..i], line[i..].trim()),
      None    => (line, "")
    };
    let words: Vec<&str> = rest.split_whitespace().collect();

    match head.to_ascii_lowercase().as_str() {

      | "quit"
      | "exit" => return false,

      "help" => print_help(),

      "show" => println!("{}", self.machine),

      "log" => {
        for line in self.dispatcher.log().lines() {
          println!("{}", line);
        }
      }

      "memlog" => {
        for line in self.machine.memory().log() {
          println!("{}", line);
        }
      }

      "resize" => self.resize(&words),

      "export" => self.export(&words),

      "clear" => {
        match words.first().copied() {
          Some("log")    => self.dispatcher.clear_log(),
          Some("memlog") => self.machine.clear_memory_log(),
          Some("stack")  => self.machine.clear_stack(),
          Some("memory") => self.machine.clear_memory(),
          _              => eprintln!("clear what? log, memlog, stack or memory")
        }
      }

      _ => self.instruction(head, rest)

    }
    true
  }

  fn instruction(&mut self, head: &str, argument: &str) {
    let selection = match head.parse::<u8>() {
      Ok(selection) => selection,
      Err(_) => {
        match Opcode::from_str(&head.to_ascii_uppercase()) {
          Ok(opcode) if opcode.is_selectable() => opcode.code(),
          _ => {
            eprintln!("unknown command `{}`, try `help`", head);
            return;
          }
        }
      }
    };
    self.dispatcher.run(&mut self.machine, selection, argument, &mut self.frontend);
  }

  fn resize(&mut self, words: &[&str]) {
    let sizes: Vec<usize> = words.iter().filter_map(|w| w.parse::<usize>().ok()).collect();
    if sizes.len() != 2 || words.len() != 2 {
      eprintln!("usage: resize <stack size> <memory size>");
      return;
    }
    if let Err(fault) = self.machine.resize(sizes[0], sizes[1]) {
      self.frontend.report(fault.kind(), &fault.to_string());
    }
  }

  fn export(&mut self, words: &[&str]) {
    let lines = self.dispatcher.log().lines();
    let path = words.get(1).map(PathBuf::from);

    let result = match words.first().copied() {
      Some("asm") => {
        let path = path.unwrap_or_else(|| self.config.asm_path.clone());
        export(AssemblyGenerator, &lines, &path)
      }
      Some("cpp") => {
        let path = path.unwrap_or_else(|| self.config.cpp_path.clone());
        export(CppGenerator, &lines, &path)
      }
      _ => {
        eprintln!("usage: export asm|cpp [path]");
        return;
      }
    };

    if let Err(e) = result {
      self.frontend.report(e.kind(), &e.to_string());
    }
  }
}

fn export<G: CodeGenerator>(generator: G, lines: &[String], path: &Path) -> Result<(), ExportError> {
  generator.export_to_file(lines, path)?;
  println!("{} program written to {}", generator.target(), path.display());
  Ok(())
}

fn print_help() {
  println!("instructions:");
  for opcode in Opcode::selectable() {
    let argument = match opcode {
      _ if !opcode.takes_argument() => "",
      Opcode::PushImmediate         => " <decimal>",
      _                             => " <hex address>"
    };
    println!("  {:>2}  {}{}", opcode.code(), opcode, argument);
  }
  println!("commands: show, log, memlog, resize <stack> <memory>, export asm|cpp [path],");
  println!("          clear log|memlog|stack|memory, help, quit");
}

fn load_config(cli: &Cli) -> Result<MachineConfig, ConfigError> {
  let mut config = match &cli.config {
    Some(path) => MachineConfig::from_json_file(path)?,
    None       => MachineConfig::default()
  };
  if let Some(size) = cli.stack_size {
    config.stack_size = size;
  }
  if let Some(size) = cli.memory_size {
    config.memory_size = size;
  }
  config.validate()?;
  Ok(config)
}

fn main() {
  let cli = Cli::parse();

  let level = match cli.verbose {
    0 => "warn",
    1 => "info",
    _ => "debug"
  };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

  #[cfg(feature = "trace_computation")]
  info!("computation tracing enabled");

  let config = match load_config(&cli) {
    Ok(config) => config,
    Err(e) => {
      error!("{}", e);
      process::exit(1);
    }
  };
  info!("stack size {}, memory size {}", config.stack_size, config.memory_size);

  let frontend = match &cli.script {
    Some(path) => {
      match File::open(path) {
        Ok(file) => ConsoleFrontend { input: Box::new(BufReader::new(file)), interactive: false },
        Err(e) => {
          error!("could not open script {}: {}", path.display(), e);
          process::exit(1);
        }
      }
    }
    None => ConsoleFrontend { input: Box::new(BufReader::new(io::stdin())), interactive: true }
  };

  let mut session = Session {
    machine    : config.build_machine(),
    dispatcher : Dispatcher::new(),
    config,
    frontend
  };
  session.run();
}
