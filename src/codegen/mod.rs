/*!
  Code generators turn a finished instruction log into a standalone program that replays the
  logged computation. Two backends are provided:

  - `AssemblyGenerator`: x86-64 GNU assembler source, AT&T syntax, Linux entry point.
  - `CppGenerator`: C++ source driving a `std::stack<int>`.

  Both consume the log in its text encoding (one `LogEntry` per line), so a log saved to disk
  earlier can be translated just as well as a live one:

  ```ignore
  let program = CppGenerator.generate(&dispatcher.log().lines())?;
  AssemblyGenerator.export_to_file(&dispatcher.log().lines(), "export.asm")?;
  ```

  Translation is all or nothing. The whole log is parsed and rendered in memory before any file
  is touched. The program is then written to a temporary file beside the target and renamed over
  it once complete, so a failed write leaves the target as it was.
*/

mod assembly;
mod cpp;

use std::io::{self, Write};
use std::path::Path;

use log::{error, info};
use tempfile::NamedTempFile;

use crate::error::{ExportError, MalformedEntry};
use crate::instruction::LogEntry;

pub use assembly::AssemblyGenerator;
pub use cpp::CppGenerator;

pub trait CodeGenerator {
  /// Name of the target, used in log messages.
  fn target(&self) -> &'static str;

  /// The file name used when the caller does not supply one.
  fn default_path(&self) -> &'static str;

  /// Renders a parsed, non-empty, well formed log. Each call starts from a clean slate.
  fn translate(&self, entries: &[LogEntry]) -> String;

  /// Parses `lines` and renders the complete program.
  fn generate<S: AsRef<str>>(&self, lines: &[S]) -> Result<String, ExportError>
    where Self: Sized
  {
    let entries = parse_log(lines)?;
    Ok(self.translate(&entries))
  }

  /// Generates the program and writes it to `path`. On failure `path` is left as it was.
  fn export_to_file<S, P>(&self, lines: &[S], path: P) -> Result<(), ExportError>
    where Self : Sized,
          S    : AsRef<str>,
          P    : AsRef<Path>
  {
    let path = path.as_ref();
    let program = self.generate(lines)?;

    write_atomically(path, |out| out.write_all(program.as_bytes()))
      .map_err(|source| write_failure(self.target(), path, source))?;

    info!("exported {} entries as {} to {}", lines.len(), self.target(), path.display());
    Ok(())
  }
}

/**
  Parses every line of a log. An empty log is refused, and so is any line that is not a well
  formed entry; the error names the first offending line, counting from 1.
*/
pub fn parse_log<S: AsRef<str>>(lines: &[S]) -> Result<Vec<LogEntry>, ExportError> {
  if lines.is_empty() {
    return Err(ExportError::EmptyLog);
  }

  lines.iter()
       .enumerate()
       .map(
         |(i, line)| {
           let text: &str = line.as_ref();
           let malformed = || ExportError::MalformedEntry { line: i + 1, text: text.to_string() };
           match text.parse::<LogEntry>() {
             Ok(entry) if entry.is_well_formed() => Ok(entry),
             Ok(_)                              => Err(malformed()),
             Err(MalformedEntry(_))             => Err(malformed())
           }
         }
       )
       .collect()
}

/// Writes `path` through a temporary file in the same directory. The temporary is renamed into
/// place only after `fill` and the flush succeed, and is removed on any failure.
fn write_atomically<F>(path: &Path, fill: F) -> io::Result<()>
  where F: FnOnce(&mut dyn Write) -> io::Result<()>
{
  let directory = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new(".")
  };

  let mut staging = NamedTempFile::new_in(directory)?;
  let out: &mut dyn Write = staging.as_file_mut();
  fill(out)?;
  staging.as_file_mut().flush()?;
  staging.persist(path).map_err(|failed| failed.error)?;
  Ok(())
}

fn write_failure(target: &str, path: &Path, source: io::Error) -> ExportError {
  error!("{} export to {} failed: {}", target, path.display(), source);
  ExportError::Io { path: path.to_path_buf(), source }
}
