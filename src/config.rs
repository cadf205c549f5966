// system configuration, command line processing, and the outer run loop

use ::clap::{arg, Command};
use crate::files;
use crate::internals::messages::DebugLevel;
use crate::kernel::Value;
use crate::runtime::{ForthError, ForthRuntime};
use std::io::{self, Write};

pub const VERSION: &str = "0.1.0";
pub const PROMPT: &str = "meili> ";
pub const DEFAULT_STACK_SIZE: usize = 4096;
pub const DEFAULT_HEAP_SIZE: usize = 4096;

pub struct Config {
    pub debug_level: DebugLevel,
    pub source_files: Vec<String>,
    pub stack_size: usize,
    pub heap_size: usize,
    pub run: bool,
}

impl Config {
    pub fn new() -> Config {
        Config {
            debug_level: DebugLevel::Error,
            source_files: Vec::new(),
            stack_size: DEFAULT_STACK_SIZE,
            heap_size: DEFAULT_HEAP_SIZE,
            run: true,
        }
    }

    /// process_args handles command line argument processing using the clap library
    ///
    pub fn process_args(&mut self) -> &Config {
        let arguments = Command::new("meili")
            .version(VERSION)
            .about("A stack-oriented Forth interpreter")
            .arg(arg!([files] ... "source files to evaluate in order").required(false))
            .arg(
                arg!(--debuglevel <VALUE>)
                    .required(false)
                    .value_parser(["error", "warning", "info", "debug"]),
            )
            .arg(arg!(--stacksize <CELLS>).required(false))
            .arg(arg!(--heapsize <CELLS>).required(false))
            .get_matches();

        let debuglevel = arguments.get_one::<String>("debuglevel");
        if let Some(debuglevel) = debuglevel {
            match debuglevel.as_str() {
                "debug" => self.debug_level = DebugLevel::Debug,
                "info" => self.debug_level = DebugLevel::Info,
                "warning" => self.debug_level = DebugLevel::Warning,
                _ => self.debug_level = DebugLevel::Error,
            }
        }

        if let Some(cells) = arguments.get_one::<String>("stacksize") {
            if let Ok(cells) = cells.parse::<usize>() {
                if cells > 0 {
                    self.stack_size = cells;
                }
            }
        }

        if let Some(cells) = arguments.get_one::<String>("heapsize") {
            if let Ok(cells) = cells.parse::<usize>() {
                if cells > 0 {
                    self.heap_size = cells;
                }
            }
        }

        if let Some(files) = arguments.get_many::<String>("files") {
            self.source_files = files.cloned().collect();
        }
        self
    }

    /// run_forth builds the interpreter and either evaluates the files
    /// named on the command line or drops into the interactive prompt.
    /// Returns the process exit status.
    pub fn run_forth(&self) -> i64 {
        let mut forth = ForthRuntime::new(self.stack_size, self.heap_size);
        forth.msg.set_level(self.debug_level);
        forth.add_ffi_function("rand", ffi_rand);

        if self.source_files.is_empty() {
            return repl(&mut forth);
        }
        for path in &self.source_files {
            match forth.import_file(path) {
                Err(ForthError::Exit(code)) => return code,
                // other faults were reported; keep going with the rest
                Err(_) | Ok(()) => {}
            }
        }
        0
    }
}

/// Example foreign function registered by the command-line wrapper:
/// rand ( -- n ) pushes a random non-negative integer
fn ffi_rand(forth: &mut ForthRuntime) {
    let n: u32 = rand::random();
    let _ = forth.push(Value::Int(n as i64));
}

/// The interactive prompt: one line per read, evaluated against the
/// shared interpreter, ` ok` echoed on success. Ends cleanly at end of
/// input; `bye` and `throw` carry their status out.
fn repl(forth: &mut ForthRuntime) -> i64 {
    loop {
        print!("{}", PROMPT);
        let _ = io::stdout().flush();
        let line = match files::get_line() {
            Some(line) => line,
            None => return 0,
        };
        match forth.eval(&line) {
            Ok(()) => println!(" ok"),
            Err(ForthError::Exit(code)) => return code,
            // already reported through the error sink
            Err(_) => {}
        }
    }
}
