////////////////////////////
/// File: src/files.rs
///
/// Source input for the interpreter: whole-file loading for `include`
/// and the command line, and line reading for the interactive prompt.

use std::fs;
use std::io::{self, BufRead};

/// read_source loads an entire source file as text. The bytes are
/// converted lossily, so a stray non-UTF-8 byte cannot wedge an
/// otherwise good file.
pub fn read_source(path: &str) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// get_line reads one line from standard input, blocking until the
/// user provides one. None indicates end of input.
pub fn get_line() -> Option<String> {
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(_) => None,
    }
}
