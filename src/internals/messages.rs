// Message handling for interpreter diagnostics
//
// Errors always print; warning, info and debug messages are gated by the
// current level. All reports flow through a replaceable sink so a host
// program (or a test) can capture them; the default sink is stdout.

use std::fmt::Debug;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum DebugLevel {
    Error,
    Warning,
    Info,
    Debug,
}

pub struct Msg {
    level: DebugLevel,
    sink: Box<dyn Write>,
}

impl Msg {
    pub fn new() -> Msg {
        Msg {
            level: DebugLevel::Error,
            sink: Box::new(io::stdout()),
        }
    }

    pub fn set_level(&mut self, level: DebugLevel) {
        self.level = level;
    }

    pub fn get_level(&self) -> DebugLevel {
        self.level
    }

    pub fn set_sink(&mut self, sink: Box<dyn Write>) {
        self.sink = sink;
    }

    pub fn error<T: Debug>(&mut self, word: &str, text: &str, ctx: Option<T>) {
        self.emit("Error", word, text, ctx);
    }

    pub fn warning<T: Debug>(&mut self, word: &str, text: &str, ctx: Option<T>) {
        if self.level >= DebugLevel::Warning {
            self.emit("Warning", word, text, ctx);
        }
    }

    pub fn info<T: Debug>(&mut self, word: &str, text: &str, ctx: Option<T>) {
        if self.level >= DebugLevel::Info {
            self.emit("Info", word, text, ctx);
        }
    }

    pub fn debug<T: Debug>(&mut self, word: &str, text: &str, ctx: Option<T>) {
        if self.level >= DebugLevel::Debug {
            self.emit("Debug", word, text, ctx);
        }
    }

    fn emit<T: Debug>(&mut self, tag: &str, word: &str, text: &str, ctx: Option<T>) {
        let result = match ctx {
            Some(ctx) => writeln!(self.sink, "{}: {}: {} ({:?})", tag, word, text, ctx),
            None => writeln!(self.sink, "{}: {}: {}", tag, word, text),
        };
        if result.is_ok() {
            let _ = self.sink.flush();
        }
    }
}

//////////////////////////////////////////
/// TESTS
///
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct SharedSink(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured() -> (Msg, Rc<RefCell<Vec<u8>>>) {
        let buf = Rc::new(RefCell::new(Vec::new()));
        let mut msg = Msg::new();
        msg.set_sink(Box::new(SharedSink(buf.clone())));
        (msg, buf)
    }

    #[test]
    fn test_error_always_prints() {
        let (mut msg, buf) = captured();
        msg.error("word", "went wrong", None::<i64>);
        let text = String::from_utf8(buf.borrow().clone()).unwrap();
        assert_eq!(text, "Error: word: went wrong\n");
    }

    #[test]
    fn test_context_is_appended() {
        let (mut msg, buf) = captured();
        msg.error("@", "out of range", Some(99));
        let text = String::from_utf8(buf.borrow().clone()).unwrap();
        assert!(text.contains("(99)"));
    }

    #[test]
    fn test_warning_gated_by_level() {
        let (mut msg, buf) = captured();
        msg.warning("define", "redefining word", Some("x"));
        assert!(buf.borrow().is_empty());
        msg.set_level(DebugLevel::Warning);
        msg.warning("define", "redefining word", Some("x"));
        assert!(!buf.borrow().is_empty());
    }

    #[test]
    fn test_level_ordering() {
        assert!(DebugLevel::Debug > DebugLevel::Info);
        assert!(DebugLevel::Info > DebugLevel::Warning);
        assert!(DebugLevel::Warning > DebugLevel::Error);
    }
}
