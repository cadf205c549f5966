/// Output words
///
/// Everything here writes through the interpreter's output sink, so a
/// host program can capture or redirect what the interpreted program
/// prints. Cells print by tag: integers and references as decimal,
/// floats with six decimal places, each followed by a space.
use crate::internals::terminal;
use crate::internals::tokenizer::Frame;
use crate::kernel::Value;
use crate::runtime::{ForthError, ForthRuntime};
use std::io::Write;

impl ForthRuntime {
    /// . ( v -- ) pops and prints the top of the stack by tag
    pub fn f_dot(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let val = self.pop()?;
        self.print_value(val);
        Ok(())
    }

    /// cr ( -- ) prints a newline
    pub fn f_cr(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.print_str("\n");
        Ok(())
    }

    /// emit ( c -- ) prints the low byte of the popped integer
    pub fn f_emit(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let byte = self.pop()?.int() as u8;
        let _ = self.out.write_all(&[byte]);
        Ok(())
    }

    /// space ( -- ) prints one blank
    pub fn f_space(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.print_str(" ");
        Ok(())
    }

    /// spaces ( n -- ) prints n blanks
    pub fn f_spaces(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let count = self.pop()?.int();
        for _ in 0..count.max(0) {
            self.print_str(" ");
        }
        Ok(())
    }

    /// page ( -- ) clears the screen and homes the cursor
    pub fn f_page(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        if let Err(err) = terminal::clear_screen(&mut self.out) {
            self.msg.error("page", "terminal error", Some(err.to_string()));
        }
        Ok(())
    }

    /// dump ( -- ) prints the whole data stack, top first, with tag
    /// annotations; the stack is left untouched
    pub fn f_dump(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let cells: Vec<Value> = self.data_stack.contents().to_vec();
        self.print_str("Stack dump: \n");
        for val in cells.iter().rev() {
            match val {
                Value::Int(n) => self.print_fmt(format_args!("{} (I64)\n", n)),
                Value::Float(x) => self.print_fmt(format_args!("{:.6} (F64)\n", x)),
                Value::Ref(r) => self.print_fmt(format_args!("{} (REF)\n", r)),
            }
        }
        self.flush();
        Ok(())
    }

    /// dbg ( n -- ) sets the diagnostic level: 0 errors only, 1 adds
    /// warnings, 2 adds info, anything higher adds debug chatter
    pub fn f_dbg(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        use crate::internals::messages::DebugLevel;
        match self.pop()?.int() {
            0 => self.msg.set_level(DebugLevel::Error),
            1 => self.msg.set_level(DebugLevel::Warning),
            2 => self.msg.set_level(DebugLevel::Info),
            _ => self.msg.set_level(DebugLevel::Debug),
        }
        Ok(())
    }
}
