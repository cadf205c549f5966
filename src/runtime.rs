//////////////////////////////////////////////////////////////////
/// runtime.rs
///
/// Interpreter runtime state.
///
/// ForthRuntime owns the two stacks, the heap, the dictionary and the
/// output/error sinks, and provides the embedded API a host program
/// uses: construct with capacities, define words and variables,
/// register foreign functions, evaluate source text.
///
/// Builtin words are methods on this struct, spread across the
/// internals modules; register_all_builtins links each one to its name
/// in the dictionary.
///
use crate::internals::dictionary::{Binding, BuiltinFn, Dictionary, FfiFn};
use crate::internals::messages::Msg;
use crate::internals::tokenizer::Frame;
use crate::kernel::{Heap, Stack, Value};
use crate::files;
use std::fmt;
use std::io::{self, Write};

/// Faults that abort the evaluation in flight. Each is reported through
/// the message channel where it is detected; the variant then unwinds
/// the nested eval calls. Exit carries `bye`/`throw` termination out to
/// the process boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ForthError {
    UndefinedWord(String),
    StackUnderflow,
    StackOverflow,
    ControlUnderflow,
    ControlOverflow,
    DivisionByZero,
    BadReference(String),
    MissingArgument(&'static str),
    UnterminatedDefinition(String),
    HeapExhausted,
    Exit(i64),
}

impl fmt::Display for ForthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForthError::UndefinedWord(word) => write!(f, "word '{}' undefined", word),
            ForthError::StackUnderflow => write!(f, "data stack underflow"),
            ForthError::StackOverflow => write!(f, "data stack overflow"),
            ForthError::ControlUnderflow => write!(f, "control stack underflow"),
            ForthError::ControlOverflow => write!(f, "control stack overflow"),
            ForthError::DivisionByZero => write!(f, "division by zero"),
            ForthError::BadReference(text) => write!(f, "bad reference '{}'", text),
            ForthError::MissingArgument(word) => write!(f, "'{}' needs a following token", word),
            ForthError::UnterminatedDefinition(name) => {
                write!(f, "definition of '{}' has no ';'", name)
            }
            ForthError::HeapExhausted => write!(f, "heap exhausted"),
            ForthError::Exit(code) => write!(f, "exit with status {}", code),
        }
    }
}

impl std::error::Error for ForthError {}

pub struct ForthRuntime {
    pub(crate) data_stack: Stack,
    pub(crate) control_stack: Stack,
    pub(crate) heap: Heap,
    pub(crate) dictionary: Dictionary,
    pub(crate) out: Box<dyn Write>,
    pub msg: Msg,
}

impl ForthRuntime {
    /// Create an interpreter with the given stack and heap capacities
    /// (in cells) and the full builtin vocabulary installed. Both
    /// stacks get the same capacity.
    pub fn new(stack_size: usize, heap_size: usize) -> ForthRuntime {
        let mut runtime = ForthRuntime {
            data_stack: Stack::new(stack_size),
            control_stack: Stack::new(stack_size),
            heap: Heap::new(heap_size),
            dictionary: Dictionary::new(),
            out: Box::new(io::stdout()),
            msg: Msg::new(),
        };
        runtime.register_all_builtins();
        runtime
    }

    /// Replace the output sink (all builtin output goes through it).
    pub fn set_output(&mut self, sink: Box<dyn Write>) {
        self.out = sink;
    }

    /// Replace the error sink (all diagnostics go through it).
    pub fn set_error_output(&mut self, sink: Box<dyn Write>) {
        self.msg.set_sink(sink);
    }

    /// The data stack contents, bottom first. For host inspection.
    pub fn stack(&self) -> &[Value] {
        self.data_stack.contents()
    }

    /// Define a user word from a name and a definition string.
    pub fn define_word(&mut self, name: &str, definition: &str) {
        self.install(name, Binding::UserWord(definition.to_string()));
    }

    /// Register a foreign function under a name.
    pub fn add_ffi_function(&mut self, name: &str, code: FfiFn) {
        self.install(name, Binding::Ffi(code));
    }

    /// Define a named variable: allots a heap cell, stores the initial
    /// value there, and binds the name to a reference to that cell.
    /// Returns the cell's index so the host can read it back.
    pub fn define_variable(&mut self, name: &str, val: Value) -> Option<usize> {
        let addr = match self.heap.allot() {
            Some(addr) => addr,
            None => {
                self.msg.error("variable", "heap exhausted", Some(name));
                return None;
            }
        };
        self.heap.set(addr, val);
        self.install(name, Binding::Variable(Value::Ref(addr)));
        Some(addr)
    }

    /// Read a heap cell. For host access to variables defined with
    /// define_variable.
    pub fn heap_value(&self, addr: usize) -> Option<Value> {
        self.heap.get(addr)
    }

    /// Write a heap cell.
    pub fn set_heap_value(&mut self, addr: usize, val: Value) -> bool {
        self.heap.set(addr, val)
    }

    /// Evaluate a file by path. An unreadable file is reported and
    /// skipped; evaluation faults inside the file propagate.
    pub fn import_file(&mut self, path: &str) -> Result<(), ForthError> {
        match files::read_source(path) {
            Ok(source) => self.eval(&source),
            Err(err) => {
                self.msg
                    .error("include", "cannot open file", Some((path, err.to_string())));
                Ok(())
            }
        }
    }

    /// install places a binding in the dictionary, warning when it
    /// replaces an existing word.
    pub(crate) fn install(&mut self, name: &str, binding: Binding) {
        if self.dictionary.define(name, binding) {
            self.msg.warning("define", "redefining word", Some(name));
        }
    }

    // ------------------------------------------------------------------
    // stack access for builtins and foreign functions

    pub fn push(&mut self, val: Value) -> Result<(), ForthError> {
        if self.data_stack.push(val) {
            Ok(())
        } else {
            self.msg.error("push", "data stack overflow", None::<i64>);
            Err(ForthError::StackOverflow)
        }
    }

    pub fn pop(&mut self) -> Result<Value, ForthError> {
        match self.data_stack.pop() {
            Some(val) => Ok(val),
            None => {
                self.msg.error("pop", "data stack underflow", None::<i64>);
                Err(ForthError::StackUnderflow)
            }
        }
    }

    pub fn peek(&mut self, n: usize) -> Result<Value, ForthError> {
        match self.data_stack.peek_n(n) {
            Some(val) => Ok(val),
            None => {
                self.msg.error("peek", "data stack underflow", None::<i64>);
                Err(ForthError::StackUnderflow)
            }
        }
    }

    pub(crate) fn cpush(&mut self, val: Value) -> Result<(), ForthError> {
        if self.control_stack.push(val) {
            Ok(())
        } else {
            self.msg.error("control", "control stack overflow", None::<i64>);
            Err(ForthError::ControlOverflow)
        }
    }

    pub(crate) fn cpop(&mut self) -> Result<Value, ForthError> {
        match self.control_stack.pop() {
            Some(val) => Ok(val),
            None => {
                self.msg
                    .error("control", "control stack underflow", None::<i64>);
                Err(ForthError::ControlUnderflow)
            }
        }
    }

    pub(crate) fn cpeek(&mut self, n: usize) -> Result<Value, ForthError> {
        match self.control_stack.peek_n(n) {
            Some(val) => Ok(val),
            None => {
                self.msg
                    .error("control", "control stack underflow", None::<i64>);
                Err(ForthError::ControlUnderflow)
            }
        }
    }

    /// pop2_push1 pops j then k (k was pushed first) and pushes f(k, j).
    pub(crate) fn pop2_push1(
        &mut self,
        f: impl Fn(i64, i64) -> i64,
    ) -> Result<(), ForthError> {
        let j = self.pop()?.int();
        let k = self.pop()?.int();
        self.push(Value::Int(f(k, j)))
    }

    pub(crate) fn pop1_push1(&mut self, f: impl Fn(i64) -> i64) -> Result<(), ForthError> {
        let x = self.pop()?.int();
        self.push(Value::Int(f(x)))
    }

    // ------------------------------------------------------------------
    // output helpers

    pub(crate) fn print_str(&mut self, text: &str) {
        let _ = self.out.write_all(text.as_bytes());
    }

    pub(crate) fn print_fmt(&mut self, args: fmt::Arguments) {
        let _ = self.out.write_fmt(args);
    }

    /// print_value formats a cell by tag, with a trailing space.
    pub(crate) fn print_value(&mut self, val: Value) {
        match val {
            Value::Int(n) => self.print_fmt(format_args!("{} ", n)),
            Value::Float(x) => self.print_fmt(format_args!("{:.6} ", x)),
            Value::Ref(r) => self.print_fmt(format_args!("{} ", r)),
        }
    }

    pub(crate) fn flush(&mut self) {
        let _ = self.out.flush();
    }

    // ------------------------------------------------------------------
    // builtin registry

    fn add_builtin(&mut self, name: &str, code: BuiltinFn) {
        self.dictionary.define(name, Binding::Builtin(code));
    }

    /// Set up all the words that are implemented in Rust.
    fn register_all_builtins(&mut self) {
        self.add_builtin(":", ForthRuntime::f_colon);
        self.add_builtin("dup", ForthRuntime::f_dup);
        self.add_builtin("drop", ForthRuntime::f_drop);
        self.add_builtin("swap", ForthRuntime::f_swap);
        self.add_builtin("over", ForthRuntime::f_over);
        self.add_builtin("rot", ForthRuntime::f_rot);
        self.add_builtin("pick", ForthRuntime::f_pick);
        self.add_builtin("roll", ForthRuntime::f_roll);
        self.add_builtin("?dup", ForthRuntime::f_q_dup);
        self.add_builtin("depth", ForthRuntime::f_depth);
        self.add_builtin("<", ForthRuntime::f_less);
        self.add_builtin("=", ForthRuntime::f_equal);
        self.add_builtin(">", ForthRuntime::f_greater);
        self.add_builtin(">=", ForthRuntime::f_greater_equal);
        self.add_builtin("<=", ForthRuntime::f_less_equal);
        self.add_builtin("0<", ForthRuntime::f_0less);
        self.add_builtin("0=", ForthRuntime::f_0equal);
        self.add_builtin("0>", ForthRuntime::f_0greater);
        self.add_builtin("not", ForthRuntime::f_not);
        self.add_builtin("+", ForthRuntime::f_plus);
        self.add_builtin("-", ForthRuntime::f_minus);
        self.add_builtin("1+", ForthRuntime::f_add1);
        self.add_builtin("1-", ForthRuntime::f_sub1);
        self.add_builtin("2+", ForthRuntime::f_add2);
        self.add_builtin("2-", ForthRuntime::f_sub2);
        self.add_builtin("*", ForthRuntime::f_times);
        self.add_builtin("/", ForthRuntime::f_divide);
        self.add_builtin("mod", ForthRuntime::f_mod);
        self.add_builtin("/mod", ForthRuntime::f_divmod);
        self.add_builtin("max", ForthRuntime::f_max);
        self.add_builtin("min", ForthRuntime::f_min);
        self.add_builtin("abs", ForthRuntime::f_abs);
        self.add_builtin("negate", ForthRuntime::f_negate);
        self.add_builtin("and", ForthRuntime::f_and);
        self.add_builtin("or", ForthRuntime::f_or);
        self.add_builtin("xor", ForthRuntime::f_xor);
        self.add_builtin("lshift", ForthRuntime::f_lshift);
        self.add_builtin("rshift", ForthRuntime::f_rshift);
        self.add_builtin("@", ForthRuntime::f_get);
        self.add_builtin("!", ForthRuntime::f_store);
        self.add_builtin("?", ForthRuntime::f_question);
        self.add_builtin("do", ForthRuntime::f_do);
        self.add_builtin("loop", ForthRuntime::f_loop);
        self.add_builtin("+loop", ForthRuntime::f_plus_loop);
        self.add_builtin("leave", ForthRuntime::f_leave);
        self.add_builtin("i", ForthRuntime::f_i);
        self.add_builtin("j", ForthRuntime::f_j);
        self.add_builtin("if", ForthRuntime::f_if);
        self.add_builtin("else", ForthRuntime::f_else);
        self.add_builtin("then", ForthRuntime::f_then);
        self.add_builtin("begin", ForthRuntime::f_begin);
        self.add_builtin("again", ForthRuntime::f_again);
        self.add_builtin("until", ForthRuntime::f_until);
        self.add_builtin("cr", ForthRuntime::f_cr);
        self.add_builtin("emit", ForthRuntime::f_emit);
        self.add_builtin("space", ForthRuntime::f_space);
        self.add_builtin("spaces", ForthRuntime::f_spaces);
        self.add_builtin("page", ForthRuntime::f_page);
        self.add_builtin("dump", ForthRuntime::f_dump);
        self.add_builtin(".", ForthRuntime::f_dot);
        self.add_builtin("variable", ForthRuntime::f_variable);
        self.add_builtin("include", ForthRuntime::f_include);
        self.add_builtin("ref", ForthRuntime::f_ref);
        self.add_builtin("d>f", ForthRuntime::f_d_to_f);
        self.add_builtin("f>d", ForthRuntime::f_f_to_d);
        self.add_builtin("f+", ForthRuntime::f_fadd);
        self.add_builtin("f-", ForthRuntime::f_fsub);
        self.add_builtin("f*", ForthRuntime::f_fmul);
        self.add_builtin("f/", ForthRuntime::f_fdiv);
        self.add_builtin("fnegate", ForthRuntime::f_fnegate);
        self.add_builtin("fabs", ForthRuntime::f_fabs);
        self.add_builtin("fmax", ForthRuntime::f_fmax);
        self.add_builtin("fmin", ForthRuntime::f_fmin);
        self.add_builtin("floor", ForthRuntime::f_floor);
        self.add_builtin("fround", ForthRuntime::f_fround);
        self.add_builtin("f**", ForthRuntime::f_fpow);
        self.add_builtin("1/f", ForthRuntime::f_finv);
        self.add_builtin("f2/", ForthRuntime::f_fhalf);
        self.add_builtin("fsin", ForthRuntime::f_fsin);
        self.add_builtin("fcos", ForthRuntime::f_fcos);
        self.add_builtin("fsincos", ForthRuntime::f_fsincos);
        self.add_builtin("ftan", ForthRuntime::f_ftan);
        self.add_builtin("fasin", ForthRuntime::f_fasin);
        self.add_builtin("facos", ForthRuntime::f_facos);
        self.add_builtin("fatan", ForthRuntime::f_fatan);
        self.add_builtin("fatan2", ForthRuntime::f_fatan2);
        self.add_builtin("pi", ForthRuntime::f_pi);
        self.add_builtin("f~rel", ForthRuntime::f_fapprox_rel);
        self.add_builtin("f~abs", ForthRuntime::f_fapprox_abs);
        self.add_builtin("f~", ForthRuntime::f_fapprox);
        self.add_builtin("f=", ForthRuntime::f_feq);
        self.add_builtin("f<>", ForthRuntime::f_fne);
        self.add_builtin("f<", ForthRuntime::f_flt);
        self.add_builtin("f<=", ForthRuntime::f_fle);
        self.add_builtin("f>", ForthRuntime::f_fgt);
        self.add_builtin("f>=", ForthRuntime::f_fge);
        self.add_builtin("f0<", ForthRuntime::f_fltz);
        self.add_builtin("f0<=", ForthRuntime::f_flez);
        self.add_builtin("f0<>", ForthRuntime::f_fnez);
        self.add_builtin("f0=", ForthRuntime::f_feqz);
        self.add_builtin("f0>", ForthRuntime::f_fgtz);
        self.add_builtin("f0>=", ForthRuntime::f_fgez);
        self.add_builtin("bye", ForthRuntime::f_bye);
        self.add_builtin("throw", ForthRuntime::f_throw);
        self.add_builtin("dbg", ForthRuntime::f_dbg);
    }

    // ------------------------------------------------------------------
    // process words

    /// bye ( -- ) leaves the interpreter, exiting the host with status 0
    pub fn f_bye(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        Err(ForthError::Exit(0))
    }

    /// throw ( n -- ) exits the host with status n when n is nonzero
    pub fn f_throw(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let code = self.pop()?.int();
        if code != 0 {
            return Err(ForthError::Exit(code));
        }
        Ok(())
    }
}
