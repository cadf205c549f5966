//////////////////////////////////////////////////////////////
/// Control flow and defining words
///
/// Control flow is realised by scanning the token stream: there is no
/// compiled jump table. Branch words walk the frame's cursor forward
/// to their matching terminator; loop words store back edges on the
/// control stack and rewind the cursor to re-enter the body.
///
/// Loop frame layout on the control stack, bottom to top:
///
///     [ limit, index, start ]
///
/// `do` pushes it, `loop` / `+loop` pop and conditionally re-push it,
/// `leave` discards it, and `i` / `j` peek at fixed offsets into it.
/// All six words depend on this exact shape.
///
/// The words that consume their argument from the stream (`:`,
/// `variable`, `ref`, `include`) also live here.
///
use crate::internals::dictionary::Binding;
use crate::internals::tokenizer::Frame;
use crate::kernel::Value;
use crate::runtime::{ForthError, ForthRuntime};

impl ForthRuntime {
    // ------------------------------------------------------------------
    // defining and stream-consuming words

    /// : ( -- ) reads a name and a body up to the next `;` from the
    /// stream and installs the body, whitespace-joined, as a user word.
    /// Definitions do not nest.
    pub fn f_colon(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let name = match frame.next_token() {
            Some(token) => token.to_string(),
            None => {
                self.msg.error(":", "definition name missing", None::<i64>);
                return Err(ForthError::MissingArgument(":"));
            }
        };
        let mut body: Vec<String> = Vec::new();
        loop {
            match frame.next_token() {
                Some(";") => break,
                Some(token) => body.push(token.to_string()),
                None => {
                    self.msg.error(":", "definition has no ';'", Some(&name));
                    return Err(ForthError::UnterminatedDefinition(name));
                }
            }
        }
        self.install(&name, Binding::UserWord(body.join(" ")));
        Ok(())
    }

    /// variable ( -- ) reads a name, allots a zero-initialised heap
    /// cell, and binds the name to a reference to it
    pub fn f_variable(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let name = match frame.next_token() {
            Some(token) => token.to_string(),
            None => {
                self.msg
                    .error("variable", "variable name missing", None::<i64>);
                return Err(ForthError::MissingArgument("variable"));
            }
        };
        match self.define_variable(&name, Value::Int(0)) {
            Some(_) => Ok(()),
            None => Err(ForthError::HeapExhausted),
        }
    }

    /// ref ( -- a ) reads a base-10 index from the stream and pushes it
    /// as a reference
    pub fn f_ref(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let token = match frame.next_token() {
            Some(token) => token,
            None => {
                self.msg.error("ref", "reference literal missing", None::<i64>);
                return Err(ForthError::MissingArgument("ref"));
            }
        };
        match token.parse::<usize>() {
            Ok(idx) => self.push(Value::Ref(idx)),
            Err(_) => {
                let text = token.to_string();
                self.msg
                    .error("ref", "malformed reference literal", Some(&text));
                Err(ForthError::BadReference(text))
            }
        }
    }

    /// include ( -- ) reads a path from the stream and evaluates that
    /// file in the current interpreter
    pub fn f_include(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let path = match frame.next_token() {
            Some(token) => token.to_string(),
            None => {
                self.msg.error("include", "file name missing", None::<i64>);
                return Err(ForthError::MissingArgument("include"));
            }
        };
        self.import_file(&path)
    }

    // ------------------------------------------------------------------
    // conditionals

    /// if ( f -- ) falls through on true; on false, skips forward to
    /// the matching `then`, or to an `else` belonging to this `if`
    pub fn f_if(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let condition = self.pop()?;
        if condition.truthy() {
            return Ok(());
        }
        let mut depth = 1i64;
        loop {
            match frame.next_token() {
                Some("if") => depth += 1,
                Some("then") => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some("else") if depth == 1 => break,
                Some(_) => {}
                None => break,
            }
        }
        Ok(())
    }

    /// else ( -- ) reached only after a true branch: skips forward to
    /// the matching `then`
    pub fn f_else(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let mut depth = 1i64;
        loop {
            match frame.next_token() {
                Some("if") => depth += 1,
                Some("then") => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some(_) => {}
                None => break,
            }
        }
        Ok(())
    }

    /// then ( -- ) branch target marker
    pub fn f_then(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        Ok(())
    }

    // ------------------------------------------------------------------
    // indefinite loops

    /// begin ( -- ) pushes the back edge: one token before `begin`, so
    /// the cursor increment on reentry executes `begin` again and the
    /// frame is re-pushed each time round
    pub fn f_begin(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        self.cpush(Value::Ref(frame.cursor.wrapping_sub(1)))
    }

    /// again ( -- ) jumps back unconditionally
    pub fn f_again(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let start = self.cpop()?;
        frame.cursor = start.addr();
        Ok(())
    }

    /// until ( f -- ) jumps back while f is zero; either way the back
    /// edge is popped (`begin` restores it on reentry)
    pub fn f_until(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let condition = self.pop()?;
        let start = self.cpop()?;
        if !condition.truthy() {
            frame.cursor = start.addr();
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // counted loops

    /// do ( limit index -- ) pushes the loop frame; the start is the
    /// cursor at `do` so the jump back lands on the first body token
    pub fn f_do(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let index = self.pop()?;
        let limit = self.pop()?;
        self.cpush(limit)?;
        self.cpush(index)?;
        self.cpush(Value::Ref(frame.cursor))
    }

    /// loop ( -- ) bumps the index by one and re-enters the body while
    /// index < limit; on exit the frame stays popped
    pub fn f_loop(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let start = self.cpop()?;
        let index = self.cpop()?;
        let limit = self.cpop()?;
        let next = index.int().wrapping_add(1);
        if next < limit.int() {
            self.cpush(limit)?;
            self.cpush(Value::Int(next))?;
            self.cpush(start)?;
            frame.cursor = start.addr();
        }
        Ok(())
    }

    /// +loop ( inc -- ) adds inc to the index; continues while the
    /// index is still approaching the limit from inc's direction
    pub fn f_plus_loop(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let inc = self.pop()?.int();
        let start = self.cpop()?;
        let index = self.cpop()?;
        let limit = self.cpop()?;
        let next = index.int().wrapping_add(inc);
        if (inc > 0 && next < limit.int()) || (inc < 0 && next > limit.int()) {
            self.cpush(limit)?;
            self.cpush(Value::Int(next))?;
            self.cpush(start)?;
            frame.cursor = start.addr();
        }
        Ok(())
    }

    /// leave ( -- ) exits the innermost loop: skips forward to the
    /// loop's own `loop` / `+loop` (tracking nested `do`s on the way)
    /// and discards the frame
    pub fn f_leave(&mut self, frame: &mut Frame) -> Result<(), ForthError> {
        let mut depth = 0i64;
        loop {
            match frame.next_token() {
                Some("do") => depth += 1,
                Some("loop") | Some("+loop") => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                Some(_) => {}
                None => break,
            }
        }
        self.cpop()?;
        self.cpop()?;
        self.cpop()?;
        Ok(())
    }

    /// i ( -- n ) pushes the innermost loop index
    pub fn f_i(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let index = self.cpeek(2)?;
        self.push(index)
    }

    /// j ( -- n ) pushes the next-outer loop index
    pub fn f_j(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let index = self.cpeek(5)?;
        self.push(index)
    }
}

//////////////////////////////////////////
/// TESTS
///
#[cfg(test)]
mod tests {
    use super::*;

    fn rt() -> ForthRuntime {
        ForthRuntime::new(128, 128)
    }

    fn ints(rt: &ForthRuntime) -> Vec<i64> {
        rt.stack().iter().map(|v| v.int()).collect()
    }

    #[test]
    fn test_if_true_falls_through() {
        let mut rt = rt();
        rt.eval("-1 if 1 then 2").unwrap();
        assert_eq!(ints(&rt), vec![1, 2]);
    }

    #[test]
    fn test_if_false_skips_to_then() {
        let mut rt = rt();
        rt.eval("0 if 1 then 2").unwrap();
        assert_eq!(ints(&rt), vec![2]);
    }

    #[test]
    fn test_if_else_both_branches() {
        let mut rt = rt();
        rt.eval("-1 if 10 else 20 then").unwrap();
        rt.eval("0 if 10 else 20 then").unwrap();
        assert_eq!(ints(&rt), vec![10, 20]);
    }

    #[test]
    fn test_nested_if_in_false_branch() {
        let mut rt = rt();
        // the inner if/then must not capture the outer skip
        rt.eval("0 if 0 if 1 then 2 then 3").unwrap();
        assert_eq!(ints(&rt), vec![3]);
    }

    #[test]
    fn test_nested_if_inside_else_skip() {
        let mut rt = rt();
        rt.eval("-1 if 1 else 0 if 2 then 3 then 4").unwrap();
        assert_eq!(ints(&rt), vec![1, 4]);
    }

    #[test]
    fn test_nested_else_matches_inner_if() {
        let mut rt = rt();
        rt.eval("0 if 1 else -1 if 2 else 3 then 4 then 5").unwrap();
        assert_eq!(ints(&rt), vec![2, 4, 5]);
    }

    #[test]
    fn test_begin_again_with_leave_style_exit() {
        let mut rt = rt();
        // until exits; again is exercised through a bounded count
        rt.eval("0 begin 1+ dup 10 = until").unwrap();
        assert_eq!(ints(&rt), vec![10]);
    }

    #[test]
    fn test_begin_as_first_token() {
        let mut rt = rt();
        rt.eval("begin 1 until").unwrap();
        assert_eq!(ints(&rt), Vec::<i64>::new());
    }

    #[test]
    fn test_do_loop_counts() {
        let mut rt = rt();
        rt.eval("3 0 do i loop").unwrap();
        assert_eq!(ints(&rt), vec![0, 1, 2]);
    }

    #[test]
    fn test_do_loop_nonzero_start() {
        let mut rt = rt();
        rt.eval("7 4 do i loop").unwrap();
        assert_eq!(ints(&rt), vec![4, 5, 6]);
    }

    #[test]
    fn test_plus_loop_step_two() {
        let mut rt = rt();
        rt.eval("10 0 do i 2 +loop").unwrap();
        assert_eq!(ints(&rt), vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_plus_loop_negative_step() {
        let mut rt = rt();
        rt.eval("0 10 do i -2 +loop").unwrap();
        assert_eq!(ints(&rt), vec![10, 8, 6, 4, 2]);
    }

    #[test]
    fn test_nested_loops_j() {
        let mut rt = rt();
        rt.eval("2 0 do 2 0 do j i loop loop").unwrap();
        assert_eq!(ints(&rt), vec![0, 0, 0, 1, 1, 0, 1, 1]);
    }

    #[test]
    fn test_leave_skips_rest_of_body() {
        let mut rt = rt();
        rt.eval("10 0 do i i 3 = if leave then loop").unwrap();
        assert_eq!(ints(&rt), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_leave_skips_nested_loop_in_body() {
        let mut rt = rt();
        // the scan must pass over the inner do/loop pair
        rt.eval("5 0 do leave 2 0 do i loop loop 42").unwrap();
        assert_eq!(ints(&rt), vec![42]);
    }

    #[test]
    fn test_loop_frame_cleared_after_exit() {
        let mut rt = rt();
        rt.eval("2 0 do i loop").unwrap();
        assert_eq!(rt.control_stack.depth(), 0);
    }

    #[test]
    fn test_colon_consumes_to_semicolon() {
        let mut rt = rt();
        rt.eval(": add3 1 + 2 + ; 10 add3").unwrap();
        assert_eq!(ints(&rt), vec![13]);
    }

    #[test]
    fn test_colon_without_semicolon_aborts() {
        let mut rt = rt();
        let result = rt.eval(": broken 1 2 +");
        assert_eq!(
            result,
            Err(ForthError::UnterminatedDefinition("broken".to_string()))
        );
        assert_eq!(rt.eval("1"), Ok(()));
        assert!(rt.eval("broken").is_err());
    }

    #[test]
    fn test_colon_without_name_aborts() {
        let mut rt = rt();
        assert_eq!(rt.eval(":"), Err(ForthError::MissingArgument(":")));
    }

    #[test]
    fn test_variable_allots_distinct_cells() {
        let mut rt = rt();
        rt.eval("variable a variable b a b").unwrap();
        match rt.stack() {
            [Value::Ref(a), Value::Ref(b)] => assert_ne!(a, b),
            other => panic!("unexpected stack: {:?}", other),
        }
    }

    #[test]
    fn test_ref_pushes_reference() {
        let mut rt = rt();
        rt.eval("ref 12").unwrap();
        assert_eq!(rt.stack(), &[Value::Ref(12)]);
    }

    #[test]
    fn test_ref_malformed_aborts_without_pushing() {
        let mut rt = rt();
        let result = rt.eval("ref banana");
        assert_eq!(result, Err(ForthError::BadReference("banana".to_string())));
        assert!(rt.stack().is_empty());
    }

    #[test]
    fn test_ref_missing_argument() {
        let mut rt = rt();
        assert_eq!(rt.eval("ref"), Err(ForthError::MissingArgument("ref")));
    }

    #[test]
    fn test_i_outside_loop_aborts() {
        let mut rt = rt();
        assert_eq!(rt.eval("i"), Err(ForthError::ControlUnderflow));
    }

    #[test]
    fn test_include_missing_file_is_skipped() {
        let mut rt = rt();
        rt.eval("1 include /no/such/file.fs 2").unwrap();
        assert_eq!(ints(&rt), vec![1, 2]);
    }
}
