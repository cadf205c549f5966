//////////////////////////////////////////////////////////////
/// Evaluator
///
/// The outer interpreter: tokenise the source text, then walk the
/// token vector with a cursor. Each token is tried as an integer, then
/// as a float, then looked up in the dictionary and dispatched by
/// binding kind. Builtins get the frame by mutable borrow so the
/// control-flow words can move the cursor; user words re-evaluate
/// their stored definition string recursively, leaving the outer
/// cursor untouched.
///
use crate::internals::dictionary::Binding;
use crate::internals::tokenizer::{tokenize, Frame};
use crate::kernel::Value;
use crate::runtime::{ForthError, ForthRuntime};

/// parse_integer accepts a base-10 signed integer occupying the whole
/// token; anything else (including overflow) is rejected.
pub fn parse_integer(token: &str) -> Option<i64> {
    token.parse::<i64>().ok()
}

/// parse_float accepts whatever the standard float parser does, again
/// requiring the whole token to match.
pub fn parse_float(token: &str) -> Option<f64> {
    token.parse::<f64>().ok()
}

impl ForthRuntime {
    /// Evaluate a string of source text. Faults abort this call and
    /// unwind to the caller; the tokens allocated here are dropped on
    /// return either way.
    pub fn eval(&mut self, source: &str) -> Result<(), ForthError> {
        let mut frame = Frame::new(tokenize(source));

        while frame.cursor < frame.tokens.len() {
            let token = &frame.tokens[frame.cursor];

            if let Some(n) = parse_integer(token) {
                self.push(Value::Int(n))?;
            } else if let Some(x) = parse_float(token) {
                self.push(Value::Float(x))?;
            } else {
                let binding = match self.dictionary.lookup(token) {
                    Some(binding) => binding.clone(),
                    None => {
                        let word = token.clone();
                        self.msg.error("eval", "undefined word", Some(&word));
                        return Err(ForthError::UndefinedWord(word));
                    }
                };
                match binding {
                    Binding::Builtin(code) => code(self, &mut frame)?,
                    Binding::UserWord(definition) => self.eval(&definition)?,
                    Binding::Ffi(code) => code(self),
                    Binding::Variable(val) => self.push(val)?,
                }
            }

            // the back edge stored by `begin` may sit one below token
            // zero, so the increment wraps rather than overflows
            frame.cursor = frame.cursor.wrapping_add(1);
        }
        Ok(())
    }
}

//////////////////////////////////////////
/// TESTS
///
#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{FALSE, TRUE};

    fn rt() -> ForthRuntime {
        ForthRuntime::new(128, 128)
    }

    fn ints(rt: &ForthRuntime) -> Vec<i64> {
        rt.stack().iter().map(|v| v.int()).collect()
    }

    #[test]
    fn test_parse_integer_full_match_only() {
        assert_eq!(parse_integer("42"), Some(42));
        assert_eq!(parse_integer("-7"), Some(-7));
        assert_eq!(parse_integer("1+"), None);
        assert_eq!(parse_integer("12a"), None);
        assert_eq!(parse_integer(""), None);
    }

    #[test]
    fn test_parse_integer_rejects_overflow() {
        assert_eq!(parse_integer("9223372036854775807"), Some(i64::MAX));
        assert_eq!(parse_integer("9223372036854775808"), None);
    }

    #[test]
    fn test_parse_float_full_match_only() {
        assert_eq!(parse_float("2.5"), Some(2.5));
        assert_eq!(parse_float("-0.5"), Some(-0.5));
        assert_eq!(parse_float("2.5x"), None);
    }

    #[test]
    fn test_literals_push_by_tag() {
        let mut rt = rt();
        rt.eval("3 2.5").unwrap();
        assert_eq!(rt.stack(), &[Value::Int(3), Value::Float(2.5)]);
    }

    #[test]
    fn test_undefined_word_aborts() {
        let mut rt = rt();
        let result = rt.eval("1 nonsense 2");
        assert_eq!(result, Err(ForthError::UndefinedWord("nonsense".to_string())));
        // the fault aborted before 2 was pushed
        assert_eq!(ints(&rt), vec![1]);
    }

    #[test]
    fn test_arithmetic_scenario() {
        let mut rt = rt();
        rt.eval("1 2 3 + *").unwrap();
        assert_eq!(ints(&rt), vec![5]);
    }

    #[test]
    fn test_colon_definition_scenario() {
        let mut rt = rt();
        rt.eval(": square dup * ; 6 square").unwrap();
        assert_eq!(ints(&rt), vec![36]);
    }

    #[test]
    fn test_counted_loop_scenario() {
        let mut rt = rt();
        rt.eval("5 0 do i loop").unwrap();
        assert_eq!(ints(&rt), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_leave_scenario() {
        let mut rt = rt();
        rt.eval("10 0 do i 5 = if leave then loop 99").unwrap();
        assert_eq!(ints(&rt), vec![99]);
    }

    #[test]
    fn test_begin_until_scenario() {
        let mut rt = rt();
        rt.eval("0 begin 1+ dup 3 = until").unwrap();
        assert_eq!(ints(&rt), vec![3]);
    }

    #[test]
    fn test_recursive_factorial_scenario() {
        let mut rt = rt();
        rt.eval(": fact dup 1 > if dup 1 - fact * else drop 1 then ; 5 fact")
            .unwrap();
        assert_eq!(ints(&rt), vec![120]);
    }

    #[test]
    fn test_variable_scenario() {
        let mut rt = rt();
        rt.eval("variable x 42 x ! x @").unwrap();
        assert_eq!(ints(&rt), vec![42]);
    }

    #[test]
    fn test_float_scenario() {
        let mut rt = rt();
        rt.eval("3.0 4.0 f* 12.0 f=").unwrap();
        assert_eq!(ints(&rt), vec![TRUE]);
    }

    #[test]
    fn test_user_word_does_not_disturb_outer_cursor() {
        let mut rt = rt();
        rt.eval(": five 2 3 + ; five 10").unwrap();
        assert_eq!(ints(&rt), vec![5, 10]);
    }

    #[test]
    fn test_double_negation_equivalence() {
        let mut rt = rt();
        rt.eval("7 0= 0=").unwrap();
        rt.eval("7 not not").unwrap();
        assert_eq!(ints(&rt), vec![TRUE, TRUE]);
        rt.eval("0 0= 0=").unwrap();
        assert_eq!(rt.pop().unwrap().int(), FALSE);
    }

    #[test]
    fn test_comments_ignored_by_eval() {
        let mut rt = rt();
        rt.eval("1 ( push one ) 2 \\ and stop here\n+").unwrap();
        assert_eq!(ints(&rt), vec![3]);
    }

    #[test]
    fn test_redefinition_uses_new_binding() {
        let mut rt = rt();
        rt.eval(": w 1 ; : w 2 ; w").unwrap();
        assert_eq!(ints(&rt), vec![2]);
    }
}
