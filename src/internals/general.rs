// General-purpose builtin words: stack manipulation, integer
// arithmetic and comparison, bitwise logic, and heap access.
//
// Operands pop in reverse order of appearance: the top of the stack is
// the right-hand operand. Comparisons push the Forth booleans -1 / 0.

use crate::internals::tokenizer::Frame;
use crate::kernel::{Value, FALSE, TRUE};
use crate::runtime::{ForthError, ForthRuntime};

fn flag(b: bool) -> i64 {
    if b {
        TRUE
    } else {
        FALSE
    }
}

impl ForthRuntime {
    // ------------------------------------------------------------------
    // stack manipulation

    /// dup ( n -- n n )
    pub fn f_dup(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let top = self.peek(1)?;
        self.push(top)
    }

    /// drop ( n -- )
    pub fn f_drop(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop()?;
        Ok(())
    }

    /// swap ( m n -- n m )
    pub fn f_swap(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(b)?;
        self.push(a)
    }

    /// over ( m n -- m n m )
    pub fn f_over(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let second = self.peek(2)?;
        self.push(second)
    }

    /// rot ( i j k -- j k i ) moves the third stack item to the top
    pub fn f_rot(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let first = self.pop()?;
        let second = self.pop()?;
        let third = self.pop()?;
        self.push(second)?;
        self.push(first)?;
        self.push(third)
    }

    /// pick ( .. n -- .. v ) copies the nth item below the top;
    /// 0 pick is dup
    pub fn f_pick(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let n = self.pop()?.int();
        if n < 0 {
            self.msg.error("pick", "negative index", Some(n));
            return Err(ForthError::StackUnderflow);
        }
        let val = self.peek(n as usize + 1)?;
        self.push(val)
    }

    /// roll ( .. n -- .. v ) moves the nth item below the top to the
    /// top; 1 roll is swap, 2 roll is rot
    pub fn f_roll(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let n = self.pop()?.int();
        if n < 0 {
            self.msg.error("roll", "negative index", Some(n));
            return Err(ForthError::StackUnderflow);
        }
        if n == 0 {
            return Ok(());
        }
        if self.data_stack.roll(n as usize) {
            Ok(())
        } else {
            self.msg.error("roll", "data stack underflow", Some(n));
            Err(ForthError::StackUnderflow)
        }
    }

    /// ?dup ( n -- n n | 0 ) duplicates the top only when it is nonzero
    pub fn f_q_dup(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let top = self.peek(1)?;
        if top.truthy() {
            self.push(top)?;
        }
        Ok(())
    }

    /// depth ( -- n ) pushes the number of items on the data stack
    pub fn f_depth(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let depth = self.data_stack.depth() as i64;
        self.push(Value::Int(depth))
    }

    // ------------------------------------------------------------------
    // comparison

    pub fn f_less(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| flag(a < b))
    }

    pub fn f_equal(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| flag(a == b))
    }

    pub fn f_greater(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| flag(a > b))
    }

    pub fn f_greater_equal(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| flag(a >= b))
    }

    pub fn f_less_equal(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| flag(a <= b))
    }

    pub fn f_0less(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop1_push1(|a| flag(a < 0))
    }

    pub fn f_0equal(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop1_push1(|a| flag(a == 0))
    }

    pub fn f_0greater(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop1_push1(|a| flag(a > 0))
    }

    /// not ( n -- b ) same as 0=
    pub fn f_not(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop1_push1(|a| flag(a == 0))
    }

    // ------------------------------------------------------------------
    // arithmetic and logic

    /// + ( a b -- a+b ) polymorphic on the first operand's tag: two
    /// references add as indices and the sum keeps the reference tag,
    /// floats add as floats, everything else adds as integers
    pub fn f_plus(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let b = self.pop()?;
        let a = self.pop()?;
        let sum = match a {
            Value::Int(x) => Value::Int(x.wrapping_add(b.int())),
            Value::Float(x) => Value::Float(x + b.float()),
            Value::Ref(r) => Value::Ref(r.wrapping_add(b.addr())),
        };
        self.push(sum)
    }

    pub fn f_minus(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| a.wrapping_sub(b))
    }

    pub fn f_add1(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop1_push1(|a| a.wrapping_add(1))
    }

    pub fn f_sub1(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop1_push1(|a| a.wrapping_sub(1))
    }

    pub fn f_add2(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop1_push1(|a| a.wrapping_add(2))
    }

    pub fn f_sub2(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop1_push1(|a| a.wrapping_sub(2))
    }

    pub fn f_times(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| a.wrapping_mul(b))
    }

    pub fn f_divide(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let b = self.pop()?.int();
        let a = self.pop()?.int();
        if b == 0 {
            self.msg.error("/", "division by zero", None::<i64>);
            return Err(ForthError::DivisionByZero);
        }
        self.push(Value::Int(a.wrapping_div(b)))
    }

    pub fn f_mod(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let b = self.pop()?.int();
        let a = self.pop()?.int();
        if b == 0 {
            self.msg.error("mod", "division by zero", None::<i64>);
            return Err(ForthError::DivisionByZero);
        }
        self.push(Value::Int(a.wrapping_rem(b)))
    }

    /// /mod ( a b -- rem quot ) pushes the remainder, then the quotient
    pub fn f_divmod(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let b = self.pop()?.int();
        let a = self.pop()?.int();
        if b == 0 {
            self.msg.error("/mod", "division by zero", None::<i64>);
            return Err(ForthError::DivisionByZero);
        }
        self.push(Value::Int(a.wrapping_rem(b)))?;
        self.push(Value::Int(a.wrapping_div(b)))
    }

    /// max ( a b -- a|b ) keeps the larger operand, tag and all
    pub fn f_max(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(if a.int() > b.int() { a } else { b })
    }

    pub fn f_min(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(if a.int() < b.int() { a } else { b })
    }

    pub fn f_abs(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let val = self.pop()?;
        if val.int() > 0 {
            self.push(val)
        } else {
            self.push(Value::Int(val.int().wrapping_neg()))
        }
    }

    pub fn f_negate(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop1_push1(|a| a.wrapping_neg())
    }

    pub fn f_and(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| a & b)
    }

    pub fn f_or(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| a | b)
    }

    pub fn f_xor(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| a ^ b)
    }

    pub fn f_lshift(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| a.wrapping_shl(b as u32))
    }

    pub fn f_rshift(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.pop2_push1(|a, b| a.wrapping_shr(b as u32))
    }

    // ------------------------------------------------------------------
    // memory
    //
    // References are heap indices. A non-reference operand or an index
    // beyond the heap is reported and the word becomes a no-op, leaving
    // evaluation to continue.

    /// @ ( a -- v ) pushes the heap cell at reference a
    pub fn f_get(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let addr = self.pop()?;
        match addr {
            Value::Ref(idx) => match self.heap.get(idx) {
                Some(val) => self.push(val)?,
                None => self.msg.error("@", "reference out of range", Some(idx)),
            },
            _ => self
                .msg
                .error("@", "loading from a non-reference value", Some(addr)),
        }
        Ok(())
    }

    /// ! ( v a -- ) stores v in the heap cell at reference a
    pub fn f_store(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let addr = self.pop()?;
        let val = self.pop()?;
        match addr {
            Value::Ref(idx) => {
                if !self.heap.set(idx, val) {
                    self.msg.error("!", "reference out of range", Some(idx));
                }
            }
            _ => self
                .msg
                .error("!", "storing to a non-reference value", Some(addr)),
        }
        Ok(())
    }

    /// ? ( a -- ) prints the heap cell at reference a, formatted by tag
    pub fn f_question(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let addr = self.pop()?;
        match addr {
            Value::Ref(idx) => match self.heap.get(idx) {
                Some(val) => self.print_value(val),
                None => self.msg.error("?", "reference out of range", Some(idx)),
            },
            _ => self
                .msg
                .error("?", "loading from a non-reference value", Some(addr)),
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

    fn rt() -> ForthRuntime {
        ForthRuntime::new(128, 128)
    }

    fn ints(rt: &ForthRuntime) -> Vec<i64> {
        rt.stack().iter().map(|v| v.int()).collect()
    }

    #[test]
    fn test_dup_drop_identity() {
        let mut rt = rt();
        rt.eval("1 2 3 dup drop").unwrap();
        assert_eq!(ints(&rt), vec![1, 2, 3]);
    }

    #[test]
    fn test_swap_swap_identity() {
        let mut rt = rt();
        rt.eval("1 2 swap swap").unwrap();
        assert_eq!(ints(&rt), vec![1, 2]);
    }

    #[test]
    fn test_rot_three_times_identity() {
        let mut rt = rt();
        rt.eval("1 2 3 rot rot rot").unwrap();
        assert_eq!(ints(&rt), vec![1, 2, 3]);
    }

    #[test]
    fn test_rot_moves_third_to_top() {
        let mut rt = rt();
        rt.eval("1 2 3 rot").unwrap();
        assert_eq!(ints(&rt), vec![2, 3, 1]);
    }

    #[test]
    fn test_over() {
        let mut rt = rt();
        rt.eval("10 20 over").unwrap();
        assert_eq!(ints(&rt), vec![10, 20, 10]);
    }

    #[test]
    fn test_pick_zero_is_dup() {
        let mut rt = rt();
        rt.eval("10 20 30 0 pick").unwrap();
        assert_eq!(ints(&rt), vec![10, 20, 30, 30]);
    }

    #[test]
    fn test_pick_reaches_down() {
        let mut rt = rt();
        rt.eval("10 20 30 2 pick").unwrap();
        assert_eq!(ints(&rt), vec![10, 20, 30, 10]);
    }

    #[test]
    fn test_roll_is_swap_and_rot() {
        let mut rt = rt();
        rt.eval("1 2 1 roll").unwrap();
        assert_eq!(ints(&rt), vec![2, 1]);
        rt.eval("drop drop 1 2 3 2 roll").unwrap();
        assert_eq!(ints(&rt), vec![2, 3, 1]);
    }

    #[test]
    fn test_q_dup() {
        let mut rt = rt();
        rt.eval("5 ?dup").unwrap();
        assert_eq!(ints(&rt), vec![5, 5]);
        rt.eval("drop drop 0 ?dup").unwrap();
        assert_eq!(ints(&rt), vec![0]);
    }

    #[test]
    fn test_depth() {
        let mut rt = rt();
        rt.eval("depth 7 8 depth").unwrap();
        assert_eq!(ints(&rt), vec![0, 7, 8, 3]);
    }

    #[test]
    fn test_comparisons_push_minus_one_or_zero() {
        let mut rt = rt();
        rt.eval("1 2 < 2 1 < 3 3 = 3 4 = 2 1 > 1 2 >= 2 2 <=").unwrap();
        assert_eq!(ints(&rt), vec![-1, 0, -1, 0, -1, 0, -1]);
    }

    #[test]
    fn test_zero_comparisons() {
        let mut rt = rt();
        rt.eval("-5 0< 5 0< 0 0= 1 0= 3 0> -3 0>").unwrap();
        assert_eq!(ints(&rt), vec![-1, 0, -1, 0, -1, 0]);
    }

    #[test]
    fn test_divmod() {
        let mut rt = rt();
        rt.eval("17 5 /mod").unwrap();
        assert_eq!(ints(&rt), vec![2, 3]);
    }

    #[test]
    fn test_division_by_zero_aborts() {
        let mut rt = rt();
        assert_eq!(rt.eval("1 0 /"), Err(ForthError::DivisionByZero));
        assert_eq!(rt.eval("1 0 mod"), Err(ForthError::DivisionByZero));
        assert_eq!(rt.eval("1 0 /mod"), Err(ForthError::DivisionByZero));
    }

    #[test]
    fn test_increment_decrement() {
        let mut rt = rt();
        rt.eval("10 1+ 10 1- 10 2+ 10 2-").unwrap();
        assert_eq!(ints(&rt), vec![11, 9, 12, 8]);
    }

    #[test]
    fn test_max_min_abs_negate() {
        let mut rt = rt();
        rt.eval("3 7 max 3 7 min -4 abs 4 negate").unwrap();
        assert_eq!(ints(&rt), vec![7, 3, 4, -4]);
    }

    #[test]
    fn test_bitwise() {
        let mut rt = rt();
        rt.eval("12 10 and 12 10 or 12 10 xor 1 4 lshift 16 2 rshift")
            .unwrap();
        assert_eq!(ints(&rt), vec![8, 14, 6, 16, 4]);
    }

    #[test]
    fn test_plus_on_references_keeps_tag() {
        let mut rt = rt();
        rt.eval("ref 3 ref 4 +").unwrap();
        assert_eq!(rt.stack(), &[Value::Ref(7)]);
    }

    #[test]
    fn test_plus_reference_and_integer() {
        let mut rt = rt();
        rt.eval("ref 3 2 +").unwrap();
        assert_eq!(rt.stack(), &[Value::Ref(5)]);
    }

    #[test]
    fn test_store_and_load() {
        let mut rt = rt();
        rt.eval("variable a variable b 11 a ! 22 b ! a @ b @").unwrap();
        assert_eq!(ints(&rt), vec![11, 22]);
    }

    #[test]
    fn test_load_from_non_reference_continues() {
        let mut rt = rt();
        // reported but not fatal; nothing is pushed
        rt.eval("5 @ 1").unwrap();
        assert_eq!(ints(&rt), vec![1]);
    }

    #[test]
    fn test_store_out_of_range_continues() {
        let mut rt = rt();
        rt.eval("7 ref 100000 ! 1").unwrap();
        assert_eq!(ints(&rt), vec![1]);
    }

    #[test]
    fn test_underflow_aborts() {
        let mut rt = rt();
        assert_eq!(rt.eval("drop"), Err(ForthError::StackUnderflow));
        assert_eq!(rt.eval("1 swap"), Err(ForthError::StackUnderflow));
    }
}
