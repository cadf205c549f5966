// Floating-point words
//
// All of these assume float operands (the tag coerces rather than
// being checked, matching the integer words). Comparisons push the
// Forth booleans -1 / 0. Conversions d>f and f>d cross between the
// integer and float tags; f>d truncates toward zero.

use crate::internals::tokenizer::Frame;
use crate::kernel::{Value, FALSE, TRUE};
use crate::runtime::{ForthError, ForthRuntime};

impl ForthRuntime {
    fn fpop2_push1(&mut self, f: impl Fn(f64, f64) -> f64) -> Result<(), ForthError> {
        let b = self.pop()?.float();
        let a = self.pop()?.float();
        self.push(Value::Float(f(a, b)))
    }

    fn fpop1_push1(&mut self, f: impl Fn(f64) -> f64) -> Result<(), ForthError> {
        let x = self.pop()?.float();
        self.push(Value::Float(f(x)))
    }

    fn fpop2_flag(&mut self, f: impl Fn(f64, f64) -> bool) -> Result<(), ForthError> {
        let b = self.pop()?.float();
        let a = self.pop()?.float();
        self.push(Value::Int(if f(a, b) { TRUE } else { FALSE }))
    }

    fn fpop1_flag(&mut self, f: impl Fn(f64) -> bool) -> Result<(), ForthError> {
        let x = self.pop()?.float();
        self.push(Value::Int(if f(x) { TRUE } else { FALSE }))
    }

    // ------------------------------------------------------------------
    // conversions

    /// d>f ( n -- x ) integer to float
    pub fn f_d_to_f(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let n = self.pop()?.int();
        self.push(Value::Float(n as f64))
    }

    /// f>d ( x -- n ) float to integer, truncating toward zero
    pub fn f_f_to_d(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let x = self.pop()?.float();
        self.push(Value::Int(x as i64))
    }

    // ------------------------------------------------------------------
    // arithmetic

    pub fn f_fadd(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_push1(|a, b| a + b)
    }

    pub fn f_fsub(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_push1(|a, b| a - b)
    }

    pub fn f_fmul(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_push1(|a, b| a * b)
    }

    pub fn f_fdiv(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_push1(|a, b| a / b)
    }

    pub fn f_fnegate(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(|x| -x)
    }

    pub fn f_fabs(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(f64::abs)
    }

    pub fn f_fmax(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_push1(f64::max)
    }

    pub fn f_fmin(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_push1(f64::min)
    }

    pub fn f_floor(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(f64::floor)
    }

    pub fn f_fround(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(f64::round)
    }

    /// f** ( base exp -- base^exp )
    pub fn f_fpow(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_push1(f64::powf)
    }

    /// 1/f ( x -- 1/x )
    pub fn f_finv(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(|x| 1.0 / x)
    }

    /// f2/ ( x -- x/2 )
    pub fn f_fhalf(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(|x| x / 2.0)
    }

    // ------------------------------------------------------------------
    // trigonometry

    pub fn f_fsin(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(f64::sin)
    }

    pub fn f_fcos(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(f64::cos)
    }

    /// fsincos ( x -- cos sin ) sin ends up on top
    pub fn f_fsincos(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let x = self.pop()?.float();
        self.push(Value::Float(x.cos()))?;
        self.push(Value::Float(x.sin()))
    }

    pub fn f_ftan(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(f64::tan)
    }

    pub fn f_fasin(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(f64::asin)
    }

    pub fn f_facos(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(f64::acos)
    }

    pub fn f_fatan(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_push1(f64::atan)
    }

    /// fatan2 ( x y -- atan2(y,x) )
    pub fn f_fatan2(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let y = self.pop()?.float();
        let x = self.pop()?.float();
        self.push(Value::Float(y.atan2(x)))
    }

    /// pi ( -- x )
    pub fn f_pi(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.push(Value::Float(std::f64::consts::PI))
    }

    // ------------------------------------------------------------------
    // approximate comparison

    /// f~rel ( a b rel -- f ) true when |a-b| <= rel * max(|a|, |b|)
    pub fn f_fapprox_rel(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let rel = self.pop()?.float();
        let b = self.pop()?.float();
        let a = self.pop()?.float();
        let close = (a - b).abs() <= rel * a.abs().max(b.abs());
        self.push(Value::Int(if close { TRUE } else { FALSE }))
    }

    /// f~abs ( a b tol -- f ) true when |a-b| <= tol
    pub fn f_fapprox_abs(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let tol = self.pop()?.float();
        let b = self.pop()?.float();
        let a = self.pop()?.float();
        let close = (a - b).abs() <= tol;
        self.push(Value::Int(if close { TRUE } else { FALSE }))
    }

    /// f~ ( a b rel tol -- f ) true when either tolerance is satisfied
    pub fn f_fapprox(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        let tol = self.pop()?.float();
        let rel = self.pop()?.float();
        let b = self.pop()?.float();
        let a = self.pop()?.float();
        let diff = (a - b).abs();
        let close = diff <= tol || diff <= rel * a.abs().max(b.abs());
        self.push(Value::Int(if close { TRUE } else { FALSE }))
    }

    // ------------------------------------------------------------------
    // comparison

    pub fn f_feq(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_flag(|a, b| a == b)
    }

    pub fn f_fne(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_flag(|a, b| a != b)
    }

    pub fn f_flt(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_flag(|a, b| a < b)
    }

    pub fn f_fle(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_flag(|a, b| a <= b)
    }

    pub fn f_fgt(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_flag(|a, b| a > b)
    }

    pub fn f_fge(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop2_flag(|a, b| a >= b)
    }

    pub fn f_fltz(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_flag(|x| x < 0.0)
    }

    pub fn f_flez(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_flag(|x| x <= 0.0)
    }

    pub fn f_fnez(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_flag(|x| x != 0.0)
    }

    pub fn f_feqz(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_flag(|x| x == 0.0)
    }

    pub fn f_fgtz(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_flag(|x| x > 0.0)
    }

    pub fn f_fgez(&mut self, _frame: &mut Frame) -> Result<(), ForthError> {
        self.fpop1_flag(|x| x >= 0.0)
    }
}
