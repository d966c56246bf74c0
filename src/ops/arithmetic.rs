//! Operation kinds shared by the dispatcher and the kernels
//!
//! The scalar semantics of every kind live here so that the scalar loop,
//! the SIMD tails and the device kernels agree element for element.

/// Binary operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Addition: a + b
    Add,
    /// Subtraction: a - b
    Sub,
    /// Multiplication: a * b, negative zero canonicalised to +0
    Mul,
    /// Division: a / b
    Div,
    /// Truncated remainder: a % b (same as C `fmodf`)
    Mod,
    /// Power: a^b
    Pow,
    /// Maximum: max(a, b); a NaN operand yields the other one
    Max,
    /// Minimum: min(a, b); a NaN operand yields the other one
    Min,
}

impl BinaryOp {
    /// Apply to one pair of f32 values
    #[inline]
    pub fn apply_f32(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mul => positive_zero(a * b),
            Self::Div => a / b,
            Self::Mod => a % b,
            Self::Pow => a.powf(b),
            Self::Max => a.max(b),
            Self::Min => a.min(b),
        }
    }

    /// Lowercase name used in logs and errors
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Pow => "pow",
            Self::Max => "maximum",
            Self::Min => "minimum",
        }
    }
}

/// Unary operation kind
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation: -a
    Neg,
    /// Absolute value: |a|
    Abs,
    /// Square root
    Sqrt,
    /// Square: a * a
    Square,
}

impl UnaryOp {
    /// Apply to one f32 value
    #[inline]
    pub fn apply_f32(self, a: f32) -> f32 {
        match self {
            Self::Neg => -a,
            Self::Abs => a.abs(),
            Self::Sqrt => a.sqrt(),
            Self::Square => positive_zero(a * a),
        }
    }

    /// Lowercase name used in logs and errors
    pub const fn name(self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Abs => "abs",
            Self::Sqrt => "sqrt",
            Self::Square => "square",
        }
    }
}

/// Full reduction kind
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReduceOp {
    /// Sum of all elements (0 for empty input)
    Sum,
    /// Product of all elements (1 for empty input)
    Prod,
    /// Largest element
    Max,
    /// Smallest element
    Min,
}

impl ReduceOp {
    /// Lowercase name used in logs and errors
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Prod => "prod",
            Self::Max => "max",
            Self::Min => "min",
        }
    }
}

/// Replace -0.0 with +0.0, leave everything else untouched
#[inline]
pub fn positive_zero(x: f32) -> f32 {
    if x == 0.0 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_semantics() {
        assert_eq!(BinaryOp::Add.apply_f32(1.0, 2.0), 3.0);
        assert_eq!(BinaryOp::Sub.apply_f32(1.0, 2.0), -1.0);
        assert_eq!(BinaryOp::Div.apply_f32(1.0, 4.0), 0.25);
        assert_eq!(BinaryOp::Mod.apply_f32(-7.0, 3.0), -1.0);
        assert_eq!(BinaryOp::Pow.apply_f32(2.0, 10.0), 1024.0);
        assert_eq!(BinaryOp::Max.apply_f32(2.0, -3.0), 2.0);
        assert_eq!(BinaryOp::Min.apply_f32(2.0, -3.0), -3.0);
        assert!(BinaryOp::Div.apply_f32(1.0, 0.0).is_infinite());
        assert!(BinaryOp::Mod.apply_f32(1.0, 0.0).is_nan());
    }

    #[test]
    fn test_mul_has_no_negative_zero() {
        let r = BinaryOp::Mul.apply_f32(-0.0, 5.0);
        assert_eq!(r, 0.0);
        assert!(r.is_sign_positive());
        let r = BinaryOp::Mul.apply_f32(0.0, -5.0);
        assert!(r.is_sign_positive());
        assert_eq!(BinaryOp::Mul.apply_f32(-2.0, 3.0), -6.0);
    }

    #[test]
    fn test_unary_semantics() {
        assert_eq!(UnaryOp::Abs.apply_f32(-3.0), 3.0);
        assert_eq!(UnaryOp::Neg.apply_f32(3.0), -3.0);
        assert_eq!(UnaryOp::Sqrt.apply_f32(9.0), 3.0);
        assert_eq!(UnaryOp::Square.apply_f32(-3.0), 9.0);
    }
}
