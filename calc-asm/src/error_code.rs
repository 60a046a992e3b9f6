//! The calc computation error-code table.
//!
//! Real calc carries roughly four hundred of these, one or two per bad
//! argument to a builtin or operator (`errtbl.c`). The operations this
//! workspace actually evaluates are a fraction of that surface (no resource
//! scripts, no file builtins, no custom functions), so this enum curates
//! the codes that the in-scope arithmetic, relation, assignment,
//! transcendental and configuration operations can actually raise, one
//! variant per function rather than per the multiple `E_FOO1`/`E_FOO2`/
//! `E_FOO3` sub-codes `errtbl.c` defines for some of them (matching the
//! economy this enum already applies to e.g. `Sqrt` vs. `Sqrt2`/`Sqrt3`).
//! A handful of archaic trig functions (the half-versine family,
//! `exsec`/`excsc`, `chord`) have no dedicated `errtbl.c` code at all;
//! they reuse the `ErrorCode` of the primitive they are algebraically
//! defined in terms of (see `kernel::transcendental`) rather than
//! inventing an ungrounded one, preserving the exact
//! numbering and `E_`-prefixed symbol of their real-calc counterparts, and
//! reserves the rest of the numbering scheme through [`ErrorCode::UserDefined`].

use std::fmt;

/// First calc computation error code. Codes below this are reserved for
/// (unused, in this crate) libc `errno` passthrough.
pub const E_BASE: u16 = 10000;
/// First user-defined error code, as raised by a resource script's
/// `error("...")` builtin. Out of scope for direct construction here (no
/// resource-file loader), but the range is part of the shared error-code
/// vocabulary and callers may still see it on values produced elsewhere.
pub const E_USERDEF: u16 = 20000;
/// Highest valid user-defined error code.
pub const E_USERMAX: u16 = 32767;

/// A calc computation error code.
///
/// Every variant's discriminant matches the `errnum` of the same-named
/// entry in `error_table[]`; [`ErrorCode::symbol`] and
/// [`ErrorCode::message`] reproduce that entry's `errsym` and `errmsg`
/// fields verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
#[repr(u16)]
pub enum ErrorCode {
    DivByZero = 10001,
    ZeroDivZero = 10002,
    Add = 10003,
    Sub = 10004,
    Mul = 10005,
    Div = 10006,
    Neg = 10007,
    Square = 10008,
    Inv = 10009,
    IncV = 10010,
    DecV = 10011,
    Int = 10012,
    Frac = 10013,
    Conj = 10014,
    Appr = 10015,
    Appr2 = 10016,
    Appr3 = 10017,
    Round = 10018,
    Round2 = 10019,
    Round3 = 10020,
    BRound = 10021,
    BRound2 = 10022,
    BRound3 = 10023,
    Sqrt = 10024,
    Sqrt2 = 10025,
    Sqrt3 = 10026,
    Root = 10027,
    Root2 = 10028,
    Root3 = 10029,
    Norm = 10030,
    Shift = 10031,
    Shift2 = 10032,
    Scale = 10033,
    Scale2 = 10034,
    Powi = 10035,
    Powi2 = 10036,
    Power = 10037,
    Power2 = 10038,
    Power3 = 10039,
    Quo = 10040,
    Quo2 = 10041,
    Quo3 = 10042,
    Mod = 10043,
    Mod2 = 10044,
    Mod3 = 10045,
    Sgn = 10046,
    Abs = 10047,
    Abs2 = 10048,
    Exp = 10051,
    Cos = 10137,
    Sin = 10139,
    Ln = 10183,
    Tan = 10242,
    Cot = 10244,
    Sec = 10246,
    Csc = 10248,
    Sinh = 10250,
    Cosh = 10252,
    Tanh = 10254,
    Coth = 10256,
    Sech = 10258,
    Csch = 10260,
    Asin = 10262,
    Acos = 10264,
    Atan = 10266,
    Acot = 10268,
    Asec = 10270,
    Acsc = 10272,
    Asinh = 10274,
    Acosh = 10276,
    Atanh = 10278,
    Acoth = 10280,
    Asech = 10282,
    Acsch = 10284,
    Gd = 10286,
    Agd = 10288,
    Log = 10412,
    Log2 = 10505,
    Versin = 10513,
    Aversin = 10516,
    Coversin = 10519,
    Acoversin = 10522,
    Vercos = 10525,
    Avercos = 10528,
    Covercos = 10531,
    Acovercos = 10534,
    /// Not a real-calc code: raised by the comparison dispatch when the two
    /// operand tags have no defined ordering, see `spec.md` §4.2.1.
    Cmp = 19001,
    /// Likewise, raised by indexing a container with a key of the wrong
    /// type for that container kind, see §4.2.4.
    BadSubscript = 19002,
    /// Attempt to assign through a read-only address (e.g. a matrix bound
    /// or an rvalue), see §4.2.3.
    NotAssignable = 19003,
    /// First user-defined error code; see the module docs. No in-scope
    /// operation constructs this variant directly, but it round-trips
    /// through [`ErrorCode::from_u16`]/[`ErrorCode::code`] like any other.
    UserDefined(u16),
}

impl ErrorCode {
    /// The real-calc `E_1OVER0` symbol aliases this code: calc's own
    /// table has no such entry, `1/0` raises `E_DIVBYZERO`.
    pub const ONE_OVER_ZERO: ErrorCode = ErrorCode::DivByZero;

    /// The bare `errnum`, matching `error_table[].errnum`.
    pub const fn code(self) -> u16 {
        match self {
            ErrorCode::UserDefined(n) => n,
            other => other.fixed_code(),
        }
    }

    const fn fixed_code(self) -> u16 {
        use ErrorCode::*;
        match self {
            DivByZero => 10001,
            ZeroDivZero => 10002,
            Add => 10003,
            Sub => 10004,
            Mul => 10005,
            Div => 10006,
            Neg => 10007,
            Square => 10008,
            Inv => 10009,
            IncV => 10010,
            DecV => 10011,
            Int => 10012,
            Frac => 10013,
            Conj => 10014,
            Appr => 10015,
            Appr2 => 10016,
            Appr3 => 10017,
            Round => 10018,
            Round2 => 10019,
            Round3 => 10020,
            BRound => 10021,
            BRound2 => 10022,
            BRound3 => 10023,
            Sqrt => 10024,
            Sqrt2 => 10025,
            Sqrt3 => 10026,
            Root => 10027,
            Root2 => 10028,
            Root3 => 10029,
            Norm => 10030,
            Shift => 10031,
            Shift2 => 10032,
            Scale => 10033,
            Scale2 => 10034,
            Powi => 10035,
            Powi2 => 10036,
            Power => 10037,
            Power2 => 10038,
            Power3 => 10039,
            Quo => 10040,
            Quo2 => 10041,
            Quo3 => 10042,
            Mod => 10043,
            Mod2 => 10044,
            Mod3 => 10045,
            Sgn => 10046,
            Abs => 10047,
            Abs2 => 10048,
            Exp => 10051,
            Cos => 10137,
            Sin => 10139,
            Ln => 10183,
            Tan => 10242,
            Cot => 10244,
            Sec => 10246,
            Csc => 10248,
            Sinh => 10250,
            Cosh => 10252,
            Tanh => 10254,
            Coth => 10256,
            Sech => 10258,
            Csch => 10260,
            Asin => 10262,
            Acos => 10264,
            Atan => 10266,
            Acot => 10268,
            Asec => 10270,
            Acsc => 10272,
            Asinh => 10274,
            Acosh => 10276,
            Atanh => 10278,
            Acoth => 10280,
            Asech => 10282,
            Acsch => 10284,
            Gd => 10286,
            Agd => 10288,
            Log => 10412,
            Log2 => 10505,
            Versin => 10513,
            Aversin => 10516,
            Coversin => 10519,
            Acoversin => 10522,
            Vercos => 10525,
            Avercos => 10528,
            Covercos => 10531,
            Acovercos => 10534,
            Cmp => 19001,
            BadSubscript => 19002,
            NotAssignable => 19003,
            UserDefined(n) => n,
        }
    }

    /// The `E_`-prefixed symbol, matching `error_table[].errsym`.
    pub const fn symbol(self) -> &'static str {
        use ErrorCode::*;
        match self {
            DivByZero => "E_DIVBYZERO",
            ZeroDivZero => "E_ZERODIVZERO",
            Add => "E_ADD",
            Sub => "E_SUB",
            Mul => "E_MUL",
            Div => "E_DIV",
            Neg => "E_NEG",
            Square => "E_SQUARE",
            Inv => "E_INV",
            IncV => "E_INCV",
            DecV => "E_DECV",
            Int => "E_INT",
            Frac => "E_FRAC",
            Conj => "E_CONJ",
            Appr => "E_APPR",
            Appr2 => "E_APPR2",
            Appr3 => "E_APPR3",
            Round => "E_ROUND",
            Round2 => "E_ROUND2",
            Round3 => "E_ROUND3",
            BRound => "E_BROUND",
            BRound2 => "E_BROUND2",
            BRound3 => "E_BROUND3",
            Sqrt => "E_SQRT",
            Sqrt2 => "E_SQRT2",
            Sqrt3 => "E_SQRT3",
            Root => "E_ROOT",
            Root2 => "E_ROOT2",
            Root3 => "E_ROOT3",
            Norm => "E_NORM",
            Shift => "E_SHIFT",
            Shift2 => "E_SHIFT2",
            Scale => "E_SCALE",
            Scale2 => "E_SCALE2",
            Powi => "E_POWI",
            Powi2 => "E_POWI2",
            Power => "E_POWER",
            Power2 => "E_POWER2",
            Power3 => "E_POWER3",
            Quo => "E_QUO",
            Quo2 => "E_QUO2",
            Quo3 => "E_QUO3",
            Mod => "E_MOD",
            Mod2 => "E_MOD2",
            Mod3 => "E_MOD3",
            Sgn => "E_SGN",
            Abs => "E_ABS",
            Abs2 => "E_ABS2",
            Exp => "E_EXP1",
            Cos => "E_COS1",
            Sin => "E_SIN1",
            Ln => "E_LN1",
            Tan => "E_TAN1",
            Cot => "E_COT1",
            Sec => "E_SEC1",
            Csc => "E_CSC1",
            Sinh => "E_SINH1",
            Cosh => "E_COSH1",
            Tanh => "E_TANH1",
            Coth => "E_COTH1",
            Sech => "E_SECH1",
            Csch => "E_CSCH1",
            Asin => "E_ASIN1",
            Acos => "E_ACOS1",
            Atan => "E_ATAN1",
            Acot => "E_ACOT1",
            Asec => "E_ASEC1",
            Acsc => "E_ACSC1",
            Asinh => "E_ASINH1",
            Acosh => "E_ACOSH1",
            Atanh => "E_ATANH1",
            Acoth => "E_ACOTH1",
            Asech => "E_ASECH1",
            Acsch => "E_ACSCH1",
            Gd => "E_GD1",
            Agd => "E_AGD1",
            Log => "E_LOG1",
            Log2 => "E_LOG2_1",
            Versin => "E_VERSIN1",
            Aversin => "E_AVERSIN1",
            Coversin => "E_COVERSIN1",
            Acoversin => "E_ACOVERSIN1",
            Vercos => "E_VERCOS1",
            Avercos => "E_AVERCOS1",
            Covercos => "E_COVERCOS1",
            Acovercos => "E_ACOVERCOS1",
            Cmp => "E_CMP",
            BadSubscript => "E_SUBSCRIPT",
            NotAssignable => "E_NOTASSIGNABLE",
            UserDefined(_) => "E_USERDEF",
        }
    }

    /// The human-readable message, matching `error_table[].errmsg`.
    pub const fn message(self) -> &'static str {
        use ErrorCode::*;
        match self {
            DivByZero => "Division by zero",
            ZeroDivZero => "Indeterminate (0/0)",
            Add => "Bad arguments for +",
            Sub => "Bad arguments for binary -",
            Mul => "Bad arguments for *",
            Div => "Bad arguments for /",
            Neg => "Bad argument for unary -",
            Square => "Bad argument for squaring",
            Inv => "Bad argument for inverse",
            IncV => "Bad argument for ++",
            DecV => "Bad argument for --",
            Int => "Bad argument for int",
            Frac => "Bad argument for frac",
            Conj => "Bad argument for conj",
            Appr => "Bad first argument for appr",
            Appr2 => "Bad second argument for appr",
            Appr3 => "Bad third argument for appr",
            Round => "Bad first argument for round",
            Round2 => "Bad second argument for round",
            Round3 => "Bad third argument for round",
            BRound => "Bad first argument for bround",
            BRound2 => "Bad second argument for bround",
            BRound3 => "Bad third argument for bround",
            Sqrt => "Bad first argument for sqrt",
            Sqrt2 => "Bad second argument for sqrt",
            Sqrt3 => "Bad third argument for sqrt",
            Root => "Bad first argument for root",
            Root2 => "Bad second argument for root",
            Root3 => "Bad third argument for root",
            Norm => "Bad argument for norm",
            Shift => "Bad first argument for << or >>",
            Shift2 => "Bad second argument for << or >>",
            Scale => "Bad first argument for scale",
            Scale2 => "Bad second argument for scale",
            Powi => "Bad first argument for ^",
            Powi2 => "Bad second argument for ^",
            Power => "Bad first argument for power",
            Power2 => "Bad second argument for power",
            Power3 => "Bad third argument for power",
            Quo => "Bad first argument for quo or //",
            Quo2 => "Bad second argument for quo or //",
            Quo3 => "Bad third argument for quo",
            Mod => "Bad first argument for mod or %",
            Mod2 => "Bad second argument for mod or %",
            Mod3 => "Bad third argument for mod",
            Sgn => "Bad argument for sgn",
            Abs => "Bad first argument for abs",
            Abs2 => "Bad second argument for abs",
            Exp => "Bad argument for exp",
            Cos => "Bad argument for cos",
            Sin => "Bad argument for sin",
            Ln => "Bad argument for ln",
            Tan => "Bad argument for tan",
            Cot => "Bad argument for cot",
            Sec => "Bad argument for sec",
            Csc => "Bad argument for csc",
            Sinh => "Bad argument for sinh",
            Cosh => "Bad argument for cosh",
            Tanh => "Bad argument for tanh",
            Coth => "Bad argument for coth",
            Sech => "Bad argument for sech",
            Csch => "Bad argument for csch",
            Asin => "Bad argument for asin",
            Acos => "Bad argument for acos",
            Atan => "Bad argument for atan",
            Acot => "Bad argument for acot",
            Asec => "Bad argument for asec",
            Acsc => "Bad argument for acsc",
            Asinh => "Bad argument for asinh",
            Acosh => "Bad argument for acosh",
            Atanh => "Bad argument for atanh",
            Acoth => "Bad argument for acoth",
            Asech => "Bad argument for asech",
            Acsch => "Bad argument for acsch",
            Gd => "Bad argument for gd",
            Agd => "Bad argument for agd",
            Log => "Bad argument for log",
            Log2 => "Bad argument for log2",
            Versin => "Bad argument for versin",
            Aversin => "Bad argument for aversin",
            Coversin => "Bad argument for coversin",
            Acoversin => "Bad argument for acoversin",
            Vercos => "Bad argument for vercos",
            Avercos => "Bad argument for avercos",
            Covercos => "Bad argument for covercos",
            Acovercos => "Bad argument for acovercos",
            Cmp => "Values have no defined ordering",
            BadSubscript => "Subscript of the wrong type for this container",
            NotAssignable => "Target is not assignable",
            UserDefined(_) => "User defined error",
        }
    }

    /// Recover an [`ErrorCode`] from its numeric `errnum`, if it names one
    /// of the codes modeled here or falls in the user-defined range.
    pub fn from_u16(code: u16) -> Option<ErrorCode> {
        use ErrorCode::*;
        Some(match code {
            10001 => DivByZero,
            10002 => ZeroDivZero,
            10003 => Add,
            10004 => Sub,
            10005 => Mul,
            10006 => Div,
            10007 => Neg,
            10008 => Square,
            10009 => Inv,
            10010 => IncV,
            10011 => DecV,
            10012 => Int,
            10013 => Frac,
            10014 => Conj,
            10015 => Appr,
            10016 => Appr2,
            10017 => Appr3,
            10018 => Round,
            10019 => Round2,
            10020 => Round3,
            10021 => BRound,
            10022 => BRound2,
            10023 => BRound3,
            10024 => Sqrt,
            10025 => Sqrt2,
            10026 => Sqrt3,
            10027 => Root,
            10028 => Root2,
            10029 => Root3,
            10030 => Norm,
            10031 => Shift,
            10032 => Shift2,
            10033 => Scale,
            10034 => Scale2,
            10035 => Powi,
            10036 => Powi2,
            10037 => Power,
            10038 => Power2,
            10039 => Power3,
            10040 => Quo,
            10041 => Quo2,
            10042 => Quo3,
            10043 => Mod,
            10044 => Mod2,
            10045 => Mod3,
            10046 => Sgn,
            10047 => Abs,
            10048 => Abs2,
            10051 => Exp,
            10137 => Cos,
            10139 => Sin,
            10183 => Ln,
            10242 => Tan,
            10244 => Cot,
            10246 => Sec,
            10248 => Csc,
            10250 => Sinh,
            10252 => Cosh,
            10254 => Tanh,
            10256 => Coth,
            10258 => Sech,
            10260 => Csch,
            10262 => Asin,
            10264 => Acos,
            10266 => Atan,
            10268 => Acot,
            10270 => Asec,
            10272 => Acsc,
            10274 => Asinh,
            10276 => Acosh,
            10278 => Atanh,
            10280 => Acoth,
            10282 => Asech,
            10284 => Acsch,
            10286 => Gd,
            10288 => Agd,
            10412 => Log,
            10505 => Log2,
            10513 => Versin,
            10516 => Aversin,
            10519 => Coversin,
            10522 => Acoversin,
            10525 => Vercos,
            10528 => Avercos,
            10531 => Covercos,
            10534 => Acovercos,
            19001 => Cmp,
            19002 => BadSubscript,
            19003 => NotAssignable,
            n if n >= E_USERDEF && n <= E_USERMAX => UserDefined(n),
            _ => return None,
        })
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code(), self.symbol(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorCode::DivByZero)]
    #[case(ErrorCode::Power3)]
    #[case(ErrorCode::Cmp)]
    #[case(ErrorCode::BadSubscript)]
    #[case(ErrorCode::NotAssignable)]
    #[case(ErrorCode::Exp)]
    #[case(ErrorCode::Asinh)]
    #[case(ErrorCode::Log2)]
    #[case(ErrorCode::Covercos)]
    fn round_trips_through_from_u16(#[case] code: ErrorCode) {
        assert_eq!(ErrorCode::from_u16(code.code()), Some(code));
    }

    #[test]
    fn one_over_zero_aliases_div_by_zero() {
        assert_eq!(ErrorCode::ONE_OVER_ZERO, ErrorCode::DivByZero);
    }

    #[test]
    fn user_defined_range_round_trips() {
        let code = ErrorCode::UserDefined(20042);
        assert_eq!(ErrorCode::from_u16(code.code()), Some(code));
    }
}
