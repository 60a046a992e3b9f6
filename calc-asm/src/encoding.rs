//! Packing [`Opcode`]s into the flat word stream a compiled function is
//! made of, and back. Our opcodes are variable-width (one tag word plus
//! zero, one or two immediate words) rather than bit-packed into a
//! fixed-width instruction, since `spec.md` §4.3.1 specifies a flat array
//! of machine words rather than a packed 32-bit encoding.

use crate::opcode::Opcode;
use crate::Word;
use thiserror::Error;

/// Failure decoding a raw word stream back into [`Opcode`]s.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// The tag word at this position does not correspond to any opcode.
    #[error("unknown opcode tag {0:#x} at word {1}")]
    UnknownTag(Word, usize),
    /// The stream ended in the middle of an opcode's immediates.
    #[error("truncated instruction stream at word {0}")]
    Truncated(usize),
}

macro_rules! tags {
    ($($name:ident = $val:expr;)*) => {
        $(const $name: Word = $val;)*
    };
}

tags! {
    TAG_LOCAL_ADDR = 0x00; TAG_LOCAL_VALUE = 0x01; TAG_GLOBAL_ADDR = 0x02; TAG_GLOBAL_VALUE = 0x03;
    TAG_PARAM_ADDR = 0x04; TAG_PARAM_VALUE = 0x05; TAG_ARG_VALUE = 0x06; TAG_OLD_VALUE = 0x07;
    TAG_PTR = 0x08; TAG_DEREF = 0x09; TAG_FI_ADDR = 0x0a; TAG_FI_VALUE = 0x0b;

    TAG_NUMBER = 0x10; TAG_IMAGINARY = 0x11; TAG_STRING = 0x12; TAG_UNDEF = 0x13; TAG_ZERO = 0x14;
    TAG_ONE = 0x15; TAG_OBJ_CREATE = 0x16; TAG_MAT_CREATE = 0x17; TAG_ELEM_INIT = 0x18; TAG_INIT_FILL = 0x19;

    TAG_ADD = 0x20; TAG_SUB = 0x21; TAG_MUL = 0x22; TAG_DIV = 0x23; TAG_QUO = 0x24; TAG_MOD = 0x25;
    TAG_POWER = 0x26; TAG_NEGATE = 0x27; TAG_INVERT = 0x28; TAG_SQUARE = 0x29; TAG_INT = 0x2a;
    TAG_FRAC = 0x2b; TAG_NUMERATOR = 0x2c; TAG_DENOMINATOR = 0x2d; TAG_SCALE = 0x2e; TAG_LEFT_SHIFT = 0x2f;
    TAG_RIGHT_SHIFT = 0x30; TAG_ABS = 0x31; TAG_NORM = 0x32; TAG_RE = 0x33; TAG_IM = 0x34;
    TAG_CONJUGATE = 0x35; TAG_SGN = 0x36; TAG_BIT = 0x37; TAG_HIGH_BIT = 0x38; TAG_LOW_BIT = 0x39;
    TAG_PLUS = 0x3a;

    TAG_AND = 0x40; TAG_OR = 0x41; TAG_XOR = 0x42; TAG_NOT = 0x43; TAG_COMP = 0x44; TAG_CONTENT = 0x45;
    TAG_HASH_OP = 0x46; TAG_BACKSLASH = 0x47; TAG_SET_MINUS = 0x48;

    TAG_EQ = 0x50; TAG_NE = 0x51; TAG_LT = 0x52; TAG_LE = 0x53; TAG_GT = 0x54; TAG_GE = 0x55; TAG_CMP = 0x56;

    TAG_IS_INT = 0x60; TAG_IS_NUM = 0x61; TAG_IS_REAL = 0x62; TAG_IS_MAT = 0x63; TAG_IS_LIST = 0x64;
    TAG_IS_OBJ = 0x65; TAG_IS_STR = 0x66; TAG_IS_FILE = 0x67; TAG_IS_RAND = 0x68; TAG_IS_RANDOM = 0x69;
    TAG_IS_CONFIG = 0x6a; TAG_IS_HASH = 0x6b; TAG_IS_ASSOC = 0x6c; TAG_IS_BLK = 0x6d; TAG_IS_OCTET = 0x6e;
    TAG_IS_PTR = 0x6f; TAG_IS_DEFINED = 0x70; TAG_IS_OBJ_TYPE = 0x71; TAG_IS_SIMPLE = 0x72; TAG_IS_ODD = 0x73;
    TAG_IS_EVEN = 0x74; TAG_IS_NULL = 0x75; TAG_IS_TYPE = 0x76;

    TAG_JUMP = 0x80; TAG_JUMP_Z = 0x81; TAG_JUMP_NZ = 0x82; TAG_JUMP_NN = 0x83; TAG_COND_OR_JUMP = 0x84;
    TAG_COND_AND_JUMP = 0x85; TAG_CASE_JUMP = 0x86; TAG_CALL = 0x87; TAG_USER_CALL = 0x88; TAG_RETURN = 0x89;

    TAG_DUPLICATE = 0x90; TAG_DUP_VALUE = 0x91; TAG_POP = 0x92; TAG_SWAP = 0x93; TAG_GET_VALUE = 0x94;
    TAG_ASSIGN = 0x95; TAG_ASSIGN_BACK = 0x96; TAG_ASSIGN_POP = 0x97;

    TAG_PRE_INC = 0xa0; TAG_PRE_DEC = 0xa1; TAG_POST_INC = 0xa2; TAG_POST_DEC = 0xa3;

    TAG_PRINT = 0xb0; TAG_PRINT_RESULT = 0xb1; TAG_PRINT_EOL = 0xb2; TAG_PRINT_SPACE = 0xb3;
    TAG_PRINT_STR = 0xb4;

    TAG_SAVE = 0xc0; TAG_SAVE_VAL = 0xc1; TAG_SET_CONFIG = 0xc2; TAG_GET_CONFIG = 0xc3;
    TAG_SET_EPSILON = 0xc4; TAG_GET_EPSILON = 0xc5; TAG_SHOW = 0xc6; TAG_TEST = 0xc7; TAG_LINKS = 0xc8;
    TAG_DEBUG = 0xc9; TAG_QUIT = 0xca; TAG_ABORT = 0xcb; TAG_INIT_STATIC = 0xcc; TAG_NOP = 0xcd;
}

/// Lower a sequence of decoded opcodes into the flat word stream a
/// [`crate::function::CompiledFunction`] stores.
pub fn encode(ops: &[Opcode]) -> Vec<Word> {
    let mut out = Vec::with_capacity(ops.len() * 2);
    for op in ops {
        encode_one(op, &mut out);
    }
    out
}

fn encode_one(op: &Opcode, out: &mut Vec<Word>) {
    use Opcode::*;
    match *op {
        LocalAddr(i) => push2(out, TAG_LOCAL_ADDR, i as Word),
        LocalValue(i) => push2(out, TAG_LOCAL_VALUE, i as Word),
        GlobalAddr(i) => push2(out, TAG_GLOBAL_ADDR, i as Word),
        GlobalValue(i) => push2(out, TAG_GLOBAL_VALUE, i as Word),
        ParamAddr(i) => push2(out, TAG_PARAM_ADDR, i as Word),
        ParamValue(i) => push2(out, TAG_PARAM_VALUE, i as Word),
        ArgValue => out.push(TAG_ARG_VALUE),
        OldValue => out.push(TAG_OLD_VALUE),
        Ptr => out.push(TAG_PTR),
        Deref => out.push(TAG_DEREF),
        FiAddr => out.push(TAG_FI_ADDR),
        FiValue => out.push(TAG_FI_VALUE),

        Number(i) => push2(out, TAG_NUMBER, i as Word),
        Imaginary(i) => push2(out, TAG_IMAGINARY, i as Word),
        String(i) => push2(out, TAG_STRING, i as Word),
        Undef => out.push(TAG_UNDEF),
        Zero => out.push(TAG_ZERO),
        One => out.push(TAG_ONE),
        ObjCreate(i) => push2(out, TAG_OBJ_CREATE, i as Word),
        MatCreate(dim) => push2(out, TAG_MAT_CREATE, dim as Word),
        ElemInit(pos) => push2(out, TAG_ELEM_INIT, pos as Word),
        InitFill => out.push(TAG_INIT_FILL),

        Add => out.push(TAG_ADD),
        Sub => out.push(TAG_SUB),
        Mul => out.push(TAG_MUL),
        Div => out.push(TAG_DIV),
        Quo => out.push(TAG_QUO),
        Mod => out.push(TAG_MOD),
        Power => out.push(TAG_POWER),
        Negate => out.push(TAG_NEGATE),
        Invert => out.push(TAG_INVERT),
        Square => out.push(TAG_SQUARE),
        Int => out.push(TAG_INT),
        Frac => out.push(TAG_FRAC),
        Numerator => out.push(TAG_NUMERATOR),
        Denominator => out.push(TAG_DENOMINATOR),
        Scale => out.push(TAG_SCALE),
        LeftShift => out.push(TAG_LEFT_SHIFT),
        RightShift => out.push(TAG_RIGHT_SHIFT),
        Abs => out.push(TAG_ABS),
        Norm => out.push(TAG_NORM),
        Re => out.push(TAG_RE),
        Im => out.push(TAG_IM),
        Conjugate => out.push(TAG_CONJUGATE),
        Sgn => out.push(TAG_SGN),
        Bit => out.push(TAG_BIT),
        HighBit => out.push(TAG_HIGH_BIT),
        LowBit => out.push(TAG_LOW_BIT),
        Plus => out.push(TAG_PLUS),

        And => out.push(TAG_AND),
        Or => out.push(TAG_OR),
        Xor => out.push(TAG_XOR),
        Not => out.push(TAG_NOT),
        Comp => out.push(TAG_COMP),
        Content => out.push(TAG_CONTENT),
        HashOp => out.push(TAG_HASH_OP),
        Backslash => out.push(TAG_BACKSLASH),
        SetMinus => out.push(TAG_SET_MINUS),

        Eq => out.push(TAG_EQ),
        Ne => out.push(TAG_NE),
        Lt => out.push(TAG_LT),
        Le => out.push(TAG_LE),
        Gt => out.push(TAG_GT),
        Ge => out.push(TAG_GE),
        Cmp => out.push(TAG_CMP),

        IsInt => out.push(TAG_IS_INT),
        IsNum => out.push(TAG_IS_NUM),
        IsReal => out.push(TAG_IS_REAL),
        IsMat => out.push(TAG_IS_MAT),
        IsList => out.push(TAG_IS_LIST),
        IsObj => out.push(TAG_IS_OBJ),
        IsStr => out.push(TAG_IS_STR),
        IsFile => out.push(TAG_IS_FILE),
        IsRand => out.push(TAG_IS_RAND),
        IsRandom => out.push(TAG_IS_RANDOM),
        IsConfig => out.push(TAG_IS_CONFIG),
        IsHash => out.push(TAG_IS_HASH),
        IsAssoc => out.push(TAG_IS_ASSOC),
        IsBlk => out.push(TAG_IS_BLK),
        IsOctet => out.push(TAG_IS_OCTET),
        IsPtr => out.push(TAG_IS_PTR),
        IsDefined => out.push(TAG_IS_DEFINED),
        IsObjType => out.push(TAG_IS_OBJ_TYPE),
        IsSimple => out.push(TAG_IS_SIMPLE),
        IsOdd => out.push(TAG_IS_ODD),
        IsEven => out.push(TAG_IS_EVEN),
        IsNull => out.push(TAG_IS_NULL),
        IsType(t) => push2(out, TAG_IS_TYPE, t as Word),

        Jump(t) => push2(out, TAG_JUMP, t as Word),
        JumpZ(t) => push2(out, TAG_JUMP_Z, t as Word),
        JumpNz(t) => push2(out, TAG_JUMP_NZ, t as Word),
        JumpNn(t) => push2(out, TAG_JUMP_NN, t as Word),
        CondOrJump(t) => push2(out, TAG_COND_OR_JUMP, t as Word),
        CondAndJump(t) => push2(out, TAG_COND_AND_JUMP, t as Word),
        CaseJump { target, const_ref } => {
            out.push(TAG_CASE_JUMP);
            out.push(target as Word);
            out.push(const_ref as Word);
        }
        Call { builtin, arg_count } => {
            out.push(TAG_CALL);
            out.push(builtin as Word);
            out.push(arg_count as Word);
        }
        UserCall { func, arg_count } => {
            out.push(TAG_USER_CALL);
            out.push(func as Word);
            out.push(arg_count as Word);
        }
        Return => out.push(TAG_RETURN),

        Duplicate => out.push(TAG_DUPLICATE),
        DupValue => out.push(TAG_DUP_VALUE),
        Pop => out.push(TAG_POP),
        Swap => out.push(TAG_SWAP),
        GetValue => out.push(TAG_GET_VALUE),
        Assign => out.push(TAG_ASSIGN),
        AssignBack => out.push(TAG_ASSIGN_BACK),
        AssignPop => out.push(TAG_ASSIGN_POP),

        PreInc => out.push(TAG_PRE_INC),
        PreDec => out.push(TAG_PRE_DEC),
        PostInc => out.push(TAG_POST_INC),
        PostDec => out.push(TAG_POST_DEC),

        Print => out.push(TAG_PRINT),
        PrintResult => out.push(TAG_PRINT_RESULT),
        PrintEol => out.push(TAG_PRINT_EOL),
        PrintSpace => out.push(TAG_PRINT_SPACE),
        PrintStr(i) => push2(out, TAG_PRINT_STR, i as Word),

        Save => out.push(TAG_SAVE),
        SaveVal => out.push(TAG_SAVE_VAL),
        SetConfig(k) => push2(out, TAG_SET_CONFIG, k as Word),
        GetConfig(k) => push2(out, TAG_GET_CONFIG, k as Word),
        SetEpsilon => out.push(TAG_SET_EPSILON),
        GetEpsilon => out.push(TAG_GET_EPSILON),
        Show(k) => push2(out, TAG_SHOW, k as Word),
        Test => out.push(TAG_TEST),
        Links => out.push(TAG_LINKS),
        Debug(line) => push2(out, TAG_DEBUG, line as Word),
        Quit => out.push(TAG_QUIT),
        Abort => out.push(TAG_ABORT),
        InitStatic(site) => push2(out, TAG_INIT_STATIC, site as Word),
        Nop => out.push(TAG_NOP),
    }
}

fn push2(out: &mut Vec<Word>, tag: Word, imm: Word) {
    out.push(tag);
    out.push(imm);
}

/// Recover the [`Opcode`] sequence from a flat word stream produced by
/// [`encode`].
pub fn decode(words: &[Word]) -> Result<Vec<Opcode>, DecodeError> {
    let mut ops = Vec::new();
    let mut pc = 0usize;
    while pc < words.len() {
        let (op, next) = decode_one(words, pc)?;
        ops.push(op);
        pc = next;
    }
    Ok(ops)
}

/// Decode a single [`Opcode`] starting at word offset `pc`, returning it
/// together with the offset of the next instruction. This is what the
/// interpreter's fetch/dispatch loop calls directly, since jump targets
/// (`spec.md` §4.3.1) are word offsets into the raw stream rather than
/// indices into a decoded `Vec<Opcode>`.
pub fn decode_one(words: &[Word], pc: usize) -> Result<(Opcode, usize), DecodeError> {
    {
        let start = pc;
        let tag = words[pc];
        let mut pc = pc + 1;
        let mut imm = |n: usize| -> Result<Word, DecodeError> {
            let w = words.get(pc).copied().ok_or(DecodeError::Truncated(start))?;
            pc += n.min(1);
            Ok(w)
        };
        let op = match tag {
            TAG_LOCAL_ADDR => Opcode::LocalAddr(imm(1)? as u16),
            TAG_LOCAL_VALUE => Opcode::LocalValue(imm(1)? as u16),
            TAG_GLOBAL_ADDR => Opcode::GlobalAddr(imm(1)? as GlobalRef),
            TAG_GLOBAL_VALUE => Opcode::GlobalValue(imm(1)? as GlobalRef),
            TAG_PARAM_ADDR => Opcode::ParamAddr(imm(1)? as u16),
            TAG_PARAM_VALUE => Opcode::ParamValue(imm(1)? as u16),
            TAG_ARG_VALUE => Opcode::ArgValue,
            TAG_OLD_VALUE => Opcode::OldValue,
            TAG_PTR => Opcode::Ptr,
            TAG_DEREF => Opcode::Deref,
            TAG_FI_ADDR => Opcode::FiAddr,
            TAG_FI_VALUE => Opcode::FiValue,

            TAG_NUMBER => Opcode::Number(imm(1)? as ConstRef),
            TAG_IMAGINARY => Opcode::Imaginary(imm(1)? as ConstRef),
            TAG_STRING => Opcode::String(imm(1)? as ConstRef),
            TAG_UNDEF => Opcode::Undef,
            TAG_ZERO => Opcode::Zero,
            TAG_ONE => Opcode::One,
            TAG_OBJ_CREATE => Opcode::ObjCreate(imm(1)? as u32),
            TAG_MAT_CREATE => Opcode::MatCreate(imm(1)? as u8),
            TAG_ELEM_INIT => Opcode::ElemInit(imm(1)? as u32),
            TAG_INIT_FILL => Opcode::InitFill,

            TAG_ADD => Opcode::Add,
            TAG_SUB => Opcode::Sub,
            TAG_MUL => Opcode::Mul,
            TAG_DIV => Opcode::Div,
            TAG_QUO => Opcode::Quo,
            TAG_MOD => Opcode::Mod,
            TAG_POWER => Opcode::Power,
            TAG_NEGATE => Opcode::Negate,
            TAG_INVERT => Opcode::Invert,
            TAG_SQUARE => Opcode::Square,
            TAG_INT => Opcode::Int,
            TAG_FRAC => Opcode::Frac,
            TAG_NUMERATOR => Opcode::Numerator,
            TAG_DENOMINATOR => Opcode::Denominator,
            TAG_SCALE => Opcode::Scale,
            TAG_LEFT_SHIFT => Opcode::LeftShift,
            TAG_RIGHT_SHIFT => Opcode::RightShift,
            TAG_ABS => Opcode::Abs,
            TAG_NORM => Opcode::Norm,
            TAG_RE => Opcode::Re,
            TAG_IM => Opcode::Im,
            TAG_CONJUGATE => Opcode::Conjugate,
            TAG_SGN => Opcode::Sgn,
            TAG_BIT => Opcode::Bit,
            TAG_HIGH_BIT => Opcode::HighBit,
            TAG_LOW_BIT => Opcode::LowBit,
            TAG_PLUS => Opcode::Plus,

            TAG_AND => Opcode::And,
            TAG_OR => Opcode::Or,
            TAG_XOR => Opcode::Xor,
            TAG_NOT => Opcode::Not,
            TAG_COMP => Opcode::Comp,
            TAG_CONTENT => Opcode::Content,
            TAG_HASH_OP => Opcode::HashOp,
            TAG_BACKSLASH => Opcode::Backslash,
            TAG_SET_MINUS => Opcode::SetMinus,

            TAG_EQ => Opcode::Eq,
            TAG_NE => Opcode::Ne,
            TAG_LT => Opcode::Lt,
            TAG_LE => Opcode::Le,
            TAG_GT => Opcode::Gt,
            TAG_GE => Opcode::Ge,
            TAG_CMP => Opcode::Cmp,

            TAG_IS_INT => Opcode::IsInt,
            TAG_IS_NUM => Opcode::IsNum,
            TAG_IS_REAL => Opcode::IsReal,
            TAG_IS_MAT => Opcode::IsMat,
            TAG_IS_LIST => Opcode::IsList,
            TAG_IS_OBJ => Opcode::IsObj,
            TAG_IS_STR => Opcode::IsStr,
            TAG_IS_FILE => Opcode::IsFile,
            TAG_IS_RAND => Opcode::IsRand,
            TAG_IS_RANDOM => Opcode::IsRandom,
            TAG_IS_CONFIG => Opcode::IsConfig,
            TAG_IS_HASH => Opcode::IsHash,
            TAG_IS_ASSOC => Opcode::IsAssoc,
            TAG_IS_BLK => Opcode::IsBlk,
            TAG_IS_OCTET => Opcode::IsOctet,
            TAG_IS_PTR => Opcode::IsPtr,
            TAG_IS_DEFINED => Opcode::IsDefined,
            TAG_IS_OBJ_TYPE => Opcode::IsObjType,
            TAG_IS_SIMPLE => Opcode::IsSimple,
            TAG_IS_ODD => Opcode::IsOdd,
            TAG_IS_EVEN => Opcode::IsEven,
            TAG_IS_NULL => Opcode::IsNull,
            TAG_IS_TYPE => Opcode::IsType(imm(1)? as u8),

            TAG_JUMP => Opcode::Jump(imm(1)? as u32),
            TAG_JUMP_Z => Opcode::JumpZ(imm(1)? as u32),
            TAG_JUMP_NZ => Opcode::JumpNz(imm(1)? as u32),
            TAG_JUMP_NN => Opcode::JumpNn(imm(1)? as u32),
            TAG_COND_OR_JUMP => Opcode::CondOrJump(imm(1)? as u32),
            TAG_COND_AND_JUMP => Opcode::CondAndJump(imm(1)? as u32),
            TAG_CASE_JUMP => {
                let target = imm(1)? as u32;
                let const_ref = imm(1)? as ConstRef;
                Opcode::CaseJump { target, const_ref }
            }
            TAG_CALL => {
                let builtin = imm(1)? as u32;
                let arg_count = imm(1)? as u16;
                Opcode::Call { builtin, arg_count }
            }
            TAG_USER_CALL => {
                let func = imm(1)? as u32;
                let arg_count = imm(1)? as u16;
                Opcode::UserCall { func, arg_count }
            }
            TAG_RETURN => Opcode::Return,

            TAG_DUPLICATE => Opcode::Duplicate,
            TAG_DUP_VALUE => Opcode::DupValue,
            TAG_POP => Opcode::Pop,
            TAG_SWAP => Opcode::Swap,
            TAG_GET_VALUE => Opcode::GetValue,
            TAG_ASSIGN => Opcode::Assign,
            TAG_ASSIGN_BACK => Opcode::AssignBack,
            TAG_ASSIGN_POP => Opcode::AssignPop,

            TAG_PRE_INC => Opcode::PreInc,
            TAG_PRE_DEC => Opcode::PreDec,
            TAG_POST_INC => Opcode::PostInc,
            TAG_POST_DEC => Opcode::PostDec,

            TAG_PRINT => Opcode::Print,
            TAG_PRINT_RESULT => Opcode::PrintResult,
            TAG_PRINT_EOL => Opcode::PrintEol,
            TAG_PRINT_SPACE => Opcode::PrintSpace,
            TAG_PRINT_STR => Opcode::PrintStr(imm(1)? as ConstRef),

            TAG_SAVE => Opcode::Save,
            TAG_SAVE_VAL => Opcode::SaveVal,
            TAG_SET_CONFIG => Opcode::SetConfig(imm(1)? as u16),
            TAG_GET_CONFIG => Opcode::GetConfig(imm(1)? as u16),
            TAG_SET_EPSILON => Opcode::SetEpsilon,
            TAG_GET_EPSILON => Opcode::GetEpsilon,
            TAG_SHOW => Opcode::Show(imm(1)? as u16),
            TAG_TEST => Opcode::Test,
            TAG_LINKS => Opcode::Links,
            TAG_DEBUG => Opcode::Debug(imm(1)? as u32),
            TAG_QUIT => Opcode::Quit,
            TAG_ABORT => Opcode::Abort,
            TAG_INIT_STATIC => Opcode::InitStatic(imm(1)? as u32),
            TAG_NOP => Opcode::Nop,

            other => return Err(DecodeError::UnknownTag(other, start)),
        };
        Ok((op, pc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode::*;

    #[test]
    fn round_trips_a_representative_sample() {
        let sample = vec![
            LocalAddr(3),
            One,
            AssignPop,
            ParamValue(0),
            Number(7),
            Add,
            UserCall { func: 2, arg_count: 1 },
            Jump(12),
            CaseJump {
                target: 5,
                const_ref: 1,
            },
            Return,
        ];
        let words = encode(&sample);
        let decoded = decode(&words).expect("decode");
        assert_eq!(decoded, sample);
    }

    #[test]
    fn rejects_unknown_tags() {
        let err = decode(&[0xdead]).unwrap_err();
        assert_eq!(err, DecodeError::UnknownTag(0xdead, 0));
    }

    #[test]
    fn reports_truncated_streams() {
        let err = decode(&[TAG_NUMBER]).unwrap_err();
        assert_eq!(err, DecodeError::Truncated(0));
    }
}
