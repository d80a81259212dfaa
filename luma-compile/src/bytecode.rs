//! The concrete instruction/constant shapes the reference emitter produces.
//!
//! The compiler never names a concrete opcode layout itself — it only calls
//! [`crate::Emitter`] methods. This module exists for [`crate::TapeEmitter`]
//! and for tests that assert on the resulting tape.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Opcode {
    Push,
    Load,
    Store,
    AddInt,
    SubInt,
    MulInt,
    DivInt,
    AddFloat,
    SubFloat,
    MulFloat,
    DivFloat,
    ToFloat,
    NotBool,
    LtInt,
    LteInt,
    GtInt,
    GteInt,
    LtFloat,
    LteFloat,
    GtFloat,
    GteFloat,
    Eq,
    Neq,
    AndBool,
    OrBool,
    AddString,
    ReturnValue,
    JumpFalse,
    Jump,
    PushClosure,
    Call,
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Opcode::Push => "PUSH",
            Opcode::Load => "LOAD",
            Opcode::Store => "STORE",
            Opcode::AddInt => "ADD_INT",
            Opcode::SubInt => "SUB_INT",
            Opcode::MulInt => "MUL_INT",
            Opcode::DivInt => "DIV_INT",
            Opcode::AddFloat => "ADD_FLOAT",
            Opcode::SubFloat => "SUB_FLOAT",
            Opcode::MulFloat => "MUL_FLOAT",
            Opcode::DivFloat => "DIV_FLOAT",
            Opcode::ToFloat => "TO_FLOAT",
            Opcode::NotBool => "NOT_BOOL",
            Opcode::LtInt => "LT_INT",
            Opcode::LteInt => "LTE_INT",
            Opcode::GtInt => "GT_INT",
            Opcode::GteInt => "GTE_INT",
            Opcode::LtFloat => "LT_FLOAT",
            Opcode::LteFloat => "LTE_FLOAT",
            Opcode::GtFloat => "GT_FLOAT",
            Opcode::GteFloat => "GTE_FLOAT",
            Opcode::Eq => "EQ",
            Opcode::Neq => "NEQ",
            Opcode::AndBool => "AND_BOOL",
            Opcode::OrBool => "OR_BOOL",
            Opcode::AddString => "ADD_STRING",
            Opcode::ReturnValue => "RETURN_VALUE",
            Opcode::JumpFalse => "JUMP_FALSE",
            Opcode::Jump => "JUMP",
            Opcode::PushClosure => "PUSH_CLOSURE",
            Opcode::Call => "CALL",
        };
        f.write_str(name)
    }
}

/// One instruction. `args` are integer indices into the constants pool, the
/// slot table, or instruction offsets — never raw payload bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub args: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    /// Entry point and parameter count of a compiled function or lambda.
    Closure { entry: usize, arity: usize },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bytecode {
    pub tape: Vec<Instruction>,
    pub constants: Vec<Constant>,
}
