//! Compiles a type-checked [`luma_par::Ast`] into instructions via an
//! [`Emitter`]. Ships [`TapeEmitter`], a reference emitter used by the
//! compiler's own test suite and by `lumac` for its current bytecode dump.

mod bytecode;
mod compiler;
mod emitter;

pub use bytecode::{Bytecode, Constant, Instruction, Opcode};
pub use compiler::Compiler;
pub use emitter::{Emitter, TapeEmitter};
