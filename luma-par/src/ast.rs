//! The Luma AST: a tree of tagged variants built once by the parser and
//! never mutated afterward. Expressions and statements live in their own
//! arenas (`ExprId`/`StmtId` index into `Ast::exprs`/`Ast::stmts`) rather
//! than behind `Box`, so every node has a cheap `Copy` identity the type
//! checker can key a type map on — two structurally identical literals in
//! different positions get distinct ids for free.

use luma_types::Type;
use luma_util::{define_idx, IndexVec, Symbol};
use std::sync::Arc;

define_idx! {
    /// Identity of an [`Expr`] node within one [`Ast`].
    pub struct ExprId;
}

define_idx! {
    /// Identity of a [`Stmt`] node within one [`Ast`].
    pub struct StmtId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StringQuoting {
    Single,
    Double,
    Multiline,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixOp {
    Neg,
    Not,
}

impl PrefixOp {
    pub fn lexeme(self) -> &'static str {
        match self {
            PrefixOp::Neg => "-",
            PrefixOp::Not => "not",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    Concat,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

impl BinaryOp {
    pub fn lexeme(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Exp => "^",
            BinaryOp::Concat => "..",
            BinaryOp::Eq => "==",
            BinaryOp::Neq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Lte => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Gte => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt | BinaryOp::Gte
        )
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Neq)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// One function parameter: a name paired with its declared type.
pub type Param = (Symbol, Arc<Type>);

#[derive(Clone, Debug)]
pub enum Expr {
    Integer(Symbol),
    Float(Symbol),
    String(Symbol, StringQuoting),
    Boolean(bool),
    Identifier(Symbol),
    Parenthesis(ExprId),
    Prefix(PrefixOp, ExprId),
    Binary(ExprId, BinaryOp, ExprId),
    Call(ExprId, Vec<ExprId>),
    Index(ExprId, ExprId),
    Field(ExprId, Symbol),
    /// Does not bind a name; `body` is a `Stmt::Block`.
    Lambda { params: Vec<Param>, return_type: Arc<Type>, body: StmtId },
    Array(Vec<ExprId>),
    /// `keys` and `values` are equal-length parallel sequences.
    Hash { keys: Vec<ExprId>, values: Vec<ExprId> },
}

#[derive(Clone, Debug)]
pub enum Stmt {
    /// `declared` is `Type::Auto` when the source omitted an annotation.
    Let { name: Symbol, declared: Arc<Type>, value: ExprId },
    Assignment { name: Symbol, value: ExprId },
    Return(ExprId),
    If { cond: ExprId, then_block: StmtId, else_block: Option<StmtId> },
    Function { name: Symbol, params: Vec<Param>, return_type: Arc<Type>, body: StmtId },
    /// `methods` are `Stmt::Function` ids.
    Class { name: Symbol, methods: Vec<StmtId> },
    Block(Vec<StmtId>),
    ExpressionStatement(ExprId),
}

/// Arenas for one parsed program plus the root statement sequence.
#[derive(Default, Debug)]
pub struct Ast {
    pub exprs: IndexVec<ExprId, Expr>,
    pub stmts: IndexVec<StmtId, Stmt>,
    pub program: Vec<StmtId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_expr(&mut self, expr: Expr) -> ExprId {
        self.exprs.push(expr)
    }

    pub fn push_stmt(&mut self, stmt: Stmt) -> StmtId {
        self.stmts.push(stmt)
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id]
    }
}
