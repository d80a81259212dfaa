//! A recursive-descent statement parser wrapping a Pratt-style
//! precedence-climbing expression parser. The parser never aborts: a
//! malformed construct is reported to its [`Diagnostics`] bag and the
//! statement loop resumes at the next likely statement boundary.

use crate::ast::{Ast, BinaryOp, Expr, ExprId, Param, PrefixOp, Stmt, StmtId, StringQuoting};
use luma_lex::{Lexer, Token, TokenKind};
use luma_types::Type;
use luma_util::{Diagnostics, Symbol};
use std::sync::Arc;

/// Binding powers for the Pratt expression parser, lowest to highest.
/// Every operator is left-associative: the infix builder recurses with
/// `left_bp + 1`, so a same-precedence operator to the right is left for
/// the enclosing loop iteration to fold in instead of the recursive call.
mod bp {
    pub const LOWEST: u8 = 0;
    pub const OR: u8 = 2;
    pub const AND: u8 = 4;
    pub const COMPARISON: u8 = 6;
    pub const CONCAT: u8 = 8;
    pub const ADDITIVE: u8 = 10;
    pub const MULTIPLICATIVE: u8 = 12;
    pub const EXPONENT: u8 = 14;
    pub const UNARY: u8 = 16;
    pub const CALL: u8 = 18;
    pub const INDEX: u8 = 20;
    pub const FIELD: u8 = 22;
}

fn infix_binding_power(kind: TokenKind) -> Option<(u8, u8)> {
    use TokenKind::*;
    let left = match kind {
        Or => bp::OR,
        And => bp::AND,
        Eq | TokenKind::Neq | Lt | Lte | Gt | Gte => bp::COMPARISON,
        Concat => bp::CONCAT,
        Plus | Minus => bp::ADDITIVE,
        Star | Slash | Percent => bp::MULTIPLICATIVE,
        Caret => bp::EXPONENT,
        LParen => bp::CALL,
        LBracket => bp::INDEX,
        Dot => bp::FIELD,
        _ => return None,
    };
    Some((left, left + 1))
}

fn binary_op_for(kind: TokenKind) -> Option<BinaryOp> {
    use TokenKind::*;
    Some(match kind {
        Plus => BinaryOp::Add,
        Minus => BinaryOp::Sub,
        Star => BinaryOp::Mul,
        Slash => BinaryOp::Div,
        Percent => BinaryOp::Mod,
        Caret => BinaryOp::Exp,
        Concat => BinaryOp::Concat,
        TokenKind::Eq => BinaryOp::Eq,
        TokenKind::Neq => BinaryOp::Neq,
        Lt => BinaryOp::Lt,
        Lte => BinaryOp::Lte,
        Gt => BinaryOp::Gt,
        Gte => BinaryOp::Gte,
        And => BinaryOp::And,
        Or => BinaryOp::Or,
        _ => return None,
    })
}

fn atom_type_for(lexeme: Symbol) -> Arc<Type> {
    match lexeme.as_str() {
        "int" => Type::int(),
        "float" => Type::float(),
        "string" => Type::string(),
        "bool" => Type::bool(),
        "void" => Type::void(),
        _ => Type::unknown(),
    }
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    diagnostics: Diagnostics,
    ast: Ast,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next();
        let peek = lexer.next();
        Parser {
            lexer,
            current,
            peek,
            diagnostics: Diagnostics::new(),
            ast: Ast::new(),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Parses the whole input, returning the resulting [`Ast`] regardless
    /// of whether errors were recorded. Callers gate on `diagnostics()`,
    /// which remains readable afterward since this only borrows `self`.
    pub fn parse_program(&mut self) -> Ast {
        while self.current.kind != TokenKind::Eof {
            match self.parse_statement() {
                Some(id) => self.ast.program.push(id),
                None => self.synchronize(),
            }
        }
        std::mem::take(&mut self.ast)
    }

    fn advance(&mut self) -> Token {
        let previous = self.current;
        self.current = self.peek;
        self.peek = self.lexer.next();
        previous
    }

    fn expect(&mut self, kind: TokenKind, description: &str) {
        if self.current.kind == kind {
            self.advance();
        } else {
            self.diagnostics.error(format!(
                "expected {description}, got {:?}",
                self.current.kind
            ));
            self.advance();
        }
    }

    fn starts_type(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Type | TokenKind::LBracket | TokenKind::Fn | TokenKind::LParen
        )
    }

    /// Skips tokens until one that plausibly starts a new statement, so a
    /// single malformed statement does not poison the rest of the parse.
    fn synchronize(&mut self) {
        while !matches!(
            self.current.kind,
            TokenKind::Let
                | TokenKind::If
                | TokenKind::Return
                | TokenKind::Fn
                | TokenKind::Class
                | TokenKind::End
                | TokenKind::Else
                | TokenKind::Eof
        ) {
            self.advance();
        }
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    fn parse_statement(&mut self) -> Option<StmtId> {
        match self.current.kind {
            TokenKind::Let => self.parse_let(),
            TokenKind::If => self.parse_if(),
            TokenKind::Return => self.parse_return(),
            TokenKind::Fn => self.parse_function_stmt(),
            TokenKind::Class => self.parse_class(),
            TokenKind::Identifier if self.peek.kind == TokenKind::Assign => self.parse_assignment(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_block(&mut self) -> StmtId {
        let mut stmts = Vec::new();
        while !matches!(
            self.current.kind,
            TokenKind::End | TokenKind::Else | TokenKind::Eof
        ) {
            match self.parse_statement() {
                Some(id) => stmts.push(id),
                None => self.synchronize(),
            }
        }
        self.ast.push_stmt(Stmt::Block(stmts))
    }

    fn parse_let(&mut self) -> Option<StmtId> {
        self.advance(); // 'let'
        let name = self.current.lexeme;
        self.expect(TokenKind::Identifier, "identifier");
        let declared = if self.current.kind == TokenKind::Assign {
            Type::auto()
        } else {
            self.parse_type()
        };
        self.expect(TokenKind::Assign, "'='");
        let value = self.parse_expression_bp(bp::LOWEST)?;
        Some(self.ast.push_stmt(Stmt::Let { name, declared, value }))
    }

    fn parse_assignment(&mut self) -> Option<StmtId> {
        let name = self.current.lexeme;
        self.advance(); // identifier
        self.advance(); // '='
        let value = self.parse_expression_bp(bp::LOWEST)?;
        Some(self.ast.push_stmt(Stmt::Assignment { name, value }))
    }

    fn parse_return(&mut self) -> Option<StmtId> {
        self.advance(); // 'return'
        let value = self.parse_expression_bp(bp::LOWEST)?;
        Some(self.ast.push_stmt(Stmt::Return(value)))
    }

    fn parse_if(&mut self) -> Option<StmtId> {
        self.advance(); // 'if'
        let cond = self.parse_expression_bp(bp::LOWEST)?;
        self.expect(TokenKind::Then, "'then'");
        let then_block = self.parse_block();
        let else_block = if self.current.kind == TokenKind::Else {
            self.advance();
            Some(self.parse_block())
        } else {
            None
        };
        self.expect(TokenKind::End, "'end'");
        Some(self.ast.push_stmt(Stmt::If { cond, then_block, else_block }))
    }

    fn parse_param_list(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        while self.current.kind == TokenKind::Identifier {
            let name = self.current.lexeme;
            self.advance();
            let ty = self.parse_type();
            params.push((name, ty));
            if self.current.kind == TokenKind::Comma {
                self.advance();
            } else {
                break;
            }
        }
        params
    }

    fn parse_function_stmt(&mut self) -> Option<StmtId> {
        self.advance(); // 'fn'
        let name = self.current.lexeme;
        self.expect(TokenKind::Identifier, "identifier");
        self.expect(TokenKind::LParen, "'('");
        let params = self.parse_param_list();
        self.expect(TokenKind::RParen, "')'");
        let return_type = if self.starts_type() { self.parse_type() } else { Type::void() };
        self.expect(TokenKind::Then, "'then'");
        let body = self.parse_block();
        self.expect(TokenKind::End, "'end'");
        Some(self.ast.push_stmt(Stmt::Function { name, params, return_type, body }))
    }

    fn parse_class(&mut self) -> Option<StmtId> {
        self.advance(); // 'class'
        let name = self.current.lexeme;
        self.expect(TokenKind::Identifier, "identifier");
        let mut methods = Vec::new();
        while self.current.kind == TokenKind::Fn {
            if let Some(method) = self.parse_function_stmt() {
                methods.push(method);
            }
        }
        self.expect(TokenKind::End, "'end'");
        Some(self.ast.push_stmt(Stmt::Class { name, methods }))
    }

    fn parse_expression_statement(&mut self) -> Option<StmtId> {
        let expr = self.parse_expression_bp(bp::LOWEST)?;
        Some(self.ast.push_stmt(Stmt::ExpressionStatement(expr)))
    }

    // ---------------------------------------------------------------
    // Types
    // ---------------------------------------------------------------

    /// `type ::= ATOM | '[' type ']' | '[' type ']' type
    ///         | 'fn' '(' typelist? ')' type | '(' type ')'`
    fn parse_type(&mut self) -> Arc<Type> {
        match self.current.kind {
            TokenKind::Type => {
                let ty = atom_type_for(self.current.lexeme);
                self.advance();
                ty
            },
            TokenKind::LBracket => {
                self.advance();
                let inner = self.parse_type();
                self.expect(TokenKind::RBracket, "']'");
                if self.starts_type() {
                    let value = self.parse_type();
                    Type::hash(inner, value)
                } else {
                    Type::array(inner)
                }
            },
            TokenKind::Fn => {
                self.advance();
                self.expect(TokenKind::LParen, "'('");
                let mut params = Vec::new();
                if self.current.kind != TokenKind::RParen {
                    params.push(self.parse_type());
                    while self.current.kind == TokenKind::Comma {
                        self.advance();
                        params.push(self.parse_type());
                    }
                }
                self.expect(TokenKind::RParen, "')'");
                let ret = self.parse_type();
                Type::function(params, ret)
            },
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_type();
                self.expect(TokenKind::RParen, "')'");
                inner
            },
            _ => {
                self.diagnostics.error(format!(
                    "expected a type, got {:?}",
                    self.current.kind
                ));
                self.advance();
                Type::unknown()
            },
        }
    }

    // ---------------------------------------------------------------
    // Expressions (Pratt)
    // ---------------------------------------------------------------

    pub fn parse_expression_bp(&mut self, min_bp: u8) -> Option<ExprId> {
        let mut left = self.parse_prefix()?;

        while let Some((left_bp, right_bp)) = infix_binding_power(self.current.kind) {
            if left_bp <= min_bp {
                break;
            }
            left = self.parse_infix(left, right_bp)?;
        }

        Some(left)
    }

    fn parse_prefix(&mut self) -> Option<ExprId> {
        match self.current.kind {
            TokenKind::Integer => {
                let text = self.current.lexeme;
                self.advance();
                Some(self.ast.push_expr(Expr::Integer(text)))
            },
            TokenKind::Float => {
                let text = self.current.lexeme;
                self.advance();
                Some(self.ast.push_expr(Expr::Float(text)))
            },
            TokenKind::StringSingle => self.parse_string(StringQuoting::Single),
            TokenKind::StringDouble => self.parse_string(StringQuoting::Double),
            TokenKind::StringMultiline => self.parse_string(StringQuoting::Multiline),
            TokenKind::True => {
                self.advance();
                Some(self.ast.push_expr(Expr::Boolean(true)))
            },
            TokenKind::False => {
                self.advance();
                Some(self.ast.push_expr(Expr::Boolean(false)))
            },
            TokenKind::Identifier => {
                let name = self.current.lexeme;
                self.advance();
                Some(self.ast.push_expr(Expr::Identifier(name)))
            },
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression_bp(bp::LOWEST)?;
                self.expect(TokenKind::RParen, "')'");
                Some(self.ast.push_expr(Expr::Parenthesis(inner)))
            },
            TokenKind::LBracket => self.parse_array(),
            TokenKind::LBrace => self.parse_hash(),
            TokenKind::Minus => {
                self.advance();
                let right = self.parse_expression_bp(bp::UNARY)?;
                Some(self.ast.push_expr(Expr::Prefix(PrefixOp::Neg, right)))
            },
            TokenKind::Not => {
                self.advance();
                let right = self.parse_expression_bp(bp::UNARY)?;
                Some(self.ast.push_expr(Expr::Prefix(PrefixOp::Not, right)))
            },
            TokenKind::Fn => self.parse_lambda(),
            other => {
                self.diagnostics.error(format!("no prefix parse function for {other:?}"));
                None
            },
        }
    }

    fn parse_string(&mut self, quoting: StringQuoting) -> Option<ExprId> {
        let text = self.current.lexeme;
        self.advance();
        Some(self.ast.push_expr(Expr::String(text, quoting)))
    }

    fn parse_array(&mut self) -> Option<ExprId> {
        self.advance(); // '['
        let mut elements = Vec::new();
        if self.current.kind != TokenKind::RBracket {
            elements.push(self.parse_expression_bp(bp::LOWEST)?);
            while self.current.kind == TokenKind::Comma {
                self.advance();
                elements.push(self.parse_expression_bp(bp::LOWEST)?);
            }
        }
        self.expect(TokenKind::RBracket, "']'");
        Some(self.ast.push_expr(Expr::Array(elements)))
    }

    fn parse_hash(&mut self) -> Option<ExprId> {
        self.advance(); // '{'
        let mut keys = Vec::new();
        let mut values = Vec::new();
        if self.current.kind != TokenKind::RBrace {
            loop {
                keys.push(self.parse_expression_bp(bp::LOWEST)?);
                self.expect(TokenKind::Colon, "':'");
                values.push(self.parse_expression_bp(bp::LOWEST)?);
                if self.current.kind == TokenKind::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(TokenKind::RBrace, "'}'");
        Some(self.ast.push_expr(Expr::Hash { keys, values }))
    }

    fn parse_lambda(&mut self) -> Option<ExprId> {
        self.advance(); // 'fn'
        self.expect(TokenKind::LParen, "'('");
        let params = self.parse_param_list();
        self.expect(TokenKind::RParen, "')'");
        let return_type = if self.starts_type() { self.parse_type() } else { Type::void() };
        self.expect(TokenKind::Then, "'then'");
        let body = self.parse_block();
        self.expect(TokenKind::End, "'end'");
        Some(self.ast.push_expr(Expr::Lambda { params, return_type, body }))
    }

    fn parse_infix(&mut self, left: ExprId, right_bp: u8) -> Option<ExprId> {
        match self.current.kind {
            TokenKind::LParen => self.parse_call(left),
            TokenKind::LBracket => self.parse_index(left),
            TokenKind::Dot => self.parse_field(left),
            kind => {
                let op = binary_op_for(kind).expect("infix_binding_power and binary_op_for must agree");
                self.advance();
                let right = self.parse_expression_bp(right_bp)?;
                Some(self.ast.push_expr(Expr::Binary(left, op, right)))
            },
        }
    }

    fn parse_call(&mut self, callee: ExprId) -> Option<ExprId> {
        self.advance(); // '('
        let mut args = Vec::new();
        if self.current.kind != TokenKind::RParen {
            args.push(self.parse_expression_bp(bp::LOWEST)?);
            while self.current.kind == TokenKind::Comma {
                self.advance();
                args.push(self.parse_expression_bp(bp::LOWEST)?);
            }
        }
        self.expect(TokenKind::RParen, "')'");
        Some(self.ast.push_expr(Expr::Call(callee, args)))
    }

    fn parse_index(&mut self, callee: ExprId) -> Option<ExprId> {
        self.advance(); // '['
        let index = self.parse_expression_bp(bp::LOWEST)?;
        self.expect(TokenKind::RBracket, "']'");
        Some(self.ast.push_expr(Expr::Index(callee, index)))
    }

    fn parse_field(&mut self, callee: ExprId) -> Option<ExprId> {
        self.advance(); // '.'
        let field = self.current.lexeme;
        self.expect(TokenKind::Identifier, "identifier");
        Some(self.ast.push_expr(Expr::Field(callee, field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Expr, Stmt};

    fn parse(source: &str) -> Ast {
        let mut parser = Parser::new(source);
        parser.parse_program()
    }

    #[test]
    fn parses_let_with_inferred_type() {
        let ast = parse("let x = 5");
        assert_eq!(ast.program.len(), 1);
        match ast.stmt(ast.program[0]) {
            Stmt::Let { name, declared, value } => {
                assert_eq!(name.as_str(), "x");
                assert!(matches!(**declared, Type::Auto));
                assert!(matches!(ast.expr(*value), Expr::Integer(_)));
            },
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn parses_let_with_declared_type() {
        let ast = parse("let x int = 5");
        match ast.stmt(ast.program[0]) {
            Stmt::Let { declared, .. } => assert!(matches!(**declared, Type::Int)),
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn parses_array_type() {
        let ast = parse("let xs [int] = xs");
        match ast.stmt(ast.program[0]) {
            Stmt::Let { declared, .. } => match &**declared {
                Type::Array { elem } => assert!(matches!(**elem, Type::Int)),
                other => panic!("expected array type, got {other:?}"),
            },
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn parses_hash_type() {
        let ast = parse("let m [string] int = m");
        match ast.stmt(ast.program[0]) {
            Stmt::Let { declared, .. } => match &**declared {
                Type::Hash { key, value } => {
                    assert!(matches!(**key, Type::String));
                    assert!(matches!(**value, Type::Int));
                },
                other => panic!("expected hash type, got {other:?}"),
            },
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn assignment_is_promoted_from_expression_statement() {
        let ast = parse("let x = 1 x = 2");
        assert_eq!(ast.program.len(), 2);
        assert!(matches!(ast.stmt(ast.program[1]), Stmt::Assignment { .. }));
    }

    #[test]
    fn parses_if_else() {
        let ast = parse("if true then 1 else 2 end");
        match ast.stmt(ast.program[0]) {
            Stmt::If { else_block, .. } => assert!(else_block.is_some()),
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn parses_function_declaration() {
        let ast = parse("fn add(a int, b int) int then return a + b end");
        match ast.stmt(ast.program[0]) {
            Stmt::Function { name, params, return_type, .. } => {
                assert_eq!(name.as_str(), "add");
                assert_eq!(params.len(), 2);
                assert!(matches!(**return_type, Type::Int));
            },
            other => panic!("expected Function, got {other:?}"),
        }
    }

    #[test]
    fn call_parses_with_left_to_right_arguments() {
        let ast = parse("add(5, 4)");
        match ast.stmt(ast.program[0]) {
            Stmt::ExpressionStatement(e) => match ast.expr(*e) {
                Expr::Call(_, args) => assert_eq!(args.len(), 2),
                other => panic!("expected Call, got {other:?}"),
            },
            other => panic!("expected ExpressionStatement, got {other:?}"),
        }
    }

    #[test]
    fn missing_prefix_records_error_and_does_not_panic() {
        let mut parser = Parser::new("nil");
        let _ = parser.parse_program();
    }

    #[test]
    fn malformed_let_recovers_at_next_statement() {
        let ast = parse("let = 5 let y = 2");
        assert!(ast.program.len() >= 1);
    }
}
