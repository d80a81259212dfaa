//! Pretty-printing: renders an [`Ast`] back to source-like text, fully
//! parenthesizing every binary and prefix expression by the precedence the
//! parser resolved it with. This is Testable Property #1 (parse
//! round-trip prettiness) — `pretty(parse(s))` normalizes `s` to show its
//! actual operator grouping.

use crate::ast::{Ast, BinaryOp, Expr, ExprId, Stmt, StmtId, StringQuoting};

pub fn pretty_program(ast: &Ast) -> String {
    pretty_stmts(ast, &ast.program)
}

fn pretty_stmts(ast: &Ast, stmts: &[StmtId]) -> String {
    stmts
        .iter()
        .map(|&id| pretty_stmt(ast, id))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn pretty_stmt(ast: &Ast, id: StmtId) -> String {
    match ast.stmt(id) {
        Stmt::Let { name, declared, value } => {
            let value_str = pretty_expr(ast, *value);
            if matches!(**declared, luma_types::Type::Auto) {
                format!("let {name} = {value_str}")
            } else {
                format!("let {name} {declared} = {value_str}")
            }
        },
        Stmt::Assignment { name, value } => {
            format!("{name} = {}", pretty_expr(ast, *value))
        },
        Stmt::Return(value) => format!("return {}", pretty_expr(ast, *value)),
        Stmt::If { cond, then_block, else_block } => {
            let mut out = format!(
                "if {} then {}",
                pretty_expr(ast, *cond),
                pretty_stmt(ast, *then_block)
            );
            if let Some(else_block) = else_block {
                out.push_str(&format!(" else {}", pretty_stmt(ast, *else_block)));
            }
            out.push_str(" end");
            out
        },
        Stmt::Function { name, params, return_type, body } => {
            let header = format_header(&format!("{name}("), params);
            if matches!(**return_type, luma_types::Type::Void) {
                format!("fn {header} then {} end", pretty_stmt(ast, *body))
            } else {
                format!("fn {header} {return_type} then {} end", pretty_stmt(ast, *body))
            }
        },
        Stmt::Class { name, methods } => {
            if methods.is_empty() {
                format!("class {name} end")
            } else {
                format!("class {name} {} end", pretty_stmts(ast, methods))
            }
        },
        Stmt::Block(stmts) => pretty_stmts(ast, stmts),
        Stmt::ExpressionStatement(expr) => pretty_expr(ast, *expr),
    }
}

fn format_header(prefix: &str, params: &[(luma_util::Symbol, std::sync::Arc<luma_types::Type>)]) -> String {
    let args: Vec<String> = params.iter().map(|(n, t)| format!("{n} {t}")).collect();
    format!("{prefix}{})", args.join(", "))
}

pub fn pretty_expr(ast: &Ast, id: ExprId) -> String {
    match ast.expr(id) {
        Expr::Integer(text) | Expr::Float(text) => text.to_string(),
        Expr::String(text, quoting) => {
            let (open, close) = match quoting {
                StringQuoting::Single => ("'", "'"),
                StringQuoting::Double => ("\"", "\""),
                StringQuoting::Multiline => ("[[", "]]"),
            };
            format!("{open}{text}{close}")
        },
        Expr::Boolean(value) => value.to_string(),
        Expr::Identifier(name) => name.to_string(),
        Expr::Parenthesis(inner) => pretty_expr(ast, *inner),
        Expr::Prefix(op, right) => format!("({} {})", op.lexeme(), pretty_expr(ast, *right)),
        Expr::Binary(left, op, right) => {
            format!(
                "({} {} {})",
                pretty_expr(ast, *left),
                op_lexeme(*op),
                pretty_expr(ast, *right)
            )
        },
        Expr::Call(callee, args) => {
            let args_str: Vec<String> = args.iter().map(|&a| pretty_expr(ast, a)).collect();
            format!("{}({})", pretty_expr(ast, *callee), args_str.join(", "))
        },
        Expr::Index(callee, index) => {
            format!("{}[{}]", pretty_expr(ast, *callee), pretty_expr(ast, *index))
        },
        Expr::Field(callee, field) => format!("{}.{}", pretty_expr(ast, *callee), field),
        Expr::Lambda { params, return_type, body } => {
            let header = format_header("fn(", params);
            if matches!(**return_type, luma_types::Type::Void) {
                format!("{header} then {} end", pretty_stmt(ast, *body))
            } else {
                format!("{header} {return_type} then {} end", pretty_stmt(ast, *body))
            }
        },
        Expr::Array(elements) => {
            let args: Vec<String> = elements.iter().map(|&e| pretty_expr(ast, e)).collect();
            format!("[{}]", args.join(", "))
        },
        Expr::Hash { keys, values } => {
            let pairs: Vec<String> = keys
                .iter()
                .zip(values)
                .map(|(&k, &v)| format!("{}: {}", pretty_expr(ast, k), pretty_expr(ast, v)))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        },
    }
}

fn op_lexeme(op: BinaryOp) -> &'static str {
    op.lexeme()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn pretty(source: &str) -> String {
        let mut parser = Parser::new(source);
        let ast = parser.parse_program();
        assert!(!parser.diagnostics().has_errors(), "{:?}", parser.diagnostics().iter().collect::<Vec<_>>());
        pretty_program(&ast)
    }

    #[test]
    fn simple_addition_is_parenthesized() {
        assert_eq!(pretty("1 + 2 * 3"), "(1 + (2 * 3))");
    }

    #[test]
    fn full_precedence_ladder() {
        assert_eq!(
            pretty("1 + 2 * 3 ^ 2 - 4 / 2"),
            "((1 + (2 * (3 ^ 2))) - (4 / 2))"
        );
    }

    #[test]
    fn explicit_parens_disappear_after_reprint() {
        assert_eq!(pretty("(1 + 2) * 3"), "((1 + 2) * 3)");
    }

    #[test]
    fn left_associative_exponent() {
        assert_eq!(pretty("2 ^ 3 ^ 2"), "((2 ^ 3) ^ 2)");
    }
}
