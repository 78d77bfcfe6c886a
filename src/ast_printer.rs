//! Canonical, parenthesized rendering of the AST.
//!
//! A debugging aid, not core semantics: the `parse` CLI subcommand prints
//! programs through this, and the parser tests assert precedence and
//! desugaring against the canonical strings, e.g. `1 + 2 * 3` becomes
//! `(+ 1.0 (* 2.0 3.0))`.

use crate::ast::{Expr, LiteralValue, Stmt};

pub struct AstPrinter;

impl AstPrinter {
    /// One line per top-level statement.
    pub fn print_program(&self, statements: &[Stmt<'_>]) -> String {
        statements
            .iter()
            .map(|stmt| self.print_stmt(stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn print_stmt(&self, stmt: &Stmt<'_>) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(expr {})", self.print_expr(expr)),

            Stmt::Print(expr) => format!("(print {})", self.print_expr(expr)),

            Stmt::Var { name, initializer } => match initializer {
                Some(expr) => format!("(var {} {})", name.lexeme, self.print_expr(expr)),
                None => format!("(var {})", name.lexeme),
            },

            Stmt::Block(statements) => {
                let mut out = String::from("(block");

                for statement in statements {
                    out.push(' ');
                    out.push_str(&self.print_stmt(statement));
                }

                out.push(')');
                out
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_stmt) => format!(
                    "(if-else {} {} {})",
                    self.print_expr(condition),
                    self.print_stmt(then_branch),
                    self.print_stmt(else_stmt)
                ),
                None => format!(
                    "(if {} {})",
                    self.print_expr(condition),
                    self.print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => format!(
                "(while {} {})",
                self.print_expr(condition),
                self.print_stmt(body)
            ),

            Stmt::Function(declaration) => {
                let params: Vec<&str> = declaration
                    .params
                    .iter()
                    .map(|param| param.lexeme)
                    .collect();

                let mut out = format!("(fun {} ({})", declaration.name.lexeme, params.join(" "));

                for statement in &declaration.body {
                    out.push(' ');
                    out.push_str(&self.print_stmt(statement));
                }

                out.push(')');
                out
            }

            Stmt::Return { value, .. } => match value {
                Some(expr) => format!("(return {})", self.print_expr(expr)),
                None => "(return)".to_string(),
            },
        }
    }

    pub fn print_expr(&self, expr: &Expr<'_>) -> String {
        match expr {
            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }

                LiteralValue::Str(s) => s.to_string(),

                LiteralValue::True => "true".to_string(),

                LiteralValue::False => "false".to_string(),

                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Unary { operator, right } => {
                format!("({} {})", operator.lexeme, self.print_expr(right))
            }

            Expr::Binary {
                left,
                operator,
                right,
            }
            | Expr::Logical {
                left,
                operator,
                right,
            } => format!(
                "({} {} {})",
                operator.lexeme,
                self.print_expr(left),
                self.print_expr(right)
            ),

            Expr::Grouping(inner) => format!("(group {})", self.print_expr(inner)),

            Expr::Variable(name) => name.lexeme.to_string(),

            Expr::Assign { name, value } => {
                format!("(= {} {})", name.lexeme, self.print_expr(value))
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                let mut out = format!("(call {}", self.print_expr(callee));

                for argument in arguments {
                    out.push(' ');
                    out.push_str(&self.print_expr(argument));
                }

                out.push(')');
                out
            }
        }
    }
}
