//! Tree‑walking evaluator.
//!
//! [`Interpreter`] is the per‑run execution context: it owns the `globals`
//! scope (alive for the whole run), the mutable current‑environment pointer
//! that gets swapped on block and call entry, and the output sink `print`
//! writes to.  One interpreter is created per run; nothing is shared across
//! runs.
//!
//! Control transfer uses the `Err` channel twice over: a fatal
//! [`RuntimeError`] propagates to the top and aborts the run, while a
//! `return` travels as a non‑error signal until the call machinery, and
//! nothing else, consumes it.  Blocks and loops pass both through untouched.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Non‑local transfer raised during execution.
///
/// `Return` is not an error: it unwinds to the nearest call boundary and is
/// consumed there.  `Error` is fatal and crosses every boundary.
enum Unwind<'s> {
    Return { value: Value<'s>, line: usize },
    Error(RuntimeError),
}

impl<'s> From<RuntimeError> for Unwind<'s> {
    fn from(err: RuntimeError) -> Self {
        Unwind::Error(err)
    }
}

/// Result alias for everything that can unwind.
type Flow<'s, T> = std::result::Result<T, Unwind<'s>>;

/// The interpreter context threaded through a single run.
pub struct Interpreter<'s, W: Write> {
    /// Process‑wide scope for the run's lifetime; `clock` lives here.
    globals: Rc<RefCell<Environment<'s>>>,

    /// Innermost scope at the current execution point.
    environment: Rc<RefCell<Environment<'s>>>,

    /// Where `print` writes.  Stdout in the CLI, a buffer in tests.
    output: W,
}

impl<'s> Interpreter<'s, io::Stdout> {
    /// Interpreter printing to standard output.
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl<'s> Default for Interpreter<'s, io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'s, W: Write> Interpreter<'s, W> {
    /// Interpreter printing to an arbitrary sink.
    ///
    /// Native functions are installed into `globals` here, before any user
    /// code can run.
    pub fn with_output(output: W) -> Self {
        info!("Initializing interpreter");

        let globals: Rc<RefCell<Environment<'s>>> = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction {
                name: "clock",
                arity: 0,
                func: clock_native,
            },
        );

        Self {
            environment: globals.clone(),
            globals,
            output,
        }
    }

    /// The global scope, exposed for embedding and tests.
    pub fn globals(&self) -> Rc<RefCell<Environment<'s>>> {
        self.globals.clone()
    }

    /// Execute top‑level statements in order against `globals`.
    ///
    /// The first runtime error aborts the remaining statements.  A `return`
    /// signal escaping to this level is a stray return and reported as such.
    pub fn interpret(&mut self, statements: &[Stmt<'s>]) -> std::result::Result<(), RuntimeError> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            match self.execute(stmt) {
                Ok(()) => {}

                Err(Unwind::Return { line, .. }) => {
                    return Err(RuntimeError::StrayReturn { line });
                }

                Err(Unwind::Error(e)) => return Err(e),
            }
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// Evaluate a single expression against the current environment.
    ///
    /// Public entry for the `evaluate` CLI subcommand.
    pub fn evaluate(&mut self, expr: &Expr<'s>) -> std::result::Result<Value<'s>, RuntimeError> {
        match self.eval(expr) {
            Ok(value) => Ok(value),
            Err(Unwind::Return { line, .. }) => Err(RuntimeError::StrayReturn { line }),
            Err(Unwind::Error(e)) => Err(e),
        }
    }

    // ───────────────────────── statements ─────────────────────────

    fn execute(&mut self, stmt: &Stmt<'s>) -> Flow<'s, ()> {
        match stmt {
            Stmt::Expression(expr) => {
                self.eval(expr)?;
                Ok(())
            }

            Stmt::Print(expr) => {
                let value: Value<'s> = self.eval(expr)?;
                writeln!(self.output, "{}", value).map_err(RuntimeError::from)?;
                Ok(())
            }

            Stmt::Var { name, initializer } => {
                let value: Value<'s> = match initializer {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };

                debug!("Defining variable '{}'", name.lexeme);
                self.environment.borrow_mut().define(name.lexeme, value);
                Ok(())
            }

            Stmt::Block(statements) => {
                let scope: Rc<RefCell<Environment<'s>>> = Rc::new(RefCell::new(
                    Environment::with_enclosing(self.environment.clone()),
                ));

                self.execute_block(statements, scope)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let value: Value<'s> = self.eval(condition)?;

                if boolean_operand(&value, condition.line())? {
                    self.execute(then_branch)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt)
                } else {
                    Ok(())
                }
            }

            Stmt::While { condition, body } => {
                loop {
                    let value: Value<'s> = self.eval(condition)?;

                    if !boolean_operand(&value, condition.line())? {
                        break;
                    }

                    self.execute(body)?;
                }

                Ok(())
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.lexeme);

                // Capture the scope the declaration executes in.  That scope
                // receives the binding below, so the function can see its
                // own name (and later siblings) for recursion.
                let function: Value<'s> = Value::Function {
                    declaration: declaration.clone(),
                    closure: self.environment.clone(),
                };

                self.environment
                    .borrow_mut()
                    .define(declaration.name.lexeme, function);
                Ok(())
            }

            Stmt::Return { keyword, value } => {
                let value: Value<'s> = match value {
                    Some(expr) => self.eval(expr)?,
                    None => Value::Nil,
                };

                Err(Unwind::Return {
                    value,
                    line: keyword.line,
                })
            }
        }
    }

    /// Execute `statements` inside `environment`, restoring the previous
    /// environment on **every** exit path: normal completion, a runtime
    /// error, or a propagating `return`.
    fn execute_block(
        &mut self,
        statements: &[Stmt<'s>],
        environment: Rc<RefCell<Environment<'s>>>,
    ) -> Flow<'s, ()> {
        let previous: Rc<RefCell<Environment<'s>>> =
            std::mem::replace(&mut self.environment, environment);

        let mut result: Flow<'s, ()> = Ok(());

        for stmt in statements {
            result = self.execute(stmt);

            if result.is_err() {
                break;
            }
        }

        self.environment = previous;
        result
    }

    // ───────────────────────── expressions ────────────────────────

    fn eval(&mut self, expr: &Expr<'s>) -> Flow<'s, Value<'s>> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),

            Expr::Grouping(inner) => self.eval(inner),

            Expr::Variable(name) => {
                let value: Value<'s> = self.environment.borrow().get(name.lexeme, name.line)?;
                Ok(value)
            }

            Expr::Assign { name, value } => {
                let value: Value<'s> = self.eval(value)?;

                self.environment
                    .borrow_mut()
                    .assign(name.lexeme, value.clone(), name.line)?;
                Ok(value)
            }

            Expr::Unary { operator, right } => self.eval_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.eval_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => self.eval_logical(left, operator, right),

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_value: Value<'s> = self.eval(callee)?;

                let mut args: Vec<Value<'s>> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.eval(argument)?);
                }

                self.call_value(callee_value, args, paren)
            }
        }
    }

    fn eval_unary(&mut self, operator: &Token<'s>, right: &Expr<'s>) -> Flow<'s, Value<'s>> {
        let value: Value<'s> = self.eval(right)?;

        match operator.token_type {
            TokenType::MINUS => {
                let n: f64 = number_operand(&value, operator.line)?;
                Ok(Value::Number(-n))
            }

            TokenType::BANG => {
                let b: bool = boolean_operand(&value, operator.line)?;
                Ok(Value::Bool(!b))
            }

            _ => Err(Unwind::Error(RuntimeError::type_mismatch(
                operator.line,
                "Invalid unary operator.",
            ))),
        }
    }

    fn eval_binary(
        &mut self,
        left: &Expr<'s>,
        operator: &Token<'s>,
        right: &Expr<'s>,
    ) -> Flow<'s, Value<'s>> {
        // Operands are evaluated eagerly, left before right.
        let lhs: Value<'s> = self.eval(left)?;
        let rhs: Value<'s> = self.eval(right)?;

        // Equality is total over all value types; everything else below
        // requires two numbers.
        match operator.token_type {
            TokenType::EQUAL_EQUAL => return Ok(Value::Bool(lhs.is_equal(&rhs))),
            TokenType::BANG_EQUAL => return Ok(Value::Bool(!lhs.is_equal(&rhs))),
            _ => {}
        }

        let a: f64 = numeric_pair(&lhs, operator.line)?;
        let b: f64 = numeric_pair(&rhs, operator.line)?;

        match operator.token_type {
            TokenType::PLUS => Ok(Value::Number(a + b)),
            TokenType::MINUS => Ok(Value::Number(a - b)),
            TokenType::STAR => Ok(Value::Number(a * b)),

            TokenType::SLASH => {
                if b == 0.0 {
                    Err(Unwind::Error(RuntimeError::DivisionByZero {
                        line: operator.line,
                    }))
                } else {
                    Ok(Value::Number(a / b))
                }
            }

            TokenType::GREATER => Ok(Value::Bool(a > b)),
            TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
            TokenType::LESS => Ok(Value::Bool(a < b)),
            TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),

            _ => Err(Unwind::Error(RuntimeError::type_mismatch(
                operator.line,
                "Invalid binary operator.",
            ))),
        }
    }

    /// `and` / `or` over boolean operands.
    ///
    /// Both operands are evaluated, left first, before the operator applies;
    /// there is no short‑circuit.  A side effect or error in the right
    /// operand happens even when the left operand already decides the
    /// result.
    fn eval_logical(
        &mut self,
        left: &Expr<'s>,
        operator: &Token<'s>,
        right: &Expr<'s>,
    ) -> Flow<'s, Value<'s>> {
        let lhs: Value<'s> = self.eval(left)?;
        let rhs: Value<'s> = self.eval(right)?;

        let a: bool = boolean_operand(&lhs, operator.line)?;
        let b: bool = boolean_operand(&rhs, operator.line)?;

        match operator.token_type {
            TokenType::AND => Ok(Value::Bool(a && b)),
            TokenType::OR => Ok(Value::Bool(a || b)),

            _ => Err(Unwind::Error(RuntimeError::type_mismatch(
                operator.line,
                "Invalid logical operator.",
            ))),
        }
    }

    // ───────────────────────── calls ──────────────────────────────

    fn call_value(
        &mut self,
        callee: Value<'s>,
        args: Vec<Value<'s>>,
        paren: &Token<'s>,
    ) -> Flow<'s, Value<'s>> {
        match callee {
            Value::NativeFunction { name, arity, func } => {
                debug!("Calling native function '{}'", name);

                if args.len() != arity {
                    return Err(Unwind::Error(RuntimeError::ArityMismatch {
                        expected: arity,
                        got: args.len(),
                        line: paren.line,
                    }));
                }

                let result: Value<'s> = func(&args)?;
                Ok(result)
            }

            Value::Function {
                declaration,
                closure,
            } => {
                debug!("Calling function '{}'", declaration.name.lexeme);

                if args.len() != declaration.params.len() {
                    return Err(Unwind::Error(RuntimeError::ArityMismatch {
                        expected: declaration.params.len(),
                        got: args.len(),
                        line: paren.line,
                    }));
                }

                self.call_function(&declaration, &closure, args)
            }

            _ => Err(Unwind::Error(RuntimeError::NotCallable { line: paren.line })),
        }
    }

    /// Invoke a user function: the call frame is a fresh child of the
    /// *closure's* environment (not the caller's), parameters bind
    /// positionally, and only `return` produces a non‑`nil` result.
    fn call_function(
        &mut self,
        declaration: &Rc<FunctionDecl<'s>>,
        closure: &Rc<RefCell<Environment<'s>>>,
        args: Vec<Value<'s>>,
    ) -> Flow<'s, Value<'s>> {
        let frame: Rc<RefCell<Environment<'s>>> =
            Rc::new(RefCell::new(Environment::with_enclosing(closure.clone())));

        {
            let mut frame_ref = frame.borrow_mut();
            for (param, arg) in declaration.params.iter().zip(args) {
                frame_ref.define(param.lexeme, arg);
            }
        }

        match self.execute_block(&declaration.body, frame) {
            Ok(()) => Ok(Value::Nil),

            // The call boundary consumes the return signal; errors keep
            // propagating.
            Err(Unwind::Return { value, .. }) => Ok(value),

            Err(err) => Err(err),
        }
    }
}

// ───────────────────────── helpers ────────────────────────────────

fn literal_value<'s>(literal: &LiteralValue) -> Value<'s> {
    match literal {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::Str(s.clone()),
        LiteralValue::True => Value::Bool(true),
        LiteralValue::False => Value::Bool(false),
        LiteralValue::Nil => Value::Nil,
    }
}

/// Unary operand that must be a number.
fn number_operand(value: &Value<'_>, line: usize) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(RuntimeError::type_mismatch(line, "Operand must be a number.")),
    }
}

/// Binary operand that must be a number.
fn numeric_pair(value: &Value<'_>, line: usize) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(RuntimeError::type_mismatch(
            line,
            "Operands must be numbers.",
        )),
    }
}

/// Operand of a logical operator, `!`, or a condition: must be a boolean.
fn boolean_operand(value: &Value<'_>, line: usize) -> Result<bool, RuntimeError> {
    match value {
        Value::Bool(b) => Ok(*b),
        _ => Err(RuntimeError::type_mismatch(
            line,
            "Operand must be a boolean.",
        )),
    }
}

/// Native `clock()`: wall‑clock seconds since the Unix epoch as a double.
fn clock_native<'s>(_args: &[Value<'s>]) -> Result<Value<'s>, RuntimeError> {
    let micros: i64 = Utc::now().timestamp_micros();
    Ok(Value::Number(micros as f64 / 1_000_000.0))
}
