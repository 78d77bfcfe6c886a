use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::value::Value;

/// A single lexical scope: name→value bindings plus a link to the enclosing
/// scope.
///
/// One `Environment` is created for the globals, one per block entry, and one
/// per function call.  The `enclosing` edge is a shared owning pointer so a
/// closure can keep its defining scope alive after the call frame that
/// created it has returned; sibling closures created in the same scope alias
/// the same bindings.
#[derive(Debug, Clone)]
pub struct Environment<'s> {
    values: HashMap<String, Value<'s>>,
    enclosing: Option<Rc<RefCell<Environment<'s>>>>,
}

impl<'s> Environment<'s> {
    /// The outermost (global) scope.
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    /// A child scope of `enclosing`.
    pub fn with_enclosing(enclosing: Rc<RefCell<Environment<'s>>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Declare `name` in *this* scope, shadowing any outer binding.
    /// Re-declaring an existing name overwrites it.
    pub fn define(&mut self, name: &str, value: Value<'s>) {
        self.values.insert(name.to_string(), value);
    }

    /// Read `name`, walking the scope chain outward.
    pub fn get(&self, name: &str, line: usize) -> Result<Value<'s>, RuntimeError> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
                line,
            })
        }
    }

    /// Overwrite the nearest existing binding of `name`, walking the scope
    /// chain outward.  Assignment never declares.
    pub fn assign(&mut self, name: &str, value: Value<'s>, line: usize) -> Result<(), RuntimeError> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value, line)
        } else {
            Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
                line,
            })
        }
    }
}

impl<'s> Default for Environment<'s> {
    fn default() -> Self {
        Self::new()
    }
}
