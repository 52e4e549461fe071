use std::collections::HashMap;

/// Stack of lexical scopes, innermost last.
///
/// The checker binds names to types and the evaluator binds names to
/// reduced literals; both push one scope per block and pop it on exit.
#[derive(Debug, Clone)]
pub struct ScopeStack<T> {
    scopes: Vec<HashMap<String, T>>,
}

impl<T> Default for ScopeStack<T> {
    fn default() -> Self {
        Self { scopes: Vec::new() }
    }
}

impl<T> ScopeStack<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new, empty innermost scope.
    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Discard the innermost scope, returning its bindings.
    pub fn pop(&mut self) -> Option<HashMap<String, T>> {
        self.scopes.pop()
    }

    /// Bind `name` in the innermost scope, replacing an earlier binding of
    /// the same name in that scope. Opens a scope if none is open.
    pub fn declare(&mut self, name: impl Into<String>, value: T) {
        if self.scopes.is_empty() {
            self.push();
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    /// Look `name` up from the innermost scope outwards.
    pub fn lookup(&self, name: &str) -> Option<&T> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}
