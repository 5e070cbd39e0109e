//! Tracks declared names while lowering, so the lowerer can pick
//! collision-free synthetic names (destructuring temporaries, anonymous
//! function ids) without a separate renaming pass.

use rustc_hash::FxHashSet;

pub struct ScopeStack {
    scopes: Vec<FxHashSet<String>>,
    synthetic_counter: u32,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack {
            scopes: vec![FxHashSet::default()],
            synthetic_counter: 0,
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(FxHashSet::default());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty(), "scope stack underflow");
    }

    pub fn declare(&mut self, name: impl Into<String>) {
        if let Some(top) = self.scopes.last_mut() {
            top.insert(name.into());
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.scopes.iter().rev().any(|s| s.contains(name))
    }

    /// Produces a fresh name not currently visible in any enclosing scope,
    /// for destructuring temporaries and similar lowerer-introduced
    /// bindings.
    pub fn fresh_name(&mut self, prefix: &str) -> String {
        loop {
            let candidate = format!("__{prefix}{}", self.synthetic_counter);
            self.synthetic_counter += 1;
            if !self.is_declared(&candidate) {
                self.declare(candidate.clone());
                return candidate;
            }
        }
    }

    /// Name for an anonymous function expression, used when emitting a
    /// synthetic identifier so the emitter always has something to print
    /// in stack traces or debug output.
    pub fn anonymous_function_name(&mut self) -> String {
        self.fresh_name("anon_fn")
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}
