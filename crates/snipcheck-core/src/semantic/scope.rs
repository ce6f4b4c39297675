//! Lexical scope stack for declaration and usage tracking.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::syntax::{NodeId, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Program,
    Function,
    Block,
    Catch,
}

impl ScopeKind {
    pub fn for_node(kind: NodeKind) -> Option<Self> {
        match kind {
            NodeKind::Program => Some(ScopeKind::Program),
            NodeKind::Block => Some(ScopeKind::Block),
            NodeKind::CatchClause => Some(ScopeKind::Catch),
            kind if kind.is_function() => Some(ScopeKind::Function),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Node that opened the scope. `None` for the implicit scope created by a
    /// declaration on an empty stack.
    pub owner: Option<NodeId>,
    declared: IndexSet<String>,
    used: HashSet<String>,
}

impl Scope {
    fn new(kind: ScopeKind, owner: Option<NodeId>) -> Self {
        Self {
            kind,
            owner,
            declared: IndexSet::new(),
            used: HashSet::new(),
        }
    }

    pub fn declares(&self, name: &str) -> bool {
        self.declared.contains(name)
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Declared names in declaration order.
    pub fn declared(&self) -> impl Iterator<Item = &str> {
        self.declared.iter().map(String::as_str)
    }

    /// Declared names never marked as used, in declaration order.
    pub fn unused(&self) -> impl Iterator<Item = &str> {
        self.declared().filter(|name| !self.used.contains(*name))
    }
}

#[derive(Debug, Default)]
pub struct ScopeTracker {
    stack: Vec<Scope>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn current(&self) -> Option<&Scope> {
        self.stack.last()
    }

    pub fn enter_scope(&mut self, kind: ScopeKind, owner: Option<NodeId>) {
        self.stack.push(Scope::new(kind, owner));
    }

    pub fn exit_scope(&mut self) -> Option<Scope> {
        self.stack.pop()
    }

    /// Declares `name` in the innermost scope, opening a program scope first
    /// when the stack is empty.
    pub fn declare(&mut self, name: &str) {
        if self.stack.is_empty() {
            self.enter_scope(ScopeKind::Program, None);
        }
        if let Some(scope) = self.stack.last_mut() {
            scope.declared.insert(name.to_string());
        }
    }

    /// Marks `name` as used in the innermost scope declaring it. Free names
    /// are recorded against the outermost scope.
    pub fn reference(&mut self, name: &str) {
        if let Some(scope) = self
            .stack
            .iter_mut()
            .rev()
            .find(|scope| scope.declared.contains(name))
        {
            scope.used.insert(name.to_string());
            return;
        }

        if let Some(outermost) = self.stack.first_mut() {
            outermost.used.insert(name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_names_keep_declaration_order() {
        let mut tracker = ScopeTracker::new();
        tracker.enter_scope(ScopeKind::Program, None);
        tracker.declare("b");
        tracker.declare("a");
        tracker.declare("c");
        tracker.reference("a");

        let scope = tracker.exit_scope().unwrap();
        assert_eq!(scope.unused().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn reference_resolves_to_innermost_declaration() {
        let mut tracker = ScopeTracker::new();
        tracker.enter_scope(ScopeKind::Program, None);
        tracker.declare("x");
        tracker.enter_scope(ScopeKind::Block, None);
        tracker.declare("x");
        tracker.reference("x");

        let inner = tracker.exit_scope().unwrap();
        let outer = tracker.exit_scope().unwrap();
        assert!(inner.is_used("x"));
        assert!(!outer.is_used("x"));
    }

    #[test]
    fn reference_reaches_enclosing_scopes() {
        let mut tracker = ScopeTracker::new();
        tracker.enter_scope(ScopeKind::Program, None);
        tracker.declare("helper");
        tracker.enter_scope(ScopeKind::Function, None);
        tracker.enter_scope(ScopeKind::Block, None);
        tracker.reference("helper");
        tracker.exit_scope();
        tracker.exit_scope();

        let program = tracker.exit_scope().unwrap();
        assert_eq!(program.unused().count(), 0);
    }

    #[test]
    fn free_names_are_recorded_on_the_outermost_scope() {
        let mut tracker = ScopeTracker::new();
        tracker.enter_scope(ScopeKind::Program, None);
        tracker.enter_scope(ScopeKind::Function, None);
        tracker.reference("window");
        tracker.exit_scope();

        let program = tracker.exit_scope().unwrap();
        assert!(program.is_used("window"));
        assert!(!program.declares("window"));
    }

    #[test]
    fn declare_on_empty_stack_opens_a_scope() {
        let mut tracker = ScopeTracker::new();
        tracker.declare("orphan");

        assert_eq!(tracker.depth(), 1);
        assert_eq!(tracker.current().unwrap().kind, ScopeKind::Program);
        assert!(tracker.current().unwrap().declares("orphan"));
    }

    #[test]
    fn reference_on_empty_stack_is_ignored() {
        let mut tracker = ScopeTracker::new();
        tracker.reference("anything");

        assert_eq!(tracker.depth(), 0);
    }

    #[test]
    fn scope_kind_for_nodes() {
        assert_eq!(ScopeKind::for_node(NodeKind::Program), Some(ScopeKind::Program));
        assert_eq!(ScopeKind::for_node(NodeKind::ArrowFunction), Some(ScopeKind::Function));
        assert_eq!(ScopeKind::for_node(NodeKind::CatchClause), Some(ScopeKind::Catch));
        assert_eq!(ScopeKind::for_node(NodeKind::If), None);
    }
}
