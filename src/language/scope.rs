use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// What the parser knows about a declared name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IdentifierInfo {
    pub is_const: bool,
}

struct LexicalScope {
    is_function_scope: bool,
    parent: Option<ScopeHandle>,
    names: HashMap<String, IdentifierInfo>,
}

/// A node in the parse-time scope tree. Handles are cheap to clone and are
/// captured by every AST node, so const-ness checks after parsing resolve
/// against exactly the chain that was in effect at that node's location.
#[derive(Clone)]
pub struct ScopeHandle {
    inner: Rc<RefCell<LexicalScope>>,
}

impl ScopeHandle {
    /// The root scope. It behaves like a function scope so that nothing
    /// above it constrains declarations.
    pub fn global() -> Self {
        Self {
            inner: Rc::new(RefCell::new(LexicalScope {
                is_function_scope: true,
                parent: None,
                names: HashMap::new(),
            })),
        }
    }

    pub fn child(&self, is_function_scope: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LexicalScope {
                is_function_scope,
                parent: Some(self.clone()),
                names: HashMap::new(),
            })),
        }
    }

    /// Declare `name` here. Fails on a duplicate in this scope, or when any
    /// scope up to and including the nearest function boundary already
    /// holds the name (plain blocks may not overshadow).
    pub fn declare(&self, name: &str, info: IdentifierInfo) -> bool {
        if self.inner.borrow().names.contains_key(name) {
            return false;
        }
        if !self.may_overshadow(name) {
            return false;
        }
        self.inner
            .borrow_mut()
            .names
            .insert(name.to_string(), info);
        true
    }

    fn may_overshadow(&self, name: &str) -> bool {
        let mut current = self.clone();
        loop {
            let next = {
                let scope = current.inner.borrow();
                // A conflict in this scope blocks the declaration even when
                // this scope is itself the function boundary.
                if scope.names.contains_key(name) {
                    return false;
                }
                if scope.is_function_scope {
                    return true;
                }
                match &scope.parent {
                    Some(parent) => parent.clone(),
                    None => return true,
                }
            };
            current = next;
        }
    }

    /// The nearest declaration of `name` in the chain, if any.
    pub fn info_of(&self, name: &str) -> Option<IdentifierInfo> {
        let mut current = self.clone();
        loop {
            let next = {
                let scope = current.inner.borrow();
                if let Some(info) = scope.names.get(name) {
                    return Some(*info);
                }
                scope.parent.clone()?
            };
            current = next;
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.info_of(name).is_some()
    }
}
