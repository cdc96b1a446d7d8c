use crate::language::scope::IdentifierInfo;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::value::ValueRef;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

struct Binding {
    info: IdentifierInfo,
    value: ValueRef,
}

struct Scope {
    parent: Option<ScopeRef>,
    bindings: HashMap<String, Binding>,
}

/// A frame in the runtime scope chain. Handles are shared: closures hold
/// the frame they were defined in alive, and every alias observes
/// reassignment through it.
#[derive(Clone)]
pub struct ScopeRef {
    inner: Rc<RefCell<Scope>>,
}

impl ScopeRef {
    pub fn global() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Scope {
                parent: None,
                bindings: HashMap::new(),
            })),
        }
    }

    pub fn child(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Scope {
                parent: Some(self.clone()),
                bindings: HashMap::new(),
            })),
        }
    }

    /// Bind a new name in this frame. The parser rules out duplicates, so
    /// hitting one here is a bug assertion, not a user-facing path.
    pub fn declare(
        &self,
        name: &str,
        info: IdentifierInfo,
        value: ValueRef,
    ) -> RuntimeResult<()> {
        let mut scope = self.inner.borrow_mut();
        if scope.bindings.contains_key(name) {
            return Err(RuntimeError::Declaration {
                name: name.to_string(),
            });
        }
        scope
            .bindings
            .insert(name.to_string(), Binding { info, value });
        Ok(())
    }

    /// Rebind the nearest `name` up the chain.
    pub fn set_value(&self, name: &str, value: ValueRef) -> RuntimeResult<()> {
        let mut current = self.clone();
        loop {
            let next = {
                let mut scope = current.inner.borrow_mut();
                if let Some(binding) = scope.bindings.get_mut(name) {
                    if binding.info.is_const {
                        return Err(RuntimeError::ImmutableWrite {
                            name: name.to_string(),
                        });
                    }
                    binding.value = value;
                    return Ok(());
                }
                match &scope.parent {
                    Some(parent) => parent.clone(),
                    None => {
                        return Err(RuntimeError::UndefinedVariable {
                            name: name.to_string(),
                        });
                    }
                }
            };
            current = next;
        }
    }

    pub fn value_of(&self, name: &str) -> Option<ValueRef> {
        let mut current = self.clone();
        loop {
            let next = {
                let scope = current.inner.borrow();
                if let Some(binding) = scope.bindings.get(name) {
                    return Some(Rc::clone(&binding.value));
                }
                scope.parent.clone()?
            };
            current = next;
        }
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.value_of(name).is_some()
    }
}
