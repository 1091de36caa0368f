use super::value::Object;
use compact_str::{CompactString, ToCompactString};
use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

/// A scope shared by every closure and call frame that references it.
///
/// Closures stored in a scope they captured form a reference cycle and are
/// never freed. Programs are short lived so this is accepted.
#[derive(Clone)]
pub struct SharedEnvironment {
    inner: Rc<RefCell<Environment>>,
}

struct Environment {
    values: HashMap<CompactString, Object>,
    parent: Option<SharedEnvironment>,
}

impl SharedEnvironment {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Environment {
                values: HashMap::new(),
                parent: None,
            })),
        }
    }

    pub fn new_scope(&self) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Environment {
                values: HashMap::new(),
                parent: Some(self.clone()),
            })),
        }
    }

    /// Looks the name up in this scope then outwards.
    pub fn access(&self, name: &str) -> Option<Object> {
        let inner = self.inner.borrow();
        if let Some(value) = inner.values.get(name) {
            Some(value.clone())
        } else if let Some(parent) = &inner.parent {
            parent.access(name)
        } else {
            None
        }
    }

    /// Binds in this scope, shadowing any outer binding of the same name.
    pub fn declare(&mut self, name: &str, value: Object) {
        self.inner
            .borrow_mut()
            .values
            .insert(name.to_compact_string(), value);
    }

    pub fn depth(&self) -> usize {
        match &self.inner.borrow().parent {
            Some(parent) => parent.depth() + 1,
            None => 0,
        }
    }
}

impl Default for SharedEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SharedEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        let mut names: Vec<_> = inner.values.keys().collect();
        names.sort();
        f.debug_struct("SharedEnvironment")
            .field("names", &names)
            .field("depth", &self.depth())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_and_falls_back() {
        let mut globals = SharedEnvironment::new();
        globals.declare("x", Object::Integer(1));
        globals.declare("y", Object::Integer(2));

        let mut scope = globals.new_scope();
        scope.declare("x", Object::Integer(10));

        assert!(matches!(scope.access("x"), Some(Object::Integer(10))));
        assert!(matches!(scope.access("y"), Some(Object::Integer(2))));
        assert!(matches!(globals.access("x"), Some(Object::Integer(1))));
        assert!(scope.access("z").is_none());
        assert_eq!(scope.depth(), 1);
    }

    #[test]
    fn clones_share_bindings() {
        let mut environment = SharedEnvironment::new();
        let alias = environment.clone();
        environment.declare("late", Object::Boolean(true));
        assert!(matches!(alias.access("late"), Some(Object::Boolean(true))));
    }
}
