use super::{
    error::RuntimeError,
    value::{new_array, Array, NativeFunction, Object},
    Host,
};
use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

/// Table of natives visible to programs when no binding shadows them.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    functions: HashMap<&'static str, Rc<dyn NativeFunction>>,
}

impl Builtins {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let mut builtins = Self::empty();
        builtins.register(NativeLen);
        builtins.register(NativePush);
        builtins.register(NativePop);
        builtins.register(NativeConcat);
        builtins.register(NativeInsert);
        builtins.register(NativeReverse);
        builtins.register(NativeSort);
        builtins.register(NativeSet);
        builtins.register(NativeTransform);
        builtins.register(NativePrint);
        builtins
    }

    /// Returns the native previously registered under the same name, if any.
    pub fn register(
        &mut self,
        function: impl NativeFunction + 'static,
    ) -> Option<Rc<dyn NativeFunction>> {
        self.functions.insert(function.get_name(), Rc::new(function))
    }

    pub fn get(&self, name: &str) -> Option<Object> {
        self.functions
            .get(name)
            .map(|function| Object::Builtin(Rc::clone(function)))
    }

    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

fn check_arity(name: &'static str, expected: usize, arguments: &[Object]) -> Result<(), RuntimeError> {
    if arguments.len() == expected {
        Ok(())
    } else {
        Err(RuntimeError::BuiltinArgumentCount {
            name,
            expected,
            actual: arguments.len(),
        })
    }
}

fn expect_array(name: &'static str, position: usize, argument: &Object) -> Result<Array, RuntimeError> {
    match argument {
        Object::Array(elements) => Ok(Rc::clone(elements)),
        other => Err(RuntimeError::BuiltinArgumentType {
            name,
            position,
            expected: "ARRAY",
            actual: other.kind(),
        }),
    }
}

fn expect_integer(name: &'static str, position: usize, argument: &Object) -> Result<i64, RuntimeError> {
    match argument {
        Object::Integer(v) => Ok(*v),
        other => Err(RuntimeError::BuiltinArgumentType {
            name,
            position,
            expected: "INTEGER",
            actual: other.kind(),
        }),
    }
}

#[derive(Debug)]
pub struct NativeLen;

impl NativeFunction for NativeLen {
    fn get_name(&self) -> &'static str {
        "len"
    }

    fn call(&self, _host: &mut dyn Host, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        check_arity(self.get_name(), 1, &arguments)?;
        let length = match &arguments[0] {
            Object::String(v) => v.chars().count(),
            Object::Array(elements) => elements.borrow().len(),
            other => {
                return Err(RuntimeError::BuiltinArgumentType {
                    name: self.get_name(),
                    position: 1,
                    expected: "STRING or ARRAY",
                    actual: other.kind(),
                })
            }
        };
        Ok(Object::Integer(length as i64))
    }
}

/// Copies the array with one more element at the end.
#[derive(Debug)]
pub struct NativePush;

impl NativeFunction for NativePush {
    fn get_name(&self) -> &'static str {
        "push"
    }

    fn call(&self, _host: &mut dyn Host, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        check_arity(self.get_name(), 2, &arguments)?;
        let array = expect_array(self.get_name(), 1, &arguments[0])?;
        let mut elements = array.borrow().clone();
        elements.push(arguments[1].clone());
        Ok(Object::Array(new_array(elements)))
    }
}

/// Removes the last element in place.
#[derive(Debug)]
pub struct NativePop;

impl NativeFunction for NativePop {
    fn get_name(&self) -> &'static str {
        "pop"
    }

    fn call(&self, _host: &mut dyn Host, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        check_arity(self.get_name(), 1, &arguments)?;
        let array = expect_array(self.get_name(), 1, &arguments[0])?;
        let last = array.borrow_mut().pop();
        last.ok_or(RuntimeError::EmptyArray(self.get_name()))
    }
}

#[derive(Debug)]
pub struct NativeConcat;

impl NativeFunction for NativeConcat {
    fn get_name(&self) -> &'static str {
        "concat"
    }

    fn call(&self, _host: &mut dyn Host, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        check_arity(self.get_name(), 2, &arguments)?;
        let first = expect_array(self.get_name(), 1, &arguments[0])?;
        let second = expect_array(self.get_name(), 2, &arguments[1])?;
        let mut elements = first.borrow().clone();
        elements.extend(second.borrow().iter().cloned());
        Ok(Object::Array(new_array(elements)))
    }
}

/// Copies the array with the element placed before `index`. `index` may equal the length.
#[derive(Debug)]
pub struct NativeInsert;

impl NativeFunction for NativeInsert {
    fn get_name(&self) -> &'static str {
        "insert"
    }

    fn call(&self, _host: &mut dyn Host, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        check_arity(self.get_name(), 3, &arguments)?;
        let array = expect_array(self.get_name(), 1, &arguments[0])?;
        let index = expect_integer(self.get_name(), 2, &arguments[1])?;

        let mut elements = array.borrow().clone();
        let position = usize::try_from(index)
            .ok()
            .filter(|position| *position <= elements.len())
            .ok_or(RuntimeError::InsertOutOfRange {
                index,
                length: elements.len(),
            })?;
        elements.insert(position, arguments[2].clone());
        Ok(Object::Array(new_array(elements)))
    }
}

/// Reverses in place and returns the same array.
#[derive(Debug)]
pub struct NativeReverse;

impl NativeFunction for NativeReverse {
    fn get_name(&self) -> &'static str {
        "reverse"
    }

    fn call(&self, _host: &mut dyn Host, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        check_arity(self.get_name(), 1, &arguments)?;
        let array = expect_array(self.get_name(), 1, &arguments[0])?;
        array.borrow_mut().reverse();
        Ok(Object::Array(array))
    }
}

/// Sorts integers ascending in place and returns the same array.
#[derive(Debug)]
pub struct NativeSort;

impl NativeFunction for NativeSort {
    fn get_name(&self) -> &'static str {
        "sort"
    }

    fn call(&self, _host: &mut dyn Host, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        check_arity(self.get_name(), 1, &arguments)?;
        let array = expect_array(self.get_name(), 1, &arguments[0])?;

        let mut values = array
            .borrow()
            .iter()
            .map(|element| match element {
                Object::Integer(v) => Ok(*v),
                other => Err(RuntimeError::SortNonInteger(other.kind())),
            })
            .collect::<Result<Vec<_>, _>>()?;
        values.sort_unstable();

        *array.borrow_mut() = values.into_iter().map(Object::Integer).collect();
        Ok(Object::Array(array))
    }
}

/// Drops elements whose printed form was already seen, keeping the first one.
#[derive(Debug)]
pub struct NativeSet;

impl NativeFunction for NativeSet {
    fn get_name(&self) -> &'static str {
        "set"
    }

    fn call(&self, _host: &mut dyn Host, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        check_arity(self.get_name(), 1, &arguments)?;
        let array = expect_array(self.get_name(), 1, &arguments[0])?;

        let mut seen = HashSet::new();
        let elements = array
            .borrow()
            .iter()
            .filter(|element| seen.insert(element.to_string()))
            .cloned()
            .collect();
        Ok(Object::Array(new_array(elements)))
    }
}

/// Maps a function or native over a new array. Stops at the first error.
#[derive(Debug)]
pub struct NativeTransform;

impl NativeFunction for NativeTransform {
    fn get_name(&self) -> &'static str {
        "transform"
    }

    fn call(&self, host: &mut dyn Host, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        check_arity(self.get_name(), 2, &arguments)?;
        let array = expect_array(self.get_name(), 1, &arguments[0])?;
        let callable = &arguments[1];
        if !matches!(callable, Object::Function(_) | Object::Builtin(_)) {
            return Err(RuntimeError::BuiltinArgumentType {
                name: self.get_name(),
                position: 2,
                expected: "FUNCTION or BUILTIN",
                actual: callable.kind(),
            });
        }

        // The callable may itself mutate the array.
        let snapshot = array.borrow().clone();
        let elements = snapshot
            .into_iter()
            .map(|element| host.call(callable, vec![element]))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Object::Array(new_array(elements)))
    }
}

/// Writes one line per argument.
#[derive(Debug)]
pub struct NativePrint;

impl NativeFunction for NativePrint {
    fn get_name(&self) -> &'static str {
        "print"
    }

    fn call(&self, host: &mut dyn Host, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        for argument in arguments.iter() {
            host.writeln(&argument.to_string());
        }
        Ok(Object::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_names() {
        assert_eq!(
            Builtins::standard().names(),
            vec![
                "concat",
                "insert",
                "len",
                "pop",
                "print",
                "push",
                "reverse",
                "set",
                "sort",
                "transform"
            ]
        );
    }

    #[test]
    fn empty_registry_has_nothing() {
        let builtins = Builtins::empty();
        assert!(builtins.get("len").is_none());
        assert!(builtins.names().is_empty());
    }

    #[test]
    fn register_replaces_by_name() {
        let mut builtins = Builtins::empty();
        assert!(builtins.register(NativeLen).is_none());
        assert!(builtins.register(NativeLen).is_some());
        assert!(matches!(builtins.get("len"), Some(Object::Builtin(_))));
    }
}
