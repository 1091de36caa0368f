use super::{environment::SharedEnvironment, error::RuntimeError, Host};
use crate::expression::{FunctionLiteral, InfixOperator, PrefixOperator};
use compact_str::{CompactString, CompactStringExt};
use std::{cell::RefCell, fmt, rc::Rc};

/// A callable implemented in Rust and exposed to programs under a fixed name.
pub trait NativeFunction: fmt::Debug {
    fn get_name(&self) -> &'static str;
    fn call(&self, host: &mut dyn Host, arguments: Vec<Object>) -> Result<Object, RuntimeError>;
}

/// Array storage is shared: every binding to the same array sees in-place mutation.
pub type Array = Rc<RefCell<Vec<Object>>>;

pub fn new_array(elements: Vec<Object>) -> Array {
    Rc::new(RefCell::new(elements))
}

/// A user function together with the scope it was defined in.
pub struct Function {
    pub literal: Rc<FunctionLiteral>,
    pub environment: SharedEnvironment,
}

// The captured environment usually contains the function itself.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("literal", &self.literal)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Integer,
    Boolean,
    String,
    Array,
    Function,
    Builtin,
    Error,
    Null,
    ReturnValue,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Integer => "INTEGER",
            ObjectKind::Boolean => "BOOLEAN",
            ObjectKind::String => "STRING",
            ObjectKind::Array => "ARRAY",
            ObjectKind::Function => "FUNCTION",
            ObjectKind::Builtin => "BUILTIN",
            ObjectKind::Error => "ERROR",
            ObjectKind::Null => "NULL",
            ObjectKind::ReturnValue => "RETURN_VALUE",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(CompactString),
    Array(Array),
    Function(Rc<Function>),
    Builtin(Rc<dyn NativeFunction>),
    Error(RuntimeError),
    Null,
    /// Unwinds blocks up to the enclosing call. Never the result of a call or a program.
    ReturnValue(Box<Object>),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Object::Integer(_) => ObjectKind::Integer,
            Object::Boolean(_) => ObjectKind::Boolean,
            Object::String(_) => ObjectKind::String,
            Object::Array(_) => ObjectKind::Array,
            Object::Function(_) => ObjectKind::Function,
            Object::Builtin(_) => ObjectKind::Builtin,
            Object::Error(_) => ObjectKind::Error,
            Object::Null => ObjectKind::Null,
            Object::ReturnValue(_) => ObjectKind::ReturnValue,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(v) => write!(f, "{v}"),
            Object::Boolean(v) => write!(f, "{v}"),
            Object::String(v) => write!(f, "{v}"),
            Object::Array(elements) => {
                write!(f, "[")?;
                crate::expression::write_separated(f, &elements.borrow())?;
                write!(f, "]")
            }
            Object::Function(function) => write!(f, "{}", function.literal),
            Object::Builtin(native) => write!(f, "<native fn {}>", native.get_name()),
            Object::Error(error) => write!(f, "ERROR: {error}"),
            Object::Null => write!(f, "null"),
            Object::ReturnValue(inner) => write!(f, "{inner}"),
        }
    }
}

// Unary operators
impl Object {
    /// `false` and `null` are falsy, everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    pub fn apply_prefix(&self, operator: PrefixOperator) -> Result<Object, RuntimeError> {
        match operator {
            PrefixOperator::Bang => Ok(Object::Boolean(!self.is_truthy())),
            PrefixOperator::Minus => match self {
                Object::Integer(v) => Ok(Object::Integer(v.wrapping_neg())),
                v => Err(RuntimeError::UnknownPrefixOperator {
                    operator,
                    operand: v.kind(),
                }),
            },
        }
    }
}

// Binary operators
impl Object {
    pub fn apply_infix(&self, operator: InfixOperator, rhs: &Object) -> Result<Object, RuntimeError> {
        match (self, rhs) {
            (Object::Integer(l), Object::Integer(r)) => integer_infix(*l, operator, *r),
            (Object::String(l), Object::String(r)) => match operator {
                InfixOperator::Add => Ok(Object::String([l, r].concat_compact())),
                InfixOperator::Equal => Ok(Object::Boolean(l == r)),
                InfixOperator::NotEqual => Ok(Object::Boolean(l != r)),
                _ => Err(self.unknown_infix(operator, rhs)),
            },
            (Object::Boolean(l), Object::Boolean(r)) => match operator {
                InfixOperator::Equal => Ok(Object::Boolean(l == r)),
                InfixOperator::NotEqual => Ok(Object::Boolean(l != r)),
                _ => Err(self.unknown_infix(operator, rhs)),
            },
            (Object::Null, Object::Null) => match operator {
                InfixOperator::Equal => Ok(Object::Boolean(true)),
                InfixOperator::NotEqual => Ok(Object::Boolean(false)),
                _ => Err(self.unknown_infix(operator, rhs)),
            },
            _ if self.kind() != rhs.kind() => Err(RuntimeError::TypeMismatch {
                lhs: self.kind(),
                operator,
                rhs: rhs.kind(),
            }),
            _ => Err(self.unknown_infix(operator, rhs)),
        }
    }

    fn unknown_infix(&self, operator: InfixOperator, rhs: &Object) -> RuntimeError {
        RuntimeError::UnknownInfixOperator {
            lhs: self.kind(),
            operator,
            rhs: rhs.kind(),
        }
    }

    /// `array[index]`. Out of range indexes, negative ones included, give `null`.
    pub fn index(&self, index: &Object) -> Result<Object, RuntimeError> {
        match (self, index) {
            (Object::Array(elements), Object::Integer(i)) => Ok(usize::try_from(*i)
                .ok()
                .and_then(|i| elements.borrow().get(i).cloned())
                .unwrap_or(Object::Null)),
            (collection, _) => Err(RuntimeError::IndexNotSupported(collection.kind())),
        }
    }
}

fn integer_infix(lhs: i64, operator: InfixOperator, rhs: i64) -> Result<Object, RuntimeError> {
    let value = match operator {
        InfixOperator::Add => lhs.wrapping_add(rhs),
        InfixOperator::Subtract => lhs.wrapping_sub(rhs),
        InfixOperator::Multiply => lhs.wrapping_mul(rhs),
        InfixOperator::Divide if rhs == 0 => return Err(RuntimeError::DivisionByZero),
        InfixOperator::Divide => lhs.wrapping_div(rhs),
        InfixOperator::Modulo if rhs == 0 => return Err(RuntimeError::DivisionByZero),
        InfixOperator::Modulo => lhs.wrapping_rem(rhs),
        InfixOperator::Power => integer_power(lhs, rhs)?,
        InfixOperator::LessThan => return Ok(Object::Boolean(lhs < rhs)),
        InfixOperator::GreaterThan => return Ok(Object::Boolean(lhs > rhs)),
        InfixOperator::Equal => return Ok(Object::Boolean(lhs == rhs)),
        InfixOperator::NotEqual => return Ok(Object::Boolean(lhs != rhs)),
    };
    Ok(Object::Integer(value))
}

fn integer_power(base: i64, exponent: i64) -> Result<i64, RuntimeError> {
    if exponent < 0 {
        return Err(RuntimeError::NegativeExponent(exponent));
    }
    let overflow = RuntimeError::Overflow {
        lhs: ObjectKind::Integer,
        operator: InfixOperator::Power,
        rhs: ObjectKind::Integer,
    };
    match base {
        0 | 1 if exponent > 0 => Ok(base),
        -1 => Ok(if exponent % 2 == 0 { 1 } else { -1 }),
        _ => u32::try_from(exponent)
            .ok()
            .and_then(|exponent| base.checked_pow(exponent))
            .ok_or(overflow),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness() {
        assert!(!Object::Null.is_truthy());
        assert!(!Object::Boolean(false).is_truthy());
        assert!(Object::Integer(0).is_truthy());
        assert!(Object::String("".into()).is_truthy());
    }

    #[test]
    fn power_edges() {
        assert_eq!(integer_power(2, 10), Ok(1024));
        assert_eq!(integer_power(0, 0), Ok(1));
        assert_eq!(integer_power(1, i64::MAX), Ok(1));
        assert_eq!(integer_power(-1, 3), Ok(-1));
        assert_eq!(
            integer_power(2, -1),
            Err(RuntimeError::NegativeExponent(-1))
        );
        assert!(matches!(
            integer_power(10, 40),
            Err(RuntimeError::Overflow { .. })
        ));
    }

    #[test]
    fn wrapping_arithmetic() {
        let result = Object::Integer(i64::MAX).apply_infix(InfixOperator::Add, &Object::Integer(1));
        assert!(matches!(result, Ok(Object::Integer(i64::MIN))));
    }

    #[test]
    fn mixed_kinds_are_a_type_mismatch() {
        let error = Object::Integer(1)
            .apply_infix(InfixOperator::Equal, &Object::Boolean(true))
            .unwrap_err();
        assert_eq!(error.to_string(), "type mismatch: INTEGER == BOOLEAN");
    }
}
