use super::{
    environment::SharedEnvironment,
    error::RuntimeError,
    native::Builtins,
    value::{new_array, Function, Object},
    Host, SystemContext,
};
use crate::{
    expression::Expression,
    statement::{BlockStatement, Program, Statement},
};
use std::rc::Rc;

/// Deepest chain of function calls before a program is stopped.
pub const MAX_CALL_DEPTH: usize = 10_000;

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Evaluates programs directly from the syntax tree.
///
/// Globals survive between calls to [`TreeWalkInterpreter::run`] so a driver
/// can feed a session one chunk at a time.
pub struct TreeWalkInterpreter<C: SystemContext> {
    environment: SharedEnvironment,
    builtins: Builtins,
    context: C,
    call_depth: usize,
}

impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    pub fn new(context: C) -> Self {
        Self::with_builtins(context, Builtins::standard())
    }

    pub fn with_builtins(context: C, builtins: Builtins) -> Self {
        Self {
            environment: SharedEnvironment::new(),
            builtins,
            context,
            call_depth: 0,
        }
    }

    /// Runs every statement and returns the value of the last one. A runtime
    /// failure stops the program and is returned as [`Object::Error`].
    pub fn run(&mut self, program: &Program) -> Object {
        let mut environment = self.environment.clone();
        match self.interpret_program(program, &mut environment) {
            Ok(value) => value,
            Err(error) => {
                tracing::debug!(code = error.code(), %error, "program stopped");
                Object::Error(error)
            }
        }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn into_context(self) -> C {
        self.context
    }

    pub fn environment(&self) -> &SharedEnvironment {
        &self.environment
    }
}

// Statement interpreter
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn interpret_program(
        &mut self,
        program: &Program,
        environment: &mut SharedEnvironment,
    ) -> Result<Object, RuntimeError> {
        let mut result = Object::Null;
        for stmt in program.iter() {
            match self.interpret_statement(stmt, environment)? {
                Object::ReturnValue(value) => return Ok(*value),
                value => result = value,
            }
        }
        Ok(result)
    }

    /// Stops at a return signal and hands it up unopened.
    fn interpret_block(
        &mut self,
        block: &BlockStatement,
        environment: &mut SharedEnvironment,
    ) -> Result<Object, RuntimeError> {
        let mut result = Object::Null;
        for stmt in block.statements.iter() {
            result = self.interpret_statement(stmt, environment)?;
            if matches!(result, Object::ReturnValue(_)) {
                break;
            }
        }
        Ok(result)
    }

    fn interpret_statement(
        &mut self,
        statement: &Statement,
        environment: &mut SharedEnvironment,
    ) -> Result<Object, RuntimeError> {
        match statement {
            Statement::Let { name, value } => {
                let value = self.evaluate(value, environment)?;
                if matches!(value, Object::ReturnValue(_)) {
                    return Ok(value);
                }
                environment.declare(&name.name, value);
                Ok(Object::Null)
            }
            Statement::Return(value) => match self.evaluate(value, environment)? {
                signal @ Object::ReturnValue(_) => Ok(signal),
                value => Ok(Object::ReturnValue(Box::new(value))),
            },
            Statement::Expression(expr) => self.evaluate(expr, environment),
        }
    }
}

// Expression evaluator
impl<C> TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn evaluate(
        &mut self,
        expr: &Expression,
        environment: &mut SharedEnvironment,
    ) -> Result<Object, RuntimeError> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.evaluate_inner(expr, environment)
        })
    }

    fn evaluate_inner(
        &mut self,
        expr: &Expression,
        environment: &mut SharedEnvironment,
    ) -> Result<Object, RuntimeError> {
        match expr {
            Expression::Identifier(ident) => environment
                .access(&ident.name)
                .or_else(|| self.builtins.get(&ident.name))
                .ok_or_else(|| RuntimeError::IdentifierNotFound(ident.name.clone())),
            Expression::IntegerLiteral(v) => Ok(Object::Integer(*v)),
            Expression::BooleanLiteral(v) => Ok(Object::Boolean(*v)),
            Expression::StringLiteral(v) => Ok(Object::String(v.clone())),
            Expression::ArrayLiteral(elements) => {
                let elements = self.evaluate_all(elements, environment)?;
                Ok(Object::Array(new_array(elements)))
            }
            Expression::Prefix { operator, operand } => {
                let operand = self.evaluate(operand, environment)?;
                operand.apply_prefix(*operator)
            }
            Expression::Infix { operator, lhs, rhs } => {
                let lhs = self.evaluate(lhs, environment)?;
                let rhs = self.evaluate(rhs, environment)?;
                lhs.apply_infix(*operator, &rhs)
            }
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                if self.evaluate(condition, environment)?.is_truthy() {
                    self.interpret_block(consequence, environment)
                } else if let Some(alternative) = alternative {
                    self.interpret_block(alternative, environment)
                } else {
                    Ok(Object::Null)
                }
            }
            Expression::Function(literal) => Ok(Object::Function(Rc::new(Function {
                literal: Rc::clone(literal),
                environment: environment.clone(),
            }))),
            Expression::Call { callee, arguments } => {
                let callee = self.evaluate(callee, environment)?;
                let arguments = self.evaluate_all(arguments, environment)?;
                self.call(&callee, arguments)
            }
            Expression::Index { collection, index } => {
                let collection = self.evaluate(collection, environment)?;
                let index = self.evaluate(index, environment)?;
                collection.index(&index)
            }
        }
    }

    /// Left to right, stopping at the first failure.
    fn evaluate_all(
        &mut self,
        exprs: &[Expression],
        environment: &mut SharedEnvironment,
    ) -> Result<Vec<Object>, RuntimeError> {
        exprs
            .iter()
            .map(|expr| self.evaluate(expr, environment))
            .collect()
    }
}

impl<C> Host for TreeWalkInterpreter<C>
where
    C: SystemContext,
{
    fn call(&mut self, callee: &Object, arguments: Vec<Object>) -> Result<Object, RuntimeError> {
        match callee {
            Object::Function(function) => {
                let parameters = &function.literal.parameters;
                if parameters.len() != arguments.len() {
                    return Err(RuntimeError::ArgumentCount {
                        expected: parameters.len(),
                        actual: arguments.len(),
                    });
                }
                if self.call_depth >= MAX_CALL_DEPTH {
                    return Err(RuntimeError::StackOverflow(MAX_CALL_DEPTH));
                }
                tracing::trace!(
                    function = %function.literal,
                    depth = self.call_depth,
                    "calling function"
                );

                let mut scope = function.environment.new_scope();
                for (parameter, argument) in parameters.iter().zip(arguments) {
                    scope.declare(&parameter.name, argument);
                }
                self.call_depth += 1;
                let result = self.interpret_block(&function.literal.body, &mut scope);
                self.call_depth -= 1;
                match result? {
                    Object::ReturnValue(value) => Ok(*value),
                    value => Ok(value),
                }
            }
            Object::Builtin(native) => {
                tracing::trace!(name = native.get_name(), "calling native");
                Rc::clone(native).call(self, arguments)
            }
            other => Err(RuntimeError::NotCallable(other.kind())),
        }
    }

    fn writeln(&mut self, text: &str) {
        self.context.writeln(text);
    }
}
