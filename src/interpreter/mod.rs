pub mod context;
mod environment;
mod error;
mod native;
mod tree;
mod value;

pub use environment::SharedEnvironment;
pub use error::RuntimeError;
pub use native::{
    Builtins, NativeConcat, NativeInsert, NativeLen, NativePop, NativePrint, NativePush,
    NativeReverse, NativeSet, NativeSort, NativeTransform,
};
pub use tree::{TreeWalkInterpreter, MAX_CALL_DEPTH};
pub use value::{new_array, Array, Function, NativeFunction, Object, ObjectKind};

/// Where program output goes.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}

/// What a native function may ask of the running interpreter.
pub trait Host {
    /// Calls a function or native object with already evaluated arguments.
    fn call(&mut self, callee: &Object, arguments: Vec<Object>) -> Result<Object, RuntimeError>;
    fn writeln(&mut self, text: &str);
}
