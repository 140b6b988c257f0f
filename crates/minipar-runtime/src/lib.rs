//! MiniPar runtime: values, frames, channels, and the tree-walking executor.
//!
//! # Example
//!
//! ```
//! let module = minipar_compiler::parse("print(2 + 3 * 4)").expect("valid source");
//! minipar_compiler::analyze(&module).expect("well-typed");
//!
//! let (out, buffer) = minipar_runtime::Output::capture();
//! minipar_runtime::Executor::with_output(out)
//!     .run(&module)
//!     .expect("runs");
//! assert_eq!(&*buffer.lock().unwrap(), b"14\n");
//! ```

pub mod channel;
pub mod error;
pub mod frame;
pub mod interp;
pub mod value;

#[cfg(test)]
mod channel_tests;
#[cfg(test)]
mod interp_tests;

pub use error::RuntimeError;
pub use interp::{Executor, Flow, Output};
pub use value::Value;
