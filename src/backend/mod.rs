//! Backend module - Python code generation

pub mod codegen;

pub use codegen::Generator;
