pub mod ast;
pub mod canvas;
pub mod config;
pub mod editor;
pub mod formatter;
pub mod lexer;
pub mod operators;
pub mod parser;
pub mod session;
pub mod soql_compiler;
pub mod token;

pub use ast::{FieldDescriptor, FieldType, FilterCondition, Group, Leaf, LogicalOperator, Operator};
pub use canvas::{QueryCanvas, SavedQuery};
pub use editor::ConditionEditor;
pub use formatter::format_value;
pub use operators::operators_for;
pub use soql_compiler::{compile_where, SoqlCompiler};
