pub(crate) mod ast;
pub(crate) mod codegen;
pub mod config;
pub(crate) mod converter;
pub(crate) mod declarations;
pub mod diagnostics;
pub(crate) mod errors;
pub mod metrics;
pub mod orchestrator;
