//! Declaration to plan conversion: parameter classification, path binding,
//! method synthesis and per-interface assembly.

pub(crate) mod interfaces;
pub(crate) mod methods;
pub(crate) mod parameters;
pub(crate) mod paths;


pub(crate) use interfaces::{ImplementationUnit, InterfaceSynthesizer};
pub(crate) use methods::{MethodConverter, MethodSynthesizer};
