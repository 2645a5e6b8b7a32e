pub mod source;

pub use source::{SourceFile, SourceLoader};
