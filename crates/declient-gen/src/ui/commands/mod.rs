pub mod generate;
pub mod list;

pub use generate::{GenerateConfig, generate_code};
pub use list::list_methods;
