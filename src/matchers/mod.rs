//! Compiled matcher indices built once from the rule corpus

mod content;
mod file;

pub use content::ContentMatchers;
pub use file::{extension_of, FileMatchers};
