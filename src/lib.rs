pub mod libs;

pub use crate::libs::error::FilterError;
pub use crate::libs::io::*;
