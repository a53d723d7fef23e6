pub mod error;
pub mod io;
pub mod pair;
pub mod runner;
