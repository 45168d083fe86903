pub mod consortium;
pub mod file;
pub mod number;
pub mod stdin;
