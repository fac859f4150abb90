pub mod book;
pub mod results;

pub use book::*;
pub use results::*;
