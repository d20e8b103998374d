pub mod unit;

pub use unit::{Node, Unit};
