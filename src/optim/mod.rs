pub mod update_rule;

pub use update_rule::{TdLambda, UpdateRule};
