mod parse;
mod types;

pub use parse::parse_line;
pub use types::{ActionId, Command, CommandOutcome};
