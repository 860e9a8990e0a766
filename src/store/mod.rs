pub mod call;
pub mod command;
pub mod dispatcher;
pub mod reducer;

pub use call::{Correlation, Outcome, PersistenceCall};
pub use command::Command;
pub use dispatcher::BoardStore;
pub use reducer::{apply_command, apply_outcome, BoardState, Transition};
