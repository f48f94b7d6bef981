//! Household chore board: when each chore is next due, how urgent it is, and
//! the order chores are shown in.

pub mod board;
pub mod chores;
pub mod config;
pub mod error;
pub mod notion;
pub mod schedule;
pub mod status;

pub use board::Board;
pub use chores::{complete, evaluate, load_snapshot, Chore, ChoreWithStatus, Person};
pub use error::{ChoreError, ParseFailure};
pub use schedule::next_due;
pub use status::{classify, due_label, Status};
