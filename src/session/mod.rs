//! Interactive calculator session: keypad, state machine and history.

mod history;
mod keypad;
mod state;

pub use history::{DEFAULT_HISTORY_LIMIT, History, HistoryItem};
pub use keypad::{Key, KeyParseError, parse_keys};
pub use state::{PressOutcome, Session};
