pub mod helpers;
pub mod ops;
pub mod session;
pub mod storage;
pub mod types;
pub mod watcher;

pub use ops::{is_overdue, today_local};
pub use session::{Outcome, Session};
pub use types::{Document, Section, Task, TaskId};
