//! Directory watching.
//!
//! [`DirectoryWatcher`] owns the OS watch handle and turns raw notifications
//! into [`FileEvent`]s. [`LastAccepted`] drops immediate repeats before an
//! event reaches the transfer pipeline.

mod dedup;
mod directory;
mod error;
mod event;
mod filter;

pub use dedup::LastAccepted;
pub use directory::{DirectoryWatcher, WatcherState};
pub use error::WatcherError;
pub use event::{ChangeKind, FileEvent};
pub use filter::FilePattern;
