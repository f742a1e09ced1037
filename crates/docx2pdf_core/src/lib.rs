//! docx2pdf core: pure conversion-queue state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{Msg, ProgressEvent};
pub use state::{display_name, AppState, ConverterAvailability, FileStatus, QueueEntry, RunId};
pub use update::update;
pub use view_model::{AppViewModel, EntryRowView};
