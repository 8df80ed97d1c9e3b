mod cache;
mod diff;
mod feedback;
mod files;
mod loader;
mod state;

pub use cache::DiffCache;
pub use diff::DiffViewState;
pub use feedback::FeedbackDraft;
pub use loader::AppEvent;
pub use state::{App, InputMode};
