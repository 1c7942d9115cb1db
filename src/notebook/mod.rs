pub mod commands;
pub mod persistence;
pub mod state;
pub mod store;
pub mod versioning;

pub use persistence::{PersistFuture, SummaryPersistence};
pub use state::{FieldState, FieldView, NotebookSession};
pub use store::SummaryStore;
pub use versioning::apply_save;
