pub mod engine;
pub mod render;

pub use engine::{compute_diff, new_words, old_words, DiffKind, DiffToken};
pub use render::{render_inline, summarize, DiffSummary};
