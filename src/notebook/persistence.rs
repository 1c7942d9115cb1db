use std::{future::Future, pin::Pin};

use anyhow::Result;

use crate::models::TextBlock;

pub type PersistFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Where saved note blocks live between sessions.
///
/// `load` returns `None` when nothing has been stored for the record yet.
/// `persist` replaces the record's blocks with the given batch; an error
/// means nothing was stored.
pub trait SummaryPersistence: Send + Sync {
    fn load<'a>(&'a self, record_id: &'a str) -> PersistFuture<'a, Option<Vec<TextBlock>>>;

    fn persist<'a>(&'a self, record_id: &'a str, blocks: &'a [TextBlock]) -> PersistFuture<'a, ()>;
}
