use crate::dates::Clock;
use crate::models::EntryCollection;
use crate::storage::Backend;
use crate::store::EntryStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared handler state. `entries` is the latest snapshot; holding its lock
/// across a store write keeps writes from overlapping.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EntryStore<Backend>>,
    pub entries: Arc<Mutex<EntryCollection>>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: EntryStore<Backend>, entries: EntryCollection, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(store),
            entries: Arc::new(Mutex::new(entries)),
            clock,
        }
    }
}
