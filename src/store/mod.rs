mod entry;
mod in_memory;
mod store;

pub use entry::Entry;
pub use entry::Version;
pub(crate) use in_memory::InMemoryStore;
pub use store::KeyValueStore;
pub use store::PutOutcome;
