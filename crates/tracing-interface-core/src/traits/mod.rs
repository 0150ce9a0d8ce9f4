pub mod host;
pub mod observer;

pub use host::{Databag, RelationHost};
pub use observer::RelationObserver;
