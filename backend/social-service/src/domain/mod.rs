pub mod cursor;
pub mod models;

pub use cursor::{FeedCursor, PageRequest};
pub use models::*;
