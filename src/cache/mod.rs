/// Page-level response caching
pub mod page_cache;

pub use page_cache::{Clock, PageCache, SystemClock};
