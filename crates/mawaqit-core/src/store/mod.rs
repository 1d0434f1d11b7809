mod cache;

pub use cache::CalendarCache;
