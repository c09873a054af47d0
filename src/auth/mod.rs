mod middleware;

pub use middleware::{CALLER_HEADER, Caller};
