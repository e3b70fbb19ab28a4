//! Free-text helpers used by adapters, the item normalizer and the publisher
//!
//! Every function here is total: unparseable input degrades to an empty or
//! absent result instead of an error.

mod clean;
mod hashtags;
mod remote;
mod salary;

pub use clean::{clean_text, clip};
pub use hashtags::{derive_hashtags, DEFAULT_TAGS, MAX_HASHTAGS};
pub use remote::is_remote;
pub use salary::{parse_salary, Salary};
