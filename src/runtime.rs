//! Session runtime driving the step protocol
//!
//! A [`Session`] owns one conversation and runs it to a terminal step per
//! call to `run`. Observers see every step as it is emitted.

mod executor;
pub mod traits;


pub use executor::{RunResult, Session, SessionConfig, CONTINUE_PROMPT, MISSING_API_KEY};
pub use traits::*;
