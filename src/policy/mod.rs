//! Policy Module
//!
//! Decides, from method and path alone, whether a request is refused before
//! any cache or network work happens.

mod filter;


pub use filter::{BlockPolicy, PolicyFilter};
