//! Result types returned by the text analytics client.

pub mod pii;

pub use pii::{EntityCategory, EntitySubCategory, PiiEntity, PiiEntityError};
