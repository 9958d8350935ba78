//! Fixed-window rate-limit store

mod store;

pub use store::{Admission, WindowEntry, WindowStore};
