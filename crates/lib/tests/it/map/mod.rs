//! Map integration tests

mod iteration;
mod modes;
