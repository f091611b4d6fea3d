pub mod assertions;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::{assert_body_matches_account, assert_error_body};
#[allow(unused_imports)]
pub use setup::{random_account, TestServer, TestServerBuilder};
