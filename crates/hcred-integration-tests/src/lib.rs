//! Integration-test host crate. All content lives in `tests/`.
