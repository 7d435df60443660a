//! Store Tests
//!
//! Flat and hash stores, including concurrent access.

mod string_store_tests;
