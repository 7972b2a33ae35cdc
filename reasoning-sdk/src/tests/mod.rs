//! Tests for the Reasoning SDK
//!
//! Cross-module tests; unit tests live next to the code they cover.

mod assembler_tests;
mod backend_mock_tests;
