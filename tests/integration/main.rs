//! Integration tests for tcg-harvest

mod cli_tests;
mod pipeline_tests;
mod support;
