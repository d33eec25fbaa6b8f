//! Threshold grammars and pass/fail checks for measured metrics.

pub mod checker;
pub mod threshold;

pub use checker::{check, check_code_to_test_ratio, check_coverage, check_report, check_test_execution_time};
