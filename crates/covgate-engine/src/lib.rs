#![forbid(unsafe_code)]

pub mod acceptable;
pub mod context;
pub mod expr;
pub mod gates;
pub mod platform;
pub mod tier;

#[cfg(test)]
mod testing;
