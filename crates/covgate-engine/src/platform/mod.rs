pub mod actions;
pub mod env;
pub mod github;
