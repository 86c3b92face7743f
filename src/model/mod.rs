pub mod member;
pub mod project;
pub mod suggestion;
pub mod task;
