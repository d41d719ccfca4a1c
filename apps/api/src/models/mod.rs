pub mod answer;
pub mod project;
pub mod user;
