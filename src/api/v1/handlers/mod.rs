pub mod health;
pub mod visitor;
