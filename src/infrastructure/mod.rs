pub mod database;
pub mod modification;
