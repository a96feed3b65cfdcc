pub mod manager;
pub mod postgres;
pub mod sqlite;
