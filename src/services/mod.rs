pub mod artwork_store;
pub mod database;
pub mod favorite_store;
pub mod identity;
pub mod ownership;
pub mod store;
