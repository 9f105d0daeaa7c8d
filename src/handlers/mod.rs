pub mod health;
pub mod signature;
