pub mod analysis;
pub mod health;
pub mod reputation;
pub mod trends;
