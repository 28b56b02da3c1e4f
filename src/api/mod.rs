pub mod attendance;
pub mod health;
pub mod profile;
pub mod role;
pub mod schedule;
pub mod shift;
pub mod user;
