pub mod admins;
pub mod complaints;
pub mod dashboard;
pub mod logs;
pub mod media;
pub mod products;
pub mod ratings;
pub mod session;
