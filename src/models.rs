pub mod user;
pub mod product;
pub mod rating;
pub mod complaint;
pub mod stats;
pub mod log;
