pub mod store;
pub use store::{ComplaintStore, LogStore, ProductStore, RatingStore, StatsStore, UserStore};

pub mod user_repo;
pub use user_repo::UserRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod rating_repo;
pub use rating_repo::RatingRepository;
pub mod complaint_repo;
pub use complaint_repo::ComplaintRepository;
pub mod stats_repo;
pub use stats_repo::StatsRepository;
pub mod log_repo;
pub use log_repo::LogRepository;

#[cfg(test)]
pub mod memory;
