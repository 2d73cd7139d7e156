pub mod activity_log;
pub mod complaint_service;
pub mod identity_service;
pub mod interaction_service;
pub mod log_service;
pub mod media_service;
pub mod permissions;
pub mod product_service;
pub mod rating_service;
pub mod user_service;
