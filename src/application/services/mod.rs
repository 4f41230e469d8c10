//! Business logic services for the application layer.

pub mod history_service;
pub mod link_service;
pub mod redirect_service;
pub mod session_service;

pub use history_service::HistoryService;
pub use link_service::{AllocationPolicy, Allocation, LinkService};
pub use redirect_service::RedirectService;
pub use session_service::SessionService;
