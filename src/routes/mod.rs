pub mod common;
pub mod entity;
pub mod navigation;

pub use common::common_routes;
pub use entity::entity_routes;
pub use navigation::navigation_routes;
