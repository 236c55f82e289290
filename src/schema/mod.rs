pub mod types;
pub mod loader;
pub mod validator;
pub mod normalize;
pub mod empty;

pub use types::*;
pub use loader::*;
pub use validator::*;
pub use normalize::*;
pub use empty::*;
