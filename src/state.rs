pub mod registry;
pub mod session;
