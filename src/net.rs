pub mod http;
pub mod proto;
