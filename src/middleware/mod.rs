pub mod cors;
pub mod request_id;

pub use cors::cors_middleware;
pub use request_id::{request_id_middleware, REQUEST_ID_HEADER};
