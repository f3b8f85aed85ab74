pub mod logging;
pub mod request_id;

pub use logging::init_tracing;
pub use request_id::{RequestIdExt, TaggedRequest, REQUEST_ID_HEADER};
