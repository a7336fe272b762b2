//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from the
//! serving entry points: media type resolution, range parsing and planning,
//! conditional caching, and response building.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used items
pub use mime::MediaTypeResolver;
pub use range::{parse_range_header, plan};
pub use response::{
    build_416_response, build_full_response, build_listing_response, build_multipart_response,
    build_not_modified_response, build_partial_response,
};
