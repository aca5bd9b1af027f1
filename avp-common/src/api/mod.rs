//! Backend HTTP API types
//!
//! Framework-free wire types shared by the dashboard client and its test
//! mock server.

pub mod types;

pub use types::{
    ErrorResponse, ImageDetailResponse, ImageListResponse, ListImagesQuery, UploadRequest,
    UploadResponse, MAX_LIST_LIMIT,
};
