//! Test helpers shared by the avp-dash integration tests

#![allow(dead_code)]

pub mod mock_backend;

use avp_common::config::DashboardConfig;
use avp_dash::Dashboard;

pub use mock_backend::{MockBackend, MockResponse};

/// Dashboard wired to a mock backend with a short post-upload delay
pub fn dashboard_for(backend: &MockBackend, refresh_delay_ms: u64) -> Dashboard {
    let config = DashboardConfig {
        api_base_url: backend.base_url.clone(),
        refresh_delay_ms,
        ..Default::default()
    };
    Dashboard::new(config).unwrap()
}

/// Minimal valid PNG signature plus padding
pub fn png_bytes() -> Vec<u8> {
    let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&[0u8; 24]);
    bytes
}
