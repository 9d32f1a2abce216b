//! Common test utilities for oak-disperser

#![allow(dead_code)]

pub mod fixtures;

pub use fixtures::BatchFactory;

use oak_disperser::config::DispatcherConfig;
use oak_disperser::{Disperser, DispatchExecutor};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Address nothing listens on; connecting fails immediately
pub const REFUSED_URL: &str = "http://127.0.0.1:1/unreachable";

/// Mount `status` for `verb` requests to `route`
pub async fn mount_status(server: &MockServer, verb: &str, route: &str, status: u16) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Mount a response that only arrives after `delay`
pub async fn mount_delayed(server: &MockServer, route: &str, status: u16, delay: Duration) {
    Mock::given(path(route))
        .respond_with(ResponseTemplate::new(status).set_delay(delay))
        .mount(server)
        .await;
}

/// Mount an error status with a text body
pub async fn mount_error_body(server: &MockServer, route: &str, status: u16, body: &str) {
    Mock::given(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

pub fn dispatcher_config(concurrency: usize) -> DispatcherConfig {
    DispatcherConfig::default()
        .with_concurrency(concurrency)
        .with_user_agent("oak-disperser-tests/1.0")
}

pub fn http_executor(concurrency: usize) -> DispatchExecutor {
    DispatchExecutor::new(&dispatcher_config(concurrency)).expect("executor")
}

pub fn http_disperser(concurrency: usize) -> Disperser {
    Disperser::new(&dispatcher_config(concurrency)).expect("disperser")
}
