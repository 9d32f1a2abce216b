//! Dispatch against local HTTP targets
//!
//! Every test owns a `wiremock` server; results are looked up by id since completion order
//! is not fixed.

#[cfg(test)]
mod tests {
    use crate::common::{
        BatchFactory, REFUSED_URL, http_disperser, http_executor, mount_delayed,
        mount_error_body, mount_status,
    };
    use oak_disperser::core::dispatch::HttpTransport;
    use oak_disperser::utils::net::http::{HttpClientPoolConfig, create_dispatch_client};
    use oak_disperser::{
        BatchValidator, BatchVerdict, DispatchExecutor, DisperserError, PassthroughDecoder,
    };
    use serde_json::json;
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use wiremock::matchers::{body_json, body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn validate(factory: &BatchFactory) -> oak_disperser::Batch {
        BatchValidator::default().validate(&factory.build()).unwrap()
    }

    #[tokio::test]
    async fn test_partial_failure_reports_both_actions() {
        let server = MockServer::start().await;
        mount_status(&server, "POST", "/a", 200).await;
        mount_error_body(&server, "/b", 500, "database unavailable").await;

        let batch = BatchFactory::new()
            .correlation_id("c-ab")
            .action("a", &format!("{}/a", server.uri()))
            .action("b", &format!("{}/b", server.uri()));

        let report = http_executor(2).execute(validate(&batch)).await;

        assert_eq!(report.verdict(), BatchVerdict::Failure);
        assert_eq!(report.results().len(), 2);

        let a = report.result("a").unwrap();
        assert!(a.ok);
        assert_eq!(a.status, Some(200));

        let b = report.result("b").unwrap();
        assert!(!b.ok);
        assert_eq!(b.status, Some(500));
        assert_eq!(
            b.error.as_deref(),
            Some("unexpected status 500: database unavailable")
        );

        let failures = report.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].id, "b");
    }

    #[tokio::test]
    async fn test_user_agent_and_content_type_injected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/json"))
            .and(header("user-agent", "oak-disperser-tests/1.0"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({ "event": "created", "n": 1 })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let batch = BatchFactory::new().raw_action(json!({
            "id": "j",
            "url": format!("{}/json", server.uri()),
            "body": { "event": "created", "n": 1 }
        }));

        let report = http_executor(1).execute(validate(&batch)).await;
        assert!(report.is_success(), "{:?}", report.results());
    }

    #[tokio::test]
    async fn test_caller_headers_and_raw_body_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/form"))
            .and(header("user-agent", "custom-agent/2"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(header("x-signature", "abc123"))
            .and(body_string("a=1&b=2"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let batch = BatchFactory::new().raw_action(json!({
            "id": "f",
            "url": format!("{}/form", server.uri()),
            "method": "put",
            "headers": {
                "User-Agent": "custom-agent/2",
                "Content-Type": "application/x-www-form-urlencoded",
                "X-Signature": "abc123"
            },
            "body": "a=1&b=2"
        }));

        let report = http_executor(1).execute(validate(&batch)).await;
        assert!(report.is_success(), "{:?}", report.results());
    }

    #[tokio::test]
    async fn test_no_content_type_without_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ping"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let batch = BatchFactory::new().raw_action(json!({
            "id": "g",
            "url": format!("{}/ping", server.uri()),
            "method": "GET"
        }));

        let report = http_executor(1).execute(validate(&batch)).await;
        assert!(report.is_success());

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("content-type"));
    }

    #[tokio::test]
    async fn test_error_snippet_is_truncated() {
        let server = MockServer::start().await;
        mount_error_body(&server, "/big", 503, &"x".repeat(5_000)).await;

        let batch = BatchFactory::new().action("big", &format!("{}/big", server.uri()));
        let report = http_executor(1).execute(validate(&batch)).await;

        let result = report.result("big").unwrap();
        let error = result.error.as_deref().unwrap();
        let snippet = error.strip_prefix("unexpected status 503: ").unwrap();
        assert_eq!(snippet.chars().count(), 200);
    }

    #[tokio::test]
    async fn test_timeout_aborts_only_the_slow_action() {
        let server = MockServer::start().await;
        mount_delayed(&server, "/slow", 200, Duration::from_secs(3)).await;
        mount_status(&server, "POST", "/fast", 200).await;

        let batch = BatchFactory::new()
            .raw_action(json!({
                "id": "slow",
                "url": format!("{}/slow", server.uri()),
                "timeoutMs": 100
            }))
            .action("fast", &format!("{}/fast", server.uri()));

        let start = Instant::now();
        let report = http_executor(2).execute(validate(&batch)).await;

        assert!(start.elapsed() < Duration::from_secs(2));

        let slow = report.result("slow").unwrap();
        assert!(!slow.ok);
        assert_eq!(slow.status, None);
        assert_eq!(
            slow.error.as_deref(),
            Some("aborted: no response within 100ms")
        );
        assert!(report.result("fast").unwrap().ok);
    }

    #[tokio::test]
    async fn test_connection_refused_is_a_result() {
        let server = MockServer::start().await;
        mount_status(&server, "POST", "/ok", 201).await;

        let batch = BatchFactory::new()
            .action("down", REFUSED_URL)
            .action("up", &format!("{}/ok", server.uri()));

        let report = http_executor(2).execute(validate(&batch)).await;

        let down = report.result("down").unwrap();
        assert!(!down.ok);
        assert_eq!(down.status, None);
        assert!(down.error.as_deref().unwrap().starts_with("transport error"));

        let up = report.result("up").unwrap();
        assert_eq!(up.status, Some(201));
    }

    #[tokio::test]
    async fn test_custom_expect_status() {
        let server = MockServer::start().await;
        mount_status(&server, "DELETE", "/gone", 404).await;
        mount_status(&server, "POST", "/created", 201).await;

        let batch = BatchFactory::new()
            .raw_action(json!({
                "id": "gone",
                "url": format!("{}/gone", server.uri()),
                "method": "DELETE",
                "expectStatus": [200, 404]
            }))
            .raw_action(json!({
                "id": "strict",
                "url": format!("{}/created", server.uri()),
                "expectStatus": [200]
            }));

        let report = http_executor(2).execute(validate(&batch)).await;

        assert!(report.result("gone").unwrap().ok);
        let strict = report.result("strict").unwrap();
        assert!(!strict.ok);
        assert_eq!(strict.status, Some(201));
    }

    #[tokio::test]
    async fn test_concurrency_limits_wall_clock() {
        let server = MockServer::start().await;
        mount_delayed(&server, "/work", 200, Duration::from_millis(200)).await;

        let mut batch = BatchFactory::new();
        for i in 0..6 {
            batch = batch.action(&format!("w{}", i), &format!("{}/work", server.uri()));
        }

        let start = Instant::now();
        let report = http_executor(3).execute(validate(&batch)).await;
        let elapsed = start.elapsed();

        assert!(report.is_success());
        assert_eq!(report.results().len(), 6);
        // Six 200ms calls through three slots take two rounds, not six
        assert!(elapsed >= Duration::from_millis(390), "took {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(1), "took {:?}", elapsed);
        assert_eq!(server.received_requests().await.unwrap().len(), 6);
    }

    #[tokio::test]
    async fn test_disperser_process_end_to_end() {
        let server = MockServer::start().await;
        mount_status(&server, "POST", "/a", 200).await;
        mount_status(&server, "POST", "/b", 500).await;

        let disperser = http_disperser(2);

        let ok = BatchFactory::new()
            .correlation_id("ok-1")
            .action("a", &format!("{}/a", server.uri()));
        let summary = disperser.process(&PassthroughDecoder, &ok.bytes()).await.unwrap();
        assert_eq!(summary.correlation_id, "ok-1");
        assert_eq!(summary.executed, 1);

        let failing = BatchFactory::new()
            .correlation_id("bad-1")
            .action("a", &format!("{}/a", server.uri()))
            .action("b", &format!("{}/b", server.uri()));
        match disperser.process(&PassthroughDecoder, &failing.bytes()).await {
            Err(DisperserError::BatchExecutionFailure(failure)) => {
                assert_eq!(failure.correlation_id, "bad-1");
                assert_eq!(failure.total, 2);
                assert_eq!(failure.failed_ids(), vec!["b"]);
            }
            other => panic!("expected batch failure, got {:?}", other),
        }
    }

    fn redirecting_executor(block_private_targets: bool) -> DispatchExecutor {
        let pool = HttpClientPoolConfig {
            block_private_targets,
            ..Default::default()
        };
        let client = create_dispatch_client(&pool).unwrap();
        let transport = HttpTransport::with_client(client, "oak-disperser-tests/1.0").unwrap();
        DispatchExecutor::with_transport(Arc::new(transport), 1)
    }

    async fn mount_redirect(server: &MockServer, route: &str, location: &str) {
        Mock::given(path(route))
            .respond_with(ResponseTemplate::new(307).insert_header("Location", location))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_redirect_to_metadata_server_is_refused_when_blocking() {
        let server = MockServer::start().await;
        mount_redirect(&server, "/hop", "http://169.254.169.254/latest/meta-data/").await;

        let batch = BatchFactory::new().action("hop", &format!("{}/hop", server.uri()));
        let report = redirecting_executor(true).execute(validate(&batch)).await;

        let result = report.result("hop").unwrap();
        assert!(!result.ok);
        assert_eq!(result.status, None);
        let error = result.error.as_deref().unwrap();
        assert!(error.contains("redirect"), "{}", error);
        assert!(error.contains("blocked target"), "{}", error);
    }

    #[tokio::test]
    async fn test_redirect_followed_when_not_blocking() {
        let server = MockServer::start().await;
        mount_redirect(&server, "/hop", &format!("{}/landing", server.uri())).await;
        mount_status(&server, "POST", "/landing", 200).await;

        let batch = BatchFactory::new().action("hop", &format!("{}/hop", server.uri()));
        let report = redirecting_executor(false).execute(validate(&batch)).await;

        let result = report.result("hop").unwrap();
        assert!(result.ok, "{:?}", result.error);
        assert_eq!(result.status, Some(200));
    }
}
