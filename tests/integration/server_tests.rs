//! HTTP service against live local targets

#[cfg(test)]
mod tests {
    use crate::common::{BatchFactory, http_disperser, mount_status};
    use actix_web::http::StatusCode;
    use actix_web::{test, web};
    use base64::{Engine as _, engine::general_purpose};
    use oak_disperser::Config;
    use oak_disperser::server::{AppState, HttpServer};
    use serde_json::{Value, json};
    use wiremock::MockServer;

    fn app_state() -> web::Data<AppState> {
        web::Data::new(AppState::with_disperser(Config::default(), http_disperser(2)))
    }

    fn push(batch: &BatchFactory) -> Value {
        json!({
            "message": {
                "data": general_purpose::STANDARD.encode(batch.bytes()),
                "attributes": {},
                "messageId": "9001",
                "publishTime": "2024-05-01T10:00:00Z"
            },
            "subscription": "projects/p/subscriptions/disperser"
        })
    }

    #[actix_web::test]
    async fn test_push_delivers_every_action() {
        let target = MockServer::start().await;
        mount_status(&target, "POST", "/one", 200).await;
        mount_status(&target, "POST", "/two", 204).await;

        let app = test::init_service(HttpServer::create_app(app_state())).await;
        let batch = BatchFactory::new()
            .action("one", &format!("{}/one", target.uri()))
            .action("two", &format!("{}/two", target.uri()));

        let req = test::TestRequest::post()
            .uri("/pubsub/push")
            .set_json(push(&batch))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(target.received_requests().await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_push_failure_is_not_acked() {
        let target = MockServer::start().await;
        mount_status(&target, "POST", "/one", 200).await;
        mount_status(&target, "POST", "/two", 503).await;

        let app = test::init_service(HttpServer::create_app(app_state())).await;
        let batch = BatchFactory::new()
            .correlation_id("redeliver-me")
            .action("one", &format!("{}/one", target.uri()))
            .action("two", &format!("{}/two", target.uri()));

        let req = test::TestRequest::post()
            .uri("/pubsub/push")
            .set_json(push(&batch))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"]["correlationId"], "redeliver-me");
        assert_eq!(body["error"]["failed"][0]["id"], "two");
        assert_eq!(body["error"]["failed"][0]["status"], 503);

        // The successful sibling was still delivered
        assert_eq!(target.received_requests().await.unwrap().len(), 2);
    }

    #[actix_web::test]
    async fn test_direct_submission_returns_results() {
        let target = MockServer::start().await;
        mount_status(&target, "POST", "/hook", 202).await;

        let app = test::init_service(HttpServer::create_app(app_state())).await;
        let batch = BatchFactory::new()
            .correlation_id("direct-1")
            .action("hook", &format!("{}/hook", target.uri()));

        let req = test::TestRequest::post()
            .uri("/v1/batches")
            .set_json(batch.build())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["correlationId"], "direct-1");
        assert_eq!(body["executed"], 1);
        assert_eq!(body["results"][0], json!({ "id": "hook", "ok": true, "status": 202 }));
    }
}
