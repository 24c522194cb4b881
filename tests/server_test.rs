//! Integration tests for the neuro-adaptive HTTP server

#[cfg(feature = "server")]
mod server_tests {
    use neuroadaptive_engine::server::{run, ServerConfig};
    use serde_json::json;
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use std::time::Duration;

    fn test_data_dir() -> PathBuf {
        std::env::temp_dir().join(format!("neuroadaptive-server-test-{}", uuid::Uuid::new_v4()))
    }

    async fn start() -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
        start_with(ServerConfig::new(0, test_data_dir())).await
    }

    async fn start_with(config: ServerConfig) -> (SocketAddr, tokio::sync::oneshot::Sender<()>) {
        let started = run(config).await.expect("Failed to start server");

        // Give server time to start
        tokio::time::sleep(Duration::from_millis(100)).await;
        started
    }

    /// Steady 200ms typing as JSON events.
    fn steady_typing(count: i64) -> serde_json::Value {
        let start = chrono::DateTime::parse_from_rfc3339("2024-01-22T10:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        let events: Vec<serde_json::Value> = (0..count)
            .map(|i| {
                json!({
                    "type": "keyboard",
                    "timestamp": start + chrono::Duration::milliseconds(i * 200),
                    "is_key_down": true
                })
            })
            .collect();
        json!({ "events": events })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (addr, shutdown_tx) = start().await;

        let client = reqwest::Client::new();
        let response = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .expect("Failed to send request");

        assert!(response.status().is_success());

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["status"], "ok");
        assert!(body["version"].as_str().is_some());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let (addr, shutdown_tx) = start().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{}/sessions/tab-1/events", addr))
            .json(&steady_typing(30))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["accepted"], 30);
        assert_eq!(body["samples"], 29);

        let response = client
            .get(format!("http://{}/sessions/tab-1/state", addr))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["reading"]["state"], "focused");
        assert_eq!(body["reading"]["cognitive_load"], "low");
        assert_eq!(body["adaptation"]["theme"], "focus");

        let response = client
            .delete(format!("http://{}/sessions/tab-1", addr))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

        let response = client
            .get(format!("http://{}/sessions/tab-1/state", addr))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["code"], "SESSION_NOT_FOUND");

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_unknown_session_delete() {
        let (addr, shutdown_tx) = start().await;

        let response = reqwest::Client::new()
            .delete(format!("http://{}/sessions/missing", addr))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_invalid_session_ids_rejected() {
        let (addr, shutdown_tx) = start().await;
        let client = reqwest::Client::new();

        for id in ["bad.id".to_string(), "a".repeat(65)] {
            let response = client
                .post(format!("http://{}/sessions/{}/events", addr, id))
                .json(&steady_typing(1))
                .send()
                .await
                .expect("Failed to send request");
            assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST, "id {id}");
            let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
            assert_eq!(body["code"], "INVALID_SESSION_ID");
        }

        // 64 characters is still accepted
        let response = client
            .post(format!("http://{}/sessions/{}/events", addr, "a".repeat(64)))
            .json(&steady_typing(1))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_session_limit() {
        let config = ServerConfig {
            max_sessions: 1,
            ..ServerConfig::new(0, test_data_dir())
        };
        let (addr, shutdown_tx) = start_with(config).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{}/sessions/tab-1/events", addr))
            .json(&steady_typing(3))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let response = client
            .post(format!("http://{}/sessions/tab-2/events", addr))
            .json(&steady_typing(3))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["code"], "TOO_MANY_SESSIONS");

        // Existing sessions keep accepting events at the limit
        let response = client
            .post(format!("http://{}/sessions/tab-1/events", addr))
            .json(&steady_typing(3))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let response = client
            .delete(format!("http://{}/sessions/tab-1", addr))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::NO_CONTENT);

        let response = client
            .post(format!("http://{}/sessions/tab-2/events", addr))
            .json(&steady_typing(3))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_idle_session_evicted_at_limit() {
        let config = ServerConfig {
            max_sessions: 1,
            session_idle_timeout: Duration::ZERO,
            ..ServerConfig::new(0, test_data_dir())
        };
        let (addr, shutdown_tx) = start_with(config).await;
        let client = reqwest::Client::new();

        for id in ["tab-1", "tab-2"] {
            let response = client
                .post(format!("http://{}/sessions/{}/events", addr, id))
                .json(&steady_typing(3))
                .send()
                .await
                .expect("Failed to send request");
            assert!(response.status().is_success(), "session {id}");
        }

        let response = client
            .get(format!("http://{}/sessions/tab-1/state", addr))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);

        let response = client
            .get(format!("http://{}/sessions/tab-2/state", addr))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_chat_endpoint() {
        let (addr, shutdown_tx) = start().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{}/chat", addr))
            .json(&json!({ "message": "I can't sleep lately" }))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success());
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["topic"], "sleep");
        assert!(!body["message"].as_str().unwrap_or("").is_empty());

        let response = client
            .post(format!("http://{}/chat", addr))
            .json(&json!({ "message": "   ", "session_id": "tab-1" }))
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["code"], "EMPTY_MESSAGE");

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_stats_count_events() {
        let (addr, shutdown_tx) = start().await;
        let client = reqwest::Client::new();

        client
            .post(format!("http://{}/sessions/tab-2/events", addr))
            .json(&steady_typing(5))
            .send()
            .await
            .expect("Failed to send request");

        let body: serde_json::Value = client
            .get(format!("http://{}/stats", addr))
            .send()
            .await
            .expect("Failed to send request")
            .json()
            .await
            .expect("Failed to parse JSON");
        assert_eq!(body["keyboard_events"], 5);
        assert_eq!(body["readings_computed"], 0);

        let _ = shutdown_tx.send(());
    }

    #[tokio::test]
    async fn test_cors_headers() {
        let (addr, shutdown_tx) = start().await;

        // Send OPTIONS request to check CORS
        let client = reqwest::Client::new();
        let response = client
            .request(
                reqwest::Method::OPTIONS,
                format!("http://{}/sessions/tab-1/events", addr),
            )
            .header("Origin", "http://localhost")
            .header("Access-Control-Request-Method", "POST")
            .send()
            .await
            .expect("Failed to send request");

        // CORS preflight should succeed
        assert!(
            response.status().is_success() || response.status() == reqwest::StatusCode::NO_CONTENT,
            "CORS preflight failed: {}",
            response.status()
        );

        let _ = shutdown_tx.send(());
    }
}
