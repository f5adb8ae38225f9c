#![cfg(not(target_arch = "wasm32"))]

#[cfg(test)]
mod tests {
    use std::{
        path::Path,
        sync::{Arc, Mutex},
    };

    use axum::{
        body::Bytes,
        extract::State,
        http::{Method, StatusCode, Uri},
        Router,
    };

    use rest_publish::{
        errors::Error,
        host::{Host, Metadata, MemoryHost},
        metadata::{read_publish_record, RECORD_KEY},
        prompt::{AcceptDefaults, Prefilled, UserInput},
        settings::Settings,
        vault::FileVault,
        PublishStatus, Publisher, RecordId,
    };

    use serde_json::json;

    #[derive(Debug, Clone)]
    struct Captured {
        method: Method,
        path: String,
        body: String,
    }

    #[derive(Clone)]
    struct Mock {
        status: StatusCode,
        reply: &'static str,
        requests: Arc<Mutex<Vec<Captured>>>,
    }

    async fn capture(
        State(mock): State<Mock>,
        method: Method,
        uri: Uri,
        body: Bytes,
    ) -> (StatusCode, &'static str) {
        mock.requests.lock().unwrap().push(Captured {
            method,
            path: uri.path().to_owned(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });

        (mock.status, mock.reply)
    }

    async fn serve(status: StatusCode, reply: &'static str) -> (Settings, Arc<Mutex<Vec<Captured>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));

        let mock = Mock {
            status,
            reply,
            requests: requests.clone(),
        };

        let app = Router::new().fallback(capture).with_state(mock);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let settings = Settings {
            token: String::from("secret"),
            publish_url: format!("http://{}/api/posts/", addr),
        };

        (settings, requests)
    }

    const RECORD: &str = r#"{"id":42,"status":"published","title":"T","publish_date":"2023-07-01"}"#;

    const CONTENT: &str = "# Hello\n\nSome words.\n";

    fn hello() -> UserInput {
        UserInput {
            title: String::from("Hello"),
            status: PublishStatus::Draft,
            publish_date: String::from("2023-01-01"),
        }
    }

    fn host_with(metadata: serde_json::Value) -> MemoryHost {
        let metadata: Metadata = match metadata {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        };

        let host = MemoryHost::default();
        host.insert("notes/hello.md", CONTENT, metadata);
        host
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn create_then_update_roundtrip() {
        let (settings, requests) = serve(StatusCode::CREATED, RECORD).await;

        let publisher = Publisher::new(host_with(json!({ "tags": ["a"] })), &settings).unwrap();
        let path = Path::new("notes/hello.md");

        let record = publisher.publish(path, hello()).await.unwrap();
        assert_eq!(record.id, Some(RecordId::Number(42)));

        let stored = publisher.host().metadata(path).unwrap();
        assert_eq!(stored[RECORD_KEY], serde_json::from_str::<serde_json::Value>(RECORD).unwrap());
        assert_eq!(stored["tags"], json!(["a"]));

        publisher.publish(path, hello()).await.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].path, "/api/posts/");
        assert_eq!(requests[1].method, Method::PATCH);
        assert_eq!(requests[1].path, "/api/posts/42/");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn id_only_response_routes_next_upload_to_update() {
        let (settings, requests) = serve(StatusCode::CREATED, r#"{"id":5}"#).await;

        let publisher = Publisher::new(host_with(json!({})), &settings).unwrap();
        let path = Path::new("notes/hello.md");

        let record = publisher.publish(path, hello()).await.unwrap();
        assert_eq!(record.id, Some(RecordId::Number(5)));

        let stored = publisher.host().metadata(path).unwrap();
        assert_eq!(stored[RECORD_KEY], json!({ "id": 5 }));

        let context = publisher.context(path).await.unwrap();
        assert!(context.is_update());

        publisher.publish(path, hello()).await.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[0].path, "/api/posts/");
        assert_eq!(requests[1].method, Method::PATCH);
        assert_eq!(requests[1].path, "/api/posts/5/");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn response_without_id_is_not_persisted() {
        let (settings, _) = serve(StatusCode::CREATED, r#"{"title":"T"}"#).await;

        let publisher = Publisher::new(host_with(json!({})), &settings).unwrap();
        let path = Path::new("notes/hello.md");

        let error = publisher.publish(path, hello()).await.unwrap_err();

        assert!(matches!(
            error,
            Error::PublishApi(publish_api::errors::Error::MissingId)
        ));
        assert!(publisher.host().metadata(path).unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn first_upload_body() {
        let (settings, requests) = serve(StatusCode::CREATED, RECORD).await;

        let publisher = Publisher::new(host_with(json!({})), &settings).unwrap();

        publisher
            .publish(Path::new("notes/hello.md"), hello())
            .await
            .unwrap();

        let requests = requests.lock().unwrap();
        let body = &requests[0].body;

        assert!(body.contains("name=\"title\"\r\n\r\nHello\r\n"));
        assert!(body.contains("name=\"slug\"\r\n\r\nhello\r\n"));
        assert!(body.contains("name=\"publish_date\"\r\n\r\n2023-01-01\r\n"));
        assert!(body.contains("filename=\"hello.md\""));
        assert!(body.contains(CONTENT));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn rejected_upload_leaves_metadata() {
        let (settings, _) = serve(StatusCode::FORBIDDEN, "forbidden").await;

        let before = json!({ "webInfo": { "id": 7, "status": "draft", "title": "Old", "publish_date": "" } });
        let publisher = Publisher::new(host_with(before.clone()), &settings).unwrap();
        let path = Path::new("notes/hello.md");

        let error = publisher
            .run(path, &Prefilled(Some(hello())))
            .await
            .unwrap_err();

        assert!(error.is_rejected());
        match &error {
            Error::PublishApi(publish_api::errors::Error::Rejected { status, body, .. }) => {
                assert_eq!(*status, 403);
                assert_eq!(body.as_deref(), Some("forbidden"));
            }
            other => panic!("{:?}", other),
        }

        let stored = serde_json::Value::Object(publisher.host().metadata(path).unwrap());
        assert_eq!(stored, before);

        let notifications = publisher.host().notifications();
        assert_eq!(
            notifications,
            vec![String::from("❗ File Upload Failed: 403 Forbidden\nforbidden")]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn unknown_status_is_reported_by_code() {
        let (settings, _) = serve(StatusCode::from_u16(599).unwrap(), "").await;

        let publisher = Publisher::new(host_with(json!({})), &settings).unwrap();

        publisher
            .run(Path::new("notes/hello.md"), &Prefilled(Some(hello())))
            .await
            .unwrap_err();

        assert_eq!(
            publisher.host().notifications(),
            vec![String::from("❗ File Upload Failed: 599")]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn unreachable_server_leaves_metadata() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let settings = Settings {
            token: String::from("secret"),
            publish_url: format!("http://{}/api/posts/", addr),
        };

        let publisher = Publisher::new(host_with(json!({ "tags": [] })), &settings).unwrap();
        let path = Path::new("notes/hello.md");

        let error = publisher.publish(path, hello()).await.unwrap_err();

        assert!(error.is_transport());
        assert!(!error.is_rejected());

        let stored = serde_json::Value::Object(publisher.host().metadata(path).unwrap());
        assert_eq!(stored, json!({ "tags": [] }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn garbage_success_is_not_persisted() {
        let (settings, _) = serve(StatusCode::OK, "<html>saved</html>").await;

        let publisher = Publisher::new(host_with(json!({})), &settings).unwrap();
        let path = Path::new("notes/hello.md");

        let error = publisher.publish(path, hello()).await.unwrap_err();

        assert!(matches!(
            error,
            Error::PublishApi(publish_api::errors::Error::ResponseParse(_))
        ));
        assert!(publisher.host().metadata(path).unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn cancelled_prompt_has_no_effect() {
        let (settings, requests) = serve(StatusCode::CREATED, RECORD).await;

        let publisher = Publisher::new(host_with(json!({})), &settings).unwrap();
        let path = Path::new("notes/hello.md");

        let outcome = publisher.run(path, &Prefilled(None)).await.unwrap();

        assert_eq!(outcome, None);
        assert!(requests.lock().unwrap().is_empty());
        assert!(publisher.host().metadata(path).unwrap().is_empty());
        assert!(publisher.host().notifications().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn existing_record_seeds_update() {
        let (settings, requests) = serve(StatusCode::OK, RECORD).await;

        let existing = json!({ "webInfo": { "id": "abc", "status": "published", "title": "Kept Title", "publish_date": "2022-02-02" } });
        let publisher = Publisher::new(host_with(existing), &settings).unwrap();
        let path = Path::new("notes/hello.md");

        let context = publisher.context(path).await.unwrap();
        assert!(context.is_update());
        assert_eq!(context.defaults.title, "Kept Title");

        let record = publisher.run(path, &AcceptDefaults).await.unwrap();
        assert!(record.is_some());

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].method, Method::PATCH);
        assert_eq!(requests[0].path, "/api/posts/abc/");
        assert!(requests[0].body.contains("name=\"slug\"\r\n\r\nkept-title\r\n"));
        assert!(requests[0].body.contains("name=\"status\"\r\n\r\npublished\r\n"));

        assert_eq!(
            publisher.host().notifications(),
            vec![String::from("✅ File Uploaded")]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn malformed_record_creates() {
        let (settings, requests) = serve(StatusCode::CREATED, RECORD).await;

        let publisher = Publisher::new(host_with(json!({ "webInfo": "nonsense" })), &settings).unwrap();

        publisher
            .publish(Path::new("notes/hello.md"), hello())
            .await
            .unwrap();

        assert_eq!(requests.lock().unwrap()[0].method, Method::POST);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn same_document_uploads_are_serialized() {
        let (settings, requests) = serve(StatusCode::CREATED, RECORD).await;

        let publisher = Publisher::new(host_with(json!({})), &settings).unwrap();
        let path = Path::new("notes/hello.md");

        let (first, second) = tokio::join!(
            publisher.publish(path, hello()),
            publisher.publish(path, hello())
        );

        first.unwrap();
        second.unwrap();

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].method, Method::POST);
        assert_eq!(requests[1].method, Method::PATCH);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn vault_roundtrip() {
        let (settings, requests) = serve(StatusCode::CREATED, RECORD).await;

        let dir = tempfile::tempdir().unwrap();
        let note = "---\ntags:\n- rust\n---\n# Hello\n";
        std::fs::write(dir.path().join("hello.md"), note).unwrap();

        let publisher = Publisher::new(FileVault::new(dir.path()), &settings).unwrap();
        let path = Path::new("hello.md");

        publisher.publish(path, hello()).await.unwrap();

        let record = read_publish_record(publisher.host(), path).await.unwrap().unwrap();
        assert_eq!(record.id, Some(RecordId::Number(42)));
        assert_eq!(record.title, "T");

        let metadata = publisher.host().read_metadata(path).await.unwrap();
        assert_eq!(metadata["tags"], json!(["rust"]));

        let text = std::fs::read_to_string(dir.path().join("hello.md")).unwrap();
        assert!(text.ends_with("---\n# Hello\n"));

        publisher.publish(path, hello()).await.unwrap();

        let requests = requests.lock().unwrap();
        assert!(requests[0].body.contains(note));
        assert_eq!(requests[1].path, "/api/posts/42/");
    }
}
