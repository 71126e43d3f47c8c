//! Client tests against an in-memory transport.

#![allow(clippy::unwrap_used, clippy::panic, clippy::clone_on_ref_ptr)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http::Method;
use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use openai_relay::prelude::*;
use openai_relay::{ByteStream, RequestSpec};
use serde_json::{Value, json};

#[derive(Debug, Default)]
struct State {
    requests: Vec<RequestSpec>,
    responses: VecDeque<openai_relay::Result<Bytes>>,
    chunks: Vec<openai_relay::Result<Bytes>>,
}

/// Records every request and replays canned responses.
#[derive(Debug, Clone, Default)]
struct MockTransport {
    state: Arc<Mutex<State>>,
}

impl MockTransport {
    fn respond(&self, body: impl Into<Bytes>) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Ok(body.into()));
        self
    }

    fn fail(&self, error: Error) -> &Self {
        self.state.lock().unwrap().responses.push_back(Err(error));
        self
    }

    fn stream(&self, chunks: &[&'static str]) {
        self.state.lock().unwrap().chunks = chunks
            .iter()
            .map(|c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();
    }

    fn requests(&self) -> Vec<RequestSpec> {
        self.state.lock().unwrap().requests.clone()
    }

    fn last(&self) -> RequestSpec {
        self.requests().pop().unwrap()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: RequestSpec) -> openai_relay::Result<Bytes> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        state
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(Bytes::from_static(b"{}")))
    }

    async fn open_stream(&self, request: RequestSpec) -> openai_relay::Result<ByteStream> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request);
        let chunks = std::mem::take(&mut state.chunks);
        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}

fn client(transport: &MockTransport) -> Client {
    Client::builder(ClientConfig::new("sk-test"))
        .transport(transport.clone())
        .build()
        .unwrap()
}

fn json_body(spec: &RequestSpec) -> Value {
    serde_json::from_slice(&spec.body).unwrap()
}

#[tokio::test]
async fn test_completion_end_to_end() {
    let transport = MockTransport::default();
    transport.respond(
        r#"{"id":"cmpl-1","object":"text_completion","created":1589478378,"model":"gpt-3.5-turbo-instruct",
            "choices":[{"text":"\n\nThis is indeed a test","index":0,"finish_reason":"length"}],
            "usage":{"prompt_tokens":5,"completion_tokens":7,"total_tokens":12}}"#,
    );
    let client = client(&transport);

    let response = client
        .create_completion(&CompletionRequest::new("gpt-3.5-turbo-instruct", "Say this is a test").max_tokens(7))
        .await
        .unwrap();

    assert_eq!(response.id.as_deref(), Some("cmpl-1"));
    assert_eq!(response.first_choice().unwrap().text, "\n\nThis is indeed a test");
    assert_eq!(response.usage.unwrap().total_tokens, Some(12));

    let spec = transport.last();
    assert_eq!(spec.method, Method::POST);
    assert_eq!(spec.url.as_str(), "https://api.openai.com/v1/completions");
    assert_eq!(spec.headers[AUTHORIZATION], "Bearer sk-test");
    assert_eq!(spec.headers[CONTENT_TYPE], "application/json");
    assert_eq!(
        json_body(&spec),
        json!({"model": "gpt-3.5-turbo-instruct", "prompt": "Say this is a test", "max_tokens": 7})
    );
}

#[tokio::test]
async fn test_empty_object_is_empty_envelope() {
    let transport = MockTransport::default();
    transport.respond("{}").respond("{}");
    let client = client(&transport);

    let chat = client
        .create_chat(&ChatRequest::new("gpt-4", vec![ChatMessage::user("Hi")]))
        .await
        .unwrap();
    assert_eq!(chat, Envelope::default());
    assert!(chat.choices().is_empty());

    let embeddings = client
        .create_embedding(&EmbeddingRequest::new("text-embedding-ada-002", "Hi"))
        .await
        .unwrap();
    assert!(embeddings.data.is_none());
    assert!(embeddings.usage.is_none());
}

#[tokio::test]
async fn test_stream_chat_three_chunks() {
    let transport = MockTransport::default();
    transport.stream(&[
        "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hel\"}}]}\n\ndata: {\"id\":\"c1\",\"choi",
        "ces\":[{\"index\":0,\"delta\":{\"content\":\"lo\"}}]}\n\n",
        "data: [DONE]\n\n",
    ]);
    let client = client(&transport);

    let events = Arc::new(Mutex::new(Vec::new()));
    let completions = Arc::new(AtomicUsize::new(0));

    let mut decoder = {
        let events = events.clone();
        let completions = completions.clone();
        client
            .stream_chat(
                &ChatRequest::new("gpt-4", vec![ChatMessage::user("Hi")]),
                move |event| events.lock().unwrap().push(event),
                move || {
                    completions.fetch_add(1, Ordering::SeqCst);
                },
            )
            .await
            .unwrap()
    };
    decoder.finished().await;

    let events = events.lock().unwrap();
    let text: String = events
        .iter()
        .map(|e| {
            let env = e.as_ref().unwrap();
            env.first_choice().unwrap().delta.content.clone().unwrap()
        })
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(text, "Hello");
    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(decoder.state(), DecoderState::Completed);

    let spec = transport.last();
    assert_eq!(spec.headers[ACCEPT], "text/event-stream");
    assert_eq!(json_body(&spec)["stream"], true);
}

#[tokio::test]
async fn test_chat_stream_skips_malformed_frame() {
    let transport = MockTransport::default();
    transport.stream(&[
        "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n",
        "data: {not json}\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n",
        "data: [DONE]\n",
    ]);
    let client = client(&transport);

    let items: Vec<_> = client
        .create_chat_stream(&ChatRequest::new("gpt-4", vec![ChatMessage::user("Hi")]))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 3);
    assert!(items[0].is_ok());
    assert!(matches!(items[1], Err(Error::StreamDecode(_))));
    assert!(items[2].is_ok());
}

#[tokio::test]
async fn test_chat_error_inside_success_body() {
    let transport = MockTransport::default();
    transport.respond(
        r#"{"error":{"message":"That model is currently overloaded","type":"server_error","param":null,"code":null}}"#,
    );
    let client = client(&transport);

    let err = client
        .create_chat(&ChatRequest::new("gpt-4", vec![ChatMessage::user("Hi")]))
        .await
        .unwrap_err();

    match err {
        Error::Api { status, error } => {
            assert_eq!(status, None);
            assert_eq!(error.error_type.as_deref(), Some("server_error"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_errors_pass_through() {
    let transport = MockTransport::default();
    transport
        .fail(Error::from_status(
            401,
            br#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#,
        ))
        .fail(Error::from_status(500, b""))
        .fail(Error::network("Connection failed: refused"));
    let client = client(&transport);

    let unauthorized = client.list_models().await.unwrap_err();
    assert_eq!(unauthorized.status(), Some(401));
    assert_eq!(
        unauthorized.api_error().unwrap().code.as_deref(),
        Some("invalid_api_key")
    );
    assert!(!unauthorized.is_retryable());

    let server = client.list_models().await.unwrap_err();
    assert!(matches!(server, Error::HttpStatus { status: 500, ref body } if body.is_empty()));
    assert!(server.is_retryable());

    let network = client.list_models().await.unwrap_err();
    assert!(matches!(network, Error::Network(_)));
}

#[tokio::test]
async fn test_decode_failure() {
    let transport = MockTransport::default();
    transport.respond("<html>Bad Gateway</html>");
    let client = client(&transport);

    let err = client.retrieve_model("gpt-4").await.unwrap_err();
    assert!(matches!(err, Error::Decode { ref message, .. } if message.contains("Bad Gateway")));
}

#[tokio::test]
async fn test_resource_paths() {
    let transport = MockTransport::default();
    transport
        .respond(r#"{"id":"step_1","step_details":{"type":"message_creation","message_creation":{"message_id":"m"}}}"#)
        .respond(r#"{"id":"ftjob-1"}"#)
        .respond("raw file bytes")
        .respond(r#"{"object":"list","data":[]}"#)
        .respond(r#"{"object":"list","data":[]}"#)
        .respond(r#"{"id":"asst_1","object":"assistant.deleted","deleted":true}"#)
        .respond(r#"{"id":"run_1"}"#)
        .respond(r#"{"id":"run_1"}"#);
    let client = client(&transport);

    client
        .retrieve_run_step("thread_1", "run_1", "step_1")
        .await
        .unwrap();
    client.cancel_fine_tuning_job("ftjob-1").await.unwrap();
    let content = client.retrieve_file_content("file-1").await.unwrap();
    assert_eq!(content, "raw file bytes");
    client
        .list_files(Some(FilePurpose::FineTune))
        .await
        .unwrap();
    client
        .list_messages("thread_1", &ListParams::default().limit(2).order(Order::Asc))
        .await
        .unwrap();
    let deleted = client.delete_assistant("asst_1").await.unwrap();
    assert!(deleted.deleted);
    client
        .submit_tool_outputs("thread_1", "run_1", &[ToolOutput::new("call_1", "42")])
        .await
        .unwrap();
    client
        .create_thread_and_run(&ThreadRunRequest {
            assistant_id: "asst_1".into(),
            ..ThreadRunRequest::default()
        })
        .await
        .unwrap();

    let seen: Vec<_> = transport
        .requests()
        .into_iter()
        .map(|r| (r.method, r.url.to_string()))
        .collect();
    let base = "https://api.openai.com/v1";
    assert_eq!(
        seen,
        [
            (Method::GET, format!("{base}/threads/thread_1/runs/run_1/steps/step_1")),
            (Method::POST, format!("{base}/fine_tuning/jobs/ftjob-1/cancel")),
            (Method::GET, format!("{base}/files/file-1/content")),
            (Method::GET, format!("{base}/files?purpose=fine-tune")),
            (Method::GET, format!("{base}/threads/thread_1/messages?limit=2&order=asc")),
            (Method::DELETE, format!("{base}/assistants/asst_1")),
            (Method::POST, format!("{base}/threads/thread_1/runs/run_1/submit_tool_outputs")),
            (Method::POST, format!("{base}/threads/runs")),
        ]
    );

    let submit = &transport.requests()[6];
    assert_eq!(
        json_body(submit),
        json!({"tool_outputs": [{"tool_call_id": "call_1", "output": "42"}]})
    );
}

#[tokio::test]
async fn test_ids_are_encoded_as_single_segments() {
    let transport = MockTransport::default();
    transport.respond(r#"{"id":"x"}"#);
    let client = client(&transport);

    client.retrieve_model("ft:gpt-3.5/../secret").await.unwrap();
    let url = transport.last().url;
    assert_eq!(url.path_segments().unwrap().count(), 3);
    assert!(url.path().starts_with("/v1/models/"));
    assert!(!url.path().contains("/../"));
}

#[tokio::test]
async fn test_proxy_routing() {
    let transport = MockTransport::default();
    let client = Client::builder(ClientConfig::new("sk-test").with_base_url("https://gw.example.com/tenant"))
        .proxy(|op| format!("/relay/{op}"), |_| Method::POST)
        .transport(transport.clone())
        .build()
        .unwrap();

    client
        .create_chat(&ChatRequest::new("gpt-4", vec![ChatMessage::user("Hi")]))
        .await
        .unwrap();
    transport.respond(r#"{"id":"gpt-4"}"#);
    client.retrieve_model("gpt-4").await.unwrap();

    let urls: Vec<_> = transport
        .requests()
        .into_iter()
        .map(|r| (r.method, r.url.to_string()))
        .collect();
    assert_eq!(
        urls,
        [
            (Method::POST, "https://gw.example.com/tenant/relay/create-chat".to_owned()),
            (Method::POST, "https://gw.example.com/tenant/relay/retrieve-model/gpt-4".to_owned()),
        ]
    );
}

#[tokio::test]
async fn test_empty_proxy_path_sends_nothing() {
    let transport = MockTransport::default();
    let client = Client::builder(ClientConfig::new("sk-test"))
        .proxy(|_| String::new(), |_| Method::POST)
        .transport(transport.clone())
        .build()
        .unwrap();

    let err = client.list_models().await.unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn test_upload_file_is_multipart() {
    let transport = MockTransport::default();
    transport.respond(
        r#"{"id":"file-1","object":"file","bytes":3,"created_at":1,"filename":"data.jsonl","purpose":"fine-tune"}"#,
    );
    let client = client(&transport);

    let file = client
        .upload_file(&FileUpload::new("data.jsonl", &b"{}\n"[..], FilePurpose::FineTune))
        .await
        .unwrap();
    assert_eq!(file.id, "file-1");

    let spec = transport.last();
    let content_type = spec.headers[CONTENT_TYPE].to_str().unwrap().to_owned();
    let boundary = content_type
        .strip_prefix("multipart/form-data; boundary=")
        .unwrap();
    let body = String::from_utf8(spec.body.to_vec()).unwrap();
    assert!(body.starts_with(&format!("--{boundary}\r\n")));
    assert!(body.ends_with(&format!("--{boundary}--\r\n")));
    assert!(body.contains("name=\"file\"; filename=\"data.jsonl\""));
    assert!(body.contains("name=\"purpose\"\r\n\r\nfine-tune\r\n"));
}

#[tokio::test]
async fn test_custom_authorizer() {
    let transport = MockTransport::default();
    let client = Client::builder(ClientConfig::default())
        .authorizer(|headers: &mut http::HeaderMap| {
            headers.insert("api-key", http::HeaderValue::from_static("azure-key"));
            Ok::<_, Error>(())
        })
        .transport(transport.clone())
        .build()
        .unwrap();

    let _ = client.list_models().await;
    let spec = transport.last();
    assert_eq!(spec.headers["api-key"], "azure-key");
    assert!(spec.headers.get(AUTHORIZATION).is_none());
}

#[tokio::test]
async fn test_conversation_history_round_trip() {
    let transport = MockTransport::default();
    transport
        .respond(r#"{"choices":[{"text":" Paris.","index":0}]}"#)
        .respond(r#"{"choices":[{"text":" About 2 million.","index":0}]}"#);
    let client = client(&transport);
    let mut history = ConversationHistory::new().with_preamble("");

    client
        .complete_with_history(&mut history, "Capital of France?", "gpt-3.5-turbo-instruct")
        .await
        .unwrap();
    client
        .complete_with_history(&mut history, "Population?", "gpt-3.5-turbo-instruct")
        .await
        .unwrap();

    let second = json_body(&transport.requests()[1]);
    assert_eq!(
        second["prompt"],
        "User: Capital of France?\nAssistant: Paris.\n\nUser: Population?\nAssistant:"
    );
    assert_eq!(history.len(), 2);
}
