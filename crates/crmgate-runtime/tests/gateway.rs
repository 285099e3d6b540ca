use async_trait::async_trait;
use crmgate_client::{BackendFactory, ClientError, ClientResult, CrmBackend};
use crmgate_config::GatewayConfig;
use crmgate_core::{
    Arguments, Credential, ErrorKind, GatewayError, ManualClock, RateLimitConfig, RateLimiter,
    ResponseFormat, ToolRegistry, ValidationLimits, GENERIC_INTERNAL_MESSAGE,
};
use crmgate_runtime::Gateway;
use httpmock::prelude::*;
use serde_json::{json, Value as JsonValue};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake backend saw, in call order
#[derive(Debug, Clone, PartialEq)]
enum Call {
    Query { token: String, query: String, format: ResponseFormat },
    Tool { token: String, tool: String, arguments: Arguments },
}

#[derive(Debug, Clone, Copy)]
enum Behavior {
    Echo,
    Fail(u16),
    Panic,
}

#[derive(Clone)]
struct RecordingFactory {
    calls: Arc<Mutex<Vec<Call>>>,
    behavior: Behavior,
    delay: Duration,
}

impl RecordingFactory {
    fn new(behavior: Behavior) -> Self {
        Self { calls: Arc::new(Mutex::new(Vec::new())), behavior, delay: Duration::ZERO }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

struct RecordingBackend {
    credential: Credential,
    calls: Arc<Mutex<Vec<Call>>>,
    behavior: Behavior,
    delay: Duration,
}

impl RecordingBackend {
    async fn respond(&self, call: Call, body: JsonValue) -> ClientResult<JsonValue> {
        tokio::time::sleep(self.delay).await;
        self.calls.lock().unwrap().push(call);
        match self.behavior {
            Behavior::Echo => Ok(body),
            Behavior::Fail(status) => Err(ClientError::from_status(status, "backend said no".into())),
            Behavior::Panic => panic!("backend exploded"),
        }
    }
}

#[async_trait]
impl CrmBackend for RecordingBackend {
    async fn natural_query(&self, query: &str, format: ResponseFormat) -> ClientResult<JsonValue> {
        let token = self.credential.expose().to_string();
        let body = json!({ "natural_response": format!("answer for {}", token) });
        self.respond(Call::Query { token, query: query.to_string(), format }, body).await
    }

    async fn call_tool(&self, tool_name: &str, arguments: &Arguments) -> ClientResult<JsonValue> {
        let token = self.credential.expose().to_string();
        let body = json!({ "result": format!("{} for {}", tool_name, token) });
        self.respond(
            Call::Tool { token, tool: tool_name.to_string(), arguments: arguments.clone() },
            body,
        )
        .await
    }
}

impl BackendFactory for RecordingFactory {
    fn bind(&self, credential: Credential) -> ClientResult<Box<dyn CrmBackend>> {
        Ok(Box::new(RecordingBackend {
            credential,
            calls: self.calls.clone(),
            behavior: self.behavior,
            delay: self.delay,
        }))
    }
}

fn gateway_with(factory: RecordingFactory, limiter: RateLimiter) -> Gateway {
    Gateway::new(
        Arc::new(ToolRegistry::builtin()),
        Arc::new(limiter),
        Arc::new(factory),
        ValidationLimits::default(),
    )
}

fn gateway(factory: RecordingFactory) -> Gateway {
    gateway_with(factory, RateLimiter::new(RateLimitConfig::default()))
}

fn args(value: JsonValue) -> Arguments {
    value.as_object().cloned().unwrap()
}

fn token(t: &str) -> Credential {
    Credential::new(t).unwrap()
}

#[tokio::test]
async fn natural_query_reaches_backend_with_defaults() {
    let factory = RecordingFactory::new(Behavior::Echo);
    let gw = gateway(factory.clone());

    let result = gw
        .invoke("natural_query", args(json!({"query": "  show me leads  "})), token("tok-a"))
        .await
        .unwrap();

    assert!(result.succeeded);
    assert_eq!(result.tool_name, "natural_query");
    assert_eq!(result.text, "answer for tok-a");
    assert_eq!(result.response_format, Some(ResponseFormat::Both));
    assert_eq!(
        factory.calls(),
        vec![Call::Query {
            token: "tok-a".into(),
            query: "show me leads".into(),
            format: ResponseFormat::Both
        }]
    );
}

#[tokio::test]
async fn query_helper_passes_format() {
    let factory = RecordingFactory::new(Behavior::Echo);
    let gw = gateway(factory.clone());

    gw.query("deals closing", ResponseFormat::Table, token("tok-a")).await.unwrap();
    assert!(matches!(
        &factory.calls()[0],
        Call::Query { format: ResponseFormat::Table, .. }
    ));
}

#[tokio::test]
async fn registered_tool_dispatches_with_arguments() {
    let factory = RecordingFactory::new(Behavior::Echo);
    let gw = gateway(factory.clone());

    let result = gw
        .invoke("get_leads", args(json!({"limit": 10, "status": "open"})), token("tok-b"))
        .await
        .unwrap();

    assert_eq!(result.text, "get_leads for tok-b");
    assert_eq!(result.response_format, None);
    assert_eq!(
        factory.calls(),
        vec![Call::Tool {
            token: "tok-b".into(),
            tool: "get_leads".into(),
            arguments: args(json!({"limit": 10, "status": "open"}))
        }]
    );
}

#[tokio::test]
async fn unknown_tool_never_reaches_backend() {
    let factory = RecordingFactory::new(Behavior::Echo);
    let gw = gateway(factory.clone());

    let err = gw.invoke("delete_everything", Arguments::new(), token("tok")).await.unwrap_err();
    assert_eq!(err, GatewayError::UnknownTool("delete_everything".into()));
    assert!(factory.calls().is_empty());
}

#[tokio::test]
async fn invalid_arguments_never_reach_backend() {
    let factory = RecordingFactory::new(Behavior::Echo);
    let gw = gateway(factory.clone());

    let cases = vec![
        ("natural_query", json!({})),
        ("natural_query", json!({"query": "   "})),
        ("natural_query", json!({"query": "q".repeat(2001)})),
        ("natural_query", json!({"query": "x", "response_format": "csv"})),
        ("get_leads", json!({"limit": "ten"})),
        ("get_leads", json!({"limit": 0})),
        ("search_entities", json!({})),
        ("search_entities", json!({"entity_type": "invoice"})),
        ("get_contacts", json!({"fields": ["name", "name"]})),
    ];
    for (tool, arguments) in cases {
        let err = gw.invoke(tool, args(arguments.clone()), token("tok")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{} {}", tool, arguments);
    }
    assert!(factory.calls().is_empty());
}

#[tokio::test]
async fn rate_limit_applies_before_dispatch() {
    let clock = Arc::new(ManualClock::new());
    let limiter = RateLimiter::with_clock(RateLimitConfig::new(5, Duration::from_secs(60)), clock.clone());
    let factory = RecordingFactory::new(Behavior::Echo);
    let gw = gateway_with(factory.clone(), limiter);

    for _ in 0..5 {
        gw.invoke("get_leads", Arguments::new(), token("busy")).await.unwrap();
    }
    let err = gw.invoke("get_leads", Arguments::new(), token("busy")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert_eq!(factory.calls().len(), 5);

    // Another caller is unaffected
    gw.invoke("get_leads", Arguments::new(), token("quiet")).await.unwrap();

    clock.advance(Duration::from_secs(61));
    gw.invoke("get_leads", Arguments::new(), token("busy")).await.unwrap();
    assert_eq!(factory.calls().len(), 7);
}

#[tokio::test]
async fn rejected_calls_do_not_consume_quota() {
    let limiter = RateLimiter::new(RateLimitConfig::new(1, Duration::from_secs(60)));
    let gw = gateway_with(RecordingFactory::new(Behavior::Echo), limiter);

    for _ in 0..3 {
        let _ = gw.invoke("nope", Arguments::new(), token("tok")).await;
        let _ = gw.invoke("get_leads", args(json!({"limit": -1})), token("tok")).await;
    }
    assert!(gw.invoke("get_leads", Arguments::new(), token("tok")).await.is_ok());
}

#[tokio::test]
async fn backend_failures_map_to_taxonomy() {
    let cases = [
        (401, ErrorKind::Unauthorized),
        (403, ErrorKind::Unauthorized),
        (422, ErrorKind::InvalidArgument),
        (500, ErrorKind::BackendError),
        (503, ErrorKind::BackendError),
    ];
    for (status, kind) in cases {
        let gw = gateway(RecordingFactory::new(Behavior::Fail(status)));
        let err = gw.invoke("get_contacts", Arguments::new(), token("tok")).await.unwrap_err();
        assert_eq!(err.kind(), kind, "status {}", status);
    }
}

#[tokio::test]
async fn backend_panic_becomes_internal_error() {
    let gw = gateway(RecordingFactory::new(Behavior::Panic));
    let err = gw.invoke("get_leads", Arguments::new(), token("tok")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InternalError);
    assert_eq!(err.public_message(), GENERIC_INTERNAL_MESSAGE);

    // The gateway keeps serving afterwards
    let err = gw.invoke("get_leads", Arguments::new(), token("tok")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InternalError);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_keep_their_own_credentials() {
    let factory = RecordingFactory::new(Behavior::Echo).with_delay(Duration::from_millis(20));
    let gw = Arc::new(gateway(factory.clone()));

    let mut handles = Vec::new();
    for i in 0..16 {
        let gw = gw.clone();
        handles.push(tokio::spawn(async move {
            let t = format!("caller-{}", i);
            let result = gw.invoke("get_leads", Arguments::new(), token(&t)).await.unwrap();
            (t, result.text)
        }));
    }
    for handle in handles {
        let (t, text) = handle.await.unwrap();
        assert_eq!(text, format!("get_leads for {}", t));
    }

    let mut seen: Vec<String> = factory
        .calls()
        .into_iter()
        .map(|call| match call {
            Call::Tool { token, .. } | Call::Query { token, .. } => token,
        })
        .collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), 16);
}

#[tokio::test]
async fn end_to_end_against_http_backend() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/entity/natural_query")
            .header("authorization", "Bearer real-token")
            .json_body(json!({"query": "open deals", "response_format": "both"}));
        then.status(200).json_body(json!({
            "natural_response": "You have 2 open deals.",
            "table_data": [
                {"name": "Acme", "amount": 1200},
                {"name": "Globex", "amount": 800}
            ]
        }));
    });

    let config = GatewayConfig { api_base_url: server.base_url(), ..GatewayConfig::default() };
    let gw = Gateway::from_config(&config).unwrap();

    let result = gw
        .invoke("natural_query", args(json!({"query": "open deals"})), token("real-token"))
        .await
        .unwrap();

    mock.assert();
    assert!(result.text.starts_with("You have 2 open deals.\n\n"));
    assert!(result.text.contains("| Acme |"));
    assert!(result.text.contains("| Globex |"));
}
