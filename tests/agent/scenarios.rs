use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use chainpilot::agent::{Agent, AgentOptions, RequestContext};
use chainpilot::error::{AgentError, ReasoningError};
use chainpilot::chain::{DisabledExecutor, EvmExecutor};
use chainpilot::config::OpenAiConfig;
use chainpilot::knowledge::{KnowledgeBinding, Snippet, StaticKnowledgeSource};
use chainpilot::reasoning::OpenAiBackend;
use chainpilot::task::{FileTaskStore, TaskStore};

use super::fakes::{RecordingExecutor, StubBackend, StubReply, agent_with, options};

const ADDRESS: &str = "0xabc0000000000000000000000000000000000def";

#[tokio::test]
async fn balance_query_records_executor_observation() {
    let backend = StubBackend::echo();
    let executor = RecordingExecutor::succeeding("balance=1.5 ETH");
    let store = Arc::new(FileTaskStore::ephemeral());
    let agent = agent_with(backend.clone(), executor.clone(), store.clone(), options(5));

    let task = agent
        .run(&RequestContext::new(), "查询地址余额", "balance", ADDRESS)
        .await
        .unwrap();

    assert_eq!(task.observations, "balance=1.5 ETH");
    assert_eq!(task.chain_action, "balance");
    assert_eq!(task.chain_id, "11155111");
    assert_eq!(task.block_number, "4242");
    assert!(!task.reply.is_empty());
    assert_eq!(
        executor.calls(),
        vec![("balance".to_string(), ADDRESS.to_string())]
    );
    assert_eq!(backend.requests()[0].chain_action, "balance");
    assert_eq!(store.get(task.id).await.unwrap(), task);
}

#[tokio::test]
async fn balance_query_against_json_rpc_node() {
    let node = MockServer::start().await;
    for (rpc, result) in [
        ("eth_getBalance", "0x14d1120d7b160000"),
        ("eth_chainId", "0x1"),
        ("eth_blockNumber", "0x12d687"),
    ] {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "method": rpc })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result})),
            )
            .mount(&node)
            .await;
    }

    let agent = agent_with(
        StubBackend::echo(),
        Arc::new(EvmExecutor::new("mainnet", node.uri(), Duration::from_secs(5))),
        Arc::new(FileTaskStore::ephemeral()),
        options(5),
    );
    let task = agent
        .run(&RequestContext::new(), "查询地址余额", "balance", ADDRESS)
        .await
        .unwrap();

    assert_eq!(task.observations, "balance=1.5 ETH");
    assert_eq!(task.chain_id, "1");
    assert_eq!(task.block_number, "1234567");
}

#[tokio::test]
async fn small_talk_without_knowledge_uses_backend_only() {
    let backend = StubBackend::echo();
    let disabled_knowledge = KnowledgeBinding::present(Arc::new(StaticKnowledgeSource::new(
        vec![Snippet {
            title: "Always".into(),
            content: "would match everything".into(),
            keywords: Vec::new(),
            tags: Vec::new(),
        }],
        0,
    )));
    let agent = Agent::new(
        backend.clone(),
        Arc::new(DisabledExecutor),
        Arc::new(FileTaskStore::ephemeral()),
        disabled_knowledge,
        options(5),
    );

    let task = agent
        .run(&RequestContext::new(), "随便聊聊", "", "")
        .await
        .unwrap();

    assert!(task.observations.is_empty());
    assert_eq!(task.thought, "considering 随便聊聊");
    assert_eq!(task.reply, "answer to 随便聊聊");
    assert!(backend.requests()[0].knowledge.is_empty());
}

#[tokio::test]
async fn matching_knowledge_cards_reach_the_backend() {
    let backend = StubBackend::echo();
    let knowledge = KnowledgeBinding::present(Arc::new(StaticKnowledgeSource::new(
        vec![
            Snippet {
                title: "Gas".into(),
                content: "Gas is paid in wei.".into(),
                keywords: vec!["gas".into()],
                tags: Vec::new(),
            },
            Snippet {
                title: "Balances".into(),
                content: "eth_getBalance returns wei.".into(),
                keywords: vec!["余额".into()],
                tags: vec!["balance".into()],
            },
        ],
        3,
    )));
    let agent = Agent::new(
        backend.clone(),
        RecordingExecutor::succeeding("balance=0 ETH"),
        Arc::new(FileTaskStore::ephemeral()),
        knowledge,
        options(5),
    );

    agent
        .run(&RequestContext::new(), "check it", "balance", ADDRESS)
        .await
        .unwrap();

    let titles: Vec<String> = backend.requests()[0]
        .knowledge
        .iter()
        .map(|c| c.title.clone())
        .collect();
    assert_eq!(titles, ["Balances"]);
}

#[tokio::test]
async fn unstructured_reply_is_kept_verbatim() {
    let raw = "Sure! Your balance looks fine.\nNo JSON here.";
    let agent = agent_with(
        StubBackend::new(StubReply::Raw(raw.into())),
        Arc::new(DisabledExecutor),
        Arc::new(FileTaskStore::ephemeral()),
        options(5),
    );
    let task = agent
        .run(&RequestContext::new(), "free text please", "", "")
        .await
        .unwrap();
    assert_eq!(task.thought, "");
    assert_eq!(task.reply, raw);
}

#[tokio::test]
async fn unstructured_completion_from_openai_compatible_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "plain prose reply"}}]
        })))
        .mount(&server)
        .await;

    let backend = OpenAiBackend::new(
        &OpenAiConfig {
            base_url: server.uri(),
            ..OpenAiConfig::default()
        },
        Some("sk-test"),
    );
    let agent = agent_with(
        Arc::new(backend),
        Arc::new(DisabledExecutor),
        Arc::new(FileTaskStore::ephemeral()),
        options(5),
    );
    let task = agent
        .run(&RequestContext::new(), "say something", "", "")
        .await
        .unwrap();
    assert_eq!(task.thought, "");
    assert_eq!(task.reply, "plain prose reply");
}

#[tokio::test]
async fn json_array_reply_is_kept_verbatim() {
    let raw = r#"["internal rationale","user reply"]"#;
    let agent = agent_with(
        StubBackend::new(StubReply::Raw(raw.into())),
        Arc::new(DisabledExecutor),
        Arc::new(FileTaskStore::ephemeral()),
        options(5),
    );
    let task = agent
        .run(&RequestContext::new(), "array payload", "", "")
        .await
        .unwrap();
    assert_eq!(task.thought, "");
    assert_eq!(task.reply, raw);
}

fn slow_completion(delay: Duration) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_delay(delay)
        .set_body_json(json!({
            "choices": [{"message": {"content": "{\"thought\":\"slow\",\"reply\":\"worth the wait\"}"}}]
        }))
}

fn openai_agent(base_url: String, timeout_secs: u64, llm_timeout: Duration) -> Agent {
    let backend = OpenAiBackend::new(
        &OpenAiConfig {
            base_url,
            timeout_secs,
            ..OpenAiConfig::default()
        },
        Some("sk-test"),
    );
    agent_with(
        Arc::new(backend),
        Arc::new(DisabledExecutor),
        Arc::new(FileTaskStore::ephemeral()),
        AgentOptions {
            llm_timeout: Some(llm_timeout),
            ..AgentOptions::default()
        },
    )
}

#[tokio::test]
async fn agent_llm_timeout_outlasts_backend_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(slow_completion(Duration::from_millis(1_500)))
        .mount(&server)
        .await;

    let agent = openai_agent(server.uri(), 1, Duration::from_secs(10));
    let task = agent
        .run(&RequestContext::new(), "patient question", "", "")
        .await
        .unwrap();
    assert_eq!(task.reply, "worth the wait");
}

#[tokio::test]
async fn slow_endpoint_exceeding_agent_budget_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(slow_completion(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let agent = openai_agent(server.uri(), 60, Duration::from_millis(300));
    let err = agent
        .run(&RequestContext::new(), "impatient question", "", "")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AgentError::Reasoning(ReasoningError::Timeout(d)) if d == Duration::from_millis(300)
    ));
}
