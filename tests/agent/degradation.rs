use std::sync::Arc;
use std::time::Duration;

use chainpilot::agent::{AgentOptions, RequestContext};
use chainpilot::chain::DisabledExecutor;
use chainpilot::error::{AgentError, ReasoningError, Step};
use chainpilot::task::{FileTaskStore, TaskStore};

use super::fakes::{FlakyStore, RecordingExecutor, StubBackend, StubReply, agent_with, options};

async fn goals_in(store: &dyn TaskStore) -> Vec<String> {
    store
        .recent_by_time(100)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.goal)
        .collect()
}

#[tokio::test]
async fn reasoning_timeout_persists_nothing() {
    let store = Arc::new(FileTaskStore::ephemeral());
    let agent = agent_with(
        StubBackend::new(StubReply::Hang),
        RecordingExecutor::succeeding("unused"),
        store.clone(),
        AgentOptions {
            llm_timeout: Some(Duration::from_millis(50)),
            ..AgentOptions::default()
        },
    );

    let err = agent
        .run(&RequestContext::new(), "slow thinker", "balance", "0xabc")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AgentError::Reasoning(ReasoningError::Timeout(d)) if d == Duration::from_millis(50)
    ));
    assert!(err.is_timeout());
    assert!(!goals_in(store.as_ref()).await.contains(&"slow thinker".to_string()));
}

#[tokio::test]
async fn reasoning_failure_is_fatal_and_skips_chain() {
    let store = Arc::new(FileTaskStore::ephemeral());
    let executor = RecordingExecutor::succeeding("unused");
    let agent = agent_with(
        StubBackend::new(StubReply::Fail),
        executor.clone(),
        store.clone(),
        options(5),
    );

    let err = agent
        .run(&RequestContext::new(), "anything", "balance", "0xabc")
        .await
        .unwrap_err();

    assert_eq!(err.code(), "reasoning_error");
    assert!(executor.calls().is_empty());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn blank_reasoning_payload_is_an_error() {
    let store = Arc::new(FileTaskStore::ephemeral());
    let agent = agent_with(
        StubBackend::new(StubReply::Raw("   \n".into())),
        Arc::new(DisabledExecutor),
        store.clone(),
        options(5),
    );
    let err = agent
        .run(&RequestContext::new(), "anything", "", "")
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Reasoning(ReasoningError::EmptyReply)));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn chain_failure_still_persists_the_task() {
    let store = Arc::new(FileTaskStore::ephemeral());
    let agent = agent_with(
        StubBackend::echo(),
        RecordingExecutor::failing("execution reverted"),
        store.clone(),
        options(5),
    );

    let task = agent
        .run(&RequestContext::new(), "查询地址余额", "balance", "0xabc")
        .await
        .unwrap();

    assert!(task.observations.contains("execution reverted"));
    assert!(task.observations.starts_with("chain action `balance` failed"));
    assert!(task.chain_id.is_empty());
    assert!(task.block_number.is_empty());
    assert_eq!(task.reply, "answer to 查询地址余额");
    assert_eq!(store.get(task.id).await.unwrap(), task);
}

#[tokio::test]
async fn history_read_failure_aborts_before_reasoning() {
    let backend = StubBackend::echo();
    let agent = agent_with(
        backend.clone(),
        Arc::new(DisabledExecutor),
        FlakyStore::failing_reads(),
        options(5),
    );
    let err = agent
        .run(&RequestContext::new(), "hello", "", "")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "storage_error");
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn persist_failure_is_fatal_after_side_effects() {
    let executor = RecordingExecutor::succeeding("balance=2 ETH");
    let agent = agent_with(
        StubBackend::echo(),
        executor.clone(),
        FlakyStore::failing_writes(),
        options(5),
    );
    let err = agent
        .run(&RequestContext::new(), "hello", "balance", "0xabc")
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Storage(_)));
    // Side effects are not rolled back.
    assert_eq!(executor.calls().len(), 1);
}

#[tokio::test]
async fn cancellation_during_reasoning_persists_nothing() {
    let store = Arc::new(FileTaskStore::ephemeral());
    let agent = agent_with(
        StubBackend::new(StubReply::Hang),
        Arc::new(DisabledExecutor),
        store.clone(),
        options(5),
    );
    let ctx = RequestContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        canceller.cancel();
    });

    let err = agent.run(&ctx, "stop me", "", "").await.unwrap_err();
    assert!(matches!(
        err,
        AgentError::Cancelled {
            step: Step::Reasoning
        }
    ));
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn request_deadline_maps_to_timeout_error() {
    let agent = agent_with(
        StubBackend::new(StubReply::Hang),
        Arc::new(DisabledExecutor),
        Arc::new(FileTaskStore::ephemeral()),
        options(5),
    );
    let ctx = RequestContext::with_timeout(Duration::from_millis(40));
    let err = agent.run(&ctx, "deadline", "", "").await.unwrap_err();
    assert!(matches!(
        err,
        AgentError::Timeout {
            step: Step::Reasoning
        }
    ));
    assert_eq!(err.code(), "timeout");
}
