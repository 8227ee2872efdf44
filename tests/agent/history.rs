use std::sync::Arc;

use chainpilot::agent::RequestContext;
use chainpilot::chain::DisabledExecutor;
use chainpilot::task::{FileTaskStore, SqliteTaskStore, TaskStore};

use super::fakes::{RecordingExecutor, StubBackend, agent_with, options};

#[tokio::test]
async fn no_chain_action_never_touches_the_executor() {
    let backend = StubBackend::echo();
    let executor = RecordingExecutor::succeeding("unused");
    let agent = agent_with(
        backend.clone(),
        executor.clone(),
        Arc::new(FileTaskStore::ephemeral()),
        options(5),
    );
    let ctx = RequestContext::new();

    for goal in ["hello", "what is gas?", "  padded goal  "] {
        let task = agent.run(&ctx, goal, "", "0xabc").await.unwrap();
        assert!(task.chain_id.is_empty());
        assert!(task.block_number.is_empty());
        assert!(task.observations.is_empty());
        assert!(!task.reply.is_empty());
    }
    assert!(executor.calls().is_empty());
    assert_eq!(backend.calls(), 3);
}

#[tokio::test]
async fn memory_depth_bounds_history_to_most_recent_tasks() {
    let backend = StubBackend::echo();
    let agent = agent_with(
        backend.clone(),
        Arc::new(DisabledExecutor),
        Arc::new(FileTaskStore::ephemeral()),
        options(2),
    );
    let ctx = RequestContext::new();

    for goal in ["T0", "T1", "T2", "T3"] {
        agent.run(&ctx, goal, "", "").await.unwrap();
    }

    let seen: Vec<Vec<String>> = backend
        .requests()
        .iter()
        .map(|r| r.history.iter().map(|h| h.goal.clone()).collect())
        .collect();
    assert_eq!(
        seen,
        vec![
            Vec::<String>::new(),
            vec!["T0".to_string()],
            vec!["T1".to_string(), "T0".to_string()],
            vec!["T2".to_string(), "T1".to_string()],
        ]
    );
}

#[tokio::test]
async fn history_is_fed_newest_first_from_sqlite() {
    let backend = StubBackend::echo();
    let store = Arc::new(SqliteTaskStore::in_memory().await.unwrap());
    let agent = agent_with(
        backend.clone(),
        Arc::new(DisabledExecutor),
        store,
        options(2),
    );
    let ctx = RequestContext::new();

    agent.run(&ctx, "T1", "", "").await.unwrap();
    agent.run(&ctx, "T2", "", "").await.unwrap();
    agent.run(&ctx, "T3", "", "").await.unwrap();

    let third = &backend.requests()[2];
    let goals: Vec<&str> = third.history.iter().map(|h| h.goal.as_str()).collect();
    assert_eq!(goals, ["T2", "T1"]);
    assert_eq!(third.history[0].reply, "answer to T2");
}

#[tokio::test]
async fn task_fetched_by_id_equals_run_result() {
    for store in [
        Arc::new(FileTaskStore::ephemeral()) as Arc<dyn TaskStore>,
        Arc::new(SqliteTaskStore::in_memory().await.unwrap()),
    ] {
        let agent = agent_with(
            StubBackend::echo(),
            RecordingExecutor::succeeding("nonce=7"),
            store.clone(),
            options(5),
        );
        let task = agent
            .run(&RequestContext::new(), "how many txs?", "nonce", "0xabc")
            .await
            .unwrap();
        let fetched = store.get(task.id).await.unwrap();
        assert_eq!(fetched, task, "store {}", store.name());
        assert_eq!(task.created_at, task.updated_at);
    }
}

#[tokio::test]
async fn concurrent_runs_get_unique_increasing_ids() {
    let tmp = tempfile::TempDir::new().unwrap();
    let store = Arc::new(
        SqliteTaskStore::open(&tmp.path().join("tasks.db"), 4)
            .await
            .unwrap(),
    );
    let agent = Arc::new(agent_with(
        StubBackend::echo(),
        Arc::new(DisabledExecutor),
        store.clone(),
        options(3),
    ));

    let mut handles = Vec::new();
    for i in 0..12 {
        let agent = agent.clone();
        handles.push(tokio::spawn(async move {
            agent
                .run(&RequestContext::new(), &format!("goal {i}"), "", "")
                .await
                .unwrap()
                .id
        }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 12);
    assert_eq!(store.count().await.unwrap(), 12);
}
