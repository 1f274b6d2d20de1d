//! Tests for the agent invoker.

mod common;

use std::sync::Arc;
use std::time::Duration;

use askweb::agent::AgentCache;
use askweb::error::{AskwebError, InvokeError};
use askweb::history::{HistoryStore, InMemoryHistoryStore, TurnRole};
use askweb::invoker::AgentInvoker;
use common::{test_config, FailingAgent, SlowAgent, StubAgent, StubFactory};
use pretty_assertions::assert_eq;
use serde_json::json;

fn invoker_with(agent: Arc<dyn askweb::agent::Agent>) -> (AgentInvoker, Arc<StubFactory>, Arc<InMemoryHistoryStore>) {
    let store = Arc::new(InMemoryHistoryStore::new());
    let factory = Arc::new(StubFactory::new(agent));
    let invoker = AgentInvoker::new(store.clone(), factory.clone());
    (invoker, factory, store)
}

#[tokio::test]
async fn success_appends_user_then_assistant() {
    let agent = Arc::new(StubAgent::new(json!([
        {"type": "thinking", "text": "let me search"},
        {"type": "text", "text": "Hello "},
        "world"
    ])));
    let (invoker, _, store) = invoker_with(agent.clone());

    let reply = invoker
        .invoke("s1", "hi there", &test_config("key"))
        .await
        .unwrap();

    assert_eq!(reply, "Hello world");
    let turns = store.list("s1");
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role(), TurnRole::User);
    assert_eq!(turns[0].text(), "hi there");
    assert_eq!(turns[1].role(), TurnRole::Assistant);
    assert_eq!(turns[1].text(), reply);
    assert_eq!(agent.calls(), 1);
}

#[tokio::test]
async fn prior_turns_are_passed_as_history() {
    let agent = Arc::new(StubAgent::new(json!("ok")));
    let (invoker, _, _) = invoker_with(agent.clone());
    let config = test_config("key");

    invoker.invoke("s1", "first", &config).await.unwrap();
    assert_eq!(agent.last_history_len("chat_history"), 0);

    invoker.invoke("s1", "second", &config).await.unwrap();
    assert_eq!(agent.last_history_len("chat_history"), 2);
}

#[tokio::test]
async fn upstream_failure_leaves_history_untouched() {
    let agent = Arc::new(StubAgent::new(json!("ok")));
    let (invoker, _, store) = invoker_with(agent);
    invoker.invoke("s1", "first", &test_config("key")).await.unwrap();
    let before = store.list("s1");

    let failing = Arc::new(FailingAgent::default());
    let failing_invoker = AgentInvoker::new(store.clone(), Arc::new(StubFactory::new(failing.clone())));
    let err = failing_invoker
        .invoke("s1", "second", &test_config("key"))
        .await
        .unwrap_err();

    assert!(matches!(err, InvokeError::Upstream(AskwebError::RateLimited { .. })));
    assert_eq!(failing.calls(), 1);
    assert_eq!(store.list("s1"), before);
}

#[tokio::test]
async fn sessions_are_isolated() {
    let (invoker, _, store) = invoker_with(Arc::new(StubAgent::new(json!("ok"))));
    let config = test_config("key");

    invoker.invoke("A", "only for A", &config).await.unwrap();

    assert_eq!(store.list("A").len(), 2);
    assert!(store.list("B").is_empty());
    assert!(store
        .list("B")
        .iter()
        .all(|turn| turn.text() != "only for A"));
}

#[tokio::test]
async fn empty_credential_fails_before_any_call() {
    let agent = Arc::new(StubAgent::new(json!("ok")));
    let (invoker, factory, store) = invoker_with(agent.clone());

    let err = invoker.invoke("s1", "hi", &test_config("  ")).await.unwrap_err();

    assert!(err.is_configuration());
    assert_eq!(agent.calls(), 0);
    assert_eq!(factory.builds(), 0);
    assert!(store.list("s1").is_empty());
}

#[tokio::test]
async fn slot_mismatch_is_a_configuration_error() {
    let agent = Arc::new(StubAgent::new(json!("ok")));
    let (invoker, _, _) = invoker_with(agent.clone());
    let config = test_config("key").with_slots("question", "chat_history", "agent_scratchpad");

    let err = invoker.invoke("s1", "hi", &config).await.unwrap_err();

    match err {
        InvokeError::Configuration(message) => assert!(message.contains("question"), "{message}"),
        other => panic!("expected Configuration, got {other:?}"),
    }
    assert_eq!(agent.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn timeout_surfaces_as_upstream() {
    let agent = Arc::new(SlowAgent {
        delay: Duration::from_secs(120),
    });
    let (invoker, _, store) = invoker_with(agent);
    let config = test_config("key").with_timeout(Duration::from_secs(1));

    let err = invoker.invoke("s1", "hi", &config).await.unwrap_err();

    assert!(matches!(err, InvokeError::Upstream(AskwebError::Timeout(1000))));
    assert!(store.list("s1").is_empty());
}

#[tokio::test]
async fn zero_timeout_is_rejected_before_any_call() {
    let agent = Arc::new(StubAgent::new(json!("ok")));
    let (invoker, factory, store) = invoker_with(agent.clone());
    let config = test_config("key").with_timeout(Duration::ZERO);

    let err = invoker.invoke("s1", "hi", &config).await.unwrap_err();

    assert!(err.is_configuration(), "{err:?}");
    assert_eq!(agent.calls(), 0);
    assert_eq!(factory.builds(), 0);
    assert!(store.list("s1").is_empty());
}

#[tokio::test]
async fn agent_is_built_once_per_credential() {
    let (invoker, factory, _) = invoker_with(Arc::new(StubAgent::new(json!("ok"))));

    invoker.invoke("s1", "a", &test_config("k1")).await.unwrap();
    invoker.invoke("s2", "b", &test_config("k1")).await.unwrap();
    assert_eq!(factory.builds(), 1);

    invoker.invoke("s1", "c", &test_config("k2")).await.unwrap();
    assert_eq!(factory.builds(), 2);
}

#[tokio::test]
async fn shared_cache_spans_invokers() {
    let cache = Arc::new(AgentCache::new());
    let factory = Arc::new(StubFactory::new(Arc::new(StubAgent::new(json!("ok")))));
    let store = Arc::new(InMemoryHistoryStore::new());
    let first = AgentInvoker::new(store.clone(), factory.clone()).with_cache(cache.clone());
    let second = AgentInvoker::new(store, factory.clone()).with_cache(cache.clone());

    first.invoke("s1", "a", &test_config("k")).await.unwrap();
    second.invoke("s2", "b", &test_config("k")).await.unwrap();

    assert_eq!(factory.builds(), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn without_cache_builds_every_call() {
    let (invoker, factory, _) = invoker_with(Arc::new(StubAgent::new(json!("ok"))));
    let invoker = invoker.without_cache();

    invoker.invoke("s1", "a", &test_config("k")).await.unwrap();
    invoker.invoke("s1", "b", &test_config("k")).await.unwrap();

    assert_eq!(factory.builds(), 2);
}

#[tokio::test]
async fn concurrent_sessions_do_not_interleave() {
    let (invoker, factory, store) = invoker_with(Arc::new(StubAgent::new(json!("ok"))));
    let invoker = Arc::new(invoker);

    let tasks: Vec<_> = (0..10)
        .map(|i| {
            let invoker = invoker.clone();
            tokio::spawn(async move {
                let key = format!("session-{}", i % 2);
                invoker
                    .invoke(&key, &format!("msg {i}"), &test_config("shared"))
                    .await
                    .unwrap();
            })
        })
        .collect();
    for task in futures::future::join_all(tasks).await {
        task.unwrap();
    }

    assert_eq!(factory.builds(), 1);
    for key in ["session-0", "session-1"] {
        let turns = store.list(key);
        assert_eq!(turns.len(), 10);
        for pair in turns.chunks(2) {
            assert_eq!(pair[0].role(), TurnRole::User);
            assert_eq!(pair[1].role(), TurnRole::Assistant);
        }
    }
}

#[tokio::test]
async fn credential_is_exported_to_configured_variable() {
    let (invoker, _, _) = invoker_with(Arc::new(StubAgent::new(json!("ok"))));
    let config = test_config("exported-key")
        .with_credential_env_var(Some("ASKWEB_TEST_EXPORTED_KEY".to_string()));

    invoker.invoke("s1", "hi", &config).await.unwrap();

    assert_eq!(
        std::env::var("ASKWEB_TEST_EXPORTED_KEY").as_deref(),
        Ok("exported-key")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_exports_leave_one_whole_credential() {
    const VAR: &str = "ASKWEB_TEST_CONCURRENT_KEY";
    let (invoker, _, store) = invoker_with(Arc::new(StubAgent::new(json!("ok"))));
    let keys: Vec<String> = (0..8).map(|i| format!("key-{i}")).collect();
    let configs: Vec<_> = keys
        .iter()
        .map(|key| test_config(key).with_credential_env_var(Some(VAR.to_string())))
        .collect();

    let sessions: Vec<String> = (0..8).map(|i| format!("s{i}")).collect();

    let results = futures::future::join_all(
        sessions
            .iter()
            .zip(&configs)
            .map(|(session, config)| invoker.invoke(session, "hi", config)),
    )
    .await;

    assert!(results.iter().all(Result::is_ok));
    let exported = std::env::var(VAR).unwrap();
    assert!(keys.contains(&exported), "{exported}");
    assert_eq!(store.list("s0").len(), 2);
}
