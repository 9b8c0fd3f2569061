use parley_contract::storage::{AssistantStore, StorageError, ThreadStore};
use parley_contract::thread::{Assistant, Message, Thread};
use parley_store_adapters::MemoryStore;

#[tokio::test]
async fn assistants_are_user_scoped() {
    let store = MemoryStore::new();

    store
        .put_assistant("u1", Assistant::new("a1", "Mine", serde_json::json!({})))
        .await
        .unwrap();
    store
        .put_assistant("u2", Assistant::new("a2", "Theirs", serde_json::json!({})))
        .await
        .unwrap();

    let mine = store.list_assistants("u1").await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].assistant_id, "a1");

    assert!(matches!(
        store.get_assistant("u1", "a2").await,
        Err(StorageError::NotFound(_))
    ));
}

#[tokio::test]
async fn put_assistant_replaces_existing() {
    let store = MemoryStore::new();

    store
        .put_assistant("u1", Assistant::new("a1", "First", serde_json::json!({})))
        .await
        .unwrap();
    store
        .put_assistant(
            "u1",
            Assistant::new("a1", "Second", serde_json::json!({ "model": "demo" })),
        )
        .await
        .unwrap();

    let loaded = store.get_assistant("u1", "a1").await.unwrap();
    assert_eq!(loaded.name, "Second");
    assert_eq!(loaded.config["model"], "demo");
    assert_eq!(store.list_assistants("u1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn public_listing_filters_by_flag_and_id() {
    let store = MemoryStore::new();

    store
        .put_assistant(
            "u1",
            Assistant::new("featured", "Featured", serde_json::json!({})).with_public(true),
        )
        .await
        .unwrap();
    store
        .put_assistant(
            "u1",
            Assistant::new("hidden", "Hidden", serde_json::json!({})).with_public(true),
        )
        .await
        .unwrap();
    store
        .put_assistant(
            "u2",
            Assistant::new("private", "Private", serde_json::json!({})),
        )
        .await
        .unwrap();

    let public = store
        .list_public_assistants(&["featured".to_string(), "private".to_string()])
        .await
        .unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].assistant_id, "featured");
}

#[tokio::test]
async fn thread_message_history_roundtrip() {
    let store = MemoryStore::new();

    store
        .put_thread("u1", Thread::new("t1", "Chat").with_assistant("a1"))
        .await
        .unwrap();
    store
        .put_thread_messages(
            "u1",
            "t1",
            vec![Message::user("hi"), Message::assistant("hello")],
        )
        .await
        .unwrap();

    let messages = store.get_thread_messages("u1", "t1").await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].content, "hello");

    // Metadata update keeps history.
    store
        .put_thread("u1", Thread::new("t1", "Renamed"))
        .await
        .unwrap();
    assert_eq!(store.get_thread_messages("u1", "t1").await.unwrap().len(), 2);
    assert_eq!(store.get_thread("u1", "t1").await.unwrap().name, "Renamed");
}

#[tokio::test]
async fn missing_thread_is_not_found() {
    let store = MemoryStore::new();
    assert!(matches!(
        store.get_thread_messages("u1", "missing").await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        store
            .put_thread_messages("u1", "missing", Vec::new())
            .await,
        Err(StorageError::NotFound(_))
    ));
}
