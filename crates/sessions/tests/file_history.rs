use std::io::Write;

use synapse_sessions::{ConversationTurn, FileHistoryStore, HistoryStore, TurnRole};

#[tokio::test]
async fn history_survives_a_new_store_instance() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = FileHistoryStore::open(dir.path()).unwrap();
        store
            .append(
                "persisted",
                &[ConversationTurn::human("ping"), ConversationTurn::assistant("pong")],
            )
            .await
            .unwrap();
        store
            .append("persisted", &[ConversationTurn::human("again")])
            .await
            .unwrap();
    }

    let reopened = FileHistoryStore::open(dir.path()).unwrap();
    let turns = reopened.load("persisted").await.unwrap();
    let roles: Vec<_> = turns.iter().map(|t| t.role).collect();
    let contents: Vec<_> = turns.iter().map(|t| t.content.as_str()).collect();

    assert_eq!(roles, [TurnRole::Human, TurnRole::Assistant, TurnRole::Human]);
    assert_eq!(contents, ["ping", "pong", "again"]);
    assert!(turns[0].timestamp <= turns[2].timestamp);
}

#[tokio::test]
async fn malformed_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mixed.jsonl");
    {
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"{{"timestamp":"2024-05-01T10:00:00Z","role":"human","content":"first"}}"#
        )
        .unwrap();
        writeln!(f, "not json at all").unwrap();
        writeln!(f).unwrap();
        writeln!(f, r#"{{"role":"robot","content":"?"}}"#).unwrap();
        writeln!(
            f,
            r#"{{"timestamp":"2024-05-01T10:00:01Z","role":"assistant","content":"second"}}"#
        )
        .unwrap();
    }

    let store = FileHistoryStore::open(dir.path()).unwrap();
    let turns = store.load("mixed").await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].content, "first");
    assert_eq!(turns[1].role, TurnRole::Assistant);
}

#[tokio::test]
async fn one_file_per_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileHistoryStore::open(dir.path()).unwrap();

    store.append("alpha", &[ConversationTurn::human("a")]).await.unwrap();
    store.append("beta", &[ConversationTurn::human("b")]).await.unwrap();

    assert!(dir.path().join("alpha.jsonl").is_file());
    assert!(dir.path().join("beta.jsonl").is_file());
    assert_eq!(store.load("alpha").await.unwrap()[0].content, "a");
    assert_eq!(store.load("beta").await.unwrap()[0].content, "b");
}

#[tokio::test]
async fn concurrent_distinct_sessions_do_not_mix() {
    let dir = tempfile::tempdir().unwrap();
    let store = std::sync::Arc::new(FileHistoryStore::open(dir.path()).unwrap());

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let sid = format!("session-{i}");
            for n in 0..5 {
                store
                    .append(&sid, &[ConversationTurn::human(format!("{i}:{n}"))])
                    .await
                    .unwrap();
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    for i in 0..8 {
        let turns = store.load(&format!("session-{i}")).await.unwrap();
        assert_eq!(turns.len(), 5);
        assert!(turns.iter().all(|t| t.content.starts_with(&format!("{i}:"))));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn load_racing_append_never_hides_the_append() {
    let dir = tempfile::tempdir().unwrap();
    let store = std::sync::Arc::new(FileHistoryStore::open(dir.path()).unwrap());

    for trial in 0..100 {
        let sid = format!("race-{trial}");

        let loader = {
            let store = store.clone();
            let sid = sid.clone();
            tokio::spawn(async move { store.load(&sid).await.unwrap() })
        };
        let writer = {
            let store = store.clone();
            let sid = sid.clone();
            tokio::spawn(async move {
                store
                    .append(&sid, &[ConversationTurn::human("q"), ConversationTurn::assistant("a")])
                    .await
                    .unwrap()
            })
        };

        loader.await.unwrap();
        writer.await.unwrap();

        let after = store.load(&sid).await.unwrap();
        let fresh = FileHistoryStore::open(dir.path()).unwrap().load(&sid).await.unwrap();
        assert_eq!(after.len(), 2, "trial {trial}");
        assert_eq!(after, fresh, "trial {trial}");
    }
}
