//! Bulk-load sessions over RocksDB and Tantivy.

use pretty_assertions::assert_eq;

use batch_index_types::{
    IndexConfig, IndexError, IndexKind, ValueEncoding, CONFIG_PROVIDER, CONFIG_TO_LOWER_CASE,
    CONFIG_TYPE,
};
use e2e_tests::{seed_graph, TestHarness};

#[test]
fn test_node_index_session() {
    let harness = TestHarness::new();
    let storage = harness.open_storage();
    seed_graph(&storage);
    let mut session = harness.session_with(storage);

    {
        let mut people = session.node_index("people", None).unwrap();
        people.add(1, [("name", "Alice"), ("city", "Oslo")]).unwrap();
        people.add(2, [("name", "Bob"), ("city", "Oslo")]).unwrap();
        people.add(3, [("name", "Carol"), ("city", "Bergen")]).unwrap();
        people.flush().unwrap();

        assert_eq!(people.get("city", "Oslo").unwrap(), vec![1, 2]);
        assert_eq!(people.get("name", "Carol").unwrap(), vec![3]);
        assert_eq!(people.documents_added(), 3);
    }

    // Same name and config hits the cache
    let again = session.node_index("people", None).unwrap();
    assert_eq!(again.documents_added(), 3);
    assert_eq!(session.index_count(), 1);

    session.shutdown().unwrap();
    assert!(harness.index_path.join("node/people/meta.json").exists());
}

#[test]
fn test_relationship_index_has_endpoints() {
    let harness = TestHarness::new();
    let storage = harness.open_storage();
    seed_graph(&storage);
    let mut session = harness.session_with(storage);

    let mut knows = session.relationship_index("knows", None).unwrap();
    knows.add(10, [("since", 2019)]).unwrap();
    knows.add(11, [("since", 2021)]).unwrap();
    knows.add(12, [("since", 2021)]).unwrap();
    knows.flush().unwrap();

    assert_eq!(knows.get("_start_node_id_", "2").unwrap(), vec![11]);
    assert_eq!(knows.get("_end_node_id_", "2").unwrap(), vec![10]);
    assert_eq!(knows.get("since", "2021").unwrap(), vec![11, 12]);
    assert_eq!(knows.identifier().kind, IndexKind::Relationship);

    session.shutdown().unwrap();
}

#[test]
fn test_numeric_and_string_encodings_differ() {
    let harness = TestHarness::new();
    let storage = harness.open_storage();
    seed_graph(&storage);
    let mut session = harness.session_with(storage);

    let mut ages = session.node_index("ages", None).unwrap();
    ages.add(1, [("age", ValueEncoding::numeric(30).unwrap())])
        .unwrap();
    ages.add(2, [("age", ValueEncoding::new(30))]).unwrap();
    ages.flush().unwrap();

    assert_eq!(ages.get("age", ValueEncoding::numeric(30).unwrap()).unwrap(), vec![1]);
    assert_eq!(ages.get("age", "30").unwrap(), vec![2]);

    session.shutdown().unwrap();
}

#[test]
fn test_fulltext_index() {
    let harness = TestHarness::new();
    let storage = harness.open_storage();
    seed_graph(&storage);
    let mut session = harness.session_with(storage);

    let config = IndexConfig::new().with(CONFIG_TYPE, "fulltext");
    let mut bios = session.node_index("bios", Some(&config)).unwrap();
    assert_eq!(
        bios.identifier().config,
        IndexConfig::new()
            .with(CONFIG_PROVIDER, "tantivy")
            .with(CONFIG_TYPE, "fulltext")
            .with(CONFIG_TO_LOWER_CASE, "true")
    );

    bios.add(1, [("bio", "Writes Rust at night")]).unwrap();
    bios.add(2, [("bio", "Paints at dawn")]).unwrap();
    bios.flush().unwrap();

    assert_eq!(bios.get("bio", "rust").unwrap(), vec![1]);
    assert_eq!(bios.get("bio", "AT").unwrap(), vec![1, 2]);

    session.shutdown().unwrap();
}

#[test]
fn test_update_or_add_replaces_document() {
    let harness = TestHarness::new();
    let storage = harness.open_storage();
    seed_graph(&storage);
    let mut session = harness.session_with(storage);

    let mut people = session.node_index("people", None).unwrap();
    people.add(1, [("name", "Alice")]).unwrap();
    people.flush().unwrap();

    people.update_or_add(1, [("name", "Alicia")]).unwrap();
    people.flush().unwrap();

    assert!(people.get("name", "Alice").unwrap().is_empty());
    assert_eq!(people.get("name", "Alicia").unwrap(), vec![1]);

    session.shutdown().unwrap();
}

#[test]
fn test_unknown_entity_rejected() {
    let harness = TestHarness::new();
    let storage = harness.open_storage();
    seed_graph(&storage);
    let mut session = harness.session_with(storage);

    let err = session
        .node_index("people", None)
        .unwrap()
        .add(99, [("name", "Nobody")])
        .unwrap_err();
    assert!(matches!(err, IndexError::EntityNotFound { kind: "node", id: 99 }));

    let err = session
        .relationship_index("knows", None)
        .unwrap()
        .add(1, [("since", 2020)])
        .unwrap_err();
    assert!(matches!(
        err,
        IndexError::EntityNotFound {
            kind: "relationship",
            id: 1
        }
    ));

    session.shutdown().unwrap();
}

#[test]
fn test_use_after_shutdown() {
    let harness = TestHarness::new();
    let mut session = harness.session();
    session.node_index("people", None).unwrap();
    session.relationship_index("knows", None).unwrap();
    assert_eq!(session.index_count(), 2);

    session.shutdown().unwrap();
    assert!(session.is_shut_down());

    assert!(matches!(
        session.node_index("people", None),
        Err(IndexError::UseAfterShutdown)
    ));
    assert!(matches!(
        session.relationship_index("knows", None),
        Err(IndexError::UseAfterShutdown)
    ));
    assert!(matches!(session.shutdown(), Err(IndexError::UseAfterShutdown)));
}
