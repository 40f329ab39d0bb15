//! Integration tests for nestlist.
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::too_many_lines,
    clippy::redundant_closure_for_method_calls
)]

use std::sync::Arc;

use nestlist::storage::{HEAD_POINTER_ID, RowFields};
use nestlist::{
    Error, InMemoryRecordStore, LinkedList, ListTable, Node, NodeSpec, PersistentList,
    PersistentNestedList, Placement, RecordStore, SqliteRecordStore,
};
use tempfile::TempDir;
use test_case::test_case;

#[derive(Debug, Clone, Copy)]
enum Backend {
    Memory,
    Sqlite,
}

fn open_store(backend: Backend, dir: &TempDir) -> Arc<dyn RecordStore> {
    match backend {
        Backend::Memory => Arc::new(InMemoryRecordStore::new()),
        Backend::Sqlite => {
            Arc::new(SqliteRecordStore::open(dir.path().join("lists.db")).expect("open sqlite"))
        },
    }
}

fn head_id(list: &LinkedList) -> Option<i64> {
    list.head().and_then(|h| list.node(h)).and_then(Node::id)
}

#[test]
fn test_error_types() {
    let err = Error::InvalidInput("test message".to_string());
    let display = format!("{err}");
    assert!(display.contains("invalid input"));
    assert!(display.contains("test message"));

    let err = Error::OperationFailed {
        operation: "insert".to_string(),
        cause: "disk full".to_string(),
    };
    let display = format!("{err}");
    assert!(display.contains("insert"));
    assert!(display.contains("disk full"));

    let err = Error::MissingSentinel {
        table: "cards".to_string(),
    };
    assert!(format!("{err}").contains("head pointer"));
}

#[test_case(Backend::Memory ; "in memory")]
#[test_case(Backend::Sqlite ; "sqlite")]
fn test_preset_ids_round_trip(backend: Backend) {
    let dir = TempDir::new().unwrap();
    let store = open_store(backend, &dir);

    let mut list = PersistentList::open(Arc::clone(&store), "cards").unwrap();
    for (i, id) in [111, 222, 333, 444].into_iter().enumerate() {
        list.add_node(
            Placement::Append,
            NodeSpec::labeled(format!("node-{}", i + 1)).with_id(id),
        )
        .unwrap();
    }
    drop(list);

    let mut reopened = PersistentList::open(Arc::clone(&store), "cards").unwrap();
    assert_eq!(reopened.list().len(), 4);
    assert_eq!(
        reopened.list().labels(),
        vec!["node-1", "node-2", "node-3", "node-4"]
    );
    assert_eq!(reopened.load_head_id().unwrap(), Some(111));
    assert_eq!(store.count("cards").unwrap(), 5);
}

#[test]
fn test_sqlite_file_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lists.db");

    {
        let store = SqliteRecordStore::open(&path).unwrap();
        let mut list = PersistentList::open(&store, "cards").unwrap();
        for label in ["b", "c"] {
            list.add_node(Placement::Append, NodeSpec::labeled(label)).unwrap();
        }
        list.navigate().first();
        list.add_node(Placement::BeforeCursor, NodeSpec::labeled("a")).unwrap();
    }

    let store = SqliteRecordStore::open(&path).unwrap();
    let mut list = PersistentList::open(&store, "cards").unwrap();
    assert_eq!(list.list().labels(), vec!["a", "b", "c"]);
    assert_eq!(list.load_head_id().unwrap(), head_id(list.list()));
}

#[test]
fn test_delete_interior_in_memory() {
    let mut list = LinkedList::new();
    for id in 1..=3 {
        list.add_node(
            Placement::Append,
            NodeSpec::labeled(format!("node-{id}")).with_id(id),
        );
    }
    list.find(2).unwrap();
    let removed = list.delete(None).unwrap();
    assert_eq!(removed.id(), Some(2));

    assert_eq!(list.ids(), vec![Some(1), Some(3)]);
    let first = list.find(1).unwrap();
    let third = list.find(3).unwrap();
    assert_eq!(list.node(first).and_then(Node::next), Some(third));
    assert_eq!(list.node(third).and_then(Node::prev), Some(first));

    let mut list = LinkedList::new();
    for id in 1..=3 {
        list.add_node(Placement::Append, NodeSpec::labeled(id.to_string()).with_id(id));
    }
    list.find(2);
    list.delete(None);
    assert_eq!(list.node_id(), Some(3));
}

#[test_case(Backend::Memory ; "in memory")]
#[test_case(Backend::Sqlite ; "sqlite")]
fn test_insert_before_head_updates_sentinel(backend: Backend) {
    let dir = TempDir::new().unwrap();
    let store = open_store(backend, &dir);

    let mut list = PersistentList::open(Arc::clone(&store), "cards").unwrap();
    list.add_node(Placement::Append, NodeSpec::labeled("2").with_id(2))
        .unwrap();
    list.add_node(Placement::Append, NodeSpec::labeled("3").with_id(3))
        .unwrap();
    list.navigate().first();
    list.add_node(Placement::BeforeCursor, NodeSpec::labeled("1").with_id(10))
        .unwrap();

    assert_eq!(list.list().labels(), vec!["1", "2", "3"]);
    let sentinel = store.select_by_id("cards", HEAD_POINTER_ID).unwrap().unwrap();
    assert_eq!(sentinel.payload_id, Some(10));
    let first = store.select_by_id("cards", 10).unwrap().unwrap();
    assert_eq!(first.next_id, Some(2));
}

#[test_case(Backend::Memory ; "in memory")]
#[test_case(Backend::Sqlite ; "sqlite")]
fn test_nested_head_id_written(backend: Backend) {
    let dir = TempDir::new().unwrap();
    let store = open_store(backend, &dir);

    let mut grid = PersistentNestedList::open(Arc::clone(&store), "grid").unwrap();
    let a = grid.add_list(Placement::Append, NodeSpec::labeled("A")).unwrap();
    grid.add_list(Placement::Append, NodeSpec::labeled("B")).unwrap();

    grid.navigate().set_cursor(a);
    let first = grid
        .add_node(Placement::Append, NodeSpec::labeled("A1"))
        .unwrap()
        .unwrap();
    grid.add_node(Placement::Append, NodeSpec::labeled("A2")).unwrap();
    grid.add_node(Placement::Append, NodeSpec::labeled("A3")).unwrap();

    let first_id = grid
        .grid()
        .sublist_of(a)
        .and_then(|sublist| sublist.node(first))
        .and_then(Node::id)
        .unwrap();
    let a_id = grid.grid().outer().node(a).and_then(Node::id).unwrap();
    assert_eq!(grid.grid().head_id(), Some(first_id));
    assert_eq!(
        store.select_by_id("grid", a_id).unwrap().unwrap().payload_id,
        Some(first_id)
    );

    let reopened = PersistentNestedList::open(Arc::clone(&store), "grid").unwrap();
    let outer = reopened.grid().outer();
    assert_eq!(outer.labels(), vec!["A", "B"]);
    let a = outer.head().unwrap();
    assert_eq!(
        reopened.grid().sublist_of(a).map(|s| s.labels()),
        Some(vec!["A1", "A2", "A3"])
    );
    let b = outer.tail().unwrap();
    assert!(reopened.grid().sublist_of(b).is_some_and(LinkedList::is_empty));
}

#[test_case(Backend::Memory ; "in memory")]
#[test_case(Backend::Sqlite ; "sqlite")]
fn test_taken_preset_id_leaves_chain_intact(backend: Backend) {
    let dir = TempDir::new().unwrap();
    let store = open_store(backend, &dir);

    let mut list = PersistentList::open(Arc::clone(&store), "cards").unwrap();
    list.add_node(Placement::Append, NodeSpec::labeled("a")).unwrap();
    list.add_node(Placement::Append, NodeSpec::labeled("b")).unwrap();
    let taken = head_id(list.list()).unwrap();

    let result = list.add_node(Placement::Append, NodeSpec::labeled("c").with_id(taken));
    assert!(matches!(result, Err(Error::InvalidInput(_))));
    let reserved = list.add_node(
        Placement::Append,
        NodeSpec::labeled("d").with_id(HEAD_POINTER_ID),
    );
    assert!(matches!(reserved, Err(Error::InvalidInput(_))));
    assert_eq!(list.list().labels(), vec!["a", "b"]);

    let mut grid = PersistentNestedList::open(Arc::clone(&store), "cards").unwrap();
    grid.navigate().first();
    let result = grid.add_node(Placement::Append, NodeSpec::labeled("a1").with_id(taken));
    assert!(matches!(result, Err(Error::InvalidInput(_))));

    let reopened = PersistentList::open(Arc::clone(&store), "cards").unwrap();
    assert_eq!(reopened.list().labels(), vec!["a", "b"]);
    assert_eq!(store.count("cards").unwrap(), 3);
}

#[test_case(Backend::Memory ; "in memory")]
#[test_case(Backend::Sqlite ; "sqlite")]
fn test_new_list_ignores_payload_id(backend: Backend) {
    let dir = TempDir::new().unwrap();
    let store = open_store(backend, &dir);

    let mut grid = PersistentNestedList::open(Arc::clone(&store), "grid").unwrap();
    let a = grid
        .add_list(Placement::Append, NodeSpec::labeled("A").with_payload_id(999))
        .unwrap();
    assert_eq!(grid.grid().head_id(), None);
    let a_id = grid.grid().outer().node(a).and_then(Node::id).unwrap();
    assert!(store.select_by_id("grid", a_id).unwrap().unwrap().payload_id.is_none());

    let mut reopened = PersistentNestedList::open(Arc::clone(&store), "grid").unwrap();
    assert_eq!(reopened.grid().outer().labels(), vec!["A"]);
    reopened.navigate().first();
    reopened
        .add_node(Placement::Append, NodeSpec::labeled("A1"))
        .unwrap();

    let again = PersistentNestedList::open(Arc::clone(&store), "grid").unwrap();
    let head = again.grid().outer().head().unwrap();
    assert_eq!(
        again.grid().sublist_of(head).map(|s| s.labels()),
        Some(vec!["A1"])
    );
}

#[test_case(0, &["node-2", "node-3", "node-4"] ; "head")]
#[test_case(1, &["node-1", "node-3", "node-4"] ; "interior")]
#[test_case(3, &["node-1", "node-2", "node-3"] ; "tail")]
fn test_persistent_delete(position: usize, expected: &[&str]) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("lists.db");
    let store = SqliteRecordStore::open(&path).unwrap();

    let mut list = PersistentList::open(&store, "cards").unwrap();
    for i in 1..=4 {
        list.add_node(Placement::Append, NodeSpec::labeled(format!("node-{i}")))
            .unwrap();
    }
    let ids_before = store.ids("cards").unwrap();

    list.navigate().find_at(position).unwrap();
    let removed = list.delete(None).unwrap().unwrap();
    let removed_id = removed.id().unwrap();

    let ids_after = store.ids("cards").unwrap();
    let expected_ids: Vec<i64> = ids_before.into_iter().filter(|id| *id != removed_id).collect();
    assert_eq!(ids_after, expected_ids);

    drop(list);
    let reopened = PersistentList::open(&store, "cards").unwrap();
    assert_eq!(reopened.list().labels(), expected);
}

#[test]
fn test_delete_list_cascades_to_sublist_rows() {
    let dir = TempDir::new().unwrap();
    let store = SqliteRecordStore::open(dir.path().join("grid.db")).unwrap();

    let mut grid = PersistentNestedList::open(&store, "grid").unwrap();
    for name in ["A", "B", "C"] {
        grid.add_list(Placement::Append, NodeSpec::labeled(name)).unwrap();
        for i in 1..=2 {
            grid.add_node(Placement::Append, NodeSpec::labeled(format!("{name}{i}")))
                .unwrap();
        }
    }
    assert_eq!(store.count("grid").unwrap(), 10);

    grid.navigate().find_at(1).unwrap();
    let removed = grid.delete_list(None).unwrap().unwrap();
    assert_eq!(removed.label(), "B");
    assert_eq!(store.count("grid").unwrap(), 7);

    drop(grid);
    let mut reopened = PersistentNestedList::open(&store, "grid").unwrap();
    assert_eq!(reopened.grid().outer().labels(), vec!["A", "C"]);
    reopened.navigate().last();
    assert_eq!(
        reopened.grid().sublist().map(|s| s.labels()),
        Some(vec!["C1", "C2"])
    );
}

#[test]
fn test_missing_sentinel_reported() {
    let store = InMemoryRecordStore::new();
    let mut list = PersistentList::open(&store, "cards").unwrap();
    list.add_node(Placement::Append, NodeSpec::labeled("a")).unwrap();

    store.delete("cards", HEAD_POINTER_ID).unwrap();
    let err = list.load_head_id().unwrap_err();
    assert!(matches!(err, Error::MissingSentinel { ref table } if table == "cards"));
}

#[test]
fn test_empty_list_is_not_an_error() {
    let store = InMemoryRecordStore::new();
    let mut list = PersistentList::open(&store, "cards").unwrap();
    assert_eq!(list.load_head_id().unwrap(), None);
}

#[test]
fn test_dangling_chain_fails_to_open() {
    let dir = TempDir::new().unwrap();
    let store = SqliteRecordStore::open(dir.path().join("lists.db")).unwrap();
    {
        let mut list = PersistentList::open(&store, "cards").unwrap();
        list.add_node(Placement::Append, NodeSpec::labeled("a").with_id(5))
            .unwrap();
    }
    let broken = RowFields {
        next_id: Some(99),
        payload_id: None,
        label: "a".to_string(),
    };
    assert!(store.update("cards", 5, &broken).unwrap());

    let result = PersistentList::open(&store, "cards");
    assert!(matches!(
        result,
        Err(Error::DanglingReference { id: 99, .. })
    ));
}

#[test]
fn test_backup_copy_is_loadable() {
    let dir = TempDir::new().unwrap();
    let store = SqliteRecordStore::open(dir.path().join("lists.db")).unwrap();
    let mut list = PersistentList::open(&store, "cards").unwrap();
    for label in ["x", "y", "z"] {
        list.add_node(Placement::Append, NodeSpec::labeled(label)).unwrap();
    }

    let copy_path = dir.path().join("backup").join("copy.db");
    std::fs::create_dir_all(copy_path.parent().unwrap()).unwrap();
    store.backup(&copy_path).unwrap();

    let copy = SqliteRecordStore::open(&copy_path).unwrap();
    let restored = PersistentList::open(&copy, "cards").unwrap();
    assert_eq!(restored.list().labels(), vec!["x", "y", "z"]);
}

#[test]
fn test_tables_are_independent() {
    let store = InMemoryRecordStore::new();
    let mut left = PersistentList::open(&store, "left").unwrap();
    let mut right = PersistentList::open(&store, "right").unwrap();
    left.add_node(Placement::Append, NodeSpec::labeled("l")).unwrap();
    right.add_node(Placement::Append, NodeSpec::labeled("r1")).unwrap();
    right.add_node(Placement::Append, NodeSpec::labeled("r2")).unwrap();

    let table = ListTable::new(&store, "left").unwrap();
    assert_eq!(table.row_count().unwrap(), 2);
    assert_eq!(store.count("right").unwrap(), 3);
    assert!(matches!(
        ListTable::new(&store, "bad name"),
        Err(Error::InvalidInput(_))
    ));
}
