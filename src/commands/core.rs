//! List command handlers.

use std::path::PathBuf;

use nestlist::config::NestlistConfig;
use nestlist::{
    Error, LinkedList, NodeSpec, PersistentList, PersistentNestedList, Placement, RecordStore,
    SqliteRecordStore,
};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Opens the configured database.
fn open_store(config: &NestlistConfig) -> Result<SqliteRecordStore, Error> {
    SqliteRecordStore::open(&config.database_path)
}

fn no_node_at(index: usize) -> Error {
    Error::InvalidInput(format!("no node at position {index}"))
}

/// Refuses a plain delete of a node whose `payload_id` names a row of the
/// same table: that node heads a sublist, and its rows would be orphaned.
fn ensure_no_sublist<S: RecordStore>(list: &PersistentList<S>) -> Result<(), Error> {
    let Some(payload) = list.list().payload_id() else {
        return Ok(());
    };
    let table = list.table();
    if table.store().exists(table.table_name(), payload)? {
        return Err(Error::InvalidInput(format!(
            "node '{}' heads a sublist starting at row {payload}; use --nested to delete both",
            list.list().label()
        )));
    }
    Ok(())
}

fn print_list(list: &LinkedList, indent: &str) {
    for (position, (_, node)) in list.iter().enumerate() {
        let id = node.id().map_or_else(|| "-".to_string(), |id| id.to_string());
        match node.payload_id() {
            Some(payload) => println!("{indent}{position}. {} [id {id}, payload {payload}]", node.label()),
            None => println!("{indent}{position}. {} [id {id}]", node.label()),
        }
    }
}

/// Show command.
pub fn cmd_show(config: &NestlistConfig, nested: bool) -> CmdResult {
    let store = open_store(config)?;
    if nested {
        let grid = PersistentNestedList::open(&store, &config.table)?;
        let outer = grid.grid().outer();
        if outer.is_empty() {
            println!("(empty)");
        }
        for (position, (_, node)) in outer.iter().enumerate() {
            println!("{position}. {}", node.label());
            if let Some(sublist) = node.sublist() {
                print_list(sublist, "   ");
            }
        }
    } else {
        let list = PersistentList::open(&store, &config.table)?;
        if list.list().is_empty() {
            println!("(empty)");
        }
        print_list(list.list(), "");
    }
    Ok(())
}

/// Append command.
pub fn cmd_append(config: &NestlistConfig, label: String, payload: Option<i64>) -> CmdResult {
    let store = open_store(config)?;
    let mut list = PersistentList::open(&store, &config.table)?;
    let mut spec = NodeSpec::labeled(label);
    spec.payload_id = payload;
    list.add_node(Placement::Append, spec)?;
    println!("Appended node {}", list.list().node_id().unwrap_or_default());
    Ok(())
}

/// Insert command.
pub fn cmd_insert(config: &NestlistConfig, label: String, before: usize) -> CmdResult {
    let store = open_store(config)?;
    let mut list = PersistentList::open(&store, &config.table)?;
    if list.navigate().find_at(before).is_none() {
        return Err(no_node_at(before).into());
    }
    list.add_node(Placement::BeforeCursor, NodeSpec::labeled(label))?;
    println!(
        "Inserted node {} at position {before}",
        list.list().node_id().unwrap_or_default()
    );
    Ok(())
}

/// Add-list command.
pub fn cmd_add_list(config: &NestlistConfig, label: String) -> CmdResult {
    let store = open_store(config)?;
    let mut grid = PersistentNestedList::open(&store, &config.table)?;
    grid.add_list(Placement::Append, NodeSpec::labeled(label))?;
    println!(
        "Added list {} at position {}",
        grid.grid().outer().node_id().unwrap_or_default(),
        grid.grid().len() - 1
    );
    Ok(())
}

/// Add-node command.
pub fn cmd_add_node(config: &NestlistConfig, list_index: usize, label: String) -> CmdResult {
    let store = open_store(config)?;
    let mut grid = PersistentNestedList::open(&store, &config.table)?;
    if grid.navigate().find_at(list_index).is_none() {
        return Err(no_node_at(list_index).into());
    }
    grid.add_node(Placement::Append, NodeSpec::labeled(label))?;
    let id = grid.grid().sublist().and_then(LinkedList::node_id);
    println!(
        "Added node {} to list {list_index}",
        id.unwrap_or_default()
    );
    Ok(())
}

/// Delete command.
pub fn cmd_delete(config: &NestlistConfig, index: usize, nested: bool) -> CmdResult {
    let store = open_store(config)?;
    let removed = if nested {
        let mut grid = PersistentNestedList::open(&store, &config.table)?;
        if grid.navigate().find_at(index).is_none() {
            return Err(no_node_at(index).into());
        }
        grid.delete_list(None)?
    } else {
        let mut list = PersistentList::open(&store, &config.table)?;
        if list.navigate().find_at(index).is_none() {
            return Err(no_node_at(index).into());
        }
        ensure_no_sublist(&list)?;
        list.delete(None)?
    };

    if let Some(node) = removed {
        let nodes = node.sublist().map_or(0, LinkedList::len);
        if nested {
            println!("Deleted list '{}' and {nodes} node(s)", node.label());
        } else {
            println!("Deleted node '{}'", node.label());
        }
    }
    Ok(())
}

/// Status command.
pub fn cmd_status(config: &NestlistConfig) -> CmdResult {
    let store = open_store(config)?;
    let list = PersistentList::open(&store, &config.table)?;

    println!("Nestlist Status");
    println!("===============");
    println!();
    println!("Database: {}", config.database_path.display());
    println!("Table: {}", list.table().table_name());
    println!("Rows: {}", list.table().row_count()?);
    println!(
        "Head: {}",
        list.head_id()
            .map_or_else(|| "(empty)".to_string(), |id| id.to_string())
    );
    println!("Reachable nodes: {}", list.list().len());
    Ok(())
}

/// Backup command.
pub fn cmd_backup(config: &NestlistConfig, path: PathBuf) -> CmdResult {
    let store = open_store(config)?;
    store.backup(&path)?;
    println!(
        "Backed up {} to {}",
        config.database_path.display(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nestlist::InMemoryRecordStore;

    #[test]
    fn test_plain_delete_refuses_sublist_owner() {
        let store = InMemoryRecordStore::new();
        {
            let mut grid = PersistentNestedList::open(&store, "grid").unwrap();
            grid.add_list(Placement::Append, NodeSpec::labeled("A")).unwrap();
            grid.add_node(Placement::Append, NodeSpec::labeled("A1")).unwrap();
        }

        let mut list = PersistentList::open(&store, "grid").unwrap();
        list.navigate().first();
        assert!(matches!(ensure_no_sublist(&list), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_plain_delete_allows_foreign_payload() {
        let store = InMemoryRecordStore::new();
        let mut list = PersistentList::open(&store, "nodes").unwrap();
        list.add_node(Placement::Append, NodeSpec::labeled("a").with_payload_id(500))
            .unwrap();
        list.add_node(Placement::Append, NodeSpec::labeled("b")).unwrap();
        list.navigate().first();
        assert!(ensure_no_sublist(&list).is_ok());
        list.navigate().last();
        assert!(ensure_no_sublist(&list).is_ok());
    }
}
