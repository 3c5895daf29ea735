//! Menu Item Model
//!
//! Menus ("main", "footer", ...) are flat rows with an optional parent and a
//! position among siblings. The admin panel reorders them by drag-and-drop
//! and sends the resulting `(id, parent_id, position)` list back.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub menu: String,
    pub label: String,
    pub url: String,
    pub parent_id: Option<i64>,
    pub position: i32,
    pub is_visible: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub menu: String,
    pub label: String,
    pub url: String,
    pub parent_id: Option<i64>,
    pub position: Option<i32>,
    pub is_visible: Option<bool>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub label: Option<String>,
    pub url: Option<String>,
    pub is_visible: Option<bool>,
}

/// One entry of a reorder request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuReorderEntry {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub position: i32,
}

/// Menu item with nested children (public rendering)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuNode {
    pub id: i64,
    pub label: String,
    pub url: String,
    pub children: Vec<MenuNode>,
}

/// Problems found in a reorder request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuReorderError {
    #[error("menu item {0} appears more than once")]
    Duplicate(i64),
    #[error("menu item {0} is not part of this menu")]
    UnknownItem(i64),
    #[error("menu item {0} cannot be its own ancestor")]
    Cycle(i64),
}

/// Validate a reorder request against the current items of one menu.
///
/// Every entry must reference an existing item at most once, every parent
/// must be an item of the same menu, and the parent links must form a forest.
pub fn validate_reorder(
    existing: &[MenuItem],
    entries: &[MenuReorderEntry],
) -> Result<(), MenuReorderError> {
    let known: HashSet<i64> = existing.iter().map(|i| i.id).collect();

    // Items left out of the request keep their current parent.
    let mut parents: HashMap<i64, Option<i64>> =
        existing.iter().map(|i| (i.id, i.parent_id)).collect();

    let mut seen = HashSet::new();
    for entry in entries {
        if !known.contains(&entry.id) {
            return Err(MenuReorderError::UnknownItem(entry.id));
        }
        if !seen.insert(entry.id) {
            return Err(MenuReorderError::Duplicate(entry.id));
        }
        if entry.parent_id == Some(entry.id) {
            return Err(MenuReorderError::Cycle(entry.id));
        }
        if let Some(parent) = entry.parent_id
            && !known.contains(&parent)
        {
            return Err(MenuReorderError::UnknownItem(parent));
        }
        parents.insert(entry.id, entry.parent_id);
    }

    for &start in parents.keys() {
        let mut current = parents.get(&start).copied().flatten();
        let mut steps = 0;
        while let Some(id) = current {
            if id == start || steps > parents.len() {
                return Err(MenuReorderError::Cycle(start));
            }
            current = parents.get(&id).copied().flatten();
            steps += 1;
        }
    }

    Ok(())
}

/// Build the visible menu tree, siblings sorted by position.
///
/// Hidden items hide their whole subtree.
pub fn build_menu_tree(items: &[MenuItem]) -> Vec<MenuNode> {
    let mut by_parent: HashMap<Option<i64>, Vec<&MenuItem>> = HashMap::new();
    for item in items.iter().filter(|i| i.is_visible) {
        by_parent.entry(item.parent_id).or_default().push(item);
    }
    for siblings in by_parent.values_mut() {
        siblings.sort_by_key(|i| (i.position, i.id));
    }

    fn collect(
        parent: Option<i64>,
        by_parent: &HashMap<Option<i64>, Vec<&MenuItem>>,
        depth: usize,
    ) -> Vec<MenuNode> {
        if depth > 16 {
            return Vec::new();
        }
        by_parent
            .get(&parent)
            .map(|siblings| {
                siblings
                    .iter()
                    .map(|item| MenuNode {
                        id: item.id,
                        label: item.label.clone(),
                        url: item.url.clone(),
                        children: collect(Some(item.id), by_parent, depth + 1),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    collect(None, &by_parent, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, parent_id: Option<i64>, position: i32, is_visible: bool) -> MenuItem {
        MenuItem {
            id,
            menu: "main".to_string(),
            label: format!("item-{id}"),
            url: format!("/{id}"),
            parent_id,
            position,
            is_visible,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn tree_orders_siblings_and_nests_children() {
        let items = vec![
            item(1, None, 2, true),
            item(2, None, 1, true),
            item(3, Some(1), 0, true),
            item(4, Some(1), -1, true),
        ];

        let tree = build_menu_tree(&items);
        assert_eq!(tree.iter().map(|n| n.id).collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(
            tree[1].children.iter().map(|n| n.id).collect::<Vec<_>>(),
            vec![4, 3]
        );
    }

    #[test]
    fn hidden_item_hides_subtree() {
        let items = vec![item(1, None, 0, false), item(2, Some(1), 0, true)];
        assert!(build_menu_tree(&items).is_empty());
    }

    #[test]
    fn reorder_accepts_valid_moves() {
        let items = vec![item(1, None, 0, true), item(2, None, 1, true)];
        let entries = [
            MenuReorderEntry { id: 2, parent_id: None, position: 0 },
            MenuReorderEntry { id: 1, parent_id: Some(2), position: 0 },
        ];
        assert_eq!(validate_reorder(&items, &entries), Ok(()));
    }

    #[test]
    fn reorder_rejects_cycles() {
        let items = vec![item(1, None, 0, true), item(2, Some(1), 0, true)];
        let entries = [MenuReorderEntry { id: 1, parent_id: Some(2), position: 0 }];
        assert!(matches!(
            validate_reorder(&items, &entries),
            Err(MenuReorderError::Cycle(_))
        ));

        let self_parent = [MenuReorderEntry { id: 1, parent_id: Some(1), position: 0 }];
        assert!(matches!(
            validate_reorder(&items, &self_parent),
            Err(MenuReorderError::Cycle(1))
        ));
    }

    #[test]
    fn reorder_rejects_unknown_and_duplicate_items() {
        let items = vec![item(1, None, 0, true)];
        assert_eq!(
            validate_reorder(&items, &[MenuReorderEntry { id: 9, parent_id: None, position: 0 }]),
            Err(MenuReorderError::UnknownItem(9))
        );
        assert_eq!(
            validate_reorder(
                &items,
                &[
                    MenuReorderEntry { id: 1, parent_id: None, position: 0 },
                    MenuReorderEntry { id: 1, parent_id: None, position: 1 },
                ]
            ),
            Err(MenuReorderError::Duplicate(1))
        );
    }
}
