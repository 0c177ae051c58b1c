//! Dense `order_number` inside a sibling group (menus sharing `menu_id`).

use std::collections::{HashMap, HashSet};

use chrono::Local;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    model::menu::Menu,
    repository::menu::{
        get_all_menu, get_last_order_number, get_menu_by_id, get_menus_by_ids,
        update_menu_order_number, update_menu_parent,
    },
};

use super::error::{ServiceError, ServiceResult};

pub const MENU_NOT_FOUND: &str = "The menu does not exist!";
pub const PARENT_MENU_NOT_FOUND: &str = "The parent menu does not exist!";
pub const LIST_MENU_EMPTY: &str = "The list menu must contain at least 1 item!";
pub const MENU_CYCLE: &str = "The menu cannot be moved under itself or its descendant!";

/// Position of a menu appended to a group whose last position is `last`.
pub fn next_order_number(last: Option<i32>) -> i32 {
    last.unwrap_or(0) + 1
}

/// New positions for an explicit sort: list position + 1.
pub fn sort_positions(ids: &[Uuid]) -> Vec<(Uuid, i32)> {
    ids.iter()
        .enumerate()
        .map(|(idx, id)| (*id, idx as i32 + 1))
        .collect()
}

/// Whether hanging `menu_id` below `new_parent` would close a loop, i.e.
/// `new_parent` is the menu itself or one of its descendants.
pub fn creates_cycle(parents: &HashMap<Uuid, Option<Uuid>>, menu_id: Uuid, new_parent: Uuid) -> bool {
    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut current = Some(new_parent);
    while let Some(id) = current {
        if id == menu_id {
            return true;
        }
        if !seen.insert(id) {
            return false;
        }
        current = parents.get(&id).copied().flatten();
    }
    false
}

/// Position for a new member of the group under `parent_id`.
pub async fn insert_position(
    tx: &mut Transaction<'_, Postgres>,
    parent_id: Option<Uuid>,
) -> ServiceResult<i32> {
    let last = get_last_order_number(tx, parent_id).await?;
    Ok(next_order_number(last))
}

/// Renumber the listed menus 1..=n in the given order.
///
/// Menus left out of the list keep their number. Every id has to exist,
/// otherwise nothing is written.
pub async fn sort_menus(
    tx: &mut Transaction<'_, Postgres>,
    ids: &[Uuid],
    request_user: &Uuid,
) -> ServiceResult<()> {
    if ids.is_empty() {
        return Err(ServiceError::validation(LIST_MENU_EMPTY));
    }
    let found: HashSet<Uuid> = get_menus_by_ids(tx, ids)
        .await?
        .into_iter()
        .map(|x| x.id)
        .collect();
    if ids.iter().any(|id| !found.contains(id)) {
        return Err(ServiceError::not_found(MENU_NOT_FOUND));
    }
    let now = Local::now().fixed_offset();
    for (id, order_number) in sort_positions(ids) {
        update_menu_order_number(tx, &id, order_number, request_user, &now).await?;
    }
    Ok(())
}

/// Move `menu` below `new_parent` (`None` = root) at the end of that group.
/// The group it leaves is not renumbered.
pub async fn reparent_menu(
    tx: &mut Transaction<'_, Postgres>,
    menu: &mut Menu,
    new_parent: Option<Uuid>,
    request_user: &Uuid,
) -> ServiceResult<()> {
    if let Some(parent_id) = new_parent {
        if get_menu_by_id(tx, &parent_id).await?.is_none() {
            return Err(ServiceError::not_found(PARENT_MENU_NOT_FOUND));
        }
        let parents: HashMap<Uuid, Option<Uuid>> = get_all_menu(tx, false)
            .await?
            .into_iter()
            .map(|x| (x.id, x.menu_id))
            .collect();
        if creates_cycle(&parents, menu.id, parent_id) {
            return Err(ServiceError::validation(MENU_CYCLE));
        }
    }
    let order_number = insert_position(tx, new_parent).await?;
    let now = Local::now().fixed_offset();
    update_menu_parent(tx, menu, new_parent, order_number, request_user, &now).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_order_number() {
        assert_eq!(next_order_number(None), 1);
        assert_eq!(next_order_number(Some(1)), 2);
        assert_eq!(next_order_number(Some(7)), 8);
    }

    #[test]
    fn test_sort_positions_are_dense_from_one() {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::now_v7()).collect();
        let positions = sort_positions(&ids);
        assert_eq!(
            positions.iter().map(|x| x.1).collect::<Vec<i32>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(positions[0].0, ids[0]);
        assert_eq!(positions[3].0, ids[3]);
    }

    #[test]
    fn test_creates_cycle() {
        let root = Uuid::now_v7();
        let child = Uuid::now_v7();
        let grand_child = Uuid::now_v7();
        let other = Uuid::now_v7();
        let parents = HashMap::from([
            (root, None),
            (child, Some(root)),
            (grand_child, Some(child)),
            (other, None),
        ]);
        assert!(creates_cycle(&parents, root, root));
        assert!(creates_cycle(&parents, root, grand_child));
        assert!(creates_cycle(&parents, child, grand_child));
        assert!(!creates_cycle(&parents, grand_child, root));
        assert!(!creates_cycle(&parents, child, other));
    }
}
