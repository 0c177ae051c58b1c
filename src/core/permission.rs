//! Per role permission matrix of the menus.

use std::collections::{HashMap, HashSet};

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    model::{menu::Menu, role_menu::RoleMenu},
    repository::{
        menu::{get_all_menu, get_menu_by_id, get_menu_children, get_menus_by_ids},
        role::get_role_by_id,
        role_menu::{get_role_menu, get_role_menu_by_role, upsert_role_menu},
    },
};

use super::{
    error::{ServiceError, ServiceResult},
    menu_tree::{build_tree, TreeItem, TreeNode},
};

pub const ROLE_OR_MENU_NOT_FOUND: &str = "Role or Menu not found!";

/// The seven flags of a (role, menu) grant. All false when nothing was granted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionMatrix {
    pub access: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
    pub approval: bool,
    pub approval_2: bool,
    pub approval_3: bool,
}

impl From<Option<&RoleMenu>> for PermissionMatrix {
    fn from(value: Option<&RoleMenu>) -> Self {
        match value {
            Some(x) => PermissionMatrix {
                access: x.access,
                create: x.create,
                update: x.update,
                delete: x.delete,
                approval: x.approval,
                approval_2: x.approval_2,
                approval_3: x.approval_3,
            },
            None => PermissionMatrix::default(),
        }
    }
}

impl PermissionMatrix {
    pub fn to_role_menu(&self, role_id: Uuid, menu_id: Uuid) -> RoleMenu {
        RoleMenu {
            role_id,
            menu_id,
            access: self.access,
            create: self.create,
            update: self.update,
            delete: self.delete,
            approval: self.approval,
            approval_2: self.approval_2,
            approval_3: self.approval_3,
        }
    }
}

/// A menu together with what the role may do on it.
#[derive(Debug, Clone)]
pub struct MenuPermission {
    pub menu: Menu,
    pub permissions: PermissionMatrix,
}

impl TreeItem for MenuPermission {
    fn item_id(&self) -> Uuid {
        self.menu.id
    }

    fn parent_id(&self) -> Option<Uuid> {
        self.menu.menu_id
    }
}

/// One submitted grant of a bulk store.
#[derive(Debug, Clone)]
pub struct Grant {
    pub menu_id: Uuid,
    pub permissions: PermissionMatrix,
}

/// Pair every menu with its grant, keeping the menu order.
pub fn attach_permissions(menus: Vec<Menu>, grants: &[RoleMenu]) -> Vec<MenuPermission> {
    let by_menu: HashMap<Uuid, &RoleMenu> = grants.iter().map(|x| (x.menu_id, x)).collect();
    menus
        .into_iter()
        .map(|menu| {
            let permissions = PermissionMatrix::from(by_menu.get(&menu.id).copied());
            MenuPermission { menu, permissions }
        })
        .collect()
}

async fn ensure_role(tx: &mut Transaction<'_, Postgres>, role_id: &Uuid) -> ServiceResult<()> {
    if get_role_by_id(tx, role_id).await?.is_none() {
        return Err(ServiceError::not_found(ROLE_OR_MENU_NOT_FOUND));
    }
    Ok(())
}

/// Matrix of a single (role, menu) pair.
pub async fn resolve_permission(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
    menu_id: &Uuid,
) -> ServiceResult<PermissionMatrix> {
    ensure_role(tx, role_id).await?;
    if get_menu_by_id(tx, menu_id).await?.is_none() {
        return Err(ServiceError::not_found(ROLE_OR_MENU_NOT_FOUND));
    }
    let grant = get_role_menu(tx, role_id, menu_id).await?;
    Ok(PermissionMatrix::from(grant.as_ref()))
}

/// Active children of `parent_id` (root group when `None`) with their matrix.
pub async fn resolve_children(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
    parent_id: Option<Uuid>,
) -> ServiceResult<Vec<MenuPermission>> {
    ensure_role(tx, role_id).await?;
    if let Some(id) = parent_id {
        if get_menu_by_id(tx, &id).await?.is_none() {
            return Err(ServiceError::not_found(ROLE_OR_MENU_NOT_FOUND));
        }
    }
    let menus = get_menu_children(tx, parent_id, true).await?;
    let grants = get_role_menu_by_role(tx, role_id).await?;
    Ok(attach_permissions(menus, &grants))
}

/// Upsert a batch of grants. Each grant overwrites all seven flags.
///
/// The role and every menu are checked before the first write.
pub async fn store_grants(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
    grants: &[Grant],
) -> ServiceResult<()> {
    ensure_role(tx, role_id).await?;
    let ids: Vec<Uuid> = grants.iter().map(|x| x.menu_id).collect();
    let found: HashSet<Uuid> = get_menus_by_ids(tx, &ids)
        .await?
        .into_iter()
        .map(|x| x.id)
        .collect();
    if ids.iter().any(|id| !found.contains(id)) {
        return Err(ServiceError::not_found(ROLE_OR_MENU_NOT_FOUND));
    }
    for grant in grants {
        let row = grant.permissions.to_role_menu(*role_id, grant.menu_id);
        upsert_role_menu(tx, &row).await?;
    }
    tracing::debug!("stored {} grants for role {}", grants.len(), role_id);
    Ok(())
}

/// Menu tree the role may open: active menus with `access` granted.
pub async fn profile_menu(
    tx: &mut Transaction<'_, Postgres>,
    role_id: &Uuid,
) -> ServiceResult<Vec<TreeNode<MenuPermission>>> {
    let menus = get_all_menu(tx, true).await?;
    let grants = get_role_menu_by_role(tx, role_id).await?;
    let allowed: Vec<MenuPermission> = attach_permissions(menus, &grants)
        .into_iter()
        .filter(|x| x.permissions.access)
        .collect();
    Ok(build_tree(&allowed, None))
}
