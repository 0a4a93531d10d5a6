//! In-memory snapshot of the permission and role-permission tables.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::access::{AccessError, PermissionLookup, PermissionRecord, RoleMembership};

#[derive(Debug, Clone, Default)]
pub struct PermissionTable {
    permissions: Vec<PermissionRecord>,
    grants: HashSet<(i32, i32)>,
}

impl PermissionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a snapshot from loaded rows and `(role_id, permission_id)` links.
    pub fn from_parts(
        permissions: impl IntoIterator<Item = PermissionRecord>,
        grants: impl IntoIterator<Item = (i32, i32)>,
    ) -> Self {
        let mut table = Self::new();
        for permission in permissions {
            table.insert(permission);
        }
        table.grants.extend(grants);
        table
    }

    pub fn with_permission(mut self, permission: PermissionRecord) -> Self {
        self.insert(permission);
        self
    }

    pub fn grant(mut self, role_id: i32, permission_id: i32) -> Self {
        self.grants.insert((role_id, permission_id));
        self
    }

    /// Inserts or replaces by id, keeping rows ordered by id.
    pub fn insert(&mut self, permission: PermissionRecord) {
        match self.permissions.binary_search_by_key(&permission.id, |p| p.id) {
            Ok(index) => self.permissions[index] = permission,
            Err(index) => self.permissions.insert(index, permission),
        }
    }

    pub fn len(&self) -> usize {
        self.permissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permissions.is_empty()
    }
}

#[async_trait]
impl PermissionLookup for PermissionTable {
    async fn find_by_path(
        &self,
        api_path: &str,
        http_method: &str,
    ) -> Result<Option<PermissionRecord>, AccessError> {
        Ok(self
            .permissions
            .iter()
            .find(|p| p.api_path == api_path && p.http_method.eq_ignore_ascii_case(http_method))
            .cloned())
    }

    async fn list_by_method(&self, http_method: &str) -> Result<Vec<PermissionRecord>, AccessError> {
        Ok(self
            .permissions
            .iter()
            .filter(|p| p.http_method.eq_ignore_ascii_case(http_method))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RoleMembership for PermissionTable {
    async fn role_has_permission(&self, role_id: i32, permission_id: i32) -> Result<bool, AccessError> {
        Ok(self.grants.contains(&(role_id, permission_id)))
    }
}
