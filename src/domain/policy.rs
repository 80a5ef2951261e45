use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::user::Identity;

/// Process-wide, fixed set of roles. Roles are defined purely as sets of
/// permissions; call sites never compare role names directly.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    Manager,
    Customer,
}

impl Role {
    /// All roles in display order.
    pub const ALL: [Role; 4] = [Role::Superadmin, Role::Admin, Role::Manager, Role::Customer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Customer => "customer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Role::Superadmin => "Full access to all features including user role management",
            Role::Admin => "Manage users, meters, transactions, and settings",
            Role::Manager => "View-only access to users, meters, and transactions",
            Role::Customer => "Manage own meters and purchase credits",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "superadmin" => Ok(Role::Superadmin),
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "customer" => Ok(Role::Customer),
            other => Err(CoreError::Validation(format!("unknown role: {other}"))),
        }
    }
}

/// Atomic capability tag. The set a role holds is static configuration, not
/// computed at runtime.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // User management
    CreateUser,
    EditUser,
    DeleteUser,
    ViewUsers,
    ManageRoles,
    // Meter management
    CreateMeter,
    EditMeter,
    DeleteMeter,
    ViewAllMeters,
    // Property management
    CreateProperty,
    EditProperty,
    DeleteProperty,
    ViewAllProperties,
    VerifyProperty,
    // Transaction management
    ViewAllTransactions,
    RefundTransaction,
    // Settings
    ManageSettings,
    ManageRates,
    // Reports
    ViewReports,
    ExportData,
}

impl Permission {
    pub const ALL: [Permission; 20] = [
        Permission::CreateUser,
        Permission::EditUser,
        Permission::DeleteUser,
        Permission::ViewUsers,
        Permission::ManageRoles,
        Permission::CreateMeter,
        Permission::EditMeter,
        Permission::DeleteMeter,
        Permission::ViewAllMeters,
        Permission::CreateProperty,
        Permission::EditProperty,
        Permission::DeleteProperty,
        Permission::ViewAllProperties,
        Permission::VerifyProperty,
        Permission::ViewAllTransactions,
        Permission::RefundTransaction,
        Permission::ManageSettings,
        Permission::ManageRates,
        Permission::ViewReports,
        Permission::ExportData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CreateUser => "create_user",
            Permission::EditUser => "edit_user",
            Permission::DeleteUser => "delete_user",
            Permission::ViewUsers => "view_users",
            Permission::ManageRoles => "manage_roles",
            Permission::CreateMeter => "create_meter",
            Permission::EditMeter => "edit_meter",
            Permission::DeleteMeter => "delete_meter",
            Permission::ViewAllMeters => "view_all_meters",
            Permission::CreateProperty => "create_property",
            Permission::EditProperty => "edit_property",
            Permission::DeleteProperty => "delete_property",
            Permission::ViewAllProperties => "view_all_properties",
            Permission::VerifyProperty => "verify_property",
            Permission::ViewAllTransactions => "view_all_transactions",
            Permission::RefundTransaction => "refund_transaction",
            Permission::ManageSettings => "manage_settings",
            Permission::ManageRates => "manage_rates",
            Permission::ViewReports => "view_reports",
            Permission::ExportData => "export_data",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SUPERADMIN_PERMISSIONS: &[Permission] = &Permission::ALL;

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::ViewUsers,
    Permission::EditUser,
    Permission::ViewAllMeters,
    Permission::EditMeter,
    Permission::ViewAllProperties,
    Permission::VerifyProperty,
    Permission::ViewAllTransactions,
    Permission::ManageRates,
    Permission::ViewReports,
];

const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::ViewUsers,
    Permission::ViewAllMeters,
    Permission::ViewAllProperties,
    Permission::ViewAllTransactions,
    Permission::ViewReports,
];

const CUSTOMER_PERMISSIONS: &[Permission] = &[
    Permission::CreateMeter,
    Permission::EditMeter,
    Permission::CreateProperty,
    Permission::EditProperty,
];

/// A role together with its description and granted permissions, for the
/// role-introspection surfaces.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RoleInfo {
    pub role: Role,
    pub description: &'static str,
    pub permissions: &'static [Permission],
}

/// Pure lookup over the static role→permission table.
///
/// Checks are side-effect free, so read endpoints may call them
/// speculatively. This is the single source of truth every mutating
/// operation consults before touching state.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyEngine;

impl PolicyEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.permissions_of(role).contains(&permission)
    }

    pub fn permissions_of(&self, role: Role) -> &'static [Permission] {
        match role {
            Role::Superadmin => SUPERADMIN_PERMISSIONS,
            Role::Admin => ADMIN_PERMISSIONS,
            Role::Manager => MANAGER_PERMISSIONS,
            Role::Customer => CUSTOMER_PERMISSIONS,
        }
    }

    /// Ordered listing of all roles with their descriptions and grants.
    pub fn list_roles(&self) -> Vec<RoleInfo> {
        Role::ALL
            .iter()
            .map(|&role| RoleInfo {
                role,
                description: role.description(),
                permissions: self.permissions_of(role),
            })
            .collect()
    }

    /// Roles the given actor may grant to other users. Superadmins may grant
    /// any role, admins only manager and customer, everyone else nothing.
    pub fn assignable_roles(&self, actor_role: Role) -> &'static [Role] {
        match actor_role {
            Role::Superadmin => &Role::ALL,
            Role::Admin => &[Role::Manager, Role::Customer],
            Role::Manager | Role::Customer => &[],
        }
    }

    /// Checks a caller's permission, failing with an Authorization error
    /// rather than a silent no-op.
    pub fn require(&self, identity: &Identity, permission: Permission) -> Result<()> {
        if self.has_permission(identity.role, permission) {
            Ok(())
        } else {
            Err(CoreError::Authorization(format!(
                "role {} lacks permission {permission}",
                identity.role
            )))
        }
    }
}
