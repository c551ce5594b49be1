//! # Permissions
//!
//! Closed set of roles and capabilities, checked once at each workflow
//! operation boundary.
//!
//! ## Capability Matrix
//! ```text
//! ┌──────────────────┬───────┬────┬────────┬───────┬──────────┐
//! │ Capability       │ ADMIN │ HO │ BRANCH │ SALES │ CUSTOMER │
//! ├──────────────────┼───────┼────┼────────┼───────┼──────────┤
//! │ CreateOrder      │   ✓   │ ✓  │   ✓    │   ✓   │ ✓ (own)  │
//! │ ApproveOrder     │   ✓   │ ✓  │   ✓    │       │          │
//! │ ConfirmOrder     │   ✓   │ ✓  │   ✓    │   ✓   │          │
//! │ GenerateInvoice  │   ✓   │ ✓  │   ✓    │       │          │
//! │ AdjustStock      │   ✓   │ ✓  │   ✓    │       │          │
//! │ TransferStock    │   ✓   │ ✓  │   ✓    │       │          │
//! │ ManageCatalog    │   ✓   │ ✓  │        │       │          │
//! │ ViewReports      │   ✓   │ ✓  │   ✓    │   ✓   │          │
//! └──────────────────┴───────┴────┴────────┴───────┴──────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::User;

// =============================================================================
// Role
// =============================================================================

/// Role of a user, as issued by the identity service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    /// Head office staff.
    Ho,
    /// Branch manager.
    Branch,
    Sales,
    /// Customer portal user, bound to one customer account.
    Customer,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Ho,
        Role::Branch,
        Role::Sales,
        Role::Customer,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Ho => "HO",
            Role::Branch => "BRANCH",
            Role::Sales => "SALES",
            Role::Customer => "CUSTOMER",
        }
    }

    /// Whether this role holds the capability.
    pub fn allows(&self, capability: Capability) -> bool {
        use Capability::*;

        match self {
            Role::Admin | Role::Ho => true,
            Role::Branch => !matches!(capability, ManageCatalog),
            Role::Sales => matches!(capability, CreateOrder | ConfirmOrder | ViewReports),
            Role::Customer => matches!(capability, CreateOrder),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Capability
// =============================================================================

/// Something a workflow operation needs the actor to be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Capability {
    CreateOrder,
    ApproveOrder,
    ConfirmOrder,
    GenerateInvoice,
    AdjustStock,
    TransferStock,
    ManageCatalog,
    ViewReports,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            Capability::CreateOrder => "create orders",
            Capability::ApproveOrder => "approve orders",
            Capability::ConfirmOrder => "confirm orders",
            Capability::GenerateInvoice => "generate invoices",
            Capability::AdjustStock => "adjust stock",
            Capability::TransferStock => "transfer stock",
            Capability::ManageCatalog => "manage the catalog",
            Capability::ViewReports => "view reports",
        };
        f.write_str(verb)
    }
}

// =============================================================================
// Actor
// =============================================================================

/// The authenticated user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Actor {
    pub user_id: i64,
    pub role: Role,
    pub branch_id: Option<i64>,
    pub customer_id: Option<i64>,
}

impl Actor {
    pub fn new(user_id: i64, role: Role) -> Self {
        Actor {
            user_id,
            role,
            branch_id: None,
            customer_id: None,
        }
    }

    pub fn with_branch(mut self, branch_id: i64) -> Self {
        self.branch_id = Some(branch_id);
        self
    }

    pub fn with_customer(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    /// Fails with `PermissionDenied` unless the role holds the capability.
    pub fn require(&self, capability: Capability) -> CoreResult<()> {
        if self.role.allows(capability) {
            Ok(())
        } else {
            Err(CoreError::PermissionDenied {
                role: self.role,
                capability,
            })
        }
    }

    /// Customer portal users may only act on their own account.
    pub fn require_customer_scope(&self, customer_id: i64, capability: Capability) -> CoreResult<()> {
        if self.role == Role::Customer && self.customer_id != Some(customer_id) {
            return Err(CoreError::PermissionDenied {
                role: self.role,
                capability,
            });
        }
        Ok(())
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Actor {
            user_id: user.id,
            role: user.role,
            branch_id: user.branch_id,
            customer_id: user.customer_id,
        }
    }
}
