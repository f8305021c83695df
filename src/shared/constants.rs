// =============================================================================
// SHOP PERMISSION CONSTANTS
// =============================================================================

/// Shop owner - full access to everything in the shop
pub const PERM_OWNER: &str = "owner";

/// Shop admin - full administrative access
pub const PERM_ADMIN: &str = "admin";

/// Category admin - can manage all category settings
pub const PERM_CATEGORY_ADMIN: &str = "category/admin";

/// Category editor - can edit existing categories
pub const PERM_CATEGORY_EDIT: &str = "category/edit";

/// Capability set required to update a category. The caller needs at least
/// one of these, scoped to the target shop.
pub const CATEGORY_MANAGE_PERMISSIONS: &[&str] = &[
    PERM_OWNER,
    PERM_ADMIN,
    PERM_CATEGORY_ADMIN,
    PERM_CATEGORY_EDIT,
];
