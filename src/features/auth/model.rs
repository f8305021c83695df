use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Capability-set test scoped to a shop.
///
/// The category service takes this as an injected collaborator so callers
/// other than the HTTP layer (tests, background jobs) can supply their own
/// implementation.
pub trait ShopAuthorization: Send + Sync {
    /// Returns true when the caller holds at least one of `permissions`
    /// within the given shop.
    fn has_any_permission(&self, permissions: &[&str], shop_id: &str) -> bool;
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub account_id: String,
    pub sub: String,
    /// Shop id -> permission names granted in that shop
    pub shop_permissions: HashMap<String, Vec<String>>,
}

impl AuthenticatedUser {
    /// Permission names granted to this user in a shop
    pub fn permissions_for(&self, shop_id: &str) -> &[String] {
        self.shop_permissions
            .get(shop_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl ShopAuthorization for AuthenticatedUser {
    fn has_any_permission(&self, permissions: &[&str], shop_id: &str) -> bool {
        let granted = self.permissions_for(shop_id);
        permissions.iter().any(|p| granted.iter().any(|g| g == p))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomClaims {
    #[serde(rename = "type")]
    pub token_type: String,
    /// Shop id -> permission names
    #[serde(default)]
    pub shops: HashMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(shop_id: &str, permissions: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            account_id: "acct-1".to_string(),
            sub: "sub-1".to_string(),
            shop_permissions: HashMap::from([(
                shop_id.to_string(),
                permissions.iter().map(|p| p.to_string()).collect(),
            )]),
        }
    }

    #[test]
    fn test_has_any_permission_matches_one_of_set() {
        let user = user_with("shop-1", &["category/edit"]);

        assert!(user.has_any_permission(&["owner", "category/edit"], "shop-1"));
        assert!(!user.has_any_permission(&["owner", "admin"], "shop-1"));
    }

    #[test]
    fn test_permissions_are_shop_scoped() {
        let user = user_with("shop-1", &["owner"]);

        assert!(user.has_any_permission(&["owner"], "shop-1"));
        // Owning shop-1 grants nothing in shop-2
        assert!(!user.has_any_permission(&["owner"], "shop-2"));
    }

    #[test]
    fn test_no_permissions_for_unknown_shop() {
        let user = user_with("shop-1", &["admin"]);

        assert!(user.permissions_for("shop-2").is_empty());
    }
}
