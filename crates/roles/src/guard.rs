//! Authorization guards
//!
//! Each guard takes the registry and the caller and returns `Ok(())` when the
//! caller holds the role, `Err(AccessError::Unauthorized)` otherwise.

use crate::error::AccessError;
use crate::registry::{Role, RoleRegistry};
use ctas_core::AccountId;

fn require(registry: &RoleRegistry, caller: &AccountId, role: Role) -> Result<(), AccessError> {
    if registry.has_role(caller, role) {
        Ok(())
    } else {
        Err(AccessError::Unauthorized {
            caller: caller.clone(),
            required: role,
        })
    }
}

pub fn require_owner(registry: &RoleRegistry, caller: &AccountId) -> Result<(), AccessError> {
    require(registry, caller, Role::Owner)
}

pub fn require_fund_manager(
    registry: &RoleRegistry,
    caller: &AccountId,
) -> Result<(), AccessError> {
    require(registry, caller, Role::FundManager)
}

pub fn require_whitelisted_ip(
    registry: &RoleRegistry,
    caller: &AccountId,
) -> Result<(), AccessError> {
    require(registry, caller, Role::WhitelistedIp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    fn registry() -> RoleRegistry {
        let mut registry = RoleRegistry::new(id("owner"));
        registry.add_fund_manager(&id("owner"), id("fm")).unwrap();
        registry.add_ip(&id("owner"), id("ip")).unwrap();
        registry
    }

    #[test]
    fn test_guards_accept_members() {
        let registry = registry();

        assert!(require_owner(&registry, &id("owner")).is_ok());
        assert!(require_fund_manager(&registry, &id("fm")).is_ok());
        assert!(require_whitelisted_ip(&registry, &id("ip")).is_ok());
    }

    #[test]
    fn test_guards_reject_others() {
        let registry = registry();

        // Owner holds neither workflow role
        assert_eq!(
            require_fund_manager(&registry, &id("owner")),
            Err(AccessError::Unauthorized {
                caller: id("owner"),
                required: Role::FundManager,
            })
        );
        assert!(require_whitelisted_ip(&registry, &id("fm")).is_err());
        assert!(require_owner(&registry, &id("ip")).is_err());
    }
}
