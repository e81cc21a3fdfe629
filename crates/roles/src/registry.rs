//! Role membership registry

use crate::error::AccessError;
use crate::guard::require_owner;
use ctas_core::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use strum_macros::{Display, EnumString};

/// A role a caller may be required to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    FundManager,
    WhitelistedIp,
}

/// Owner plus the two membership sets.
///
/// Public mutators take the caller and run the owner guard first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRegistry {
    owner: AccountId,
    fund_managers: BTreeSet<AccountId>,
    whitelisted_ips: BTreeSet<AccountId>,
}

impl RoleRegistry {
    /// Create a registry administered by `owner`, with both sets empty
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            fund_managers: BTreeSet::new(),
            whitelisted_ips: BTreeSet::new(),
        }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn is_owner(&self, account: &AccountId) -> bool {
        &self.owner == account
    }

    pub fn is_fund_manager(&self, account: &AccountId) -> bool {
        self.fund_managers.contains(account)
    }

    pub fn is_whitelisted_ip(&self, account: &AccountId) -> bool {
        self.whitelisted_ips.contains(account)
    }

    /// Whether `account` holds `role`
    pub fn has_role(&self, account: &AccountId, role: Role) -> bool {
        match role {
            Role::Owner => self.is_owner(account),
            Role::FundManager => self.is_fund_manager(account),
            Role::WhitelistedIp => self.is_whitelisted_ip(account),
        }
    }

    /// Add a fund manager. Returns `false` if already a member.
    pub fn add_fund_manager(
        &mut self,
        caller: &AccountId,
        account: AccountId,
    ) -> Result<bool, AccessError> {
        require_owner(self, caller)?;
        Ok(self.fund_managers.insert(account))
    }

    /// Whitelist an IP. Returns `false` if already a member.
    pub fn add_ip(&mut self, caller: &AccountId, account: AccountId) -> Result<bool, AccessError> {
        require_owner(self, caller)?;
        Ok(self.whitelisted_ips.insert(account))
    }

    /// Remove a fund manager. Returns `false` if not a member.
    pub fn remove_fund_manager(
        &mut self,
        caller: &AccountId,
        account: &AccountId,
    ) -> Result<bool, AccessError> {
        require_owner(self, caller)?;
        Ok(self.fund_managers.remove(account))
    }

    /// Remove an IP from the whitelist. Returns `false` if not a member.
    pub fn remove_ip(&mut self, caller: &AccountId, account: &AccountId) -> Result<bool, AccessError> {
        require_owner(self, caller)?;
        Ok(self.whitelisted_ips.remove(account))
    }

    pub fn fund_managers(&self) -> impl Iterator<Item = &AccountId> {
        self.fund_managers.iter()
    }

    pub fn whitelisted_ips(&self) -> impl Iterator<Item = &AccountId> {
        self.whitelisted_ips.iter()
    }

    /// Unchecked insert/remove, used when rebuilding from a journal whose
    /// entries were authorized at commit time. Owner is fixed at construction.
    pub fn restore_membership(&mut self, role: Role, account: AccountId, member: bool) {
        let set = match role {
            Role::FundManager => &mut self.fund_managers,
            Role::WhitelistedIp => &mut self.whitelisted_ips,
            Role::Owner => return,
        };
        if member {
            set.insert(account);
        } else {
            set.remove(&account);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AccountId {
        AccountId::new(s).unwrap()
    }

    #[test]
    fn test_owner_is_not_member() {
        let registry = RoleRegistry::new(id("owner"));

        assert!(registry.is_owner(&id("owner")));
        assert!(!registry.is_fund_manager(&id("owner")));
        assert!(!registry.is_whitelisted_ip(&id("owner")));
    }

    #[test]
    fn test_owner_adds_members() {
        let mut registry = RoleRegistry::new(id("owner"));

        assert!(registry.add_fund_manager(&id("owner"), id("fm")).unwrap());
        assert!(registry.add_ip(&id("owner"), id("ip")).unwrap());

        assert!(registry.is_fund_manager(&id("fm")));
        assert!(registry.is_whitelisted_ip(&id("ip")));
        assert!(!registry.is_fund_manager(&id("ip")));
        assert!(!registry.is_whitelisted_ip(&id("fm")));
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut registry = RoleRegistry::new(id("owner"));

        assert!(registry.add_ip(&id("owner"), id("ip")).unwrap());
        assert!(!registry.add_ip(&id("owner"), id("ip")).unwrap());
        assert_eq!(registry.whitelisted_ips().count(), 1);
    }

    #[test]
    fn test_non_owner_cannot_add() {
        let mut registry = RoleRegistry::new(id("owner"));
        registry.add_fund_manager(&id("owner"), id("fm")).unwrap();

        let result = registry.add_ip(&id("fm"), id("ip"));
        assert_eq!(
            result,
            Err(AccessError::Unauthorized {
                caller: id("fm"),
                required: Role::Owner,
            })
        );
        assert!(!registry.is_whitelisted_ip(&id("ip")));
    }

    #[test]
    fn test_remove_members() {
        let mut registry = RoleRegistry::new(id("owner"));
        registry.add_fund_manager(&id("owner"), id("fm")).unwrap();

        assert!(registry.remove_fund_manager(&id("owner"), &id("fm")).unwrap());
        assert!(!registry.remove_fund_manager(&id("owner"), &id("fm")).unwrap());
        assert!(!registry.is_fund_manager(&id("fm")));

        assert!(registry.remove_ip(&id("intruder"), &id("ip")).is_err());
    }

    #[test]
    fn test_restore_membership() {
        let mut registry = RoleRegistry::new(id("owner"));

        registry.restore_membership(Role::WhitelistedIp, id("ip"), true);
        assert!(registry.has_role(&id("ip"), Role::WhitelistedIp));

        registry.restore_membership(Role::WhitelistedIp, id("ip"), false);
        assert!(!registry.has_role(&id("ip"), Role::WhitelistedIp));
    }

    #[test]
    fn test_role_names() {
        assert_eq!(Role::FundManager.to_string(), "fund_manager");
        assert_eq!("whitelisted_ip".parse::<Role>().unwrap(), Role::WhitelistedIp);
    }
}
