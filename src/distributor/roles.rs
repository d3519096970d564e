//! Administrator Roles
//!
//! Two fixed identities govern a distribution:
//! - `owner` - governance / emergency role (pause authority, reassignable)
//! - `dao` - operating role, sole authority to open and sweep (immutable)
//!
//! Ownership moves via the standard two-step handshake: the current owner
//! proposes a successor, the successor accepts.

use std::sync::RwLock;

use crate::types::Identity;

use super::error::DistributorError;

/// Fixed role pair with two-step ownership transfer
pub struct RoleSet {
    owner: RwLock<Identity>,
    pending_owner: RwLock<Option<Identity>>,
    dao: Identity,
}

impl RoleSet {
    pub fn new(owner: Identity, dao: Identity) -> Self {
        Self {
            owner: RwLock::new(owner),
            pending_owner: RwLock::new(None),
            dao,
        }
    }

    pub fn owner(&self) -> Identity {
        match self.owner.read() {
            Ok(owner) => *owner,
            Err(poisoned) => **poisoned.get_ref(),
        }
    }

    pub fn dao(&self) -> Identity {
        self.dao
    }

    pub fn pending_owner(&self) -> Option<Identity> {
        match self.pending_owner.read() {
            Ok(pending) => *pending,
            Err(poisoned) => **poisoned.get_ref(),
        }
    }

    /// Owner or dao
    pub fn is_admin(&self, caller: &Identity) -> bool {
        *caller == self.owner() || *caller == self.dao
    }

    pub fn is_dao(&self, caller: &Identity) -> bool {
        *caller == self.dao
    }

    /// Propose a new owner. Current owner only.
    pub fn transfer_ownership(
        &self,
        caller: Identity,
        proposed: Identity,
    ) -> Result<(), DistributorError> {
        if caller != self.owner() {
            return Err(DistributorError::NotAuthorized);
        }
        let mut pending = match self.pending_owner.write() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        *pending = Some(proposed);
        Ok(())
    }

    /// Accept a proposed ownership transfer. Proposed owner only.
    pub fn accept_ownership(&self, caller: Identity) -> Result<(), DistributorError> {
        let pending = self.pending_owner();
        if pending != Some(caller) {
            return Err(DistributorError::NotAuthorized);
        }
        {
            let mut owner = match self.owner.write() {
                Ok(owner) => owner,
                Err(poisoned) => poisoned.into_inner(),
            };
            *owner = caller;
        }
        let mut pending = match self.pending_owner.write() {
            Ok(pending) => pending,
            Err(poisoned) => poisoned.into_inner(),
        };
        *pending = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(byte: u8) -> Identity {
        Identity::new([byte; 32])
    }

    #[test]
    fn test_role_checks() {
        let owner = identity(1);
        let dao = identity(2);
        let roles = RoleSet::new(owner, dao);

        assert!(roles.is_admin(&owner));
        assert!(roles.is_admin(&dao));
        assert!(!roles.is_admin(&identity(3)));
        assert!(roles.is_dao(&dao));
        assert!(!roles.is_dao(&owner));
    }

    #[test]
    fn test_two_step_ownership_transfer() {
        let owner = identity(1);
        let dao = identity(2);
        let successor = identity(3);
        let roles = RoleSet::new(owner, dao);

        // only the owner may propose
        assert!(matches!(
            roles.transfer_ownership(dao, successor),
            Err(DistributorError::NotAuthorized)
        ));

        roles.transfer_ownership(owner, successor).unwrap();
        assert_eq!(roles.pending_owner(), Some(successor));

        // only the proposed successor may accept
        assert!(matches!(
            roles.accept_ownership(identity(9)),
            Err(DistributorError::NotAuthorized)
        ));
        // owner is still the old one until acceptance
        assert_eq!(roles.owner(), owner);

        roles.accept_ownership(successor).unwrap();
        assert_eq!(roles.owner(), successor);
        assert_eq!(roles.pending_owner(), None);

        // old owner lost its authority
        assert!(!roles.is_admin(&owner));
        assert!(roles.is_admin(&successor));
    }

    #[test]
    fn test_ownership_writes_survive_poisoned_locks() {
        use std::sync::Arc;

        let roles = Arc::new(RoleSet::new(identity(1), identity(2)));

        // poison both locks by panicking while holding the write guards
        for poisoner in [
            {
                let roles = roles.clone();
                std::thread::spawn(move || {
                    let _guard = roles.owner.write().unwrap();
                    panic!("poison");
                })
            },
            {
                let roles = roles.clone();
                std::thread::spawn(move || {
                    let _guard = roles.pending_owner.write().unwrap();
                    panic!("poison");
                })
            },
        ] {
            assert!(poisoner.join().is_err());
        }

        // the handshake must still take effect, not silently no-op
        roles.transfer_ownership(identity(1), identity(3)).unwrap();
        assert_eq!(roles.pending_owner(), Some(identity(3)));

        roles.accept_ownership(identity(3)).unwrap();
        assert_eq!(roles.owner(), identity(3));
        assert_eq!(roles.pending_owner(), None);
    }

    #[test]
    fn test_dao_is_immutable_across_transfer() {
        let roles = RoleSet::new(identity(1), identity(2));
        roles.transfer_ownership(identity(1), identity(3)).unwrap();
        roles.accept_ownership(identity(3)).unwrap();
        assert_eq!(roles.dao(), identity(2));
    }
}
