//! Repos is a module responsible for interacting with access control lists
//! Authorization module contains authorization logic for the repo layer app

#[macro_use]
pub mod macros;
pub mod legacy_acl;

use std::collections::HashMap;
use std::rc::Rc;

use failure::Error as FailureError;

use errors::Error;
use models::authorization::*;
use models::{Identity, UserId, UserRole};

use self::legacy_acl::{Acl, CheckScope};

pub type BoxedAcl<T> = Box<Acl<Resource, Action, Scope, FailureError, T>>;

pub fn check<T>(
    acl: &Acl<Resource, Action, Scope, FailureError, T>,
    resource: Resource,
    action: Action,
    scope_checker: &CheckScope<Scope, T>,
    obj: Option<&T>,
) -> Result<(), FailureError> {
    acl.allows(resource, action, scope_checker, obj).and_then(|allowed| {
        if allowed {
            Ok(())
        } else {
            Err(format_err!("Denied request to do {:?} on {:?}", action, resource)
                .context(Error::Forbidden(format!("Not allowed to {} {}", action, resource)))
                .into())
        }
    })
}

/// Acl for the caller: role based for authenticated users, read only for anonymous ones
pub fn acl_for<T>(identity: Option<Identity>) -> BoxedAcl<T> {
    identity.map_or(Box::new(UnauthorizedAcl::default()) as BoxedAcl<T>, |identity| {
        Box::new(ApplicationAcl::new(identity)) as BoxedAcl<T>
    })
}

/// ApplicationAcl contains main logic for manipulation with resources
#[derive(Clone)]
pub struct ApplicationAcl {
    acls: Rc<HashMap<UserRole, Vec<Permission>>>,
    role: UserRole,
    user_id: UserId,
}

impl ApplicationAcl {
    pub fn new(identity: Identity) -> Self {
        let mut hash = ::std::collections::HashMap::new();
        hash.insert(
            UserRole::Admin,
            vec![
                permission!(Resource::Products),
                permission!(Resource::Supermarkets),
                permission!(Resource::Users),
            ],
        );
        hash.insert(
            UserRole::User,
            vec![
                permission!(Resource::Products, Action::Read),
                permission!(Resource::Products, Action::All, Scope::Owned),
                permission!(Resource::Supermarkets, Action::Read),
                permission!(Resource::Users, Action::Read),
            ],
        );

        ApplicationAcl {
            acls: Rc::new(hash),
            role: identity.role,
            user_id: identity.user_id,
        }
    }
}

impl<T> Acl<Resource, Action, Scope, FailureError, T> for ApplicationAcl {
    fn allows(
        &self,
        resource: Resource,
        action: Action,
        scope_checker: &CheckScope<Scope, T>,
        obj: Option<&T>,
    ) -> Result<bool, FailureError> {
        let empty: Vec<Permission> = Vec::new();
        let user_id = self.user_id;
        let allowed = self
            .acls
            .get(&self.role)
            .unwrap_or(&empty)
            .iter()
            .filter(|permission| (permission.resource == resource) && ((permission.action == action) || (permission.action == Action::All)))
            .any(|permission| scope_checker.is_in_scope(user_id, &permission.scope, obj));

        if !allowed {
            error!("Denied request from user {} with role {} to do {} on {}.", user_id, self.role, action, resource);
        }

        Ok(allowed)
    }
}

/// UnauthorizedAcl contains main logic for manipulation with resources
#[derive(Clone, Default)]
pub struct UnauthorizedAcl;

impl<T> Acl<Resource, Action, Scope, FailureError, T> for UnauthorizedAcl {
    fn allows(
        &self,
        resource: Resource,
        action: Action,
        _scope_checker: &CheckScope<Scope, T>,
        _obj: Option<&T>,
    ) -> Result<bool, FailureError> {
        if action == Action::Read {
            match resource {
                Resource::Products | Resource::Supermarkets => Ok(true),
                Resource::Users => Ok(false),
            }
        } else {
            error!("Denied unauthorized request to do {} on {}.", action, resource);
            Ok(false)
        }
    }
}
