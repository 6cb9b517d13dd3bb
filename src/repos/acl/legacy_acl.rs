//! Traits the ACL implementations and the repos agree on

use models::UserId;

/// Access control layer for repos. It tells if a user can do a certain action with
/// a certain resource. All logic for roles and permissions should be hardcoded into implementation
/// of this trait.
pub trait Acl<Resource, Action, Scope, Error, T> {
    /// Tells if a user with id `user_id` can do `action` on `resource`.
    /// `obj` is the object the action is applied to, `scope_checker` decides whether
    /// it falls into a permission scope.
    fn allows(
        &self,
        resource: Resource,
        action: Action,
        scope_checker: &CheckScope<Scope, T>,
        obj: Option<&T>,
    ) -> Result<bool, Error>;
}

/// Implement this trait on resource to signal if it's in the current scope
pub trait CheckScope<Scope, T> {
    fn is_in_scope(&self, user_id: UserId, scope: &Scope, obj: Option<&T>) -> bool;
}

/// SystemACL allows all manipulation with resources in all cases.
#[derive(Clone, Debug, Default)]
pub struct SystemACL;

impl<Resource, Action, Scope, Error, T> Acl<Resource, Action, Scope, Error, T> for SystemACL {
    fn allows(
        &self,
        _resource: Resource,
        _action: Action,
        _scope_checker: &CheckScope<Scope, T>,
        _obj: Option<&T>,
    ) -> Result<bool, Error> {
        Ok(true)
    }
}
