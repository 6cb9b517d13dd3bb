//! Shorthand for role permission tables

/// Builds a `Permission`, action and scope default to `All`.
#[macro_export]
macro_rules! permission {
    ($resource:expr) => {
        Permission {
            resource: $resource,
            action: Action::All,
            scope: Scope::All,
        }
    };
    ($resource:expr, $action:expr) => {
        Permission {
            resource: $resource,
            action: $action,
            scope: Scope::All,
        }
    };
    ($resource:expr, $action:expr, $scope:expr) => {
        Permission {
            resource: $resource,
            action: $action,
            scope: $scope,
        }
    };
}
