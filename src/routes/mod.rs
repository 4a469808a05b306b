/// Router Module Index
///
/// Routes are grouped by the gate they sit behind. `create_router` attaches the matching
/// middleware to each group with `route_layer`, so a route cannot be registered without
/// its access check.

/// Routes open to anonymous callers (registration, login, reads).
pub mod public;

/// Routes that require any verified principal.
pub mod authenticated;

/// Post authoring routes: creation needs the blogger role, update/delete need ownership.
pub mod authoring;
