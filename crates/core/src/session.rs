//! Session seam between the auth layer and the offline core.

/// Read access to the locally cached auth session.
///
/// The concrete implementation lives with the remote client; repositories
/// and services only ever ask "who is signed in right now".
pub trait SessionProvider: Send + Sync {
    /// Id of the signed-in user, if any.
    fn current_user(&self) -> Option<String>;
}
