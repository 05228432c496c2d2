// impersonation.rs
// Impersonation context sent with every delegated EWS call

use crate::directory::DirectorySid;

/// Tells the server to act as the user identified by `sid` while the
/// request itself authenticates as the service account.
///
/// Built once per logical operation and never shared across users.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImpersonationContext {
    sid: DirectorySid,
}

impl ImpersonationContext {
    pub fn sid(&self) -> &DirectorySid {
        &self.sid
    }
}

pub struct ImpersonationBuilder;

impl ImpersonationBuilder {
    pub fn build(sid: DirectorySid) -> ImpersonationContext {
        ImpersonationContext { sid }
    }
}

impl From<DirectorySid> for ImpersonationContext {
    fn from(sid: DirectorySid) -> Self {
        ImpersonationBuilder::build(sid)
    }
}
