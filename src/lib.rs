// ews-delegate
// Delegated mailbox queries against Exchange Web Services

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod ews;
pub mod filter;
pub mod folder;
pub mod impersonation;
pub mod query;
pub mod response;
pub mod service;
pub mod transport;

#[cfg(test)]
mod testing;

pub use crate::config::ServiceConfig;
pub use crate::directory::{DirectoryEntry, DirectoryLookup, DirectorySid, SidResolver, UserIdentity};
pub use crate::error::{Error, Result};
pub use crate::folder::FolderLocator;
pub use crate::impersonation::{ImpersonationBuilder, ImpersonationContext};
pub use crate::query::ItemQueryExecutor;
pub use crate::response::ResponseUnwrapper;
pub use crate::service::EwsService;
pub use crate::transport::{CallOptions, HttpTransport, Transport};
