// service.rs
// User-facing operations that resolve a user and query their mailbox

use chrono::{DateTime, Utc};
use log::info;

use crate::config::{self, ServiceConfig};
use crate::directory::{DirectoryLookup, DirectorySid, SidResolver, UserIdentity};
use crate::error::Result;
use crate::ews::types::{CalendarItem, DistinguishedFolder, Folder, Message};
use crate::folder::FolderLocator;
use crate::impersonation::{ImpersonationBuilder, ImpersonationContext};
use crate::query::ItemQueryExecutor;
use crate::transport::{CallOptions, HttpTransport, Transport};

/// Only the best match is needed when locating a well-known folder.
const FOLDER_LOOKUP_LIMIT: u32 = 1;

/// Runs mailbox queries as arbitrary users through one service account.
///
/// Every operation resolves the user's SID afresh and builds its own
/// impersonation context; nothing is cached between calls.
pub struct EwsService<T, D> {
    transport: T,
    resolver: SidResolver<D>,
    inbox_names: Vec<String>,
    options: CallOptions,
}

impl<D: DirectoryLookup> EwsService<HttpTransport, D> {
    pub fn from_config(config: &ServiceConfig, directory: D) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        Ok(EwsService::new(transport, directory)
            .with_directory_base(&config.directory_base)
            .with_inbox_names(config.inbox_names.clone()))
    }
}

impl<T: Transport, D: DirectoryLookup> EwsService<T, D> {
    pub fn new(transport: T, directory: D) -> Self {
        EwsService {
            transport,
            resolver: SidResolver::new(directory),
            inbox_names: config::default_inbox_names(),
            options: CallOptions::default(),
        }
    }

    pub fn with_directory_base(mut self, base: &str) -> Self {
        self.resolver = self.resolver.with_base(base);
        self
    }

    /// Display names the inbox may carry, tried together in one search.
    pub fn with_inbox_names(mut self, names: Vec<String>) -> Self {
        self.inbox_names = names;
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn fetch_user_sid(&self, user: &str) -> Result<DirectorySid> {
        self.resolver.resolve(&UserIdentity::new(user)?)
    }

    fn impersonate(&self, user: &str) -> Result<ImpersonationContext> {
        Ok(ImpersonationBuilder::build(self.fetch_user_sid(user)?))
    }

    async fn find_inbox(&self, impersonation: &ImpersonationContext) -> Result<Folder> {
        FolderLocator::new(&self.transport)
            .with_options(self.options.clone())
            .find_folder(
                impersonation,
                DistinguishedFolder::Root,
                self.inbox_names.as_slice(),
                FOLDER_LOOKUP_LIMIT,
            )
            .await
    }

    /// The inbox of `user` as located by its display name.
    pub async fn fetch_inbox_folder(&self, user: &str) -> Result<Folder> {
        let impersonation = self.impersonate(user)?;
        self.find_inbox(&impersonation).await
    }

    pub async fn fetch_unread_emails(&self, user: &str, max: u32) -> Result<Vec<Message>> {
        let impersonation = self.impersonate(user)?;
        let inbox = self.find_inbox(&impersonation).await?.reference()?;
        ItemQueryExecutor::new(&self.transport)
            .with_options(self.options.clone())
            .find_unread(&impersonation, inbox, max)
            .await
    }

    /// `None` when the server reports no data for the range.
    pub async fn fetch_calendar_events(
        &self,
        user: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Vec<CalendarItem>>> {
        let impersonation = self.impersonate(user)?;
        ItemQueryExecutor::new(&self.transport)
            .with_options(self.options.clone())
            .find_calendar_items(&impersonation, start, end)
            .await
    }

    pub async fn fetch_inbox_unread_count(&self, user: &str) -> Result<u32> {
        let inbox = self.fetch_inbox_folder(user).await?;
        let count = inbox.require_unread_count()?;
        info!("{} has {} unread messages in the inbox", user, count);
        Ok(count)
    }
}
