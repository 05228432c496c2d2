// query.rs
// Unread-mail and calendar-range item queries

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::error::{Error, Result};
use crate::ews::types::{
    BaseShape, CalendarItem, DistinguishedFolder, EwsRequest, FindItem, FolderReference,
    ItemTraversal, ItemView, Items, Message,
};
use crate::filter::{FieldUri, FilterBuilder};
use crate::impersonation::ImpersonationContext;
use crate::response::ResponseUnwrapper;
use crate::transport::{CallOptions, Transport};

pub use crate::ews::types::{CalendarRange, PageSpec};

const OPERATION: &str = "FindItem";

/// Runs item searches in a single folder on behalf of an impersonated user.
pub struct ItemQueryExecutor<'a, T> {
    transport: &'a T,
    options: CallOptions,
}

impl<'a, T: Transport> ItemQueryExecutor<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        ItemQueryExecutor {
            transport,
            options: CallOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// Up to `max_number` unread messages directly in `folder`.
    ///
    /// Message bodies are not requested. A reply without any response
    /// message is an error here.
    pub async fn find_unread(
        &self,
        impersonation: &ImpersonationContext,
        folder: FolderReference,
        max_number: u32,
    ) -> Result<Vec<Message>> {
        let request = FindItem {
            traversal: ItemTraversal::Shallow,
            shape: BaseShape::AllProperties,
            view: ItemView::IndexedPage(PageSpec::first(max_number)?),
            restriction: Some(FilterBuilder::equals(FieldUri::MessageIsRead, false)),
            parent_folder_ids: vec![folder],
        };

        let items = self
            .execute_folder_query(impersonation, request)
            .await?
            .ok_or(Error::NoResponseMessage {
                operation: OPERATION,
            })?;
        let messages = items.into_messages()?;
        info!("Found {} unread messages for {}", messages.len(), impersonation.sid());
        Ok(messages)
    }

    /// Calendar items in the user's calendar between `start` and `end`.
    ///
    /// `None` means the server reported no data for the range, which is
    /// distinct from an empty list.
    pub async fn find_calendar_items(
        &self,
        impersonation: &ImpersonationContext,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Option<Vec<CalendarItem>>> {
        let request = FindItem {
            traversal: ItemTraversal::Shallow,
            shape: BaseShape::AllProperties,
            view: ItemView::Calendar(CalendarRange::new(start, end)?),
            restriction: None,
            parent_folder_ids: vec![DistinguishedFolder::Calendar.into()],
        };

        let Some(items) = self.execute_folder_query(impersonation, request).await? else {
            info!("No calendar data for {} between {} and {}", impersonation.sid(), start, end);
            return Ok(None);
        };
        let calendar_items = items.into_calendar_items()?;
        info!(
            "Found {} calendar items for {}",
            calendar_items.len(),
            impersonation.sid()
        );
        Ok(Some(calendar_items))
    }

    /// Sends one FindItem and unwraps at most one response message.
    async fn execute_folder_query(
        &self,
        impersonation: &ImpersonationContext,
        request: FindItem,
    ) -> Result<Option<Items>> {
        debug!(
            "Querying {:?} with view {:?} and restriction {:?}",
            request.parent_folder_ids, request.view, request.restriction
        );
        let request = EwsRequest::FindItem(request);
        let envelope = self
            .transport
            .execute(&request, impersonation, &self.options)
            .await?;
        ResponseUnwrapper::unwrap_optional(envelope, OPERATION)
    }
}
