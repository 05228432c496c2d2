// ews/types.rs
// Typed model of the FindFolder and FindItem exchanges

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::filter::QueryFilter;

/// Well-known folders addressed by symbolic name.
///
/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/distinguishedfolderid>
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistinguishedFolder {
    Root,
    MsgFolderRoot,
    Inbox,
    Calendar,
    Contacts,
    Drafts,
    SentItems,
    DeletedItems,
}

impl DistinguishedFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistinguishedFolder::Root => "root",
            DistinguishedFolder::MsgFolderRoot => "msgfolderroot",
            DistinguishedFolder::Inbox => "inbox",
            DistinguishedFolder::Calendar => "calendar",
            DistinguishedFolder::Contacts => "contacts",
            DistinguishedFolder::Drafts => "drafts",
            DistinguishedFolder::SentItems => "sentitems",
            DistinguishedFolder::DeletedItems => "deleteditems",
        }
    }
}

/// The unique identifier of a folder.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct FolderId {
    #[serde(rename = "@Id")]
    pub id: String,

    #[serde(rename = "@ChangeKey")]
    pub change_key: Option<String>,
}

/// The unique identifier of an item.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ItemId {
    #[serde(rename = "@Id")]
    pub id: String,

    #[serde(rename = "@ChangeKey")]
    pub change_key: Option<String>,
}

/// Either a well-known folder or one resolved by a previous search.
///
/// Concrete references are only valid for the request that produced them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FolderReference {
    Distinguished(DistinguishedFolder),
    Concrete(FolderId),
}

impl From<DistinguishedFolder> for FolderReference {
    fn from(folder: DistinguishedFolder) -> Self {
        FolderReference::Distinguished(folder)
    }
}

impl From<FolderId> for FolderReference {
    fn from(id: FolderId) -> Self {
        FolderReference::Concrete(id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseShape {
    AllProperties,
}

impl BaseShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseShape::AllProperties => "AllProperties",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FolderTraversal {
    Shallow,
    Deep,
}

impl FolderTraversal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FolderTraversal::Shallow => "Shallow",
            FolderTraversal::Deep => "Deep",
        }
    }
}

/// Item searches never recurse into subfolders.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemTraversal {
    Shallow,
}

impl ItemTraversal {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemTraversal::Shallow => "Shallow",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BasePoint {
    Beginning,
}

impl BasePoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            BasePoint::Beginning => "Beginning",
        }
    }
}

/// Paging parameters. Every query starts from the beginning of the result
/// set; there is no continuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageSpec {
    pub base_point: BasePoint,
    pub offset: u32,
    pub max_entries: u32,
}

impl PageSpec {
    pub fn new(offset: u32, max_entries: u32) -> Result<Self> {
        if max_entries == 0 {
            return Err(Error::InvalidInput(
                "maximum number of entries must be positive".to_string(),
            ));
        }
        Ok(PageSpec {
            base_point: BasePoint::Beginning,
            offset,
            max_entries,
        })
    }

    pub fn first(max_entries: u32) -> Result<Self> {
        PageSpec::new(0, max_entries)
    }
}

/// A calendar window. The server defines how the bounds are interpreted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidInput(format!(
                "calendar range ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(CalendarRange { start, end })
    }
}

/// How a FindItem result is bounded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ItemView {
    IndexedPage(PageSpec),
    Calendar(CalendarRange),
}

/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/findfolder>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FindFolder {
    pub traversal: FolderTraversal,
    pub shape: BaseShape,
    pub page: PageSpec,
    pub restriction: Option<QueryFilter>,
    pub parent_folder_ids: Vec<FolderReference>,
}

/// See <https://learn.microsoft.com/en-us/exchange/client-developer/web-service-reference/finditem>
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FindItem {
    pub traversal: ItemTraversal,
    pub shape: BaseShape,
    pub view: ItemView,
    pub restriction: Option<QueryFilter>,
    pub parent_folder_ids: Vec<FolderReference>,
}

/// A fully formed operation, ready for a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EwsRequest {
    FindFolder(FindFolder),
    FindItem(FindItem),
}

impl EwsRequest {
    pub fn name(&self) -> &'static str {
        match self {
            EwsRequest::FindFolder(_) => "FindFolder",
            EwsRequest::FindItem(_) => "FindItem",
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum ResponseClass {
    Success,
    Warning,
    Error,
}

/// A decoded server reply. Only the unwrapper looks inside it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResponseEnvelope {
    pub messages: Vec<ResponseMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseMessage {
    pub class: ResponseClass,
    pub response_code: Option<String>,
    pub message_text: Option<String>,
    pub body: MessageBody,
}

impl ResponseMessage {
    pub fn success(body: MessageBody) -> Self {
        ResponseMessage {
            class: ResponseClass::Success,
            response_code: Some("NoError".to_string()),
            message_text: None,
            body,
        }
    }
}

/// The payload of a response message, by operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageBody {
    FindFolder(Vec<Folder>),
    FindItem(Items),
    /// Error messages carry no root folder.
    Empty,
}

impl MessageBody {
    pub fn kind(&self) -> &'static str {
        match self {
            MessageBody::FindFolder(_) => "FindFolderResponseMessage",
            MessageBody::FindItem(_) => "FindItemResponseMessage",
            MessageBody::Empty => "empty response message",
        }
    }
}

/// Properties shared by every folder class.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct FolderProperties {
    pub folder_id: Option<FolderId>,
    pub parent_folder_id: Option<FolderId>,
    pub folder_class: Option<String>,
    pub display_name: Option<String>,
    pub total_count: Option<u32>,
    pub child_folder_count: Option<u32>,
    pub unread_count: Option<u32>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub enum Folder {
    Folder(FolderProperties),
    CalendarFolder(FolderProperties),
    ContactsFolder(FolderProperties),
    SearchFolder(FolderProperties),
    TasksFolder(FolderProperties),
}

impl Folder {
    pub fn properties(&self) -> &FolderProperties {
        match self {
            Folder::Folder(properties)
            | Folder::CalendarFolder(properties)
            | Folder::ContactsFolder(properties)
            | Folder::SearchFolder(properties)
            | Folder::TasksFolder(properties) => properties,
        }
    }

    pub fn display_name(&self) -> Option<&str> {
        self.properties().display_name.as_deref()
    }

    pub fn unread_count(&self) -> Option<u32> {
        self.properties().unread_count
    }

    /// The unread count, which the server omits only for shapes that do not
    /// carry it.
    pub fn require_unread_count(&self) -> Result<u32> {
        self.unread_count().ok_or_else(|| {
            Error::shape_mismatch("folder with UnreadCount", "folder without UnreadCount")
        })
    }

    pub fn reference(&self) -> Result<FolderReference> {
        self.properties()
            .folder_id
            .clone()
            .map(FolderReference::Concrete)
            .ok_or(Error::MissingFolderId)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Mailbox {
    #[serde(rename = "Name")]
    pub name: Option<String>,

    #[serde(rename = "EmailAddress")]
    pub email_address: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Recipient {
    #[serde(rename = "Mailbox")]
    pub mailbox: Mailbox,
}

/// An item of no more specific class.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct GenericItem {
    pub item_id: Option<ItemId>,
    pub item_class: Option<String>,
    pub subject: Option<String>,
    pub date_time_received: Option<DateTime<Utc>>,
    pub size: Option<u64>,
}

/// An email message. Bodies are not part of the search shape and are never
/// populated.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Message {
    pub item_id: Option<ItemId>,
    pub item_class: Option<String>,
    pub subject: Option<String>,
    pub date_time_received: Option<DateTime<Utc>>,
    pub date_time_sent: Option<DateTime<Utc>>,
    pub size: Option<u64>,
    pub has_attachments: Option<bool>,
    pub from: Option<Recipient>,
    pub is_read: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CalendarItem {
    pub item_id: Option<ItemId>,
    pub item_class: Option<String>,
    pub subject: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub is_all_day_event: Option<bool>,
    pub location: Option<String>,
    pub organizer: Option<Recipient>,
}

/// The closed set of item kinds a search can return.
///
/// Meeting requests, responses and cancellations arrive in the inbox and
/// carry the same properties as a message.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub enum Item {
    Item(GenericItem),
    Message(Message),
    MeetingMessage(Message),
    MeetingRequest(Message),
    MeetingResponse(Message),
    MeetingCancellation(Message),
    CalendarItem(CalendarItem),
}

impl Item {
    pub fn kind(&self) -> &'static str {
        match self {
            Item::Item(_) => "Item",
            Item::Message(_) => "Message",
            Item::MeetingMessage(_) => "MeetingMessage",
            Item::MeetingRequest(_) => "MeetingRequest",
            Item::MeetingResponse(_) => "MeetingResponse",
            Item::MeetingCancellation(_) => "MeetingCancellation",
            Item::CalendarItem(_) => "CalendarItem",
        }
    }
}

/// An ordered, heterogeneous item list as returned by FindItem.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Items {
    #[serde(rename = "$value", default)]
    pub inner: Vec<Item>,
}

impl Items {
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Narrows to messages, meeting messages included, failing on the first
    /// item of another kind.
    pub fn into_messages(self) -> Result<Vec<Message>> {
        self.inner
            .into_iter()
            .map(|item| match item {
                Item::Message(message)
                | Item::MeetingMessage(message)
                | Item::MeetingRequest(message)
                | Item::MeetingResponse(message)
                | Item::MeetingCancellation(message) => Ok(message),
                other => Err(Error::shape_mismatch("Message", other.kind())),
            })
            .collect()
    }

    /// Narrows to calendar items, failing on the first item of another kind.
    pub fn into_calendar_items(self) -> Result<Vec<CalendarItem>> {
        self.inner
            .into_iter()
            .map(|item| match item {
                Item::CalendarItem(calendar_item) => Ok(calendar_item),
                other => Err(Error::shape_mismatch("CalendarItem", other.kind())),
            })
            .collect()
    }
}

impl From<Vec<Item>> for Items {
    fn from(inner: Vec<Item>) -> Self {
        Items { inner }
    }
}
