// ews/mod.rs
// Exchange Web Services protocol model and SOAP codec

pub mod soap;
pub mod types;

pub use types::{
    CalendarItem, DistinguishedFolder, EwsRequest, Folder, FolderId, FolderReference, Item, ItemId,
    Items, Message, ResponseEnvelope,
};
