// ews/soap.rs
// SOAP envelope encoding for requests and decoding for responses

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Deserialize;

use super::types::{
    EwsRequest, FindFolder, FindItem, Folder, FolderReference, ItemView, Items, MessageBody,
    PageSpec, ResponseClass, ResponseEnvelope, ResponseMessage,
};
use crate::error::{Error, Result};
use crate::filter::QueryFilter;
use crate::impersonation::ImpersonationContext;

pub const SOAP_NS_URI: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const TYPES_NS_URI: &str = "http://schemas.microsoft.com/exchange/services/2006/types";
pub const MESSAGES_NS_URI: &str = "http://schemas.microsoft.com/exchange/services/2006/messages";

/// Value of the `SOAPAction` header for `request`.
pub fn soap_action(request: &EwsRequest) -> String {
    format!("{}/{}", MESSAGES_NS_URI, request.name())
}

/// Serializes `request` as a complete SOAP document acting as the
/// impersonated user.
pub fn encode_request(
    request: &EwsRequest,
    impersonation: &ImpersonationContext,
    server_version: Option<&str>,
) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("soap:Envelope").with_attributes([
        ("xmlns:soap", SOAP_NS_URI),
        ("xmlns:t", TYPES_NS_URI),
        ("xmlns:m", MESSAGES_NS_URI),
    ])))?;

    start(&mut writer, "soap:Header", &[])?;
    if let Some(version) = server_version {
        empty(&mut writer, "t:RequestServerVersion", &[("Version", version)])?;
    }
    start(&mut writer, "t:ExchangeImpersonation", &[])?;
    start(&mut writer, "t:ConnectingSID", &[])?;
    text_element(&mut writer, "t:SID", impersonation.sid().as_str())?;
    end(&mut writer, "t:ConnectingSID")?;
    end(&mut writer, "t:ExchangeImpersonation")?;
    end(&mut writer, "soap:Header")?;

    start(&mut writer, "soap:Body", &[])?;
    match request {
        EwsRequest::FindFolder(find_folder) => write_find_folder(&mut writer, find_folder)?,
        EwsRequest::FindItem(find_item) => write_find_item(&mut writer, find_item)?,
    }
    end(&mut writer, "soap:Body")?;
    end(&mut writer, "soap:Envelope")?;

    Ok(writer.into_inner())
}

fn write_find_folder<W: Write>(writer: &mut Writer<W>, find_folder: &FindFolder) -> Result<()> {
    start(
        writer,
        "m:FindFolder",
        &[("Traversal", find_folder.traversal.as_str())],
    )?;

    start(writer, "m:FolderShape", &[])?;
    text_element(writer, "t:BaseShape", find_folder.shape.as_str())?;
    end(writer, "m:FolderShape")?;

    write_page(writer, "m:IndexedPageFolderView", &find_folder.page)?;
    write_restriction(writer, find_folder.restriction.as_ref())?;
    write_parent_folder_ids(writer, &find_folder.parent_folder_ids)?;

    end(writer, "m:FindFolder")
}

fn write_find_item<W: Write>(writer: &mut Writer<W>, find_item: &FindItem) -> Result<()> {
    start(
        writer,
        "m:FindItem",
        &[("Traversal", find_item.traversal.as_str())],
    )?;

    start(writer, "m:ItemShape", &[])?;
    text_element(writer, "t:BaseShape", find_item.shape.as_str())?;
    end(writer, "m:ItemShape")?;

    match &find_item.view {
        ItemView::IndexedPage(page) => write_page(writer, "m:IndexedPageItemView", page)?,
        ItemView::Calendar(range) => {
            let start_date = format_date_time(&range.start);
            let end_date = format_date_time(&range.end);
            empty(
                writer,
                "m:CalendarView",
                &[("StartDate", start_date.as_str()), ("EndDate", end_date.as_str())],
            )?;
        }
    }

    write_restriction(writer, find_item.restriction.as_ref())?;
    write_parent_folder_ids(writer, &find_item.parent_folder_ids)?;

    end(writer, "m:FindItem")
}

fn write_page<W: Write>(writer: &mut Writer<W>, name: &str, page: &PageSpec) -> Result<()> {
    let max_entries = page.max_entries.to_string();
    let offset = page.offset.to_string();
    empty(
        writer,
        name,
        &[
            ("MaxEntriesReturned", max_entries.as_str()),
            ("Offset", offset.as_str()),
            ("BasePoint", page.base_point.as_str()),
        ],
    )
}

fn write_restriction<W: Write>(
    writer: &mut Writer<W>,
    restriction: Option<&QueryFilter>,
) -> Result<()> {
    let Some(filter) = restriction else {
        return Ok(());
    };
    start(writer, "m:Restriction", &[])?;
    write_search_expression(writer, filter)?;
    end(writer, "m:Restriction")
}

fn write_search_expression<W: Write>(writer: &mut Writer<W>, filter: &QueryFilter) -> Result<()> {
    match filter {
        QueryFilter::Equals { field, constant } => {
            start(writer, "t:IsEqualTo", &[])?;
            empty(writer, "t:FieldURI", &[("FieldURI", field.as_str())])?;
            start(writer, "t:FieldURIOrConstant", &[])?;
            empty(writer, "t:Constant", &[("Value", constant.as_str())])?;
            end(writer, "t:FieldURIOrConstant")?;
            end(writer, "t:IsEqualTo")
        }
        QueryFilter::Or(filters) => {
            start(writer, "t:Or", &[])?;
            for filter in filters {
                write_search_expression(writer, filter)?;
            }
            end(writer, "t:Or")
        }
    }
}

fn write_parent_folder_ids<W: Write>(
    writer: &mut Writer<W>,
    folders: &[FolderReference],
) -> Result<()> {
    start(writer, "m:ParentFolderIds", &[])?;
    for folder in folders {
        match folder {
            FolderReference::Distinguished(folder) => {
                empty(writer, "t:DistinguishedFolderId", &[("Id", folder.as_str())])?;
            }
            FolderReference::Concrete(folder_id) => match &folder_id.change_key {
                Some(change_key) => empty(
                    writer,
                    "t:FolderId",
                    &[("Id", folder_id.id.as_str()), ("ChangeKey", change_key.as_str())],
                )?,
                None => empty(writer, "t:FolderId", &[("Id", folder_id.id.as_str())])?,
            },
        }
    }
    end(writer, "m:ParentFolderIds")
}

fn format_date_time(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn start<W: Write>(writer: &mut Writer<W>, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
    writer.write_event(Event::Start(
        BytesStart::new(name).with_attributes(attributes.iter().copied()),
    ))?;
    Ok(())
}

fn empty<W: Write>(writer: &mut Writer<W>, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
    writer.write_event(Event::Empty(
        BytesStart::new(name).with_attributes(attributes.iter().copied()),
    ))?;
    Ok(())
}

fn end<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    start(writer, name, &[])?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    end(writer, name)
}

// Deserialization mirrors of the wire layout. Element names are matched
// without their namespace prefixes.

#[derive(Deserialize)]
struct DeEnvelope {
    #[serde(rename = "Body")]
    body: DeBody,
}

#[derive(Deserialize)]
struct DeBody {
    #[serde(rename = "$value")]
    content: DeBodyContent,
}

#[derive(Deserialize)]
enum DeBodyContent {
    FindFolderResponse(DeOperationResponse),
    FindItemResponse(DeOperationResponse),
    Fault(DeFault),
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeOperationResponse {
    response_messages: DeResponseMessages,
}

#[derive(Deserialize)]
struct DeResponseMessages {
    #[serde(rename = "$value", default)]
    inner: Vec<DeResponseMessage>,
}

#[derive(Deserialize)]
enum DeResponseMessage {
    FindFolderResponseMessage(DeMessage<DeFolderRoot>),
    FindItemResponseMessage(DeMessage<DeItemRoot>),
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeMessage<R> {
    #[serde(rename = "@ResponseClass")]
    response_class: ResponseClass,
    response_code: Option<String>,
    message_text: Option<String>,
    root_folder: Option<R>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeFolderRoot {
    #[serde(default)]
    folders: DeFolders,
}

#[derive(Default, Deserialize)]
struct DeFolders {
    #[serde(rename = "$value", default)]
    inner: Vec<Folder>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeItemRoot {
    #[serde(default)]
    items: Items,
}

#[derive(Deserialize)]
struct DeFault {
    faultcode: String,
    faultstring: String,
    detail: Option<DeFaultDetail>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeFaultDetail {
    response_code: Option<String>,
}

impl<R> DeMessage<R> {
    fn into_message(self, body: impl FnOnce(R) -> MessageBody) -> ResponseMessage {
        ResponseMessage {
            class: self.response_class,
            response_code: self.response_code,
            message_text: self.message_text,
            body: self.root_folder.map(body).unwrap_or(MessageBody::Empty),
        }
    }
}

/// Drops the namespace prefix of a qualified name such as `a:ErrorAccessDenied`.
fn unqualified(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Parses a SOAP response document. A SOAP fault becomes
/// [`Error::RemoteProtocolFault`].
pub fn decode_response(document: &[u8]) -> Result<ResponseEnvelope> {
    let envelope: DeEnvelope = quick_xml::de::from_reader(document)?;

    let response = match envelope.body.content {
        DeBodyContent::FindFolderResponse(response) | DeBodyContent::FindItemResponse(response) => {
            response
        }
        DeBodyContent::Fault(fault) => {
            let code = fault
                .detail
                .and_then(|detail| detail.response_code)
                .unwrap_or_else(|| unqualified(&fault.faultcode).to_string());
            return Err(Error::RemoteProtocolFault {
                code,
                message: fault.faultstring,
            });
        }
    };

    let messages = response
        .response_messages
        .inner
        .into_iter()
        .map(|message| match message {
            DeResponseMessage::FindFolderResponseMessage(message) => {
                message.into_message(|root| MessageBody::FindFolder(root.folders.inner))
            }
            DeResponseMessage::FindItemResponseMessage(message) => {
                message.into_message(|root| MessageBody::FindItem(root.items))
            }
        })
        .collect();

    Ok(ResponseEnvelope { messages })
}
