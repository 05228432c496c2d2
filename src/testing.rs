// testing.rs
// Canned directory and transport doubles for unit tests

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::directory::{DirectoryEntry, DirectoryLookup};
use crate::error::Result;
use crate::ews::soap;
use crate::ews::types::{EwsRequest, ResponseEnvelope};
use crate::impersonation::ImpersonationContext;
use crate::transport::{CallOptions, Transport};

pub(crate) const SAMPLE_SID: &str = "S-1-5-21-4207368772-811273523-976865563-30274";

pub(crate) const SAMPLE_SID_BYTES: [u8; 28] = [
    0x01, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, 0x15, 0x00, 0x00, 0x00, 0x44, 0x5A, 0xC7, 0xFA,
    0x33, 0x0D, 0x5B, 0x30, 0x1B, 0xC9, 0x39, 0x3A, 0x42, 0x76, 0x00, 0x00,
];

pub(crate) const FIND_FOLDER_RESPONSE: &str =
    include_str!("../tests/fixtures/find_folder_response.xml");
pub(crate) const FIND_UNREAD_EMAILS_RESPONSE: &str =
    include_str!("../tests/fixtures/find_unread_emails_response.xml");
pub(crate) const FIND_ITEM_CALENDAR_RESPONSE: &str =
    include_str!("../tests/fixtures/calendar_items_response.xml");

/// Answers every search with the same entries and records what was asked.
pub(crate) struct StubDirectory {
    entries: Vec<DirectoryEntry>,
    searches: Mutex<Vec<(String, String)>>,
}

impl StubDirectory {
    pub(crate) fn with_entries(entries: Vec<DirectoryEntry>) -> Self {
        StubDirectory {
            entries,
            searches: Mutex::new(Vec::new()),
        }
    }

    /// A directory holding one person with the sample SID.
    pub(crate) fn with_sample_user(name: &str) -> Self {
        StubDirectory::with_entries(vec![DirectoryEntry::new(&format!("cn={},ou=people", name))
            .with_attribute("objectSid", SAMPLE_SID_BYTES)])
    }

    pub(crate) fn searches(&self) -> Vec<(String, String)> {
        self.searches.lock().unwrap().clone()
    }
}

impl DirectoryLookup for StubDirectory {
    fn search(
        &self,
        base: &str,
        filter: &str,
    ) -> std::result::Result<Vec<DirectoryEntry>, Box<dyn std::error::Error + Send + Sync>> {
        self.searches
            .lock()
            .unwrap()
            .push((base.to_string(), filter.to_string()));
        Ok(self.entries.clone())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RecordedCall {
    pub request: EwsRequest,
    pub sid: String,
    pub options: CallOptions,
}

/// Replays queued replies in order and records every request it sees.
#[derive(Default)]
pub(crate) struct StubTransport {
    replies: Mutex<VecDeque<Result<ResponseEnvelope>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StubTransport {
    pub(crate) fn new() -> Self {
        StubTransport::default()
    }

    pub(crate) fn reply(self, envelope: ResponseEnvelope) -> Self {
        self.replies.lock().unwrap().push_back(Ok(envelope));
        self
    }

    /// Queues the decoded form of a raw SOAP document, faults included.
    pub(crate) fn reply_xml(self, document: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(soap::decode_response(document.as_bytes()));
        self
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for StubTransport {
    async fn execute(
        &self,
        request: &EwsRequest,
        impersonation: &ImpersonationContext,
        options: &CallOptions,
    ) -> Result<ResponseEnvelope> {
        self.calls.lock().unwrap().push(RecordedCall {
            request: request.clone(),
            sid: impersonation.sid().to_string(),
            options: options.clone(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no reply queued for {}", request.name()))
    }
}
