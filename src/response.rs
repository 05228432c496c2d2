// response.rs
// Extraction of the single expected response message from a reply

use log::warn;

use crate::error::{Error, Result};
use crate::ews::types::{Folder, Items, MessageBody, ResponseClass, ResponseEnvelope, ResponseMessage};

/// A payload that can be pulled out of a response message body.
pub trait ExpectedMessage: Sized {
    const KIND: &'static str;

    fn from_body(body: MessageBody) -> Result<Self>;
}

impl ExpectedMessage for Vec<Folder> {
    const KIND: &'static str = "FindFolderResponseMessage";

    fn from_body(body: MessageBody) -> Result<Self> {
        match body {
            MessageBody::FindFolder(folders) => Ok(folders),
            other => Err(Error::shape_mismatch(Self::KIND, other.kind())),
        }
    }
}

impl ExpectedMessage for Items {
    const KIND: &'static str = "FindItemResponseMessage";

    fn from_body(body: MessageBody) -> Result<Self> {
        match body {
            MessageBody::FindItem(items) => Ok(items),
            other => Err(Error::shape_mismatch(Self::KIND, other.kind())),
        }
    }
}

pub struct ResponseUnwrapper;

impl ResponseUnwrapper {
    /// Requires exactly one response message of kind `M`.
    pub fn unwrap_single<M: ExpectedMessage>(
        envelope: ResponseEnvelope,
        operation: &'static str,
    ) -> Result<M> {
        ResponseUnwrapper::unwrap_optional(envelope, operation)?
            .ok_or(Error::NoResponseMessage { operation })
    }

    /// Like [`ResponseUnwrapper::unwrap_single`], but an envelope with no
    /// messages yields `None`.
    pub fn unwrap_optional<M: ExpectedMessage>(
        envelope: ResponseEnvelope,
        operation: &'static str,
    ) -> Result<Option<M>> {
        let count = envelope.messages.len();
        if count > 1 {
            return Err(Error::UnexpectedMultipleResponses { operation, count });
        }

        envelope
            .messages
            .into_iter()
            .next()
            .map(|message| extract(message, operation))
            .transpose()
    }
}

fn extract<M: ExpectedMessage>(message: ResponseMessage, operation: &'static str) -> Result<M> {
    match message.class {
        ResponseClass::Success => {}
        ResponseClass::Warning => {
            warn!(
                "{} operation returned a warning: {}",
                operation,
                message.message_text.as_deref().unwrap_or("no message text")
            );
        }
        ResponseClass::Error => {
            return Err(Error::RemoteProtocolFault {
                code: message
                    .response_code
                    .unwrap_or_else(|| "ErrorUnknown".to_string()),
                message: message.message_text.unwrap_or_default(),
            });
        }
    }

    M::from_body(message.body)
}
