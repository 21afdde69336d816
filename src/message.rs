use std::{convert::TryFrom, io, io::BufRead};

use serde::{Deserialize, Serialize};

use crate::error::DapError;
use crate::header::Header;

/// Frame `body` as a `Content-Length`-prefixed message and write it out.
pub fn write_message<W: io::Write>(output: &mut W, body: &serde_json::Value) -> Result<(), DapError> {
    let body = serde_json::to_string(body)?;
    let header = Header::new(body.len()).into_string();

    output.write_all(header.as_bytes())?;
    output.write_all(body.as_bytes())?;
    Ok(())
}

/// A dap message
pub enum Message {
    Generic(GenericMessage),
}

impl Message {
    /// Read a `Message` from the wire.
    pub fn read_from<R: BufRead>(input: &mut R) -> Result<Self, DapError> {
        let header = Header::read_from(input)?;

        let mut buffer = vec![0; header.len];
        input.read_exact(buffer.as_mut_slice())?;

        let generic = GenericMessage::parse(buffer.as_slice())?;
        Ok(Self::from(generic))
    }

    /// Sequence number (also known as message ID). For protocol messages of type
    /// 'request' this ID can be used to cancel the request.
    pub fn seq(&self) -> usize {
        match self {
            Message::Generic(msg) => msg.seq(),
        }
    }

    pub fn into_generic(self) -> GenericMessage {
        match self {
            Message::Generic(msg) => msg,
        }
    }
}

impl From<GenericMessage> for Message {
    // this function is a bit silly right now,
    // but it will hold the specialization logic
    fn from(msg: GenericMessage) -> Self {
        Message::Generic(msg)
    }
}

#[derive(Debug, Clone)]
pub struct GenericMessage {
    serde: MessageSerde,
    value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct MessageSerde {
    /// Sequence number (also known as message ID). For protocol messages of type
    /// 'request' this ID can be used to cancel the request.
    seq: usize,
    #[serde(rename = "type")]
    message_type: String,
}

impl GenericMessage {
    /// Sequence number (also known as message ID). For protocol messages of type
    /// 'request' this ID can be used to cancel the request.
    pub fn seq(&self) -> usize {
        self.serde.seq
    }

    pub fn message_type(&self) -> &str {
        self.serde.message_type.as_str()
    }

    /// The full decoded JSON body, for pulling out command-specific fields.
    pub fn value(&self) -> &serde_json::Value {
        &self.value
    }

    fn parse(input: &[u8]) -> Result<Self, DapError> {
        let value = serde_json::from_slice(input)?;
        let serde = serde_json::from_slice(input)?;

        Ok(Self { value, serde })
    }
}

impl TryFrom<serde_json::Value> for GenericMessage {
    type Error = DapError;

    fn try_from(value: serde_json::Value) -> Result<Self, DapError> {
        let message = serde_json::from_value(value.clone())?;
        Ok(Self {
            value,
            serde: message,
        })
    }
}
