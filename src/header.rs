use std::io::BufRead;

use crate::error::DapError;

#[derive(Debug, Clone)]
/// A dap message header.
/// In the current, version of dap, a Header can only contain one field : `Content-Length`.
/// That being say, the standard was design to make it possible for a future version to add field.
/// As such, This type support header which contain unknown fields.
pub struct Header {
    /// "The length of the content part in bytes"
    pub len: usize,
    /// The list of the header field, both know and unknown.
    pub fields: Vec<HeaderField>,
}

impl Header {
    /// Take a list of `HeaderField` and return Header if the list of field
    fn from_raw_fields(fields: Vec<HeaderField>) -> Option<Self> {
        // try finding the ContentLength field
        let len = fields.iter().find_map(|field| match field {
            HeaderField::Len(num) => Some(*num),
            _ => None,
        })?; // if unable to find the content field, return none

        Some(Self { len, fields })
    }

    pub fn read_from<R: BufRead>(input: &mut R) -> Result<Header, DapError> {
        let mut fields = Vec::new();

        // a empty line signify the end of the header
        while let Some(field) = HeaderField::read_from(input)? {
            fields.push(field);
        }

        Header::from_raw_fields(fields).ok_or(DapError::BadMessage)
    }

    /// Build the header for a message body of `len` bytes.
    pub fn new(len: usize) -> Self {
        let fields = vec![HeaderField::Len(len)];
        Self::from_raw_fields(fields).expect("bug: this header should be valid")
    }

    pub fn into_string(self) -> String {
        let mut output = String::new();
        for field in self.fields {
            let (name, value) = match field {
                HeaderField::Len(value) => ("Content-Length".to_string(), value.to_string()),
                HeaderField::Other { name, value } => (name, value),
            };
            output.push_str(&format!("{}:{}\r\n", name, value));
        }
        output.push_str("\r\n");
        output
    }
}

#[derive(Debug, Clone, PartialEq)]
/// A dap message header field.
pub enum HeaderField {
    /// "The length of the content part in bytes"
    Len(usize),
    /// a unknown field
    Other { name: String, value: String },
}

impl HeaderField {
    fn specialize(self) -> Result<Self, DapError> {
        match self {
            HeaderField::Other { name, value } if name == "Content-Length" => {
                let length = value.as_str().parse().or(Err(DapError::BadMessage))?;
                Ok(HeaderField::Len(length))
            }
            _ => Ok(self),
        }
    }

    fn read_from<R: BufRead>(input: &mut R) -> Result<Option<HeaderField>, DapError> {
        let mut line = String::new();
        input.read_line(&mut line)?;

        // a header field is compose of a name and a value separated by ':'
        let mut parts = line
            .split(':')
            .map(str::trim)
            .filter(|part| !part.is_empty());

        let name = parts.next();
        let value = parts.next();

        match (name, value, parts.next()) {
            // since ':' act as the separator between the name and the value,
            // the value should not contain a ':'
            (_, _, Some(_)) => Err(DapError::BadMessage),
            // if the line is empty: return None
            (None, None, None) => Ok(None),
            (Some(name), Some(value), None) => {
                let header = HeaderField::Other {
                    name: name.to_string(),
                    value: value.to_string(),
                }
                .specialize()?;
                Ok(Some(header))
            }
            _ => Err(DapError::BadMessage),
        }
    }
}
