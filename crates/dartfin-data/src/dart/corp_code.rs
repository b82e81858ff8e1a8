//! Corp-code registry (`corpCode.xml`).
//!
//! DART identifies companies by an 8-digit corp code. The registry is served as a
//! zip archive holding a single `CORPCODE.xml`:
//!
//! ```xml
//! <result>
//!   <list>
//!     <corp_code>00126380</corp_code>
//!     <corp_name>삼성전자</corp_name>
//!     <stock_code>005930</stock_code>
//!     <modify_date>20230110</modify_date>
//!   </list>
//! </result>
//! ```

use crate::error::{DataError, Result};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Cursor, Read};

const ARCHIVE_MAGIC: &[u8] = b"PK";
const CORP_CODE_FILE: &str = "CORPCODE.xml";

/// One registry entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpCode {
    /// 8-digit DART corp code
    pub corp_code: String,
    /// Registered Korean name
    pub corp_name: String,
    /// 6-digit stock code, empty for unlisted companies
    pub stock_code: String,
    /// Last modification date (`YYYYMMDD`)
    pub modify_date: String,
}

impl CorpCode {
    /// Whether the company has a stock code.
    pub fn is_listed(&self) -> bool {
        !self.stock_code.trim().is_empty()
    }
}

/// Parsed corp-code registry.
#[derive(Debug, Clone, Default)]
pub struct CorpCodeList {
    entries: Vec<CorpCode>,
}

impl CorpCodeList {
    /// Parse the zip archive returned by `corpCode.xml`.
    ///
    /// # Errors
    /// Returns [`DataError::DartApi`] if DART answered with an error document instead
    /// of an archive, [`DataError::Archive`] for a corrupt archive.
    pub fn from_archive(bytes: &[u8]) -> Result<Self> {
        if !bytes.starts_with(ARCHIVE_MAGIC) {
            let body = String::from_utf8_lossy(bytes);
            return Err(parse_error_document(&body));
        }

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        let mut xml = String::new();
        let index = archive.index_for_name(CORP_CODE_FILE).unwrap_or(0);
        archive.by_index(index)?.read_to_string(&mut xml)?;

        Self::parse_xml(&xml)
    }

    /// Parse the registry XML.
    pub fn parse_xml(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut entries = Vec::new();
        let mut current: Option<CorpCode> = None;
        let mut field: Option<String> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    if name == "list" {
                        current = Some(CorpCode::default());
                    } else {
                        field = Some(name);
                    }
                }
                Ok(Event::Text(text)) => {
                    if let (Some(entry), Some(name)) = (current.as_mut(), field.as_deref()) {
                        let value = text
                            .unescape()
                            .map_err(|e| DataError::XmlParse(format!("Bad text node: {}", e)))?
                            .trim()
                            .to_string();
                        match name {
                            "corp_code" => entry.corp_code = value,
                            "corp_name" => entry.corp_name = value,
                            "stock_code" => entry.stock_code = value,
                            "modify_date" => entry.modify_date = value,
                            _ => {}
                        }
                    }
                }
                Ok(Event::End(e)) => {
                    if e.name().as_ref() == b"list"
                        && let Some(entry) = current.take()
                    {
                        entries.push(entry);
                    }
                    field = None;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(DataError::XmlParse(format!("XML parse error: {}", e))),
            }
            buf.clear();
        }

        Ok(Self { entries })
    }

    /// All entries.
    pub fn entries(&self) -> &[CorpCode] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose name equals `name` exactly, listed companies first.
    pub fn find_exact(&self, name: &str) -> Vec<&CorpCode> {
        let name = name.trim();
        let mut matches: Vec<&CorpCode> = self
            .entries
            .iter()
            .filter(|entry| entry.corp_name == name)
            .collect();
        matches.sort_by_key(|entry| !entry.is_listed());
        matches
    }
}

/// DART reports archive errors as `<result><status/><message/></result>`.
fn parse_error_document(body: &str) -> DataError {
    let extract = |tag: &str| {
        let open = format!("<{}>", tag);
        let close = format!("</{}>", tag);
        body.find(&open).and_then(|start| {
            let rest = &body[start + open.len()..];
            rest.find(&close).map(|end| rest[..end].trim().to_string())
        })
    };

    match extract("status") {
        Some(status) => DataError::DartApi {
            status,
            message: extract("message").unwrap_or_default(),
        },
        None => DataError::Parse("corpCode.xml did not return a zip archive".to_string()),
    }
}
