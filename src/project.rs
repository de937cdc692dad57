//! Project document loading.
//!
//! A project export looks like:
//!
//! ```xml
//! <Project>
//!   <Modules>
//!     <Module type="VMB4RYLD" address="1A">
//!       <Caption>Kitchen relays</Caption>
//!       <Memory>48656C6C6F</Memory>
//!     </Module>
//!   </Modules>
//! </Project>
//! ```
//!
//! The document is walked as an event stream. Only the first `<Modules>`
//! directly under the root is read, and for each `<Module>` only the first
//! `<Caption>` and `<Memory>` child count. A field's value is the text in
//! front of its first child element. Text is decoded with the encoding the
//! XML declaration names.

use std::fs;
use std::io::{self, BufRead};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::record::ModuleRecord;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Depth of `<Modules>`, `<Module>` and its fields below the document root.
const MODULES_DEPTH: usize = 2;
const MODULE_DEPTH: usize = 3;
const FIELD_DEPTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Caption,
    Memory,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"Caption" => Some(Field::Caption),
            b"Memory" => Some(Field::Memory),
            _ => None,
        }
    }
}

/// A field whose text is being collected. `open` until the first child
/// element starts; text after that is not part of the value.
struct Capture {
    field: Field,
    depth: usize,
    open: bool,
}

#[derive(Debug, Default)]
struct ModuleElement {
    module_type: Option<String>,
    address: Option<String>,
    caption: Option<String>,
    memory: Option<String>,
}

fn attribute<R>(
    start: &BytesStart,
    name: &[u8],
    reader: &Reader<R>,
) -> Result<Option<String>, quick_xml::Error> {
    match start.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.decode_and_unescape_value(reader)?.into_owned())),
        None => Ok(None),
    }
}

impl ModuleElement {
    fn from_start<R>(start: &BytesStart, reader: &Reader<R>) -> Result<Self, quick_xml::Error> {
        Ok(Self {
            module_type: attribute(start, b"type", reader)?,
            address: attribute(start, b"address", reader)?,
            ..Self::default()
        })
    }

    fn field_mut(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Caption => &mut self.caption,
            Field::Memory => &mut self.memory,
        }
    }

    fn to_record(&self) -> ModuleRecord {
        let record = ModuleRecord::decode(
            self.module_type.as_deref(),
            self.address.as_deref(),
            self.caption.as_deref(),
            self.memory.as_deref(),
        );
        if record.has_field_errors() {
            warn!(
                module_type = %record.module_type,
                address = self.address.as_deref().unwrap_or_default(),
                snapshot = %record.snapshot.to_ascii(),
                "module has undecodable fields"
            );
        }
        record
    }
}

/// Walk the whole document, returning the modules of the first `<Modules>`
/// container, or `None` when the root has no such child.
fn read_modules<R: BufRead>(
    reader: &mut Reader<R>,
) -> Result<Option<Vec<ModuleElement>>, quick_xml::Error> {
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut root_seen = false;
    let mut modules: Option<Vec<ModuleElement>> = None;
    let mut in_modules = false;
    let mut current: Option<ModuleElement> = None;
    let mut capture: Option<Capture> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                if depth == 0 {
                    if root_seen {
                        return Err(quick_xml::Error::UnexpectedToken(
                            "second root element".to_string(),
                        ));
                    }
                    root_seen = true;
                }
                depth += 1;

                if let Some(c) = capture.as_mut() {
                    c.open = false;
                }

                let name = start.name();
                match depth {
                    MODULES_DEPTH if modules.is_none() && name.as_ref() == b"Modules" => {
                        modules = Some(Vec::new());
                        in_modules = true;
                    }
                    MODULE_DEPTH if in_modules && name.as_ref() == b"Module" => {
                        current = Some(ModuleElement::from_start(&start, reader)?);
                    }
                    FIELD_DEPTH => {
                        if let Some(module) = current.as_mut()
                            && let Some(field) = Field::from_tag(name.as_ref())
                        {
                            let slot = module.field_mut(field);
                            if slot.is_none() {
                                *slot = Some(String::new());
                                capture = Some(Capture {
                                    field,
                                    depth,
                                    open: true,
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::End(_) => {
                if capture.as_ref().is_some_and(|c| c.depth == depth) {
                    capture = None;
                }
                match depth {
                    MODULE_DEPTH => {
                        if let (Some(module), Some(list)) = (current.take(), modules.as_mut()) {
                            list.push(module);
                        }
                    }
                    MODULES_DEPTH => in_modules = false,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) => {
                if let Some(c) = capture.as_ref()
                    && c.open
                    && c.depth == depth
                    && let Some(module) = current.as_mut()
                {
                    let value = text.unescape()?;
                    if let Some(slot) = module.field_mut(c.field) {
                        slot.push_str(&value);
                    }
                } else if depth == 0 && text.iter().any(|b| !b.is_ascii_whitespace()) {
                    return Err(quick_xml::Error::UnexpectedToken(
                        "text outside the root element".to_string(),
                    ));
                }
            }
            Event::CData(cdata) => {
                if let Some(c) = capture.as_ref()
                    && c.open
                    && c.depth == depth
                    && let Some(module) = current.as_mut()
                {
                    let value = reader.decoder().decode(&cdata)?;
                    if let Some(slot) = module.field_mut(c.field) {
                        slot.push_str(&value);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !root_seen || depth != 0 {
        return Err(quick_xml::Error::UnexpectedEof(
            "document ended before the root element was closed".to_string(),
        ));
    }
    Ok(modules)
}

/// Parse a project document into module records, in document order.
///
/// Accepts raw bytes so that documents declaring a non-UTF-8 encoding are
/// decoded per their declaration.
pub fn parse_project(xml: impl AsRef<[u8]>) -> Result<Vec<ModuleRecord>, PipelineError> {
    let xml = xml.as_ref();
    let xml = xml.strip_prefix(UTF8_BOM).unwrap_or(xml);

    let mut reader = Reader::from_reader(xml);
    reader.expand_empty_elements(true);

    let modules = read_modules(&mut reader)?.ok_or(PipelineError::MissingModules)?;
    Ok(modules.iter().map(ModuleElement::to_record).collect())
}

/// Read and parse the project document at `path`.
pub fn load_project(path: &Path) -> Result<Vec<ModuleRecord>, PipelineError> {
    info!(path = %path.display(), "reading XML");
    let xml = fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => PipelineError::InputNotFound(path.to_path_buf()),
        _ => PipelineError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let records = parse_project(&xml)?;
    info!(modules = records.len(), "parsed project");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{Address, Snapshot};
    use crate::record::NO_CAPTION;

    #[test]
    fn test_parse_two_modules() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<Project>
  <Modules>
    <Module type="VMB4RYLD" address="1A,0B">
      <Caption>Kitchen &amp; hall</Caption>
      <Memory>48656C6C6F</Memory>
    </Module>
    <Module type="VMBGPOD" address="2C" />
  </Modules>
</Project>"#;
        let records = parse_project(xml).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].module_type, "VMB4RYLD");
        assert_eq!(records[0].address.to_string(), "26,11");
        assert_eq!(records[0].name, "Kitchen & hall");
        assert_eq!(records[0].snapshot.to_ascii(), "Hello");

        assert_eq!(records[1].module_type, "VMBGPOD");
        assert_eq!(records[1].address.to_string(), "44");
        assert_eq!(records[1].name, NO_CAPTION);
        assert_eq!(records[1].snapshot, Snapshot::Absent);
    }

    #[test]
    fn test_unknown_elements_ignored() {
        let xml = r#"<Project version="3">
  <Settings><Language>nl</Language></Settings>
  <Modules>
    <Module type="VMB1TS" address="05" build="1234">
      <Channels><Channel index="1">Temp</Channel></Channels>
      <Caption>Living</Caption>
    </Module>
  </Modules>
</Project>"#;
        let records = parse_project(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Living");
        assert_eq!(records[0].address.to_string(), "5");
    }

    #[test]
    fn test_repeated_fields_keep_first() {
        let xml = r#"<Project><Modules>
    <Module type="VMB4RYLD" address="01">
      <Caption>First</Caption>
      <Memory>4142</Memory>
      <Caption>Second</Caption>
      <Memory>4344</Memory>
    </Module>
</Modules></Project>"#;
        let records = parse_project(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "First");
        assert_eq!(records[0].snapshot.to_ascii(), "AB");
    }

    #[test]
    fn test_empty_first_caption_wins() {
        let xml = r#"<Project><Modules>
    <Module type="A" address="01"><Caption/><Caption>Later</Caption></Module>
</Modules></Project>"#;
        let records = parse_project(xml).unwrap();
        assert_eq!(records[0].name, NO_CAPTION);
    }

    #[test]
    fn test_inline_markup_keeps_leading_text() {
        let xml = r#"<Project><Modules>
    <Module type="VMBGP4" address="02">
      <Caption>Garage <b>door</b> left</Caption>
    </Module>
</Modules></Project>"#;
        let records = parse_project(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Garage");
    }

    #[test]
    fn test_cdata_and_comments_in_caption() {
        let xml = r#"<Project><Modules>
    <Module type="A" address="01"><Caption>Hall<!-- note --><![CDATA[ & stairs]]></Caption></Module>
</Modules></Project>"#;
        let records = parse_project(xml).unwrap();
        assert_eq!(records[0].name, "Hall & stairs");
    }

    #[test]
    fn test_second_modules_container_ignored() {
        let xml = r#"<Project>
  <Modules><Module type="A" address="01"><Caption>One</Caption></Module></Modules>
  <Modules><Module type="B" address="02"><Caption>Two</Caption></Module></Modules>
</Project>"#;
        let records = parse_project(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module_type, "A");
    }

    #[test]
    fn test_nested_modules_not_direct_child_ignored() {
        let xml = r#"<Project>
  <Backup><Modules><Module type="OLD" address="09"/></Modules></Backup>
  <Modules><Module type="NEW" address="0A"/></Modules>
</Project>"#;
        let records = parse_project(xml).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].module_type, "NEW");
    }

    #[test]
    fn test_latin1_declaration_decoded() {
        let xml: &[u8] = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n\
<Project><Modules><Module type=\"VMB1TS\" address=\"01\"><Caption>Caf\xe9</Caption></Module></Modules></Project>";
        let records = parse_project(xml).unwrap();
        assert_eq!(records[0].name, "Café");
    }

    #[test]
    fn test_utf8_bom_accepted() {
        let xml = "\u{feff}<Project><Modules><Module type=\"A\" address=\"01\"/></Modules></Project>";
        assert_eq!(parse_project(xml).unwrap().len(), 1);
    }

    #[test]
    fn test_empty_modules_container() {
        let records = parse_project("<Project><Modules/></Project>").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_modules_container() {
        let err = parse_project("<Project><Other/></Project>").unwrap_err();
        assert!(matches!(err, PipelineError::MissingModules));
    }

    #[test]
    fn test_malformed_xml() {
        let err = parse_project("<Project><Modules></Project>").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedXml(_)));
    }

    #[test]
    fn test_unclosed_document_is_malformed() {
        let err = parse_project("<Project><Modules>").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedXml(_)));
        let err = parse_project("").unwrap_err();
        assert!(matches!(err, PipelineError::MalformedXml(_)));
    }

    #[test]
    fn test_bad_fields_are_not_fatal() {
        let xml = r#"<Project><Modules>
    <Module type="VMB4RYLD" address="GG"><Memory>ABC</Memory></Module>
</Modules></Project>"#;
        let records = parse_project(xml).unwrap();
        assert_eq!(records[0].address, Address::Invalid);
        assert_eq!(records[0].snapshot, Snapshot::OddLength(3));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_project(&dir.path().join("absent.vlp")).unwrap_err();
        assert!(matches!(err, PipelineError::InputNotFound(_)));
    }
}
