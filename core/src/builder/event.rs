//! Forward-only markup events.
//!
//! [`XmlEventReader`] adapts a `quick-xml` pull reader to the small event vocabulary the
//! decoders understand. Self-closing tags are reported as a start followed by an end,
//! declarations, comments and processing instructions are dropped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::DecodeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    StartDocument,
    Start(StartTag),
    Text(String),
    CData(String),
    End(String),
    /// Reported once the input is exhausted, and on every call after that.
    EndDocument,
}

/// An element start: local name plus attributes in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StartTag {
    name: String,
    attributes: Vec<(String, String)>,
}

impl StartTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .find_map(|(key, value)| (key == name).then_some(value))
    }
}

/// A source of markup events consumed strictly front to back.
pub trait EventSource {
    fn next_event(&mut self) -> Result<XmlEvent, DecodeError>;
}

pub struct XmlEventReader<R> {
    reader: Reader<R>,
    buf: Vec<u8>,
    pending_end: Option<String>,
    started: bool,
    finished: bool,
}

impl XmlEventReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, DecodeError> {
        let file = File::open(path).map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<'a> XmlEventReader<&'a [u8]> {
    pub fn from_xml(xml: &'a str) -> Self {
        Self::new(xml.as_bytes())
    }
}

impl<R: BufRead> XmlEventReader<R> {
    pub fn new(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            buf: Vec::new(),
            pending_end: None,
            started: false,
            finished: false,
        }
    }
}

impl<R: BufRead> EventSource for XmlEventReader<R> {
    fn next_event(&mut self) -> Result<XmlEvent, DecodeError> {
        if !self.started {
            self.started = true;
            return Ok(XmlEvent::StartDocument);
        }
        if let Some(name) = self.pending_end.take() {
            return Ok(XmlEvent::End(name));
        }
        if self.finished {
            return Ok(XmlEvent::EndDocument);
        }

        loop {
            self.buf.clear();
            let position = self.reader.buffer_position() as u64;
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .map_err(|source| DecodeError::Markup { position, source })?;

            match event {
                Event::Start(start) => return Ok(XmlEvent::Start(start_tag(&start, position)?)),
                Event::Empty(start) => {
                    let tag = start_tag(&start, position)?;
                    self.pending_end = Some(tag.name.clone());
                    return Ok(XmlEvent::Start(tag));
                }
                Event::End(end) => {
                    let name = std::str::from_utf8(end.local_name().as_ref())?.to_owned();
                    return Ok(XmlEvent::End(name));
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|source| DecodeError::Markup { position, source })?;
                    return Ok(XmlEvent::Text(text.into_owned()));
                }
                Event::CData(data) => {
                    let data = data.into_inner();
                    return Ok(XmlEvent::CData(std::str::from_utf8(&data)?.to_owned()));
                }
                Event::Eof => {
                    self.finished = true;
                    return Ok(XmlEvent::EndDocument);
                }
                _ => continue,
            }
        }
    }
}

fn start_tag(start: &BytesStart<'_>, position: u64) -> Result<StartTag, DecodeError> {
    let mut tag = StartTag::new(std::str::from_utf8(start.local_name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr.map_err(|source| DecodeError::Attribute { position, source })?;
        let key = std::str::from_utf8(attr.key.local_name().as_ref())?.to_owned();
        let value = attr
            .unescape_value()
            .map_err(|source| DecodeError::Markup { position, source })?;
        tag.attributes.push((key, value.into_owned()));
    }
    Ok(tag)
}
