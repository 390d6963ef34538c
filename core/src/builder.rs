//! # Streaming Object Builders
//!
//! Builds typed values straight from a forward-only stream of markup events, without
//! materializing a document tree.
//!
//! An [`ElementDecoder`] handles exactly one element. It creates its target through a
//! factory and fills it from three kinds of handlers:
//!
//! * **attribute binders**: `name="value"` pairs on the element's own start tag;
//! * **leaf binders**: text-only children such as `<title>Some text</title>`;
//! * **child decoders**: nested elements decoded by another `ElementDecoder`, whose
//!   result is handed to a combiner together with the parent.
//!
//! Decoders are composed bottom-up, each parent owning the decoders of its children.
//! Only the chain of elements currently open is alive while decoding, so memory grows
//! with nesting depth, not with document size.
//!
//! Elements without a handler are skipped with their whole subtree. An optional
//! missing-element handler on the outermost decoder sees every skipped start tag,
//! including those skipped by nested decoders.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::str::{FromStr, Utf8Error};

use quick_xml::events::attributes::AttrError;
use thiserror::Error;

pub mod event;

use event::{EventSource, StartTag, XmlEvent};

pub type Binder<T> = Box<dyn Fn(&mut T, &str) + Send + Sync>;

/// Diagnostic hook for elements no decoder handles.
pub type MissingElementHandler = dyn Fn(&StartTag) + Send + Sync;

type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed markup near byte {position}: {source}")]
    Markup {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
    #[error("malformed attribute near byte {position}: {source}")]
    Attribute {
        position: u64,
        #[source]
        source: AttrError,
    },
    #[error("markup is not valid UTF-8: {0}")]
    Encoding(#[from] Utf8Error),
    #[error("document ended inside <{element}>")]
    UnexpectedEnd { element: String },
}

/// Parses `value`, falling back to `default` when it is not a valid `V`.
///
/// Binders use this for numeric fields, so a bad number never aborts a decode.
pub fn parse_or<V: FromStr>(value: &str, default: V) -> V {
    value.trim().parse().unwrap_or(default)
}

/// Decodes one element into a `T`.
pub struct ElementDecoder<T> {
    tag: String,
    factory: Factory<T>,
    attributes: HashMap<String, Binder<T>>,
    leaves: HashMap<String, Binder<T>>,
    children: HashMap<String, Box<dyn ChildDecoder<T>>>,
    character_data: Option<Binder<T>>,
    missing_element: Option<Box<MissingElementHandler>>,
}

impl<T: 'static> ElementDecoder<T> {
    pub fn new(tag: impl Into<String>, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            tag: tag.into(),
            factory: Box::new(factory),
            attributes: HashMap::new(),
            leaves: HashMap::new(),
            children: HashMap::new(),
            character_data: None,
            missing_element: None,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Binds the attribute `name` of this element.
    pub fn attribute(
        mut self,
        name: impl Into<String>,
        bind: impl Fn(&mut T, &str) + Send + Sync + 'static,
    ) -> Self {
        self.attributes.insert(name.into(), Box::new(bind));
        self
    }

    /// Binds the text of a child element that carries nothing but text.
    ///
    /// Should such a child contain nested elements after all, they are skipped and the
    /// binder receives an empty string.
    pub fn leaf(
        mut self,
        tag: impl Into<String>,
        bind: impl Fn(&mut T, &str) + Send + Sync + 'static,
    ) -> Self {
        self.leaves.insert(tag.into(), Box::new(bind));
        self
    }

    /// Decodes children tagged like `decoder` and merges each result with `combine`.
    pub fn child<C: 'static>(
        mut self,
        decoder: ElementDecoder<C>,
        combine: impl Fn(&mut T, C) + Send + Sync + 'static,
    ) -> Self {
        let tag = decoder.tag.clone();
        let nested = Nested { decoder, combine };
        self.children.insert(tag, Box::new(nested));
        self
    }

    /// Binds text found directly inside this element.
    ///
    /// The element counts as complete once that text is read: anything between the
    /// text and the end tag is skipped.
    pub fn character_data(mut self, bind: impl Fn(&mut T, &str) + Send + Sync + 'static) -> Self {
        self.character_data = Some(Box::new(bind));
        self
    }

    /// Reports elements skipped while this decoder is the outermost one.
    ///
    /// Handlers set on nested decoders are not consulted; the outermost handler is
    /// passed down instead.
    pub fn on_missing_element(
        mut self,
        handler: impl Fn(&StartTag) + Send + Sync + 'static,
    ) -> Self {
        self.missing_element = Some(Box::new(handler));
        self
    }

    /// Decodes the element opened by `start`, consuming events up to its end tag.
    pub fn decode(&self, events: &mut dyn EventSource, start: &StartTag) -> Result<T, DecodeError> {
        self.decode_with(events, start, self.missing_element.as_deref())
    }

    pub fn decode_with(
        &self,
        events: &mut dyn EventSource,
        start: &StartTag,
        missing: Option<&MissingElementHandler>,
    ) -> Result<T, DecodeError> {
        let mut target = (self.factory)();

        for (name, value) in start.attributes() {
            if let Some(bind) = self.attributes.get(name) {
                bind(&mut target, value);
            }
        }

        loop {
            match events.next_event()? {
                XmlEvent::Start(child) => self.decode_child(&mut target, events, &child, missing)?,
                XmlEvent::Text(text) | XmlEvent::CData(text) => {
                    let Some(bind) = &self.character_data else {
                        continue;
                    };
                    let (text, next) = collect_text(events, text)?;
                    bind(&mut target, &text);
                    close_after_text(events, next, start, missing)?;
                    return Ok(target);
                }
                XmlEvent::End(_) => return Ok(target),
                XmlEvent::EndDocument => return Err(unexpected_end(start)),
                XmlEvent::StartDocument => {}
            }
        }
    }

    fn decode_child(
        &self,
        target: &mut T,
        events: &mut dyn EventSource,
        child: &StartTag,
        missing: Option<&MissingElementHandler>,
    ) -> Result<(), DecodeError> {
        if let Some(nested) = self.children.get(child.name()) {
            return nested.decode_into(target, events, child, missing);
        }

        if let Some(bind) = self.leaves.get(child.name()) {
            let (text, next) = collect_text(events, String::new())?;
            let text_only = close_after_text(events, next, child, missing)?;
            bind(target, if text_only { text.as_str() } else { "" });
            return Ok(());
        }

        skip_element(events, child, missing)
    }
}

/// Decodes a whole document, starting at its root element.
pub struct DocumentDecoder<T> {
    root_tag: Option<String>,
    root: ElementDecoder<T>,
}

impl<T: 'static> DocumentDecoder<T> {
    /// Starts decoding at the first element tagged like `root`.
    pub fn new(root: ElementDecoder<T>) -> Self {
        Self {
            root_tag: Some(root.tag.clone()),
            root,
        }
    }

    /// Starts decoding at the first element, whatever its tag.
    pub fn first_element(root: ElementDecoder<T>) -> Self {
        Self {
            root_tag: None,
            root,
        }
    }

    pub fn on_missing_element(
        self,
        handler: impl Fn(&StartTag) + Send + Sync + 'static,
    ) -> Self {
        Self {
            root_tag: self.root_tag,
            root: self.root.on_missing_element(handler),
        }
    }

    /// Scans forward to the root element and decodes it.
    ///
    /// Returns `Ok(None)` when the document ends without a matching element.
    pub fn decode_document(&self, events: &mut dyn EventSource) -> Result<Option<T>, DecodeError> {
        loop {
            match events.next_event()? {
                XmlEvent::Start(start) if self.is_root(&start) => {
                    return self.root.decode(events, &start).map(Some);
                }
                XmlEvent::EndDocument => return Ok(None),
                _ => {}
            }
        }
    }

    fn is_root(&self, start: &StartTag) -> bool {
        self.root_tag
            .as_deref()
            .is_none_or(|tag| tag == start.name())
    }
}

/// A nested decoder with its parent type erased down to `T`.
trait ChildDecoder<T>: Send + Sync {
    fn decode_into(
        &self,
        parent: &mut T,
        events: &mut dyn EventSource,
        start: &StartTag,
        missing: Option<&MissingElementHandler>,
    ) -> Result<(), DecodeError>;
}

struct Nested<C, F> {
    decoder: ElementDecoder<C>,
    combine: F,
}

impl<T, C, F> ChildDecoder<T> for Nested<C, F>
where
    C: 'static,
    F: Fn(&mut T, C) + Send + Sync,
{
    fn decode_into(
        &self,
        parent: &mut T,
        events: &mut dyn EventSource,
        start: &StartTag,
        missing: Option<&MissingElementHandler>,
    ) -> Result<(), DecodeError> {
        let child = self.decoder.decode_with(events, start, missing)?;
        (self.combine)(parent, child);
        Ok(())
    }
}

/// Appends consecutive text and CDATA events to `text`.
///
/// Returns the text together with the first event that is not text.
fn collect_text(
    events: &mut dyn EventSource,
    mut text: String,
) -> Result<(String, XmlEvent), DecodeError> {
    loop {
        match events.next_event()? {
            XmlEvent::Text(more) | XmlEvent::CData(more) => text.push_str(&more),
            other => return Ok((text, other)),
        }
    }
}

/// Finishes `element` after its text was read; `next` is the event that followed it.
///
/// Returns `true` when the element ended right after the text.
fn close_after_text(
    events: &mut dyn EventSource,
    next: XmlEvent,
    element: &StartTag,
    missing: Option<&MissingElementHandler>,
) -> Result<bool, DecodeError> {
    match next {
        XmlEvent::End(_) => Ok(true),
        XmlEvent::Start(nested) => {
            skip_element(events, &nested, missing)?;
            skip_remaining(events, element, missing)?;
            Ok(false)
        }
        _ => Err(unexpected_end(element)),
    }
}

/// Skips `element` and its subtree, reporting each start tag to `missing`.
fn skip_element(
    events: &mut dyn EventSource,
    element: &StartTag,
    missing: Option<&MissingElementHandler>,
) -> Result<(), DecodeError> {
    if let Some(report) = missing {
        report(element);
    }
    skip_remaining(events, element, missing)
}

/// Consumes events up to and including the end tag of the already opened `element`.
fn skip_remaining(
    events: &mut dyn EventSource,
    element: &StartTag,
    missing: Option<&MissingElementHandler>,
) -> Result<(), DecodeError> {
    let mut depth = 0usize;
    loop {
        match events.next_event()? {
            XmlEvent::Start(nested) => {
                if let Some(report) = missing {
                    report(&nested);
                }
                depth += 1;
            }
            XmlEvent::End(_) if depth == 0 => return Ok(()),
            XmlEvent::End(_) => depth -= 1,
            XmlEvent::EndDocument => return Err(unexpected_end(element)),
            _ => {}
        }
    }
}

fn unexpected_end(element: &StartTag) -> DecodeError {
    DecodeError::UnexpectedEnd {
        element: element.name().to_owned(),
    }
}
