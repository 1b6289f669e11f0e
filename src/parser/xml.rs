//! XML token source on top of `quick-xml`.
//!
//! Event payloads are sliced straight out of the source between reader
//! positions, so text reaches the handler byte-for-byte as written.

use quick_xml::{Reader, events::Event};

use super::{MarkupHandler, ParseError};
use crate::markup::{Attribute, Attributes, LineIndex, MarkupParsingContext, Tag};

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlParser;

impl XmlParser {
    pub const fn new() -> Self {
        Self
    }

    #[allow(clippy::cast_possible_truncation)] // Positions never exceed the source length
    pub fn parse<H: MarkupHandler + ?Sized>(
        &self,
        source: &str,
        handler: &mut H,
    ) -> Result<(), ParseError> {
        let lines = LineIndex::new(source);
        let context = |start: usize, end: usize| {
            MarkupParsingContext::new(source, lines.coordinates(start), start, end - start)
        };
        let error = |message: String, at: usize| {
            let at = at.min(source.len());
            ParseError::new(message, lines.coordinates(at), at)
        };

        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text(false);
        reader.config_mut().expand_empty_elements = false;
        reader.config_mut().check_end_names = true;

        let mut open: Vec<(String, usize)> = Vec::new();
        let mut text_start: Option<usize> = None;

        loop {
            let start = reader.buffer_position() as usize;
            let event = reader
                .read_event()
                .map_err(|e| error(e.to_string(), reader.error_position() as usize))?;
            let end = reader.buffer_position() as usize;

            if matches!(event, Event::Text(_) | Event::GeneralRef(_)) {
                text_start.get_or_insert(start);
                continue;
            }
            if let Some(text_start) = text_start.take() {
                handler.text(&context(text_start, start), &source[text_start..start]);
            }

            let raw = &source[start..end];
            let ctx = context(start, end);
            match event {
                Event::Start(ref e) | Event::Empty(ref e) => {
                    let self_closing = matches!(event, Event::Empty(_));
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    let lower = name.to_ascii_lowercase();

                    let mut attributes = Attributes::new();
                    for attr in e.attributes() {
                        let attr = attr.map_err(|err| error(err.to_string(), start))?;
                        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                        let value = String::from_utf8_lossy(&attr.value).into_owned();
                        let key_offset = raw[name.len() + 1..]
                            .find(key.as_str())
                            .map_or(start, |i| start + name.len() + 1 + i);
                        let value_offset = source[key_offset..end]
                            .find(['"', '\''])
                            .map_or(key_offset, |i| key_offset + i + 1);
                        attributes.push(
                            Attribute::new(&lower, key, Some(value)).with_coordinates(
                                lines.coordinates(key_offset),
                                lines.coordinates(value_offset),
                            ),
                        );
                    }

                    if !self_closing {
                        open.push((name.clone(), start));
                    }
                    handler.start_tag(&ctx, Tag::new(name, attributes, self_closing));
                }
                Event::End(ref e) => {
                    open.pop();
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    handler.end_tag(&ctx, Tag::end(name));
                }
                Event::CData(_) => {
                    let body = raw
                        .strip_prefix("<![CDATA[")
                        .and_then(|s| s.strip_suffix("]]>"))
                        .unwrap_or(raw);
                    handler.cdata(&ctx, body);
                }
                Event::Comment(_) => {
                    let body = raw
                        .strip_prefix("<!--")
                        .and_then(|s| s.strip_suffix("-->"))
                        .unwrap_or(raw);
                    handler.comment(&ctx, body);
                }
                Event::Decl(_) => handler.xml_declaration(&ctx, raw),
                Event::PI(_) => handler.processing_instruction(&ctx, raw),
                Event::DocType(_) => handler.doctype(&ctx, raw),
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some((name, at)) = open.pop() {
            return Err(error(format!("Unclosed element <{name}>"), at));
        }
        Ok(())
    }
}
