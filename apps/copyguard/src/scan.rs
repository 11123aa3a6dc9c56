//! Settings scanner over a descriptor's element tree.
//!
//! Streams the document with `quick-xml`, keeping a stack of the `Include`
//! attribute of every open element so the parent of a matching setting is
//! known when its value is complete. Names match exactly; values match
//! case-insensitively after trimming surrounding whitespace.

use crate::descriptor::Descriptor;
use crate::error::{ProjectError, Result};
use crate::models::Occurrence;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const INCLUDE_ATTR: &str = "Include";

/// Setting element name and the value that makes it an offender.
#[derive(Debug, Clone)]
pub struct Target {
    pub element: String,
    pub offending: String,
}

impl Target {
    pub fn new(element: impl Into<String>, offending: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            offending: offending.into(),
        }
    }

    fn matches(&self, value: &str) -> bool {
        value.trim().eq_ignore_ascii_case(&self.offending)
    }
}

struct Capture {
    depth: usize,
    include: Option<String>,
    value: String,
}

/// Find every offending occurrence of `target` in document order.
pub fn scan(d: &Descriptor, target: &Target) -> Result<Vec<Occurrence>> {
    if d.is_blank() {
        return Ok(Vec::new());
    }
    scan_text(&d.text, target).map_err(|reason| ProjectError::ParseFailure {
        path: d.path.clone(),
        reason,
    })
}

/// Scan raw markup. Errors carry a human-readable reason.
pub fn scan_text(text: &str, target: &Target) -> std::result::Result<Vec<Occurrence>, String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(false);
    let name = target.element.as_bytes();

    let mut stack: Vec<Option<String>> = Vec::new();
    let mut capture: Option<Capture> = None;
    let mut saw_root = false;
    let mut out = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                open_element(&mut saw_root, stack.is_empty())?;
                if capture.is_none() && e.name().as_ref() == name {
                    capture = Some(Capture {
                        depth: stack.len(),
                        include: parent_include(&stack),
                        value: String::new(),
                    });
                }
                stack.push(include_of(&e)?);
            }
            Ok(Event::Empty(e)) => {
                open_element(&mut saw_root, stack.is_empty())?;
                if capture.is_none() && e.name().as_ref() == name && target.matches("") {
                    out.push(Occurrence {
                        value: String::new(),
                        include: parent_include(&stack),
                    });
                }
            }
            Ok(Event::End(_)) => {
                stack.pop();
                if let Some(c) = capture.take() {
                    if c.depth == stack.len() {
                        if target.matches(&c.value) {
                            out.push(Occurrence {
                                value: c.value.trim().to_string(),
                                include: c.include,
                            });
                        }
                    } else {
                        capture = Some(c);
                    }
                }
            }
            Ok(Event::Text(t)) => {
                let s = t.unescape().map_err(|e| e.to_string())?;
                if stack.is_empty() && !s.trim().is_empty() {
                    return Err("text outside the root element".to_string());
                }
                if let Some(c) = capture.as_mut() {
                    c.value.push_str(&s);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(c) = capture.as_mut() {
                    let s = std::str::from_utf8(&t).map_err(|e| e.to_string())?;
                    c.value.push_str(s);
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(format!("{} (at byte {})", e, reader.buffer_position()));
            }
        }
    }

    if !stack.is_empty() {
        return Err("unexpected end of document: unclosed element".to_string());
    }
    if !saw_root {
        return Err("document has no root element".to_string());
    }
    Ok(out)
}

fn open_element(saw_root: &mut bool, at_top: bool) -> std::result::Result<(), String> {
    if at_top && *saw_root {
        return Err("document has more than one root element".to_string());
    }
    *saw_root = true;
    Ok(())
}

fn parent_include(stack: &[Option<String>]) -> Option<String> {
    stack.last().cloned().flatten()
}

fn include_of(e: &BytesStart<'_>) -> std::result::Result<Option<String>, String> {
    let attr = e
        .try_get_attribute(INCLUDE_ATTR)
        .map_err(|err| err.to_string())?;
    match attr {
        Some(a) => {
            let v = a.unescape_value().map_err(|err| err.to_string())?;
            Ok(Some(v.to_string()))
        }
        None => Ok(None),
    }
}
