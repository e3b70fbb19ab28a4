//! RSS and Atom feed reading

use crate::AdapterError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One `<item>` (RSS) or `<entry>` (Atom)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Field {
    Title,
    Link,
    Guid,
    Description,
    Published,
}

impl Field {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"title" => Some(Self::Title),
            b"link" => Some(Self::Link),
            b"guid" | b"id" => Some(Self::Guid),
            b"description" | b"content" | b"summary" | b"encoded" => Some(Self::Description),
            b"pubDate" | b"updated" | b"published" => Some(Self::Published),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Draft {
    title: String,
    link: String,
    guid: String,
    description: String,
    published: String,
}

impl Draft {
    fn push(&mut self, field: Field, text: &str) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
            Field::Guid => &mut self.guid,
            Field::Description => &mut self.description,
            Field::Published => &mut self.published,
        };
        slot.push_str(text);
    }

    fn finish(self) -> Option<FeedEntry> {
        let title = self.title.trim().to_string();
        let link = if self.link.trim().is_empty() {
            self.guid.trim().to_string()
        } else {
            self.link.trim().to_string()
        };
        if title.is_empty() || link.is_empty() {
            return None;
        }
        Some(FeedEntry {
            title,
            link,
            description: self.description.trim().to_string(),
            published: self.published.trim().to_string(),
        })
    }
}

/// Reads every RSS `<item>` or Atom `<entry>` that has a title and a link
///
/// The link falls back to an Atom `href` attribute, then to `<guid>`/`<id>`.
/// The first of `description`, `content` or `summary` becomes the
/// description; markup inside it is left for the caller to clean.
pub fn parse_rss(xml: &str) -> Result<Vec<FeedEntry>, AdapterError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut draft: Option<Draft> = None;
    // depth below the current item/entry; 1 means a direct child
    let mut depth = 0usize;
    let mut field: Option<Field> = None;
    let mut filled: Vec<Field> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| AdapterError::Payload {
            adapter: "rss".to_string(),
            message: format!("XML error at {}: {}", reader.buffer_position(), e),
        })?;

        match event {
            Event::Start(start) => {
                let name = start.local_name();
                if draft.is_none() {
                    if matches!(name.as_ref(), b"item" | b"entry") {
                        draft = Some(Draft::default());
                        depth = 0;
                        filled.clear();
                    }
                    continue;
                }
                depth += 1;
                if depth == 1 {
                    field = Field::from_tag(name.as_ref()).filter(|f| {
                        // keep only the first description-like child
                        !(*f == Field::Description && filled.contains(f))
                    });
                    if let (Some(Field::Link), Some(d)) = (field, draft.as_mut()) {
                        push_href(d, &start);
                    }
                }
            }
            Event::Empty(empty) => {
                if depth == 0 {
                    if let (b"link", Some(d)) = (empty.local_name().as_ref(), draft.as_mut()) {
                        push_href(d, &empty);
                    }
                }
            }
            Event::Text(text) => {
                if let (Some(f), Some(d)) = (field, draft.as_mut()) {
                    let text = text.unescape().map_err(|e| AdapterError::Payload {
                        adapter: "rss".to_string(),
                        message: e.to_string(),
                    })?;
                    d.push(f, &text);
                }
            }
            Event::CData(data) => {
                if let (Some(f), Some(d)) = (field, draft.as_mut()) {
                    d.push(f, &String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::End(end) => {
                if draft.is_none() {
                    continue;
                }
                if depth == 0 {
                    if matches!(end.local_name().as_ref(), b"item" | b"entry") {
                        if let Some(entry) = draft.take().and_then(Draft::finish) {
                            entries.push(entry);
                        }
                    }
                    continue;
                }
                if depth == 1 {
                    if let Some(f) = field.take() {
                        filled.push(f);
                    }
                }
                depth -= 1;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

/// Atom links carry the URL in `href`; prefer `rel="alternate"` or no rel
fn push_href(draft: &mut Draft, element: &BytesStart<'_>) {
    if !draft.link.is_empty() {
        return;
    }
    let rel = element
        .try_get_attribute("rel")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()));
    if matches!(rel.as_deref(), Some(r) if r != "alternate") {
        return;
    }
    if let Some(href) = element
        .try_get_attribute("href")
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
    {
        draft.link = href;
    }
}
