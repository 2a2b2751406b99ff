use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::models::{Entry, Feed};
use crate::FeedError;

/// Parse an Atom document from raw XML bytes
pub fn parse_atom(xml: &[u8]) -> Result<Feed, FeedError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut feed_title = String::new();
    let mut entries = Vec::new();
    let mut buf = Vec::new();

    let mut current_entry: Option<EntryBuilder> = None;
    let mut current_element = String::new();
    let mut in_author = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                current_element = name.clone();

                match name.as_str() {
                    "entry" => current_entry = Some(EntryBuilder::default()),
                    "author" => in_author = true,
                    "link" => {
                        if let Some(ref mut entry) = current_entry {
                            entry.take_link(&e);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) => {
                // Atom links are usually self-closing: <link href="..."/>
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                if name == "link" {
                    if let Some(ref mut entry) = current_entry {
                        entry.take_link(&e);
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                match name.as_str() {
                    "entry" => {
                        if let Some(builder) = current_entry.take() {
                            if let Some(entry) = builder.build() {
                                entries.push(entry);
                            }
                        }
                    }
                    "author" => in_author = false,
                    _ => {}
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if !text.is_empty() {
                    handle_text(
                        &mut current_entry,
                        &current_element,
                        in_author,
                        &mut feed_title,
                        text,
                    );
                }
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                if !text.is_empty() {
                    handle_text(
                        &mut current_entry,
                        &current_element,
                        in_author,
                        &mut feed_title,
                        text,
                    );
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(FeedError::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }

    Ok(Feed {
        title: feed_title,
        entries,
    })
}

fn handle_text(
    current_entry: &mut Option<EntryBuilder>,
    current_element: &str,
    in_author: bool,
    feed_title: &mut String,
    text: String,
) {
    match current_entry {
        Some(entry) => match current_element {
            "title" => entry.title = Some(text),
            "summary" => entry.summary = Some(text),
            "content" => entry.content = Some(text),
            "name" if in_author => entry.author = Some(text),
            _ => {}
        },
        None => {
            if current_element == "title" && feed_title.is_empty() {
                *feed_title = text;
            }
        }
    }
}

#[derive(Default)]
struct EntryBuilder {
    title: Option<String>,
    link: Option<String>,
    summary: Option<String>,
    content: Option<String>,
    author: Option<String>,
}

impl EntryBuilder {
    /// Pick the entry link from a `<link>` element's attributes. A missing
    /// `rel` or `rel="alternate"` marks the entry page and always wins;
    /// other relations (self, enclosure) only serve as a fallback.
    fn take_link(&mut self, e: &BytesStart) {
        let mut href = None;
        let mut rel = None;

        for attr in e.attributes().flatten() {
            let value = String::from_utf8_lossy(&attr.value).to_string();
            match attr.key.as_ref() {
                b"href" => href = Some(value),
                b"rel" => rel = Some(value),
                _ => {}
            }
        }

        if let Some(href) = href {
            let alternate = rel.as_deref().is_none_or(|r| r == "alternate");
            if alternate || self.link.is_none() {
                self.link = Some(href);
            }
        }
    }

    fn build(self) -> Option<Entry> {
        Some(Entry {
            title: self.title.unwrap_or_default(),
            link: self.link?,
            // <summary> is preferred; full <content> stands in when the
            // feed omits it.
            summary: self.summary.or(self.content).unwrap_or_default(),
            author: self.author,
        })
    }
}
