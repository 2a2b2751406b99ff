use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::models::{Entry, Feed};
use crate::FeedError;

/// Parse an RSS 2.0 document from raw XML bytes
pub fn parse_rss(xml: &[u8]) -> Result<Feed, FeedError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut feed_title = String::new();
    let mut entries = Vec::new();
    let mut buf = Vec::new();

    let mut current_entry: Option<EntryBuilder> = None;
    let mut current_element = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                current_element = name.clone();

                if name == "item" {
                    current_entry = Some(EntryBuilder::default());
                }
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();

                if name == "item" {
                    if let Some(builder) = current_entry.take() {
                        if let Some(entry) = builder.build() {
                            entries.push(entry);
                        }
                    }
                }
                current_element.clear();
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                if !text.is_empty() {
                    handle_text(&mut current_entry, &current_element, &mut feed_title, text);
                }
            }
            Ok(Event::CData(e)) => {
                // Descriptions are commonly wrapped in CDATA.
                let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                if !text.is_empty() {
                    handle_text(&mut current_entry, &current_element, &mut feed_title, text);
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
    feed_title: &mut String,
    text: String,
) {
    match current_entry {
        Some(entry) => match current_element {
            "title" => entry.title = Some(text),
            "link" => entry.link = Some(text),
            "description" => entry.summary = Some(text),
            // <author> carries an email address in strict RSS; dc:creator
            // carries the display name. Either serves as the author here.
            "author" | "dc:creator" => entry.author = Some(text),
            _ => {}
        },
        None => {
            // The first channel-level <title>; later ones (e.g. inside
            // <image>) are ignored.
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
    author: Option<String>,
}

impl EntryBuilder {
    fn build(self) -> Option<Entry> {
        Some(Entry {
            title: self.title.unwrap_or_default(),
            link: self.link?,
            summary: self.summary.unwrap_or_default(),
            author: self.author,
        })
    }
}
