mod atom;
mod rss;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::models::Feed;
use crate::FeedError;

pub use atom::parse_atom;
pub use rss::parse_rss;

/// Parse a syndication document from raw XML bytes.
///
/// The format is decided by the document's root element: `<rss>` (or a bare
/// `<channel>`) parses as RSS 2.0, `<feed>` as Atom.
pub fn parse_feed(xml: &[u8]) -> Result<Feed, FeedError> {
    match sniff_root(xml)? {
        Format::Rss => parse_rss(xml),
        Format::Atom => parse_atom(xml),
    }
}

enum Format {
    Rss,
    Atom,
}

fn sniff_root(xml: &[u8]) -> Result<Format, FeedError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                // Root element names carry no namespace prefix in practice;
                // strip one if present (e.g. `<atom:feed>`).
                let name = e.name();
                let local = name
                    .as_ref()
                    .rsplit(|&b| b == b':')
                    .next()
                    .unwrap_or_default();
                return match local {
                    b"rss" | b"channel" => Ok(Format::Rss),
                    b"feed" => Ok(Format::Atom),
                    other => Err(FeedError::Parse(format!(
                        "unknown root element <{}>",
                        String::from_utf8_lossy(other)
                    ))),
                };
            }
            Ok(Event::Eof) => return Err(FeedError::Parse("empty document".to_string())),
            Err(e) => return Err(FeedError::Parse(format!("XML parse error: {}", e))),
            _ => {}
        }
        buf.clear();
    }
}
