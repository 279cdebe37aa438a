// src/services/rss.rs

//! Syndication feed parser.
//!
//! Reads RSS 2.0 (`<item>`), RSS 1.0 and Atom (`<entry>`) documents with a
//! pull parser. A document that is not well-formed XML, or whose root is not
//! a feed, is an error. Individual entries that cannot be turned into a
//! `BillEntry` are skipped so one bad item does not cost the rest.

use chrono::{DateTime, NaiveDate, Utc};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::FetchError;
use crate::models::BillEntry;
use crate::utils::{is_http_url, normalize_whitespace};

/// Title used when an entry carries none.
pub const UNTITLED: &str = "(no title)";

const FEED_ROOTS: [&str; 3] = ["rss", "rdf:RDF", "feed"];

/// Parse a feed document into bill entries, keeping document order.
pub fn parse_feed(xml: &[u8]) -> Result<Vec<BillEntry>, FetchError> {
    let mut reader = Reader::from_reader(xml);

    let mut entries = Vec::new();
    let mut buf = Vec::new();

    let mut saw_root = false;
    let mut depth = 0usize;
    let mut entry_depth = 0usize;
    let mut current_entry: Option<EntryBuilder> = None;
    let mut current_element = String::new();
    let mut field_text = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = element_name(&e);

                if !saw_root {
                    check_root(&name)?;
                    saw_root = true;
                } else if let Some(ref mut entry) = current_entry {
                    if depth == entry_depth + 1 {
                        if name == "link" {
                            entry.take_link_attributes(&e);
                        }
                        current_element = name;
                        field_text.clear();
                    }
                } else if name == "item" || name == "entry" {
                    current_entry = Some(EntryBuilder::default());
                    entry_depth = depth;
                    current_element.clear();
                }
            }
            Ok(Event::Empty(e)) => {
                let name = element_name(&e);

                if !saw_root {
                    check_root(&name)?;
                    saw_root = true;
                } else if let Some(ref mut entry) = current_entry {
                    if depth == entry_depth && name == "link" {
                        entry.take_link_attributes(&e);
                    }
                }
            }
            Ok(Event::End(_)) => {
                if depth == entry_depth + 1 {
                    if let Some(entry) = current_entry.as_mut() {
                        entry.set_field(&current_element, &field_text);
                    }
                    current_element.clear();
                    field_text.clear();
                } else if depth == entry_depth {
                    if let Some(builder) = current_entry.take() {
                        match builder.build() {
                            Some(entry) => entries.push(entry),
                            None => log::debug!(
                                "Skipping feed entry #{} without identifier or link",
                                entries.len() + 1
                            ),
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(e)) => {
                // Only text directly inside a field of the entry counts.
                if current_entry.is_some() && depth == entry_depth + 1 {
                    let text = e
                        .unescape()
                        .map(|t| t.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&e).into_owned());
                    field_text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if current_entry.is_some() && depth == entry_depth + 1 {
                    field_text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FetchError::Parse(format!(
                    "XML parse error at position {}: {}",
                    reader.error_position(),
                    e
                )));
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(FetchError::Parse("document has no root element".to_string()));
    }
    if depth != 0 {
        return Err(FetchError::Parse(format!(
            "unexpected end of document ({} unclosed elements)",
            depth
        )));
    }

    Ok(entries)
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn check_root(name: &str) -> Result<(), FetchError> {
    if FEED_ROOTS.contains(&name) {
        Ok(())
    } else {
        Err(FetchError::Parse(format!(
            "not a syndication feed (root element <{}>)",
            name
        )))
    }
}

fn attribute(e: &BytesStart, key: &str) -> Option<String> {
    e.try_get_attribute(key)
        .ok()
        .flatten()
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Parse the date formats feeds use in practice.
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

#[derive(Default)]
struct EntryBuilder {
    title: String,
    link: String,
    guid: String,
    description: String,
    published: String,
    updated: String,
}

impl EntryBuilder {
    /// Record a completed field. The first non-empty occurrence wins, so an
    /// item carrying both `<pubDate>` and `<dc:date>` keeps the former.
    fn set_field(&mut self, element: &str, text: &str) {
        let field = match element {
            "title" => &mut self.title,
            "link" => &mut self.link,
            "guid" | "id" => &mut self.guid,
            "description" | "summary" => &mut self.description,
            "pubDate" | "published" | "dc:date" => &mut self.published,
            "updated" => &mut self.updated,
            _ => return,
        };
        if field.trim().is_empty() {
            *field = text.to_string();
        }
    }

    /// Atom links live in `href`; only the first alternate link counts.
    fn take_link_attributes(&mut self, e: &BytesStart) {
        if !self.link.trim().is_empty() {
            return;
        }
        let rel = attribute(e, "rel");
        if matches!(rel.as_deref(), None | Some("alternate")) {
            if let Some(href) = attribute(e, "href") {
                self.link = href;
            }
        }
    }

    fn build(self) -> Option<BillEntry> {
        let guid = self.guid.trim();
        let link = self.link.trim();

        let identifier = if !guid.is_empty() { guid } else { link };
        if identifier.is_empty() {
            return None;
        }

        let source_link = if is_http_url(link) {
            link
        } else if is_http_url(guid) {
            guid
        } else {
            return None;
        };

        let title = normalize_whitespace(&self.title);
        let title = if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title
        };

        let published_at =
            parse_feed_date(&self.published).or_else(|| parse_feed_date(&self.updated));

        Some(BillEntry {
            identifier: identifier.to_string(),
            title,
            published_at,
            source_link: source_link.to_string(),
            description: normalize_whitespace(&self.description),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    const RSS_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Congress.gov: Presented to President</title>
    <link>https://www.congress.gov</link>
    <atom:link href="https://www.congress.gov/rss" rel="self" type="application/rss+xml"/>
    <item>
      <title>H.R. 1234 - Clean Water &amp; Rivers Act</title>
      <link>https://www.congress.gov/bill/119th-congress/house-bill/1234</link>
      <guid>https://www.congress.gov/bill/119th-congress/house-bill/1234</guid>
      <pubDate>Tue, 04 Mar 2025 15:00:00 GMT</pubDate>
    </item>
    <item>
      <title><![CDATA[S. 56 - Farm <Security> Act]]></title>
      <link>https://www.congress.gov/bill/119th-congress/senate-bill/56</link>
      <guid isPermaLink="false">119-s-56</guid>
      <pubDate>sometime last week</pubDate>
      <source url="https://example.com/other"><title>Other Feed</title></source>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn test_parse_rss_items() {
        let entries = parse_feed(RSS_FEED.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(
            first.identifier,
            "https://www.congress.gov/bill/119th-congress/house-bill/1234"
        );
        assert_eq!(first.title, "H.R. 1234 - Clean Water & Rivers Act");
        assert_eq!(
            first.published_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 15, 0, 0).unwrap())
        );

        let second = &entries[1];
        assert_eq!(second.identifier, "119-s-56");
        assert_eq!(second.title, "S. 56 - Farm <Security> Act");
        assert_eq!(
            second.source_link,
            "https://www.congress.gov/bill/119th-congress/senate-bill/56"
        );
        assert!(second.published_at.is_none());
    }

    #[test]
    fn test_parse_atom_entries() {
        let feed = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Bills</title>
  <link href="https://example.gov/" rel="alternate"/>
  <entry>
    <id>tag:example.gov,2025:hr-9</id>
    <title type="html">H.R. 9 - Budget Act</title>
    <link rel="self" href="https://example.gov/api/hr9"/>
    <link href="https://example.gov/bills/hr9"/>
    <updated>2025-01-10T09:30:00Z</updated>
    <author><name>Rep. Smith</name></author>
  </entry>
</feed>"#;

        let entries = parse_feed(feed.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].identifier, "tag:example.gov,2025:hr-9");
        assert_eq!(entries[0].source_link, "https://example.gov/bills/hr9");
        assert_eq!(entries[0].title, "H.R. 9 - Budget Act");
        assert_eq!(entries[0].published_at.map(|d| d.day()), Some(10));
    }

    #[test]
    fn test_entries_without_identifier_are_dropped() {
        let feed = r#"<rss><channel>
            <item><title>H.R. 1 - No identifier at all</title></item>
            <item><title>H.R. 2</title><link>https://example.gov/hr2</link></item>
        </channel></rss>"#;

        let entries = parse_feed(feed.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].identifier, "https://example.gov/hr2");
    }

    #[test]
    fn test_guid_without_link_needs_url_guid() {
        let feed = r#"<rss><channel>
            <item><title>Opaque</title><guid>119-hr-3</guid></item>
            <item><title>Permalink</title><guid>https://example.gov/hr4</guid></item>
        </channel></rss>"#;

        let entries = parse_feed(feed.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_link, "https://example.gov/hr4");
    }

    #[test]
    fn test_missing_title_gets_placeholder() {
        let feed = r#"<rss><channel>
            <item><link>https://example.gov/hr5</link></item>
        </channel></rss>"#;

        let entries = parse_feed(feed.as_bytes()).unwrap();
        assert_eq!(entries[0].title, UNTITLED);
    }

    #[test]
    fn test_malformed_document_is_error() {
        let result = parse_feed(b"<rss><channel><item><title>oops</channel></rss>");
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_truncated_document_is_error() {
        let feed = r#"<rss><channel>
            <item><title>H.R. 1</title><link>https://example.gov/hr1</link></item>
            <item><title>H.R. 2</title><link>https://example.gov/hr2</link>"#;

        let result = parse_feed(feed.as_bytes());
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_first_of_repeated_fields_wins() {
        let feed = r#"<rss xmlns:dc="http://purl.org/dc/elements/1.1/"><channel>
            <item>
              <title>H.R. 7 - Ports Act</title>
              <link>https://example.gov/hr7</link>
              <link>https://example.gov/hr7/text</link>
              <guid>119-hr-7</guid>
              <guid>duplicate-guid</guid>
              <pubDate>Tue, 04 Mar 2025 15:00:00 GMT</pubDate>
              <dc:date>2025-03-05T15:00:00Z</dc:date>
            </item>
        </channel></rss>"#;

        let entries = parse_feed(feed.as_bytes()).unwrap();
        assert_eq!(entries[0].identifier, "119-hr-7");
        assert_eq!(entries[0].source_link, "https://example.gov/hr7");
        assert_eq!(
            entries[0].published_at,
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 15, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_dc_date_alone_is_used() {
        let feed = r#"<rss xmlns:dc="http://purl.org/dc/elements/1.1/"><channel>
            <item>
              <link>https://example.gov/hr8</link>
              <dc:date>2025-03-05T15:00:00Z</dc:date>
            </item>
        </channel></rss>"#;

        let entries = parse_feed(feed.as_bytes()).unwrap();
        assert_eq!(entries[0].published_at.map(|d| d.day()), Some(5));
    }

    #[test]
    fn test_description_is_captured() {
        let feed = r#"<rss><channel>
            <item>
              <title>S. 12 - Rural Clinics Act</title>
              <link>https://example.gov/s12</link>
              <description><![CDATA[Introduced by Sen. Jane Smith.
                Referred to committee.]]></description>
            </item>
        </channel></rss>"#;

        let entries = parse_feed(feed.as_bytes()).unwrap();
        assert_eq!(
            entries[0].description,
            "Introduced by Sen. Jane Smith. Referred to committee."
        );
        assert_eq!(entries[0].sponsor().as_deref(), Some("Sen. Jane Smith"));
    }

    #[test]
    fn test_relative_link_needs_url_guid() {
        let feed = r#"<rss><channel>
            <item><title>Relative</title><link>/bill/hr9</link></item>
            <item><title>Fallback</title><link>/bill/hr10</link><guid>https://example.gov/hr10</guid></item>
        </channel></rss>"#;

        let entries = parse_feed(feed.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_link, "https://example.gov/hr10");
    }

    #[test]
    fn test_non_feed_document_is_error() {
        let result = parse_feed(b"<html><body>Service Unavailable</body></html>");
        assert!(matches!(result, Err(FetchError::Parse(_))));

        let result = parse_feed(b"");
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }

    #[test]
    fn test_empty_channel_is_ok() {
        let entries = parse_feed(b"<rss><channel></channel></rss>").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_parse_feed_date_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 3, 4, 20, 0, 0).unwrap();
        assert_eq!(
            parse_feed_date("Tue, 04 Mar 2025 15:00:00 -0500"),
            Some(expected)
        );
        assert_eq!(parse_feed_date("2025-03-04T20:00:00Z"), Some(expected));
        assert_eq!(
            parse_feed_date("2025-03-04"),
            Some(Utc.with_ymd_and_hms(2025, 3, 4, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_feed_date("not a date"), None);
        assert_eq!(parse_feed_date(""), None);
    }
}
