//! Manual event-based Atom feed parser for the upstream article API.

use chrono::{DateTime, Utc};
use quick_xml::events::Event;

use super::ArxivError;
use crate::models::{AuthorInfo, Paper};

#[derive(Debug, Clone, Default)]
pub struct AtomEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub published: String,
    pub updated: String,
    pub links: Vec<AtomLink>,
    pub authors: Vec<AuthorInfo>,
    pub categories: Vec<String>,
    pub comment: Option<String>,
    pub journal_ref: Option<String>,
    pub doi: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AtomLink {
    pub href: String,
    pub rel: Option<String>,
    pub link_type: Option<String>,
}

impl AtomEntry {
    pub fn arxiv_id(&self) -> String {
        self.id
            .rsplit('/')
            .next()
            .map(|s| s.split('v').next().unwrap_or(s))
            .unwrap_or(&self.id)
            .to_string()
    }

    pub fn pdf_url(&self) -> String {
        self.links
            .iter()
            .find(|l| l.link_type.as_deref() == Some("application/pdf"))
            .map(|l| l.href.clone())
            .unwrap_or_else(|| format!("http://arxiv.org/pdf/{}.pdf", self.arxiv_id()))
    }

    pub fn into_paper(self) -> Result<Paper, ArxivError> {
        let published = DateTime::parse_from_rfc3339(&self.published)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| ArxivError::ParseError(format!("invalid published date: {e}")))?;
        let updated = if self.updated.is_empty() {
            published
        } else {
            DateTime::parse_from_rfc3339(&self.updated)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or(published)
        };

        let primary_category = self.categories.first().cloned().unwrap_or_default();
        let pdf_url = self.pdf_url();

        Ok(Paper {
            paper_id: self.arxiv_id(),
            title: normalize_whitespace(&self.title),
            abstract_text: normalize_whitespace(&self.summary),
            authors: self.authors,
            categories: self.categories,
            primary_category,
            published_at: published,
            updated_at: updated,
            entry_url: self.id,
            pdf_url,
            comment: self.comment,
            journal_ref: self.journal_ref,
            doi: self.doi,
        })
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse a raw Atom XML feed body into entries. An empty feed (zero
/// `<entry>` elements) is a valid, successful result — callers
/// distinguish "no entries on this page" from a hard error.
pub fn parse_feed(xml: &str) -> Result<Vec<AtomEntry>, ArxivError> {
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<AtomEntry> = None;
    let mut field: Option<String> = None;
    let mut buffer = Vec::new();

    loop {
        match reader.read_event_into(&mut buffer) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"entry" => current = Some(AtomEntry::default()),
                b"title" | b"summary" | b"id" | b"published" | b"updated" | b"name"
                | b"arxiv:comment" | b"arxiv:journal_ref" | b"arxiv:doi" => {
                    field = Some(String::from_utf8_lossy(e.name().as_ref()).to_string());
                }
                b"link" => {
                    let mut href = String::new();
                    let mut rel = None;
                    let mut link_type = None;
                    for attr in e.attributes().flatten() {
                        let value = String::from_utf8_lossy(&attr.value).to_string();
                        match attr.key.as_ref() {
                            b"href" => href = value,
                            b"rel" => rel = Some(value),
                            b"type" => link_type = Some(value),
                            _ => {}
                        }
                    }
                    if let Some(entry) = &mut current {
                        entry.links.push(AtomLink { href, rel, link_type });
                    }
                }
                b"category" => {
                    let mut term = String::new();
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"term" {
                            term = String::from_utf8_lossy(&attr.value).to_string();
                        }
                    }
                    if let Some(entry) = &mut current {
                        entry.categories.push(term);
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if let (Some(f), Some(entry)) = (&field, &mut current) {
                    let text = e.unescape().unwrap_or_default().to_string();
                    match f.as_str() {
                        "title" => entry.title = text,
                        "summary" => entry.summary = text,
                        "id" => entry.id = text,
                        "published" => entry.published = text,
                        "updated" => entry.updated = text,
                        "name" => entry.authors.push(AuthorInfo { name: text, affiliation: None }),
                        "arxiv:comment" => entry.comment = Some(text),
                        "arxiv:journal_ref" => entry.journal_ref = Some(text),
                        "arxiv:doi" => entry.doi = Some(text),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"entry" {
                    if let Some(entry) = current.take() {
                        entries.push(entry);
                    }
                }
                field = None;
            }
            Err(e) => return Err(ArxivError::ParseError(format!("xml parsing error: {e}"))),
            _ => {}
        }
        buffer.clear();
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
    <feed xmlns="http://www.w3.org/2005/Atom">
      <entry>
        <id>http://arxiv.org/abs/2301.12345v1</id>
        <title>Mobile   Manipulation</title>
        <summary>A study  of manipulation.</summary>
        <published>2023-01-15T10:30:00Z</published>
        <updated>2023-01-16T00:00:00Z</updated>
        <author><name>Jane Doe</name></author>
        <category term="cs.RO" />
        <link href="http://arxiv.org/pdf/2301.12345v1" rel="related" type="application/pdf" />
      </entry>
    </feed>"#;

    #[test]
    fn parses_single_entry() {
        let entries = parse_feed(SAMPLE).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].arxiv_id(), "2301.12345");
        assert_eq!(entries[0].authors[0].name, "Jane Doe");
    }

    #[test]
    fn empty_feed_is_not_an_error() {
        let entries = parse_feed(r#"<feed xmlns="http://www.w3.org/2005/Atom"></feed>"#).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn into_paper_normalizes_whitespace() {
        let entries = parse_feed(SAMPLE).unwrap();
        let paper = entries.into_iter().next().unwrap().into_paper().unwrap();
        assert_eq!(paper.title, "Mobile Manipulation");
        assert_eq!(paper.abstract_text, "A study of manipulation.");
    }
}
