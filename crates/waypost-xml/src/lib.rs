//! Sitemap-protocol XML serialization.
//!
//! Flattens a [`Link`] forest into a single `<urlset>` document: every link
//! at every depth becomes a sibling `<url>` element (the protocol has no
//! nesting), with `xhtml:link` alternates per entry. Links and alternates
//! whose resolved host is not the base origin's host are omitted — external
//! references never appear in a sitemap — while their descendants are still
//! visited.

use std::io;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use waypost_core::{Link, origin};

/// Sitemap protocol namespace.
pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// XHTML namespace, for alternate-language links.
const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// XML Schema instance namespace.
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Schema reference for the sitemap protocol.
const SCHEMA_LOCATION: &str =
    "http://www.sitemaps.org/schemas/sitemap/0.9 http://www.sitemaps.org/schemas/sitemap/0.9/sitemap.xsd";

/// Error from sitemap serialization.
///
/// Callers must treat a failed serialization as a failed request, never as
/// an empty sitemap.
#[derive(Debug, thiserror::Error)]
pub enum SitemapXmlError {
    /// XML assembly failure.
    #[error("XML write error")]
    Xml(#[from] quick_xml::Error),

    /// Writer I/O failure.
    #[error("XML write I/O error")]
    Io(#[from] io::Error),

    /// The assembled document is not valid UTF-8.
    #[error("serialized document is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serialize a link forest into a sitemap XML document.
///
/// Hostless URLs are resolved against `base_url`; anything resolving to a
/// different host is filtered out (its children are still walked).
pub fn serialize(forest: &[Vec<Link>], base_url: &str) -> Result<String, SitemapXmlError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut urlset = BytesStart::new("urlset");
    urlset.push_attribute(("xmlns", SITEMAP_NS));
    urlset.push_attribute(("xmlns:xhtml", XHTML_NS));
    urlset.push_attribute(("xmlns:xsi", XSI_NS));
    urlset.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    writer.write_event(Event::Start(urlset))?;

    for tree in forest {
        for link in tree {
            write_link(&mut writer, link, base_url)?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    Ok(String::from_utf8(writer.into_inner())?)
}

/// Emit one link's `<url>` element (unless origin-filtered), then its
/// descendants as siblings.
fn write_link<W: io::Write>(
    writer: &mut Writer<W>,
    link: &Link,
    base_url: &str,
) -> Result<(), SitemapXmlError> {
    let resolved = origin::resolve(&link.url, base_url);

    if in_origin(&resolved, base_url) {
        writer.write_event(Event::Start(BytesStart::new("url")))?;

        write_text_element(writer, "loc", &resolved)?;
        if !link.last_modified.is_empty() {
            write_text_element(writer, "lastmod", &link.last_modified)?;
        }
        if !link.priority.is_empty() {
            write_text_element(writer, "priority", &link.priority)?;
        }

        for alternate in &link.alternates {
            let href = origin::resolve(&alternate.url, base_url);
            // An off-origin alternate is dropped without dropping the entry.
            if !in_origin(&href, base_url) {
                continue;
            }
            let mut element = BytesStart::new("xhtml:link");
            element.push_attribute(("rel", "alternate"));
            element.push_attribute(("hreflang", alternate.lang.as_str()));
            element.push_attribute(("href", href.as_str()));
            writer.write_event(Event::Empty(element))?;
        }

        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    // An externally hosted link does not imply external descendants.
    for group in &link.children {
        for child in group {
            write_link(writer, child, base_url)?;
        }
    }

    Ok(())
}

/// `<name>text</name>`.
fn write_text_element<W: io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> Result<(), SitemapXmlError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Whether a resolved URL belongs to the base origin.
///
/// A URL that still has no host after resolution is kept as-is.
fn in_origin(url: &str, base_url: &str) -> bool {
    match origin::host(url) {
        Some(host) => origin::host(base_url) == Some(host),
        None => true,
    }
}
