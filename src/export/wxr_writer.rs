use std::io::Cursor;

use chrono::{NaiveDateTime, TimeZone, Utc};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use spdlog::{debug, warn};

use crate::config::Site;
use crate::error::ConvertError;
use crate::export::slug::slugify;
use crate::export::ExportWriter;
use crate::post::{Author, Post};
use crate::text_utils::{format_date_time, parse_date_time, sanitize_xml};

/* Example
<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:excerpt="http://wordpress.org/export/1.2/excerpt/" ... xmlns:wp="http://wordpress.org/export/1.2/">
<channel>
  <title>Newsletter archive</title>
  <link>https://example.com</link>
  <description>Issues imported from Revue</description>
  <language>en</language>
  <wp:wxr_version>1.2</wp:wxr_version>
  <wp:base_site_url>https://example.com</wp:base_site_url>
  <wp:base_blog_url>https://example.com</wp:base_blog_url>
  <wp:author>
    <wp:author_id>1</wp:author_id>
    <wp:author_login><![CDATA[revue-importer]]></wp:author_login>
    <wp:author_email><![CDATA[importer@example.com]]></wp:author_email>
    <wp:author_display_name><![CDATA[Revue Importer]]></wp:author_display_name>
  </wp:author>
  <item>
    <title>My Issue</title>
    <link>https://example.com/?p=1</link>
    <pubDate>Wed, 1 Jan 2020 00:00:00 +0000</pubDate>
    <dc:creator><![CDATA[revue-importer]]></dc:creator>
    <guid isPermaLink="false">https://example.com/?p=1</guid>
    <description></description>
    <content:encoded><![CDATA[Hello]]></content:encoded>
    <excerpt:encoded><![CDATA[]]></excerpt:encoded>
    <wp:post_id>1</wp:post_id>
    <wp:post_date><![CDATA[2020-01-01 00:00:00]]></wp:post_date>
    <wp:post_date_gmt><![CDATA[2020-01-01 00:00:00]]></wp:post_date_gmt>
    <wp:post_name><![CDATA[my-issue]]></wp:post_name>
    <wp:status><![CDATA[publish]]></wp:status>
    <wp:post_parent>0</wp:post_parent>
    <wp:menu_order>0</wp:menu_order>
    <wp:post_type><![CDATA[post]]></wp:post_type>
  </item>
</channel>
</rss>
*/

const WXR_VERSION: &str = "1.2";
const DEFAULT_AUTHOR_LOGIN: &str = "importer";

const NAMESPACES: [(&str, &str); 5] = [
    ("xmlns:excerpt", "http://wordpress.org/export/1.2/excerpt/"),
    ("xmlns:content", "http://purl.org/rss/1.0/modules/content/"),
    ("xmlns:wfw", "http://wellformedweb.org/CommentAPI/"),
    ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
    ("xmlns:wp", "http://wordpress.org/export/1.2/"),
];

type XmlWriter = Writer<Cursor<Vec<u8>>>;

/// WordPress eXtended RSS export.
pub struct WxrWriter {
    site: Site,
    posts: Vec<Post>,
    author: Option<Author>,
}

impl WxrWriter {
    pub fn new(site: Site) -> Self {
        WxrWriter {
            site,
            posts: vec![],
            author: None,
        }
    }

    fn render(&self, author: &Author) -> quick_xml::Result<Vec<u8>> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        // <?xml version="1.0" encoding="UTF-8"?>
        let decl = Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None));
        writer.write_event(decl)?;

        let mut rss = BytesStart::new("rss");
        rss.push_attribute(("version", "2.0"));
        for ns in NAMESPACES {
            rss.push_attribute(ns);
        }
        writer.write_event(Event::Start(rss))?;
        writer.write_event(Event::Start(BytesStart::new("channel")))?;

        let base_url = self.site.url.trim_end_matches('/');
        push_text(&mut writer, "title", &self.site.title)?;
        push_text(&mut writer, "link", base_url)?;
        push_text(&mut writer, "description", &self.site.description)?;
        push_text(&mut writer, "language", &self.site.language)?;
        push_text(&mut writer, "wp:wxr_version", WXR_VERSION)?;
        push_text(&mut writer, "wp:base_site_url", base_url)?;
        push_text(&mut writer, "wp:base_blog_url", base_url)?;

        let login = author_login(author);
        writer.write_event(Event::Start(BytesStart::new("wp:author")))?;
        push_text(&mut writer, "wp:author_id", "1")?;
        push_cdata(&mut writer, "wp:author_login", &login)?;
        push_cdata(&mut writer, "wp:author_email", &author.email)?;
        push_cdata(&mut writer, "wp:author_display_name", &author.display_name)?;
        writer.write_event(Event::End(BytesEnd::new("wp:author")))?;

        for post in &self.posts {
            push_item(&mut writer, base_url, &login, post)?;
        }

        writer.write_event(Event::End(BytesEnd::new("channel")))?;
        writer.write_event(Event::End(BytesEnd::new("rss")))?;

        Ok(writer.into_inner().into_inner())
    }
}

impl ExportWriter for WxrWriter {
    fn add_post(&mut self, post: Post) {
        self.posts.push(post);
    }

    fn add_author(&mut self, author: Author) -> Result<(), ConvertError> {
        if self.author.is_some() {
            return Err(ConvertError::Export("Export already has an author".to_string()));
        }
        self.author = Some(author);
        Ok(())
    }

    fn serialize(self) -> Result<String, ConvertError> {
        let Some(ref author) = self.author else {
            return Err(ConvertError::Export("Export has no author".to_string()));
        };

        let xml = self.render(author)?;
        debug!("Serialized {} posts into {} bytes", self.posts.len(), xml.len());
        String::from_utf8(xml).map_err(|e| ConvertError::Export(e.to_string()))
    }
}

fn author_login(author: &Author) -> String {
    let login = slugify(&author.display_name);
    if login.is_empty() {
        DEFAULT_AUTHOR_LOGIN.to_string()
    } else {
        login
    }
}

// Numeric ids are written in their number form so link, guid and wp:post_id agree
fn post_ref(post: &Post) -> String {
    match post.id.as_number() {
        Some(number) => number.to_string(),
        None => post.id.to_string(),
    }
}

fn post_link(base_url: &str, post: &Post) -> String {
    format!("{}/?p={}", base_url, post_ref(post))
}

fn post_name(post: &Post) -> String {
    let slug = post.title.as_deref().map(slugify).unwrap_or_default();
    if slug.is_empty() {
        format!("issue-{}", post.id)
    } else {
        slug
    }
}

fn published_date(post: &Post) -> Option<NaiveDateTime> {
    let published_at = post.published_at.as_deref()?;
    match parse_date_time(published_at) {
        Ok(dt) => Some(dt),
        Err(e) => {
            warn!("Issue {} has an unreadable publish date: {}", post.id, e);
            None
        }
    }
}

fn push_item(writer: &mut XmlWriter, base_url: &str, login: &str, post: &Post) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("item")))?;

    push_text(writer, "title", post.title.as_deref().unwrap_or(""))?;

    let link = post_link(base_url, post);
    push_text(writer, "link", &link)?;

    // <pubDate>Wed, 1 Jan 2020 00:00:00 +0000</pubDate>
    let date = published_date(post);
    match (&date, post.published_at.as_deref()) {
        (Some(dt), _) => push_text(writer, "pubDate", &Utc.from_utc_datetime(dt).to_rfc2822())?,
        (None, Some(raw)) => push_text(writer, "pubDate", raw)?,
        (None, None) => {}
    }

    push_cdata(writer, "dc:creator", login)?;

    let mut guid = BytesStart::new("guid");
    guid.push_attribute(("isPermaLink", "false"));
    writer.write_event(Event::Start(guid))?;
    writer.write_event(Event::Text(BytesText::new(&sanitize_xml(&link))))?;
    writer.write_event(Event::End(BytesEnd::new("guid")))?;

    push_text(writer, "description", "")?;
    push_cdata(writer, "content:encoded", &post.content_encoded)?;
    push_cdata(writer, "excerpt:encoded", "")?;

    if post.id.as_number().is_some() {
        push_text(writer, "wp:post_id", &post_ref(post))?;
    }

    if let Some(ref dt) = date {
        let formatted = format_date_time(dt);
        push_cdata(writer, "wp:post_date", &formatted)?;
        push_cdata(writer, "wp:post_date_gmt", &formatted)?;
    }

    push_cdata(writer, "wp:post_name", &post_name(post))?;
    push_cdata(writer, "wp:status", "publish")?;
    push_text(writer, "wp:post_parent", "0")?;
    push_text(writer, "wp:menu_order", "0")?;
    push_cdata(writer, "wp:post_type", "post")?;

    writer.write_event(Event::End(BytesEnd::new("item")))?;
    Ok(())
}

fn push_text(writer: &mut XmlWriter, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(&sanitize_xml(text))))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn push_cdata(writer: &mut XmlWriter, tag: &str, text: &str) -> quick_xml::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    for section in cdata_sections(&sanitize_xml(text)) {
        writer.write_event(Event::CData(BytesCData::new(section.as_str())))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

// "]]>" cannot appear inside a CDATA section, so the text is split around it
fn cdata_sections(text: &str) -> Vec<String> {
    let parts: Vec<&str> = text.split("]]>").collect();
    let last = parts.len() - 1;
    parts.iter()
        .enumerate()
        .map(|(i, part)| {
            let prefix = if i == 0 { "" } else { ">" };
            let suffix = if i == last { "" } else { "]]" };
            format!("{}{}{}", prefix, part, suffix)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::post::IssueId;

    use super::*;

    fn post(id: &str, title: Option<&str>, published_at: Option<&str>, content: &str) -> Post {
        Post {
            id: IssueId::from(id),
            content_encoded: content.to_string(),
            title: title.map(|t| t.to_string()),
            published_at: published_at.map(|p| p.to_string()),
        }
    }

    fn author() -> Author {
        Author {
            display_name: "Revue Importer".to_string(),
            email: "importer@example.com".to_string(),
        }
    }

    fn site() -> Site {
        Site {
            title: "my feed".to_string(),
            url: "https://example.com/".to_string(),
            description: "My newsletter".to_string(),
            language: "en".to_string(),
        }
    }

    #[test]
    fn render_xml() {
        let mut wxr = WxrWriter::new(site());
        wxr.add_post(post("1", Some("My Issue"), Some("2020-01-01"), "Hello"));
        wxr.add_author(author()).unwrap();
        let xml = wxr.serialize().unwrap();
        assert_eq!(xml, EXPECTED);
    }

    #[test]
    fn test_posts_in_input_order() {
        let mut wxr = WxrWriter::new(site());
        wxr.add_author(author()).unwrap();
        wxr.add_post(post("3", Some("Third"), None, "c"));
        wxr.add_post(post("1", Some("First"), None, "a"));
        wxr.add_post(post("2", Some("Second"), None, "b"));
        let xml = wxr.serialize().unwrap();

        let third = xml.find("<title>Third</title>").unwrap();
        let first = xml.find("<title>First</title>").unwrap();
        let second = xml.find("<title>Second</title>").unwrap();
        assert!(third < first && first < second);
        assert_eq!(xml.matches("<item>").count(), 3);
        assert_eq!(xml.matches("<wp:author>").count(), 1);
    }

    #[test]
    fn test_author_required_once() {
        let wxr = WxrWriter::new(site());
        assert!(matches!(wxr.serialize(), Err(ConvertError::Export(_))));

        let mut wxr = WxrWriter::new(site());
        wxr.add_author(author()).unwrap();
        assert!(matches!(wxr.add_author(author()), Err(ConvertError::Export(_))));
    }

    #[test]
    fn test_post_without_metadata() {
        let mut wxr = WxrWriter::new(site());
        wxr.add_author(author()).unwrap();
        wxr.add_post(post("abc", None, None, "x"));
        let xml = wxr.serialize().unwrap();

        assert!(xml.contains("<title></title>"));
        assert!(!xml.contains("<pubDate>"));
        assert!(!xml.contains("<wp:post_id>"));
        assert!(!xml.contains("<wp:post_date>"));
        assert!(xml.contains("<wp:post_name><![CDATA[issue-abc]]></wp:post_name>"));
    }

    #[test]
    fn test_unparseable_date_kept_raw() {
        let mut wxr = WxrWriter::new(site());
        wxr.add_author(author()).unwrap();
        wxr.add_post(post("4", Some("Odd"), Some("sometime in May"), "x"));
        let xml = wxr.serialize().unwrap();

        assert!(xml.contains("<pubDate>sometime in May</pubDate>"));
        assert!(!xml.contains("<wp:post_date>"));
    }

    #[test]
    fn test_content_with_cdata_end() {
        let mut wxr = WxrWriter::new(site());
        wxr.add_author(author()).unwrap();
        wxr.add_post(post("5", Some("Tricky"), None, "a]]>b & <c>"));
        let xml = wxr.serialize().unwrap();

        assert!(xml.contains("<content:encoded><![CDATA[a]]]]><![CDATA[>b & <c>]]></content:encoded>"));
    }

    #[test]
    fn test_title_escaped() {
        let mut wxr = WxrWriter::new(site());
        wxr.add_author(author()).unwrap();
        wxr.add_post(post("6", Some("Fish & Chips <3"), None, "x"));
        let xml = wxr.serialize().unwrap();

        assert!(xml.contains("<title>Fish &amp; Chips &lt;3</title>"));
        assert!(xml.contains("<wp:post_name><![CDATA[fish-chips-3]]></wp:post_name>"));
    }

    #[test]
    fn test_text_fields_sanitized() {
        let mut wxr = WxrWriter::new(Site {
            title: "Feed \u{2603}".to_string(),
            ..site()
        });
        wxr.add_author(Author {
            display_name: "Jane\u{1} \u{738b}".to_string(),
            email: "jane@example.org".to_string(),
        }).unwrap();
        wxr.add_post(post("1", Some("Bad\u{1}Title \u{65e5}\u{672c}"), Some("soon\u{b}"), "x"));
        let xml = wxr.serialize().unwrap();

        assert!(xml.contains("<title>Feed </title>"));
        assert!(xml.contains("<title>BadTitle </title>"));
        assert!(xml.contains("<pubDate>soon</pubDate>"));
        assert!(xml.contains("<wp:author_display_name><![CDATA[Jane ]]></wp:author_display_name>"));
        assert!(xml.chars().all(|c| matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{ff}')));
    }

    #[test]
    fn test_numeric_id_with_leading_zeros() {
        let mut wxr = WxrWriter::new(site());
        wxr.add_author(author()).unwrap();
        wxr.add_post(post("007", Some("Bond"), None, "x"));
        let xml = wxr.serialize().unwrap();

        assert!(xml.contains("<link>https://example.com/?p=7</link>"));
        assert!(xml.contains("<guid isPermaLink=\"false\">https://example.com/?p=7</guid>"));
        assert!(xml.contains("<wp:post_id>7</wp:post_id>"));
        assert!(!xml.contains("007"));
    }

    #[test]
    fn test_cdata_sections() {
        assert_eq!(cdata_sections("plain"), ["plain"]);
        assert_eq!(cdata_sections("a]]>b"), ["a]]", ">b"]);
        assert_eq!(cdata_sections("]]>"), ["]]", ">"]);
    }

    const EXPECTED: &str = r##"<?xml version="1.0" encoding="UTF-8"?><rss version="2.0" xmlns:excerpt="http://wordpress.org/export/1.2/excerpt/" xmlns:content="http://purl.org/rss/1.0/modules/content/" xmlns:wfw="http://wellformedweb.org/CommentAPI/" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:wp="http://wordpress.org/export/1.2/"><channel><title>my feed</title><link>https://example.com</link><description>My newsletter</description><language>en</language><wp:wxr_version>1.2</wp:wxr_version><wp:base_site_url>https://example.com</wp:base_site_url><wp:base_blog_url>https://example.com</wp:base_blog_url><wp:author><wp:author_id>1</wp:author_id><wp:author_login><![CDATA[revue-importer]]></wp:author_login><wp:author_email><![CDATA[importer@example.com]]></wp:author_email><wp:author_display_name><![CDATA[Revue Importer]]></wp:author_display_name></wp:author><item><title>My Issue</title><link>https://example.com/?p=1</link><pubDate>Wed, 1 Jan 2020 00:00:00 +0000</pubDate><dc:creator><![CDATA[revue-importer]]></dc:creator><guid isPermaLink="false">https://example.com/?p=1</guid><description></description><content:encoded><![CDATA[Hello]]></content:encoded><excerpt:encoded><![CDATA[]]></excerpt:encoded><wp:post_id>1</wp:post_id><wp:post_date><![CDATA[2020-01-01 00:00:00]]></wp:post_date><wp:post_date_gmt><![CDATA[2020-01-01 00:00:00]]></wp:post_date_gmt><wp:post_name><![CDATA[my-issue]]></wp:post_name><wp:status><![CDATA[publish]]></wp:status><wp:post_parent>0</wp:post_parent><wp:menu_order>0</wp:menu_order><wp:post_type><![CDATA[post]]></wp:post_type></item></channel></rss>"##;
}
