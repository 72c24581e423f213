#[cfg(test)]
pub const ITEMS_JSON: &str = r#"[
  {"id": 100, "issue_id": 10, "order": 2, "item_type": "text", "description": "Welcome to the first issue"},
  {"id": 101, "issue_id": 10, "order": 1, "item_type": "header", "description": "<h2>Intro</h2>"},
  {"id": 110, "issue_id": 11, "order": 1, "item_type": "text", "description": "Second issue"},
  {"id": 102, "issue_id": 10, "order": 3, "item_type": "link", "url": "https://example.com", "description": "Example", "image": "https://example.com/a.png"},
  {"id": 111, "issue_id": 11, "order": 2, "item_type": "link", "url": "https://rust-lang.org", "description": "Rust", "image": null},
  {"id": 103, "issue_id": 10, "order": 4, "item_type": "text", "description": "Bye"}
]"#;

#[cfg(test)]
pub const ISSUES_CSV: &str = "id,subject,description,sent_at,url
10,First issue,The very first one,2021-03-14 09:05:00 UTC,https://www.getrevue.co/profile/me/issues/10
11,Second issue,\"Another one, with a comma\",2021-03-21 09:05:00 UTC,https://www.getrevue.co/profile/me/issues/11
";

#[cfg(test)]
pub fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}
