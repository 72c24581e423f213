use crate::content::Item;

const LINK_TYPE: &str = "link";

/// Renders a single item as an HTML fragment.
///
/// Attribute values are written without quotes. WordPress imports written by earlier
/// versions of this converter already contain that markup and must keep matching it.
pub fn render_item(item: &Item) -> String {
    let description = item.description.as_deref().unwrap_or("");

    match item.item_type.as_deref() {
        Some(LINK_TYPE) => {
            let url = item.url.as_deref().unwrap_or("");
            let mut link = format!("<a href={}>{}</a>", url, description);
            if let Some(image) = item.image.as_deref().filter(|image| !image.is_empty()) {
                link.push_str(&format!("<img src={} />", image));
            }
            link
        }
        _ => description.to_string(),
    }
}
