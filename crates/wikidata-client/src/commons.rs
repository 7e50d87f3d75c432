use serde_json::Value;

use crate::fetched::Fetched;

/// Current file URL from a Commons `prop=imageinfo&iiprop=url` body.
pub fn parse_image_url(body: &str) -> Fetched<String> {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => return Fetched::Malformed(e.to_string()),
    };
    let Some(pages) = value.pointer("/query/pages").and_then(Value::as_object) else {
        return Fetched::Malformed("response has no query.pages".to_string());
    };
    pages
        .values()
        .find_map(|page| page.pointer("/imageinfo/0/url").and_then(Value::as_str))
        .map(str::to_string)
        .into()
}
