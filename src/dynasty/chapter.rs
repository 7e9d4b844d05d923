use crate::error::ParseError;
use crate::models::ImageRef;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;
use url::Url;

/// One entry of the `pages` array embedded in the chapter reader.
#[derive(Deserialize, Debug, PartialEq, Eq)]
pub struct PageEntry {
    pub image: String,
}

/// Ordered image URLs of a chapter page, resolved against `base`.
pub fn image_refs(html: &str, base: &Url) -> Result<Vec<ImageRef>, ParseError> {
    let script = first_body_script(html)?;
    let pages = decode_pages(find_pages_json(&script)?)?;

    pages
        .into_iter()
        .enumerate()
        .map(|(ordinal, page)| {
            let url = base.join(&page.image).map_err(|source| ParseError::BadLink {
                href: page.image,
                source,
            })?;
            Ok(ImageRef { ordinal, url })
        })
        .collect()
}

fn first_body_script(html: &str) -> Result<String, ParseError> {
    let html = Html::parse_document(html);
    let selector = Selector::parse("body script").expect("`body script` should be a valid selector");

    let script = html
        .select(&selector)
        .next()
        .ok_or(ParseError::MissingScript)?;
    Ok(script.text().collect())
}

/// Pull the raw JSON out of `var pages = [...];`.
pub fn find_pages_json(script: &str) -> Result<&str, ParseError> {
    let reg = Regex::new(r"var pages = (.*);").expect("`var pages` regex should be valid");
    reg.captures(script)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or(ParseError::MissingPages)
}

pub fn decode_pages(json: &str) -> Result<Vec<PageEntry>, ParseError> {
    Ok(serde_json::from_str(json)?)
}
