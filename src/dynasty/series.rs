use crate::error::ParseError;
use crate::models::cli::last_segment;
use crate::models::ChapterRef;
use scraper::{Html, Selector};
use url::Url;

/// A series listing page: its title and every chapter link in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series {
    pub title: String,
    /// Last segment of the series url.
    pub slug: String,
    pub chapters: Vec<ChapterRef>,
}

impl Series {
    /// `url` is the page that was fetched, only used when the title is missing.
    pub fn parse(html: &str, url: &Url, base: &Url) -> Result<Self, ParseError> {
        let html = Html::parse_document(html);
        let slug = last_segment(url);
        let title = title(&html).unwrap_or_else(|| slug.clone());
        let chapters = chapters(&html, base)?;
        Ok(Self {
            title,
            slug,
            chapters,
        })
    }

    /// Title safe to use as a single directory name, falling back to the slug
    /// when nothing usable is left of it.
    pub fn dir_name(&self) -> String {
        [&self.title, &self.slug]
            .into_iter()
            .map(|name| sanitize_name(name))
            .find(|name| !matches!(name.as_str(), "" | "." | ".."))
            .unwrap_or_else(|| "untitled".into())
    }
}

fn title(html: &Html) -> Option<String> {
    let selector = Selector::parse("h2.tag-title b").expect("`h2.tag-title b` should be a valid selector");

    let title = html.select(&selector).next()?.text().collect::<String>();
    let title = title.trim();
    (!title.is_empty()).then(|| title.to_owned())
}

fn chapters(html: &Html, base: &Url) -> Result<Vec<ChapterRef>, ParseError> {
    let list = Selector::parse("dl.chapter-list").expect("`dl.chapter-list` should be a valid selector");
    let name = Selector::parse("a.name").expect("`a.name` should be a valid selector");

    let list = html
        .select(&list)
        .next()
        .ok_or(ParseError::MissingChapterList)?;

    list.select(&name)
        .filter_map(|a| {
            let href = a.value().attr("href").filter(|href| !href.is_empty())?;
            Some((a, href))
        })
        .enumerate()
        .map(|(ordinal, (a, href))| {
            let url = base.join(href).map_err(|source| ParseError::BadLink {
                href: href.to_owned(),
                source,
            })?;
            Ok(ChapterRef {
                ordinal,
                url,
                title: a.text().collect::<String>().trim().to_owned(),
            })
        })
        .collect()
}

fn sanitize_name(s: &str) -> String {
    s.replace([':', '/', '\\'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERIES_PAGE: &str = r#"
<html><body>
  <h2 class="tag-title"><b>Bloom Into You</b> by <a href="/authors/x">Someone</a></h2>
  <dl class="chapter-list">
    <dt>Volume 1</dt>
    <dd><a class="name" href="/chapters/bloom_into_you_ch01">Chapter 1</a> <a class="label" href="/tags/yuri">Yuri</a></dd>
    <dd><a class="name" href="">Licensed</a></dd>
    <dd><a class="name">No link</a></dd>
    <dd><a class="name" href="/chapters/bloom_into_you_ch02">Chapter 2</a></dd>
    <dd><a class="name" href="/chapters/bloom_into_you_ch03"> Chapter 3: The End </a></dd>
  </dl>
</body></html>"#;

    fn base() -> Url {
        Url::parse("https://dynasty-scans.com/").unwrap()
    }

    fn series_url() -> Url {
        Url::parse("https://dynasty-scans.com/series/bloom_into_you/").unwrap()
    }

    #[test]
    fn parses_title_and_chapters() {
        let series = Series::parse(SERIES_PAGE, &series_url(), &base()).unwrap();

        assert_eq!("Bloom Into You", series.title);
        let titles: Vec<_> = series.chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(vec!["Chapter 1", "Chapter 2", "Chapter 3: The End"], titles);

        let ordinals: Vec<_> = series.chapters.iter().map(|c| c.ordinal).collect();
        assert_eq!(vec![0, 1, 2], ordinals);
        assert_eq!(
            "https://dynasty-scans.com/chapters/bloom_into_you_ch02",
            series.chapters[1].url.as_str()
        );
    }

    #[test]
    fn missing_title_falls_back_to_url() {
        let html = SERIES_PAGE.replace("tag-title", "other-title");
        let series = Series::parse(&html, &series_url(), &base()).unwrap();
        assert_eq!("bloom_into_you", series.title);
        assert_eq!(3, series.chapters.len());
    }

    #[test]
    fn missing_chapter_list() {
        let html = "<html><body><h2 class=\"tag-title\"><b>T</b></h2></body></html>";
        let err = Series::parse(html, &series_url(), &base()).unwrap_err();
        assert!(matches!(err, ParseError::MissingChapterList));
    }

    #[test]
    fn empty_chapter_list() {
        let html = "<html><body><dl class=\"chapter-list\"></dl></body></html>";
        let series = Series::parse(html, &series_url(), &base()).unwrap();
        assert!(series.chapters.is_empty());
    }

    fn named(title: &str) -> Series {
        Series {
            title: title.into(),
            slug: "bloom_into_you".into(),
            chapters: vec![],
        }
    }

    #[test]
    fn dir_name_is_sanitized() {
        assert_eq!("Re Zero Side Story", named("Re: Zero / Side  Story").dir_name());
        assert_eq!("a b", named("a    b").dir_name());
        assert_eq!("tabs and lines", named(" tabs\tand\nlines ").dir_name());
    }

    #[test]
    fn unusable_title_falls_back_to_slug() {
        for title in ["..", ".", ":", "/", " : / "] {
            assert_eq!("bloom_into_you", named(title).dir_name(), "title {title:?}");
        }
    }

    #[test]
    fn dot_dot_title_from_page_stays_inside() {
        let html = SERIES_PAGE.replace("<b>Bloom Into You</b>", "<b>..</b>");
        let series = Series::parse(&html, &series_url(), &base()).unwrap();
        assert_eq!("..", series.title);
        assert_eq!("bloom_into_you", series.dir_name());
    }
}
