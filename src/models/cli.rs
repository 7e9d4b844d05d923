use crate::error::Error;
use clap::Parser;
use resolve_path::PathResolveExt;
use std::path::PathBuf;
use url::Url;

/// Download series or chapters from dynasty-scans.
#[derive(clap::Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Chapter or series url
    pub url: String,
    /// Download directory
    #[arg(short, long)]
    pub dir: Option<String>,
    /// Optional settings file overriding the built-in site settings
    #[arg(short, long)]
    pub config_file: Option<String>,
}

/// What to download and where to put it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Chapter { url: Url, dir: PathBuf },
    Series { url: Url, dir: PathBuf },
}

impl Cli {
    pub fn new() -> Self {
        Cli::parse()
    }

    pub fn target(&self) -> Result<Target, Error> {
        let url = Url::parse(&self.url).map_err(|_| Error::UnsupportedUrl(self.url.clone()))?;
        let dir = self.dir.as_ref().map(|d| d.resolve().into_owned());

        if self.url.contains("/chapters/") {
            let dir = dir.unwrap_or_else(|| PathBuf::from(".").join(last_segment(&url)));
            Ok(Target::Chapter { url, dir })
        } else if self.url.contains("/series/") {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            Ok(Target::Series { url, dir })
        } else {
            Err(Error::UnsupportedUrl(self.url.clone()))
        }
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self::new()
    }
}

/// Last non-empty path segment, ignoring a trailing slash.
pub fn last_segment(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("dynasty-dl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn clap_test() {
        use clap::CommandFactory;
        Cli::command().debug_assert()
    }

    #[test]
    fn chapter_defaults_to_last_segment() {
        let target = cli(&["https://dynasty-scans.com/chapters/some_chapter_ch01/"])
            .target()
            .unwrap();
        assert_eq!(
            Target::Chapter {
                url: Url::parse("https://dynasty-scans.com/chapters/some_chapter_ch01/").unwrap(),
                dir: PathBuf::from("./some_chapter_ch01"),
            },
            target
        );
    }

    #[test]
    fn series_defaults_to_current_dir() {
        let target = cli(&["https://dynasty-scans.com/series/some_series"])
            .target()
            .unwrap();
        assert!(matches!(target, Target::Series { dir, .. } if dir == PathBuf::from(".")));
    }

    #[test]
    fn explicit_dir_wins() {
        let target = cli(&["https://dynasty-scans.com/series/s", "--dir", "/tmp/manga"])
            .target()
            .unwrap();
        assert!(matches!(target, Target::Series { dir, .. } if dir == PathBuf::from("/tmp/manga")));
    }

    #[test]
    fn other_urls_are_rejected() {
        let err = cli(&["https://dynasty-scans.com/tags/yuri"]).target().unwrap_err();
        assert!(matches!(err, Error::UnsupportedUrl(_)));
        assert!(cli(&["not a url"]).target().is_err());
    }
}
