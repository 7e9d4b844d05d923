use std::path::Path;
use url::Url;

/// Width of the zero padded ordinal used for file and directory names.
pub const ORDINAL_WIDTH: usize = 3;

pub fn ordinal_name(ordinal: usize) -> String {
    format!("{:0width$}", ordinal, width = ORDINAL_WIDTH)
}

/// One page image of a chapter, numbered in page order when it was extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub ordinal: usize,
    pub url: Url,
}

impl ImageRef {
    /// `000.jpg`, `001.png`, ... keeping the extension of the last URL segment.
    pub fn file_name(&self) -> String {
        let ext = self
            .url
            .path_segments()
            .and_then(|segments| segments.last())
            .and_then(|last| Path::new(last).extension())
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();
        format!("{}{}", ordinal_name(self.ordinal), ext)
    }
}

/// One chapter link of a series, numbered in listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRef {
    pub ordinal: usize,
    pub url: Url,
    pub title: String,
}

impl ChapterRef {
    pub fn dir_name(&self) -> String {
        ordinal_name(self.ordinal)
    }
}
