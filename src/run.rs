use crate::configuration::Settings;
use crate::dynasty::{image_refs, Series};
use crate::error::{Error, ParseError};
use crate::fetch_client::{Fetch, FetchClient};
use crate::models::{Cli, Target};
use log::{debug, error, info};
use std::fs;
use std::path::Path;
use url::Url;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::new(cli.config_file.as_deref())?;
    debug!("Settings {:?}", settings);
    let target = cli.target()?;

    let client = FetchClient::new(&settings)?;
    let downloader = Downloader::new(client, settings.base_url()?);
    downloader.download(&target).await?;

    info!("Finished!");
    Ok(())
}

/// Walks series and chapter pages and writes every image to disk, one request at a time.
pub struct Downloader<F> {
    fetcher: F,
    base_url: Url,
}

impl<F: Fetch> Downloader<F> {
    pub fn new(fetcher: F, base_url: Url) -> Self {
        Self { fetcher, base_url }
    }

    pub async fn download(&self, target: &Target) -> Result<(), Error> {
        match target {
            Target::Chapter { url, dir } => self.download_chapter(url, dir).await.map(|_| ()),
            Target::Series { url, dir } => self.download_series(url, dir).await,
        }
    }

    /// Write every page of the chapter at `url` into `dir` as `000.ext`, `001.ext`, ...
    ///
    /// Files that already exist are not fetched again. The first failing image
    /// stops the chapter. Returns how many images were written.
    pub async fn download_chapter(&self, url: &Url, dir: &Path) -> Result<usize, Error> {
        let html = self.fetcher.fetch_text(url).await?;
        let images = image_refs(&html, &self.base_url).map_err(|e| parse_error(url, e))?;
        info!("{} pages into {}", images.len(), dir.display());

        let mut written = 0;
        for image in &images {
            let path = dir.join(image.file_name());
            if path.is_file() {
                debug!("{} exists, skipping", path.display());
                continue;
            }
            fs::create_dir_all(dir).map_err(|source| Error::Io {
                path: dir.to_path_buf(),
                source,
            })?;

            debug!("Getting page #{}: {}", image.ordinal, image.url);
            let bytes = self.fetcher.fetch_bytes(&image.url).await?;
            fs::write(&path, bytes).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            written += 1;
        }

        Ok(written)
    }

    /// Download every chapter of the series at `url` into `dir/<title>/000`, `001`, ...
    ///
    /// A chapter that fails is logged and skipped; the rest still run and the
    /// failures are reported once all chapters were tried.
    pub async fn download_series(&self, url: &Url, dir: &Path) -> Result<(), Error> {
        let html = self.fetcher.fetch_text(url).await?;
        let series = Series::parse(&html, url, &self.base_url).map_err(|e| parse_error(url, e))?;
        info!("Getting: {}", series.title);

        let series_dir = dir.join(series.dir_name());
        let total = series.chapters.len();
        let mut failed = 0;
        for chapter in &series.chapters {
            info!("{}/{}: {}", chapter.ordinal + 1, total, chapter.title);
            let chapter_dir = series_dir.join(chapter.dir_name());
            if let Err(e) = self.download_chapter(&chapter.url, &chapter_dir).await {
                error!("Error downloading chapter {}: {}", chapter.url, e);
                failed += 1;
            }
        }

        if failed > 0 {
            return Err(Error::ChaptersFailed { failed, total });
        }
        Ok(())
    }
}

fn parse_error(url: &Url, source: ParseError) -> Error {
    Error::Parse {
        url: url.clone(),
        source,
    }
}
