use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::PathBuf;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::cli::IdsArgs;
use crate::config::{BookId, CatalogOptions};
use crate::download::AssetDownloader;
use crate::error::ScrapeError;
use crate::extract::{self, Markup};
use crate::fetch::{PageFetcher, Target};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    #[serde(rename = "img_src", default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_path: Option<String>,
    #[serde(default)]
    pub comments: Vec<String>,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    records: Vec<BookRecord>,
}

impl Catalog {
    pub fn push(&mut self, record: BookRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub struct CatalogBuilder {
    fetcher: PageFetcher,
    downloader: AssetDownloader,
    markup: Markup,
    options: CatalogOptions,
}

impl CatalogBuilder {
    pub fn new(fetcher: PageFetcher, markup: Markup, options: CatalogOptions) -> Self {
        Self {
            downloader: AssetDownloader::new(fetcher.clone()),
            fetcher,
            markup,
            options,
        }
    }

    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// Process every source in order; a source that fails is logged and skipped.
    pub fn build(&self, sources: &[Target]) -> Catalog {
        let mut catalog = Catalog::default();
        let mut skipped = 0_usize;

        for source in sources {
            match self.process(source) {
                Ok(record) => {
                    tracing::info!(
                        %source,
                        title = %record.title,
                        author = %record.author,
                        "cataloged book"
                    );
                    catalog.push(record);
                }
                Err(err @ ScrapeError::NotFound { .. }) => {
                    skipped += 1;
                    tracing::info!(%source, %err, "skip missing book");
                }
                Err(err) => {
                    skipped += 1;
                    let err = anyhow::Error::from(err);
                    tracing::warn!(%source, "skip book: {err:#}");
                }
            }
        }

        tracing::info!(processed = catalog.len(), skipped, "catalog complete");
        catalog
    }

    pub fn process(&self, source: &Target) -> Result<BookRecord, ScrapeError> {
        let page = self.fetcher.fetch(source)?;
        let (title, author) = extract::title_author(&page, &self.markup)?;

        let image_path = if self.options.skip_images {
            None
        } else {
            let image_url = extract::image_url(&page, &self.markup)?;
            let path = self
                .downloader
                .download_image(&image_url, &self.options.images_folder)?;
            Some(path.to_string_lossy().to_string())
        };

        let book_path = if self.options.skip_text {
            None
        } else {
            match extract::text_download_url(&page, &self.markup)? {
                Some(text_url) => {
                    let folder = &self.options.books_folder;
                    let path = self.downloader.download_text(&text_url, &title, folder)?;
                    Some(path.to_string_lossy().to_string())
                }
                None => {
                    tracing::info!(%source, %title, "no plain-text edition");
                    None
                }
            }
        };

        Ok(BookRecord {
            comments: extract::comments(&page, &self.markup)?,
            genres: extract::genres(&page, &self.markup)?,
            title,
            author,
            image_path,
            book_path,
        })
    }

    /// Write `catalog` as a single JSON array to `{json_path}/library.json`.
    pub fn write(&self, catalog: &Catalog) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.options.json_path).with_context(|| {
            format!("create catalog dir: {}", self.options.json_path.display())
        })?;

        let out_path = self.options.catalog_file();
        let file = File::create(&out_path)
            .with_context(|| format!("create catalog: {}", out_path.display()))?;
        let mut out = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut out, catalog).context("serialize catalog")?;
        out.write_all(b"\n").context("write catalog newline")?;
        out.flush().context("flush catalog")?;

        tracing::info!(path = %out_path.display(), books = catalog.len(), "wrote catalog");
        Ok(out_path)
    }

    pub fn run(&self, sources: &[Target]) -> anyhow::Result<PathBuf> {
        let catalog = self.build(sources);
        self.write(&catalog)
    }
}

pub fn run(args: IdsArgs) -> anyhow::Result<()> {
    if args.start_id >= args.end_id {
        tracing::warn!(
            start_id = args.start_id,
            end_id = args.end_id,
            "empty id range; END_ID is exclusive"
        );
    }

    let fetcher = PageFetcher::new(args.catalog.site_config()?)?;
    let sources = (args.start_id..args.end_id)
        .map(|id| Target::BookId(BookId(id)))
        .collect::<Vec<_>>();

    let builder = CatalogBuilder::new(fetcher, Markup::tululu(), args.catalog.options());
    builder.run(&sources)?;
    Ok(())
}
