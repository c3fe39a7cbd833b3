use anyhow::Context as _;
use url::Url;

use crate::catalog::CatalogBuilder;
use crate::cli::CategoryArgs;
use crate::config::ListingFailurePolicy;
use crate::error::ScrapeError;
use crate::extract::{self, Markup};
use crate::fetch::{PageFetcher, Target};

/// Walks a paginated category listing and collects detail-page URLs.
#[derive(Debug, Clone)]
pub struct CategoryLister {
    fetcher: PageFetcher,
    markup: Markup,
}

impl CategoryLister {
    pub fn new(fetcher: PageFetcher, markup: Markup) -> Self {
        Self { fetcher, markup }
    }

    /// Detail-page URLs listed on pages `start_page..=end_page`, in page then document order.
    ///
    /// An invalid range is logged and yields no URLs without touching the network.
    pub fn list_pages(&self, start_page: u32, end_page: u32) -> Result<Vec<Url>, ScrapeError> {
        if start_page < 1 {
            tracing::warn!(start_page, "start page must be at least 1");
            return Ok(Vec::new());
        }
        if start_page > end_page {
            tracing::warn!(start_page, end_page, "start page must not be after end page");
            return Ok(Vec::new());
        }

        let mut books = Vec::new();
        for page_number in start_page..=end_page {
            match self.list_page(page_number) {
                Ok(urls) => {
                    tracing::info!(page = page_number, books = urls.len(), "listed category page");
                    books.extend(urls);
                }
                Err(err) => match self.fetcher.site().listing_policy {
                    ListingFailurePolicy::Abort => return Err(err),
                    ListingFailurePolicy::Skip => {
                        tracing::warn!(page = page_number, %err, "skip category page");
                    }
                },
            }
        }

        Ok(books)
    }

    pub fn list_page(&self, page_number: u32) -> Result<Vec<Url>, ScrapeError> {
        let site = self.fetcher.site();
        let url = site.category_url(Some(page_number)).map_err(|err| {
            ScrapeError::parse(
                site.root.as_str(),
                format!("listing url for page {page_number}: {err}"),
            )
        })?;
        let page = self.fetcher.fetch_url(&url)?;

        extract::listing_book_hrefs(&page, &self.markup)?
            .into_iter()
            .map(|href| {
                page.url().join(&href).map_err(|err| {
                    ScrapeError::parse(page.url().as_str(), format!("book link {href:?}: {err}"))
                })
            })
            .collect()
    }

    pub fn last_page_number(&self) -> Result<u32, ScrapeError> {
        let site = self.fetcher.site();
        let url = site
            .category_url(None)
            .map_err(|err| ScrapeError::parse(site.root.as_str(), format!("listing url: {err}")))?;
        let page = self.fetcher.fetch_url(&url)?;
        extract::last_page_number(&page, &self.markup)
    }
}

pub fn run(args: CategoryArgs) -> anyhow::Result<()> {
    let site = args
        .catalog
        .site_config()?
        .with_category(&args.category)
        .with_listing_policy(args.on_page_error);
    let fetcher = PageFetcher::new(site)?;
    let lister = CategoryLister::new(fetcher.clone(), Markup::tululu());

    let end_page = match args.end_page {
        Some(end_page) => end_page,
        None => lister.last_page_number().context("find last category page")?,
    };
    tracing::info!(start_page = args.start_page, end_page, "list category");

    let urls = lister
        .list_pages(args.start_page, end_page)
        .context("list category pages")?;
    let sources = urls.into_iter().map(Target::Url).collect::<Vec<_>>();

    let builder = CatalogBuilder::new(fetcher, Markup::tululu(), args.catalog.options());
    builder.run(&sources)?;
    Ok(())
}
