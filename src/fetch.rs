use std::fmt;

use anyhow::Context as _;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use scraper::Html;
use url::Url;

use crate::config::{BookId, SiteConfig};
use crate::error::ScrapeError;

const USER_AGENT: &str = concat!("tululu-catalog/", env!("CARGO_PKG_VERSION"));

/// A book to catalog, addressed either by id or by its detail-page URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    BookId(BookId),
    Url(Url),
}

impl Target {
    pub fn url(&self, site: &SiteConfig) -> Result<Url, ScrapeError> {
        match self {
            Self::BookId(id) => site.book_url(*id).map_err(|err| {
                ScrapeError::parse(site.root.as_str(), format!("book url for {id}: {err}"))
            }),
            Self::Url(url) => Ok(url.clone()),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BookId(id) => write!(f, "book {id}"),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// A fetched HTML document together with the address it came from.
pub struct Page {
    url: Url,
    html: Html,
}

impl Page {
    pub fn parse(url: Url, html: &str) -> Self {
        Self {
            url,
            html: Html::parse_document(html),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn html(&self) -> &Html {
        &self.html
    }
}

#[derive(Debug, Clone)]
pub struct PageFetcher {
    site: SiteConfig,
    pages: Client,
    assets: Client,
}

impl PageFetcher {
    pub fn new(site: SiteConfig) -> anyhow::Result<Self> {
        // The site signals a missing book with a redirect, so page requests must see it.
        let pages = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("build page http client")?;
        let assets = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build asset http client")?;

        Ok(Self {
            site,
            pages,
            assets,
        })
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }

    pub fn fetch(&self, target: &Target) -> Result<Page, ScrapeError> {
        let url = target.url(&self.site)?;
        self.fetch_url(&url)
    }

    /// GET an HTML page without following redirects.
    pub fn fetch_url(&self, url: &Url) -> Result<Page, ScrapeError> {
        tracing::debug!(%url, "fetch page");

        let response = self
            .pages
            .get(url.clone())
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .map_err(|err| ScrapeError::network(url.as_str(), err))?;

        let status = response.status();
        if status.is_redirection() {
            return Err(ScrapeError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(ScrapeError::status(url.as_str(), status));
        }

        let body = response
            .text()
            .map_err(|err| ScrapeError::network(url.as_str(), err))?;
        Ok(Page::parse(url.clone(), &body))
    }

    /// GET the full body of an asset.
    pub fn get_bytes(&self, url: &Url) -> Result<Vec<u8>, ScrapeError> {
        tracing::debug!(%url, "fetch asset");

        let response = self
            .assets
            .get(url.clone())
            .send()
            .map_err(|err| ScrapeError::network(url.as_str(), err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::status(url.as_str(), status));
        }

        let bytes = response
            .bytes()
            .map_err(|err| ScrapeError::network(url.as_str(), err))?;
        Ok(bytes.to_vec())
    }
}
