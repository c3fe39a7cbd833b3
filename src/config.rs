use std::fmt;
use std::path::PathBuf;

use anyhow::Context as _;
use url::Url;

pub const DEFAULT_SITE_URL: &str = "https://tululu.org/";
pub const DEFAULT_CATEGORY: &str = "/l55/";
pub const CATALOG_FILE_NAME: &str = "library.json";

/// Numeric id of a book on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(pub u32);

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What to do when one listing page of a category cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ListingFailurePolicy {
    /// Stop listing and report the failing page.
    Abort,
    /// Log the failing page and continue with the next one.
    #[default]
    Skip,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub root: Url,
    /// Category listing path, always with leading and trailing `/`.
    pub category: String,
    pub listing_policy: ListingFailurePolicy,
}

impl SiteConfig {
    pub fn new(root: Url) -> Self {
        Self {
            root,
            category: DEFAULT_CATEGORY.to_owned(),
            listing_policy: ListingFailurePolicy::default(),
        }
    }

    pub fn parse(root: &str) -> anyhow::Result<Self> {
        let root = Url::parse(root).with_context(|| format!("parse site url {root:?}"))?;
        if root.scheme() != "http" && root.scheme() != "https" {
            anyhow::bail!("site url must be http/https: {root}");
        }
        Ok(Self::new(root))
    }

    #[must_use]
    pub fn with_category(mut self, category: &str) -> Self {
        let trimmed = category.trim_matches('/');
        self.category = if trimmed.is_empty() {
            "/".to_owned()
        } else {
            format!("/{trimmed}/")
        };
        self
    }

    #[must_use]
    pub fn with_listing_policy(mut self, policy: ListingFailurePolicy) -> Self {
        self.listing_policy = policy;
        self
    }

    pub fn book_url(&self, id: BookId) -> Result<Url, url::ParseError> {
        self.resolve(&format!("/b{id}/"))
    }

    /// First listing page when `page` is `None`, otherwise `{category}{page}`.
    pub fn category_url(&self, page: Option<u32>) -> Result<Url, url::ParseError> {
        match page {
            Some(page) => self.resolve(&format!("{}{page}", self.category)),
            None => self.resolve(&self.category),
        }
    }

    pub fn resolve(&self, relative: &str) -> Result<Url, url::ParseError> {
        self.root.join(relative)
    }
}

#[derive(Debug, Clone)]
pub struct CatalogOptions {
    pub skip_images: bool,
    pub skip_text: bool,
    pub books_folder: PathBuf,
    pub images_folder: PathBuf,
    /// Directory receiving `library.json`.
    pub json_path: PathBuf,
}

impl CatalogOptions {
    pub fn catalog_file(&self) -> PathBuf {
        self.json_path.join(CATALOG_FILE_NAME)
    }
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            skip_images: false,
            skip_text: false,
            books_folder: PathBuf::from("books"),
            images_folder: PathBuf::from("images"),
            json_path: PathBuf::from("."),
        }
    }
}
