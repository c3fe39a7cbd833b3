use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{
    CatalogOptions, DEFAULT_CATEGORY, DEFAULT_SITE_URL, ListingFailurePolicy, SiteConfig,
};

/// Download books from tululu.org: title, author, genres, cover, text and comments.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Catalog books by id, from START_ID up to (not including) END_ID.
    Ids(IdsArgs),
    /// Catalog every book listed on a range of category pages.
    Category(CategoryArgs),
}

#[derive(Debug, Args)]
pub struct IdsArgs {
    /// Book id to start parsing with.
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub start_id: u32,

    /// Book id to stop parsing at (exclusive).
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub end_id: u32,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Debug, Args)]
pub struct CategoryArgs {
    /// First listing page to read.
    #[arg(short = 's', long, alias = "start_page", default_value_t = 1)]
    pub start_page: u32,

    /// Last listing page to read (default: the category's last page).
    #[arg(short = 'e', long, alias = "end_page")]
    pub end_page: Option<u32>,

    /// Category listing path on the site.
    #[arg(long, default_value = DEFAULT_CATEGORY)]
    pub category: String,

    /// What to do when a listing page cannot be fetched.
    #[arg(long, value_enum, default_value_t = ListingFailurePolicy::Skip)]
    pub on_page_error: ListingFailurePolicy,

    #[command(flatten)]
    pub catalog: CatalogArgs,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Root URL of the site.
    #[arg(long, default_value = DEFAULT_SITE_URL)]
    pub site_url: String,

    /// Do not download cover images.
    #[arg(long, alias = "skip_imgs")]
    pub skip_imgs: bool,

    /// Do not download plain-text editions.
    #[arg(long, alias = "skip_txt")]
    pub skip_txt: bool,

    /// Folder for downloaded books.
    #[arg(long, alias = "books_folder", default_value = "books")]
    pub books_folder: PathBuf,

    /// Folder for downloaded cover images.
    #[arg(long, alias = "imgs_folder", default_value = "images")]
    pub imgs_folder: PathBuf,

    /// Folder for `library.json`.
    #[arg(long, alias = "json_path", default_value = ".")]
    pub json_path: PathBuf,
}

impl CatalogArgs {
    pub fn site_config(&self) -> anyhow::Result<SiteConfig> {
        SiteConfig::parse(&self.site_url)
    }

    pub fn options(&self) -> CatalogOptions {
        CatalogOptions {
            skip_images: self.skip_imgs,
            skip_text: self.skip_txt,
            books_folder: self.books_folder.clone(),
            images_folder: self.imgs_folder.clone(),
            json_path: self.json_path.clone(),
        }
    }
}
