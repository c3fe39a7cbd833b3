//! Field extraction rules over a fetched [`Page`].
//!
//! Every rule is a CSS selector or a `title` attribute substring held in
//! [`Markup`], so a change in the site's markup only touches that value.

use scraper::{ElementRef, Selector};

use crate::error::ScrapeError;
use crate::fetch::Page;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup {
    /// Heading holding `title :: author`.
    pub heading: String,
    pub title_separator: String,
    pub cover_image: String,
    /// Substring of the `title` attribute on the plain-text download link.
    pub text_download_title: String,
    pub comment_block: String,
    pub comment_text: String,
    /// Substring of the `title` attribute on genre links.
    pub genre_title: String,
    /// Region of a listing page that holds the book links.
    pub listing_region: String,
    /// Substring of the `title` attribute on "read online" links.
    pub read_online_title: String,
    pub page_number: String,
}

impl Markup {
    pub fn tululu() -> Self {
        Self {
            heading: "table.tabs div#content h1".to_owned(),
            title_separator: "::".to_owned(),
            cover_image: "table.d_book img".to_owned(),
            text_download_title: "скачать книгу txt".to_owned(),
            comment_block: "div.texts".to_owned(),
            comment_text: "span".to_owned(),
            genre_title: "перейти к книгам этого жанра".to_owned(),
            listing_region: "#content".to_owned(),
            read_online_title: "читать online".to_owned(),
            page_number: "a.npage".to_owned(),
        }
    }
}

impl Default for Markup {
    fn default() -> Self {
        Self::tululu()
    }
}

fn selector(page: &Page, css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|err| {
        ScrapeError::parse(
            page.url().as_str(),
            format!("invalid selector {css:?}: {err}"),
        )
    })
}

fn title_contains(scope: &str, element: &str, needle: &str) -> String {
    let needle = needle.replace('\\', "\\\\").replace('"', "\\\"");
    let css = format!("{element}[title*=\"{needle}\"]");
    if scope.is_empty() {
        css
    } else {
        format!("{scope} {css}")
    }
}

/// All elements matching `css`, in document order.
pub fn select_all<'a>(page: &'a Page, css: &str) -> Result<Vec<ElementRef<'a>>, ScrapeError> {
    let selector = selector(page, css)?;
    Ok(page.html().select(&selector).collect())
}

/// All elements under `scope` whose `title` attribute contains `needle`.
pub fn select_titled<'a>(
    page: &'a Page,
    scope: &str,
    element: &str,
    needle: &str,
) -> Result<Vec<ElementRef<'a>>, ScrapeError> {
    select_all(page, &title_contains(scope, element, needle))
}

fn text_of(element: &ElementRef<'_>) -> String {
    element.text().collect()
}

pub fn title_author(page: &Page, markup: &Markup) -> Result<(String, String), ScrapeError> {
    let heading = select_all(page, &markup.heading)?
        .into_iter()
        .next()
        .ok_or_else(|| ScrapeError::parse(page.url().as_str(), "missing title heading"))?;
    let text = text_of(&heading);

    let mut parts = text.split(markup.title_separator.as_str());
    match (parts.next(), parts.next(), parts.next()) {
        (Some(title), Some(author), None) => {
            Ok((title.trim().to_owned(), author.trim().to_owned()))
        }
        _ => Err(ScrapeError::parse(
            page.url().as_str(),
            format!(
                "title heading {:?} is not `title {} author`",
                text.trim(),
                markup.title_separator
            ),
        )),
    }
}

/// Site-relative `src` of the cover image.
pub fn image_url(page: &Page, markup: &Markup) -> Result<String, ScrapeError> {
    select_all(page, &markup.cover_image)?
        .into_iter()
        .find_map(|img| img.value().attr("src").map(str::to_owned))
        .ok_or_else(|| ScrapeError::parse(page.url().as_str(), "missing cover image"))
}

/// Site-relative link to the plain-text edition, if the book has one.
pub fn text_download_url(page: &Page, markup: &Markup) -> Result<Option<String>, ScrapeError> {
    Ok(select_titled(page, "", "a", &markup.text_download_title)?
        .into_iter()
        .find_map(|a| a.value().attr("href").map(str::to_owned)))
}

pub fn require_text_download_url(page: &Page, markup: &Markup) -> Result<String, ScrapeError> {
    text_download_url(page, markup)?.ok_or_else(|| ScrapeError::MissingTextEdition {
        url: page.url().to_string(),
    })
}

pub fn comments(page: &Page, markup: &Markup) -> Result<Vec<String>, ScrapeError> {
    let text = selector(page, &markup.comment_text)?;
    Ok(select_all(page, &markup.comment_block)?
        .into_iter()
        .filter_map(|block| block.select(&text).next().map(|span| text_of(&span)))
        .collect())
}

pub fn genres(page: &Page, markup: &Markup) -> Result<Vec<String>, ScrapeError> {
    Ok(select_titled(page, "", "a", &markup.genre_title)?
        .iter()
        .map(text_of)
        .collect())
}

/// `href` of every "read online" link in the listing region, in document order.
pub fn listing_book_hrefs(page: &Page, markup: &Markup) -> Result<Vec<String>, ScrapeError> {
    Ok(select_titled(page, &markup.listing_region, "", &markup.read_online_title)?
        .into_iter()
        .filter_map(|el| el.value().attr("href").map(str::to_owned))
        .collect())
}

pub fn last_page_number(page: &Page, markup: &Markup) -> Result<u32, ScrapeError> {
    let last = select_all(page, &markup.page_number)?
        .into_iter()
        .last()
        .ok_or_else(|| ScrapeError::parse(page.url().as_str(), "missing page number links"))?;
    let text = text_of(&last);
    text.trim().parse().map_err(|_| {
        ScrapeError::parse(
            page.url().as_str(),
            format!("page number {:?} is not an integer", text.trim()),
        )
    })
}
