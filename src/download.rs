use std::path::{Path, PathBuf};

use url::Url;

use crate::error::ScrapeError;
use crate::fetch::PageFetcher;

const MAX_FILE_NAME_BYTES: usize = 255;

/// Saves site-relative assets (covers, plain-text editions) into local folders.
#[derive(Debug, Clone)]
pub struct AssetDownloader {
    fetcher: PageFetcher,
}

impl AssetDownloader {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Download `relative_url` into `destination_folder`.
    ///
    /// The file is named after `filename_override` when given, otherwise after the
    /// last path segment of the URL. Either name is sanitized for the local filesystem.
    pub fn download(
        &self,
        relative_url: &str,
        destination_folder: &Path,
        filename_override: Option<&str>,
    ) -> Result<PathBuf, ScrapeError> {
        let url = self.fetcher.site().resolve(relative_url).map_err(|err| {
            ScrapeError::parse(
                self.fetcher.site().root.as_str(),
                format!("asset url {relative_url:?}: {err}"),
            )
        })?;

        let filename = match filename_override {
            Some(name) => sanitize_filename::sanitize(name),
            None => basename(&url),
        };
        if filename.is_empty() {
            return Err(ScrapeError::parse(url.as_str(), "cannot derive a file name"));
        }

        let bytes = self.fetcher.get_bytes(&url)?;

        std::fs::create_dir_all(destination_folder).map_err(|source| ScrapeError::Io {
            path: destination_folder.to_path_buf(),
            source,
        })?;
        let path = destination_folder.join(filename);
        std::fs::write(&path, &bytes).map_err(|source| ScrapeError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::debug!(%url, path = %path.display(), bytes = bytes.len(), "saved asset");
        Ok(path)
    }

    pub fn download_image(&self, image_url: &str, folder: &Path) -> Result<PathBuf, ScrapeError> {
        self.download(image_url, folder, None)
    }

    pub fn download_text(
        &self,
        text_url: &str,
        title: &str,
        folder: &Path,
    ) -> Result<PathBuf, ScrapeError> {
        self.download(text_url, folder, Some(&file_name(title, "txt")))
    }
}

/// Sanitized `{stem}.{extension}`, with the stem shortened so the extension fits.
fn file_name(stem: &str, extension: &str) -> String {
    let stem = sanitize_filename::sanitize(stem);
    let mut end = stem
        .len()
        .min(MAX_FILE_NAME_BYTES.saturating_sub(extension.len() + 1));
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    let stem = stem[..end].trim_end_matches(['.', ' ']);
    format!("{stem}.{extension}")
}

/// Decoded final path segment; empty when the path ends with `/`.
fn basename(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    let decoded = percent_encoding::percent_decode_str(segment).decode_utf8_lossy();
    sanitize_filename::sanitize(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basename_is_last_path_segment() -> anyhow::Result<()> {
        assert_eq!(basename(&Url::parse("https://tululu.org/shots/239.jpg")?), "239.jpg");
        assert_eq!(basename(&Url::parse("https://tululu.org/images/nopic.gif")?), "nopic.gif");
        assert_eq!(basename(&Url::parse("https://tululu.org/")?), "");
        assert_eq!(basename(&Url::parse("https://tululu.org/shots/")?), "");
        assert_eq!(
            basename(&Url::parse("https://tululu.org/shots/обложка.jpg")?),
            "обложка.jpg"
        );
        assert_eq!(basename(&Url::parse("https://tululu.org/shots/a%2Fb.jpg")?), "ab.jpg");
        Ok(())
    }

    #[test]
    fn long_titles_keep_the_extension() {
        let title = "я".repeat(130);
        let name = file_name(&title, "txt");

        assert!(name.ends_with(".txt"), "{name}");
        assert!(name.len() <= MAX_FILE_NAME_BYTES);
        assert!(name.starts_with("яяя"));
        assert_eq!(sanitize_filename::sanitize(&name), name);
    }

    #[test]
    fn file_name_strips_unsafe_characters() {
        assert_eq!(file_name("Да/Нет", "txt"), "ДаНет.txt");
        assert_eq!(file_name("Эта книга", "txt"), "Эта книга.txt");
    }
}
