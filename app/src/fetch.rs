//! Local transfers for the headless driver
//!
//! Documents and images are read from `file:` URIs. Other schemes are
//! reported as failures through the same page callbacks a networked host
//! would use.

use crate::markup;
use anyhow::{anyhow, bail, Context, Result};
use box_tree::ImageSize;
use doc_builder::FetchError;
use page::{NavigationRequest, Page};
use std::fs;
use url::Url;

/// Start URI from the command line: an absolute URI, or a local path
pub fn resolve_start_uri(arg: &str) -> Result<Url> {
    if let Ok(url) = Url::parse(arg) {
        return Ok(url);
    }
    let path = fs::canonicalize(arg).with_context(|| format!("Cannot open {}", arg))?;
    Url::from_file_path(&path).map_err(|()| anyhow!("Not an absolute path: {}", path.display()))
}

/// Run `request` to completion, feeding the markup in chunks of
/// `chunk_size` events
pub fn load_document(page: &mut Page, request: &NavigationRequest, chunk_size: usize) -> Result<()> {
    let generation = request.generation;
    let source = match read_document(&request.url) {
        Ok(source) => source,
        Err(err) => {
            page.load_failed(generation, &err.to_string());
            return Err(err);
        }
    };

    page.headers_received(generation, request.url.clone());
    let events = markup::tokenize(&source);
    tracing::debug!(events = events.len(), "Tokenized document");
    for chunk in events.chunks(chunk_size.max(1)) {
        page.chunk_received(generation, chunk.to_vec());
    }
    page.load_finished(generation)?;
    Ok(())
}

/// Complete every pending image fetch; returns how many changed the tree
pub fn load_images(page: &mut Page) -> usize {
    page.take_fetch_requests()
        .into_iter()
        .filter(|request| {
            let result = image_size(&request.url);
            page.image_loaded(request.ticket, result)
        })
        .count()
}

fn read_document(url: &Url) -> Result<String> {
    if url.scheme() != "file" {
        bail!("Scheme not supported: {}", url.scheme());
    }
    let path = url
        .to_file_path()
        .map_err(|()| anyhow!("Not a local path: {}", url))?;
    fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}

fn image_size(url: &Url) -> std::result::Result<ImageSize, FetchError> {
    if url.scheme() != "file" {
        return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
    }
    let path = url
        .to_file_path()
        .map_err(|()| FetchError::Transfer(format!("Not a local path: {}", url)))?;
    let (width, height) = image::image_dimensions(&path).map_err(|err| match err {
        image::ImageError::IoError(err) => FetchError::Transfer(err.to_string()),
        _ => FetchError::Decode,
    })?;
    Ok(ImageSize { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use page::{LoadState, StatusMessage};
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &[u8]) -> Url {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        Url::from_file_path(fs::canonicalize(&path).unwrap()).unwrap()
    }

    #[test]
    fn test_start_uri_forms() {
        assert_eq!(
            resolve_start_uri("http://example.com/").unwrap().as_str(),
            "http://example.com/"
        );
        assert!(resolve_start_uri("/nonexistent/wwwlite/page.html").is_err());

        let dir = TempDir::new().unwrap();
        let url = write_file(&dir, "page.html", b"<p>hi</p>");
        let path = url.to_file_path().unwrap();
        assert_eq!(resolve_start_uri(path.to_str().unwrap()).unwrap(), url);
    }

    #[test]
    fn test_local_document_in_small_chunks() {
        let dir = TempDir::new().unwrap();
        let url = write_file(&dir, "page.html", b"<p>one two</p><p>three</p>");
        let mut page = Page::default();
        let request = page.navigate(url.as_str()).unwrap();

        load_document(&mut page, &request, 1).unwrap();
        assert_eq!(page.load_state(), LoadState::Ready);
        let tree = page.tree().unwrap();
        let texts: Vec<String> = tree
            .inline_containers()
            .into_iter()
            .map(|id| tree.inline(id).unwrap().text())
            .collect();
        assert_eq!(texts, vec!["one two", "three"]);
    }

    #[test]
    fn test_remote_document_fails() {
        let mut page = Page::default();
        let request = page.navigate("http://example.com/").unwrap();
        assert!(load_document(&mut page, &request, 8).is_err());
        assert_eq!(page.load_state(), LoadState::Failed);
        assert!(page.take_status().contains(&StatusMessage::LoadFailed));
    }

    #[test]
    fn test_broken_image_keeps_placeholder() {
        let dir = TempDir::new().unwrap();
        write_file(&dir, "broken.png", b"not a png");
        let url = write_file(&dir, "page.html", b"<img src=\"broken.png\"><img src=\"http://example.com/x.png\">");
        let mut page = Page::default();
        let request = page.navigate(url.as_str()).unwrap();
        load_document(&mut page, &request, 8).unwrap();
        page.take_status();

        assert_eq!(load_images(&mut page), 0);
        let failures = page
            .take_status()
            .into_iter()
            .filter(|message| matches!(message, StatusMessage::ImageFailed(_)))
            .count();
        assert_eq!(failures, 2);
    }
}
