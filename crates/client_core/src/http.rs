use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use url::Url;

pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid base url '{raw}'"))?;
    if url.cannot_be_a_base() {
        return Err(anyhow!("base url '{raw}' cannot carry a path"));
    }
    Ok(url)
}

/// Appends path segments to `base`, keeping any path the base already has.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| anyhow!("base url '{base}' cannot carry a path"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_existing_base_path() {
        let base = parse_base_url("https://geo.example/api/v1/localidades").expect("base");
        let url = endpoint(&base, &["estados", "SP", "municipios"]).expect("endpoint");
        assert_eq!(
            url.as_str(),
            "https://geo.example/api/v1/localidades/estados/SP/municipios"
        );
    }

    #[test]
    fn endpoint_handles_trailing_slash_on_base() {
        let base = parse_base_url("http://localhost:3333/").expect("base");
        let url = endpoint(&base, &["items"]).expect("endpoint");
        assert_eq!(url.as_str(), "http://localhost:3333/items");
    }

    #[test]
    fn rejects_non_hierarchical_base_urls() {
        assert!(parse_base_url("mailto:someone@example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
    }
}
