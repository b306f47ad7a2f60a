use reqwest::header::HeaderMap;

/// Extract the rel="next" target from an RFC 5988 `Link` header — the
/// only pagination link the platform client follows when draining
/// pages. Anything else in the header (`prev`, `last`, ...) is noise
/// here and is skipped.
pub fn next_link(headers: &HeaderMap) -> Option<String> {
    let header = headers.get("link")?.to_str().ok()?;
    header.split(',').find_map(|entry| {
        let (target, params) = entry.split_once(';')?;
        let is_next = params.split(';').any(|p| {
            p.trim()
                .strip_prefix("rel=")
                .is_some_and(|rel| rel.trim_matches('"') == "next")
        });
        if !is_next {
            return None;
        }
        let target = target.trim();
        Some(target.strip_prefix('<')?.strip_suffix('>')?.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    fn headers(link: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("link", HeaderValue::from_static(link));
        headers
    }

    #[test]
    fn picks_the_next_link_out_of_several_rels() {
        let headers = headers(
            "<https://api.example.com/api/properties?page=1>; rel=\"first\", \
             <https://api.example.com/api/properties?page=2>; rel=\"next\", \
             <https://api.example.com/api/properties?page=9>; rel=\"last\"",
        );
        assert_eq!(
            next_link(&headers).as_deref(),
            Some("https://api.example.com/api/properties?page=2")
        );
    }

    #[test]
    fn no_next_rel_means_last_page() {
        let headers = headers("<https://api.example.com/api/properties?page=9>; rel=\"last\"");
        assert_eq!(next_link(&headers), None);
    }

    #[test]
    fn missing_header_means_single_page() {
        assert_eq!(next_link(&HeaderMap::new()), None);
    }
}
