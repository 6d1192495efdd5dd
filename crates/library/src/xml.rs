//! Minimal XML element scanner for LaunchBox catalog files.
//!
//! LaunchBox emits plain element trees with text content and no
//! attributes we care about, so a full XML parser is unnecessary. This
//! scanner extracts repeated element bodies and child text, and
//! unescapes the five predefined entities. It does not handle CDATA or
//! processing instructions, which LaunchBox catalogs do not contain.

/// Returns the inner text of each `<tag>...</tag>` occurrence in `src`.
///
/// Self-closing `<tag/>` occurrences yield an empty body. A `<tagname`
/// prefix of a longer element name does not match.
pub fn blocks<'a>(src: &'a str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");

    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(found) = src[pos..].find(&open) {
        let after_name = pos + found + open.len();
        let rest = &src[after_name..];

        let Some(gt) = rest.find('>') else {
            break;
        };
        let head = &rest[..gt];

        // The open tag ends with '>', whitespace (attributes), or '/'
        // (self-closing). Anything else is a longer element name.
        if !head.is_empty() && !head.starts_with(|c: char| c.is_whitespace() || c == '/') {
            pos = after_name;
            continue;
        }

        if head.ends_with('/') {
            out.push(&src[after_name..after_name]);
            pos = after_name + gt + 1;
            continue;
        }

        let body_start = after_name + gt + 1;
        let Some(end) = src[body_start..].find(&close) else {
            break;
        };

        out.push(&src[body_start..body_start + end]);
        pos = body_start + end + close.len();
    }

    out
}

/// Returns the unescaped, trimmed text of the first `<tag>` child in
/// `block`, if present and non-empty.
pub fn child_text(block: &str, tag: &str) -> Option<String> {
    let body = blocks(block, tag).first().map(|s| unescape(s.trim()))?;
    if body.is_empty() { None } else { Some(body) }
}

/// Unescapes the predefined XML entities.
fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_repeated_blocks() {
        let src = "<LaunchBox><Game><Title>A</Title></Game><Game><Title>B</Title></Game></LaunchBox>";
        let games = blocks(src, "Game");
        assert_eq!(games.len(), 2);
        assert_eq!(child_text(games[0], "Title").as_deref(), Some("A"));
        assert_eq!(child_text(games[1], "Title").as_deref(), Some("B"));
    }

    #[test]
    fn tag_name_prefix_does_not_match() {
        let src = "<GameTitle>wrong</GameTitle><Game><Title>right</Title></Game>";
        let games = blocks(src, "Game");
        assert_eq!(games.len(), 1);
        assert_eq!(child_text(games[0], "Title").as_deref(), Some("right"));
    }

    #[test]
    fn self_closing_yields_empty() {
        let src = "<Game/><Game><Title>X</Title></Game>";
        let games = blocks(src, "Game");
        assert_eq!(games.len(), 2);
        assert!(games[0].is_empty());
    }

    #[test]
    fn attributes_are_skipped() {
        let src = r#"<Game hidden="true"><Title>T</Title></Game>"#;
        let games = blocks(src, "Game");
        assert_eq!(games.len(), 1);
        assert_eq!(child_text(games[0], "Title").as_deref(), Some("T"));
    }

    #[test]
    fn missing_child_is_none() {
        assert_eq!(child_text("<Game></Game>", "Title"), None);
        assert_eq!(child_text("<Game><Title>  </Title></Game>", "Title"), None);
    }

    #[test]
    fn entities_unescape() {
        let src = "<Title>Pac &amp; Pal &lt;Demo&gt; &quot;Rev A&quot; &apos;88</Title>";
        assert_eq!(
            child_text(src, "Title").as_deref(),
            Some(r#"Pac & Pal <Demo> "Rev A" '88"#)
        );
    }

    #[test]
    fn unterminated_block_is_dropped() {
        let src = "<Game><Title>A</Title>";
        assert!(blocks(src, "Game").is_empty());
    }
}
