use super::PageContent;

/// Plain text and markdown are taken as-is, one page.
pub fn extract_txt(bytes: &[u8]) -> Vec<PageContent> {
    // Try UTF-8 first, fall back to lossy conversion
    let text = String::from_utf8(bytes.to_vec())
        .unwrap_or_else(|_| String::from_utf8_lossy(bytes).into_owned());

    vec![PageContent {
        page_number: 1,
        text: text.trim().to_string(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_simple_text() {
        let pages = extract_txt(b"Hello, world!\nThis is a test file.");
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert!(pages[0].text.contains("Hello, world!"));
    }

    #[test]
    fn extract_utf8_text() {
        let content = "Ünïcödé — text".as_bytes();
        let pages = extract_txt(content);
        assert_eq!(pages[0].text, "Ünïcödé — text");
    }

    #[test]
    fn invalid_utf8_is_lossy() {
        let pages = extract_txt(&[b'o', b'k', 0xFF]);
        assert!(pages[0].text.starts_with("ok"));
    }

    #[test]
    fn trims_whitespace() {
        let pages = extract_txt(b"  \n  Hello  \n  ");
        assert_eq!(pages[0].text, "Hello");
    }
}
