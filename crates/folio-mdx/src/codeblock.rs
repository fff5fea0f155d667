//! Code fence info string parsing.

/// Metadata parsed from a code fence info string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeInfo {
    /// Language tag (first word of the info string)
    pub language: Option<String>,

    /// Title shown above the block
    pub title: Option<String>,

    /// Whether line numbers were requested
    pub show_line_numbers: bool,
}

impl CodeInfo {
    /// Parse code fence info, e.g. `sql title="query.sql" showLineNumbers`.
    pub fn from_info(info: &str) -> Self {
        let language = info
            .split_whitespace()
            .next()
            .filter(|lang| !lang.contains('='))
            .map(str::to_string);

        Self {
            language,
            title: extract_title(info),
            show_line_numbers: info
                .split_whitespace()
                .any(|word| word == "showLineNumbers"),
        }
    }
}

/// Extract a title from code fence info string if present.
///
/// Supports formats like:
/// - `sql title="query.sql"`
/// - `sql title=query.sql`
pub fn extract_title(info: &str) -> Option<String> {
    if let Some(start) = info.find("title=\"") {
        let rest = &info[start + 7..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_string());
        }
    }

    if let Some(start) = info.find("title=") {
        let rest = &info[start + 6..];
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let title = rest[..end].trim_matches('"');
        if !title.is_empty() {
            return Some(title.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_language() {
        assert_eq!(
            CodeInfo::from_info("questdb-sql").language.as_deref(),
            Some("questdb-sql")
        );
        assert_eq!(CodeInfo::from_info("").language, None);
        assert_eq!(CodeInfo::from_info("title=\"x\"").language, None);
    }

    #[test]
    fn extracts_title() {
        assert_eq!(
            extract_title("sql title=\"Create table\""),
            Some("Create table".to_string())
        );
        assert_eq!(
            extract_title("toml title=server.conf showLineNumbers"),
            Some("server.conf".to_string())
        );
        assert_eq!(extract_title("rust"), None);
    }

    #[test]
    fn detects_line_numbers() {
        assert!(CodeInfo::from_info("java showLineNumbers").show_line_numbers);
        assert!(!CodeInfo::from_info("java").show_line_numbers);
    }
}
