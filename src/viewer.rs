//! File view classification - decides how a file attachment is shown
//!
//! Pure functions only: the I/O (fetching content, handing a URL to the OS)
//! happens in the network layer.

use crate::constants::BROWSER_VIEWABLE;

/// How a file should be viewed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// Hand the view URL to the OS (images, PDFs, plain text)
    External,
    /// Fetch the content and show it inline
    Inline(ContentFormat),
}

/// Inline rendering format
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentFormat {
    Json,
    Yaml,
    Raw,
}

impl ContentFormat {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "json" => ContentFormat::Json,
            "yaml" | "yml" => ContentFormat::Yaml,
            _ => ContentFormat::Raw,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFormat::Json => "JSON",
            ContentFormat::Yaml => "YAML",
            ContentFormat::Raw => "text",
        }
    }
}

/// Lowercased text after the last `.`; a name without a dot yields the whole name.
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit('.')
        .next()
        .unwrap_or(filename)
        .to_lowercase()
}

/// Classify a file by its name.
pub fn classify(filename: &str) -> ViewMode {
    let ext = file_extension(filename);
    if BROWSER_VIEWABLE.contains(&ext.as_str()) {
        ViewMode::External
    } else {
        ViewMode::Inline(ContentFormat::from_extension(&ext))
    }
}

/// Content ready for display
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedContent {
    pub text: String,
    pub format: ContentFormat,
    /// Set when a structured format failed to parse; `text` is then the raw content.
    pub parse_error: Option<String>,
}

/// Pretty-print structured content, falling back to the raw text on parse errors.
pub fn render_content(content: &str, extension: &str) -> RenderedContent {
    let format = ContentFormat::from_extension(extension);
    let pretty = match format {
        ContentFormat::Json => pretty_json(content),
        ContentFormat::Yaml => pretty_yaml(content),
        ContentFormat::Raw => Ok(content.to_string()),
    };

    match pretty {
        Ok(text) => RenderedContent {
            text,
            format,
            parse_error: None,
        },
        Err(e) => RenderedContent {
            text: content.to_string(),
            format,
            parse_error: Some(format!("Invalid {}: {}", format.as_str(), e)),
        },
    }
}

fn pretty_json(content: &str) -> Result<String, String> {
    let value: serde_json::Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&value).map_err(|e| e.to_string())
}

fn pretty_yaml(content: &str) -> Result<String, String> {
    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    serde_yaml::to_string(&value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_lowercased_last_segment() {
        assert_eq!(file_extension("Report.Final.PDF"), "pdf");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("Makefile"), "makefile");
    }

    #[test]
    fn test_allow_listed_extensions_open_externally() {
        for name in [
            "a.jpg", "b.JPEG", "c.png", "d.gif", "e.bmp", "f.webp", "g.pdf", "notes.TXT",
        ] {
            assert_eq!(classify(name), ViewMode::External, "{name}");
        }
    }

    #[test]
    fn test_everything_else_is_inline() {
        assert_eq!(classify("data.json"), ViewMode::Inline(ContentFormat::Json));
        assert_eq!(classify("ci.YML"), ViewMode::Inline(ContentFormat::Yaml));
        assert_eq!(classify("main.rs"), ViewMode::Inline(ContentFormat::Raw));
        assert_eq!(classify("README"), ViewMode::Inline(ContentFormat::Raw));
    }

    #[test]
    fn test_json_is_pretty_printed() {
        let rendered = render_content(r#"{"a":1,"b":[true]}"#, "json");
        assert_eq!(rendered.parse_error, None);
        assert_eq!(rendered.text, "{\n  \"a\": 1,\n  \"b\": [\n    true\n  ]\n}");
    }

    #[test]
    fn test_invalid_json_falls_back_to_raw() {
        let rendered = render_content("{not json", "json");
        assert_eq!(rendered.text, "{not json");
        assert!(rendered.parse_error.unwrap().starts_with("Invalid JSON"));
    }

    #[test]
    fn test_yaml_round_trips_and_reports_errors() {
        let rendered = render_content("name:   Launch\ntags: [a, b]", "yaml");
        assert_eq!(rendered.parse_error, None);
        assert!(rendered.text.contains("name: Launch"));

        let broken = render_content("key: [unclosed", "yml");
        assert!(broken.parse_error.is_some());
        assert_eq!(broken.text, "key: [unclosed");
    }

    #[test]
    fn test_raw_content_untouched() {
        let rendered = render_content("fn main() {}\n", "rs");
        assert_eq!(rendered.format, ContentFormat::Raw);
        assert_eq!(rendered.text, "fn main() {}\n");
    }
}
