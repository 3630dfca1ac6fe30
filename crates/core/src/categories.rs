use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Label for files whose extension matches no rule.
pub const DEFAULT_CATEGORY: &str = "otros";

// Browser temp extensions; these files are still being written.
const TEMP_EXTENSIONS: [&str; 3] = ["crdownload", "part", "tmp"];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CategoryRule {
    pub label: String,
    pub extensions: Vec<String>,
}

impl CategoryRule {
    fn new(label: &str, extensions: &[&str]) -> Self {
        CategoryRule {
            label: label.to_string(),
            extensions: extensions.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// The built-in rule table. Checked in order; first match wins.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "datos",
            &[
                "xls", "xlsx", "xlsm", "ods", "csv", "tsv", "sql", "sqlite", "db", "mdb",
                "accdb", "dump", "bak", "parquet", "feather", "orc",
            ],
        ),
        CategoryRule::new(
            "documentos",
            &[
                "pdf", "txt", "doc", "docx", "ppt", "pptx", "vtt", "odt", "rtf", "epub",
                "md", "srt",
            ],
        ),
        CategoryRule::new(
            "imagenes",
            &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp"],
        ),
        CategoryRule::new(
            "videos",
            &["mp4", "mkv", "avi", "mov", "wmv", "flv", "webm"],
        ),
        CategoryRule::new("comprimidos", &["zip", "rar", "7z", "gz", "tar", "bz2", "xz"]),
        CategoryRule::new(
            "scripts",
            &[
                "py", "ipynb", "js", "ts", "json", "rs", "c", "cpp", "cxx", "h", "hpp",
                "html", "htm", "css", "sh", "bat", "ps1",
            ],
        ),
    ]
}

/// Returns the category label for an extension, or [`DEFAULT_CATEGORY`] if
/// no rule matches. Total over all strings; the leading dot is optional and
/// matching is case-insensitive.
pub fn classify<'a>(rules: &'a [CategoryRule], extension: &str) -> &'a str {
    let ext = normalize_ext(extension);
    rules
        .iter()
        .find(|r| r.extensions.iter().any(|e| normalize_ext(e) == ext))
        .map(|r| r.label.as_str())
        .unwrap_or(DEFAULT_CATEGORY)
}

/// True for in-progress browser downloads (.crdownload, .part, .tmp).
pub fn is_temp_download(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TEMP_EXTENSIONS.contains(&normalize_ext(e).as_str()))
        .unwrap_or(false)
}

fn normalize_ext(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

/// Loads a rule table from a directory of TOML files, one rule per file,
/// ordered by file name. A missing directory yields the built-in table.
pub fn load_rules_from_dir(dir: &Path) -> anyhow::Result<Vec<CategoryRule>> {
    if !dir.exists() {
        return Ok(default_rules());
    }
    let mut entries: Vec<_> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("toml"))
        .map(|e| e.path())
        .collect();
    entries.sort();
    let mut rules = Vec::new();
    for path in entries {
        let content = fs::read_to_string(&path)?;
        let rule: CategoryRule = toml::from_str(&content)?;
        rules.push(rule);
    }
    if rules.is_empty() {
        return Ok(default_rules());
    }
    Ok(rules)
}
