/*!
 * Common test utilities for the gettext-cloud-translator test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use gettext_cloud_translator::app_config::{Backend, Config};

// Local HTTP server for wire contract tests
pub mod http_stub;

/// Route library log output through the test harness; `RUST_LOG` selects the level
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

// Header fields written by xgettext and msginit, in their usual order
fn header_fields(language: Option<&str>) -> Vec<String> {
    let mut fields = vec![
        "Project-Id-Version: demo 1.0".to_string(),
        "Report-Msgid-Bugs-To: ".to_string(),
        "POT-Creation-Date: 2024-03-01 12:00+0100".to_string(),
        "PO-Revision-Date: 2024-03-02 09:30+0100".to_string(),
        "Last-Translator: Jane Doe <jane@example.com>".to_string(),
        "Language-Team: Translators <team@example.com>".to_string(),
    ];
    if let Some(language) = language {
        fields.push(format!("Language: {}", language));
    }
    fields.extend([
        "MIME-Version: 1.0".to_string(),
        "Content-Type: text/plain; charset=UTF-8".to_string(),
        "Content-Transfer-Encoding: 8bit".to_string(),
        "Plural-Forms: nplurals=2; plural=(n != 1);".to_string(),
    ]);
    fields
}

fn render_header(fields: &[String]) -> String {
    let mut header = String::from("# Demo translations.\n#\nmsgid \"\"\nmsgstr \"\"\n");
    for field in fields {
        header.push_str(&format!("\"{}\\n\"\n", field));
    }
    header
}

/// Complete PO header declaring `language`
pub fn po_header(language: &str) -> String {
    render_header(&header_fields(Some(language)))
}

/// Complete PO header with every usual field except `Language`
pub fn po_header_without_language() -> String {
    render_header(&header_fields(None))
}

/// One singular PO entry
pub fn po_entry(msgid: &str, msgstr: &str, fuzzy: bool) -> String {
    let flag = if fuzzy { "#, fuzzy\n" } else { "" };
    format!("\n{}msgid \"{}\"\nmsgstr \"{}\"\n", flag, msgid, msgstr)
}

/// Writes a catalog with `count` untranslated entries named `entry N`
pub fn create_untranslated_catalog(dir: &Path, language: &str, count: usize) -> Result<PathBuf> {
    write_untranslated_catalog(dir, po_header(language), count)
}

/// Same as `create_untranslated_catalog` but without a `Language` header
pub fn create_untranslated_catalog_without_language(dir: &Path, count: usize) -> Result<PathBuf> {
    write_untranslated_catalog(dir, po_header_without_language(), count)
}

fn write_untranslated_catalog(dir: &Path, header: String, count: usize) -> Result<PathBuf> {
    let mut content = header;
    for index in 0..count {
        content.push_str(&po_entry(&format!("entry {}", index), "", false));
    }
    create_test_file(dir, "messages.po", &content)
}

/// Configuration pointing at `file` with retries that do not sleep
pub fn test_config(file: &Path, backend: Backend, target_language: &str) -> Config {
    Config {
        backend,
        api_key: "test-key".to_string(),
        file: file.to_path_buf(),
        target_language: target_language.to_string(),
        retry_backoff_ms: 0,
        ..Config::default()
    }
}
