//! SOP documents served by the backend.
//!
//! The directory is read once at startup. `.docx` and `.txt` files contribute
//! their text to the prompt context and their names to the download list.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    directory: PathBuf,
    names: Vec<String>,
    content: String,
}

impl DocumentStore {
    /// Load every readable document in `directory`.
    ///
    /// Unreadable files are logged and skipped; a missing directory gives an
    /// empty store.
    pub fn load(directory: &Path) -> Self {
        let mut store = Self {
            directory: directory.to_path_buf(),
            ..Self::default()
        };

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Directory not found: {} ({})", directory.display(), e);
                return store;
            }
        };

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        for path in paths {
            let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
                continue;
            };

            let loaded = match extension(&path).as_deref() {
                Some("docx") => load_docx(&path),
                Some("txt") => load_txt(&path),
                _ => continue,
            };

            match loaded {
                Ok(text) if !text.trim().is_empty() => {
                    store.content.push_str(&format!("\n\n=== {} ===\n{}", name, text));
                    store.names.push(name);
                    info!("Loaded: {}", path.display());
                }
                Ok(_) => warn!("Skipping empty document: {}", name),
                Err(e) => error!("Error loading {}: {:#}", name, e),
            }
        }

        store
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Combined text of every loaded document.
    pub fn content(&self) -> &str {
        &self.content
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

fn load_txt(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

/// Extract paragraph text from a Word document.
fn load_docx(path: &Path) -> Result<String> {
    let file = fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).context("not a zip archive")?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("missing word/document.xml")?
        .read_to_string(&mut xml)?;

    docx_paragraphs(&xml)
}

/// Join the text of each `<w:p>` with newlines, dropping blank paragraphs.
fn docx_paragraphs(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => in_text = true,
            Event::End(e) if e.local_name().as_ref() == b"t" => in_text = false,
            Event::End(e) if e.local_name().as_ref() == b"p" => {
                let paragraph = std::mem::take(&mut current);
                if !paragraph.trim().is_empty() {
                    paragraphs.push(paragraph);
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"tab" => current.push('\t'),
            Event::Text(text) if in_text => current.push_str(&text.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}
