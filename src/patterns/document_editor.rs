//! A document editor split along single responsibilities: elements render,
//! the document aggregates, persistence backends store.

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait DocumentElement {
    fn render(&self) -> String;
}

pub struct TextElement {
    text: String,
}

impl TextElement {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl DocumentElement for TextElement {
    fn render(&self) -> String {
        format!("{}\n", self.text)
    }
}

pub struct ImageElement {
    path: String,
}

impl ImageElement {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentElement for ImageElement {
    fn render(&self) -> String {
        format!(
            "<img src=\"{}\" />\n",
            html_escape::encode_double_quoted_attribute(&self.path)
        )
    }
}

#[derive(Default)]
pub struct Document {
    elements: Vec<Box<dyn DocumentElement>>,
}

impl Document {
    pub fn add(&mut self, element: Box<dyn DocumentElement>) {
        self.elements.push(element);
    }

    pub fn render(&self) -> String {
        self.elements.iter().map(|e| e.render()).collect()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

pub trait Persistence {
    /// Returns a short description of where the content went.
    fn save(&self, content: &str) -> Result<String, PersistenceError>;
}

pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Persistence for FileStorage {
    fn save(&self, content: &str) -> Result<String, PersistenceError> {
        fs::write(&self.path, content).map_err(|source| PersistenceError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), bytes = content.len(), "document written");
        Ok(format!("Document saved to {}", self.path.display()))
    }
}

/// Stand-in for a database; keeps every saved revision in memory.
#[derive(Default)]
pub struct DatabaseStorage {
    revisions: RefCell<Vec<String>>,
}

impl DatabaseStorage {
    pub fn revisions(&self) -> Vec<String> {
        self.revisions.borrow().clone()
    }
}

impl Persistence for DatabaseStorage {
    fn save(&self, content: &str) -> Result<String, PersistenceError> {
        let mut revisions = self.revisions.borrow_mut();
        revisions.push(content.to_string());
        Ok(format!("Document saved to database (revision {})", revisions.len()))
    }
}

pub struct DocumentEditor<'a> {
    document: Document,
    storage: &'a dyn Persistence,
    rendered: Option<String>,
}

impl<'a> DocumentEditor<'a> {
    pub fn new(storage: &'a dyn Persistence) -> Self {
        Self {
            document: Document::default(),
            storage,
            rendered: None,
        }
    }

    pub fn add_text(&mut self, text: impl Into<String>) {
        self.document.add(Box::new(TextElement::new(text)));
        self.rendered = None;
    }

    pub fn add_image(&mut self, path: impl Into<String>) {
        self.document.add(Box::new(ImageElement::new(path)));
        self.rendered = None;
    }

    /// Cached until the next edit.
    pub fn render(&mut self) -> &str {
        let document = &self.document;
        self.rendered.get_or_insert_with(|| document.render())
    }

    pub fn save(&mut self) -> Result<String, PersistenceError> {
        let content = self.render().to_string();
        self.storage.save(&content)
    }
}

pub fn demo(config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Document editor");

    let file = FileStorage::new(&config.document.output_path);
    let mut editor = DocumentEditor::new(&file);
    editor.add_text("Hello, world!");
    editor.add_image("picture.jpg");
    editor.add_text("This is a document editor.");

    t.extend(editor.render().lines().map(str::to_string));
    t.line(editor.save()?);

    let db = DatabaseStorage::default();
    let mut editor = DocumentEditor::new(&db);
    editor.add_text("Stored elsewhere");
    t.line(editor.save()?);
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elements_render_in_order() {
        let db = DatabaseStorage::default();
        let mut editor = DocumentEditor::new(&db);
        editor.add_text("Hello");
        editor.add_image("a.png");
        assert_eq!(editor.render(), "Hello\n<img src=\"a.png\" />\n");
    }

    #[test]
    fn test_image_path_is_escaped() {
        let img = ImageElement::new("a\"b.png");
        assert_eq!(img.render(), "<img src=\"a&quot;b.png\" />\n");
    }

    #[test]
    fn test_render_cache_is_invalidated_by_edits() {
        let db = DatabaseStorage::default();
        let mut editor = DocumentEditor::new(&db);
        editor.add_text("one");
        assert_eq!(editor.render(), "one\n");
        editor.add_text("two");
        assert_eq!(editor.render(), "one\ntwo\n");
    }

    #[test]
    fn test_file_storage_writes_rendered_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("document.txt");
        let storage = FileStorage::new(&path);

        let mut editor = DocumentEditor::new(&storage);
        editor.add_text("line");
        editor.save().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "line\n");
    }

    #[test]
    fn test_file_storage_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("missing").join("doc.txt"));
        assert!(matches!(
            storage.save("x"),
            Err(PersistenceError::Write { .. })
        ));
    }

    #[test]
    fn test_database_keeps_revisions() {
        let db = DatabaseStorage::default();
        db.save("a").unwrap();
        let msg = db.save("b").unwrap();
        assert!(msg.contains("revision 2"));
        assert_eq!(db.revisions(), vec!["a", "b"]);
    }
}
