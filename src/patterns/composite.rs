/* ===============================
   Composite: files and folders
   =============================== */

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Debug, Clone, PartialEq)]
pub enum FileSystemItem {
    File { name: String, size: u64 },
    Folder { name: String, children: Vec<FileSystemItem> },
}

impl FileSystemItem {
    pub fn file(name: impl Into<String>, size: u64) -> Self {
        Self::File {
            name: name.into(),
            size,
        }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Self::Folder {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn with(mut self, child: FileSystemItem) -> Self {
        self.add(child);
        self
    }

    /// No-op on files.
    pub fn add(&mut self, child: FileSystemItem) {
        if let Self::Folder { children, .. } = self {
            children.push(child);
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Folder { name, .. } => name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder { .. })
    }

    pub fn size(&self) -> u64 {
        match self {
            Self::File { size, .. } => *size,
            Self::Folder { children, .. } => children.iter().map(Self::size).sum(),
        }
    }

    /// Immediate children; folders are prefixed with `+ `.
    pub fn ls(&self) -> Vec<String> {
        match self {
            Self::File { name, .. } => vec![name.clone()],
            Self::Folder { children, .. } => children
                .iter()
                .map(|c| {
                    if c.is_folder() {
                        format!("+ {}", c.name())
                    } else {
                        c.name().to_string()
                    }
                })
                .collect(),
        }
    }

    /// The whole subtree, four spaces per level.
    pub fn open_all(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.walk(0, &mut out);
        out
    }

    fn walk(&self, depth: usize, out: &mut Vec<String>) {
        let pad = " ".repeat(depth * 4);
        match self {
            Self::File { name, .. } => out.push(format!("{pad}{name}")),
            Self::Folder { name, children } => {
                out.push(format!("{pad}+ {name}"));
                for child in children {
                    child.walk(depth + 1, out);
                }
            }
        }
    }

    pub fn cd(&self, target: &str) -> Option<&FileSystemItem> {
        match self {
            Self::File { .. } => None,
            Self::Folder { children, .. } => children
                .iter()
                .find(|c| c.is_folder() && c.name() == target),
        }
    }
}

pub fn sample_tree() -> FileSystemItem {
    FileSystemItem::folder("root")
        .with(FileSystemItem::file("file1.txt", 2))
        .with(FileSystemItem::file("file2.txt", 2))
        .with(
            FileSystemItem::folder("docs")
                .with(FileSystemItem::file("resume.pdf", 3))
                .with(FileSystemItem::file("notes.txt", 1)),
        )
        .with(FileSystemItem::folder("images").with(FileSystemItem::file("photo.jpg", 10)))
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    let root = sample_tree();

    t.heading("Composite: ls root");
    t.extend(root.ls());

    t.heading("Composite: open all");
    t.extend(root.open_all());

    t.heading("Composite: sizes");
    t.line(format!("root size = {}", root.size()));
    if let Some(docs) = root.cd("docs") {
        t.line(format!("docs size = {}", docs.size()));
        t.extend(docs.ls());
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_is_recursive() {
        let root = sample_tree();
        assert_eq!(root.size(), 18);
        assert_eq!(root.cd("images").unwrap().size(), 10);
    }

    #[test]
    fn test_ls_marks_folders() {
        assert_eq!(
            sample_tree().ls(),
            vec!["file1.txt", "file2.txt", "+ docs", "+ images"]
        );
    }

    #[test]
    fn test_open_all_indents_by_depth() {
        let lines = sample_tree().open_all();
        assert_eq!(lines[0], "+ root");
        assert_eq!(lines[3], "    + docs");
        assert_eq!(lines[4], "        resume.pdf");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn test_cd_only_enters_folders() {
        let root = sample_tree();
        assert!(root.cd("file1.txt").is_none());
        assert!(root.cd("missing").is_none());
        assert_eq!(root.cd("docs").unwrap().name(), "docs");
    }

    #[test]
    fn test_add_to_file_is_ignored() {
        let mut f = FileSystemItem::file("a", 1);
        f.add(FileSystemItem::file("b", 5));
        assert_eq!(f.size(), 1);
    }
}
