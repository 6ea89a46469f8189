/* ===============================
   Visitor: operations over file kinds
   =============================== */

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileNode {
    Text { name: String, content: String },
    Image { name: String, bytes: u64 },
    Video { name: String, bytes: u64 },
}

impl FileNode {
    pub fn name(&self) -> &str {
        match self {
            FileNode::Text { name, .. }
            | FileNode::Image { name, .. }
            | FileNode::Video { name, .. } => name,
        }
    }

    /// Double dispatch: the node picks the visitor method.
    pub fn accept<V: FileVisitor + ?Sized>(&self, visitor: &mut V) -> String {
        match self {
            FileNode::Text { name, content } => visitor.visit_text(name, content),
            FileNode::Image { name, bytes } => visitor.visit_image(name, *bytes),
            FileNode::Video { name, bytes } => visitor.visit_video(name, *bytes),
        }
    }
}

pub trait FileVisitor {
    fn visit_text(&mut self, name: &str, content: &str) -> String;
    fn visit_image(&mut self, name: &str, bytes: u64) -> String;
    fn visit_video(&mut self, name: &str, bytes: u64) -> String;
}

/// Accumulates the total across every visited file.
#[derive(Debug, Default)]
pub struct SizeCalculator {
    pub total: u64,
}

impl FileVisitor for SizeCalculator {
    fn visit_text(&mut self, name: &str, content: &str) -> String {
        self.total += content.len() as u64;
        format!("Calculating size of the text file {name}: {} bytes", content.len())
    }

    fn visit_image(&mut self, name: &str, bytes: u64) -> String {
        self.total += bytes;
        format!("Calculating size of the image file {name}: {bytes} bytes")
    }

    fn visit_video(&mut self, name: &str, bytes: u64) -> String {
        self.total += bytes;
        format!("Calculating size of the video file {name}: {bytes} bytes")
    }
}

#[derive(Debug, Default)]
pub struct Compressor {
    pub compressed: Vec<String>,
}

impl FileVisitor for Compressor {
    fn visit_text(&mut self, name: &str, _content: &str) -> String {
        self.compressed.push(name.to_string());
        format!("Compressing text file {name}")
    }

    fn visit_image(&mut self, name: &str, _bytes: u64) -> String {
        self.compressed.push(name.to_string());
        format!("Compressing image file {name}")
    }

    fn visit_video(&mut self, name: &str, _bytes: u64) -> String {
        self.compressed.push(name.to_string());
        format!("Compressing video file {name}")
    }
}

/// Flags text files that mention a known signature.
#[derive(Debug)]
pub struct VirusScanner {
    signature: String,
    pub infected: Vec<String>,
}

impl VirusScanner {
    pub fn new(signature: impl Into<String>) -> Self {
        Self {
            signature: signature.into(),
            infected: Vec::new(),
        }
    }
}

impl FileVisitor for VirusScanner {
    fn visit_text(&mut self, name: &str, content: &str) -> String {
        if content.contains(&self.signature) {
            self.infected.push(name.to_string());
            format!("Scanning text file {name}: infected")
        } else {
            format!("Scanning text file {name}: clean")
        }
    }

    fn visit_image(&mut self, name: &str, _bytes: u64) -> String {
        format!("Scanning image file {name}: clean")
    }

    fn visit_video(&mut self, name: &str, _bytes: u64) -> String {
        format!("Scanning video file {name}: clean")
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    let files = vec![
        FileNode::Text {
            name: "notes.txt".into(),
            content: "hello visitor".into(),
        },
        FileNode::Image {
            name: "sample.jpg".into(),
            bytes: 2048,
        },
        FileNode::Video {
            name: "test.mp4".into(),
            bytes: 10_240,
        },
    ];

    let mut sizer = SizeCalculator::default();
    let mut compressor = Compressor::default();
    let mut scanner = VirusScanner::new("EICAR");
    let visitors: [(&str, &mut dyn FileVisitor); 3] = [
        ("Size calculation", &mut sizer),
        ("Compression", &mut compressor),
        ("Virus scan", &mut scanner),
    ];

    for (label, visitor) in visitors {
        t.heading(format!("Visitor: {label}"));
        for file in &files {
            t.line(file.accept(&mut *visitor));
        }
    }
    t.line(format!("total size: {} bytes", sizer.total));
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_calculator_sums_all_kinds() {
        let files = [
            FileNode::Text {
                name: "a".into(),
                content: "12345".into(),
            },
            FileNode::Image {
                name: "b".into(),
                bytes: 10,
            },
            FileNode::Video {
                name: "c".into(),
                bytes: 100,
            },
        ];
        let mut sizer = SizeCalculator::default();
        for f in &files {
            f.accept(&mut sizer);
        }
        assert_eq!(sizer.total, 115);
    }

    #[test]
    fn test_virus_scanner_only_flags_matching_text() {
        let mut scanner = VirusScanner::new("BAD");
        let dirty = FileNode::Text {
            name: "x.txt".into(),
            content: "this is BAD".into(),
        };
        let clean = FileNode::Image {
            name: "y.png".into(),
            bytes: 1,
        };
        assert!(dirty.accept(&mut scanner).ends_with("infected"));
        assert!(clean.accept(&mut scanner).ends_with("clean"));
        assert_eq!(scanner.infected, vec!["x.txt"]);
    }

    #[test]
    fn test_compressor_records_names() {
        let mut c = Compressor::default();
        let video = FileNode::Video {
            name: "v.mp4".into(),
            bytes: 5,
        };
        assert_eq!(video.accept(&mut c), "Compressing video file v.mp4");
        assert_eq!(c.compressed, vec!["v.mp4"]);
    }
}
