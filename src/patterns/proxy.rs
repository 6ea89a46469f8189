//! Three flavours of proxy: protection, remote and virtual.

use std::cell::{Cell, OnceCell};

use thiserror::Error;

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProxyError {
    #[error("{0} is not a premium user; feature available only for premium users")]
    NotPremium(String),
}

// ============================================================================
// Example: Protection proxy
// ============================================================================

pub trait DocReader {
    fn unlock_pdf(&self, file: &str, password: &str) -> Result<String, ProxyError>;
}

pub struct RealDocReader;

impl DocReader for RealDocReader {
    fn unlock_pdf(&self, file: &str, _password: &str) -> Result<String, ProxyError> {
        Ok(format!("Unlocked {file} successfully"))
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub name: String,
    pub premium: bool,
}

impl User {
    pub fn new(name: impl Into<String>, premium: bool) -> Self {
        Self {
            name: name.into(),
            premium,
        }
    }
}

pub struct ProtectionProxy<'a> {
    reader: &'a dyn DocReader,
    user: User,
}

impl<'a> ProtectionProxy<'a> {
    pub fn new(reader: &'a dyn DocReader, user: User) -> Self {
        Self { reader, user }
    }
}

impl DocReader for ProtectionProxy<'_> {
    fn unlock_pdf(&self, file: &str, password: &str) -> Result<String, ProxyError> {
        if !self.user.premium {
            return Err(ProxyError::NotPremium(self.user.name.clone()));
        }
        self.reader.unlock_pdf(file, password)
    }
}

// ============================================================================
// Example: Remote proxy
// ============================================================================

pub trait DataSource {
    fn fetch_data(&self) -> String;
}

/// Pretends to talk to another server.
pub struct DataService;

impl DataSource for DataService {
    fn fetch_data(&self) -> String {
        "Data fetched from remote server".to_string()
    }
}

/// Builds the real service on first use only.
#[derive(Default)]
pub struct DataProxy {
    service: OnceCell<DataService>,
    creations: Cell<usize>,
}

impl DataProxy {
    pub fn services_created(&self) -> usize {
        self.creations.get()
    }
}

impl DataSource for DataProxy {
    fn fetch_data(&self) -> String {
        self.service
            .get_or_init(|| {
                self.creations.set(self.creations.get() + 1);
                DataService
            })
            .fetch_data()
    }
}

// ============================================================================
// Example: Virtual proxy
// ============================================================================

pub trait Display {
    fn display(&self) -> String;
}

pub struct RealImage {
    path: String,
}

impl RealImage {
    pub fn load(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }
}

impl Display for RealImage {
    fn display(&self) -> String {
        format!("Displaying the image: {}", self.path)
    }
}

pub struct ImageProxy {
    path: String,
    image: OnceCell<RealImage>,
}

impl ImageProxy {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            image: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.image.get().is_some()
    }
}

impl Display for ImageProxy {
    fn display(&self) -> String {
        self.image
            .get_or_init(|| RealImage::load(&self.path))
            .display()
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();

    t.heading("Proxy: protection");
    let real = RealDocReader;
    for user in [User::new("Abhisek", true), User::new("Gaurav", false)] {
        let proxy = ProtectionProxy::new(&real, user);
        match proxy.unlock_pdf("/c:/docs/notes.pdf", "1234") {
            Ok(msg) => t.line(msg),
            Err(e) => t.line(e.to_string()),
        };
    }

    t.heading("Proxy: remote");
    let data = DataProxy::default();
    t.line(data.fetch_data());
    t.line(data.fetch_data());
    t.line(format!("services created: {}", data.services_created()));

    t.heading("Proxy: virtual");
    let image = ImageProxy::new("/cd/photos/image.jpg");
    t.line(format!("loaded before display: {}", image.is_loaded()));
    t.line(image.display());
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protection_proxy_blocks_free_users() {
        let real = RealDocReader;
        let free = ProtectionProxy::new(&real, User::new("Gaurav", false));
        let premium = ProtectionProxy::new(&real, User::new("Abhisek", true));

        assert_eq!(
            free.unlock_pdf("a.pdf", "x"),
            Err(ProxyError::NotPremium("Gaurav".into()))
        );
        assert!(premium.unlock_pdf("a.pdf", "x").unwrap().contains("a.pdf"));
    }

    #[test]
    fn test_remote_proxy_creates_service_once() {
        let proxy = DataProxy::default();
        assert_eq!(proxy.services_created(), 0);
        proxy.fetch_data();
        proxy.fetch_data();
        assert_eq!(proxy.services_created(), 1);
    }

    #[test]
    fn test_virtual_proxy_loads_lazily() {
        let image = ImageProxy::new("p.jpg");
        assert!(!image.is_loaded());
        assert_eq!(image.display(), "Displaying the image: p.jpg");
        assert!(image.is_loaded());
    }
}
