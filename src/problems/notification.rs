//! Notification service: decorated notifications are stored and pushed to
//! observers; the engine observer fans each one out over its channels.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::{Local, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::transcript::Transcript;

pub const TIMESTAMP_FORMAT: &str = "%d-%m-%y %H:%M:%S";

lazy_static! {
    static ref EMAIL_RE: Result<Regex, regex::Error> =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$");
    static ref PHONE_RE: Result<Regex, regex::Error> = Regex::new(r"^\+?[0-9]{10,13}$");
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotificationError {
    #[error("invalid email address '{0}'")]
    InvalidEmail(String),
    #[error("invalid phone number '{0}'")]
    InvalidPhone(String),
    #[error("bad validation pattern: {0}")]
    Pattern(#[from] regex::Error),
}

fn pattern_matches(re: &Result<Regex, regex::Error>, value: &str) -> Result<bool, NotificationError> {
    match re {
        Ok(re) => Ok(re.is_match(value)),
        Err(e) => Err(NotificationError::Pattern(e.clone())),
    }
}

// ============================================================================
// Notifications and decorators
// ============================================================================

pub trait Notification {
    fn content(&self) -> String;
}

pub struct SimpleNotification {
    text: String,
}

impl SimpleNotification {
    pub fn new(text: impl Into<String>) -> Box<dyn Notification> {
        Box::new(Self { text: text.into() })
    }
}

impl Notification for SimpleNotification {
    fn content(&self) -> String {
        self.text.clone()
    }
}

pub struct TimestampDecorator {
    inner: Box<dyn Notification>,
    at: NaiveDateTime,
}

impl TimestampDecorator {
    pub fn wrap(inner: Box<dyn Notification>) -> Box<dyn Notification> {
        Self::wrap_at(inner, Local::now().naive_local())
    }

    pub fn wrap_at(inner: Box<dyn Notification>, at: NaiveDateTime) -> Box<dyn Notification> {
        Box::new(Self { inner, at })
    }
}

impl Notification for TimestampDecorator {
    fn content(&self) -> String {
        format!("[{}] {}\n", self.at.format(TIMESTAMP_FORMAT), self.inner.content())
    }
}

pub struct SignatureDecorator {
    inner: Box<dyn Notification>,
    signature: String,
}

impl SignatureDecorator {
    pub fn wrap(inner: Box<dyn Notification>, signature: impl Into<String>) -> Box<dyn Notification> {
        Box::new(Self {
            inner,
            signature: signature.into(),
        })
    }
}

impl Notification for SignatureDecorator {
    fn content(&self) -> String {
        format!("{}-- {}\n", self.inner.content(), self.signature)
    }
}

// ============================================================================
// Delivery strategies
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub channel: &'static str,
    pub target: String,
    pub content: String,
}

pub trait NotificationStrategy {
    fn send(&self, content: &str) -> Delivery;
}

pub struct SmsStrategy {
    number: String,
}

impl SmsStrategy {
    pub fn new(number: impl Into<String>) -> Result<Self, NotificationError> {
        let number = number.into();
        if !pattern_matches(&PHONE_RE, &number)? {
            return Err(NotificationError::InvalidPhone(number));
        }
        Ok(Self { number })
    }
}

impl NotificationStrategy for SmsStrategy {
    fn send(&self, content: &str) -> Delivery {
        Delivery {
            channel: "SMS",
            target: self.number.clone(),
            content: content.to_string(),
        }
    }
}

pub struct EmailStrategy {
    address: String,
}

impl EmailStrategy {
    pub fn new(address: impl Into<String>) -> Result<Self, NotificationError> {
        let address = address.into();
        if !pattern_matches(&EMAIL_RE, &address)? {
            return Err(NotificationError::InvalidEmail(address));
        }
        Ok(Self { address })
    }
}

impl NotificationStrategy for EmailStrategy {
    fn send(&self, content: &str) -> Delivery {
        Delivery {
            channel: "EMAIL",
            target: self.address.clone(),
            content: content.to_string(),
        }
    }
}

pub struct PopUpStrategy;

impl NotificationStrategy for PopUpStrategy {
    fn send(&self, content: &str) -> Delivery {
        Delivery {
            channel: "POP-UP",
            target: "screen".to_string(),
            content: content.to_string(),
        }
    }
}

// ============================================================================
// Observers
// ============================================================================

pub trait NotificationObserver {
    fn update(&self, content: &str);
}

#[derive(Default)]
pub struct Logger {
    entries: RefCell<Vec<String>>,
}

impl Logger {
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}

impl NotificationObserver for Logger {
    fn update(&self, content: &str) {
        info!(content = content.trim_end(), "notification logged");
        self.entries.borrow_mut().push(content.to_string());
    }
}

#[derive(Default)]
pub struct NotificationEngine {
    strategies: Vec<Box<dyn NotificationStrategy>>,
    sent: RefCell<Vec<Delivery>>,
}

impl NotificationEngine {
    pub fn add_strategy(&mut self, strategy: Box<dyn NotificationStrategy>) {
        self.strategies.push(strategy);
    }

    pub fn sent(&self) -> Vec<Delivery> {
        self.sent.borrow().clone()
    }
}

impl NotificationObserver for NotificationEngine {
    fn update(&self, content: &str) {
        let mut sent = self.sent.borrow_mut();
        sent.extend(self.strategies.iter().map(|s| s.send(content)));
    }
}

// ============================================================================
// Service
// ============================================================================

#[derive(Default)]
pub struct NotificationService {
    history: Vec<Box<dyn Notification>>,
    observers: Vec<Rc<dyn NotificationObserver>>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_observer(&mut self, observer: Rc<dyn NotificationObserver>) {
        self.observers.push(observer);
    }

    pub fn remove_observer(&mut self, observer: &Rc<dyn NotificationObserver>) {
        self.observers.retain(|o| !Rc::ptr_eq(o, observer));
    }

    /// Stores the notification, then notifies every observer.
    pub fn add_notification(&mut self, notification: Box<dyn Notification>) {
        let content = notification.content();
        self.history.push(notification);
        for observer in &self.observers {
            observer.update(&content);
        }
    }

    pub fn history(&self) -> Vec<String> {
        self.history.iter().map(|n| n.content()).collect()
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Notification service");

    let logger = Rc::new(Logger::default());
    let mut engine = NotificationEngine::default();
    engine.add_strategy(Box::new(EmailStrategy::new("abc.xyz@gmail.com")?));
    engine.add_strategy(Box::new(SmsStrategy::new("9876543210")?));
    engine.add_strategy(Box::new(PopUpStrategy));
    let engine = Rc::new(engine);

    let mut service = NotificationService::new();
    service.add_observer(logger.clone());
    service.add_observer(engine.clone());

    let notification = SignatureDecorator::wrap(
        TimestampDecorator::wrap(SimpleNotification::new("Your Order has been shipped !!!")),
        "Logistic Team",
    );
    service.add_notification(notification);

    for entry in logger.entries() {
        t.line(format!("LOG ---> {}", entry.trim_end().replace('\n', " / ")));
    }
    for d in engine.sent() {
        t.line(format!("{} to {}", d.channel, d.target));
    }

    if let Err(e) = EmailStrategy::new("not-an-email") {
        t.line(format!("rejected: {e}"));
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 24)
            .unwrap()
            .and_hms_opt(19, 31, 56)
            .unwrap()
    }

    #[test]
    fn test_decorators_compose() {
        let n = SignatureDecorator::wrap(
            TimestampDecorator::wrap_at(SimpleNotification::new("Shipped"), fixed_time()),
            "Team",
        );
        assert_eq!(n.content(), "[24-08-25 19:31:56] Shipped\n-- Team\n");
    }

    #[test]
    fn test_service_stores_and_notifies() {
        let logger = Rc::new(Logger::default());
        let mut engine = NotificationEngine::default();
        engine.add_strategy(Box::new(PopUpStrategy));
        engine.add_strategy(Box::new(SmsStrategy::new("9876543210").unwrap()));
        let engine = Rc::new(engine);

        let mut service = NotificationService::new();
        service.add_observer(logger.clone());
        service.add_observer(engine.clone());
        service.add_notification(SimpleNotification::new("one"));
        service.add_notification(SimpleNotification::new("two"));

        assert_eq!(service.history(), vec!["one", "two"]);
        assert_eq!(logger.entries(), vec!["one", "two"]);
        let sent = engine.sent();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[1].channel, "SMS");
        assert_eq!(sent[3].content, "two");
    }

    #[test]
    fn test_removed_observer_stops_receiving() {
        let logger = Rc::new(Logger::default());
        let as_observer: Rc<dyn NotificationObserver> = logger.clone();
        let mut service = NotificationService::new();
        service.add_observer(as_observer.clone());
        service.add_notification(SimpleNotification::new("a"));
        service.remove_observer(&as_observer);
        service.add_notification(SimpleNotification::new("b"));

        assert_eq!(logger.entries(), vec!["a"]);
        assert_eq!(service.history().len(), 2);
    }

    #[test]
    fn test_contact_validation() {
        assert!(EmailStrategy::new("abc.xyz@gmail.com").is_ok());
        assert_eq!(
            EmailStrategy::new("abc@").err(),
            Some(NotificationError::InvalidEmail("abc@".into()))
        );
        assert!(SmsStrategy::new("+919876543210").is_ok());
        assert!(matches!(
            SmsStrategy::new("12ab"),
            Err(NotificationError::InvalidPhone(_))
        ));
    }
}
