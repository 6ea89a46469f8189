/* ===============================
   Observer: channel uploads fan out to subscribers
   =============================== */

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::AppConfig;
use crate::transcript::Transcript;

pub trait Subscriber {
    fn name(&self) -> &str;
    fn update(&self, channel: &str, video: &str);
}

/// Records every notification it receives.
#[derive(Debug)]
pub struct Viewer {
    name: String,
    notifications: RefCell<Vec<String>>,
}

impl Viewer {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            notifications: RefCell::new(Vec::new()),
        })
    }

    pub fn notifications(&self) -> Vec<String> {
        self.notifications.borrow().clone()
    }
}

impl Subscriber for Viewer {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&self, channel: &str, video: &str) {
        self.notifications.borrow_mut().push(format!(
            "Hey {}, {} uploaded \"{}\"",
            self.name, channel, video
        ));
    }
}

pub struct Channel {
    name: String,
    subscribers: Vec<Rc<dyn Subscriber>>,
    latest_video: Option<String>,
}

impl Channel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscribers: Vec::new(),
            latest_video: None,
        }
    }

    /// Subscribing twice is a no-op.
    pub fn subscribe(&mut self, subscriber: Rc<dyn Subscriber>) {
        if !self.subscribers.iter().any(|s| Rc::ptr_eq(s, &subscriber)) {
            self.subscribers.push(subscriber);
        }
    }

    pub fn unsubscribe(&mut self, name: &str) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.name() != name);
        before != self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn latest_video(&self) -> Option<&str> {
        self.latest_video.as_deref()
    }

    pub fn upload(&mut self, title: impl Into<String>) {
        let title = title.into();
        for subscriber in &self.subscribers {
            subscriber.update(&self.name, &title);
        }
        self.latest_video = Some(title);
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Observer: channel uploads");

    let mut channel = Channel::new("KEEP-ROCKING!!!");
    let abhisek = Viewer::new("Abhisek");
    let gaurav = Viewer::new("Gaurav");
    channel.subscribe(abhisek.clone());
    channel.subscribe(gaurav.clone());

    channel.upload("Learning about Observers Pattern");
    channel.unsubscribe("Gaurav");
    channel.upload("Learning about Observers Pattern another video !!");

    for viewer in [&abhisek, &gaurav] {
        t.extend(viewer.notifications());
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsubscribed_viewer_misses_later_uploads() {
        let mut channel = Channel::new("C");
        let a = Viewer::new("A");
        let b = Viewer::new("B");
        channel.subscribe(a.clone());
        channel.subscribe(b.clone());

        channel.upload("one");
        assert!(channel.unsubscribe("B"));
        channel.upload("two");

        assert_eq!(a.notifications().len(), 2);
        assert_eq!(b.notifications(), vec!["Hey B, C uploaded \"one\""]);
        assert_eq!(channel.latest_video(), Some("two"));
    }

    #[test]
    fn test_double_subscribe_notifies_once() {
        let mut channel = Channel::new("C");
        let a = Viewer::new("A");
        channel.subscribe(a.clone());
        channel.subscribe(a.clone());
        channel.upload("x");

        assert_eq!(channel.subscriber_count(), 1);
        assert_eq!(a.notifications().len(), 1);
        assert!(!channel.unsubscribe("nobody"));
    }
}
