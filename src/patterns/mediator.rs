//! Mediator: users never talk to each other directly; the chat room routes
//! every message and enforces mutes.

use std::collections::HashSet;

use thiserror::Error;

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MediatorError {
    #[error("unknown user '{0}'")]
    UnknownUser(String),
    #[error("user '{0}' is already registered")]
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered { to: String },
    /// `to` has muted the sender.
    Blocked { to: String },
}

#[derive(Debug)]
pub struct ChatUser {
    name: String,
    inbox: Vec<Message>,
}

impl ChatUser {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inbox(&self) -> &[Message] {
        &self.inbox
    }
}

#[derive(Debug, Default)]
pub struct ChatMediator {
    users: Vec<ChatUser>,
    /// (muter, muted)
    mutes: HashSet<(String, String)>,
}

impl ChatMediator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>) -> Result<(), MediatorError> {
        let name = name.into();
        if self.users.iter().any(|u| u.name == name) {
            return Err(MediatorError::Duplicate(name));
        }
        self.users.push(ChatUser {
            name,
            inbox: Vec::new(),
        });
        Ok(())
    }

    pub fn user(&self, name: &str) -> Option<&ChatUser> {
        self.users.iter().find(|u| u.name == name)
    }

    fn ensure(&self, name: &str) -> Result<(), MediatorError> {
        self.user(name)
            .map(|_| ())
            .ok_or_else(|| MediatorError::UnknownUser(name.to_string()))
    }

    pub fn mute(&mut self, who: &str, whom: &str) -> Result<(), MediatorError> {
        self.ensure(who)?;
        self.ensure(whom)?;
        self.mutes.insert((who.to_string(), whom.to_string()));
        Ok(())
    }

    pub fn unmute(&mut self, who: &str, whom: &str) {
        self.mutes.remove(&(who.to_string(), whom.to_string()));
    }

    fn has_muted(&self, who: &str, whom: &str) -> bool {
        self.mutes.contains(&(who.to_string(), whom.to_string()))
    }

    fn deliver(&mut self, from: &str, to_index: usize, text: &str) -> Delivery {
        let to = self.users[to_index].name.clone();
        if self.has_muted(&to, from) {
            return Delivery::Blocked { to };
        }
        self.users[to_index].inbox.push(Message {
            from: from.to_string(),
            text: text.to_string(),
        });
        Delivery::Delivered { to }
    }

    /// Everyone except the sender, in registration order.
    pub fn broadcast(&mut self, from: &str, text: &str) -> Result<Vec<Delivery>, MediatorError> {
        self.ensure(from)?;
        let targets: Vec<usize> = (0..self.users.len())
            .filter(|&i| self.users[i].name != from)
            .collect();
        Ok(targets
            .into_iter()
            .map(|i| self.deliver(from, i, text))
            .collect())
    }

    pub fn send_private(
        &mut self,
        from: &str,
        to: &str,
        text: &str,
    ) -> Result<Delivery, MediatorError> {
        self.ensure(from)?;
        let index = self
            .users
            .iter()
            .position(|u| u.name == to)
            .ok_or_else(|| MediatorError::UnknownUser(to.to_string()))?;
        Ok(self.deliver(from, index, text))
    }
}

fn describe(deliveries: &[Delivery], from: &str) -> Vec<String> {
    deliveries
        .iter()
        .map(|d| match d {
            Delivery::Delivered { to } => format!("    {to} got the message"),
            Delivery::Blocked { to } => format!("    not delivered: {to} has muted {from}"),
        })
        .collect()
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Mediator: chat room");

    let mut room = ChatMediator::new();
    for name in ["Rohan", "Neha", "Mohan"] {
        room.register(name)?;
    }
    room.mute("Mohan", "Rohan")?;

    t.line("[Rohan broadcasts]: Hello everyone!");
    let sent = room.broadcast("Rohan", "Hello everyone!")?;
    t.extend(describe(&sent, "Rohan"));

    t.line("[Neha -> Rohan]: Hey Rohan");
    let sent = room.send_private("Neha", "Rohan", "Hey Rohan")?;
    t.extend(describe(&[sent], "Neha"));

    t.line("[Rohan -> Mohan]: Hi Mohan");
    let sent = room.send_private("Rohan", "Mohan", "Hi Mohan")?;
    t.extend(describe(&[sent], "Rohan"));
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room() -> ChatMediator {
        let mut room = ChatMediator::new();
        for name in ["Rohan", "Neha", "Mohan"] {
            room.register(name).unwrap();
        }
        room
    }

    #[test]
    fn test_broadcast_skips_sender_and_respects_mutes() {
        let mut room = room();
        room.mute("Mohan", "Rohan").unwrap();

        let out = room.broadcast("Rohan", "hi").unwrap();
        assert_eq!(
            out,
            vec![
                Delivery::Delivered { to: "Neha".into() },
                Delivery::Blocked { to: "Mohan".into() },
            ]
        );
        assert!(room.user("Rohan").unwrap().inbox().is_empty());
        assert!(room.user("Mohan").unwrap().inbox().is_empty());
        assert_eq!(room.user("Neha").unwrap().inbox()[0].from, "Rohan");
    }

    #[test]
    fn test_mute_is_one_directional() {
        let mut room = room();
        room.mute("Mohan", "Rohan").unwrap();
        assert_eq!(
            room.send_private("Mohan", "Rohan", "yo").unwrap(),
            Delivery::Delivered { to: "Rohan".into() }
        );
    }

    #[test]
    fn test_unmute_restores_delivery() {
        let mut room = room();
        room.mute("Neha", "Mohan").unwrap();
        room.unmute("Neha", "Mohan");
        assert!(matches!(
            room.send_private("Mohan", "Neha", "x").unwrap(),
            Delivery::Delivered { .. }
        ));
    }

    #[test]
    fn test_unknown_and_duplicate_users() {
        let mut room = room();
        assert_eq!(
            room.send_private("Rohan", "Ghost", "boo"),
            Err(MediatorError::UnknownUser("Ghost".into()))
        );
        assert_eq!(
            room.register("Neha"),
            Err(MediatorError::Duplicate("Neha".into()))
        );
    }
}
