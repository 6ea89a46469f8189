//! Prototype: build one expensive NPC template, then clone and tweak.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::config::AppConfig;
use crate::transcript::Transcript;

static TEMPLATE_SETUPS: AtomicUsize = AtomicUsize::new(0);

/// How many times the heavy constructor ran in this process.
pub fn template_setups() -> usize {
    TEMPLATE_SETUPS.load(Ordering::Relaxed)
}

pub trait Prototype {
    fn clone_box(&self) -> Box<dyn Prototype>;
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Npc {
    name: String,
    health: u32,
    attack: u32,
    defense: u32,
}

impl Npc {
    /// Stands in for loading models, textures and AI tables.
    pub fn from_template(name: impl Into<String>, health: u32, attack: u32, defense: u32) -> Self {
        TEMPLATE_SETUPS.fetch_add(1, Ordering::Relaxed);
        Self {
            name: name.into(),
            health,
            attack,
            defense,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_health(&mut self, health: u32) {
        self.health = health;
    }

    pub fn set_attack(&mut self, attack: u32) {
        self.attack = attack;
    }

    pub fn set_defense(&mut self, defense: u32) {
        self.defense = defense;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn health(&self) -> u32 {
        self.health
    }
}

impl Prototype for Npc {
    fn clone_box(&self) -> Box<dyn Prototype> {
        Box::new(self.clone())
    }

    fn describe(&self) -> String {
        format!(
            "NPC {} [HP={} ATK={} DEF={}]",
            self.name, self.health, self.attack, self.defense
        )
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Prototype: NPC cloning");

    let alien = Npc::from_template("Alien", 30, 5, 2);
    t.line(format!("Set up template NPC '{}'", alien.name()));

    let copy = alien.clone_box();
    t.line(copy.describe());

    let mut powerful = alien.clone();
    powerful.set_name("Powerful Alien");
    powerful.set_health(50);
    t.line(powerful.describe());
    Ok(t)
}
