//! Decorator: Mario picking up power-ups.

use crate::config::AppConfig;
use crate::transcript::Transcript;

pub trait Character {
    fn abilities(&self) -> String;
}

pub struct Mario;

impl Character for Mario {
    fn abilities(&self) -> String {
        "Mario".to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUp {
    HeightUp,
    GunPower,
    StarPower,
}

impl PowerUp {
    fn suffix(self) -> &'static str {
        match self {
            PowerUp::HeightUp => " with Height Up",
            PowerUp::GunPower => " with Gun Power",
            PowerUp::StarPower => " with Star Power for a limited time",
        }
    }
}

/// Wraps any character and appends its power-up.
pub struct Decorated {
    inner: Box<dyn Character>,
    power: PowerUp,
}

impl Decorated {
    pub fn wrap(inner: Box<dyn Character>, power: PowerUp) -> Box<dyn Character> {
        Box::new(Self { inner, power })
    }
}

impl Character for Decorated {
    fn abilities(&self) -> String {
        self.inner.abilities() + self.power.suffix()
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Decorator: power-ups");

    let mut mario: Box<dyn Character> = Box::new(Mario);
    t.line(format!("Basic: {}", mario.abilities()));

    for power in [PowerUp::HeightUp, PowerUp::GunPower, PowerUp::StarPower] {
        mario = Decorated::wrap(mario, power);
        t.line(format!("After {:?}: {}", power, mario.abilities()));
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decorators_stack_in_order() {
        let mario = Decorated::wrap(
            Decorated::wrap(Box::new(Mario), PowerUp::HeightUp),
            PowerUp::StarPower,
        );
        assert_eq!(
            mario.abilities(),
            "Mario with Height Up with Star Power for a limited time"
        );
    }

    #[test]
    fn test_same_power_can_be_applied_twice() {
        let mario = Decorated::wrap(
            Decorated::wrap(Box::new(Mario), PowerUp::GunPower),
            PowerUp::GunPower,
        );
        assert_eq!(mario.abilities().matches("Gun Power").count(), 2);
    }
}
