//! Flyweight: a million asteroids sharing three intrinsic descriptions.
//!
//! The factory interns flyweights in a `DashMap` so spawning can run on the
//! rayon pool without a global lock.

use std::mem::size_of;
use std::sync::Arc;

use dashmap::DashMap;
use rayon::prelude::*;
use tracing::debug;

use crate::config::AppConfig;
use crate::transcript::Transcript;

/// Intrinsic state shared between every asteroid of one type.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct AsteroidFlyweight {
    length: u32,
    width: u32,
    weight: u32,
    color: String,
    texture: String,
    material: String,
}

impl AsteroidFlyweight {
    pub fn render(&self, pos: (i64, i64), velocity: (i32, i32)) -> String {
        format!(
            "Rendering {}, {}, {} asteroid at ({},{}) Size: {}x{} Velocity: ({}, {})",
            self.color,
            self.texture,
            self.material,
            pos.0,
            pos.1,
            self.length,
            self.width,
            velocity.0,
            velocity.1
        )
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    /// Three integers, three string headers and roughly 32 bytes of text each.
    pub fn memory_usage() -> usize {
        size_of::<u32>() * 3 + size_of::<String>() * 3 + 32 * 3
    }
}

#[derive(Default)]
pub struct AsteroidFactory {
    flyweights: DashMap<AsteroidFlyweight, Arc<AsteroidFlyweight>>,
}

impl AsteroidFactory {
    pub fn get(
        &self,
        length: u32,
        width: u32,
        weight: u32,
        color: &str,
        texture: &str,
        material: &str,
    ) -> Arc<AsteroidFlyweight> {
        let key = AsteroidFlyweight {
            length,
            width,
            weight,
            color: color.to_string(),
            texture: texture.to_string(),
            material: material.to_string(),
        };
        if let Some(existing) = self.flyweights.get(&key) {
            return Arc::clone(existing.value());
        }
        let shared = Arc::new(key.clone());
        Arc::clone(self.flyweights.entry(key).or_insert(shared).value())
    }

    pub fn flyweight_count(&self) -> usize {
        self.flyweights.len()
    }

    pub fn total_flyweight_memory(&self) -> usize {
        self.flyweight_count() * AsteroidFlyweight::memory_usage()
    }

    pub fn clear(&self) {
        self.flyweights.clear();
    }
}

/// Extrinsic state: where this asteroid is and how it moves.
#[derive(Debug, Clone)]
pub struct AsteroidContext {
    flyweight: Arc<AsteroidFlyweight>,
    pos: (i64, i64),
    velocity: (i32, i32),
}

impl AsteroidContext {
    pub fn render(&self) -> String {
        self.flyweight.render(self.pos, self.velocity)
    }

    pub fn flyweight(&self) -> &Arc<AsteroidFlyweight> {
        &self.flyweight
    }

    /// Pointer to the flyweight plus position and velocity.
    pub fn memory_usage() -> usize {
        size_of::<Arc<AsteroidFlyweight>>() + size_of::<i64>() * 2 + size_of::<i32>() * 2
    }
}

const SIZES: [u32; 3] = [25, 35, 45];
const COLORS: [&str; 3] = ["Red", "Blue", "Gray"];
const TEXTURES: [&str; 3] = ["Rocky", "Metallic", "Icy"];
const MATERIALS: [&str; 3] = ["Iron", "Stone", "Ice"];

#[derive(Default)]
pub struct SpaceGame {
    factory: AsteroidFactory,
    asteroids: Vec<AsteroidContext>,
}

impl SpaceGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, count: usize) {
        let factory = &self.factory;
        let spawned: Vec<AsteroidContext> = (0..count)
            .into_par_iter()
            .map(|i| {
                let kind = i % 3;
                let size = SIZES[kind];
                AsteroidContext {
                    flyweight: factory.get(
                        size,
                        size,
                        size * 10,
                        COLORS[kind],
                        TEXTURES[kind],
                        MATERIALS[kind],
                    ),
                    pos: (100 + i as i64 * 50, 200 + i as i64 * 30),
                    velocity: (1, 2),
                }
            })
            .collect();
        self.asteroids.extend(spawned);
        debug!(
            asteroids = self.asteroids.len(),
            flyweights = self.factory.flyweight_count(),
            "asteroids spawned"
        );
    }

    pub fn render_first(&self, n: usize) -> Vec<String> {
        self.asteroids.iter().take(n).map(|a| a.render()).collect()
    }

    pub fn asteroid_count(&self) -> usize {
        self.asteroids.len()
    }

    pub fn flyweight_count(&self) -> usize {
        self.factory.flyweight_count()
    }

    pub fn memory_usage(&self) -> usize {
        self.asteroids.len() * AsteroidContext::memory_usage()
            + self.factory.total_flyweight_memory()
    }

    /// What the same field would cost if every asteroid carried its own
    /// intrinsic data.
    pub fn memory_without_sharing(&self) -> usize {
        self.asteroids.len() * (AsteroidFlyweight::memory_usage() + AsteroidContext::memory_usage())
    }
}

pub fn demo(config: &AppConfig) -> anyhow::Result<Transcript> {
    let count = config.flyweight.asteroid_count;
    let mut t = Transcript::new();
    t.heading(format!("Flyweight: spawning {count} asteroids"));

    let mut game = SpaceGame::new();
    game.spawn(count);
    t.line(format!("Created {} asteroid contexts", game.asteroid_count()));
    t.line(format!("Total flyweight objects: {}", game.flyweight_count()));

    t.heading("First 5 asteroids");
    t.extend(game.render_first(5));

    let total = game.memory_usage();
    t.heading("Memory usage");
    t.line(format!(
        "Memory per asteroid: {} bytes",
        AsteroidContext::memory_usage()
    ));
    t.line(format!("Total memory used: {total} bytes"));
    t.line(format!(
        "Memory in MB: {:.2} MB",
        total as f64 / (1024.0 * 1024.0)
    ));
    t.line(format!(
        "Without sharing: {} bytes",
        game.memory_without_sharing()
    ));
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_interns_identical_descriptions() {
        let factory = AsteroidFactory::default();
        let a = factory.get(25, 25, 250, "Red", "Rocky", "Iron");
        let b = factory.get(25, 25, 250, "Red", "Rocky", "Iron");
        let c = factory.get(35, 35, 350, "Blue", "Metallic", "Stone");

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(factory.flyweight_count(), 2);

        factory.clear();
        assert_eq!(factory.flyweight_count(), 0);
    }

    #[test]
    fn test_spawn_cycles_through_three_types() {
        let mut game = SpaceGame::new();
        game.spawn(1000);
        assert_eq!(game.asteroid_count(), 1000);
        assert_eq!(game.flyweight_count(), 3);
        assert!(Arc::ptr_eq(
            game.asteroids[0].flyweight(),
            game.asteroids[3].flyweight()
        ));
        assert_eq!(game.asteroids[2].flyweight().weight(), 450);
    }

    #[test]
    fn test_render_positions() {
        let mut game = SpaceGame::new();
        game.spawn(5);
        let lines = game.render_first(2);
        assert_eq!(
            lines[0],
            "Rendering Red, Rocky, Iron asteroid at (100,200) Size: 25x25 Velocity: (1, 2)"
        );
        assert_eq!(
            lines[1],
            "Rendering Blue, Metallic, Stone asteroid at (150,230) Size: 35x35 Velocity: (1, 2)"
        );
    }

    #[test]
    fn test_memory_is_contexts_plus_shared_flyweights() {
        let mut game = SpaceGame::new();
        game.spawn(300);
        let expected =
            300 * AsteroidContext::memory_usage() + 3 * AsteroidFlyweight::memory_usage();
        assert_eq!(game.memory_usage(), expected);
        assert!(game.memory_usage() < game.memory_without_sharing());
    }
}
