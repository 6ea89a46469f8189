//! Factories for a burger chain: a simple factory, a factory method per
//! shop, and an abstract factory that also bakes garlic bread.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FactoryError {
    #[error("Invalid {category} type: '{kind}'")]
    UnknownKind {
        category: &'static str,
        kind: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurgerKind {
    Basic,
    Standard,
    Premium,
}

impl FromStr for BurgerKind {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            other => Err(FactoryError::UnknownKind {
                category: "burger",
                kind: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GarlicBreadKind {
    Basic,
    Cheese,
}

impl FromStr for GarlicBreadKind {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "cheese" => Ok(Self::Cheese),
            other => Err(FactoryError::UnknownKind {
                category: "garlic bread",
                kind: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Regular,
    Wheat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Burger {
    pub kind: BurgerKind,
    pub base: Base,
}

impl Burger {
    pub fn prepare(&self) -> String {
        let (label, bun) = match self.base {
            Base::Regular => ("", "bun"),
            Base::Wheat => (" Wheat", "wheat bun"),
        };
        let (name, fillings) = match self.kind {
            BurgerKind::Basic => ("Basic", "patty, and lettuce"),
            BurgerKind::Standard => ("Standard", "patty, lettuce, tomato, and cheese"),
            BurgerKind::Premium => (
                "Premium",
                "patty, lettuce, tomato, cheese, bacon, and special sauce",
            ),
        };
        format!("Preparing {name}{label} Burger with {bun}, {fillings}.")
    }
}

impl fmt::Display for Burger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?} burger", self.base, self.kind)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GarlicBread {
    pub kind: GarlicBreadKind,
    pub base: Base,
}

impl GarlicBread {
    pub fn prepare(&self) -> String {
        match (self.kind, self.base) {
            (GarlicBreadKind::Basic, Base::Regular) => {
                "Preparing Basic Garlic Bread with butter and garlic.".to_string()
            }
            (GarlicBreadKind::Cheese, Base::Regular) => {
                "Preparing Cheese Garlic Bread with butter, garlic, and cheese.".to_string()
            }
            (GarlicBreadKind::Basic, Base::Wheat) => {
                "Preparing Basic Wheat Garlic Bread with wheat bread, butter, and garlic."
                    .to_string()
            }
            (GarlicBreadKind::Cheese, Base::Wheat) => {
                "Preparing Cheese Wheat Garlic Bread with wheat bread, butter, garlic, and cheese."
                    .to_string()
            }
        }
    }
}

// =============================================================================
// Simple factory
// =============================================================================

pub struct BurgerFactory;

impl BurgerFactory {
    pub fn create(kind: &str) -> Result<Burger, FactoryError> {
        Ok(Burger {
            kind: kind.parse()?,
            base: Base::Regular,
        })
    }
}

// =============================================================================
// Factory method / abstract factory
// =============================================================================

/// Each shop decides which base its products use.
pub trait MealFactory {
    fn name(&self) -> &'static str;
    fn base(&self) -> Base;

    fn create_burger(&self, kind: &str) -> Result<Burger, FactoryError> {
        Ok(Burger {
            kind: kind.parse()?,
            base: self.base(),
        })
    }

    fn create_garlic_bread(&self, kind: &str) -> Result<GarlicBread, FactoryError> {
        Ok(GarlicBread {
            kind: kind.parse()?,
            base: self.base(),
        })
    }
}

pub struct SinghBurgers;
pub struct KingBurgers;

impl MealFactory for SinghBurgers {
    fn name(&self) -> &'static str {
        "Singh Burgers"
    }

    fn base(&self) -> Base {
        Base::Regular
    }
}

impl MealFactory for KingBurgers {
    fn name(&self) -> &'static str {
        "King Burgers"
    }

    fn base(&self) -> Base {
        Base::Wheat
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();

    t.heading("Simple factory");
    for kind in ["basic", "standard", "premium", "deluxe"] {
        match BurgerFactory::create(kind) {
            Ok(b) => t.line(b.prepare()),
            Err(e) => t.line(e.to_string()),
        };
    }

    let shops: [&dyn MealFactory; 2] = [&SinghBurgers, &KingBurgers];
    for shop in shops {
        t.heading(format!("Abstract factory: {}", shop.name()));
        t.line(shop.create_burger("premium")?.prepare());
        t.line(shop.create_garlic_bread("cheese")?.prepare());
    }
    Ok(t)
}
