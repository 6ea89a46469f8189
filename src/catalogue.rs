// =============================================================================
// Demo registry
// =============================================================================

use std::fmt;

use crate::config::AppConfig;
use crate::patterns::*;
use crate::problems::*;
use crate::transcript::Transcript;

pub type DemoFn = fn(&AppConfig) -> anyhow::Result<Transcript>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Creational,
    Structural,
    Behavioral,
    Problem,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Creational,
        Category::Structural,
        Category::Behavioral,
        Category::Problem,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Category::Creational => "Creational patterns",
            Category::Structural => "Structural patterns",
            Category::Behavioral => "Behavioral patterns",
            Category::Problem => "Low level design problems",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy)]
pub struct DemoEntry {
    pub name: &'static str,
    pub category: Category,
    pub summary: &'static str,
    pub run: DemoFn,
}

impl fmt::Debug for DemoEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("DemoEntry")
            .field("name", &self.name)
            .field("category", &self.category)
            .finish()
    }
}

const fn entry(name: &'static str, category: Category, summary: &'static str, run: DemoFn) -> DemoEntry {
    DemoEntry {
        name,
        category,
        summary,
        run,
    }
}

use Category::{Behavioral, Creational, Problem, Structural};

/// Every demo, in the order `patterns all` runs them.
pub static DEMOS: &[DemoEntry] = &[
    entry("builder", Creational, "HTTP request via fluent and step builders", builder::demo),
    entry("factory", Creational, "burger chain: simple, method and abstract factories", factory::demo),
    entry("prototype", Creational, "clone and tweak an expensive NPC", prototype::demo),
    entry("singleton", Creational, "eager and lazy shared instances", singleton::demo),
    entry("adapter", Structural, "XML provider behind a JSON report", adapter::demo),
    entry("bridge", Structural, "cars decoupled from their engines", bridge::demo),
    entry("composite", Structural, "file system tree of files and folders", composite::demo),
    entry("decorator", Structural, "Mario stacking power-ups", decorator::demo),
    entry("facade", Structural, "computer start-up behind one call", facade::demo),
    entry("flyweight", Structural, "asteroids sharing intrinsic state", flyweight::demo),
    entry("proxy", Structural, "protection, remote and virtual proxies", proxy::demo),
    entry("document_editor", Structural, "document editor split by responsibility", document_editor::demo),
    entry("chain_of_responsibility", Behavioral, "ATM note dispenser chain", chain_of_responsibility::demo),
    entry("command", Behavioral, "four-button remote toggling appliances", command::demo),
    entry("iterator", Behavioral, "linked list, binary tree and playlist iterators", iterator::demo),
    entry("mediator", Behavioral, "chat room routing between users", mediator::demo),
    entry("memento", Behavioral, "database snapshots for rollback", memento::demo),
    entry("observer", Behavioral, "channel subscribers notified of uploads", observer::demo),
    entry("state", Behavioral, "water-bottle vending machine states", state::demo),
    entry("strategy", Behavioral, "robots with swappable behaviours", strategy::demo),
    entry("template_method", Behavioral, "fixed model training pipeline", template_method::demo),
    entry("visitor", Behavioral, "operations over file kinds", visitor::demo),
    entry("coupon", Problem, "discount chain over a cart", coupon::demo),
    entry("dating", Problem, "matching, swipes and chat", dating::demo),
    entry("delivery", Problem, "dark stores and order splitting", delivery::demo),
    entry("food_ordering", Problem, "restaurants, cart, payment and notification", food_ordering::demo),
    entry("music_player", Problem, "playlists, play strategies and devices", music_player::demo),
    entry("notification", Problem, "decorated notifications pushed to observers", notification::demo),
    entry("payment_gateway", Problem, "gateways with retrying payment flow", payment_gateway::demo),
    entry("snake_ladder", Problem, "snake and ladder with pluggable setups", snake_ladder::demo),
    entry("splitwise", Problem, "group expenses and balance settlement", splitwise::demo),
    entry("tic_tac_toe", Problem, "N x N tic-tac-toe", tic_tac_toe::demo),
];

fn normalise(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('-', "_")
}

/// Case-insensitive lookup; `-` and `_` are interchangeable.
pub fn find(name: &str) -> Option<&'static DemoEntry> {
    let wanted = normalise(name);
    DEMOS.iter().find(|d| d.name == wanted)
}

pub fn by_category(category: Category) -> impl Iterator<Item = &'static DemoEntry> {
    DEMOS.iter().filter(move |d| d.category == category)
}

pub fn names() -> Vec<&'static str> {
    DEMOS.iter().map(|d| d.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<_> = names().into_iter().collect();
        assert_eq!(names.len(), DEMOS.len());
        assert_eq!(DEMOS.len(), 32);
    }

    #[test]
    fn test_find_ignores_case_and_dashes() {
        assert_eq!(find("Chain-Of-Responsibility").map(|d| d.name), Some("chain_of_responsibility"));
        assert_eq!(find(" snake_ladder ").map(|d| d.category), Some(Category::Problem));
        assert!(find("singleton-ish").is_none());
    }

    #[test]
    fn test_every_category_is_populated() {
        for category in Category::ALL {
            assert!(by_category(category).count() > 0, "{category} is empty");
        }
        assert_eq!(by_category(Category::Creational).count(), 4);
    }

    #[test]
    fn test_categories_follow_module_tree() {
        let patterns = DEMOS.iter().filter(|d| d.category != Category::Problem).count();
        assert_eq!(patterns, 22);
        assert_eq!(by_category(Category::Problem).count(), 10);
        assert_eq!(find("document_editor").map(|d| d.category), Some(Category::Structural));
    }

    #[test]
    fn test_entry_runs() {
        let demo = find("decorator").unwrap();
        let transcript = (demo.run)(&AppConfig::default()).unwrap();
        assert!(!transcript.is_empty());
    }
}
