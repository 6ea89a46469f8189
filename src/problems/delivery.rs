//! Quick-commerce delivery: dark stores hold inventory, orders go to the
//! nearest store that can fill them or get split across nearby stores.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeliveryError {
    #[error("no dark store within {radius} km of {user}")]
    NoStoreNearby { user: String, radius: f64 },

    #[error("cart is empty")]
    EmptyCart,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub sku: u32,
    pub name: String,
    pub price: f64,
}

pub struct ProductFactory;

impl ProductFactory {
    pub fn create(sku: u32) -> Product {
        let (name, price) = match sku {
            101 => ("Apple".to_string(), 20.0),
            102 => ("Banana".to_string(), 10.0),
            103 => ("Chocolate".to_string(), 50.0),
            201 => ("T-Shirt".to_string(), 500.0),
            202 => ("Jeans".to_string(), 1000.0),
            other => (format!("Item{other}"), 100.0),
        };
        Product { sku, name, price }
    }
}

// ============================================================================
// Inventory
// ============================================================================

pub trait InventoryStore {
    fn add_product(&mut self, product: Product, qty: u32);
    /// Removing more than is in stock empties the slot.
    fn remove_product(&mut self, sku: u32, qty: u32);
    fn stock(&self, sku: u32) -> u32;
    fn products(&self) -> Vec<Product>;
}

#[derive(Debug, Default)]
pub struct InMemoryInventoryStore {
    stock: BTreeMap<u32, (Product, u32)>,
}

impl InventoryStore for InMemoryInventoryStore {
    fn add_product(&mut self, product: Product, qty: u32) {
        self.stock.entry(product.sku).or_insert((product, 0)).1 += qty;
    }

    fn remove_product(&mut self, sku: u32, qty: u32) {
        if let Some((_, current)) = self.stock.get_mut(&sku) {
            *current = current.saturating_sub(qty);
            if *current == 0 {
                self.stock.remove(&sku);
            }
        }
    }

    fn stock(&self, sku: u32) -> u32 {
        self.stock.get(&sku).map_or(0, |(_, qty)| *qty)
    }

    fn products(&self) -> Vec<Product> {
        self.stock
            .values()
            .filter(|(_, qty)| *qty > 0)
            .map(|(p, _)| p.clone())
            .collect()
    }
}

pub struct InventoryManager {
    store: Box<dyn InventoryStore>,
}

impl InventoryManager {
    pub fn new(store: Box<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub fn add_stock(&mut self, sku: u32, qty: u32) {
        debug!(sku, qty, "stock added");
        self.store.add_product(ProductFactory::create(sku), qty);
    }

    pub fn remove_stock(&mut self, sku: u32, qty: u32) {
        self.store.remove_product(sku, qty);
    }

    pub fn stock(&self, sku: u32) -> u32 {
        self.store.stock(sku)
    }

    pub fn available_products(&self) -> Vec<Product> {
        self.store.products()
    }
}

// ============================================================================
// Replenishment
// ============================================================================

pub trait ReplenishStrategy {
    /// Returns the (sku, qty) pairs actually added.
    fn replenish(&self, inventory: &mut InventoryManager, items: &BTreeMap<u32, u32>) -> Vec<(u32, u32)>;
}

/// Tops up only SKUs that fell below the threshold.
pub struct ThresholdReplenish {
    pub threshold: u32,
}

impl ReplenishStrategy for ThresholdReplenish {
    fn replenish(&self, inventory: &mut InventoryManager, items: &BTreeMap<u32, u32>) -> Vec<(u32, u32)> {
        let mut added = Vec::new();
        for (&sku, &qty) in items {
            if inventory.stock(sku) < self.threshold {
                inventory.add_stock(sku, qty);
                added.push((sku, qty));
            }
        }
        added
    }
}

pub struct WeeklyReplenish;

impl ReplenishStrategy for WeeklyReplenish {
    fn replenish(&self, inventory: &mut InventoryManager, items: &BTreeMap<u32, u32>) -> Vec<(u32, u32)> {
        for (&sku, &qty) in items {
            inventory.add_stock(sku, qty);
        }
        items.iter().map(|(k, v)| (*k, *v)).collect()
    }
}

// ============================================================================
// Dark stores
// ============================================================================

pub struct DarkStore {
    pub name: String,
    pub x: f64,
    pub y: f64,
    inventory: InventoryManager,
    replenish: Option<Box<dyn ReplenishStrategy>>,
}

impl DarkStore {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            inventory: InventoryManager::new(Box::<InMemoryInventoryStore>::default()),
            replenish: None,
        }
    }

    pub fn with_replenish(mut self, strategy: Box<dyn ReplenishStrategy>) -> Self {
        self.replenish = Some(strategy);
        self
    }

    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }

    pub fn add_stock(&mut self, sku: u32, qty: u32) {
        self.inventory.add_stock(sku, qty);
    }

    pub fn remove_stock(&mut self, sku: u32, qty: u32) {
        self.inventory.remove_stock(sku, qty);
    }

    pub fn stock(&self, sku: u32) -> u32 {
        self.inventory.stock(sku)
    }

    pub fn products(&self) -> Vec<Product> {
        self.inventory.available_products()
    }

    pub fn run_replenishment(&mut self, items: &BTreeMap<u32, u32>) -> Vec<(u32, u32)> {
        match &self.replenish {
            Some(strategy) => strategy.replenish(&mut self.inventory, items),
            None => Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct DarkStoreManager {
    stores: Vec<DarkStore>,
}

impl DarkStoreManager {
    pub fn register(&mut self, store: DarkStore) {
        self.stores.push(store);
    }

    fn nearby_indices(&self, x: f64, y: f64, radius: f64) -> Vec<usize> {
        let mut found: Vec<(f64, usize)> = self
            .stores
            .iter()
            .enumerate()
            .map(|(i, s)| (s.distance_to(x, y), i))
            .filter(|(d, _)| *d <= radius)
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.into_iter().map(|(_, i)| i).collect()
    }

    /// Stores within `radius`, closest first.
    pub fn nearby(&self, x: f64, y: f64, radius: f64) -> Vec<&DarkStore> {
        self.nearby_indices(x, y, radius)
            .into_iter()
            .map(|i| &self.stores[i])
            .collect()
    }

    pub fn store_mut(&mut self, name: &str) -> Option<&mut DarkStore> {
        self.stores.iter_mut().find(|s| s.name == name)
    }
}

// ============================================================================
// Users, carts, orders
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: Vec<(Product, u32)>,
}

impl Cart {
    pub fn add_item(&mut self, sku: u32, qty: u32) {
        self.items.push((ProductFactory::create(sku), qty));
    }

    pub fn items(&self) -> &[(Product, u32)] {
        &self.items
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|(p, q)| p.price * f64::from(*q)).sum()
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub cart: Cart,
}

impl User {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            x,
            y,
            cart: Cart::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u32,
    pub user: String,
    /// (product, qty, supplying store)
    pub items: Vec<(Product, u32, String)>,
    pub partners: Vec<String>,
    pub unfulfilled: BTreeMap<u32, u32>,
    pub total: f64,
}

pub struct OrderManager {
    radius: f64,
    orders: Vec<Order>,
    next_id: u32,
}

impl OrderManager {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            orders: Vec::new(),
            next_id: 1,
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Every product in stock within the search radius, once per SKU.
    pub fn catalogue_near(&self, stores: &DarkStoreManager, user: &User) -> Vec<Product> {
        let mut seen = BTreeMap::new();
        for store in stores.nearby(user.x, user.y, self.radius) {
            for p in store.products() {
                seen.entry(p.sku).or_insert(p);
            }
        }
        seen.into_values().collect()
    }

    pub fn place_order(&mut self, stores: &mut DarkStoreManager, user: &User) -> Result<&Order, DeliveryError> {
        let requested = user.cart.items();
        if requested.is_empty() {
            return Err(DeliveryError::EmptyCart);
        }
        let nearby = stores.nearby_indices(user.x, user.y, self.radius);
        let Some(&closest) = nearby.first() else {
            return Err(DeliveryError::NoStoreNearby {
                user: user.name.clone(),
                radius: self.radius,
            });
        };

        let mut order = Order {
            id: self.next_id,
            user: user.name.clone(),
            items: Vec::new(),
            partners: Vec::new(),
            unfulfilled: BTreeMap::new(),
            total: 0.0,
        };
        self.next_id += 1;

        // duplicate cart lines for one SKU count against the same stock
        let mut remaining: BTreeMap<u32, u32> = BTreeMap::new();
        for (p, q) in requested {
            *remaining.entry(p.sku).or_default() += q;
        }

        let first = &mut stores.stores[closest];
        if remaining.iter().all(|(&sku, &q)| first.stock(sku) >= q) {
            for (&sku, &q) in &remaining {
                first.remove_stock(sku, q);
                order.items.push((ProductFactory::create(sku), q, first.name.clone()));
            }
            order.partners.push("Partner1".to_string());
        } else {
            for idx in nearby {
                if remaining.is_empty() {
                    break;
                }
                let store = &mut stores.stores[idx];
                let mut supplied = false;
                for (&sku, needed) in remaining.iter_mut() {
                    let taken = store.stock(sku).min(*needed);
                    if taken == 0 {
                        continue;
                    }
                    store.remove_stock(sku, taken);
                    order.items.push((ProductFactory::create(sku), taken, store.name.clone()));
                    *needed -= taken;
                    supplied = true;
                }
                remaining.retain(|_, q| *q > 0);
                if supplied {
                    order.partners.push(format!("Partner{}", order.partners.len() + 1));
                }
            }
            order.unfulfilled = remaining;
        }
        order.total = order.items.iter().map(|(p, q, _)| p.price * f64::from(*q)).sum();

        info!(
            order = order.id,
            partners = order.partners.len(),
            total = order.total,
            "order placed"
        );
        let idx = self.orders.len();
        self.orders.push(order);
        Ok(&self.orders[idx])
    }
}

fn sample_stores() -> DarkStoreManager {
    let mut a = DarkStore::new("DarkStoreA", 0.0, 0.0).with_replenish(Box::new(ThresholdReplenish { threshold: 3 }));
    a.add_stock(101, 5);
    a.add_stock(102, 2);
    let mut b = DarkStore::new("DarkStoreB", 4.0, 1.0).with_replenish(Box::new(ThresholdReplenish { threshold: 3 }));
    b.add_stock(101, 3);
    b.add_stock(103, 10);
    let mut c = DarkStore::new("DarkStoreC", 2.0, 3.0).with_replenish(Box::new(WeeklyReplenish));
    c.add_stock(102, 5);
    c.add_stock(201, 7);

    let mut manager = DarkStoreManager::default();
    for s in [a, b, c] {
        manager.register(s);
    }
    manager
}

pub fn demo(config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    let mut stores = sample_stores();
    let mut orders = OrderManager::new(config.delivery.search_radius_km);
    let mut user = User::new("Abhisek", 1.0, 1.0);

    t.heading(format!("Delivery: products within {} km", config.delivery.search_radius_km));
    for p in orders.catalogue_near(&stores, &user) {
        t.line(format!("SKU {} - {} @ {}", p.sku, p.name, p.price));
    }

    t.heading("Delivery: split order");
    user.cart.add_item(101, 4);
    user.cart.add_item(102, 3);
    user.cart.add_item(103, 2);
    let order = orders.place_order(&mut stores, &user)?;
    for (p, q, store) in &order.items {
        t.line(format!("{store} supplies {} x{q}", p.name));
    }
    t.line(format!("Order #{} total {} via {}", order.id, order.total, order.partners.join(", ")));

    t.heading("Delivery: replenishment");
    let wanted = BTreeMap::from([(101, 10), (102, 10)]);
    if let Some(store) = stores.store_mut("DarkStoreA") {
        for (sku, qty) in store.run_replenishment(&wanted) {
            t.line(format!("DarkStoreA restocked SKU {sku} by {qty}"));
        }
    }

    let mut far = User::new("Remote", 50.0, 50.0);
    far.cart.add_item(101, 1);
    if let Err(e) = orders.place_order(&mut stores, &far) {
        t.line(format!("rejected: {e}"));
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_factory_defaults() {
        assert_eq!(ProductFactory::create(103).price, 50.0);
        let unknown = ProductFactory::create(999);
        assert_eq!(unknown.name, "Item999");
        assert_eq!(unknown.price, 100.0);
    }

    #[test]
    fn test_inventory_removal_clamps() {
        let mut inv = InventoryManager::new(Box::<InMemoryInventoryStore>::default());
        inv.add_stock(101, 2);
        inv.add_stock(101, 3);
        assert_eq!(inv.stock(101), 5);
        inv.remove_stock(101, 9);
        assert_eq!(inv.stock(101), 0);
        assert!(inv.available_products().is_empty());
    }

    #[test]
    fn test_nearby_sorted_by_distance() {
        let stores = sample_stores();
        let names: Vec<_> = stores.nearby(1.0, 1.0, 5.0).iter().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["DarkStoreA", "DarkStoreC", "DarkStoreB"]);
        assert_eq!(stores.nearby(1.0, 1.0, 2.0).len(), 1);
    }

    #[test]
    fn test_split_order_across_stores() {
        let mut stores = sample_stores();
        let mut orders = OrderManager::new(5.0);
        let mut user = User::new("u", 1.0, 1.0);
        user.cart.add_item(101, 4);
        user.cart.add_item(102, 3);
        user.cart.add_item(103, 2);

        let order = orders.place_order(&mut stores, &user).unwrap().clone();
        assert_eq!(order.partners, vec!["Partner1", "Partner2", "Partner3"]);
        assert!(order.unfulfilled.is_empty());
        assert_eq!(order.total, 210.0);
        assert_eq!(stores.nearby(0.0, 0.0, 0.5)[0].stock(102), 0);
    }

    #[test]
    fn test_single_store_fulfilment() {
        let mut stores = sample_stores();
        let mut orders = OrderManager::new(5.0);
        let mut user = User::new("u", 0.0, 0.0);
        user.cart.add_item(101, 2);
        let order = orders.place_order(&mut stores, &user).unwrap();
        assert_eq!(order.partners, vec!["Partner1"]);
        assert_eq!(order.total, 40.0);
    }

    #[test]
    fn test_duplicate_cart_lines_share_stock() {
        let mut stores = DarkStoreManager::default();
        let mut only = DarkStore::new("Only", 0.0, 0.0);
        only.add_stock(101, 5);
        stores.register(only);
        let mut orders = OrderManager::new(5.0);
        let mut user = User::new("u", 0.0, 0.0);
        user.cart.add_item(101, 3);
        user.cart.add_item(101, 3);

        let order = orders.place_order(&mut stores, &user).unwrap();
        let delivered: u32 = order.items.iter().map(|(_, q, _)| q).sum();
        assert_eq!(delivered, 5);
        assert_eq!(order.unfulfilled, BTreeMap::from([(101, 1)]));
        assert_eq!(order.total, 100.0);
        assert_eq!(order.id, 1);
        assert_eq!(stores.nearby(0.0, 0.0, 1.0)[0].stock(101), 0);
    }

    #[test]
    fn test_unfulfilled_items_reported() {
        let mut stores = sample_stores();
        let mut orders = OrderManager::new(5.0);
        let mut user = User::new("u", 1.0, 1.0);
        user.cart.add_item(202, 1);
        user.cart.add_item(101, 10);
        let order = orders.place_order(&mut stores, &user).unwrap();
        assert_eq!(order.unfulfilled, BTreeMap::from([(101, 2), (202, 1)]));
        assert_eq!(order.total, 160.0);
    }

    #[test]
    fn test_errors() {
        let mut stores = sample_stores();
        let mut orders = OrderManager::new(5.0);
        let user = User::new("u", 1.0, 1.0);
        assert_eq!(orders.place_order(&mut stores, &user).unwrap_err(), DeliveryError::EmptyCart);
        let mut far = User::new("far", 100.0, 0.0);
        far.cart.add_item(101, 1);
        assert!(matches!(
            orders.place_order(&mut stores, &far),
            Err(DeliveryError::NoStoreNearby { .. })
        ));
    }

    #[test]
    fn test_replenish_strategies() {
        let mut inv = InventoryManager::new(Box::<InMemoryInventoryStore>::default());
        inv.add_stock(101, 5);
        let items = BTreeMap::from([(101, 10), (102, 4)]);
        let added = ThresholdReplenish { threshold: 3 }.replenish(&mut inv, &items);
        assert_eq!(added, vec![(102, 4)]);
        let added = WeeklyReplenish.replenish(&mut inv, &items);
        assert_eq!(added.len(), 2);
        assert_eq!(inv.stock(101), 15);
    }
}
