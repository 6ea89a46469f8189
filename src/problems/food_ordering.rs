//! Online food ordering: search restaurants by city, fill a cart from one
//! restaurant, pay with a chosen method and get notified.

use std::fmt;

use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FoodError {
    #[error("no items in the cart")]
    EmptyCart,

    #[error("no restaurants found in {0}")]
    NoRestaurants(String),

    #[error("{restaurant} has no menu item '{item}'")]
    UnknownItem { restaurant: String, item: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub name: String,
    pub price: f64,
}

impl MenuItem {
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Restaurant {
    pub id: u32,
    pub name: String,
    pub address: String,
    pub menu: Vec<MenuItem>,
}

impl Restaurant {
    pub fn item(&self, name: &str) -> Result<&MenuItem, FoodError> {
        self.menu
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| FoodError::UnknownItem {
                restaurant: self.name.clone(),
                item: name.to_string(),
            })
    }
}

#[derive(Debug, Default)]
pub struct RestaurantManager {
    restaurants: Vec<Restaurant>,
}

impl RestaurantManager {
    pub fn add(&mut self, name: &str, address: &str, menu: Vec<MenuItem>) -> u32 {
        let id = self.restaurants.len() as u32 + 1;
        self.restaurants.push(Restaurant {
            id,
            name: name.to_string(),
            address: address.to_string(),
            menu,
        });
        id
    }

    /// Case-insensitive match on the restaurant's city.
    pub fn search(&self, location: &str) -> Vec<&Restaurant> {
        self.restaurants
            .iter()
            .filter(|r| r.address.eq_ignore_ascii_case(location))
            .collect()
    }
}

/// Holds items from a single restaurant at a time.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    restaurant: Option<Restaurant>,
    items: Vec<MenuItem>,
}

impl Cart {
    pub fn add(&mut self, restaurant: &Restaurant, item: MenuItem) {
        if self.restaurant.as_ref().map(|r| r.id) != Some(restaurant.id) {
            self.restaurant = Some(restaurant.clone());
            self.items.clear();
        }
        self.items.push(item);
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn total(&self) -> f64 {
        self.items.iter().map(|i| i.price).sum()
    }

    pub fn clear(&mut self) {
        self.restaurant = None;
        self.items.clear();
    }
}

#[derive(Debug, Clone)]
pub struct User {
    pub name: String,
    pub address: String,
    pub cart: Cart,
}

impl User {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            cart: Cart::default(),
        }
    }
}

// ============================================================================
// Payment and notification strategies
// ============================================================================

pub trait PaymentStrategy {
    fn pay(&self, amount: f64) -> String;
}

pub struct Upi;
pub struct CreditCard;
pub struct NetBanking;

impl PaymentStrategy for Upi {
    fn pay(&self, amount: f64) -> String {
        format!("paid {amount:.2} via UPI")
    }
}

impl PaymentStrategy for CreditCard {
    fn pay(&self, amount: f64) -> String {
        format!("paid {amount:.2} via credit card")
    }
}

impl PaymentStrategy for NetBanking {
    fn pay(&self, amount: f64) -> String {
        format!("paid {amount:.2} via net banking")
    }
}

pub trait NotificationChannel {
    fn notify(&self, user: &str, message: &str) -> String;
}

pub struct Sms;
pub struct Email;

impl NotificationChannel for Sms {
    fn notify(&self, user: &str, message: &str) -> String {
        format!("SMS to {user}: {message}")
    }
}

impl NotificationChannel for Email {
    fn notify(&self, user: &str, message: &str) -> String {
        format!("Email to {user}: {message}")
    }
}

// ============================================================================
// Orders
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    Delivery,
    Pickup,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u32,
    pub kind: OrderType,
    pub user: String,
    pub restaurant: String,
    /// Where the food ends up: the user's address or the restaurant's.
    pub address: String,
    pub items: Vec<MenuItem>,
    pub total: f64,
    pub payment: String,
    pub notification: String,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Order #{} ({:?}) for {} from {} to {}: {} item(s), total {:.2}",
            self.id,
            self.kind,
            self.user,
            self.restaurant,
            self.address,
            self.items.len(),
            self.total
        )
    }
}

pub struct OrderFactory;

impl OrderFactory {
    fn create(id: u32, kind: OrderType, user: &User, restaurant: &Restaurant, items: Vec<MenuItem>) -> Order {
        let address = match kind {
            OrderType::Delivery => user.address.clone(),
            OrderType::Pickup => restaurant.address.clone(),
        };
        let total = items.iter().map(|i| i.price).sum();
        Order {
            id,
            kind,
            user: user.name.clone(),
            restaurant: restaurant.name.clone(),
            address,
            items,
            total,
            payment: String::new(),
            notification: String::new(),
        }
    }
}

#[derive(Default)]
pub struct FoodApp {
    pub restaurants: RestaurantManager,
    orders: Vec<Order>,
}

impl FoodApp {
    pub fn with_sample_restaurants() -> Self {
        let dosa = MenuItem::new("dosa", 150.0);
        let idli = MenuItem::new("idli", 15.0);
        let samosa = MenuItem::new("samosa", 25.0);
        let mut app = Self::default();
        app.restaurants.add("Haldiram", "delhi", vec![dosa.clone(), samosa.clone()]);
        app.restaurants.add("Bikaner", "delhi", vec![idli.clone(), samosa]);
        app.restaurants.add("Rameshwar", "bangalore", vec![dosa, idli]);
        app
    }

    pub fn search(&self, location: &str) -> Result<Vec<&Restaurant>, FoodError> {
        let found = self.restaurants.search(location);
        if found.is_empty() {
            return Err(FoodError::NoRestaurants(location.to_string()));
        }
        Ok(found)
    }

    pub fn add_to_cart(&self, user: &mut User, restaurant: &Restaurant, item: &str) -> Result<(), FoodError> {
        let item = restaurant.item(item)?.clone();
        user.cart.add(restaurant, item);
        Ok(())
    }

    pub fn checkout(
        &mut self,
        user: &mut User,
        kind: OrderType,
        payment: &dyn PaymentStrategy,
        channel: &dyn NotificationChannel,
    ) -> Result<&Order, FoodError> {
        let restaurant = match (&user.cart.restaurant, user.cart.items.is_empty()) {
            (Some(r), false) => r.clone(),
            _ => return Err(FoodError::EmptyCart),
        };
        let id = self.orders.len() as u32 + 1;
        let mut order = OrderFactory::create(id, kind, user, &restaurant, user.cart.items.clone());
        order.payment = payment.pay(order.total);
        order.notification = channel.notify(&user.name, &format!("order #{id} confirmed"));
        info!(order = id, total = order.total, kind = ?kind, "food order placed");

        user.cart.clear();
        self.orders.push(order);
        self.orders.last().ok_or(FoodError::EmptyCart)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    let mut app = FoodApp::with_sample_restaurants();
    let mut user = User::new("John Doe", "123 Main St, Delhi");

    t.heading("Food ordering: delivery");
    let found = app.search("delhi")?;
    t.line(format!(
        "restaurants in delhi: {}",
        found.iter().map(|r| r.name.as_str()).collect::<Vec<_>>().join(", ")
    ));
    let haldiram = found[0].clone();
    app.add_to_cart(&mut user, &haldiram, "dosa")?;
    app.add_to_cart(&mut user, &haldiram, "samosa")?;
    let order = app.checkout(&mut user, OrderType::Delivery, &Upi, &Sms)?;
    t.line(order.to_string());
    t.line(order.payment.clone());
    t.line(order.notification.clone());

    t.heading("Food ordering: pickup after switching restaurant");
    let bangalore = app.search("Bangalore")?;
    let bikaner = app.search("delhi")?[1].clone();
    let rameshwar = bangalore[0].clone();
    app.add_to_cart(&mut user, &bikaner, "idli")?;
    app.add_to_cart(&mut user, &rameshwar, "dosa")?;
    let order = app.checkout(&mut user, OrderType::Pickup, &NetBanking, &Email)?;
    t.line(order.to_string());
    t.line(order.payment.clone());

    if let Err(e) = app.checkout(&mut user, OrderType::Pickup, &CreditCard, &Email) {
        t.line(format!("rejected: {e}"));
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_by_location() {
        let app = FoodApp::with_sample_restaurants();
        assert_eq!(app.search("Delhi").unwrap().len(), 2);
        assert_eq!(app.search("mumbai").unwrap_err(), FoodError::NoRestaurants("mumbai".into()));
    }

    #[test]
    fn test_cart_switch_clears_items() {
        let app = FoodApp::with_sample_restaurants();
        let delhi = app.search("delhi").unwrap();
        let (a, b) = (delhi[0].clone(), delhi[1].clone());
        let mut user = User::new("u", "addr");
        app.add_to_cart(&mut user, &a, "dosa").unwrap();
        app.add_to_cart(&mut user, &a, "samosa").unwrap();
        assert_eq!(user.cart.total(), 175.0);
        app.add_to_cart(&mut user, &b, "idli").unwrap();
        assert_eq!(user.cart.items().len(), 1);
        assert!(matches!(
            app.add_to_cart(&mut user, &b, "dosa"),
            Err(FoodError::UnknownItem { .. })
        ));
    }

    #[test]
    fn test_checkout_delivery_and_pickup_addresses() {
        let mut app = FoodApp::with_sample_restaurants();
        let r = app.search("delhi").unwrap()[0].clone();
        let mut user = User::new("u", "home");

        app.add_to_cart(&mut user, &r, "dosa").unwrap();
        let order = app.checkout(&mut user, OrderType::Delivery, &Upi, &Sms).unwrap();
        assert_eq!(order.id, 1);
        assert_eq!(order.address, "home");
        assert_eq!(order.payment, "paid 150.00 via UPI");

        app.add_to_cart(&mut user, &r, "samosa").unwrap();
        let order = app.checkout(&mut user, OrderType::Pickup, &CreditCard, &Email).unwrap();
        assert_eq!(order.id, 2);
        assert_eq!(order.address, "delhi");
        assert!(order.notification.starts_with("Email to u"));
        assert!(user.cart.items().is_empty());
    }

    #[test]
    fn test_empty_cart_rejected() {
        let mut app = FoodApp::with_sample_restaurants();
        let mut user = User::new("u", "home");
        assert_eq!(
            app.checkout(&mut user, OrderType::Delivery, &Upi, &Sms).unwrap_err(),
            FoodError::EmptyCart
        );
        assert!(app.orders().is_empty());
    }
}
