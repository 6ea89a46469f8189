//! Coupon discount engine.
//!
//! Coupons form a chain: each one that applies takes its discount off the
//! cart's running total, and a non-combinable coupon ends the chain once it
//! has fired. New coupons can be registered at runtime from any thread.

use std::fmt;
use std::sync::Mutex;

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::transcript::Transcript;

// ============================================================================
// Discount strategies
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyType {
    Flat,
    Percentage,
    PercentageWithCap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiscountStrategy {
    Flat(f64),
    Percentage(f64),
    PercentageWithCap { percentage: f64, cap: f64 },
}

impl DiscountStrategy {
    /// `param2` is only read for the capped variant.
    pub fn new(kind: StrategyType, param1: f64, param2: f64) -> Self {
        match kind {
            StrategyType::Flat => Self::Flat(param1),
            StrategyType::Percentage => Self::Percentage(param1),
            StrategyType::PercentageWithCap => Self::PercentageWithCap {
                percentage: param1,
                cap: param2,
            },
        }
    }

    pub fn calculate(&self, amount: f64) -> f64 {
        match *self {
            Self::Flat(flat) => amount.min(flat),
            Self::Percentage(pct) => pct * amount / 100.0,
            Self::PercentageWithCap { percentage, cap } => (percentage * amount / 100.0).min(cap),
        }
    }
}

// ============================================================================
// Cart
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub name: String,
    pub category: String,
    pub price: f64,
}

impl Product {
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            price,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    pub fn total(&self) -> f64 {
        self.product.price * self.quantity as f64
    }
}

#[derive(Debug, Default, Clone)]
pub struct Cart {
    items: Vec<CartItem>,
    original_total: f64,
    current_total: f64,
    loyalty_member: bool,
    payment_bank: Option<String>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&mut self, product: Product, quantity: u32) {
        let item = CartItem { product, quantity };
        self.original_total += item.total();
        self.current_total += item.total();
        self.items.push(item);
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn original_total(&self) -> f64 {
        self.original_total
    }

    pub fn current_total(&self) -> f64 {
        self.current_total
    }

    /// Never drives the total below zero.
    pub fn apply_discount(&mut self, discount: f64) {
        self.current_total = (self.current_total - discount).max(0.0);
    }

    pub fn set_loyalty_member(&mut self, member: bool) {
        self.loyalty_member = member;
    }

    pub fn is_loyalty_member(&self) -> bool {
        self.loyalty_member
    }

    pub fn set_payment_bank(&mut self, bank: impl Into<String>) {
        self.payment_bank = Some(bank.into());
    }

    pub fn payment_bank(&self) -> Option<&str> {
        self.payment_bank.as_deref()
    }

    pub fn category_subtotal(&self, category: &str) -> f64 {
        self.items
            .iter()
            .filter(|i| i.product.category == category)
            .map(CartItem::total)
            .sum()
    }
}

// ============================================================================
// Coupons
// ============================================================================

pub trait Coupon: Send {
    fn name(&self) -> String;
    fn is_applicable(&self, cart: &Cart) -> bool;
    fn discount(&self, cart: &Cart) -> f64;

    fn is_combinable(&self) -> bool {
        true
    }
}

pub struct SeasonalCoupon {
    category: String,
    percentage: f64,
    strategy: DiscountStrategy,
}

impl SeasonalCoupon {
    pub fn new(category: impl Into<String>, percentage: f64) -> Self {
        Self {
            category: category.into(),
            percentage,
            strategy: DiscountStrategy::new(StrategyType::Percentage, percentage, 0.0),
        }
    }
}

impl Coupon for SeasonalCoupon {
    fn name(&self) -> String {
        format!("Seasonal Offer {}% off {}", self.percentage, self.category)
    }

    fn is_applicable(&self, cart: &Cart) -> bool {
        cart.items().iter().any(|i| i.product.category == self.category)
    }

    fn discount(&self, cart: &Cart) -> f64 {
        self.strategy.calculate(cart.category_subtotal(&self.category))
    }
}

pub struct LoyaltyDiscount {
    percentage: f64,
    strategy: DiscountStrategy,
}

impl LoyaltyDiscount {
    pub fn new(percentage: f64) -> Self {
        Self {
            percentage,
            strategy: DiscountStrategy::new(StrategyType::Percentage, percentage, 0.0),
        }
    }
}

impl Coupon for LoyaltyDiscount {
    fn name(&self) -> String {
        format!("Loyalty Discount {}% off", self.percentage)
    }

    fn is_applicable(&self, cart: &Cart) -> bool {
        cart.is_loyalty_member()
    }

    fn discount(&self, cart: &Cart) -> f64 {
        self.strategy.calculate(cart.current_total())
    }
}

pub struct BulkPurchaseDiscount {
    threshold: f64,
    flat_off: f64,
    strategy: DiscountStrategy,
}

impl BulkPurchaseDiscount {
    pub fn new(threshold: f64, flat_off: f64) -> Self {
        Self {
            threshold,
            flat_off,
            strategy: DiscountStrategy::new(StrategyType::Flat, flat_off, 0.0),
        }
    }
}

impl Coupon for BulkPurchaseDiscount {
    fn name(&self) -> String {
        format!(
            "Bulk Purchase Rs {} off over {}",
            self.flat_off, self.threshold
        )
    }

    fn is_applicable(&self, cart: &Cart) -> bool {
        cart.original_total() >= self.threshold
    }

    fn discount(&self, cart: &Cart) -> f64 {
        self.strategy.calculate(cart.current_total())
    }
}

pub struct BankingCoupon {
    bank: String,
    min_spend: f64,
    percentage: f64,
    cap: f64,
    strategy: DiscountStrategy,
}

impl BankingCoupon {
    pub fn new(bank: impl Into<String>, min_spend: f64, percentage: f64, cap: f64) -> Self {
        Self {
            bank: bank.into(),
            min_spend,
            percentage,
            cap,
            strategy: DiscountStrategy::new(StrategyType::PercentageWithCap, percentage, cap),
        }
    }
}

impl Coupon for BankingCoupon {
    fn name(&self) -> String {
        format!(
            "{} Bank {}% off up to {}",
            self.bank, self.percentage, self.cap
        )
    }

    fn is_applicable(&self, cart: &Cart) -> bool {
        cart.payment_bank() == Some(self.bank.as_str()) && cart.original_total() >= self.min_spend
    }

    fn discount(&self, cart: &Cart) -> f64 {
        self.strategy.calculate(cart.current_total())
    }
}

/// Makes any coupon stop the chain once it applies.
pub struct Exclusive<C>(pub C);

impl<C: Coupon> Coupon for Exclusive<C> {
    fn name(&self) -> String {
        format!("{} (exclusive)", self.0.name())
    }

    fn is_applicable(&self, cart: &Cart) -> bool {
        self.0.is_applicable(cart)
    }

    fn discount(&self, cart: &Cart) -> f64 {
        self.0.discount(cart)
    }

    fn is_combinable(&self) -> bool {
        false
    }
}

// ============================================================================
// Manager
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount {
    pub coupon: String,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub applied: Vec<AppliedDiscount>,
    pub final_total: f64,
}

#[derive(Default)]
pub struct CouponManager {
    chain: Mutex<Vec<Box<dyn Coupon>>>,
}

impl fmt::Debug for CouponManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CouponManager")
            .field("coupons", &self.len())
            .finish()
    }
}

impl CouponManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Box<dyn Coupon>>> {
        match self.chain.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Appends to the end of the chain.
    pub fn register(&self, coupon: Box<dyn Coupon>) {
        let mut chain = self.lock();
        debug!(coupon = %coupon.name(), position = chain.len(), "coupon registered");
        chain.push(coupon);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn applicable(&self, cart: &Cart) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|c| c.is_applicable(cart))
            .map(|c| c.name())
            .collect()
    }

    pub fn apply_all(&self, cart: &mut Cart) -> Checkout {
        let chain = self.lock();
        let mut applied = Vec::new();
        for coupon in chain.iter() {
            if !coupon.is_applicable(cart) {
                continue;
            }
            let amount = coupon.discount(cart);
            cart.apply_discount(amount);
            info!(coupon = %coupon.name(), amount, total = cart.current_total(), "coupon applied");
            applied.push(AppliedDiscount {
                coupon: coupon.name(),
                amount,
            });
            if !coupon.is_combinable() {
                break;
            }
        }
        Checkout {
            applied,
            final_total: cart.current_total(),
        }
    }
}

pub fn sample_cart() -> Cart {
    let mut cart = Cart::new();
    cart.add_product(Product::new("Winter Jacket", "Clothing", 1000.0), 1);
    cart.add_product(Product::new("Smartphone", "Electronics", 20000.0), 1);
    cart.add_product(Product::new("Jeans", "Clothing", 1000.0), 2);
    cart.add_product(Product::new("Headphones", "Electronics", 2000.0), 1);
    cart.set_loyalty_member(true);
    cart.set_payment_bank("ABC");
    cart
}

pub fn sample_manager() -> CouponManager {
    let mgr = CouponManager::new();
    mgr.register(Box::new(SeasonalCoupon::new("Clothing", 10.0)));
    mgr.register(Box::new(LoyaltyDiscount::new(5.0)));
    mgr.register(Box::new(BulkPurchaseDiscount::new(1000.0, 100.0)));
    mgr.register(Box::new(BankingCoupon::new("ABC", 2000.0, 15.0, 500.0)));
    mgr
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    let mgr = sample_manager();
    let mut cart = sample_cart();

    t.heading("Coupon engine: cart");
    t.line(format!("Original cart total: Rs {:.2}", cart.original_total()));

    t.heading("Applicable coupons");
    t.extend(mgr.applicable(&cart));

    t.heading("Applying");
    let checkout = mgr.apply_all(&mut cart);
    for d in &checkout.applied {
        t.line(format!("{} applied: {:.2}", d.coupon, d.amount));
    }
    t.line(format!("Final cart total: Rs {:.2}", checkout.final_total));
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_strategies() {
        assert_eq!(DiscountStrategy::Flat(100.0).calculate(50.0), 50.0);
        assert_eq!(DiscountStrategy::Percentage(10.0).calculate(300.0), 30.0);
        let capped = DiscountStrategy::new(StrategyType::PercentageWithCap, 15.0, 500.0);
        assert_eq!(capped.calculate(10_000.0), 500.0);
        assert_eq!(capped.calculate(1000.0), 150.0);
    }

    #[test]
    fn test_sample_checkout_applies_every_coupon_in_order() {
        let mgr = sample_manager();
        let mut cart = sample_cart();
        assert_eq!(cart.original_total(), 25_000.0);

        let checkout = mgr.apply_all(&mut cart);
        let amounts: Vec<f64> = checkout.applied.iter().map(|d| d.amount).collect();
        assert_eq!(amounts, vec![300.0, 1235.0, 100.0, 500.0]);
        assert_eq!(checkout.final_total, 22_865.0);
    }

    #[test]
    fn test_applicable_depends_on_cart() {
        let mgr = sample_manager();
        let mut cart = Cart::new();
        cart.add_product(Product::new("Phone", "Electronics", 500.0), 1);
        assert!(mgr.applicable(&cart).is_empty());

        cart.set_loyalty_member(true);
        assert_eq!(mgr.applicable(&cart), vec!["Loyalty Discount 5% off"]);
    }

    #[test]
    fn test_exclusive_coupon_stops_the_chain() {
        let mgr = CouponManager::new();
        mgr.register(Box::new(Exclusive(SeasonalCoupon::new("Clothing", 10.0))));
        mgr.register(Box::new(LoyaltyDiscount::new(5.0)));

        let mut cart = sample_cart();
        let checkout = mgr.apply_all(&mut cart);
        assert_eq!(checkout.applied.len(), 1);
        assert_eq!(checkout.final_total, 24_700.0);
    }

    #[test]
    fn test_discount_never_goes_negative() {
        let mgr = CouponManager::new();
        mgr.register(Box::new(BulkPurchaseDiscount::new(0.0, 1000.0)));
        let mut cart = Cart::new();
        cart.add_product(Product::new("Pen", "Stationery", 20.0), 1);

        let checkout = mgr.apply_all(&mut cart);
        assert_eq!(checkout.applied[0].amount, 20.0);
        assert_eq!(checkout.final_total, 0.0);
    }

    #[test]
    fn test_registration_from_many_threads() {
        let mgr = Arc::new(CouponManager::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let mgr = Arc::clone(&mgr);
                thread::spawn(move || mgr.register(Box::new(LoyaltyDiscount::new(i as f64))))
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(mgr.len(), 8);
    }
}
