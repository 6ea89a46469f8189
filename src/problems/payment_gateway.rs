//! Payment gateway with pluggable providers, a fixed validate/initiate/confirm
//! flow, and a retrying proxy whose back-off is a swappable strategy.

use std::fmt;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{AppConfig, PaymentConfig};
use crate::transcript::Transcript;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaymentError {
    #[error("[{gateway}] validation failed for {sender}: {reason}")]
    Validation {
        gateway: &'static str,
        sender: String,
        reason: String,
    },

    #[error("[{gateway}] bank declined payment for {sender}")]
    Declined {
        gateway: &'static str,
        sender: String,
    },

    #[error("payment failed after {attempts} attempt(s): {last}")]
    Exhausted {
        attempts: u32,
        last: Box<PaymentError>,
    },

    #[error("no payment gateway selected")]
    NoGateway,
}

impl PaymentError {
    pub fn validation(gateway: &'static str, request: &PaymentRequest, reason: impl Into<String>) -> Self {
        Self::Validation {
            gateway,
            sender: request.sender.clone(),
            reason: reason.into(),
        }
    }

    /// Validation problems do not go away by retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Declined { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentRequest {
    pub sender: String,
    pub receiver: String,
    pub currency: String,
    pub amount: f64,
}

impl PaymentRequest {
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        currency: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            currency: currency.into(),
            amount,
        }
    }

    /// NaN and infinities are not positive amounts.
    pub fn has_positive_amount(&self) -> bool {
        self.amount.is_finite() && self.amount > 0.0
    }
}

// ============================================================================
// Banking systems
// ============================================================================

pub trait BankingSystem {
    fn process_payment(&mut self, amount: f64) -> bool;
}

/// A bank that approves a fixed share of payments.
pub struct SimulatedBank {
    name: &'static str,
    success_rate: f64,
    rng: StdRng,
}

impl SimulatedBank {
    pub fn new(name: &'static str, success_rate: f64, seed: u64) -> Self {
        Self {
            name,
            success_rate: if success_rate.is_finite() {
                success_rate.clamp(0.0, 1.0)
            } else {
                0.0
            },
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl BankingSystem for SimulatedBank {
    fn process_payment(&mut self, amount: f64) -> bool {
        let approved = self.rng.gen_bool(self.success_rate);
        info!(bank = self.name, amount, approved, "bank processed payment");
        approved
    }
}

// ============================================================================
// Gateways
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentOutcome {
    pub gateway: &'static str,
    pub attempts: u32,
}

pub trait PaymentGateway {
    fn name(&self) -> &'static str;
    fn validate(&self, request: &PaymentRequest) -> Result<(), PaymentError>;
    fn initiate(&mut self, request: &PaymentRequest) -> Result<(), PaymentError>;
    fn confirm(&self, request: &PaymentRequest) -> Result<(), PaymentError>;

    /// Fixed flow; gateways customise the steps, not the order.
    fn process_payment(&mut self, request: &PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        self.validate(request)?;
        self.initiate(request)?;
        self.confirm(request)?;
        Ok(PaymentOutcome {
            gateway: self.name(),
            attempts: 1,
        })
    }
}

pub struct PaytmGateway {
    bank: Box<dyn BankingSystem>,
}

impl PaytmGateway {
    pub fn new(bank: Box<dyn BankingSystem>) -> Self {
        Self { bank }
    }
}

impl PaymentGateway for PaytmGateway {
    fn name(&self) -> &'static str {
        "PAYTM"
    }

    fn validate(&self, request: &PaymentRequest) -> Result<(), PaymentError> {
        if !request.has_positive_amount() {
            return Err(PaymentError::validation(self.name(), request, "amount must be positive"));
        }
        if request.currency != "INR" {
            return Err(PaymentError::validation(
                self.name(),
                request,
                format!("currency {} not supported", request.currency),
            ));
        }
        Ok(())
    }

    fn initiate(&mut self, request: &PaymentRequest) -> Result<(), PaymentError> {
        if self.bank.process_payment(request.amount) {
            Ok(())
        } else {
            Err(PaymentError::Declined {
                gateway: self.name(),
                sender: request.sender.clone(),
            })
        }
    }

    fn confirm(&self, _request: &PaymentRequest) -> Result<(), PaymentError> {
        Ok(())
    }
}

pub struct RazorpayGateway {
    bank: Box<dyn BankingSystem>,
}

impl RazorpayGateway {
    pub fn new(bank: Box<dyn BankingSystem>) -> Self {
        Self { bank }
    }
}

impl PaymentGateway for RazorpayGateway {
    fn name(&self) -> &'static str {
        "RAZORPAY"
    }

    fn validate(&self, request: &PaymentRequest) -> Result<(), PaymentError> {
        if !request.has_positive_amount() {
            return Err(PaymentError::validation(self.name(), request, "amount must be positive"));
        }
        Ok(())
    }

    fn initiate(&mut self, request: &PaymentRequest) -> Result<(), PaymentError> {
        if self.bank.process_payment(request.amount) {
            Ok(())
        } else {
            Err(PaymentError::Declined {
                gateway: self.name(),
                sender: request.sender.clone(),
            })
        }
    }

    fn confirm(&self, _request: &PaymentRequest) -> Result<(), PaymentError> {
        Ok(())
    }
}

// ============================================================================
// Retry strategies
// ============================================================================

pub trait RetryStrategy {
    fn name(&self) -> &'static str;
    /// Delay before retry number `retry` (1-based).
    fn delay(&self, retry: u32) -> Duration;
}

#[derive(Debug, Clone, Copy)]
pub struct LinearRetry {
    pub step: Duration,
}

impl RetryStrategy for LinearRetry {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn delay(&self, retry: u32) -> Duration {
        self.step * retry
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub max: Duration,
}

impl RetryStrategy for ExponentialBackoff {
    fn name(&self) -> &'static str {
        "exponential back-off"
    }

    fn delay(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }
}

/// Wraps a real gateway and retries declined payments.
pub struct PaymentGatewayProxy {
    inner: Box<dyn PaymentGateway>,
    retry: Box<dyn RetryStrategy>,
    max_attempts: u32,
}

impl PaymentGatewayProxy {
    pub fn new(inner: Box<dyn PaymentGateway>, retry: Box<dyn RetryStrategy>, max_attempts: u32) -> Self {
        Self {
            inner,
            retry,
            max_attempts: max_attempts.max(1),
        }
    }
}

impl PaymentGateway for PaymentGatewayProxy {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn validate(&self, request: &PaymentRequest) -> Result<(), PaymentError> {
        self.inner.validate(request)
    }

    fn initiate(&mut self, request: &PaymentRequest) -> Result<(), PaymentError> {
        self.inner.initiate(request)
    }

    fn confirm(&self, request: &PaymentRequest) -> Result<(), PaymentError> {
        self.inner.confirm(request)
    }

    fn process_payment(&mut self, request: &PaymentRequest) -> Result<PaymentOutcome, PaymentError> {
        let mut attempt = 1;
        loop {
            match self.inner.process_payment(request) {
                Ok(outcome) => {
                    return Ok(PaymentOutcome {
                        attempts: attempt,
                        ..outcome
                    })
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt >= self.max_attempts => {
                    return Err(PaymentError::Exhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    })
                }
                Err(e) => {
                    let delay = self.retry.delay(attempt);
                    warn!(
                        gateway = self.inner.name(),
                        attempt = attempt + 1,
                        strategy = self.retry.name(),
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying payment"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
            }
        }
    }
}

// ============================================================================
// Factory, service, controller
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayType {
    Paytm,
    Razorpay,
}

impl fmt::Display for GatewayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayType::Paytm => f.write_str("Paytm"),
            GatewayType::Razorpay => f.write_str("Razorpay"),
        }
    }
}

pub struct PaymentGatewayFactory {
    config: PaymentConfig,
    created: u64,
}

impl PaymentGatewayFactory {
    pub fn new(config: PaymentConfig) -> Self {
        Self { config, created: 0 }
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.config.retry_base_delay_ms)
    }

    pub fn create(&mut self, kind: GatewayType, retry: Box<dyn RetryStrategy>) -> Box<dyn PaymentGateway> {
        // Each gateway gets its own stream so results do not depend on call order elsewhere.
        let seed = self.config.seed.wrapping_add(self.created);
        self.created += 1;
        match kind {
            GatewayType::Paytm => {
                let bank = SimulatedBank::new("PAYTM BANK", self.config.paytm_success_rate, seed);
                Box::new(PaymentGatewayProxy::new(
                    Box::new(PaytmGateway::new(Box::new(bank))),
                    retry,
                    self.config.paytm_attempts,
                ))
            }
            GatewayType::Razorpay => {
                let bank = SimulatedBank::new("RAZORPAY BANK", self.config.razorpay_success_rate, seed);
                Box::new(PaymentGatewayProxy::new(
                    Box::new(RazorpayGateway::new(Box::new(bank))),
                    retry,
                    self.config.razorpay_attempts,
                ))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentReceipt {
    pub transaction_id: Uuid,
    pub gateway: &'static str,
    pub attempts: u32,
    pub amount: f64,
    pub currency: String,
}

#[derive(Default)]
pub struct PaymentService {
    gateway: Option<Box<dyn PaymentGateway>>,
}

impl PaymentService {
    pub fn set_gateway(&mut self, gateway: Box<dyn PaymentGateway>) {
        self.gateway = Some(gateway);
    }

    pub fn process_payment(&mut self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        let gateway = self.gateway.as_mut().ok_or(PaymentError::NoGateway)?;
        let outcome = gateway.process_payment(request)?;
        Ok(PaymentReceipt {
            transaction_id: Uuid::new_v4(),
            gateway: outcome.gateway,
            attempts: outcome.attempts,
            amount: request.amount,
            currency: request.currency.clone(),
        })
    }
}

pub struct PaymentController {
    factory: PaymentGatewayFactory,
    service: PaymentService,
}

impl PaymentController {
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            factory: PaymentGatewayFactory::new(config),
            service: PaymentService::default(),
        }
    }

    pub fn factory(&self) -> &PaymentGatewayFactory {
        &self.factory
    }

    pub fn process_payment(
        &mut self,
        kind: GatewayType,
        request: &PaymentRequest,
        retry: Box<dyn RetryStrategy>,
    ) -> Result<PaymentReceipt, PaymentError> {
        let gateway = self.factory.create(kind, retry);
        self.service.set_gateway(gateway);
        self.service.process_payment(request)
    }
}

fn report(result: &Result<PaymentReceipt, PaymentError>) -> String {
    match result {
        Ok(r) => format!(
            "Result: SUCCESS via {} after {} attempt(s), txn {}",
            r.gateway, r.attempts, r.transaction_id
        ),
        Err(e) => format!("Result: FAIL ({e})"),
    }
}

pub fn demo(config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    let mut controller = PaymentController::new(config.payment.clone());
    let base = controller.factory().base_delay();

    t.heading("Payment gateway: Paytm with linear retry");
    let req = PaymentRequest::new("Aditya", "Shubham", "INR", 1000.0);
    let res = controller.process_payment(GatewayType::Paytm, &req, Box::new(LinearRetry { step: base }));
    t.line(report(&res));

    t.heading("Payment gateway: Razorpay with exponential back-off");
    let req = PaymentRequest::new("Shubham", "Aditya", "USD", 500.0);
    let res = controller.process_payment(
        GatewayType::Razorpay,
        &req,
        Box::new(ExponentialBackoff {
            base,
            max: base * 8,
        }),
    );
    t.line(report(&res));

    t.heading("Payment gateway: Paytm rejects foreign currency");
    let req = PaymentRequest::new("Shubham", "Aditya", "USD", 500.0);
    let res = controller.process_payment(GatewayType::Paytm, &req, Box::new(LinearRetry { step: base }));
    t.line(report(&res));
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Approves according to a script.
    struct ScriptedBank {
        answers: Vec<bool>,
        calls: usize,
    }

    impl BankingSystem for ScriptedBank {
        fn process_payment(&mut self, _amount: f64) -> bool {
            let answer = self.answers.get(self.calls).copied().unwrap_or(false);
            self.calls += 1;
            answer
        }
    }

    fn scripted(answers: &[bool]) -> Box<dyn BankingSystem> {
        Box::new(ScriptedBank {
            answers: answers.to_vec(),
            calls: 0,
        })
    }

    fn no_wait() -> Box<dyn RetryStrategy> {
        Box::new(LinearRetry { step: Duration::ZERO })
    }

    #[test]
    fn test_paytm_validation() {
        let gw = PaytmGateway::new(scripted(&[]));
        assert!(gw.validate(&PaymentRequest::new("a", "b", "INR", 10.0)).is_ok());
        assert!(gw.validate(&PaymentRequest::new("a", "b", "USD", 10.0)).is_err());
        assert!(gw.validate(&PaymentRequest::new("a", "b", "INR", 0.0)).is_err());
    }

    #[test]
    fn test_non_finite_amounts_rejected() {
        let paytm = PaytmGateway::new(scripted(&[]));
        let razorpay = RazorpayGateway::new(scripted(&[]));
        for amount in [f64::NAN, f64::INFINITY, -1.0] {
            let req = PaymentRequest::new("a", "b", "INR", amount);
            assert!(matches!(paytm.validate(&req), Err(PaymentError::Validation { .. })));
            assert!(matches!(razorpay.validate(&req), Err(PaymentError::Validation { .. })));
        }
    }

    #[test]
    fn test_nan_success_rate_never_approves() {
        let mut bank = SimulatedBank::new("N", f64::NAN, 3);
        assert!((0..10).all(|_| !bank.process_payment(1.0)));
        let mut always = SimulatedBank::new("A", 7.0, 3);
        assert!((0..10).all(|_| always.process_payment(1.0)));
    }

    #[test]
    fn test_razorpay_accepts_any_currency() {
        let mut gw = RazorpayGateway::new(scripted(&[true]));
        let outcome = gw
            .process_payment(&PaymentRequest::new("a", "b", "USD", 5.0))
            .unwrap();
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.gateway, "RAZORPAY");
    }

    #[test]
    fn test_proxy_retries_until_success() {
        let inner = Box::new(PaytmGateway::new(scripted(&[false, false, true])));
        let mut proxy = PaymentGatewayProxy::new(inner, no_wait(), 3);
        let outcome = proxy
            .process_payment(&PaymentRequest::new("a", "b", "INR", 5.0))
            .unwrap();
        assert_eq!(outcome.attempts, 3);
    }

    #[test]
    fn test_proxy_gives_up_after_max_attempts() {
        let inner = Box::new(PaytmGateway::new(scripted(&[false, false, false, true])));
        let mut proxy = PaymentGatewayProxy::new(inner, no_wait(), 3);
        match proxy.process_payment(&PaymentRequest::new("a", "b", "INR", 5.0)) {
            Err(PaymentError::Exhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, PaymentError::Declined { .. }));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_proxy_does_not_retry_validation_failures() {
        let inner = Box::new(PaytmGateway::new(scripted(&[true])));
        let mut proxy = PaymentGatewayProxy::new(inner, no_wait(), 3);
        let err = proxy
            .process_payment(&PaymentRequest::new("a", "b", "EUR", 5.0))
            .unwrap_err();
        assert!(matches!(err, PaymentError::Validation { .. }));
    }

    #[test]
    fn test_retry_delays() {
        let linear = LinearRetry {
            step: Duration::from_millis(100),
        };
        assert_eq!(linear.delay(3), Duration::from_millis(300));

        let expo = ExponentialBackoff {
            base: Duration::from_millis(100),
            max: Duration::from_millis(1000),
        };
        assert_eq!(expo.delay(1), Duration::from_millis(100));
        assert_eq!(expo.delay(3), Duration::from_millis(400));
        assert_eq!(expo.delay(10), Duration::from_millis(1000));
        assert_eq!(expo.delay(64), Duration::from_millis(1000));
    }

    #[test]
    fn test_service_without_gateway() {
        let mut service = PaymentService::default();
        assert_eq!(
            service.process_payment(&PaymentRequest::new("a", "b", "INR", 1.0)),
            Err(PaymentError::NoGateway)
        );
    }

    #[test]
    fn test_controller_with_certain_outcomes() {
        let config = PaymentConfig {
            paytm_success_rate: 1.0,
            razorpay_success_rate: 0.0,
            ..PaymentConfig::default()
        };
        let mut controller = PaymentController::new(config);

        let ok = controller
            .process_payment(
                GatewayType::Paytm,
                &PaymentRequest::new("Aditya", "Shubham", "INR", 1000.0),
                no_wait(),
            )
            .unwrap();
        assert_eq!(ok.attempts, 1);
        assert_eq!(ok.currency, "INR");

        let err = controller
            .process_payment(
                GatewayType::Razorpay,
                &PaymentRequest::new("Shubham", "Aditya", "USD", 500.0),
                no_wait(),
            )
            .unwrap_err();
        assert!(matches!(err, PaymentError::Exhausted { attempts: 1, .. }));
    }

    #[test]
    fn test_seeded_bank_is_deterministic() {
        let mut a = SimulatedBank::new("A", 0.5, 9);
        let mut b = SimulatedBank::new("B", 0.5, 9);
        let ra: Vec<bool> = (0..20).map(|_| a.process_payment(1.0)).collect();
        let rb: Vec<bool> = (0..20).map(|_| b.process_payment(1.0)).collect();
        assert_eq!(ra, rb);
    }
}
