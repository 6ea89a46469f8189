/* ===============================
   State: water-bottle vending machine
   =============================== */

use std::fmt;

use tracing::debug;

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendingState {
    NoCoin,
    HasCoin,
    Dispensing,
    SoldOut,
}

impl fmt::Display for VendingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VendingState::NoCoin => "NO_COIN",
            VendingState::HasCoin => "HAS_COIN",
            VendingState::Dispensing => "DISPENSING",
            VendingState::SoldOut => "SOLD_OUT",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub struct VendingMachine {
    state: VendingState,
    items: u32,
    price: u32,
    inserted: u32,
}

impl VendingMachine {
    pub fn new(items: u32, price: u32) -> Self {
        let state = if items == 0 {
            VendingState::SoldOut
        } else {
            VendingState::NoCoin
        };
        Self {
            state,
            items,
            price,
            inserted: 0,
        }
    }

    pub fn state(&self) -> VendingState {
        self.state
    }

    pub fn items(&self) -> u32 {
        self.items
    }

    pub fn inserted(&self) -> u32 {
        self.inserted
    }

    fn transition(&mut self, next: VendingState, message: String) -> String {
        if next != self.state {
            debug!(from = %self.state, to = %next, "vending state change");
        }
        self.state = next;
        message
    }

    pub fn insert_coin(&mut self, coin: u32) -> String {
        match self.state {
            VendingState::NoCoin => {
                self.inserted = coin;
                self.transition(
                    VendingState::HasCoin,
                    format!("Coin inserted. Current balance: Rs {coin}"),
                )
            }
            VendingState::HasCoin => {
                self.inserted += coin;
                format!(
                    "Additional coin inserted. Current balance: Rs {}",
                    self.inserted
                )
            }
            VendingState::Dispensing => {
                format!("Please wait, already dispensing item. Coin returned: Rs {coin}")
            }
            VendingState::SoldOut => format!("Machine is sold out. Coin returned: Rs {coin}"),
        }
    }

    pub fn select_item(&mut self) -> String {
        match self.state {
            VendingState::NoCoin => "Please insert coin first!".to_string(),
            VendingState::HasCoin if self.inserted >= self.price => {
                let change = self.inserted - self.price;
                self.inserted = 0;
                let mut msg = "Item selected, dispensing...".to_string();
                if change > 0 {
                    msg.push_str(&format!(" Change returned: Rs {change}"));
                }
                self.transition(VendingState::Dispensing, msg)
            }
            VendingState::HasCoin => format!(
                "Insufficient funds. Need Rs {} more.",
                self.price - self.inserted
            ),
            VendingState::Dispensing => "Already dispensing item. Please wait.".to_string(),
            VendingState::SoldOut => "Machine is sold out!".to_string(),
        }
    }

    pub fn dispense(&mut self) -> String {
        match self.state {
            VendingState::NoCoin => "Please insert coin and select item first!".to_string(),
            VendingState::HasCoin => "Please select an item first!".to_string(),
            VendingState::Dispensing => {
                self.items = self.items.saturating_sub(1);
                let next = if self.items == 0 {
                    VendingState::SoldOut
                } else {
                    VendingState::NoCoin
                };
                self.transition(next, "Item dispensed!".to_string())
            }
            VendingState::SoldOut => "Machine is sold out!".to_string(),
        }
    }

    pub fn return_coin(&mut self) -> String {
        match self.state {
            VendingState::NoCoin => "No coin to return!".to_string(),
            VendingState::HasCoin => {
                let coins = std::mem::take(&mut self.inserted);
                self.transition(
                    VendingState::NoCoin,
                    format!("Coin returned: Rs {coins}"),
                )
            }
            VendingState::Dispensing => {
                "Cannot return the coin while dispensing item!".to_string()
            }
            VendingState::SoldOut => "Machine is sold out, no coin inserted.".to_string(),
        }
    }

    /// Only allowed while idle or sold out.
    pub fn refill(&mut self, quantity: u32) -> String {
        match self.state {
            VendingState::NoCoin | VendingState::SoldOut => {
                self.items += quantity;
                self.transition(VendingState::NoCoin, format!("Refilled {quantity} item(s)"))
            }
            VendingState::HasCoin | VendingState::Dispensing => {
                "Can't refill in this state".to_string()
            }
        }
    }

    pub fn status(&self) -> String {
        format!(
            "[items={} inserted=Rs {} state={}]",
            self.items, self.inserted, self.state
        )
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("State: vending machine (2 items at Rs 20)");

    let mut m = VendingMachine::new(2, 20);
    t.line(m.status());

    let steps: Vec<(&str, Vec<String>)> = vec![
        ("1. select without coin", vec![m.select_item()]),
        ("2. insert Rs 10", vec![m.insert_coin(10)]),
        ("3. select with insufficient funds", vec![m.select_item()]),
        ("4. insert another Rs 10", vec![m.insert_coin(10)]),
        ("5. select", vec![m.select_item()]),
        ("6. dispense", vec![m.dispense()]),
        (
            "7. buy the last item",
            vec![m.insert_coin(20), m.select_item(), m.dispense()],
        ),
        ("8. use sold-out machine", vec![m.insert_coin(5)]),
        ("9. refill 2", vec![m.refill(2)]),
    ];
    for (label, outputs) in steps {
        t.line(label);
        t.extend(outputs.into_iter().map(|o| format!("    {o}")));
    }
    t.line(m.status());
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_purchase_cycle() {
        let mut m = VendingMachine::new(2, 20);
        assert_eq!(m.select_item(), "Please insert coin first!");
        m.insert_coin(10);
        assert_eq!(m.state(), VendingState::HasCoin);
        assert_eq!(m.select_item(), "Insufficient funds. Need Rs 10 more.");
        m.insert_coin(10);
        m.select_item();
        assert_eq!(m.state(), VendingState::Dispensing);
        assert_eq!(m.inserted(), 0);
        m.dispense();
        assert_eq!(m.state(), VendingState::NoCoin);
        assert_eq!(m.items(), 1);
    }

    #[test]
    fn test_last_item_sells_out_and_refill_recovers() {
        let mut m = VendingMachine::new(1, 20);
        m.insert_coin(50);
        assert!(m.select_item().contains("Change returned: Rs 30"));
        m.dispense();
        assert_eq!(m.state(), VendingState::SoldOut);
        assert_eq!(m.insert_coin(5), "Machine is sold out. Coin returned: Rs 5");

        m.refill(2);
        assert_eq!(m.state(), VendingState::NoCoin);
        assert_eq!(m.items(), 2);
    }

    #[test]
    fn test_refill_refused_mid_transaction() {
        let mut m = VendingMachine::new(1, 20);
        m.insert_coin(5);
        assert_eq!(m.refill(3), "Can't refill in this state");
        assert_eq!(m.items(), 1);
        assert_eq!(m.return_coin(), "Coin returned: Rs 5");
        assert_eq!(m.state(), VendingState::NoCoin);
    }

    #[test]
    fn test_coin_cannot_be_returned_while_dispensing() {
        let mut m = VendingMachine::new(3, 10);
        m.insert_coin(10);
        m.select_item();
        assert_eq!(
            m.return_coin(),
            "Cannot return the coin while dispensing item!"
        );
        assert_eq!(m.state(), VendingState::Dispensing);
    }

    #[test]
    fn test_empty_machine_starts_sold_out() {
        assert_eq!(VendingMachine::new(0, 10).state(), VendingState::SoldOut);
    }
}
