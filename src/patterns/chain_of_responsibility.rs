/* ===============================
   Chain of Responsibility: ATM note dispenser
   =============================== */

use tracing::debug;

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Dispense {
    /// (denomination, notes handed out), in chain order.
    pub notes: Vec<(u32, u32)>,
    /// Amount no handler could cover.
    pub unfulfilled: u32,
}

impl Dispense {
    pub fn dispensed_total(&self) -> u32 {
        self.notes.iter().map(|(d, n)| d * n).sum()
    }
}

pub struct NoteHandler {
    denomination: u32,
    available: u32,
    next: Option<Box<NoteHandler>>,
}

impl NoteHandler {
    pub fn new(denomination: u32, available: u32) -> Self {
        Self {
            denomination,
            available,
            next: None,
        }
    }

    pub fn with_next(mut self, next: NoteHandler) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    pub fn denomination(&self) -> u32 {
        self.denomination
    }

    pub fn available(&self) -> u32 {
        self.available
    }

    pub fn add_notes(&mut self, count: u32) {
        self.available += count;
    }

    pub fn dispense(&mut self, amount: u32) -> Dispense {
        let mut result = Dispense::default();
        self.handle(amount, &mut result);
        result
    }

    fn handle(&mut self, amount: u32, result: &mut Dispense) {
        // a zero-value handler dispenses nothing and just forwards
        let wanted = amount.checked_div(self.denomination).unwrap_or(0);
        let given = wanted.min(self.available);
        if given > 0 {
            self.available -= given;
            result.notes.push((self.denomination, given));
            debug!(denomination = self.denomination, given, "notes dispensed");
        }

        let remaining = amount - given * self.denomination;
        if remaining == 0 {
            return;
        }
        match self.next.as_mut() {
            Some(next) => next.handle(remaining, result),
            None => result.unfulfilled = remaining,
        }
    }

    /// Finds the handler for a denomination anywhere in the chain.
    pub fn handler_mut(&mut self, denomination: u32) -> Option<&mut NoteHandler> {
        if self.denomination == denomination {
            return Some(self);
        }
        self.next.as_mut()?.handler_mut(denomination)
    }
}

pub struct Atm {
    chain: NoteHandler,
}

impl Atm {
    pub fn new(chain: NoteHandler) -> Self {
        Self { chain }
    }

    /// 1000 x3, 500 x5, 200 x10, 100 x20.
    pub fn standard() -> Self {
        Self::new(
            NoteHandler::new(1000, 3).with_next(
                NoteHandler::new(500, 5)
                    .with_next(NoteHandler::new(200, 10).with_next(NoteHandler::new(100, 20))),
            ),
        )
    }

    pub fn withdraw(&mut self, amount: u32) -> Dispense {
        self.chain.dispense(amount)
    }

    pub fn refill(&mut self, denomination: u32, count: u32) -> bool {
        match self.chain.handler_mut(denomination) {
            Some(handler) => {
                handler.add_notes(count);
                true
            }
            None => false,
        }
    }
}

fn describe(amount: u32, d: &Dispense) -> Vec<String> {
    let mut lines = vec![format!("Withdraw {amount}")];
    lines.extend(
        d.notes
            .iter()
            .map(|(den, n)| format!("Dispensing {n} x {den} notes")),
    );
    if d.unfulfilled > 0 {
        lines.push(format!(
            "Remaining amount {} cannot be fulfilled",
            d.unfulfilled
        ));
    }
    lines
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Chain of Responsibility: ATM");

    let mut atm = Atm::standard();
    let first = atm.withdraw(4300);
    t.extend(describe(4300, &first));

    let second = atm.withdraw(9050);
    t.extend(describe(9050, &second));
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_withdrawal_uses_largest_notes_first() {
        let mut atm = Atm::standard();
        let d = atm.withdraw(4300);
        assert_eq!(d.notes, vec![(1000, 3), (500, 2), (200, 1), (100, 1)]);
        assert_eq!(d.unfulfilled, 0);
        assert_eq!(d.dispensed_total(), 4300);
    }

    #[test]
    fn test_running_out_of_big_notes_falls_through() {
        let mut atm = Atm::standard();
        atm.withdraw(3000);
        let d = atm.withdraw(1000);
        assert_eq!(d.notes, vec![(500, 2)]);
    }

    #[test]
    fn test_amount_that_cannot_be_made_is_reported() {
        let mut atm = Atm::standard();
        let d = atm.withdraw(150);
        assert_eq!(d.notes, vec![(100, 1)]);
        assert_eq!(d.unfulfilled, 50);
    }

    #[test]
    fn test_exhausted_chain_leaves_remainder() {
        let mut atm = Atm::new(NoteHandler::new(100, 2));
        let d = atm.withdraw(500);
        assert_eq!(d.notes, vec![(100, 2)]);
        assert_eq!(d.unfulfilled, 300);
    }

    #[test]
    fn test_zero_denomination_forwards_everything() {
        let mut alone = NoteHandler::new(0, 5);
        let d = alone.dispense(100);
        assert!(d.notes.is_empty());
        assert_eq!(d.unfulfilled, 100);

        let mut chain = NoteHandler::new(0, 5).with_next(NoteHandler::new(100, 2));
        let d = chain.dispense(200);
        assert_eq!(d.notes, vec![(100, 2)]);
        assert_eq!(d.unfulfilled, 0);
    }

    #[test]
    fn test_refill_finds_handler_in_chain() {
        let mut atm = Atm::standard();
        assert!(atm.refill(200, 5));
        assert!(!atm.refill(50, 5));
        assert_eq!(atm.chain.handler_mut(200).unwrap().available(), 15);
    }
}
