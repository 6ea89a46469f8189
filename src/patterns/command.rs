//! Command: a four-button remote whose buttons toggle appliance commands.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::transcript::Transcript;

pub const BUTTONS: usize = 4;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("{0} is not a valid button index")]
    InvalidButton(usize),
    #[error("no command assigned to button {0}")]
    Unassigned(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplianceKind {
    Light,
    Fan,
    AirConditioner,
}

impl ApplianceKind {
    fn label(self) -> &'static str {
        match self {
            ApplianceKind::Light => "Light",
            ApplianceKind::Fan => "Fan",
            ApplianceKind::AirConditioner => "AC",
        }
    }
}

#[derive(Debug)]
pub struct Appliance {
    kind: ApplianceKind,
    on: bool,
}

impl Appliance {
    pub fn new(kind: ApplianceKind) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self { kind, on: false }))
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    fn switch(&mut self, on: bool) -> String {
        self.on = on;
        format!("{} is {}", self.kind.label(), if on { "ON" } else { "OFF" })
    }
}

pub trait Command {
    fn execute(&mut self) -> String;
    fn undo(&mut self) -> String;
}

/// Turns an appliance on; undo turns it back off.
pub struct SwitchCommand {
    appliance: Rc<RefCell<Appliance>>,
}

impl SwitchCommand {
    pub fn new(appliance: Rc<RefCell<Appliance>>) -> Self {
        Self { appliance }
    }
}

impl Command for SwitchCommand {
    fn execute(&mut self) -> String {
        self.appliance.borrow_mut().switch(true)
    }

    fn undo(&mut self) -> String {
        self.appliance.borrow_mut().switch(false)
    }
}

struct Slot {
    command: Box<dyn Command>,
    pressed: bool,
}

#[derive(Default)]
pub struct RemoteControl {
    slots: [Option<Slot>; BUTTONS],
}

impl RemoteControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_command(
        &mut self,
        index: usize,
        command: Box<dyn Command>,
    ) -> Result<(), CommandError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(CommandError::InvalidButton(index))?;
        *slot = Some(Slot {
            command,
            pressed: false,
        });
        Ok(())
    }

    /// First press executes, the next one undoes.
    pub fn press(&mut self, index: usize) -> Result<String, CommandError> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(CommandError::InvalidButton(index))?
            .as_mut()
            .ok_or(CommandError::Unassigned(index))?;

        let out = if slot.pressed {
            slot.command.undo()
        } else {
            slot.command.execute()
        };
        slot.pressed = !slot.pressed;
        Ok(out)
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Command: remote control");

    let light = Appliance::new(ApplianceKind::Light);
    let fan = Appliance::new(ApplianceKind::Fan);
    let ac = Appliance::new(ApplianceKind::AirConditioner);

    let mut remote = RemoteControl::new();
    remote.set_command(0, Box::new(SwitchCommand::new(light)))?;
    remote.set_command(1, Box::new(SwitchCommand::new(fan)))?;
    remote.set_command(2, Box::new(SwitchCommand::new(ac)))?;

    for index in [0, 0, 1, 1, 2, 2, 3, 7] {
        match remote.press(index) {
            Ok(line) => t.line(line),
            Err(e) => t.line(format!("error: {e}")),
        };
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_toggles_between_execute_and_undo() {
        let light = Appliance::new(ApplianceKind::Light);
        let mut remote = RemoteControl::new();
        remote
            .set_command(0, Box::new(SwitchCommand::new(Rc::clone(&light))))
            .unwrap();

        assert_eq!(remote.press(0).unwrap(), "Light is ON");
        assert!(light.borrow().is_on());
        assert_eq!(remote.press(0).unwrap(), "Light is OFF");
        assert!(!light.borrow().is_on());
    }

    #[test]
    fn test_invalid_and_unassigned_buttons() {
        let mut remote = RemoteControl::new();
        assert_eq!(remote.press(9), Err(CommandError::InvalidButton(9)));
        assert_eq!(remote.press(3), Err(CommandError::Unassigned(3)));

        let fan = Appliance::new(ApplianceKind::Fan);
        assert_eq!(
            remote.set_command(4, Box::new(SwitchCommand::new(fan))),
            Err(CommandError::InvalidButton(4))
        );
    }

    #[test]
    fn test_reassigning_button_resets_toggle() {
        let ac = Appliance::new(ApplianceKind::AirConditioner);
        let mut remote = RemoteControl::new();
        remote
            .set_command(2, Box::new(SwitchCommand::new(Rc::clone(&ac))))
            .unwrap();
        remote.press(2).unwrap();
        remote
            .set_command(2, Box::new(SwitchCommand::new(Rc::clone(&ac))))
            .unwrap();
        assert_eq!(remote.press(2).unwrap(), "AC is ON");
    }
}
