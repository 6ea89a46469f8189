/* ===============================
   Facade: one call to boot a computer
   =============================== */

use crate::config::AppConfig;
use crate::transcript::Transcript;

pub struct PowerSupply;
pub struct CoolingSystem;
pub struct HardDrive;
pub struct Cpu;
pub struct Memory;
pub struct OperatingSystem;
pub struct Bios;

impl PowerSupply {
    pub fn provide_power(&self) -> String {
        "Power Supply: Providing power...".to_string()
    }
}

impl CoolingSystem {
    pub fn start_fans(&self) -> String {
        "Cooling System: Fans started...".to_string()
    }
}

impl HardDrive {
    pub fn spin_up(&self) -> String {
        "Hard Drive: Spinning up...".to_string()
    }
}

impl Cpu {
    pub fn initialize(&self) -> String {
        "CPU: Initialization started...".to_string()
    }
}

impl Memory {
    pub fn self_test(&self) -> String {
        "Memory: Self-test passed...".to_string()
    }
}

impl OperatingSystem {
    pub fn load(&self) -> String {
        "Operating System: Loading into memory...".to_string()
    }
}

impl Bios {
    pub fn boot(&self, cpu: &Cpu, memory: &Memory) -> Vec<String> {
        vec![
            "BIOS: Booting CPU and Memory checks...".to_string(),
            cpu.initialize(),
            memory.self_test(),
        ]
    }
}

pub struct ComputerFacade {
    power: PowerSupply,
    cooling: CoolingSystem,
    disk: HardDrive,
    cpu: Cpu,
    memory: Memory,
    os: OperatingSystem,
    bios: Bios,
}

impl Default for ComputerFacade {
    fn default() -> Self {
        Self {
            power: PowerSupply,
            cooling: CoolingSystem,
            disk: HardDrive,
            cpu: Cpu,
            memory: Memory,
            os: OperatingSystem,
            bios: Bios,
        }
    }
}

impl ComputerFacade {
    pub fn start_computer(&self) -> Vec<String> {
        let mut steps = vec![
            self.power.provide_power(),
            self.cooling.start_fans(),
            self.disk.spin_up(),
        ];
        steps.extend(self.bios.boot(&self.cpu, &self.memory));
        steps.push(self.os.load());
        steps.push("Computer started successfully!".to_string());
        steps
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Facade: computer start-up");
    t.extend(ComputerFacade::default().start_computer());
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_sequence_order() {
        let steps = ComputerFacade::default().start_computer();
        assert_eq!(steps.len(), 8);
        assert!(steps[0].starts_with("Power Supply"));
        assert!(steps[3].starts_with("BIOS"));
        assert!(steps[4].starts_with("CPU"));
        assert!(steps[5].starts_with("Memory"));
        assert!(steps[6].starts_with("Operating System"));
        assert_eq!(steps[7], "Computer started successfully!");
    }
}
