/* ===============================
   Bridge: cars decoupled from engines
   =============================== */

use std::rc::Rc;

use crate::config::AppConfig;
use crate::transcript::Transcript;

pub trait Engine {
    fn start(&self) -> String;
}

pub struct ElectricEngine;
pub struct PetrolEngine;
pub struct DieselEngine;

impl Engine for ElectricEngine {
    fn start(&self) -> String {
        "Electric engine powering up silently!".to_string()
    }
}

impl Engine for PetrolEngine {
    fn start(&self) -> String {
        "Petrol engine starting with ignition!".to_string()
    }
}

impl Engine for DieselEngine {
    fn start(&self) -> String {
        "Diesel engine roaring to life!".to_string()
    }
}

/// Abstraction side. Each car only knows it has *some* engine.
pub trait Car {
    fn engine(&self) -> &dyn Engine;
    fn describe(&self) -> String;

    fn drive(&self) -> Vec<String> {
        vec![self.engine().start(), self.describe()]
    }
}

pub struct Suv {
    engine: Rc<dyn Engine>,
}

pub struct Sedan {
    engine: Rc<dyn Engine>,
}

impl Suv {
    pub fn new(engine: Rc<dyn Engine>) -> Self {
        Self { engine }
    }
}

impl Sedan {
    pub fn new(engine: Rc<dyn Engine>) -> Self {
        Self { engine }
    }
}

impl Car for Suv {
    fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    fn describe(&self) -> String {
        "Driving an SUV off-road".to_string()
    }
}

impl Car for Sedan {
    fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    fn describe(&self) -> String {
        "Driving a Sedan on the highway".to_string()
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    t.heading("Bridge: cars x engines");

    let petrol: Rc<dyn Engine> = Rc::new(PetrolEngine);
    let cars: Vec<Box<dyn Car>> = vec![
        Box::new(Suv::new(Rc::new(ElectricEngine))),
        Box::new(Sedan::new(Rc::clone(&petrol))),
        Box::new(Suv::new(Rc::new(DieselEngine))),
        Box::new(Suv::new(petrol)),
    ];
    for car in &cars {
        t.extend(car.drive());
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_runs_before_car_drives() {
        let sedan = Sedan::new(Rc::new(DieselEngine));
        assert_eq!(
            sedan.drive(),
            vec![
                "Diesel engine roaring to life!".to_string(),
                "Driving a Sedan on the highway".to_string()
            ]
        );
    }

    #[test]
    fn test_engine_can_be_shared_between_cars() {
        let engine: Rc<dyn Engine> = Rc::new(ElectricEngine);
        let suv = Suv::new(Rc::clone(&engine));
        let sedan = Sedan::new(Rc::clone(&engine));

        assert_eq!(Rc::strong_count(&engine), 3);
        assert_eq!(suv.drive()[0], sedan.drive()[0]);
    }
}
