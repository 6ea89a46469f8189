//! Strategy: robots assembled from swappable talk/walk/fly behaviours.

use crate::config::AppConfig;
use crate::transcript::Transcript;

// ============================================================================
// Behaviours
// ============================================================================

pub trait Talk {
    fn talk(&self) -> &'static str;
}

pub trait Walk {
    fn walk(&self) -> &'static str;
}

pub trait Fly {
    fn fly(&self) -> &'static str;
}

pub struct NormalTalk;
pub struct NoTalk;
pub struct NormalWalk;
pub struct NoWalk;
pub struct NormalFly;
pub struct NoFly;

impl Talk for NormalTalk {
    fn talk(&self) -> &'static str {
        "Talking normally."
    }
}

impl Talk for NoTalk {
    fn talk(&self) -> &'static str {
        "Can't talk!"
    }
}

impl Walk for NormalWalk {
    fn walk(&self) -> &'static str {
        "Walking normally."
    }
}

impl Walk for NoWalk {
    fn walk(&self) -> &'static str {
        "Can't walk!"
    }
}

impl Fly for NormalFly {
    fn fly(&self) -> &'static str {
        "Flying normally."
    }
}

impl Fly for NoFly {
    fn fly(&self) -> &'static str {
        "Can't fly!"
    }
}

// ============================================================================
// Robot
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotKind {
    Companion,
    Worker,
}

pub struct Robot {
    kind: RobotKind,
    talker: Box<dyn Talk>,
    walker: Box<dyn Walk>,
    flyer: Box<dyn Fly>,
}

impl Robot {
    pub fn new(
        kind: RobotKind,
        talker: Box<dyn Talk>,
        walker: Box<dyn Walk>,
        flyer: Box<dyn Fly>,
    ) -> Self {
        Self {
            kind,
            talker,
            walker,
            flyer,
        }
    }

    pub fn talk(&self) -> &'static str {
        self.talker.talk()
    }

    pub fn walk(&self) -> &'static str {
        self.walker.walk()
    }

    pub fn fly(&self) -> &'static str {
        self.flyer.fly()
    }

    /// Behaviours can be swapped at runtime.
    pub fn set_flyer(&mut self, flyer: Box<dyn Fly>) {
        self.flyer = flyer;
    }

    pub fn projection(&self) -> &'static str {
        match self.kind {
            RobotKind::Companion => "Companion Robot is projecting.",
            RobotKind::Worker => "Worker Robot is projecting.",
        }
    }

    pub fn routine(&self) -> Vec<String> {
        [self.talk(), self.walk(), self.fly(), self.projection()]
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();

    t.heading("Strategy: companion robot");
    let companion = Robot::new(
        RobotKind::Companion,
        Box::new(NormalTalk),
        Box::new(NormalWalk),
        Box::new(NormalFly),
    );
    t.extend(companion.routine());

    t.heading("Strategy: worker robot");
    let mut worker = Robot::new(
        RobotKind::Worker,
        Box::new(NoTalk),
        Box::new(NormalWalk),
        Box::new(NoFly),
    );
    t.extend(worker.routine());
    worker.set_flyer(Box::new(NormalFly));
    t.line(format!("after upgrade: {}", worker.fly()));
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_behaviours_are_composed() {
        let worker = Robot::new(
            RobotKind::Worker,
            Box::new(NoTalk),
            Box::new(NormalWalk),
            Box::new(NoFly),
        );
        assert_eq!(
            worker.routine(),
            vec![
                "Can't talk!",
                "Walking normally.",
                "Can't fly!",
                "Worker Robot is projecting."
            ]
        );
    }

    #[test]
    fn test_swapping_a_behaviour() {
        let mut robot = Robot::new(
            RobotKind::Companion,
            Box::new(NormalTalk),
            Box::new(NoWalk),
            Box::new(NoFly),
        );
        robot.set_flyer(Box::new(NormalFly));
        assert_eq!(robot.fly(), "Flying normally.");
        assert_eq!(robot.walk(), "Can't walk!");
    }
}
