//! Snake & Ladder on a board of any size. Setup, rules and dice are all
//! pluggable; observers hear about every move.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{AppConfig, Difficulty, SnakeLadderConfig};
use crate::transcript::Transcript;

/// Upper bound on turns before a game is abandoned.
pub const MAX_TURNS: usize = 10_000;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnakeLadderError {
    #[error("{kind} from {start} to {end} does not fit a board of {size} cells")]
    OutOfBoard {
        kind: EntityKind,
        start: u32,
        end: u32,
        size: u32,
    },

    #[error("{kind} must go {direction}: {start} -> {end}")]
    WrongDirection {
        kind: EntityKind,
        start: u32,
        end: u32,
        direction: &'static str,
    },

    #[error("cell {0} already holds an entity")]
    Occupied(u32),

    #[error("standard layout needs a 100 cell board, got {0}")]
    StandardNeeds100(u32),

    #[error("a game needs at least two players")]
    NotEnoughPlayers,
}

// ============================================================================
// Board
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Snake,
    Ladder,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntityKind::Snake => write!(f, "Snake"),
            EntityKind::Ladder => write!(f, "Ladder"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardEntity {
    pub kind: EntityKind,
    pub start: u32,
    pub end: u32,
}

impl BoardEntity {
    pub fn snake(start: u32, end: u32) -> Self {
        Self {
            kind: EntityKind::Snake,
            start,
            end,
        }
    }

    pub fn ladder(start: u32, end: u32) -> Self {
        Self {
            kind: EntityKind::Ladder,
            start,
            end,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Board {
    size: u32,
    entities: Vec<BoardEntity>,
    by_start: HashMap<u32, usize>,
}

impl Board {
    pub fn new(size: u32) -> Self {
        Self {
            size,
            entities: Vec::new(),
            by_start: HashMap::new(),
        }
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn entities(&self) -> &[BoardEntity] {
        &self.entities
    }

    /// Entities live strictly inside the board and never start on the last cell.
    pub fn add_entity(&mut self, entity: BoardEntity) -> Result<(), SnakeLadderError> {
        let BoardEntity { kind, start, end } = entity;
        if start < 2 || start >= self.size || end < 1 || end > self.size {
            return Err(SnakeLadderError::OutOfBoard {
                kind,
                start,
                end,
                size: self.size,
            });
        }
        let wrong = match kind {
            EntityKind::Snake if end >= start => Some("down"),
            EntityKind::Ladder if end <= start => Some("up"),
            _ => None,
        };
        if let Some(direction) = wrong {
            return Err(SnakeLadderError::WrongDirection {
                kind,
                start,
                end,
                direction,
            });
        }
        if self.by_start.contains_key(&start) {
            return Err(SnakeLadderError::Occupied(start));
        }
        self.by_start.insert(start, self.entities.len());
        self.entities.push(entity);
        Ok(())
    }

    pub fn entity_at(&self, cell: u32) -> Option<&BoardEntity> {
        self.by_start.get(&cell).map(|&i| &self.entities[i])
    }
}

// ============================================================================
// Rules
// ============================================================================

pub trait Rule {
    fn is_valid_move(&self, position: u32, roll: u32, board: &Board) -> bool;
    fn final_position(&self, position: u32, roll: u32, board: &Board) -> u32;

    fn is_win(&self, position: u32, roll: u32, board: &Board) -> bool {
        self.final_position(position, roll, board) == board.size()
    }
}

/// Exact landing on the last cell wins; overshooting forfeits the move.
pub struct StandardRule;

impl Rule for StandardRule {
    fn is_valid_move(&self, position: u32, roll: u32, board: &Board) -> bool {
        position + roll <= board.size()
    }

    fn final_position(&self, position: u32, roll: u32, board: &Board) -> u32 {
        let landed = position + roll;
        board.entity_at(landed).map_or(landed, |e| e.end)
    }
}

// ============================================================================
// Setup strategies
// ============================================================================

pub trait SetupStrategy {
    fn setup(&self, board: &mut Board) -> Result<(), SnakeLadderError>;
}

const STANDARD_SNAKES: [(u32, u32); 10] = [
    (99, 54),
    (95, 75),
    (92, 88),
    (89, 68),
    (74, 53),
    (64, 60),
    (62, 19),
    (49, 11),
    (46, 25),
    (16, 6),
];

const STANDARD_LADDERS: [(u32, u32); 11] = [
    (2, 38),
    (7, 14),
    (8, 31),
    (15, 26),
    (21, 42),
    (28, 84),
    (36, 44),
    (51, 67),
    (71, 91),
    (78, 98),
    (87, 94),
];

/// Traditional 10x10 layout.
pub struct StandardSetup;

impl SetupStrategy for StandardSetup {
    fn setup(&self, board: &mut Board) -> Result<(), SnakeLadderError> {
        if board.size() != 100 {
            return Err(SnakeLadderError::StandardNeeds100(board.size()));
        }
        for (start, end) in STANDARD_SNAKES {
            board.add_entity(BoardEntity::snake(start, end))?;
        }
        for (start, end) in STANDARD_LADDERS {
            board.add_entity(BoardEntity::ladder(start, end))?;
        }
        Ok(())
    }
}

/// Seeded random layout; harder boards get more snakes and fewer ladders.
pub struct RandomSetup {
    pub difficulty: Difficulty,
    pub seed: u64,
}

impl RandomSetup {
    /// (snakes, ladders) per 100 cells.
    fn density(&self) -> (u32, u32) {
        match self.difficulty {
            Difficulty::Easy => (4, 8),
            Difficulty::Medium => (6, 6),
            Difficulty::Hard => (10, 4),
        }
    }
}

impl SetupStrategy for RandomSetup {
    fn setup(&self, board: &mut Board) -> Result<(), SnakeLadderError> {
        let size = board.size();
        let (snakes, ladders) = self.density();
        let scale = |n: u32| (n * size / 100).max(1);
        let mut rng = StdRng::seed_from_u64(self.seed);
        // ends are kept off every start so a move never chains two entities
        let mut used: HashSet<u32> = HashSet::from([1, size]);

        let mut place = |kind: EntityKind, count: u32, rng: &mut StdRng| {
            let mut placed = 0;
            let mut attempts = 0;
            while placed < count && attempts < count * 100 {
                attempts += 1;
                let end;
                let start = match kind {
                    EntityKind::Snake => {
                        let start = rng.gen_range(2..size);
                        end = rng.gen_range(1..start);
                        start
                    }
                    EntityKind::Ladder => {
                        let start = rng.gen_range(2..size - 1);
                        end = rng.gen_range(start + 1..size);
                        start
                    }
                };
                if start == end || used.contains(&start) || used.contains(&end) {
                    continue;
                }
                let entity = BoardEntity { kind, start, end };
                if board.add_entity(entity).is_ok() {
                    used.insert(start);
                    used.insert(end);
                    placed += 1;
                }
            }
        };
        place(EntityKind::Snake, scale(snakes), &mut rng);
        place(EntityKind::Ladder, scale(ladders), &mut rng);
        debug!(entities = board.entities().len(), difficulty = ?self.difficulty, "random board ready");
        Ok(())
    }
}

#[derive(Default)]
pub struct CustomSetup {
    entities: Vec<BoardEntity>,
}

impl CustomSetup {
    pub fn with(mut self, entity: BoardEntity) -> Self {
        self.entities.push(entity);
        self
    }
}

impl SetupStrategy for CustomSetup {
    fn setup(&self, board: &mut Board) -> Result<(), SnakeLadderError> {
        self.entities.iter().try_for_each(|e| board.add_entity(*e))
    }
}

// ============================================================================
// Dice, players, notifications
// ============================================================================

pub trait DiceRoller {
    fn roll(&mut self) -> u32;
}

pub struct Dice {
    faces: u32,
    rng: StdRng,
}

impl Dice {
    pub fn new(faces: u32, seed: u64) -> Self {
        Self {
            faces: faces.max(1),
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DiceRoller for Dice {
    fn roll(&mut self) -> u32 {
        self.rng.gen_range(1..=self.faces)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub position: u32,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: 1,
        }
    }
}

pub trait GameObserver {
    fn notify(&self, message: &str);
}

#[derive(Default)]
pub struct InAppObserver {
    messages: RefCell<Vec<String>>,
}

impl InAppObserver {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl GameObserver for InAppObserver {
    fn notify(&self, message: &str) {
        debug!(text = message, "in-app notification");
        self.messages.borrow_mut().push(message.to_string());
    }
}

// ============================================================================
// Game
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSummary {
    /// Winners in the order they finished.
    pub ranking: Vec<String>,
    pub remaining: Vec<String>,
    pub turns: usize,
}

impl GameSummary {
    pub fn finished(&self) -> bool {
        self.remaining.len() <= 1
    }
}

pub struct Game {
    board: Board,
    rule: Box<dyn Rule>,
    dice: Box<dyn DiceRoller>,
    players: VecDeque<Player>,
    observers: Vec<Rc<dyn GameObserver>>,
}

impl Game {
    pub fn new(
        size: u32,
        setup: &dyn SetupStrategy,
        rule: Box<dyn Rule>,
        dice: Box<dyn DiceRoller>,
    ) -> Result<Self, SnakeLadderError> {
        let mut board = Board::new(size);
        setup.setup(&mut board)?;
        Ok(Self {
            board,
            rule,
            dice,
            players: VecDeque::new(),
            observers: Vec::new(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.push_back(player);
    }

    pub fn add_observer(&mut self, observer: Rc<dyn GameObserver>) {
        self.observers.push(observer);
    }

    fn notify(&self, message: String) {
        for o in &self.observers {
            o.notify(&message);
        }
    }

    /// Plays until one player is left. A player whose roll overshoots the
    /// board stays put and the turn passes.
    pub fn play(&mut self) -> Result<GameSummary, SnakeLadderError> {
        if self.players.len() < 2 {
            return Err(SnakeLadderError::NotEnoughPlayers);
        }
        let mut ranking = Vec::new();
        let mut turns = 0;

        while self.players.len() > 1 && turns < MAX_TURNS {
            turns += 1;
            let Some(mut player) = self.players.pop_front() else {
                break;
            };
            let roll = self.dice.roll();
            self.notify(format!("{} rolled {roll}", player.name));

            if !self.rule.is_valid_move(player.position, roll, &self.board) {
                self.notify(format!("{} cannot move {roll}, turn passes", player.name));
                self.players.push_back(player);
                continue;
            }

            let landed = player.position + roll;
            let next = self.rule.final_position(player.position, roll, &self.board);
            if let Some(entity) = self.board.entity_at(landed) {
                self.notify(format!(
                    "{} hit a {} at {} which takes them to {}",
                    player.name, entity.kind, entity.start, entity.end
                ));
            }

            let won = self.rule.is_win(player.position, roll, &self.board);
            player.position = next;
            if won {
                self.notify(format!("{} wins, congratulations!", player.name));
                info!(player = %player.name, turns, "player finished");
                ranking.push(player.name);
            } else {
                self.notify(format!("{} moves to {next}", player.name));
                self.players.push_back(player);
            }
        }

        Ok(GameSummary {
            ranking,
            remaining: self.players.iter().map(|p| p.name.clone()).collect(),
            turns,
        })
    }
}

fn original_layout() -> CustomSetup {
    CustomSetup::default()
        .with(BoardEntity::snake(97, 23))
        .with(BoardEntity::snake(54, 38))
        .with(BoardEntity::snake(62, 12))
        .with(BoardEntity::snake(78, 45))
        .with(BoardEntity::ladder(16, 55))
        .with(BoardEntity::ladder(22, 65))
        .with(BoardEntity::ladder(77, 96))
        .with(BoardEntity::ladder(29, 90))
        .with(BoardEntity::ladder(3, 27))
}

fn run_game(
    t: &mut Transcript,
    config: &SnakeLadderConfig,
    size: u32,
    setup: &dyn SetupStrategy,
    players: &[&str],
) -> anyhow::Result<()> {
    let dice = Dice::new(config.dice_faces, config.seed);
    let mut game = Game::new(size, setup, Box::new(StandardRule), Box::new(dice))?;
    let observer = Rc::new(InAppObserver::default());
    game.add_observer(observer.clone());
    for p in players {
        game.add_player(Player::new(*p));
    }

    t.line(format!("board of {size} cells, {} entities", game.board().entities().len()));
    let summary = game.play()?;
    for (rank, name) in summary.ranking.iter().enumerate() {
        t.line(format!("#{} {name}", rank + 1));
    }
    if !summary.finished() {
        t.line(format!("abandoned after {} turns", summary.turns));
    }
    t.line(format!(
        "{} turns, {} notifications",
        summary.turns,
        observer.messages().len()
    ));
    Ok(())
}

pub fn demo(config: &AppConfig) -> anyhow::Result<Transcript> {
    let cfg = &config.snake_ladder;
    let mut t = Transcript::new();

    t.heading("Snake & Ladder: custom layout");
    run_game(&mut t, cfg, 100, &original_layout(), &["Abhisek", "Gaurav"])?;

    t.heading(format!("Snake & Ladder: random {:?} layout", cfg.difficulty));
    let random = RandomSetup {
        difficulty: cfg.difficulty,
        seed: cfg.seed,
    };
    run_game(&mut t, cfg, cfg.board_size, &random, &["Asha", "Bilal", "Chen"])?;

    if cfg.board_size == 100 {
        t.heading("Snake & Ladder: standard layout");
        run_game(&mut t, cfg, 100, &StandardSetup, &["Abhisek", "Gaurav"])?;
    }
    Ok(t)
}
