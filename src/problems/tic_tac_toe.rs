//! Tic-Tac-Toe on an N x N board. Moves come from any iterator so a game can
//! be scripted; an invalid move is announced and the same player goes again.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    pub symbol: char,
    pub wins: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, symbol: char) -> Self {
        Self {
            name: name.into(),
            symbol,
            wins: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    grid: Vec<Vec<Option<char>>>,
}

impl Board {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            grid: vec![vec![None; size]; size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> Option<char> {
        self.grid.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn is_empty_cell(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.grid[row][col].is_none()
    }

    pub fn place(&mut self, row: usize, col: usize, symbol: char) -> bool {
        match self.grid.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = Some(symbol);
                true
            }
            None => false,
        }
    }

    pub fn is_full(&self) -> bool {
        self.grid.iter().flatten().all(Option::is_some)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.grid {
            writeln!(f, "{}", row.iter().map(|c| c.unwrap_or('-')).join(" "))?;
        }
        Ok(())
    }
}

pub trait Rule {
    fn is_valid_move(&self, board: &Board, row: usize, col: usize) -> bool;
    fn is_win(&self, board: &Board, row: usize, col: usize, symbol: char) -> bool;
    fn is_draw(&self, board: &Board) -> bool;
}

/// Full row, column or either diagonal wins.
pub struct StandardRule;

impl Rule for StandardRule {
    fn is_valid_move(&self, board: &Board, row: usize, col: usize) -> bool {
        board.is_empty_cell(row, col)
    }

    fn is_win(&self, board: &Board, row: usize, col: usize, symbol: char) -> bool {
        let n = board.size();
        let mine = |r: usize, c: usize| board.get(r, c) == Some(symbol);
        (0..n).all(|c| mine(row, c))
            || (0..n).all(|r| mine(r, col))
            || (0..n).all(|i| mine(i, i))
            || (0..n).all(|i| mine(i, n - 1 - i))
    }

    fn is_draw(&self, board: &Board) -> bool {
        board.is_full()
    }
}

pub trait GameObserver {
    fn update(&self, message: &str);
}

#[derive(Default)]
pub struct InAppNotification {
    messages: RefCell<Vec<String>>,
}

impl InAppNotification {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl GameObserver for InAppNotification {
    fn update(&self, message: &str) {
        debug!(text = message, "in-app notification");
        self.messages.borrow_mut().push(message.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameResult {
    Win(String),
    Draw,
    /// Moves ran out first.
    Unfinished,
}

pub struct Game {
    board: Board,
    rule: Box<dyn Rule>,
    players: VecDeque<Player>,
    observers: Vec<Rc<dyn GameObserver>>,
}

impl Game {
    pub fn new(size: usize, rule: Box<dyn Rule>) -> Self {
        Self {
            board: Board::new(size),
            rule,
            players: VecDeque::new(),
            observers: Vec::new(),
        }
    }

    pub fn add_player(&mut self, player: Player) {
        self.players.push_back(player);
    }

    pub fn add_observer(&mut self, observer: Rc<dyn GameObserver>) {
        self.observers.push(observer);
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name == name)
    }

    fn notify(&self, message: String) {
        for o in &self.observers {
            o.update(&message);
        }
    }

    pub fn play<I>(&mut self, moves: I) -> GameResult
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut moves = moves.into_iter();
        loop {
            let Some(current) = self.players.front() else {
                return GameResult::Unfinished;
            };
            let (name, symbol) = (current.name.clone(), current.symbol);
            let Some((row, col)) = moves.next() else {
                return GameResult::Unfinished;
            };
            self.notify(format!("{name} plays {row} {col}"));

            if !self.rule.is_valid_move(&self.board, row, col) {
                self.notify(format!("{name}: not a valid move, please retry"));
                continue;
            }
            self.board.place(row, col, symbol);

            if self.rule.is_win(&self.board, row, col, symbol) {
                if let Some(p) = self.players.front_mut() {
                    p.wins += 1;
                }
                self.notify(format!("Player {name} won the game"));
                info!(winner = %name, "tic-tac-toe finished");
                return GameResult::Win(name);
            }
            if self.rule.is_draw(&self.board) {
                self.notify("Game draw".to_string());
                return GameResult::Draw;
            }
            self.players.rotate_left(1);
        }
    }
}

pub fn demo(config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    let n = config.tic_tac_toe.board_size;

    // X takes the first row; O answers on the second after retrying a taken cell
    let script = (0..n).flat_map(|c| [(0, c), (1, c)]).take(2 * n - 1);
    let script: Vec<_> = std::iter::once((0, 0)).chain(script).collect();

    t.heading(format!("Tic-Tac-Toe {n}x{n}"));
    let observer = Rc::new(InAppNotification::default());
    let mut game = Game::new(n, Box::new(StandardRule));
    game.add_observer(observer.clone());
    game.add_player(Player::new("Aditya", 'X'));
    game.add_player(Player::new("Harshita", 'O'));

    let result = game.play(script);
    t.extend(observer.messages());
    t.extend(game.board().to_string().lines().map(str::to_string));
    t.line(format!("result: {result:?}"));

    t.heading("Tic-Tac-Toe 3x3 draw");
    let mut game = Game::new(3, Box::new(StandardRule));
    game.add_player(Player::new("Aditya", 'X'));
    game.add_player(Player::new("Harshita", 'O'));
    let draw = [(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1), (2, 0), (2, 2)];
    let result = game.play(draw);
    t.extend(game.board().to_string().lines().map(str::to_string));
    t.line(format!("result: {result:?}"));
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_player_game(n: usize) -> Game {
        let mut game = Game::new(n, Box::new(StandardRule));
        game.add_player(Player::new("X", 'X'));
        game.add_player(Player::new("O", 'O'));
        game
    }

    #[test]
    fn test_row_win() {
        let mut game = two_player_game(3);
        let result = game.play([(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]);
        assert_eq!(result, GameResult::Win("X".into()));
        assert_eq!(game.player("X").map(|p| p.wins), Some(1));
    }

    #[test]
    fn test_anti_diagonal_win_on_4x4() {
        let mut game = two_player_game(4);
        let result = game.play([(0, 0), (0, 3), (0, 1), (1, 2), (1, 1), (2, 1), (3, 3), (3, 0)]);
        assert_eq!(result, GameResult::Win("O".into()));
    }

    #[test]
    fn test_draw() {
        let mut game = two_player_game(3);
        let result = game.play([(0, 0), (0, 1), (0, 2), (1, 1), (1, 0), (1, 2), (2, 1), (2, 0), (2, 2)]);
        assert_eq!(result, GameResult::Draw);
        assert!(game.board().is_full());
    }

    #[test]
    fn test_invalid_move_retries_same_player() {
        let mut game = two_player_game(3);
        let observer = Rc::new(InAppNotification::default());
        game.add_observer(observer.clone());
        // O repeats X's cell, then an off-board cell, then plays (1, 1)
        let result = game.play([(0, 0), (0, 0), (5, 5), (1, 1)]);
        assert_eq!(result, GameResult::Unfinished);
        assert_eq!(game.board().get(1, 1), Some('O'));
        let rejected = observer.messages().iter().filter(|m| m.contains("not a valid")).count();
        assert_eq!(rejected, 2);
    }

    #[test]
    fn test_board_display() {
        let mut board = Board::new(2);
        board.place(0, 1, 'X');
        assert_eq!(board.to_string(), "- X\n- -\n");
        assert!(!board.place(2, 0, 'O'));
    }
}
