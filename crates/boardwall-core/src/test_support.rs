// Scripted backend and counting widgets shared by the unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;

use crate::backend::Backend;
use crate::error::CoreError;
use crate::layout::LayoutPlan;
use crate::model::{Board, BoardId, Position, SystemInfo};
use crate::widget::{BoardWidget, WidgetFactory};

pub(crate) fn running(id: u32) -> Board {
    Board {
        id: BoardId(id),
        position: Position::start(),
        pgn: "[Event \"Casual\"]\n[Result \"*\"]\n\n*".into(),
        games: Vec::new(),
    }
}

pub(crate) fn finished(id: u32) -> Board {
    Board {
        id: BoardId(id),
        position: Position::new("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1"),
        pgn: "[Event \"Casual\"]\n[Result \"1-0\"]\n\n1. Qg7# 1-0".into(),
        games: Vec::new(),
    }
}

/// One scripted answer to `get_board`.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Board(Board),
    /// A snapshot with no position.
    Malformed,
    /// Backend unreachable.
    Fail,
}

/// Backend whose `get_board` answers follow a per-board script. The last
/// entry of a script repeats forever. `start_game` swaps in the restart
/// script, a fresh running board unless one was set.
#[derive(Default)]
pub(crate) struct FakeBackend {
    scripts: Mutex<HashMap<BoardId, VecDeque<Scripted>>>,
    restart_scripts: Mutex<HashMap<BoardId, Vec<Scripted>>>,
    get_board_calls: Mutex<HashMap<BoardId, usize>>,
    start_game_calls: Mutex<HashMap<BoardId, usize>>,
    start_games_calls: AtomicUsize,
    boards: Mutex<Vec<Board>>,
    system_info: Mutex<Option<SystemInfo>>,
    images: Mutex<Vec<String>>,
    asset_fetches: AtomicUsize,
    cpu_calls: AtomicUsize,
    list_delay: Mutex<Duration>,
    start_games_delay: Mutex<Duration>,
    /// Completed `start_games` and entered `get_boards` calls, in order.
    calls: Mutex<Vec<&'static str>>,
}

impl FakeBackend {
    pub(crate) fn with_boards(ids: impl IntoIterator<Item = u32>) -> Self {
        let backend = Self::default();
        *backend.boards.lock().unwrap() = ids.into_iter().map(running).collect();
        backend
    }

    pub(crate) fn script(&self, id: BoardId, answers: impl IntoIterator<Item = Scripted>) {
        self.scripts
            .lock()
            .unwrap()
            .insert(id, answers.into_iter().collect());
    }

    pub(crate) fn script_restart(&self, id: BoardId, answers: impl IntoIterator<Item = Scripted>) {
        self.restart_scripts
            .lock()
            .unwrap()
            .insert(id, answers.into_iter().collect());
    }

    pub(crate) fn set_system_info(&self, info: SystemInfo) {
        *self.system_info.lock().unwrap() = Some(info);
    }

    pub(crate) fn set_images(&self, images: &[&str]) {
        *self.images.lock().unwrap() = images.iter().map(ToString::to_string).collect();
    }

    pub(crate) fn delay_listing(&self, delay: Duration) {
        *self.list_delay.lock().unwrap() = delay;
    }

    pub(crate) fn delay_start_games(&self, delay: Duration) {
        *self.start_games_delay.lock().unwrap() = delay;
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn get_board_calls(&self, id: BoardId) -> usize {
        self.get_board_calls.lock().unwrap().get(&id).copied().unwrap_or(0)
    }

    pub(crate) fn total_get_board_calls(&self) -> usize {
        self.get_board_calls.lock().unwrap().values().sum()
    }

    pub(crate) fn start_game_calls(&self, id: BoardId) -> usize {
        self.start_game_calls.lock().unwrap().get(&id).copied().unwrap_or(0)
    }

    pub(crate) fn start_games_calls(&self) -> usize {
        self.start_games_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn asset_fetches(&self) -> usize {
        self.asset_fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn cpu_calls(&self) -> usize {
        self.cpu_calls.load(Ordering::SeqCst)
    }

    fn unreachable() -> CoreError {
        CoreError::BackendUnreachable {
            url: "http://fake".into(),
            reason: "scripted failure".into(),
        }
    }
}

impl Backend for FakeBackend {
    async fn start_games(&self) -> Result<(), CoreError> {
        self.start_games_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.start_games_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        self.calls.lock().unwrap().push("start_games");
        Ok(())
    }

    async fn start_game(&self, board_id: BoardId) -> Result<(), CoreError> {
        *self
            .start_game_calls
            .lock()
            .unwrap()
            .entry(board_id)
            .or_default() += 1;
        let fresh = self
            .restart_scripts
            .lock()
            .unwrap()
            .get(&board_id)
            .cloned()
            .unwrap_or_else(|| vec![Scripted::Board(running(board_id.0))]);
        self.script(board_id, fresh);
        Ok(())
    }

    async fn get_boards(&self) -> Result<Vec<Board>, CoreError> {
        self.calls.lock().unwrap().push("get_boards");
        let delay = *self.list_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        Ok(self.boards.lock().unwrap().clone())
    }

    async fn get_board(&self, board_id: BoardId) -> Result<Board, CoreError> {
        *self
            .get_board_calls
            .lock()
            .unwrap()
            .entry(board_id)
            .or_default() += 1;

        let answer = {
            let mut scripts = self.scripts.lock().unwrap();
            match scripts.get_mut(&board_id) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };

        match answer {
            Some(Scripted::Board(board)) => Ok(board),
            Some(Scripted::Malformed) => Err(CoreError::MalformedSnapshot {
                board_id,
                missing: "fen",
            }),
            Some(Scripted::Fail) => Err(Self::unreachable()),
            None => Ok(running(board_id.0)),
        }
    }

    async fn system_info(&self) -> Result<SystemInfo, CoreError> {
        self.system_info
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(Self::unreachable)
    }

    async fn cpu_usage(&self) -> Result<Vec<f64>, CoreError> {
        self.cpu_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![12.5, 50.0])
    }

    async fn list_images(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.images.lock().unwrap().clone())
    }

    async fn fetch_asset(&self, path: &str) -> Result<Bytes, CoreError> {
        self.asset_fetches.fetch_add(1, Ordering::SeqCst);
        if path.contains("missing") {
            return Err(CoreError::Backend {
                message: "not found".into(),
                status: Some(404),
            });
        }
        Ok(Bytes::from_static(b"\x89PNG"))
    }
}

#[derive(Default)]
struct Counters {
    created: AtomicUsize,
    destroyed: AtomicUsize,
    renders: AtomicUsize,
    resized: AtomicUsize,
}

/// Factory whose widgets only count what is done to them.
#[derive(Default)]
pub(crate) struct FakeFactory {
    counters: Arc<Counters>,
    failing: Mutex<HashSet<BoardId>>,
}

impl FakeFactory {
    pub(crate) fn fail_for(&self, id: BoardId) {
        self.failing.lock().unwrap().insert(id);
    }

    pub(crate) fn created(&self) -> usize {
        self.counters.created.load(Ordering::SeqCst)
    }

    pub(crate) fn destroyed(&self) -> usize {
        self.counters.destroyed.load(Ordering::SeqCst)
    }

    pub(crate) fn renders(&self) -> usize {
        self.counters.renders.load(Ordering::SeqCst)
    }

    pub(crate) fn resized(&self) -> usize {
        self.counters.resized.load(Ordering::SeqCst)
    }
}

impl WidgetFactory for FakeFactory {
    fn create(&self, board: &Board, _plan: &LayoutPlan) -> Result<Box<dyn BoardWidget>, CoreError> {
        if self.failing.lock().unwrap().contains(&board.id) {
            return Err(CoreError::Widget {
                board_id: board.id,
                message: "scripted failure".into(),
            });
        }
        self.counters.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingWidget {
            counters: Arc::clone(&self.counters),
            destroyed: false,
        }))
    }
}

struct CountingWidget {
    counters: Arc<Counters>,
    destroyed: bool,
}

impl BoardWidget for CountingWidget {
    fn render(&mut self, _position: &Position) {
        assert!(!self.destroyed, "render after destroy");
        self.counters.renders.fetch_add(1, Ordering::SeqCst);
    }

    fn resize(&mut self, _plan: &LayoutPlan) {
        self.counters.resized.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&mut self) {
        assert!(!self.destroyed, "destroyed twice");
        self.destroyed = true;
        self.counters.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}
