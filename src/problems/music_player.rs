//! Music player: a song library, named playlists, swappable play orders and
//! output devices reached through adapters over each vendor's API.

use std::collections::{BTreeMap, VecDeque};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::transcript::Transcript;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MusicError {
    #[error("playlist \"{0}\" already exists")]
    PlaylistExists(String),
    #[error("playlist \"{0}\" not found")]
    PlaylistNotFound(String),
    #[error("song \"{0}\" not found in library")]
    SongNotFound(String),
    #[error("no playlist loaded")]
    NoPlaylistLoaded,
    #[error("play strategy not set before loading")]
    NoStrategy,
    #[error("no audio device connected")]
    NoDevice,
    #[error("playlist is empty or finished")]
    NoNextSong,
    #[error("no previous song available")]
    NoPreviousSong,
    #[error("no song is currently playing")]
    NothingPlaying,
    #[error("song is already paused")]
    AlreadyPaused,
    #[error("cannot pause \"{0}\"; not currently playing")]
    NotCurrent(String),
    #[error("{0} playback has no queue")]
    QueueUnsupported(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Song {
    pub title: String,
    pub artist: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub name: String,
    pub songs: Vec<Song>,
}

impl Playlist {
    fn position(&self, song: &Song) -> Option<usize> {
        self.songs.iter().position(|s| s == song)
    }
}

#[derive(Debug, Default)]
pub struct PlaylistManager {
    playlists: BTreeMap<String, Playlist>,
}

impl PlaylistManager {
    pub fn create(&mut self, name: &str) -> Result<(), MusicError> {
        if self.playlists.contains_key(name) {
            return Err(MusicError::PlaylistExists(name.to_string()));
        }
        self.playlists.insert(
            name.to_string(),
            Playlist {
                name: name.to_string(),
                songs: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn add_song(&mut self, name: &str, song: Song) -> Result<(), MusicError> {
        self.playlists
            .get_mut(name)
            .ok_or_else(|| MusicError::PlaylistNotFound(name.to_string()))?
            .songs
            .push(song);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Playlist, MusicError> {
        self.playlists
            .get(name)
            .ok_or_else(|| MusicError::PlaylistNotFound(name.to_string()))
    }
}

// ============================================================================
// Play strategies
// ============================================================================

pub trait PlayStrategy {
    fn name(&self) -> &'static str;
    fn set_playlist(&mut self, playlist: Playlist);
    fn has_next(&self) -> bool;
    fn next(&mut self) -> Result<Song, MusicError>;
    fn has_previous(&self) -> bool;
    fn previous(&mut self) -> Result<Song, MusicError>;

    fn enqueue(&mut self, _song: Song) -> Result<(), MusicError> {
        Err(MusicError::QueueUnsupported(self.name()))
    }
}

#[derive(Default)]
pub struct SequentialPlay {
    playlist: Option<Playlist>,
    index: Option<usize>,
}

impl PlayStrategy for SequentialPlay {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn set_playlist(&mut self, playlist: Playlist) {
        self.playlist = Some(playlist);
        self.index = None;
    }

    fn has_next(&self) -> bool {
        let next = self.index.map_or(0, |i| i + 1);
        self.playlist.as_ref().is_some_and(|p| next < p.songs.len())
    }

    fn next(&mut self) -> Result<Song, MusicError> {
        if !self.has_next() {
            return Err(MusicError::NoNextSong);
        }
        let next = self.index.map_or(0, |i| i + 1);
        self.index = Some(next);
        self.playlist
            .as_ref()
            .and_then(|p| p.songs.get(next).cloned())
            .ok_or(MusicError::NoNextSong)
    }

    fn has_previous(&self) -> bool {
        self.index.is_some_and(|i| i > 0)
    }

    fn previous(&mut self) -> Result<Song, MusicError> {
        let prev = match self.index {
            Some(i) if i > 0 => i - 1,
            _ => return Err(MusicError::NoPreviousSong),
        };
        self.index = Some(prev);
        self.playlist
            .as_ref()
            .and_then(|p| p.songs.get(prev).cloned())
            .ok_or(MusicError::NoPreviousSong)
    }
}

/// Shuffles without repeats; going back replays what came before.
pub struct RandomPlay {
    rng: StdRng,
    remaining: Vec<Song>,
    history: Vec<Song>,
}

impl RandomPlay {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            remaining: Vec::new(),
            history: Vec::new(),
        }
    }
}

impl PlayStrategy for RandomPlay {
    fn name(&self) -> &'static str {
        "random"
    }

    fn set_playlist(&mut self, playlist: Playlist) {
        self.remaining = playlist.songs;
        self.history.clear();
    }

    fn has_next(&self) -> bool {
        !self.remaining.is_empty()
    }

    fn next(&mut self) -> Result<Song, MusicError> {
        if self.remaining.is_empty() {
            return Err(MusicError::NoNextSong);
        }
        let idx = self.rng.gen_range(0..self.remaining.len());
        let song = self.remaining.swap_remove(idx);
        self.history.push(song.clone());
        Ok(song)
    }

    fn has_previous(&self) -> bool {
        self.history.len() > 1
    }

    /// The current song goes back into the pool.
    fn previous(&mut self) -> Result<Song, MusicError> {
        if self.history.len() < 2 {
            return Err(MusicError::NoPreviousSong);
        }
        if let Some(current) = self.history.pop() {
            self.remaining.push(current);
        }
        self.history.last().cloned().ok_or(MusicError::NoPreviousSong)
    }
}

/// Queued songs jump ahead; playback then carries on after the last one.
#[derive(Default)]
pub struct CustomQueuePlay {
    playlist: Option<Playlist>,
    index: Option<usize>,
    queue: VecDeque<Song>,
    played: Vec<Song>,
}

impl PlayStrategy for CustomQueuePlay {
    fn name(&self) -> &'static str {
        "custom queue"
    }

    fn set_playlist(&mut self, playlist: Playlist) {
        self.playlist = Some(playlist);
        self.index = None;
        self.queue.clear();
        self.played.clear();
    }

    fn has_next(&self) -> bool {
        let next = self.index.map_or(0, |i| i + 1);
        !self.queue.is_empty() || self.playlist.as_ref().is_some_and(|p| next < p.songs.len())
    }

    fn next(&mut self) -> Result<Song, MusicError> {
        let playlist = self.playlist.as_ref().ok_or(MusicError::NoPlaylistLoaded)?;
        let song = match self.queue.pop_front() {
            Some(song) => {
                if let Some(pos) = playlist.position(&song) {
                    self.index = Some(pos);
                }
                song
            }
            None => {
                let next = self.index.map_or(0, |i| i + 1);
                let song = playlist.songs.get(next).cloned().ok_or(MusicError::NoNextSong)?;
                self.index = Some(next);
                song
            }
        };
        self.played.push(song.clone());
        Ok(song)
    }

    fn has_previous(&self) -> bool {
        self.played.len() > 1
    }

    fn previous(&mut self) -> Result<Song, MusicError> {
        if self.played.len() < 2 {
            return Err(MusicError::NoPreviousSong);
        }
        self.played.pop();
        let song = self.played.last().cloned().ok_or(MusicError::NoPreviousSong)?;
        if let Some(pos) = self.playlist.as_ref().and_then(|p| p.position(&song)) {
            self.index = Some(pos);
        }
        Ok(song)
    }

    fn enqueue(&mut self, song: Song) -> Result<(), MusicError> {
        self.queue.push_back(song);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStrategyType {
    Sequential,
    Random,
    CustomQueue,
}

// ============================================================================
// Output devices
// ============================================================================

pub struct BluetoothSpeakerApi;
pub struct WiredSpeakerApi;
pub struct HeadphonesApi;

impl BluetoothSpeakerApi {
    pub fn play_sound_via_bluetooth(&self, data: &str) -> String {
        format!("[BluetoothSpeaker] Playing: {data}")
    }
}

impl WiredSpeakerApi {
    pub fn play_sound_via_cable(&self, data: &str) -> String {
        format!("[WiredSpeaker] Playing: {data}")
    }
}

impl HeadphonesApi {
    pub fn play_sound_via_jack(&self, data: &str) -> String {
        format!("[Headphones] Playing: {data}")
    }
}

pub trait AudioOutputDevice {
    fn play_audio(&self, song: &Song) -> String;
}

fn payload(song: &Song) -> String {
    format!("{} by {}", song.title, song.artist)
}

pub struct BluetoothSpeakerAdapter(BluetoothSpeakerApi);
pub struct WiredSpeakerAdapter(WiredSpeakerApi);
pub struct HeadphonesAdapter(HeadphonesApi);

impl AudioOutputDevice for BluetoothSpeakerAdapter {
    fn play_audio(&self, song: &Song) -> String {
        self.0.play_sound_via_bluetooth(&payload(song))
    }
}

impl AudioOutputDevice for WiredSpeakerAdapter {
    fn play_audio(&self, song: &Song) -> String {
        self.0.play_sound_via_cable(&payload(song))
    }
}

impl AudioOutputDevice for HeadphonesAdapter {
    fn play_audio(&self, song: &Song) -> String {
        self.0.play_sound_via_jack(&payload(song))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Bluetooth,
    Wired,
    Headphones,
}

pub struct DeviceFactory;

impl DeviceFactory {
    pub fn create(kind: DeviceType) -> Box<dyn AudioOutputDevice> {
        match kind {
            DeviceType::Bluetooth => Box::new(BluetoothSpeakerAdapter(BluetoothSpeakerApi)),
            DeviceType::Wired => Box::new(WiredSpeakerAdapter(WiredSpeakerApi)),
            DeviceType::Headphones => Box::new(HeadphonesAdapter(HeadphonesApi)),
        }
    }
}

// ============================================================================
// Audio engine
// ============================================================================

#[derive(Debug, Default)]
pub struct AudioEngine {
    current: Option<Song>,
    paused: bool,
}

impl AudioEngine {
    pub fn current_title(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.title.as_str())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Playing the paused song again resumes it.
    pub fn play(&mut self, device: &dyn AudioOutputDevice, song: &Song) -> Vec<String> {
        let verb = if self.paused && self.current.as_ref() == Some(song) {
            "Resuming"
        } else {
            self.current = Some(song.clone());
            "Playing"
        };
        self.paused = false;
        debug!(title = %song.title, verb, "audio engine");
        vec![format!("{verb} song: {}", song.title), device.play_audio(song)]
    }

    pub fn pause(&mut self) -> Result<String, MusicError> {
        let current = self.current.as_ref().ok_or(MusicError::NothingPlaying)?;
        if self.paused {
            return Err(MusicError::AlreadyPaused);
        }
        self.paused = true;
        Ok(format!("Pausing song: {}", current.title))
    }
}

// ============================================================================
// Facade
// ============================================================================

pub struct MusicPlayer {
    seed: u64,
    library: Vec<Song>,
    playlists: PlaylistManager,
    device: Option<Box<dyn AudioOutputDevice>>,
    strategy: Option<Box<dyn PlayStrategy>>,
    loaded: Option<String>,
    engine: AudioEngine,
}

impl MusicPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            library: Vec::new(),
            playlists: PlaylistManager::default(),
            device: None,
            strategy: None,
            loaded: None,
            engine: AudioEngine::default(),
        }
    }

    pub fn add_song(&mut self, title: &str, artist: &str, path: &str) {
        self.library.push(Song {
            title: title.to_string(),
            artist: artist.to_string(),
            path: path.to_string(),
        });
    }

    pub fn find_song(&self, title: &str) -> Result<Song, MusicError> {
        self.library
            .iter()
            .find(|s| s.title == title)
            .cloned()
            .ok_or_else(|| MusicError::SongNotFound(title.to_string()))
    }

    pub fn create_playlist(&mut self, name: &str) -> Result<(), MusicError> {
        self.playlists.create(name)
    }

    pub fn add_to_playlist(&mut self, playlist: &str, title: &str) -> Result<(), MusicError> {
        let song = self.find_song(title)?;
        self.playlists.add_song(playlist, song)
    }

    pub fn connect_device(&mut self, kind: DeviceType) -> String {
        self.device = Some(DeviceFactory::create(kind));
        info!(device = ?kind, "output device connected");
        format!("{kind:?} device connected")
    }

    /// Each selection starts a fresh strategy. A loaded playlist is handed
    /// to it from the top.
    pub fn select_strategy(&mut self, kind: PlayStrategyType) {
        let mut strategy: Box<dyn PlayStrategy> = match kind {
            PlayStrategyType::Sequential => Box::<SequentialPlay>::default(),
            PlayStrategyType::Random => Box::new(RandomPlay::new(self.seed)),
            PlayStrategyType::CustomQueue => Box::<CustomQueuePlay>::default(),
        };
        let carried = self
            .loaded
            .as_deref()
            .and_then(|name| self.playlists.get(name).ok())
            .cloned();
        match carried {
            Some(playlist) => strategy.set_playlist(playlist),
            None => self.loaded = None,
        }
        self.strategy = Some(strategy);
    }

    pub fn load_playlist(&mut self, name: &str) -> Result<(), MusicError> {
        let playlist = self.playlists.get(name)?.clone();
        let strategy = self.strategy.as_mut().ok_or(MusicError::NoStrategy)?;
        strategy.set_playlist(playlist);
        self.loaded = Some(name.to_string());
        Ok(())
    }

    pub fn play_song(&mut self, title: &str) -> Result<Vec<String>, MusicError> {
        let song = self.find_song(title)?;
        let device = self.device.as_deref().ok_or(MusicError::NoDevice)?;
        Ok(self.engine.play(device, &song))
    }

    pub fn pause_song(&mut self, title: &str) -> Result<String, MusicError> {
        if self.engine.current_title() != Some(title) {
            return Err(MusicError::NotCurrent(title.to_string()));
        }
        self.engine.pause()
    }

    fn loaded_strategy(&mut self) -> Result<&mut Box<dyn PlayStrategy>, MusicError> {
        if self.loaded.is_none() {
            return Err(MusicError::NoPlaylistLoaded);
        }
        self.strategy.as_mut().ok_or(MusicError::NoStrategy)
    }

    pub fn play_next(&mut self) -> Result<Vec<String>, MusicError> {
        let song = self.loaded_strategy()?.next()?;
        let device = self.device.as_deref().ok_or(MusicError::NoDevice)?;
        Ok(self.engine.play(device, &song))
    }

    pub fn play_previous(&mut self) -> Result<Vec<String>, MusicError> {
        let song = self.loaded_strategy()?.previous()?;
        let device = self.device.as_deref().ok_or(MusicError::NoDevice)?;
        Ok(self.engine.play(device, &song))
    }

    pub fn play_all(&mut self) -> Result<Vec<String>, MusicError> {
        let mut lines = Vec::new();
        while self.loaded_strategy()?.has_next() {
            lines.extend(self.play_next()?);
        }
        lines.push(format!(
            "Completed playlist: {}",
            self.loaded.as_deref().unwrap_or_default()
        ));
        Ok(lines)
    }

    pub fn enqueue(&mut self, title: &str) -> Result<(), MusicError> {
        let song = self.find_song(title)?;
        self.strategy.as_mut().ok_or(MusicError::NoStrategy)?.enqueue(song)
    }

    pub fn engine(&self) -> &AudioEngine {
        &self.engine
    }
}

fn sample_player(seed: u64) -> Result<MusicPlayer, MusicError> {
    let mut player = MusicPlayer::new(seed);
    player.add_song("Kesariya", "Arijit Singh", "/music/kesariya.mp3");
    player.add_song("Chaiyya Chaiyya", "Sukhwinder Singh", "/music/chaiyya_chaiyya.mp3");
    player.add_song("Tum Hi Ho", "Arijit Singh", "/music/tum_hi_ho.mp3");
    player.add_song("Jai Ho", "A. R. Rahman", "/music/jai_ho.mp3");
    player.add_song("Zinda", "Siddharth Mahadevan", "/music/zinda.mp3");
    player.create_playlist("Bollywood Vibes")?;
    for title in ["Kesariya", "Chaiyya Chaiyya", "Tum Hi Ho", "Jai Ho"] {
        player.add_to_playlist("Bollywood Vibes", title)?;
    }
    Ok(player)
}

pub fn demo(config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    let mut player = sample_player(config.music.seed)?;
    let playlist = "Bollywood Vibes";

    t.heading("Music player: single song");
    t.line(player.connect_device(DeviceType::Bluetooth));
    t.extend(player.play_song("Zinda")?);
    t.line(player.pause_song("Zinda")?);
    t.extend(player.play_song("Zinda")?);

    t.heading("Music player: sequential");
    player.select_strategy(PlayStrategyType::Sequential);
    player.load_playlist(playlist)?;
    t.extend(player.play_all()?);
    t.extend(player.play_previous()?);

    t.heading("Music player: random");
    player.select_strategy(PlayStrategyType::Random);
    player.load_playlist(playlist)?;
    t.extend(player.play_all()?);

    t.heading("Music player: custom queue");
    t.line(player.connect_device(DeviceType::Headphones));
    player.select_strategy(PlayStrategyType::CustomQueue);
    player.load_playlist(playlist)?;
    player.enqueue("Kesariya")?;
    player.enqueue("Tum Hi Ho")?;
    t.extend(player.play_all()?);

    if let Err(e) = player.create_playlist(playlist) {
        t.line(format!("rejected: {e}"));
    }
    Ok(t)
}
