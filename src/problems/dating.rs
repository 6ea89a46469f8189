//! Dating app: profiles with preferences, nearby search behind a location
//! strategy, layered match scoring, swipes, and chat once both swipe right.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, Local};
use itertools::Itertools;
use thiserror::Error;
use tracing::info;

use crate::config::AppConfig;
use crate::transcript::Transcript;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatingError {
    #[error("user '{0}' not found")]
    UnknownUser(String),

    #[error("user '{0}' already exists")]
    DuplicateUser(String),

    #[error("no chat room between {0} and {1}")]
    NoChatRoom(String, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance (haversine).
    pub fn distance_km(&self, other: &Location) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos() * other.latitude.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interest {
    pub name: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preference {
    pub genders: Vec<Gender>,
    pub min_age: u32,
    pub max_age: u32,
    pub max_distance_km: f64,
    pub interests: Vec<String>,
}

impl Default for Preference {
    fn default() -> Self {
        Self {
            genders: Vec::new(),
            min_age: 18,
            max_age: 100,
            max_distance_km: 100.0,
            interests: Vec::new(),
        }
    }
}

impl Preference {
    pub fn likes_gender(&self, gender: Gender) -> bool {
        self.genders.contains(&gender)
    }

    pub fn likes_age(&self, age: u32) -> bool {
        (self.min_age..=self.max_age).contains(&age)
    }

    pub fn likes_distance(&self, km: f64) -> bool {
        km <= self.max_distance_km
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub bio: String,
    pub photos: Vec<String>,
    pub interests: Vec<Interest>,
    pub location: Location,
}

impl UserProfile {
    pub fn add_interest(&mut self, name: &str, category: &str) {
        self.interests.push(Interest {
            name: name.to_string(),
            category: category.to_string(),
        });
    }

    pub fn remove_interest(&mut self, name: &str) {
        self.interests.retain(|i| i.name != name);
    }
}

impl fmt::Display for UserProfile {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}, {} ({:?}): {} [{}]",
            self.name,
            self.age,
            self.gender,
            self.bio,
            self.interests.iter().map(|i| &i.name).join(", ")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeAction {
    Left,
    Right,
}

#[derive(Debug, Clone, Default)]
pub struct User {
    pub id: String,
    pub profile: UserProfile,
    pub preference: Preference,
    swipes: HashMap<String, SwipeAction>,
}

impl User {
    pub fn has_liked(&self, other: &str) -> bool {
        self.swipes.get(other) == Some(&SwipeAction::Right)
    }

    pub fn has_interacted_with(&self, other: &str) -> bool {
        self.swipes.contains_key(other)
    }
}

// ============================================================================
// Location strategies
// ============================================================================

pub trait LocationStrategy {
    fn nearby<'a>(&self, origin: &Location, max_km: f64, users: &'a [User]) -> Vec<&'a User>;
}

pub struct BasicLocationStrategy;

impl LocationStrategy for BasicLocationStrategy {
    fn nearby<'a>(&self, origin: &Location, max_km: f64, users: &'a [User]) -> Vec<&'a User> {
        users
            .iter()
            .filter(|u| origin.distance_km(&u.profile.location) <= max_km)
            .collect()
    }
}

pub struct LocationService {
    strategy: Box<dyn LocationStrategy>,
}

impl Default for LocationService {
    fn default() -> Self {
        Self {
            strategy: Box::new(BasicLocationStrategy),
        }
    }
}

impl LocationService {
    pub fn set_strategy(&mut self, strategy: Box<dyn LocationStrategy>) {
        self.strategy = strategy;
    }

    pub fn nearby<'a>(&self, origin: &Location, max_km: f64, users: &'a [User]) -> Vec<&'a User> {
        self.strategy.nearby(origin, max_km, users)
    }
}

// ============================================================================
// Matchers
// ============================================================================

pub trait Matcher {
    /// 0.0 means no match at all.
    fn score(&self, a: &User, b: &User) -> f64;
}

/// Both sides accept each other's gender, age and distance: 0.5.
pub struct BasicMatcher;

impl Matcher for BasicMatcher {
    fn score(&self, a: &User, b: &User) -> f64 {
        let (pa, pb) = (&a.preference, &b.preference);
        let km = a.profile.location.distance_km(&b.profile.location);
        let mutual = pa.likes_gender(b.profile.gender)
            && pb.likes_gender(a.profile.gender)
            && pa.likes_age(b.profile.age)
            && pb.likes_age(a.profile.age)
            && pa.likes_distance(km)
            && pb.likes_distance(km);
        if mutual {
            0.5
        } else {
            0.0
        }
    }
}

/// Adds up to 0.5 for shared profile interests.
pub struct InterestsMatcher;

impl Matcher for InterestsMatcher {
    fn score(&self, a: &User, b: &User) -> f64 {
        let base = BasicMatcher.score(a, b);
        if base == 0.0 {
            return 0.0;
        }
        let shared = b
            .profile
            .interests
            .iter()
            .filter(|i| a.profile.interests.iter().any(|j| j.name == i.name))
            .count();
        let most = a.profile.interests.len().max(b.profile.interests.len());
        let bonus = if most > 0 {
            0.5 * shared as f64 / most as f64
        } else {
            0.0
        };
        base + bonus
    }
}

/// Adds up to 0.2 for being close relative to the stricter distance limit.
pub struct LocationMatcher;

impl Matcher for LocationMatcher {
    fn score(&self, a: &User, b: &User) -> f64 {
        let base = InterestsMatcher.score(a, b);
        if base == 0.0 {
            return 0.0;
        }
        let km = a.profile.location.distance_km(&b.profile.location);
        let limit = a.preference.max_distance_km.min(b.preference.max_distance_km);
        let bonus = if limit > 0.0 { 0.2 * (1.0 - km / limit) } else { 0.0 };
        base + bonus
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatcherType {
    Basic,
    InterestsBased,
    LocationBased,
}

impl MatcherType {
    pub fn create(self) -> Box<dyn Matcher> {
        match self {
            MatcherType::Basic => Box::new(BasicMatcher),
            MatcherType::InterestsBased => Box::new(InterestsMatcher),
            MatcherType::LocationBased => Box::new(LocationMatcher),
        }
    }
}

// ============================================================================
// Chat
// ============================================================================

#[derive(Debug, Clone)]
pub struct Message {
    pub sender: String,
    pub content: String,
    pub sent_at: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct ChatRoom {
    pub id: String,
    pub participants: [String; 2],
    pub messages: Vec<Message>,
}

impl ChatRoom {
    pub fn has_participant(&self, user: &str) -> bool {
        self.participants.iter().any(|p| p == user)
    }

    pub fn transcript(&self) -> Vec<String> {
        self.messages
            .iter()
            .map(|m| format!("[{}] {}: {}", m.sent_at.format("%Y-%m-%d %H:%M:%S"), m.sender, m.content))
            .collect()
    }
}

// ============================================================================
// App
// ============================================================================

pub struct DatingApp {
    users: Vec<User>,
    rooms: Vec<ChatRoom>,
    matcher: Box<dyn Matcher>,
    location: LocationService,
    notifications: BTreeMap<String, Vec<String>>,
}

impl Default for DatingApp {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            rooms: Vec::new(),
            matcher: MatcherType::LocationBased.create(),
            location: LocationService::default(),
            notifications: BTreeMap::new(),
        }
    }
}

impl DatingApp {
    pub fn set_matcher(&mut self, kind: MatcherType) {
        self.matcher = kind.create();
    }

    pub fn location_service(&mut self) -> &mut LocationService {
        &mut self.location
    }

    pub fn create_user(&mut self, id: &str) -> Result<&mut User, DatingError> {
        if self.users.iter().any(|u| u.id == id) {
            return Err(DatingError::DuplicateUser(id.to_string()));
        }
        self.notifications.insert(id.to_string(), Vec::new());
        self.users.push(User {
            id: id.to_string(),
            ..User::default()
        });
        self.user_mut(id)
    }

    pub fn user(&self, id: &str) -> Result<&User, DatingError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or_else(|| DatingError::UnknownUser(id.to_string()))
    }

    pub fn user_mut(&mut self, id: &str) -> Result<&mut User, DatingError> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DatingError::UnknownUser(id.to_string()))
    }

    fn notify(&mut self, user: &str, message: String) {
        if let Some(inbox) = self.notifications.get_mut(user) {
            inbox.push(message);
        }
    }

    pub fn notifications(&self, user: &str) -> &[String] {
        self.notifications.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Candidates within `radius_km` that score above zero, skipping the
    /// user and anyone already swiped.
    pub fn find_nearby(&self, user_id: &str, radius_km: f64) -> Result<Vec<(String, f64)>, DatingError> {
        let user = self.user(user_id)?;
        Ok(self
            .location
            .nearby(&user.profile.location, radius_km, &self.users)
            .into_iter()
            .filter(|other| other.id != user.id && !user.has_interacted_with(&other.id))
            .map(|other| (other.id.clone(), self.matcher.score(user, other)))
            .filter(|(_, score)| *score > 0.0)
            .collect())
    }

    /// Returns true when the swipe completes a match.
    pub fn swipe(&mut self, user_id: &str, target_id: &str, action: SwipeAction) -> Result<bool, DatingError> {
        let target_name = self.user(target_id)?.profile.name.clone();
        let target_liked = self.user(target_id)?.has_liked(user_id);
        let user = self.user_mut(user_id)?;
        user.swipes.insert(target_id.to_string(), action);
        let user_name = user.profile.name.clone();

        if action != SwipeAction::Right || !target_liked {
            return Ok(false);
        }
        if self.chat_room(user_id, target_id).is_none() {
            self.rooms.push(ChatRoom {
                id: format!("{user_id}_{target_id}"),
                participants: [user_id.to_string(), target_id.to_string()],
                messages: Vec::new(),
            });
        }
        info!(user = user_id, target = target_id, "new match");
        self.notify(user_id, format!("You have a new match with {target_name}!"));
        self.notify(target_id, format!("You have a new match with {user_name}!"));
        Ok(true)
    }

    pub fn chat_room(&self, a: &str, b: &str) -> Option<&ChatRoom> {
        self.rooms.iter().find(|r| r.has_participant(a) && r.has_participant(b))
    }

    pub fn send_message(&mut self, sender: &str, receiver: &str, content: &str) -> Result<(), DatingError> {
        let sender_name = self.user(sender)?.profile.name.clone();
        let room = self
            .rooms
            .iter_mut()
            .find(|r| r.has_participant(sender) && r.has_participant(receiver))
            .ok_or_else(|| DatingError::NoChatRoom(sender.to_string(), receiver.to_string()))?;
        room.messages.push(Message {
            sender: sender.to_string(),
            content: content.to_string(),
            sent_at: Local::now(),
        });
        self.notify(receiver, format!("New message from {sender_name}"));
        Ok(())
    }
}

fn sample_app() -> Result<DatingApp, DatingError> {
    let mut app = DatingApp::default();

    let rohan = app.create_user("user1")?;
    rohan.profile = UserProfile {
        name: "Rohan".into(),
        age: 28,
        gender: Gender::Male,
        bio: "I am a software developer".into(),
        photos: vec!["rohan_photo1.jpg".into()],
        location: Location::new(1.01, 1.02),
        ..UserProfile::default()
    };
    rohan.profile.add_interest("Coding", "Programming");
    rohan.profile.add_interest("Travel", "Lifestyle");
    rohan.profile.add_interest("Music", "Entertainment");
    rohan.preference = Preference {
        genders: vec![Gender::Female],
        min_age: 25,
        max_age: 30,
        max_distance_km: 10.0,
        interests: vec!["Coding".into(), "Travel".into()],
    };

    let neha = app.create_user("user2")?;
    neha.profile = UserProfile {
        name: "Neha".into(),
        age: 27,
        gender: Gender::Female,
        bio: "Art teacher who loves painting and traveling.".into(),
        photos: vec!["neha_photo1.jpg".into()],
        location: Location::new(1.03, 1.04),
        ..UserProfile::default()
    };
    neha.profile.add_interest("Painting", "Art");
    neha.profile.add_interest("Travel", "Lifestyle");
    neha.profile.add_interest("Music", "Entertainment");
    neha.preference = Preference {
        genders: vec![Gender::Male],
        min_age: 27,
        max_age: 30,
        max_distance_km: 15.0,
        interests: vec!["Coding".into(), "Movies".into()],
    };
    Ok(app)
}

pub fn demo(_config: &AppConfig) -> anyhow::Result<Transcript> {
    let mut t = Transcript::new();
    let mut app = sample_app()?;

    t.heading("Dating app: profiles");
    for id in ["user1", "user2"] {
        t.line(app.user(id)?.profile.to_string());
    }

    t.heading("Dating app: nearby users for user1 within 5 km");
    for (id, score) in app.find_nearby("user1", 5.0)? {
        t.line(format!("{} ({id}) score {score:.2}", app.user(&id)?.profile.name));
    }

    t.heading("Dating app: swipes and chat");
    let first = app.swipe("user1", "user2", SwipeAction::Right)?;
    let second = app.swipe("user2", "user1", SwipeAction::Right)?;
    t.line(format!("match after first swipe: {first}, after second: {second}"));
    app.send_message("user1", "user2", "Hi Neha, Kaise ho?")?;
    app.send_message("user2", "user1", "Hi Rohan, Ma bdiya tum btao")?;
    if let Some(room) = app.chat_room("user1", "user2") {
        t.line(format!("chat room {}: {} messages", room.id, room.messages.len()));
    }
    for id in ["user1", "user2"] {
        for n in app.notifications(id) {
            t.line(format!("Notification for {id}: {n}"));
        }
    }
    Ok(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        let d = Location::new(1.01, 1.02).distance_km(&Location::new(1.03, 1.04));
        assert!(d > 3.0 && d < 3.3, "got {d}");
        assert_eq!(Location::default().distance_km(&Location::default()), 0.0);
    }

    #[test]
    fn test_matcher_layers() {
        let app = sample_app().unwrap();
        let (a, b) = (app.user("user1").unwrap(), app.user("user2").unwrap());
        assert_eq!(BasicMatcher.score(a, b), 0.5);
        let interests = InterestsMatcher.score(a, b);
        assert!((interests - (0.5 + 0.5 * 2.0 / 3.0)).abs() < 1e-9);
        let location = LocationMatcher.score(a, b);
        assert!(location > interests && location < interests + 0.2);
    }

    #[test]
    fn test_basic_matcher_requires_mutual_preferences() {
        let mut app = sample_app().unwrap();
        app.user_mut("user2").unwrap().preference.min_age = 29;
        let (a, b) = (app.user("user1").unwrap(), app.user("user2").unwrap());
        assert_eq!(LocationMatcher.score(a, b), 0.0);
    }

    #[test]
    fn test_find_nearby_skips_swiped_and_far_users() {
        let mut app = sample_app().unwrap();
        let far = app.create_user("user3").unwrap();
        far.profile.gender = Gender::Female;
        far.profile.age = 26;
        far.profile.location = Location::new(10.0, 10.0);
        far.preference.genders = vec![Gender::Male];

        let found = app.find_nearby("user1", 5.0).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "user2");

        app.swipe("user1", "user2", SwipeAction::Left).unwrap();
        assert!(app.find_nearby("user1", 5.0).unwrap().is_empty());
    }

    #[test]
    fn test_mutual_right_swipe_opens_chat() {
        let mut app = sample_app().unwrap();
        assert_eq!(
            app.send_message("user1", "user2", "hi"),
            Err(DatingError::NoChatRoom("user1".into(), "user2".into()))
        );
        assert!(!app.swipe("user1", "user2", SwipeAction::Right).unwrap());
        assert!(app.swipe("user2", "user1", SwipeAction::Right).unwrap());
        assert_eq!(app.notifications("user1"), ["You have a new match with Neha!"]);

        app.send_message("user1", "user2", "hi").unwrap();
        let room = app.chat_room("user2", "user1").unwrap();
        assert_eq!(room.id, "user2_user1");
        assert_eq!(room.messages.len(), 1);
        assert_eq!(app.notifications("user2").last().unwrap(), "New message from Rohan");
    }

    #[test]
    fn test_unknown_and_duplicate_users() {
        let mut app = sample_app().unwrap();
        assert!(matches!(app.create_user("user1"), Err(DatingError::DuplicateUser(_))));
        assert_eq!(
            app.swipe("user1", "ghost", SwipeAction::Right),
            Err(DatingError::UnknownUser("ghost".into()))
        );
    }
}
