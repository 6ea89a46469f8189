//! Low level design problems built out of the patterns.

pub mod coupon;
pub mod dating;
pub mod delivery;
pub mod food_ordering;
pub mod music_player;
pub mod notification;
pub mod payment_gateway;
pub mod snake_ladder;
pub mod splitwise;
pub mod tic_tac_toe;
