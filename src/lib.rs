//! Builds a database of game developers, their games, the soundtrack album
//! chosen for each game, and mood and genre features for every track.
//!
//! `ostdb import` fills developers, games and albums. `ostdb-tracks` then
//! downloads, transcodes and analyses the tracks of every pending album.

pub mod acquire;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod features;
pub mod logging;
pub mod pipeline;
pub mod soundtrack;

#[cfg(test)]
mod testing;
