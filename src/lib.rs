pub mod combat;
pub mod config;
pub mod director;
pub mod effects;
pub mod enemy;
pub mod entities;
pub mod error;
pub mod events;
pub mod governor;
pub mod hero;
pub mod input;
pub mod pool;
pub mod session;
pub mod stats;
