pub mod ai;
pub mod entity;
pub mod mapgen;
pub mod path;
pub mod rng;
pub mod rules;
pub mod solids;
pub mod tile;
