pub mod aim;
pub mod block;
pub mod entity;
pub mod grid;
pub mod keys;
pub mod physics;
pub mod tile;
