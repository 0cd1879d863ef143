//! Bouncebox library - audio-reactive rigid-body balls in a resizable box

pub mod audio;
pub mod camera;
pub mod cli;
pub mod enclosure;
pub mod entity;
pub mod error;
pub mod params;
pub mod physics;
pub mod rendering;
pub mod scene;
pub mod simulation;
pub mod sync;
