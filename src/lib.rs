// Library exports for Emotion Detection

pub mod annotate;
pub mod camera;
pub mod config;
pub mod controls;
pub mod detection;
pub mod emotion;
pub mod error;
pub mod models;
pub mod overlay;
pub mod schedule;
pub mod ui;
pub mod video_loop;
