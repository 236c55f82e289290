//! HTTP handlers for entity data, deploy/reset control, and navigation.

pub mod control;
pub mod entity;
pub mod navigation;
