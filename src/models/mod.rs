// src/models/mod.rs

pub mod comment;
pub mod media;
pub mod reaction;
pub mod user;
