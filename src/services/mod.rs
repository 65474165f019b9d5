// src/services/mod.rs

pub mod aggregator;
pub mod comment_service;
pub mod tree;

pub use comment_service::CommentService;
