//! Core library: upload collection, classification, canonical labels, report rendering, export.

pub mod classifier;
pub mod config;
pub mod error;
pub mod export;
pub mod i18n;
pub mod labels;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod report;
pub mod scanner;
pub mod upload;
