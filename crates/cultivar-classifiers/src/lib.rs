//! cultivar-classifiers: machine-learning core for crop recommendation.
//!
//! This crate provides the offline training/evaluation pipeline (feature
//! standardization, label encoding, five base classifiers plus a soft-voting
//! ensemble, stratified evaluation with cross-validation) and the minimal
//! inference service that maps a single soil/climate sample to a crop label.
//!
//! The design favors small, testable modules: all classifiers share one
//! `Classifier` trait so the ensemble and the evaluator can treat them
//! uniformly, and every probabilistic component takes an explicit seed.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod evaluation;
pub mod inference;
pub mod io;
pub mod labels;
pub mod metrics;
pub mod model_selection;
pub mod models;
pub mod preprocessing;
pub mod report;

pub use error::{Error, Result};
