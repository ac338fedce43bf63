//! Binder engine: conversion rules, per-shape binders, the binder registry
//! and the dispatcher that routes raw values into record fields.

pub mod binder;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod rules;

pub use binder::{Binder, build_binder};
pub use config::{AbsentPrimitive, BinderConfig, FailurePolicy};
pub use dispatch::{BindReport, Dispatcher};
pub use error::EngineError;
pub use registry::{BinderRegistry, ShapeBinders};
pub use rules::{ConversionRules, RuleOptions, rules_for};
