//! # checkout-cli
//!
//! Runner for strategy-checkout.
//!
//! This crate provides:
//! - `AppConfig` loaded from the environment
//! - TOML scenarios (customer, wallets, items, method to pay with)
//! - A scripted demo walkthrough
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `checkout-demo demo` | Scripted walkthrough |
//! | `checkout-demo run <scenario.toml>` | Run a scenario, print the outcome as JSON |
//! | `checkout-demo validate <scenario.toml>` | Validate a scenario's wallets |

pub mod config;
pub mod demo;
pub mod scenario;

pub use config::{AppConfig, LogFormat};
pub use scenario::{Scenario, ScenarioRun, WalletReport};
