//! Prebuilt smart-home scenarios and the command line driver for the
//! [`homenet_core`] simulator.

pub mod applications;
pub mod cli;
pub mod config;
pub mod home;
pub mod simulations;
pub mod summary;

pub use home::Home;
