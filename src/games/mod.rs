//! Game implementations.

pub mod roshambo;
