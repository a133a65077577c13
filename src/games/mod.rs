//! Game implementations.

pub mod energy_war;
