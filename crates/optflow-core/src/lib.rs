//! Job-directory writers for Abinit wavefunction runs and LATM optical
//! responses.

pub mod common;
pub mod config;
pub mod domain;
pub mod modules;
