pub mod constants;
pub mod lattice;
pub mod naming;
