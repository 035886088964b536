pub mod job;
pub mod kpoints;
pub mod response;
pub mod runscript;
pub mod serialization;
pub mod wavefunction;

mod traits;

pub use traits::JobWriter;
