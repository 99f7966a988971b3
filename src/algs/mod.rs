//! Re-export public algorithms.

pub mod default_algorithm;
pub mod monitor;
pub mod scheduler;
pub mod slab_decomposition;

pub use default_algorithm::{Algorithm, DefaultAlgorithm, EmptyAlgorithm};
pub use monitor::{CountMonitor, Monitor, MoveMonitor};
pub use scheduler::Scheduler;
pub use slab_decomposition::{DomainManager, SlabDecomposition, Subdomain};
