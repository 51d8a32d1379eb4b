//! Domain-decomposition communication.
//!
//! Each partition owns a disjoint set of cells plus a ghost layer that
//! mirrors cells owned elsewhere. The [`Communicator`] trait covers the two
//! ghost operations and the global reductions the transport engine needs.
//! All operations are synchronous collectives.
//!
//! - [`SerialCommunicator`]: a single partition without ghosts
//! - [`LoopbackCommunicator`]: ghosts that mirror owned cells of the same
//!   partition (periodic meshes, or testing the ghost code paths in-process)

mod communicator;

pub use communicator::{Communicator, LoopbackCommunicator, SerialCommunicator};
