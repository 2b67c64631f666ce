//! Container runtime integration.
//!
//! The engine talks to the host only through [`ContainerRuntime`]. The real
//! client lives outside this crate; [`MemoryRuntime`] is an in-process host
//! used for dry runs and tests.

mod client;
mod memory;

pub use client::{ContainerRuntime, LiveApp};
pub use memory::{HostEvent, MemoryRuntime};

#[cfg(test)]
pub use client::MockContainerRuntime;
