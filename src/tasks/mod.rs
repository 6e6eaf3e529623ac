//! Background Tasks Module
//!
//! Work that runs detached from the request path.
//!
//! # Tasks
//! - Revalidation: refreshes a stored API response after serving it
//! - Install retry: retries precaching until the worker installs

mod install;
mod revalidate;

pub use install::spawn_install_task;
pub use revalidate::spawn_revalidation;
