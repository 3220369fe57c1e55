//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on domain driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{FieldCommand, FieldImagery, FieldQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Write use-cases.
    pub commands: Arc<dyn FieldCommand>,
    /// Read use-cases.
    pub queries: Arc<dyn FieldQuery>,
    /// Find-or-fetch imagery use-case.
    pub imagery: Arc<dyn FieldImagery>,
}

impl HttpState {
    /// Construct state from the three port implementations.
    pub fn new(
        commands: Arc<dyn FieldCommand>,
        queries: Arc<dyn FieldQuery>,
        imagery: Arc<dyn FieldImagery>,
    ) -> Self {
        Self {
            commands,
            queries,
            imagery,
        }
    }
}
