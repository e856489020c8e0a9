use std::sync::Arc;

use crate::domain::service::SchedulingService;

/// Shared state handed to every handler.
pub struct AvailabilityAppState {
    pub scheduling_service: Arc<SchedulingService>,
}
