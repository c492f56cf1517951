use uuid::Uuid;

/// Per-request context.
///
/// Created once at the edge (HTTP middleware, test harness) and passed
/// explicitly to the dispatcher and the store; nothing is read from ambient
/// state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestContext {
    request_id: Uuid,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::now_v7(),
        }
    }

    pub fn with_request_id(request_id: Uuid) -> Self {
        Self { request_id }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
