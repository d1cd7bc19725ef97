//! Subscription handles for engine property observation.

use tracing::{debug, trace};
use uuid::Uuid;

use super::contract::MediaEngineContract;
use super::models::EngineProperty;

const LOG_TARGET: &str = "r_playctl::engine::observation";

/// One live property observation, returned by
/// [`MediaEngineContract::subscribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservationHandle {
    pub id: Uuid,
    pub property: EngineProperty,
}

impl ObservationHandle {
    pub fn new(property: EngineProperty) -> Self {
        ObservationHandle {
            id: Uuid::new_v4(),
            property,
        }
    }
}

/// The set of live observations owned by the player. Invalidated as a unit on
/// teardown; every invalidation path is idempotent.
#[derive(Debug, Default)]
pub struct ObservationTable {
    handles: Vec<ObservationHandle>,
}

impl ObservationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handle: ObservationHandle) {
        trace!(target: LOG_TARGET, property = ?handle.property, "Registering observation.");
        self.handles.push(handle);
    }

    /// Invalidates every observation of one property.
    pub fn invalidate_property(&mut self, engine: &dyn MediaEngineContract, property: EngineProperty) {
        self.invalidate_where(engine, |handle| handle.property == property);
    }

    /// Invalidates every per-item status observation.
    pub fn invalidate_items(&mut self, engine: &dyn MediaEngineContract) {
        self.invalidate_where(engine, |handle| {
            matches!(handle.property, EngineProperty::ItemStatus(_))
        });
    }

    /// Invalidates everything. Calling on an already-empty table is a no-op.
    pub fn invalidate_all(&mut self, engine: &dyn MediaEngineContract) {
        if self.handles.is_empty() {
            trace!(target: LOG_TARGET, "No observations to invalidate.");
            return;
        }
        debug!(target: LOG_TARGET, count = self.handles.len(), "Invalidating all observations.");
        for handle in self.handles.drain(..) {
            engine.unsubscribe(&handle);
        }
    }

    fn invalidate_where(
        &mut self,
        engine: &dyn MediaEngineContract,
        predicate: impl Fn(&ObservationHandle) -> bool,
    ) {
        let mut index = 0;
        while index < self.handles.len() {
            if predicate(&self.handles[index]) {
                let handle = self.handles.remove(index);
                trace!(target: LOG_TARGET, property = ?handle.property, "Invalidating observation.");
                engine.unsubscribe(&handle);
            } else {
                index += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
