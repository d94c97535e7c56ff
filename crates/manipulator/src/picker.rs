//! Handle picking policy over a host picking backend.

use manip_math::Vec2;

use crate::config::EnabledModes;
use crate::handle::{Handle, HandleId, HandleSet};

/// Host hit-testing against the gizmo geometry.
pub trait PickingBackend {
    /// Topmost handle under the screen point
    fn pick(&self, screen: Vec2) -> Option<HandleId>;

    /// Every handle under the screen point, in the host's overlap order
    fn pick_all(&self, screen: Vec2) -> Vec<HandleId>;
}

/// Chooses the active handle among overlapping hits.
#[derive(Clone, Copy, Debug, Default)]
pub struct HandlePicker;

impl HandlePicker {
    /// Best handle among `hits`: highest priority class wins, ties go to the
    /// earlier hit. Unknown ids and disabled modes are skipped.
    pub fn choose(hits: &[HandleId], handles: &HandleSet, enabled: &EnabledModes) -> Option<HandleId> {
        hits.iter()
            .filter_map(|id| Self::usable(*id, handles, enabled))
            .enumerate()
            .min_by_key(|(order, handle)| (handle.priority(), *order))
            .map(|(_, handle)| handle.id)
    }

    /// Resolve the handle under `screen`. A single (or no) overlap hit
    /// defers to the backend's point query directly.
    pub fn pick<P: PickingBackend + ?Sized>(
        backend: &P,
        screen: Vec2,
        handles: &HandleSet,
        enabled: &EnabledModes,
    ) -> Option<HandleId> {
        let hits = backend.pick_all(screen);
        if hits.len() <= 1 {
            return backend
                .pick(screen)
                .and_then(|id| Self::usable(id, handles, enabled))
                .map(|handle| handle.id);
        }
        Self::choose(&hits, handles, enabled)
    }

    fn usable(id: HandleId, handles: &HandleSet, enabled: &EnabledModes) -> Option<Handle> {
        handles.get(id).filter(|h| enabled.contains(h.mode)).copied()
    }
}
