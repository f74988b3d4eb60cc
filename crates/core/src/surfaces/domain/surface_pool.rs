//! Bounded registry of live region surfaces.
//!
//! Each region name maps to at most one surface. Entries are created on
//! demand by [`SurfacePool::ensure`] while capacity remains, and removed by
//! [`SurfacePool::sweep`] once they reach the TTL or their surface has been
//! closed from outside. Redrawing a surface does not extend its life, so a
//! briefly undetected region keeps its last image until it ages out.
//!
//! The pool is not internally synchronized; the render and eviction ticks
//! must be serialized by the caller.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::shared::constants::{MAX_SURFACES, SURFACE_TTL};
use crate::shared::geometry::Rect;
use crate::shared::region_name::RegionName;
use crate::surfaces::domain::surface::{Surface, SurfaceFactory, SurfaceId};

pub struct SurfaceEntry {
    region: RegionName,
    surface: Box<dyn Surface>,
    created_at: Instant,
}

impl SurfaceEntry {
    pub fn region(&self) -> RegionName {
        self.region
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn surface_mut(&mut self) -> &mut dyn Surface {
        self.surface.as_mut()
    }
}

pub struct SurfacePool {
    factory: Box<dyn SurfaceFactory>,
    entries: BTreeMap<RegionName, SurfaceEntry>,
    capacity: usize,
    ttl: Duration,
}

impl SurfacePool {
    pub fn new(factory: Box<dyn SurfaceFactory>) -> Self {
        Self::with_limits(factory, MAX_SURFACES, SURFACE_TTL)
    }

    pub fn with_limits(factory: Box<dyn SurfaceFactory>, capacity: usize, ttl: Duration) -> Self {
        Self {
            factory,
            entries: BTreeMap::new(),
            capacity,
            ttl,
        }
    }

    /// Returns the live surface for `region`, opening one if needed.
    ///
    /// `None` is backpressure, not an error: either the pool is full or the
    /// factory refused to open a surface. An entry whose surface was closed
    /// externally is discarded and replaced with a fresh one.
    pub fn ensure(
        &mut self,
        region: RegionName,
        placement: &Rect,
        now: Instant,
    ) -> Option<&mut dyn Surface> {
        match self.entries.get(&region).map(|e| e.surface.is_closed()) {
            Some(false) => return self.entries.get_mut(&region).map(SurfaceEntry::surface_mut),
            Some(true) => {
                log::info!("Surface for {region} was closed externally, reopening");
                self.entries.remove(&region);
            }
            None => {}
        }

        if self.entries.len() >= self.capacity {
            log::debug!("Surface pool full ({}), skipping {region}", self.capacity);
            return None;
        }

        let Some(surface) = self.factory.open(region, placement) else {
            log::debug!("Surface allocation refused for {region}");
            return None;
        };
        log::info!("Opened surface {:?} for {region}", surface.id());

        let entry = self.entries.entry(region).or_insert(SurfaceEntry {
            region,
            surface,
            created_at: now,
        });
        Some(entry.surface_mut())
    }

    /// Closes and removes every entry that reached the TTL or whose surface
    /// was closed externally. Returns the evicted region names in order.
    pub fn sweep(&mut self, now: Instant) -> Vec<RegionName> {
        let ttl = self.ttl;
        let expired: Vec<RegionName> = self
            .entries
            .values()
            .filter(|e| e.surface.is_closed() || now.saturating_duration_since(e.created_at) >= ttl)
            .map(|e| e.region)
            .collect();

        for region in &expired {
            if let Some(mut entry) = self.entries.remove(region) {
                if !entry.surface.is_closed() {
                    entry.surface.close();
                }
                log::info!("Evicted surface {:?} for {region}", entry.surface.id());
            }
        }
        expired
    }

    /// True if `region` has an entry whose surface is still open.
    pub fn is_alive(&self, region: RegionName) -> bool {
        self.entries
            .get(&region)
            .is_some_and(|e| !e.surface.is_closed())
    }

    pub fn get(&self, region: RegionName) -> Option<&SurfaceEntry> {
        self.entries.get(&region)
    }

    pub fn surface_id(&self, region: RegionName) -> Option<SurfaceId> {
        self.entries.get(&region).map(|e| e.surface.id())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Closes every surface and empties the pool.
    pub fn close_all(&mut self) {
        for (_, mut entry) in std::mem::take(&mut self.entries) {
            entry.surface.close();
        }
    }
}

impl Drop for SurfacePool {
    fn drop(&mut self) {
        self.close_all();
    }
}
