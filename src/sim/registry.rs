//! Entity storage
//!
//! The registry is the only owner of world entities. Everything else holds
//! [`EntityId`]s and must cope with them resolving to nothing.
//!
//! Changes are double-buffered per tick: `create` stages new entities and
//! `destroy` only flags them. Queries see the live set minus flagged
//! entities, and [`EntityRegistry::commit`] at the end of a tick purges the
//! flagged ones and promotes the staged ones. A pass over the registry never
//! observes an entity created during that same tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::entity::{Entity, EntityId, EntityKind, Motion};

/// A request to materialize an entity, produced by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRequest {
    pub kind: EntityKind,
    pub rest: Aabb,
    pub motion: Option<Motion>,
}

impl SpawnRequest {
    pub fn still(kind: EntityKind, rest: Aabb) -> Self {
        Self {
            kind,
            rest,
            motion: None,
        }
    }

    pub fn moving(kind: EntityKind, rest: Aabb, motion: Motion) -> Self {
        Self {
            kind,
            rest,
            motion: Some(motion),
        }
    }

    /// Horizontal space the entity can ever occupy
    pub fn footprint(&self) -> Aabb {
        match &self.motion {
            Some(motion) => motion.sweep(&self.rest),
            None => self.rest,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    /// Live entities, ordered by id for stable iteration
    live: BTreeMap<EntityId, Entity>,
    /// Created this tick, visible after `commit`
    staged: Vec<Entity>,
    next_id: u32,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self {
            live: BTreeMap::new(),
            staged: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> EntityId {
        // Default derives next_id = 0; keep ids starting at 1 either way
        self.next_id = self.next_id.max(1);
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Stage a new entity; it becomes visible at the next `commit`
    pub fn create(
        &mut self,
        kind: EntityKind,
        rest: Aabb,
        motion: Option<Motion>,
        now: f32,
    ) -> EntityId {
        let id = self.allocate_id();
        let entity = Entity {
            id,
            kind,
            bbox: rest,
            rest,
            motion,
            spawned_at: now,
            destroyed: false,
        };
        self.staged.push(entity);
        id
    }

    /// Stage every request, returning the new ids in order
    pub fn spawn_all(&mut self, requests: Vec<SpawnRequest>, now: f32) -> Vec<EntityId> {
        requests
            .into_iter()
            .map(|r| self.create(r.kind, r.rest, r.motion, now))
            .collect()
    }

    /// Flag an entity for removal. Unknown or already destroyed ids are ignored.
    pub fn destroy(&mut self, id: EntityId) {
        if let Some(entity) = self.live.get_mut(&id) {
            entity.destroyed = true;
        } else if let Some(entity) = self.staged.iter_mut().find(|e| e.id == id) {
            entity.destroyed = true;
        }
    }

    /// Live entity by id, `None` once destroyed
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.live.get(&id).filter(|e| !e.destroyed)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Live entities in id order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.live.values().filter(|e| !e.destroyed)
    }

    /// Live entities accepted by `predicate`
    pub fn matching<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = &'a Entity>
    where
        P: FnMut(&Entity) -> bool + 'a,
    {
        self.iter().filter(move |e| predicate(e))
    }

    /// Live entities whose current box intersects the horizontal band `[min_x, max_x]`
    pub fn in_range(&self, min_x: f32, max_x: f32) -> impl Iterator<Item = &Entity> {
        self.iter()
            .filter(move |e| e.bbox.right() >= min_x && e.bbox.left() <= max_x)
    }

    /// Destroy everything whose trailing edge is left of `threshold_x`.
    /// Returns how many entities were destroyed.
    pub fn cull_behind(&mut self, threshold_x: f32) -> usize {
        let mut culled = 0;
        for entity in self.live.values_mut().chain(self.staged.iter_mut()) {
            if !entity.destroyed && entity.bbox.right() < threshold_x {
                entity.destroyed = true;
                culled += 1;
            }
        }
        culled
    }

    /// Recompute the boxes of periodically moving entities for world time `now`
    pub fn advance(&mut self, now: f32) {
        for entity in self.live.values_mut() {
            if entity.motion.is_some() {
                entity.bbox = entity.box_at(now);
            }
        }
    }

    /// Move pursuit hazards forward by `speed * dt`, never letting them lag
    /// more than `max_gap` behind `player_x`
    pub fn advance_pursuit(&mut self, dt: f32, speed: f32, player_x: f32, max_gap: f32) {
        for entity in self
            .live
            .values_mut()
            .filter(|e| e.kind == EntityKind::PursuitHazard && !e.destroyed)
        {
            let mut x = entity.rest.min.x + speed * dt;
            if x < player_x - max_gap {
                x = player_x - max_gap;
            }
            entity.rest.min.x = x;
            entity.bbox = entity.rest;
        }
    }

    /// End-of-tick boundary: drop destroyed entities and publish staged ones
    pub fn commit(&mut self) {
        self.live.retain(|_, e| !e.destroyed);
        for entity in self.staged.drain(..) {
            if !entity.destroyed {
                self.live.insert(entity.id, entity);
            }
        }
    }

    /// Remove every entity. Ids keep counting up so stale handles never alias.
    pub fn clear(&mut self) {
        self.live.clear();
        self.staged.clear();
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entities waiting for `commit`
    pub fn staged_len(&self) -> usize {
        self.staged.iter().filter(|e| !e.destroyed).count()
    }
}
