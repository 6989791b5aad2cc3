//! Deferred world changes.
//!
//! Births and deaths discovered while entities are being stepped are queued
//! here and applied once every entity has moved, so the entity arena and the
//! spatial hash never change shape mid-tick.

use super::cell::Cell;
use super::entity::{Body, EntityId};
use super::geometric_utils::Vec2;
use super::resource::ResourceKind;

/// Events that modify the entity population.
#[derive(Debug, Clone)]
pub enum SimulationEvent {
    /// A cell divided; the offspring joins the world at the end of the tick.
    Split {
        /// Id of the dividing cell.
        parent: EntityId,
        /// Offspring payload.
        cell: Box<Cell>,
        /// Offspring body, already placed.
        body: Body,
    },
    /// A cell was removed.
    CellDied {
        /// Id of the removed cell.
        id: EntityId,
        /// Generation of the removed cell.
        generation: u32,
    },
    /// A resource was used up and removed.
    ResourceDepleted {
        /// Id of the removed resource.
        id: EntityId,
        /// Kind to respawn.
        kind: ResourceKind,
        /// Where it was when it ran out.
        position: Vec2,
    },
}

/// Queue for collecting simulation events during a tick.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<SimulationEvent>,
}

impl EventQueue {
    /// Creates an empty event queue.
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Adds an event to the queue.
    pub fn push(&mut self, event: SimulationEvent) {
        self.events.push(event);
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Discards every queued event.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Drains all events from the queue in the order they were pushed.
    pub fn drain(&mut self) -> std::vec::Drain<'_, SimulationEvent> {
        self.events.drain(..)
    }
}
