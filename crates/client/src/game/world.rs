// World state store: snakes, food and the round phase
use std::collections::BTreeMap;

use glam::IVec2;
use protocol::{SnapshotState, Update};

/// Round phase as seen by this client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No `init` or `update` received yet.
    #[default]
    Uninitialized,
    Waiting,
    Active,
    /// The local snake died; only the restart key is meaningful.
    Eliminated,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Waiting => "waiting",
            Phase::Active => "active",
            Phase::Eliminated => "eliminated",
        }
    }
}

impl From<SnapshotState> for Phase {
    fn from(state: SnapshotState) -> Self {
        match state {
            SnapshotState::Waiting => Phase::Waiting,
            SnapshotState::Active => Phase::Active,
        }
    }
}

/// A snake in the world.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Creature {
    pub id: String,
    /// Grid cells, head first.
    pub segments: Vec<IVec2>,
    /// Whether this is the snake controlled by this client.
    pub is_local: bool,
}

impl Creature {
    #[inline]
    pub fn head(&self) -> Option<IVec2> {
        self.segments.first().copied()
    }

    /// A creature without segments is treated as absent.
    #[inline]
    pub fn is_present(&self) -> bool {
        !self.segments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Food,
}

/// A consumable on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub position: IVec2,
    pub kind: ItemKind,
}

/// Latest reconciled snapshot.
///
/// Readers get `&WorldState`; every mutator is crate-private and driven by
/// the [`Synchronizer`](super::Synchronizer).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorldState {
    creatures: BTreeMap<String, Creature>,
    items: Vec<Item>,
    phase: Phase,
    local_id: Option<String>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn local_id(&self) -> Option<&str> {
        self.local_id.as_deref()
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// All stored creatures in identity order, including empty ones.
    pub fn creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values()
    }

    /// Creatures that have at least one segment, in identity order.
    pub fn present_creatures(&self) -> impl Iterator<Item = &Creature> {
        self.creatures.values().filter(|c| c.is_present())
    }

    pub fn creature(&self, id: &str) -> Option<&Creature> {
        self.creatures.get(id)
    }

    /// The local snake, if the snapshot holds it with at least one segment.
    pub fn local_creature(&self) -> Option<&Creature> {
        self.local_id
            .as_deref()
            .and_then(|id| self.creatures.get(id))
            .filter(|c| c.is_present())
    }

    pub fn creature_count(&self) -> usize {
        self.creatures.len()
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    pub(crate) fn set_local_id(&mut self, id: String) {
        for creature in self.creatures.values_mut() {
            creature.is_local = creature.id == id;
        }
        self.local_id = Some(id);
    }

    /// Replace creatures and items with the snapshot's. Nothing from the
    /// previous snapshot survives.
    pub(crate) fn replace_snapshot(&mut self, update: Update) {
        let local_id = self.local_id.as_deref();
        self.creatures = update
            .snakes
            .into_iter()
            .map(|(id, snake)| {
                let creature = Creature {
                    is_local: local_id == Some(id.as_str()),
                    segments: snake.cells.into_iter().map(IVec2::from).collect(),
                    id: id.clone(),
                };
                (id, creature)
            })
            .collect();
        self.items = update
            .food
            .into_iter()
            .map(|p| Item { position: p.into(), kind: ItemKind::Food })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{GridPoint, SnakeState};

    fn update(snakes: &[(&str, Vec<(i32, i32)>)], food: &[(i32, i32)]) -> Update {
        Update {
            snakes: snakes
                .iter()
                .map(|(id, cells)| {
                    let cells = cells.iter().map(|&(x, y)| GridPoint::new(x, y)).collect();
                    (id.to_string(), SnakeState { cells })
                })
                .collect(),
            food: food.iter().map(|&(x, y)| GridPoint::new(x, y)).collect(),
            state: SnapshotState::Active,
        }
    }

    #[test]
    fn test_snapshot_replaces_everything() {
        let mut world = WorldState::new();
        world.replace_snapshot(update(&[("a", vec![(1, 1)]), ("b", vec![(2, 2)])], &[(0, 0), (3, 3)]));
        world.replace_snapshot(update(&[("c", vec![(4, 4), (4, 5)])], &[(9, 9)]));

        let ids: Vec<_> = world.creatures().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["c"]);
        assert_eq!(world.items().len(), 1);
        assert_eq!(world.items()[0].position, IVec2::new(9, 9));
        assert_eq!(world.creature("c").unwrap().head(), Some(IVec2::new(4, 4)));
    }

    #[test]
    fn test_empty_creature_is_not_present() {
        let mut world = WorldState::new();
        world.replace_snapshot(update(&[("a", vec![]), ("b", vec![(2, 2)])], &[]));

        assert_eq!(world.creature_count(), 2);
        let present: Vec<_> = world.present_creatures().map(|c| c.id.as_str()).collect();
        assert_eq!(present, ["b"]);
    }

    #[test]
    fn test_local_flag_follows_identity() {
        let mut world = WorldState::new();
        world.replace_snapshot(update(&[("me", vec![(1, 1)]), ("you", vec![(2, 2)])], &[]));
        assert!(world.creatures().all(|c| !c.is_local));

        world.set_local_id("me".into());
        assert!(world.creature("me").unwrap().is_local);
        assert!(!world.creature("you").unwrap().is_local);

        world.replace_snapshot(update(&[("me", vec![(1, 2)])], &[]));
        assert!(world.local_creature().is_some());
    }
}
