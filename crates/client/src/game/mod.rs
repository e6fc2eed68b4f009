// Game state: world store and the synchronizer that feeds it
mod sync;
mod world;

pub use sync::{Applied, Ignored, Outcome, SyncError, Synchronizer};
pub use world::{Creature, Item, ItemKind, Phase, WorldState};
