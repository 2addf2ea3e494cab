mod group;
mod kind;
mod pool;

pub use group::{proxies_overlap, scan_collisions, ActorGroup, CULL_MARGIN};
pub use kind::{idle, ActorType, RunFn};
pub use pool::ActorPool;
