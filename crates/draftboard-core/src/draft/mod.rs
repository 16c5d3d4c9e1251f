// Snake draft: turn arithmetic, pick records and the coordinator that
// applies picks against the store.

pub mod coordinator;
pub mod order;
pub mod pick;

pub use coordinator::{DraftCoordinator, DraftOrder, Seat, Turn, TurnInfo};
pub use pick::{DraftPick, PickStatus};
