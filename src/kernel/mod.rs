//! Actor flask-state: slot arrays, the keyed cache that owns them, and the
//! binary record they are persisted in.

pub mod cache;
pub mod category;
pub mod persist;
pub mod slots;
pub mod state;
pub mod time;

pub use cache::{ActorId, FlaskStateCache};
pub use category::FlaskCategory;
pub use slots::{CooldownSlot, SlotArray, SLOT_CAPACITY};
pub use state::ActorFlaskState;
pub use time::{Clock, ManualClock, Millis, MonotonicClock};
