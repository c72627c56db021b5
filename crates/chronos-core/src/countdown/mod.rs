mod clock;
mod remaining;

pub use clock::{Clock, ManualClock, SystemClock};
pub use remaining::{remaining, remaining_in, RemainingTime, SECS_PER_DAY, SECS_PER_HOUR};
