// Head-to-head calendar: circle-method planning, fixture records and the
// generator that writes a league's schedule.

pub mod fixture;
pub mod generator;
pub mod round_robin;

pub use fixture::{H2HMatch, MatchStatus, NewMatch};
pub use generator::ScheduleGenerator;
