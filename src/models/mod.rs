pub mod goal;
pub mod session;
pub mod user;
pub mod workout;

pub use goal::{Goal, GoalDraft, GoalStatus, GoalStatusUpdate, NewGoal};
pub use session::{Credential, SessionRecord, COOKIE_SESSION_SENTINEL};
pub use user::{UserProfile, ADMIN_ROLE};
pub use workout::{NewWorkout, Workout, WorkoutDraft};
