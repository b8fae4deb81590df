pub mod post;
pub mod profile;
pub mod user;

pub use post::{Comment, Like, Post};
pub use profile::{EducationEntry, ExperienceEntry, Profile, Social};
pub use user::{PublicUser, User, UserSummary};
