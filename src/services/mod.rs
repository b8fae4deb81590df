pub mod error;
pub mod github;
pub mod mutation;
pub mod ownership;
pub mod posts;
pub mod profiles;
pub mod resolver;
pub mod users;

pub use error::{ResourceKind, ServiceError, ServiceResult};
pub use github::{GithubClient, GithubError};
pub use ownership::{authorize, Operation};
pub use posts::{PostService, TextRequest};
pub use profiles::{EducationRequest, ExperienceRequest, ProfileRequest, ProfileService};
pub use resolver::Resolver;
pub use users::{LoginRequest, RegisterRequest, UserService};
