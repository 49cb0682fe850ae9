pub mod cdn;
pub mod data;
pub mod error;
mod fetch;
pub mod github;
pub mod resolver;

// Re-export common types
pub use cdn::{CdnProvider, ManifestSource};
pub use data::{CdnManifest, CdnRelease, GithubCommit, GithubRelease, ReleaseInfo};
pub use error::{ResolveError, ResolveResult};
pub use github::{GitHubProvider, ReleaseMetadataService, GITHUB_API_URL};
pub use resolver::{ReleaseResolver, DEFAULT_OWNER};
