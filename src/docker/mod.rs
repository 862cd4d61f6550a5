//! Container image build, tag and registry publish.
//!
//! # Module Structure
//!
//! - `auth` - Registry credential inspection
//! - `availability` - Docker daemon check
//! - `config` - Timeouts and build argument names
//! - `image` - Image build and `latest` alias tagging
//! - `publisher` - Authentication flow and pushes
//! - `tag` - Image references and the production tag rule

pub mod auth;
pub mod availability;
pub mod config;
pub mod image;
pub mod publisher;
pub mod tag;

pub use auth::RegistryAuthState;
pub use availability::check_docker_available;
pub use image::{BuiltImage, ImageBuildRequest, ImageBuilder};
pub use publisher::{PublishOptions, PublishOutcome, RegistryPublisher};
pub use tag::{ImageReference, is_production_tag};
