pub mod admin_helpers;
pub mod auth_helpers;
pub mod directory_helpers;
pub mod geo_helpers;
pub mod jobs_helpers;
pub mod moderation_helpers;
pub mod sanitization_helpers;
