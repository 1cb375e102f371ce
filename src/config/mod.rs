pub mod profile;

pub use profile::{PhyOverrides, Profile, RoleNames};
