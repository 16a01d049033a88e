//! The user's profile and the student record that fees belong to.

mod core;
mod endpoint;
mod page;

pub use core::{
    Profile, ProfileForm, SaveProfile, Student, StudentId, create_profile_tables,
    get_profile, get_student_for_user, save_profile,
};
pub use endpoint::save_profile_endpoint;
pub use page::get_profile_page;
