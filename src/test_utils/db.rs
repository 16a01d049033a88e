use rusqlite::Connection;

use crate::{
    PasswordHash, UserID,
    auth::create_user,
    profile::{SaveProfile, StudentId, save_profile},
};

/// Insert a user with a dummy password hash.
#[track_caller]
pub(crate) fn insert_test_user(connection: &Connection, email: &str) -> UserID {
    create_user(
        email,
        PasswordHash::new_unchecked("$2b$04$notarealhashnotarealhashnotarealhashnotareal"),
        connection,
    )
    .expect("could not create test user")
    .id
}

/// Insert a user with a completed profile and return their student ID.
#[track_caller]
pub(crate) fn insert_test_student(connection: &Connection, email: &str) -> StudentId {
    let user_id = insert_test_user(connection, email);

    save_profile(user_id, &test_profile(email), connection).expect("could not save test profile")
}

pub(crate) fn test_profile(email: &str) -> SaveProfile {
    SaveProfile {
        full_name: "Test Student".to_owned(),
        email: email.to_owned(),
        phone: None,
        address: None,
        student_number: "S-0001".to_owned(),
        grade_level: "10".to_owned(),
        class_section: Some("B".to_owned()),
        parent_guardian_name: None,
        parent_guardian_phone: None,
    }
}
