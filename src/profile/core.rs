//! The profile and student records of a user, and how they are stored.

use rusqlite::{Connection, Row, params};
use serde::Deserialize;

use crate::{
    Error, UserID,
    auth::parse_email,
    database_id::DatabaseId,
    form::{optional_text, required_text},
};

/// Database identifier for a student record.
pub type StudentId = DatabaseId;

/// Every profile created through the app belongs to a student.
pub const STUDENT_ROLE: &str = "student";

/// Contact details for a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: UserID,
    pub full_name: String,
    /// The contact email, which may differ from the log-in email.
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Always [STUDENT_ROLE].
    pub role: String,
}

/// The school record that fees are charged against.
#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: StudentId,
    pub user_id: UserID,
    /// The identifier issued by the school, e.g. "S-1024".
    pub student_number: String,
    pub grade_level: String,
    pub class_section: Option<String>,
    pub parent_guardian_name: Option<String>,
    pub parent_guardian_phone: Option<String>,
}

/// The raw form data for saving a profile and student record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub student_number: String,
    #[serde(default)]
    pub grade_level: String,
    #[serde(default)]
    pub class_section: String,
    #[serde(default)]
    pub parent_guardian_name: String,
    #[serde(default)]
    pub parent_guardian_phone: String,
}

impl ProfileForm {
    /// Fill the form from the stored records, using `account_email` when there is no profile yet.
    pub fn from_records(
        profile: Option<&Profile>,
        student: Option<&Student>,
        account_email: &str,
    ) -> Self {
        let text = |value: Option<&String>| value.cloned().unwrap_or_default();

        Self {
            full_name: text(profile.map(|profile| &profile.full_name)),
            email: profile
                .map(|profile| profile.email.clone())
                .unwrap_or_else(|| account_email.to_owned()),
            phone: text(profile.and_then(|profile| profile.phone.as_ref())),
            address: text(profile.and_then(|profile| profile.address.as_ref())),
            student_number: text(student.map(|student| &student.student_number)),
            grade_level: text(student.map(|student| &student.grade_level)),
            class_section: text(student.and_then(|student| student.class_section.as_ref())),
            parent_guardian_name: text(
                student.and_then(|student| student.parent_guardian_name.as_ref()),
            ),
            parent_guardian_phone: text(
                student.and_then(|student| student.parent_guardian_phone.as_ref()),
            ),
        }
    }
}

/// A validated request to create or replace a user's profile and student record.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveProfile {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub student_number: String,
    pub grade_level: String,
    pub class_section: Option<String>,
    pub parent_guardian_name: Option<String>,
    pub parent_guardian_phone: Option<String>,
}

impl SaveProfile {
    /// Validate the raw form fields.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingField] if the full name, student ID or grade
    /// level is empty, or [Error::InvalidEmail] if the email is not valid.
    pub fn from_form(form: &ProfileForm) -> Result<Self, Error> {
        Ok(Self {
            full_name: required_text("Full name", &form.full_name)?,
            email: parse_email(&form.email)?,
            phone: optional_text(Some(&form.phone)),
            address: optional_text(Some(&form.address)),
            student_number: required_text("Student ID", &form.student_number)?,
            grade_level: required_text("Grade level", &form.grade_level)?,
            class_section: optional_text(Some(&form.class_section)),
            parent_guardian_name: optional_text(Some(&form.parent_guardian_name)),
            parent_guardian_phone: optional_text(Some(&form.parent_guardian_phone)),
        })
    }
}

/// Create the profile and student tables.
pub fn create_profile_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS profile (
            user_id INTEGER PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT NOT NULL,
            phone TEXT,
            address TEXT,
            role TEXT NOT NULL DEFAULT 'student',
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS student (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL UNIQUE,
            student_number TEXT NOT NULL,
            grade_level TEXT NOT NULL,
            class_section TEXT,
            parent_guardian_name TEXT,
            parent_guardian_phone TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

fn map_profile_row(row: &Row) -> Result<Profile, rusqlite::Error> {
    Ok(Profile {
        user_id: UserID::new(row.get(0)?),
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        address: row.get(4)?,
        role: row.get(5)?,
    })
}

fn map_student_row(row: &Row) -> Result<Student, rusqlite::Error> {
    Ok(Student {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        student_number: row.get(2)?,
        grade_level: row.get(3)?,
        class_section: row.get(4)?,
        parent_guardian_name: row.get(5)?,
        parent_guardian_phone: row.get(6)?,
    })
}

/// Get the profile of `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user has not saved a profile yet.
pub fn get_profile(user_id: UserID, connection: &Connection) -> Result<Profile, Error> {
    connection
        .prepare(
            "SELECT user_id, full_name, email, phone, address, role FROM profile
            WHERE user_id = :user_id",
        )?
        .query_one(&[(":user_id", &user_id.as_i64())], map_profile_row)
        .map_err(Error::from)
}

/// Get the student record linked to `user_id`.
///
/// # Errors
///
/// Returns [Error::StudentRecordMissing] if the user has not saved a student record yet.
pub fn get_student_for_user(user_id: UserID, connection: &Connection) -> Result<Student, Error> {
    connection
        .prepare(
            "SELECT id, user_id, student_number, grade_level, class_section,
                parent_guardian_name, parent_guardian_phone
            FROM student WHERE user_id = :user_id",
        )?
        .query_one(&[(":user_id", &user_id.as_i64())], map_student_row)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::StudentRecordMissing,
            error => error,
        })
}

/// Create or replace the profile and student record of `user_id`.
///
/// Both records are written in one transaction.
///
/// # Errors
///
/// Returns [Error::SqlError] if either record could not be written, in
/// which case neither is changed.
pub fn save_profile(
    user_id: UserID,
    profile: &SaveProfile,
    connection: &Connection,
) -> Result<StudentId, Error> {
    let transaction = connection.unchecked_transaction()?;

    transaction.execute(
        "INSERT INTO profile (user_id, full_name, email, phone, address, role)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(user_id) DO UPDATE SET
            full_name = excluded.full_name,
            email = excluded.email,
            phone = excluded.phone,
            address = excluded.address",
        params![
            user_id.as_i64(),
            profile.full_name,
            profile.email,
            profile.phone,
            profile.address,
            STUDENT_ROLE
        ],
    )?;

    let student_id = transaction.query_row(
        "INSERT INTO student (user_id, student_number, grade_level, class_section,
            parent_guardian_name, parent_guardian_phone)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(user_id) DO UPDATE SET
            student_number = excluded.student_number,
            grade_level = excluded.grade_level,
            class_section = excluded.class_section,
            parent_guardian_name = excluded.parent_guardian_name,
            parent_guardian_phone = excluded.parent_guardian_phone
        RETURNING id",
        params![
            user_id.as_i64(),
            profile.student_number,
            profile.grade_level,
            profile.class_section,
            profile.parent_guardian_name,
            profile.parent_guardian_phone
        ],
        |row| row.get(0),
    )?;

    transaction.commit()?;

    Ok(student_id)
}

#[cfg(test)]
mod profile_form_tests {
    use crate::Error;

    use super::{ProfileForm, SaveProfile};

    fn valid_form() -> ProfileForm {
        ProfileForm {
            full_name: " Asha Rao ".to_owned(),
            email: "Asha@Example.com".to_owned(),
            student_number: "S-1024".to_owned(),
            grade_level: "11".to_owned(),
            class_section: " ".to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn trims_and_normalizes_fields() {
        let profile = SaveProfile::from_form(&valid_form()).unwrap();

        assert_eq!(profile.full_name, "Asha Rao");
        assert_eq!(profile.email, "asha@example.com");
        assert_eq!(profile.class_section, None);
        assert_eq!(profile.phone, None);
    }

    #[test]
    fn requires_student_number_and_grade_level() {
        let form = ProfileForm {
            student_number: "".to_owned(),
            ..valid_form()
        };
        assert_eq!(
            SaveProfile::from_form(&form),
            Err(Error::MissingField("Student ID"))
        );

        let form = ProfileForm {
            grade_level: "".to_owned(),
            ..valid_form()
        };
        assert_eq!(
            SaveProfile::from_form(&form),
            Err(Error::MissingField("Grade level"))
        );
    }

    #[test]
    fn rejects_invalid_email() {
        let form = ProfileForm {
            email: "asha".to_owned(),
            ..valid_form()
        };

        assert!(matches!(
            SaveProfile::from_form(&form),
            Err(Error::InvalidEmail(_))
        ));
    }
}
