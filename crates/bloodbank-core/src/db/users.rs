//! User database operations.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use super::sql::{date, get_opt_date, get_opt_ts, get_ts, ts};
use super::{DbError, DbResult, Store};
use crate::models::{User, UserQuery, UserSummary};

const USER_COLUMNS: &str = "id, name, date_of_birth, gender, contact, email, blood_group, \
                            user_type, last_donation, is_eligible, weight, hemoglobin, \
                            hospital_id, created_at, updated_at";

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        date_of_birth: get_opt_date(row, 2)?,
        gender: row.get(3)?,
        contact: row.get(4)?,
        email: row.get(5)?,
        blood_group: row.get(6)?,
        user_type: row.get(7)?,
        last_donation: get_opt_ts(row, 8)?,
        is_eligible: row.get(9)?,
        weight: row.get(10)?,
        hemoglobin: row.get(11)?,
        hospital_id: row.get(12)?,
        created_at: get_ts(row, 13)?,
        updated_at: get_ts(row, 14)?,
    })
}

/// Escape LIKE wildcards so user input matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub trait UserRepo: Store {
    /// Insert a new user.
    fn insert_user(&self, user: &User) -> DbResult<()> {
        self.conn().execute(
            r#"
            INSERT INTO users (
                id, name, date_of_birth, gender, contact, email, blood_group,
                user_type, last_donation, is_eligible, weight, hemoglobin,
                hospital_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                user.id,
                user.name,
                user.date_of_birth.as_ref().map(date),
                user.gender,
                user.contact,
                user.email,
                user.blood_group,
                user.user_type,
                user.last_donation.as_ref().map(ts),
                user.is_eligible,
                user.weight,
                user.hemoglobin,
                user.hospital_id,
                ts(&user.created_at),
                ts(&user.updated_at),
            ],
        )?;
        Ok(())
    }

    /// Update an existing user.
    fn update_user(&self, user: &User) -> DbResult<bool> {
        let rows_affected = self.conn().execute(
            r#"
            UPDATE users SET
                name = ?2,
                date_of_birth = ?3,
                gender = ?4,
                contact = ?5,
                email = ?6,
                blood_group = ?7,
                user_type = ?8,
                last_donation = ?9,
                is_eligible = ?10,
                weight = ?11,
                hemoglobin = ?12,
                hospital_id = ?13,
                updated_at = ?14
            WHERE id = ?1
            "#,
            params![
                user.id,
                user.name,
                user.date_of_birth.as_ref().map(date),
                user.gender,
                user.contact,
                user.email,
                user.blood_group,
                user.user_type,
                user.last_donation.as_ref().map(ts),
                user.is_eligible,
                user.weight,
                user.hemoglobin,
                user.hospital_id,
                ts(&user.updated_at),
            ],
        )?;
        Ok(rows_affected > 0)
    }

    /// Get a user by ID.
    fn get_user(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        self.conn()
            .query_row(&sql, [id], user_from_row)
            .optional()
            .map_err(Into::into)
    }

    /// List all users in registration order.
    fn list_users(&self) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY rowid", USER_COLUMNS);
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([], user_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Users attached to a hospital.
    fn list_users_for_hospital(&self, hospital_id: &str) -> DbResult<Vec<User>> {
        let sql = format!(
            "SELECT {} FROM users WHERE hospital_id = ? ORDER BY rowid",
            USER_COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map([hospital_id], user_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Users matching any of the set query fields. Name and email match
    /// case-insensitively; contact matches as typed.
    fn search_users(&self, query: &UserQuery) -> DbResult<Vec<User>> {
        let mut clauses = Vec::new();
        let mut values: Vec<String> = Vec::new();

        let fields = [
            ("LOWER(name) LIKE LOWER(?) ESCAPE '\\'", &query.name),
            ("contact LIKE ? ESCAPE '\\'", &query.contact),
            ("LOWER(email) LIKE LOWER(?) ESCAPE '\\'", &query.email),
        ];
        for (clause, value) in fields {
            if let Some(needle) = value.as_deref().filter(|v| !v.is_empty()) {
                clauses.push(clause);
                values.push(like_pattern(needle));
            }
        }
        if clauses.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM users WHERE {} ORDER BY rowid",
            USER_COLUMNS,
            clauses.join(" OR ")
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), user_from_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Id, name, contact and blood group of every user, or of the users
    /// attached to one hospital.
    fn list_user_summaries(&self, hospital_id: Option<&str>) -> DbResult<Vec<UserSummary>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT id, name, contact, blood_group FROM users
            WHERE ?1 IS NULL OR hospital_id = ?1
            ORDER BY rowid
            "#,
        )?;
        let rows = stmt.query_map([hospital_id], |row| {
            Ok(UserSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                contact: row.get(2)?,
                blood_group: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Record a donation on the donor: stamp the date and clear eligibility.
    fn mark_donated(&self, donor_id: &str, donated_at: DateTime<Utc>) -> DbResult<()> {
        let rows_affected = self.conn().execute(
            r#"
            UPDATE users SET
                last_donation = ?2,
                is_eligible = 0,
                updated_at = ?3
            WHERE id = ?1
            "#,
            params![donor_id, ts(&donated_at), ts(&Utc::now())],
        )?;
        if rows_affected == 0 {
            return Err(DbError::NotFound(format!("user {}", donor_id)));
        }
        Ok(())
    }

    /// Delete a user.
    fn delete_user(&self, id: &str) -> DbResult<bool> {
        let rows_affected = self.conn().execute("DELETE FROM users WHERE id = ?", [id])?;
        Ok(rows_affected > 0)
    }
}

impl<S: Store + ?Sized> UserRepo for S {}
