//! Profile persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `profiles` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use hcred_core::WalletAddress;

use crate::auth::Role;
use crate::state::Profile;

/// Insert a new profile.
pub async fn insert(pool: &PgPool, profile: &Profile) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO profiles (profile_id, role, display_name, wallet_address,
         license_number, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(profile.profile_id)
    .bind(profile.role.as_str())
    .bind(&profile.display_name)
    .bind(profile.wallet_address.as_ref().map(WalletAddress::as_str))
    .bind(&profile.license_number)
    .bind(profile.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load all profiles from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Profile>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ProfileRow>(
        "SELECT profile_id, role, display_name, wallet_address, license_number, created_at
         FROM profiles ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let id = row.profile_id;
            match row.into_profile() {
                Ok(profile) => Some(profile),
                Err(e) => {
                    tracing::warn!(profile_id = %id, error = %e, "skipping corrupt profile row");
                    None
                }
            }
        })
        .collect())
}

fn parse_role(s: &str) -> Result<Role, String> {
    match s {
        "patient" => Ok(Role::Patient),
        "hospital" => Ok(Role::Hospital),
        "admin" => Ok(Role::Admin),
        other => Err(format!("unknown role: {other}")),
    }
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ProfileRow {
    profile_id: Uuid,
    role: String,
    display_name: String,
    wallet_address: Option<String>,
    license_number: Option<String>,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> Result<Profile, String> {
        let wallet_address = self
            .wallet_address
            .map(|w| WalletAddress::new(&w).map_err(|e| e.to_string()))
            .transpose()?;

        Ok(Profile {
            profile_id: self.profile_id,
            role: parse_role(&self.role)?,
            display_name: self.display_name,
            wallet_address,
            license_number: self.license_number,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_role_roundtrip() {
        for role in [Role::Patient, Role::Hospital, Role::Admin] {
            assert_eq!(parse_role(role.as_str()).unwrap(), role);
        }
        assert!(parse_role("superuser").is_err());
    }
}
