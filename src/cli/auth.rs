use chrono::{Local, NaiveDate};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    core::{
        security::hash_password,
        session::prune_sessions,
        utils::{is_valid_email, parse_date},
    },
    model::{active_state::ActiveState, role::Role, user::User},
    repository::{
        role::{create_role, get_role_by_name},
        user::{create_user as insert_user, get_user_by_email},
    },
    settings::Config,
};

pub const SUPER_ADMIN_ROLE: &str = "Super Admin";
const DEFAULT_ADMIN_EMAIL: &str = "admin@gmail.com";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Account data of a user created from the command line.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub gender: String,
    pub birthdate: String,
    pub role: String,
}

async fn get_or_create_role(tx: &mut Transaction<'_, Postgres>, name: &str) -> anyhow::Result<Role> {
    if let Some(role) = get_role_by_name(tx, name).await? {
        return Ok(role);
    }
    let now = Local::now().fixed_offset();
    let role = create_role(tx, name.to_string(), None, &now).await?;
    tracing::info!("created role {}", role.name);
    Ok(role)
}

async fn store_user(tx: &mut Transaction<'_, Postgres>, new_user: &NewUser) -> anyhow::Result<User> {
    let email = new_user.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        anyhow::bail!("invalid email: {}", new_user.email);
    }
    if get_user_by_email(tx, &email).await?.is_some() {
        anyhow::bail!("user {} already exists", email);
    }
    let birthdate: NaiveDate = match parse_date(&new_user.birthdate) {
        Some(val) => val,
        None => anyhow::bail!("birthdate must be YYYY-MM-DD, got {}", new_user.birthdate),
    };
    let role = get_or_create_role(tx, &new_user.role).await?;
    let password = hash_password(&new_user.password)
        .map_err(|err| anyhow::anyhow!("hash password: {}", err))?;
    let now = Local::now().fixed_offset();
    let user = User {
        id: Uuid::now_v7(),
        name: new_user.name.clone(),
        email,
        password,
        gender: new_user.gender.clone(),
        birthdate,
        active: ActiveState::Active,
        role_id: role.id,
        created_by: None,
        created_at: now,
        updated_by: None,
        updated_at: now,
    };
    insert_user(tx, &user).await?;
    Ok(user)
}

/// Create an active user, creating its role by name when missing.
pub async fn create_user(pool: &PgPool, new_user: &NewUser) -> anyhow::Result<User> {
    let mut tx = pool.begin().await?;
    let user = store_user(&mut tx, new_user).await?;
    tx.commit().await?;
    Ok(user)
}

/// Role "Super Admin" and the admin account. Running it again changes nothing.
pub async fn seed(pool: &PgPool, config: &Config) -> anyhow::Result<()> {
    let email = config
        .admin_email
        .clone()
        .unwrap_or(DEFAULT_ADMIN_EMAIL.to_string());
    let password = config
        .admin_password
        .clone()
        .unwrap_or(DEFAULT_ADMIN_PASSWORD.to_string());

    let mut tx = pool.begin().await?;
    get_or_create_role(&mut tx, SUPER_ADMIN_ROLE).await?;
    if get_user_by_email(&mut tx, &email.to_lowercase()).await?.is_some() {
        tracing::info!("admin {} already exists", email);
    } else {
        let admin = NewUser {
            name: "Admin".to_string(),
            email,
            password,
            gender: "Male".to_string(),
            birthdate: "2001-01-01".to_string(),
            role: SUPER_ADMIN_ROLE.to_string(),
        };
        let user = store_user(&mut tx, &admin).await?;
        tracing::info!("created admin {}", user.email);
    }
    tx.commit().await?;
    Ok(())
}

/// Delete sessions older than `days` days. Returns how many were removed.
pub async fn prune_tokens(pool: &PgPool, days: u32) -> anyhow::Result<u64> {
    let mut tx = pool.begin().await?;
    let removed = prune_sessions(&mut tx, days).await?;
    tx.commit().await?;
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local};
    use sqlx::PgPool;
    use uuid::Uuid;

    use crate::{
        cli::auth::{create_user, prune_tokens, seed, NewUser, SUPER_ADMIN_ROLE},
        core::{security::verify_hash_password, test_utils::test_config},
    };

    fn new_user() -> NewUser {
        NewUser {
            name: "Budi".to_string(),
            email: "Budi@Gmail.com".to_string(),
            password: "secret123".to_string(),
            gender: "Male".to_string(),
            birthdate: "1995-04-24".to_string(),
            role: "Operator".to_string(),
        }
    }

    #[sqlx::test]
    async fn test_create_user(pool: PgPool) -> anyhow::Result<()> {
        // When
        let user = create_user(&pool, &new_user()).await?;

        // Expect
        let db_res: (String, String, String) = sqlx::query_as(
            r#"
            SELECT u.email, u.password, r.name
            FROM public.user u JOIN public.role r ON r.id = u.role_id
            WHERE u.id = $1
            "#,
        )
        .bind(user.id)
        .fetch_one(&pool)
        .await?;
        assert_eq!(db_res.0, "budi@gmail.com");
        assert!(verify_hash_password("secret123", &db_res.1).unwrap());
        assert_eq!(db_res.2, "Operator");

        // same email twice
        assert!(create_user(&pool, &new_user()).await.is_err());
        Ok(())
    }

    #[sqlx::test]
    async fn test_seed_is_idempotent(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let mut config = test_config();
        config.admin_email = Some("root@gmail.com".to_string());
        config.admin_password = Some("rootpassword".to_string());

        // When
        seed(&pool, &config).await?;
        seed(&pool, &config).await?;

        // Expect
        let roles: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public.role WHERE name = $1")
            .bind(SUPER_ADMIN_ROLE)
            .fetch_one(&pool)
            .await?;
        assert_eq!(roles.0, 1);
        let users: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM public.user WHERE email = $1")
            .bind("root@gmail.com")
            .fetch_one(&pool)
            .await?;
        assert_eq!(users.0, 1);
        Ok(())
    }

    #[sqlx::test]
    async fn test_prune_tokens(pool: PgPool) -> anyhow::Result<()> {
        // Given
        let user = create_user(&pool, &new_user()).await?;
        let old = Local::now().fixed_offset() - Duration::days(40);
        let fresh = Local::now().fixed_offset();
        for (token, created_at) in [("old", old), ("fresh", fresh)] {
            sqlx::query(
                r#"INSERT INTO public.access_token (id, user_id, token, refresh_token, created_at)
                VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(Uuid::now_v7())
            .bind(user.id)
            .bind(token)
            .bind(format!("refresh-{}", token))
            .bind(created_at)
            .execute(&pool)
            .await?;
        }

        // When
        let removed = prune_tokens(&pool, 30).await?;

        // Expect
        assert_eq!(removed, 1);
        let left: Vec<(String,)> = sqlx::query_as("SELECT token FROM public.access_token")
            .fetch_all(&pool)
            .await?;
        assert_eq!(left, vec![("fresh".to_string(),)]);
        Ok(())
    }
}
