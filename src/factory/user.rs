use chrono::{DateTime, FixedOffset, NaiveDate};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::security::hash_password,
    model::{active_state::ActiveState, user::User},
};

/// Plain password of every generated user.
pub const FACTORY_PASSWORD: &str = "password";

const INSERT_USER: &str = r#"
    INSERT INTO public.user (id, name, email, password, gender, birthdate, active, role_id,
        created_by, created_at, updated_by, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"#;

/// Users need an existing role: set `role_id` through a modifier.
pub struct UserFactory<T: Clone> {
    modifier_one: fn(x: &User, ext: T) -> User,
    modifier_many: fn(x: &User, idx: usize, ext: T) -> User,
}

impl<T: Clone> Default for UserFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn factory_password_hash() -> anyhow::Result<String> {
    hash_password(FACTORY_PASSWORD).map_err(|err| anyhow::anyhow!("hash password: {}", err))
}

impl<T: Clone> UserFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &User, ext: T) -> User) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &User, idx: usize, ext: T) -> User) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<User> {
        let password = factory_password_hash()?;
        let data = UserDummy::generate_one(&password);
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(INSERT_USER)
            .bind(data.id)
            .bind(&data.name)
            .bind(&data.email)
            .bind(&data.password)
            .bind(&data.gender)
            .bind(data.birthdate)
            .bind(data.active)
            .bind(data.role_id)
            .bind(data.created_by)
            .bind(data.created_at)
            .bind(data.updated_by)
            .bind(data.updated_at)
            .execute(db)
            .await?;
        Ok(data)
    }

    pub async fn generate_many(
        &mut self,
        db: &PgPool,
        num: u32,
        ext: T,
    ) -> anyhow::Result<Vec<User>> {
        let password = factory_password_hash()?;
        let mut result: Vec<User> = vec![];
        for (idx, item) in UserDummy::generate_many(num, &password).iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            sqlx::query(INSERT_USER)
                .bind(item.id)
                .bind(&item.name)
                .bind(&item.email)
                .bind(&item.password)
                .bind(&item.gender)
                .bind(item.birthdate)
                .bind(item.active)
                .bind(item.role_id)
                .bind(item.created_by)
                .bind(item.created_at)
                .bind(item.updated_by)
                .bind(item.updated_at)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(result)
    }
}

#[derive(Debug, Deserialize, Dummy, Clone)]
struct UserDummy {
    pub name: String,
    #[dummy(faker = "1960..2005")]
    pub birth_year: i32,
    #[dummy(faker = "1..13")]
    pub birth_month: u32,
    #[dummy(faker = "1..29")]
    pub birth_day: u32,
    pub male: bool,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl UserDummy {
    fn into_user(self, password: &str) -> User {
        let id = Uuid::now_v7();
        User {
            id,
            name: self.name,
            email: format!("{}@example.com", id.simple()),
            password: password.to_string(),
            gender: if self.male { "Male" } else { "Female" }.to_string(),
            birthdate: NaiveDate::from_ymd_opt(self.birth_year, self.birth_month, self.birth_day)
                .unwrap_or_default(),
            active: ActiveState::Active,
            role_id: Uuid::nil(),
            created_by: None,
            created_at: self.created_at,
            updated_by: None,
            updated_at: self.updated_at,
        }
    }

    pub fn generate_one(password: &str) -> User {
        Faker.fake::<UserDummy>().into_user(password)
    }

    pub fn generate_many(num: u32, password: &str) -> Vec<User> {
        (0..num).map(|_| Self::generate_one(password)).collect()
    }
}
