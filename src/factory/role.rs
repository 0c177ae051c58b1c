use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::role::Role;

const INSERT_ROLE: &str = r#"
    INSERT INTO public.role (id, name, created_by, created_at, updated_by, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6)"#;

pub struct RoleFactory<T: Clone> {
    modifier_one: fn(x: &Role, ext: T) -> Role,
    modifier_many: fn(x: &Role, idx: usize, ext: T) -> Role,
}

impl<T: Clone> Default for RoleFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> RoleFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Role, ext: T) -> Role) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Role, idx: usize, ext: T) -> Role) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Role> {
        let data = RoleDummy::generate_one();
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(INSERT_ROLE)
            .bind(data.id)
            .bind(&data.name)
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
    ) -> anyhow::Result<Vec<Role>> {
        let mut result: Vec<Role> = vec![];
        for (idx, item) in RoleDummy::generate_many(num).iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            sqlx::query(INSERT_ROLE)
                .bind(item.id)
                .bind(&item.name)
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
struct RoleDummy {
    pub name: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl RoleDummy {
    fn into_role(self) -> Role {
        let id = Uuid::now_v7();
        Role {
            id,
            // role names are unique
            name: format!("{} {}", self.name, id.simple()),
            created_by: None,
            created_at: self.created_at,
            updated_by: None,
            updated_at: self.updated_at,
        }
    }

    pub fn generate_one() -> Role {
        Faker.fake::<RoleDummy>().into_role()
    }

    pub fn generate_many(num: u32) -> Vec<Role> {
        (0..num).map(|_| Self::generate_one()).collect()
    }
}
