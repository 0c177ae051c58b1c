use chrono::{DateTime, FixedOffset};
use fake::{Dummy, Fake, Faker};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::model::{active_state::ActiveState, menu::Menu};

const INSERT_MENU: &str = r#"
    INSERT INTO public.menu (id, key_menu, name, url, menu_id, order_number, active,
        created_by, created_at, updated_by, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)"#;

/// Generated menus are active root menus. `generate_many` numbers them
/// 1..=n in generation order.
pub struct MenuFactory<T: Clone> {
    modifier_one: fn(x: &Menu, ext: T) -> Menu,
    modifier_many: fn(x: &Menu, idx: usize, ext: T) -> Menu,
}

impl<T: Clone> Default for MenuFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> MenuFactory<T> {
    pub fn new() -> Self {
        Self {
            modifier_one: |x, _| x.clone(),
            modifier_many: |x, _, _| x.clone(),
        }
    }

    pub fn modified_one(&mut self, modifier: fn(x: &Menu, ext: T) -> Menu) {
        self.modifier_one = modifier
    }

    pub fn modified_many(&mut self, modifier: fn(x: &Menu, idx: usize, ext: T) -> Menu) {
        self.modifier_many = modifier
    }

    pub async fn generate_one(&mut self, db: &PgPool, ext: T) -> anyhow::Result<Menu> {
        let data = MenuDummy::generate_one(1);
        let data = (self.modifier_one)(&data, ext);
        sqlx::query(INSERT_MENU)
            .bind(data.id)
            .bind(&data.key_menu)
            .bind(&data.name)
            .bind(&data.url)
            .bind(data.menu_id)
            .bind(data.order_number)
            .bind(data.active)
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
    ) -> anyhow::Result<Vec<Menu>> {
        let mut result: Vec<Menu> = vec![];
        for (idx, item) in MenuDummy::generate_many(num).iter().enumerate() {
            result.push((self.modifier_many)(item, idx, ext.clone()));
        }
        let mut tx = db.begin().await?;
        for item in result.iter() {
            sqlx::query(INSERT_MENU)
                .bind(item.id)
                .bind(&item.key_menu)
                .bind(&item.name)
                .bind(&item.url)
                .bind(item.menu_id)
                .bind(item.order_number)
                .bind(item.active)
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
struct MenuDummy {
    pub name: String,
    pub url: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl MenuDummy {
    fn into_menu(self, order_number: i32) -> Menu {
        let id = Uuid::now_v7();
        Menu {
            id,
            key_menu: format!("menu-{}", id.simple()),
            name: self.name,
            url: self.url,
            menu_id: None,
            order_number,
            active: ActiveState::Active,
            created_by: None,
            created_at: self.created_at,
            updated_by: None,
            updated_at: self.updated_at,
        }
    }

    pub fn generate_one(order_number: i32) -> Menu {
        Faker.fake::<MenuDummy>().into_menu(order_number)
    }

    pub fn generate_many(num: u32) -> Vec<Menu> {
        (0..num)
            .map(|idx| Self::generate_one(idx as i32 + 1))
            .collect()
    }
}
