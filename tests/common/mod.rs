#![allow(dead_code)]

use sea_orm::{ActiveValue::Set, Database, DatabaseConnection, DbErr, EntityTrait};
use sea_orm_migration::prelude::*;

pub mod product_entity;

use product_entity as product;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Eight products across four categories, created on consecutive days.
pub async fn setup_catalog_db() -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;

    let rows = [
        ("iPhone 15", Some("Apple phone"), 1, 999),
        ("Pixel 8", Some("Google phone"), 1, 599),
        ("Galaxy Tab", Some("Samsung tablet"), 2, 450),
        ("Phone Case", Some("Silicone case"), 3, 25),
        ("USB Cable", None, 3, 10),
        ("Headphones", Some("Noise cancelling"), 4, 300),
        ("Smartphone Stand", Some("Desk stand for a phone"), 3, 40),
        ("Laptop", Some("Thin and light"), 2, 1500),
    ];

    let models = rows
        .iter()
        .enumerate()
        .map(|(i, &(name, description, category_id, price))| product::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.map(str::to_string)),
            category_id: Set(category_id),
            price: Set(price),
            created_at: Set(format!("2024-01-{:02}", i + 1)),
            ..Default::default()
        });

    product::Entity::insert_many(models).exec(&db).await?;
    Ok(db)
}

/// `count` products named `Item 01`.. with prices 10, 20, ..
pub async fn setup_numbered_db(count: i32) -> Result<DatabaseConnection, DbErr> {
    let db = setup_test_db().await?;

    let models = (1..=count).map(|i| product::ActiveModel {
        name: Set(format!("Item {i:02}")),
        description: Set(None),
        category_id: Set(i % 3),
        price: Set(i * 10),
        created_at: Set(format!("2024-02-{i:02}")),
        ..Default::default()
    });

    product::Entity::insert_many(models).exec(&db).await?;
    Ok(db)
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateProductTable)]
    }
}

pub struct CreateProductTable;

impl MigrationName for CreateProductTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_product_table"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateProductTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(Products::Table)
            .if_not_exists()
            .col(
                ColumnDef::new(Products::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(Products::Name).string().not_null())
            .col(ColumnDef::new(Products::Description).text().null())
            .col(ColumnDef::new(Products::CategoryId).integer().not_null())
            .col(ColumnDef::new(Products::Price).integer().not_null())
            .col(ColumnDef::new(Products::CreatedAt).string().not_null())
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum Products {
    Table,
    Id,
    Name,
    Description,
    CategoryId,
    Price,
    CreatedAt,
}
