use chrono::{Duration, Utc};
use diesel::prelude::*;
use moovi::domain::product::{NewProduct, ProductKind, ProductType};
use moovi::domain::types::{
    AccessoryCategory, BrandName, DiscountPercent, ProductColor, ProductModel, ProductPrice,
    StockCount, UserId, UserRole,
};
use moovi::domain::user::NewUser;
use moovi::repository::{
    BrandReader, BrandWriter, DieselRepository, OrderListQuery, OrderReader, ProductListQuery,
    ProductReader, ProductWriter, UserReader, UserWriter,
};
use moovi::schema::orders;

mod common;

fn new_cellphone(brand_id: Option<moovi::domain::types::BrandId>, model: &str) -> NewProduct {
    NewProduct {
        brand_id,
        model: ProductModel::new(model).unwrap(),
        color: ProductColor::new("Negro").unwrap(),
        description: None,
        list_price: ProductPrice::new(1000.0).unwrap(),
        cost_price: ProductPrice::new(700.0).unwrap(),
        discount: DiscountPercent::new(20).unwrap(),
        stock: StockCount::new(5).unwrap(),
        image_urls: vec![],
        shipping: false,
        installments: None,
        installment_price: None,
        kind: ProductKind::Cellphone {
            imei: None,
            specs: Default::default(),
        },
    }
}

fn new_accessory(model: &str, stock: i32) -> NewProduct {
    NewProduct {
        brand_id: None,
        model: ProductModel::new(model).unwrap(),
        color: ProductColor::new("Blanco").unwrap(),
        description: None,
        list_price: ProductPrice::new(300.0).unwrap(),
        cost_price: ProductPrice::new(100.0).unwrap(),
        discount: DiscountPercent::zero(),
        stock: StockCount::new(stock).unwrap(),
        image_urls: vec![],
        shipping: true,
        installments: None,
        installment_price: None,
        kind: ProductKind::Accessory {
            category: AccessoryCategory::new("Fundas").unwrap(),
        },
    }
}

#[test]
fn get_or_create_brand_is_case_insensitive_and_idempotent() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let first = repo
        .get_or_create_brand(&BrandName::new("Apple").unwrap())
        .expect("should create brand");
    let second = repo
        .get_or_create_brand(&BrandName::new("apple").unwrap())
        .expect("should reuse brand");

    assert_eq!(first.id, second.id);
    assert_eq!(second.name.as_str(), "Apple");

    let brands = repo.list_brands().expect("should list brands");
    assert_eq!(brands.len(), 1);

    let found = repo
        .get_brand_by_name(&BrandName::new("APPLE").unwrap())
        .expect("lookup should succeed");
    assert_eq!(found.unwrap().id, first.id);
}

#[test]
fn products_join_brand_and_resolve_pricing() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let brand = repo
        .get_or_create_brand(&BrandName::new("Samsung").unwrap())
        .expect("should create brand");

    repo.create_product(&new_cellphone(Some(brand.id), "Galaxy A54"))
        .expect("should create cellphone");
    repo.create_product(&new_accessory("Funda Galaxy", 3))
        .expect("should create accessory");

    let products = repo
        .list_products(ProductListQuery::default())
        .expect("should list products");
    assert_eq!(products.len(), 2);

    // Cellphones come first, in stored order.
    let cellphone = &products[0];
    assert!(cellphone.kind.is_cellphone());
    assert_eq!(cellphone.brand, "Samsung");
    assert_eq!(cellphone.sale_price, 800.0);
    assert_eq!(cellphone.original_price.unwrap(), 1000.0);

    // The accessory has no brand relation and keeps the sentinel label.
    let accessory = &products[1];
    assert_eq!(accessory.brand, "Sin Marca");
    assert_eq!(accessory.original_price, None);
    assert_eq!(accessory.sale_price, 300.0);

    let only_cellphones = repo
        .list_products(ProductListQuery::default().product_type(ProductType::Cellphone))
        .expect("should list cellphones");
    assert_eq!(only_cellphones.len(), 1);
}

#[test]
fn low_stock_excludes_out_of_stock_and_well_stocked() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    repo.create_product(&new_accessory("Agotado", 0)).unwrap();
    repo.create_product(&new_accessory("Por agotarse", 9)).unwrap();
    repo.create_product(&new_accessory("En el límite", 10)).unwrap();
    repo.create_product(&new_accessory("Bien provisto", 50)).unwrap();

    let low = repo
        .list_low_stock_products()
        .expect("should list low stock");
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].model, "Por agotarse");
}

#[test]
fn update_and_delete_products() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    repo.create_product(&new_accessory("Cargador", 4)).unwrap();
    let products = repo.list_products(ProductListQuery::default()).unwrap();
    let id = products[0].id;

    let mut updated = new_accessory("Cargador rápido", 8);
    updated.discount = DiscountPercent::new(50).unwrap();
    repo.update_product(id, &updated).expect("should update");

    let reloaded = repo
        .get_product(ProductType::Accessory, id)
        .unwrap()
        .expect("product should exist");
    assert_eq!(reloaded.model, "Cargador rápido");
    assert_eq!(reloaded.sale_price, 150.0);

    repo.delete_product(ProductType::Accessory, id)
        .expect("should delete");
    assert!(
        repo.get_product(ProductType::Accessory, id)
            .unwrap()
            .is_none()
    );
}

#[test]
fn successful_order_listing_filters_status_case_insensitively() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let now = Utc::now().naive_utc();
    let mut conn = test_db.pool().get().expect("should get connection");

    let rows = [
        ("MP-1", "Approved", 5000.0, Some(now)),
        ("MP-2", "accredited", 4000.0, Some(now - Duration::days(2))),
        ("MP-3", "REJECTED", 3000.0, Some(now)),
        ("MP-4", "pending", 2000.0, None),
        ("MP-5", "approved", 1000.0, Some(now - Duration::days(45))),
    ];
    for (payment_id, status, amount, date_approved) in rows {
        diesel::insert_into(orders::table)
            .values((
                orders::payment_id.eq(payment_id),
                orders::status.eq(status),
                orders::amount.eq(amount),
                orders::currency.eq("ARS"),
                orders::payer_email.eq("cliente@example.com"),
                orders::date_approved.eq(date_approved),
                orders::created_at.eq(now),
            ))
            .execute(&mut conn)
            .expect("should insert order");
    }

    let window_start = (Utc::now() - Duration::days(30)).naive_utc();
    let successful = repo
        .list_orders(
            OrderListQuery::default()
                .successful()
                .approved_since(window_start),
        )
        .expect("should list successful orders");

    let payment_ids: Vec<&str> = successful
        .iter()
        .map(|order| order.payment_id.as_str())
        .collect();
    assert_eq!(successful.len(), 2);
    assert!(payment_ids.contains(&"MP-1"));
    assert!(payment_ids.contains(&"MP-2"));

    let recent = repo
        .list_orders(OrderListQuery::default().limit(3))
        .expect("should list recent orders");
    assert_eq!(recent.len(), 3);
}

#[test]
fn order_items_come_from_payment_payload() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let now = Utc::now().naive_utc();
    let mut conn = test_db.pool().get().expect("should get connection");

    let payload = r#"{"additional_info":{"items":[{"title":"Funda","quantity":2,"unit_price":1500.0}]}}"#;
    diesel::insert_into(orders::table)
        .values((
            orders::payment_id.eq("MP-9"),
            orders::status.eq("approved"),
            orders::amount.eq(3000.0),
            orders::currency.eq("ARS"),
            orders::payer_email.eq("cliente@example.com"),
            orders::payment_data.eq(payload),
            orders::date_approved.eq(Some(now)),
            orders::created_at.eq(now),
        ))
        .execute(&mut conn)
        .expect("should insert order");

    let orders = repo
        .list_orders(OrderListQuery::default())
        .expect("should list orders");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].items.len(), 1);
    assert_eq!(orders[0].items[0].title, "Funda");
    assert_eq!(orders[0].items[0].quantity, 2);
}

#[test]
fn user_crud_round_trip() {
    let test_db = common::TestDb::new();
    let repo = DieselRepository::new(test_db.pool());

    let id = UserId::new("auth0|42").unwrap();
    repo.create_user(&NewUser {
        id: id.clone(),
        name: "Ana".to_string(),
        email: "ana@example.com".to_string(),
        role: UserRole::Vendedor,
    })
    .expect("should create user");

    let updated = NewUser {
        id: id.clone(),
        name: "Ana María".to_string(),
        email: "ana@example.com".to_string(),
        role: UserRole::Admin,
    };
    repo.update_user(&updated).expect("should update user");

    let user = repo
        .get_user_by_id(&id)
        .expect("lookup should succeed")
        .expect("user should exist");
    assert_eq!(user.name, "Ana María");
    assert_eq!(user.role, UserRole::Admin);

    repo.delete_user(&id).expect("should delete user");
    assert!(repo.list_users().expect("should list users").is_empty());
}
