//! Integration tests for the order fulfillment engine and guards.
//!
//! These tests verify the atomicity properties: whole-unit rollback
//! on any failure, exact stock restoration on replacement and
//! deletion, and the uniqueness/lifecycle guards.

use chrono::NaiveDate;
use common::{CustomerId, Money, ProductId};
use domain::{
    AccountService, CustomerService, DomainError, NewAccount, NewCustomer, NewOrder, NewProduct,
    OrderService, OrderUpdate, ProductService,
};
use record_store::MemoryStore;

struct Services {
    store: MemoryStore,
    customers: CustomerService,
    accounts: AccountService,
    products: ProductService,
    orders: OrderService,
}

fn services() -> Services {
    let store = MemoryStore::new();
    Services {
        customers: CustomerService::new(store.clone()),
        accounts: AccountService::new(store.clone()),
        products: ProductService::new(store.clone()),
        orders: OrderService::new(store.clone()),
        store,
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

async fn seed_customer(s: &Services) -> CustomerId {
    s.customers
        .create_customer(NewCustomer {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone: "555-0001".into(),
        })
        .await
        .unwrap()
        .id
}

async fn seed_product(s: &Services, name: &str, stock: u32) -> ProductId {
    s.products
        .create_product(NewProduct {
            name: name.into(),
            price: Money::from_cents(250),
            stock,
        })
        .await
        .unwrap()
        .id
}

async fn stock_of(s: &Services, id: ProductId) -> u32 {
    s.store.read().await.product(id).unwrap().stock
}

mod order_creation {
    use super::*;

    #[tokio::test]
    async fn coalesces_duplicate_references_and_reserves_stock() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "Widget", 10).await;
        let b = seed_product(&s, "Gadget", 10).await;

        let order = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, b, a, a],
            })
            .await
            .unwrap();

        assert_eq!(order.lines.len(), 2);
        assert_eq!(order.line(a).unwrap().quantity, 3);
        assert_eq!(order.line(b).unwrap().quantity, 1);
        assert_eq!(stock_of(&s, a).await, 7);
        assert_eq!(stock_of(&s, b).await, 9);
    }

    #[tokio::test]
    async fn unknown_customer_fails_without_touching_stock() {
        let s = services();
        let a = seed_product(&s, "Widget", 10).await;

        let err = s
            .orders
            .create_order(NewOrder {
                customer_id: CustomerId::new(99),
                date: date(),
                product_refs: vec![a],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::CustomerNotFound(_)));
        assert_eq!(stock_of(&s, a).await, 10);
    }

    #[tokio::test]
    async fn unknown_product_rolls_back_the_whole_unit() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "Widget", 10).await;
        let missing = ProductId::new(99);

        let err = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, missing],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::ProductNotFound(id) if id == missing));
        assert_eq!(stock_of(&s, a).await, 10);
        assert!(s.orders.list_orders().await.is_empty());
    }

    #[tokio::test]
    async fn insufficiency_reverts_products_that_passed_their_check() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "Widget", 10).await;
        let b = seed_product(&s, "Gadget", 1).await;

        let err = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, a, b, b],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InsufficientStock { product_id } if product_id == b));
        // a passed its own check before b failed; both are untouched
        assert_eq!(stock_of(&s, a).await, 10);
        assert_eq!(stock_of(&s, b).await, 1);
        assert!(s.orders.list_orders().await.is_empty());
    }

    #[tokio::test]
    async fn empty_reference_list_yields_zero_line_order() {
        let s = services();
        let customer = seed_customer(&s).await;

        let order = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![],
            })
            .await
            .unwrap();

        assert!(order.lines.is_empty());
    }

    #[tokio::test]
    async fn stock_can_be_drained_to_exactly_zero() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "Widget", 3).await;

        s.orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, a, a],
            })
            .await
            .unwrap();

        assert_eq!(stock_of(&s, a).await, 0);

        let err = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a],
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
    }
}

mod order_replacement {
    use super::*;

    #[tokio::test]
    async fn replacement_nets_against_restored_stock() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "A", 10).await;
        let b = seed_product(&s, "B", 10).await;
        let c = seed_product(&s, "C", 10).await;

        let order = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, a, b],
            })
            .await
            .unwrap();

        let updated = s
            .orders
            .update_order(
                order.id,
                OrderUpdate {
                    product_refs: Some(vec![a, c, c, c]),
                    ..OrderUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.line(a).unwrap().quantity, 1);
        assert_eq!(updated.line(c).unwrap().quantity, 3);
        assert!(updated.line(b).is_none());
        assert_eq!(stock_of(&s, a).await, 9); // 10 - 2 + 2 - 1
        assert_eq!(stock_of(&s, b).await, 10);
        assert_eq!(stock_of(&s, c).await, 7);
    }

    #[tokio::test]
    async fn failed_replacement_leaves_order_and_stock_intact() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "A", 10).await;
        let b = seed_product(&s, "B", 10).await;
        let c = seed_product(&s, "C", 2).await;

        let order = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, a, b],
            })
            .await
            .unwrap();

        let err = s
            .orders
            .update_order(
                order.id,
                OrderUpdate {
                    product_refs: Some(vec![a, c, c, c]),
                    ..OrderUpdate::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InsufficientStock { product_id } if product_id == c));
        // the release of a and b was rolled back with everything else
        let kept = s.orders.get_order(order.id).await.unwrap().order;
        assert_eq!(kept.line(a).unwrap().quantity, 2);
        assert_eq!(kept.line(b).unwrap().quantity, 1);
        assert_eq!(stock_of(&s, a).await, 8);
        assert_eq!(stock_of(&s, b).await, 9);
        assert_eq!(stock_of(&s, c).await, 2);
    }

    #[tokio::test]
    async fn replacement_with_unknown_customer_rolls_everything_back() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "A", 10).await;
        let b = seed_product(&s, "B", 10).await;

        let order = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, a],
            })
            .await
            .unwrap();

        // line replacement would succeed on its own; the customer
        // check after it must still undo the whole unit
        let err = s
            .orders
            .update_order(
                order.id,
                OrderUpdate {
                    customer_id: Some(CustomerId::new(99)),
                    product_refs: Some(vec![b, b, b]),
                    ..OrderUpdate::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::CustomerNotFound(_)));
        let kept = s.orders.get_order(order.id).await.unwrap().order;
        assert_eq!(kept.customer_id, customer);
        assert_eq!(kept.line(a).unwrap().quantity, 2);
        assert!(kept.line(b).is_none());
        assert_eq!(stock_of(&s, a).await, 8);
        assert_eq!(stock_of(&s, b).await, 10);
    }

    #[tokio::test]
    async fn replacement_can_reuse_stock_held_by_the_order_itself() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "A", 3).await;

        let order = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, a, a],
            })
            .await
            .unwrap();
        assert_eq!(stock_of(&s, a).await, 0);

        // re-validation happens against the restored pre-order level
        let updated = s
            .orders
            .update_order(
                order.id,
                OrderUpdate {
                    product_refs: Some(vec![a, a]),
                    ..OrderUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.line(a).unwrap().quantity, 2);
        assert_eq!(stock_of(&s, a).await, 1);
    }

    #[tokio::test]
    async fn field_only_update_leaves_lines_untouched() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "A", 10).await;

        let order = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, a],
            })
            .await
            .unwrap();

        let new_date = NaiveDate::from_ymd_opt(2024, 7, 2).unwrap();
        let updated = s
            .orders
            .update_order(
                order.id,
                OrderUpdate {
                    date: Some(new_date),
                    ..OrderUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.date, new_date);
        assert_eq!(updated.lines, order.lines);
        assert_eq!(stock_of(&s, a).await, 8);
    }
}

mod order_deletion {
    use super::*;

    #[tokio::test]
    async fn delete_restores_stock_exactly_once() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "A", 10).await;
        let b = seed_product(&s, "B", 10).await;

        let order = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, a, b],
            })
            .await
            .unwrap();

        s.orders.delete_order(order.id).await.unwrap();
        assert_eq!(stock_of(&s, a).await, 10);
        assert_eq!(stock_of(&s, b).await, 10);

        let err = s.orders.delete_order(order.id).await.unwrap_err();
        assert!(matches!(err, DomainError::OrderNotFound(id) if id == order.id));
        assert_eq!(stock_of(&s, a).await, 10);
    }
}

mod order_detail {
    use super::*;

    #[tokio::test]
    async fn totals_are_computed_from_joined_products() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "A", 10).await; // 250 cents each

        let order = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, a, a],
            })
            .await
            .unwrap();

        let detail = s.orders.get_order(order.id).await.unwrap();
        assert_eq!(detail.total_quantity, 3);
        assert_eq!(detail.total_price, Money::from_cents(750));
        assert_eq!(detail.products.len(), 1);
        assert_eq!(detail.products[0].name, "A");
    }

    #[tokio::test]
    async fn totals_clamp_instead_of_wrapping_on_extreme_prices() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = s
            .products
            .create_product(NewProduct {
                name: "A".into(),
                price: Money::from_cents(i64::MAX),
                stock: 10,
            })
            .await
            .unwrap()
            .id;

        let order = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, a, a],
            })
            .await
            .unwrap();

        let detail = s.orders.get_order(order.id).await.unwrap();
        assert_eq!(detail.total_quantity, 3);
        assert_eq!(detail.total_price, Money::from_cents(i64::MAX));
    }
}

mod account_guard {
    use super::*;

    #[tokio::test]
    async fn second_account_for_same_customer_is_a_conflict() {
        let s = services();
        let customer = seed_customer(&s).await;

        s.accounts
            .create_account(NewAccount {
                customer_id: customer,
                username: "ada".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();

        let err = s
            .accounts
            .create_account(NewAccount {
                customer_id: customer,
                username: "ada2".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AccountAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict_across_customers() {
        let s = services();
        let first = seed_customer(&s).await;
        let second = s
            .customers
            .create_customer(NewCustomer {
                name: "Bob".into(),
                email: "bob@example.com".into(),
                phone: "555-0002".into(),
            })
            .await
            .unwrap()
            .id;

        s.accounts
            .create_account(NewAccount {
                customer_id: first,
                username: "shared".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();

        let err = s
            .accounts
            .create_account(NewAccount {
                customer_id: second,
                username: "shared".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UsernameTaken { .. }));
    }

    #[tokio::test]
    async fn account_requires_existing_customer() {
        let s = services();

        let err = s
            .accounts
            .create_account(NewAccount {
                customer_id: CustomerId::new(42),
                username: "ghost".into(),
                password: "pw".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::CustomerNotFound(_)));
        assert!(s.accounts.list_accounts().await.is_empty());
    }

    #[tokio::test]
    async fn username_change_rechecks_uniqueness() {
        let s = services();
        let first = seed_customer(&s).await;
        let second = s
            .customers
            .create_customer(NewCustomer {
                name: "Bob".into(),
                email: "bob@example.com".into(),
                phone: "555-0002".into(),
            })
            .await
            .unwrap()
            .id;

        for (customer_id, username) in [(first, "ada"), (second, "bob")] {
            s.accounts
                .create_account(NewAccount {
                    customer_id,
                    username: username.into(),
                    password: "pw".into(),
                })
                .await
                .unwrap();
        }

        let err = s
            .accounts
            .update_account(
                second,
                domain::AccountUpdate {
                    username: Some("ada".into()),
                    password: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UsernameTaken { .. }));

        // keeping your own username is not a conflict
        s.accounts
            .update_account(
                second,
                domain::AccountUpdate {
                    username: Some("bob".into()),
                    password: Some("new-pw".into()),
                },
            )
            .await
            .unwrap();
    }
}

mod product_guard {
    use super::*;

    #[tokio::test]
    async fn referenced_product_cannot_be_deleted() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "A", 10).await;

        let order = s
            .orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a],
            })
            .await
            .unwrap();

        let err = s.products.delete_product(a).await.unwrap_err();
        assert!(matches!(err, DomainError::ProductInUse { product_id } if product_id == a));

        // once the last referencing order is gone, deletion succeeds
        s.orders.delete_order(order.id).await.unwrap();
        s.products.delete_product(a).await.unwrap();
        assert!(s.products.list_products(None).await.is_empty());
    }

    #[tokio::test]
    async fn restock_past_capacity_is_rejected_without_mutation() {
        let s = services();
        let a = seed_product(&s, "A", 4_000_000_000).await;

        let err = s
            .products
            .restock_product(a, 400_000_000)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::StockOverflow { product_id } if product_id == a));
        assert_eq!(stock_of(&s, a).await, 4_000_000_000);

        // a fitting amount still lands
        let restocked = s.products.restock_product(a, 100).await.unwrap();
        assert_eq!(restocked.stock, 4_000_000_100);
    }

    #[tokio::test]
    async fn restock_rejects_zero() {
        let s = services();
        let a = seed_product(&s, "A", 1).await;

        let err = s.products.restock_product(a, 0).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidQuantity { quantity: 0 }));

        let restocked = s.products.restock_product(a, 4).await.unwrap();
        assert_eq!(restocked.stock, 5);
    }
}

mod customer_cascade {
    use super::*;

    #[tokio::test]
    async fn deleting_a_customer_removes_orders_account_and_restores_stock() {
        let s = services();
        let customer = seed_customer(&s).await;
        let a = seed_product(&s, "A", 10).await;

        s.accounts
            .create_account(NewAccount {
                customer_id: customer,
                username: "ada".into(),
                password: "pw".into(),
            })
            .await
            .unwrap();
        s.orders
            .create_order(NewOrder {
                customer_id: customer,
                date: date(),
                product_refs: vec![a, a],
            })
            .await
            .unwrap();

        s.customers.delete_customer(customer).await.unwrap();

        assert!(s.orders.list_orders().await.is_empty());
        assert!(s.accounts.list_accounts().await.is_empty());
        assert_eq!(stock_of(&s, a).await, 10);
        // the now-unreferenced product can be deleted
        s.products.delete_product(a).await.unwrap();
    }

    #[tokio::test]
    async fn name_filter_matches_substrings() {
        let s = services();
        for (name, email) in [("Ada Lovelace", "ada@example.com"), ("Bob", "bob@example.com")] {
            s.customers
                .create_customer(NewCustomer {
                    name: name.into(),
                    email: email.into(),
                    phone: "555-0000".into(),
                })
                .await
                .unwrap();
        }

        let hits = s.customers.list_customers(Some("Love")).await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Ada Lovelace");
        assert_eq!(s.customers.list_customers(None).await.len(), 2);
    }
}
