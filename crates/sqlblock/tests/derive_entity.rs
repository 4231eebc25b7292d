#![cfg(feature = "derive")]
#![allow(dead_code)]

use sqlblock::{Delete, Entity, Insert, Statement, Update, Value};

#[derive(Entity)]
struct Role {
    id: i64,
    role_name: String,
}

#[derive(Entity)]
struct Address {
    street1: String,
    street2: Option<String>,
}

#[derive(Entity)]
#[entity(table = "users")]
struct User {
    id: Option<i64>,
    name: String,
    #[entity(column = "age_years")]
    age: i32,
    #[entity(ignore)]
    created_at: String,
    #[entity(skip)]
    session_token: String,
    #[entity(nested)]
    address: Option<Address>,
    #[entity(relation)]
    roles: Vec<Role>,
}

#[derive(Entity)]
struct UserWallet {
    user_id: i64,
    balance: f64,
}

fn leng() -> User {
    User {
        id: None,
        name: "Leng".into(),
        age: 60,
        created_at: "2020-01-01".into(),
        session_token: "secret".into(),
        address: Some(Address {
            street1: "Jalan 1".into(),
            street2: None,
        }),
        roles: vec![Role {
            id: 1,
            role_name: "admin".into(),
        }],
    }
}

#[test]
fn data_map_follows_attributes() {
    let user = leng();
    let map = user.data_map();
    assert_eq!(
        map.keys().collect::<Vec<_>>(),
        vec!["name", "age_years", "created_at", "address", "roles"]
    );
    assert_eq!(map.get("age_years"), Some(&Value::Int(60)));
    assert!(map.get("address").is_some_and(Value::is_relation));
    assert!(map.get("roles").is_some_and(Value::is_relation));
    assert_eq!(user.ignore_fields(), vec!["created_at".to_string()]);
    assert_eq!(user.table_name(), "users");
}

#[test]
fn insert_skips_ignored_and_relations() {
    assert_eq!(
        Insert::new(leng()).to_sql(),
        "INSERT INTO users ( name, age_years ) VALUES ( 'Leng', 60 )"
    );
}

#[test]
fn update_skips_ignored_and_relations() {
    assert_eq!(
        Update::new(leng()).parameterize(true).to_sql(),
        "UPDATE users SET name = ?, age_years = ?"
    );
}

#[test]
fn table_defaults_to_snake_case_type_name() {
    let wallet = UserWallet {
        user_id: 7,
        balance: 1.5,
    };
    assert_eq!(wallet.table_name(), "");
    assert_eq!(
        Delete::new(&wallet).to_sql(),
        "DELETE FROM user_wallet WHERE user_id = 7 AND balance = 1.5"
    );
}
