use super::*;
use crate::block::Block;
use crate::entity::Record;
use crate::ops::{eq, gt, lt};

struct Address {
    user_id: i64,
    street1: String,
    street2: Option<String>,
}

impl Entity for Address {
    fn data_map(&self) -> DataMap {
        let mut map = DataMap::new();
        map.insert("userId", self.user_id);
        map.insert("street1", self.street1.as_str());
        if let Some(street2) = &self.street2 {
            map.insert("street2", street2);
        }
        map
    }
}

fn address() -> Address {
    Address {
        user_id: 1,
        street1: "Jalan 123".to_string(),
        street2: Some("Taman OUG".to_string()),
    }
}

fn user(id: i64, name: &str) -> Record {
    Record::new("users").set("id", id).set("name", name)
}

fn user_with_relations() -> Record {
    let role = Record::new("user_role").set("role_name", "admin");
    Record::new("users")
        .set("age", 60)
        .set("id", 12)
        .set("roles", vec![Value::Nested(role.data_map())])
        .set("address", Value::Nested(DataMap::from_iter([("street1", "jalan 123")])))
}

// ==================== Insert ====================

#[test]
fn test_insert_literals() {
    assert_eq!(
        Insert::new(user(1, "O'Connor")).to_sql(),
        "INSERT INTO users ( id, name ) VALUES ( 1, 'O''Connor' )"
    );
}

#[test]
fn test_insert_parameterized() {
    let insert = Insert::new(user(1, "O'Connor")).parameterize(true);
    assert_eq!(insert.to_sql(), "INSERT INTO users ( id, name ) VALUES ( ?, ? )");
    assert_eq!(
        insert.params(),
        vec![Value::Int(1), Value::Text("O'Connor".to_string())]
    );
}

#[test]
fn test_insert_literal_mode_has_no_params() {
    assert!(Insert::new(user(1, "a")).params().is_empty());
}

#[test]
fn test_insert_column_list_only() {
    let sql = Insert::columns(Record::new("users"), ["id", "name"]).to_sql();
    assert_eq!(sql, "INSERT INTO users ( id, name )");
}

#[test]
fn test_insert_select() {
    let sql = Insert::columns(Record::new("users"), ["id", "name"])
        .select(
            Query::new()
                .fields(["user_id", "fullname"])
                .from("customer")
                .where_(eq("status", 0)),
        )
        .to_sql();
    assert_eq!(
        sql,
        "INSERT INTO users ( id, name ) SELECT user_id, fullname FROM customer WHERE status = 0"
    );
}

#[test]
fn test_insert_escape_table() {
    let sql = Insert::new(user(1, "Leng")).escape_table(true).to_sql();
    assert_eq!(sql, "INSERT INTO \"users\" ( id, name ) VALUES ( 1, 'Leng' )");
}

#[test]
fn test_insert_table_from_type_name() {
    assert_eq!(
        Insert::new(address()).to_sql(),
        "INSERT INTO address ( user_id, street1, street2 ) VALUES ( 1, 'Jalan 123', 'Taman OUG' )"
    );
}

#[test]
fn test_insert_unset_option_is_absent() {
    let addr = Address {
        street2: None,
        ..address()
    };
    assert_eq!(
        Insert::new(addr).to_sql(),
        "INSERT INTO address ( user_id, street1 ) VALUES ( 1, 'Jalan 123' )"
    );
}

#[test]
fn test_insert_skips_relations() {
    assert_eq!(
        Insert::new(user_with_relations()).to_sql(),
        "INSERT INTO users ( age, id ) VALUES ( 60, 12 )"
    );
}

#[test]
fn test_insert_skips_ignored_fields() {
    let record = user(1, "Leng").set("password_confirm", "x").ignore("password_confirm");
    assert_eq!(
        Insert::new(record).to_sql(),
        "INSERT INTO users ( id, name ) VALUES ( 1, 'Leng' )"
    );
}

#[test]
fn test_insert_select_on_duplicate() {
    let mut updates = DataMap::new();
    updates.insert("repeated", Block::new("repeated", "+", "1"));
    updates.insert("is_modified", true);

    let sql = Insert::columns(Record::new("users"), ["id", "name"])
        .select(
            Query::new()
                .fields(["user_id", "fullname"])
                .from("customer")
                .where_(eq("status", 0)),
        )
        .on_duplicate_update(updates)
        .to_sql();
    assert_eq!(
        sql,
        "INSERT INTO users ( id, name ) SELECT user_id, fullname FROM customer WHERE status = 0 \
         ON DUPLICATE KEY UPDATE repeated = repeated + 1, is_modified = true"
    );
}

#[test]
fn test_insert_select_params_bind_between_values_and_duplicates() {
    let mut updates = DataMap::new();
    updates.insert("is_modified", true);

    let insert = Insert::columns(Record::new("users"), ["id", "name"])
        .parameterize(true)
        .select(
            Query::new()
                .fields(["user_id", "fullname"])
                .from("customer")
                .where_(eq("fullname", "Leng")),
        )
        .select_params(["Leng"])
        .on_duplicate_update(updates);
    assert_eq!(
        insert.to_sql(),
        "INSERT INTO users ( id, name ) SELECT user_id, fullname FROM customer WHERE fullname = ? \
         ON DUPLICATE KEY UPDATE is_modified = ?"
    );
    assert_eq!(insert.params(), vec![Value::from("Leng"), Value::Bool(true)]);
}

#[test]
fn test_insert_select_params_without_select_are_dropped() {
    let insert = Insert::new(user(1, "Leng")).parameterize(true).select_params(["x"]);
    assert_eq!(insert.params(), vec![Value::Int(1), Value::from("Leng")]);
}

#[test]
fn test_insert_on_duplicate_parameterized() {
    let mut updates = DataMap::new();
    updates.insert("repeated", Block::new("repeated", "+", "?"));
    updates.insert("is_modified", true);
    updates.insert("skipped", Value::Null);

    let record = Record::new("users").set("id", 3).set("name", "Joey Tan").set("age", 43);
    let insert = Insert::new(record).parameterize(true).on_duplicate_update(updates);
    assert_eq!(
        insert.to_sql(),
        "INSERT INTO users ( id, name, age ) VALUES ( ?, ?, ? ) \
         ON DUPLICATE KEY UPDATE repeated = repeated + ?, is_modified = ?"
    );
    assert_eq!(
        insert.params(),
        vec![
            Value::Int(3),
            Value::Text("Joey Tan".to_string()),
            Value::Int(43),
            Value::Bool(true),
        ]
    );
}

#[test]
fn test_insert_ignore() {
    assert_eq!(
        Insert::new(user(1, "Leng")).ignore().to_sql(),
        "INSERT IGNORE INTO users ( id, name ) VALUES ( 1, 'Leng' )"
    );
}

#[test]
fn test_insert_empty_entity() {
    assert_eq!(Insert::new(Record::new("users")).to_sql(), "INSERT INTO users");
}

#[test]
fn test_insert_placeholder_count_matches_literal_count() {
    let record = user(7, "x").set("nickname", "y").set("active", true);
    let literal = Insert::new(&record).to_sql();
    let param = Insert::new(&record).parameterize(true);

    let values = |sql: &str| -> usize {
        let start = sql.find("VALUES ( ").map(|i| i + 9).unwrap_or(0);
        sql[start..].trim_end_matches(" )").split(", ").count()
    };
    assert_eq!(values(&literal), 4);
    assert_eq!(values(&param.to_sql()), 4);
    assert_eq!(param.params().len(), 4);
}

#[test]
fn test_parameterized_null_is_inlined() {
    let record = user(1, "a").set("deleted_at", Value::Null);
    let insert = Insert::new(record).parameterize(true);
    assert_eq!(
        insert.to_sql(),
        "INSERT INTO users ( id, name, deleted_at ) VALUES ( ?, ?, NULL )"
    );
    assert_eq!(insert.params().len(), 2);
}

// ==================== Update ====================

#[test]
fn test_update_literals() {
    assert_eq!(
        Update::new(user(1, "O'Connor")).to_sql(),
        "UPDATE users SET id = 1, name = 'O''Connor'"
    );
}

#[test]
fn test_update_parameterized() {
    let update = Update::new(user(1, "O'Connor")).parameterize(true);
    assert_eq!(update.to_sql(), "UPDATE users SET id = ?, name = ?");
    assert_eq!(update.params().len(), 2);
}

#[test]
fn test_update_where_query() {
    let sql = Update::new(Record::new("users").set("name", "Leng"))
        .where_query(Query::new().where_all([gt("id", 100), eq("age", 60)]))
        .to_sql();
    assert_eq!(sql, "UPDATE users SET name = 'Leng' WHERE id > 100 AND age = 60");
}

#[test]
fn test_update_where_blocks() {
    let sql = Update::new(Record::new("users").set("name", "Leng"))
        .where_blocks([gt("id", 100), eq("age", 60)])
        .to_sql();
    assert_eq!(sql, "UPDATE users SET name = 'Leng' WHERE id > 100 AND age = 60");
}

#[test]
fn test_update_where_params_follow_set_values() {
    let update = Update::new(Record::new("users").set("name", "Leng"))
        .parameterize(true)
        .where_blocks([eq("email", "a@b.c")])
        .where_params(["a@b.c"]);
    assert_eq!(update.to_sql(), "UPDATE users SET name = ? WHERE email = ?");
    assert_eq!(
        update.params(),
        vec![Value::Text("Leng".to_string()), Value::Text("a@b.c".to_string())]
    );
}

#[test]
fn test_update_skips_relations() {
    assert_eq!(
        Update::new(user_with_relations()).to_sql(),
        "UPDATE users SET age = 60, id = 12"
    );
}

#[test]
fn test_update_escape_table() {
    assert_eq!(
        Update::new(user(1, "Leng")).escape_table(true).to_sql(),
        "UPDATE \"users\" SET id = 1, name = 'Leng'"
    );
}

#[test]
fn test_update_table_from_type_name() {
    assert_eq!(
        Update::new(address()).to_sql(),
        "UPDATE address SET user_id = 1, street1 = 'Jalan 123', street2 = 'Taman OUG'"
    );
}

#[test]
fn test_update_ignores_entity_for_filter() {
    // No WHERE is derived for updates.
    assert_eq!(Update::new(user(1, "a")).to_sql(), "UPDATE users SET id = 1, name = 'a'");
}

// ==================== Delete ====================

#[test]
fn test_delete_by_example() {
    let record = Record::new("users").set("name", "O'Connor").set("id", 111);
    assert_eq!(
        Delete::new(record).to_sql(),
        "DELETE FROM users WHERE name = 'O''Connor' AND id = 111"
    );
}

#[test]
fn test_delete_by_example_parameterized() {
    let record = Record::new("users").set("name", "O'Connor").set("id", 111);
    let delete = Delete::new(record).parameterize(true);
    assert_eq!(delete.to_sql(), "DELETE FROM users WHERE name = ? AND id = ?");
    assert_eq!(
        delete.params(),
        vec![Value::Text("O'Connor".to_string()), Value::Int(111)]
    );
}

#[test]
fn test_delete_where_blocks() {
    let sql = Delete::new(user(1, "Leng"))
        .where_blocks([gt("id", 100), lt("age", 80), eq("name", "Leng")])
        .to_sql();
    assert_eq!(sql, "DELETE FROM users WHERE id > 100 AND age < 80 AND name = ?");
}

#[test]
fn test_delete_escape_table() {
    let sql = Delete::new(user(1, "Leng"))
        .escape_table(true)
        .where_blocks([gt("id", 100), lt("age", 80), eq("name", "Leng")])
        .to_sql();
    assert_eq!(
        sql,
        "DELETE FROM \"users\" WHERE id > 100 AND age < 80 AND name = ?"
    );
}

#[test]
fn test_delete_where_query_wins_over_entity() {
    let delete = Delete::new(user(1, "Leng"))
        .where_query(Query::new().where_(gt("id", 100)))
        .where_params(Vec::<Value>::new());
    assert_eq!(delete.to_sql(), "DELETE FROM users WHERE id > 100");
    assert!(delete.params().is_empty());
}

#[test]
fn test_delete_skips_relations() {
    assert_eq!(
        Delete::new(user_with_relations()).to_sql(),
        "DELETE FROM users WHERE age = 60 AND id = 12"
    );
}

#[test]
fn test_delete_null_becomes_is_null() {
    let record = Record::new("users").set("id", 1).set("deleted_at", Value::Null);
    assert_eq!(
        Delete::new(record).to_sql(),
        "DELETE FROM users WHERE id = 1 AND deleted_at IS NULL"
    );
}

#[test]
fn test_delete_table_from_type_name() {
    let addr = Address {
        street2: None,
        ..address()
    };
    assert_eq!(
        Delete::new(addr).to_sql(),
        "DELETE FROM address WHERE user_id = 1 AND street1 = 'Jalan 123'"
    );
}

#[test]
fn test_delete_empty_entity() {
    assert_eq!(Delete::new(Record::new("users")).to_sql(), "DELETE FROM users");
}

// ==================== Merge ====================

#[test]
fn test_merge() {
    assert_eq!(
        Merge::new(user(1, "Leng")).to_sql(),
        "MERGE INTO users ( id, name ) VALUES ( 1, 'Leng' )"
    );
    assert_eq!(
        Merge::new(user(1, "Leng")).parameterize(true).escape_table(true).to_sql(),
        "MERGE INTO \"users\" ( id, name ) VALUES ( ?, ? )"
    );
}

#[test]
fn test_merge_select() {
    let sql = Merge::columns(Record::new("users"), ["id", "name"])
        .select(Query::new().fields(["user_id", "fullname"]).from("customer"))
        .to_sql();
    assert_eq!(sql, "MERGE INTO users ( id, name ) SELECT user_id, fullname FROM customer");
}

#[test]
fn test_merge_select_params_and_ignored_fields() {
    let record = user(1, "Leng").set("password_confirm", "x").ignore("password_confirm");
    assert_eq!(
        Merge::new(record).to_sql(),
        "MERGE INTO users ( id, name ) VALUES ( 1, 'Leng' )"
    );

    let merge = Merge::columns(Record::new("users"), ["id", "name"])
        .select(
            Query::new()
                .fields(["user_id", "fullname"])
                .from("customer")
                .where_(eq("fullname", "Leng")),
        )
        .select_params(["Leng"]);
    assert_eq!(merge.params(), vec![Value::from("Leng")]);
}
