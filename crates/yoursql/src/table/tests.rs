use super::*;
use crate::error::SqlError;
use crate::record;
use crate::values::{ManualType, ObjectClass};
use chrono::{TimeZone, Utc};

fn creator() -> Arc<SqlValuesCreator> {
    Arc::new(SqlValuesCreator::new())
}

fn users() -> TableDefined {
    TableDefined::new("users")
        .column(
            "id",
            ColumnMeta::new("int8")
                .value_type(ManualType::Number)
                .not_null()
                .sql_default("nextval('users_id_seq')"),
        )
        .column("name", ColumnMeta::new("text").value_type(ManualType::String).not_null())
        .column("tags", ColumnMeta::new("text").value_type(ManualType::String).array())
        .column(
            "created_at",
            ColumnMeta::new("timestamptz").value_type(ManualType::Class(ObjectClass::Date)),
        )
}

#[test]
fn db_table_binds_chain_builders() {
    let t = DbTable::new("users").with_columns(["id", "name"]);

    assert_eq!(t.select_all().unwrap().to_string(), "SELECT id,name\nFROM users");
    assert_eq!(DbTable::new("t").select_all().unwrap().to_string(), "SELECT *\nFROM t");
    assert_eq!(
        t.select_as("u.id", "u").unwrap().where_("u.id = 1").to_string(),
        "SELECT u.id\nFROM users AS u\nWHERE u.id = 1"
    );
    assert_eq!(
        t.insert(["name"], "('a')").unwrap().to_string(),
        "INSERT INTO users(name)\nVALUES\n('a')"
    );
    assert_eq!(
        t.insert_select(["name"], "SELECT name FROM staging").unwrap().to_string(),
        "INSERT INTO users(name)\nSELECT name FROM staging"
    );
    assert_eq!(
        t.update("SET name = 'b'").unwrap().where_("id = 1").to_string(),
        "UPDATE users\nSET name = 'b'\nWHERE id = 1"
    );
    assert_eq!(t.delete().where_("id = 1").to_string(), "DELETE FROM users\nWHERE id = 1");
}

#[test]
fn table_query_inserts_records() {
    let q = DbTableQuery::new("users", creator());
    let sql = q
        .insert_rows(&[
            record! { "name" => "alice", "age" => 30 },
            record! { "name" => "bob", "email" => "b@x.io" },
        ])
        .unwrap()
        .returning("id")
        .unwrap();
    assert_eq!(
        sql.to_string(),
        "INSERT INTO users(name,age,email)\nVALUES\n('alice',30,DEFAULT),\n('bob',DEFAULT,'b@x.io')\nRETURNING id"
    );

    assert!(matches!(q.insert_rows(&[]), Err(SqlError::EmptyInput(_))));
}

#[test]
fn table_query_updates_from_host_values() {
    let q = DbTableQuery::new("users", creator());
    let sql = q
        .update_values(&record! { "name" => "o'neil", "age" => SqlValue::Default, "active" => true })
        .unwrap()
        .where_("id = 1");
    assert_eq!(sql.to_string(), "UPDATE users\nSET\nname= 'o''neil',active= TRUE\nWHERE id = 1");

    let err = q.update_values(&record! { "age" => SqlValue::Default }).unwrap_err();
    assert!(matches!(err, SqlError::EmptyAssignment));
}

#[test]
fn checker_rejects_bad_rows() {
    let defined = users();
    let checker = defined.checker();

    assert!(checker.check_insert(&record! { "name" => "a" }).is_ok());

    let missing = checker.check_insert(&record! { "tags" => vec!["x"] }).unwrap_err();
    assert!(missing.to_string().contains("users.name"));

    let null = checker.check_insert(&record! { "name" => SqlValue::Null }).unwrap_err();
    assert!(null.to_string().contains("NULL is not allowed"));

    let unknown = checker.check_insert(&record! { "name" => "a", "nope" => 1 }).unwrap_err();
    assert!(unknown.to_string().contains("users.nope: unknown column"));

    let wrong = checker.check_insert(&record! { "name" => 5 }).unwrap_err();
    assert!(matches!(wrong, SqlError::Validation(_)));

    let not_array = checker.check_insert(&record! { "name" => "a", "tags" => "x" }).unwrap_err();
    assert!(not_array.to_string().contains("expected an array"));

    let bad_element = checker
        .check_insert(&record! { "name" => "a", "tags" => SqlValue::from(vec![SqlValue::from("x"), SqlValue::Int(1)]) })
        .unwrap_err();
    assert!(bad_element.to_string().contains("users.tags"));

    let bad_date = checker.check_insert(&record! { "name" => "a", "created_at" => "today" }).unwrap_err();
    assert!(bad_date.to_string().contains("expected Date"));
}

#[test]
fn checker_allows_partial_updates_and_reports_row_index() {
    let defined = users();
    let checker = TypeChecker::new(&defined);

    assert!(checker.check_update(&record! { "tags" => SqlValue::Null }).is_ok());
    assert!(checker.check_update(&record! { "name" => SqlValue::Null }).is_err());

    let err = checker
        .check_rows(&[record! { "name" => "a" }, record! { "name" => 1 }])
        .unwrap_err();
    assert!(err.to_string().starts_with("Validation error: row 1: users.name"));
}

#[test]
fn your_table_inserts_only_used_columns_with_casts() {
    let table = YourTable::new(users(), creator());
    let d = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();

    let sql = table
        .insert_checked(&[
            record! { "name" => "a", "tags" => vec!["x", "y"] },
            record! { "name" => "b", "created_at" => d },
        ])
        .unwrap();
    assert_eq!(
        sql.to_string(),
        "INSERT INTO users(name,tags,created_at)\nVALUES\n('a'::text,ARRAY['x','y']::text[],DEFAULT),\n('b',DEFAULT,'2024-05-06T07:08:09.000Z')"
    );

    assert!(table.insert_checked(&[record! { "tags" => vec!["x"] }]).is_err());
}

#[test]
fn your_table_update_and_values_as() {
    let table = YourTable::new(users(), creator());

    let sql = table.update_checked(&record! { "name" => "c" }).unwrap().where_("id = 3");
    assert_eq!(sql.to_string(), "UPDATE users\nSET\nname= 'c'\nWHERE id = 3");
    assert!(table.update_checked(&record! { "name" => 3 }).is_err());

    let values = table
        .values_as("v", &[record! { "id" => 1, "name" => "a" }, record! { "name" => "b" }])
        .unwrap();
    assert_eq!(
        values.to_string(),
        "(VALUES (1::int8,'a'::text,NULL::text[],NULL::timestamptz),(nextval('users_id_seq'),'b',NULL,NULL)) AS v(id,name,tags,created_at)"
    );

    let sql = crate::statement::select("v.name")
        .unwrap()
        .from(&values)
        .to_string();
    assert!(sql.starts_with("SELECT v.name\nFROM (VALUES "));
    assert_eq!(table.query().table().columns(), ["id", "name", "tags", "created_at"]);
}
