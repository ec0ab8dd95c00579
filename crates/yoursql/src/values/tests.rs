use super::*;
use crate::statement::insert_into;
use crate::record;
use chrono::{TimeZone, Utc};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Debug)]
struct Celsius(f64);

#[derive(Debug)]
struct Fahrenheit(f64);

#[derive(Debug)]
struct Opaque;

fn point_creator() -> SqlValuesCreator {
    let mut v = SqlValuesCreator::new();
    v.set_transformer(ObjectClass::of::<Point>(), |_: &SqlValuesCreator, value: &SqlValue| {
        match value {
            SqlValue::Object(obj) => obj
                .downcast_ref::<Point>()
                .map(|p| format!("point({},{})", p.x, p.y))
                .ok_or_else(|| SqlError::type_mismatch("Point", "object")),
            other => Err(SqlError::type_mismatch("Point", other.kind())),
        }
    });
    v
}

#[test]
fn encodes_primitives() {
    let v = SqlValuesCreator::new();
    assert_eq!(v.to_sql_str(SqlValue::Null).unwrap(), "NULL");
    assert_eq!(v.to_sql_str(SqlValue::Default).unwrap(), "DEFAULT");
    assert_eq!(v.to_sql_str(true).unwrap(), "TRUE");
    assert_eq!(v.to_sql_str(false).unwrap(), "FALSE");
    assert_eq!(v.to_sql_str(42).unwrap(), "42");
    assert_eq!(v.to_sql_str(-7i64).unwrap(), "-7");
    assert_eq!(v.to_sql_str(1.5).unwrap(), "1.5");
    assert_eq!(v.to_sql_str(1i128 << 70).unwrap(), "1180591620717411303424");
    assert_eq!(v.to_sql_str(None::<i32>).unwrap(), "NULL");
    assert_eq!(v.to_sql_str(Some("a")).unwrap(), "'a'");
}

#[test]
fn non_finite_floats_use_postgres_spelling() {
    let v = SqlValuesCreator::new();
    assert_eq!(v.to_sql_str(f64::NAN).unwrap(), "NaN");
    assert_eq!(v.to_sql_str(f64::INFINITY).unwrap(), "Infinity");
    assert_eq!(v.to_sql_str(f64::NEG_INFINITY).unwrap(), "-Infinity");
}

#[test]
fn quotes_strings_by_doubling_single_quotes() {
    let v = SqlValuesCreator::new();
    assert_eq!(v.to_sql_str("a'b'c").unwrap(), "'a''b''c'");
    assert_eq!(v.to_sql_str("").unwrap(), "''");
    assert_eq!(v.to_sql_str("''").unwrap(), "''''''");
    assert_eq!(quote("it's"), "'it''s'");
}

#[test]
fn null_and_default_pass_through_every_hint() {
    let v = SqlValuesCreator::new();
    let hints = [
        ManualType::Number,
        ManualType::String,
        ManualType::Boolean,
        ManualType::BigInt,
        ManualType::Object,
        ManualType::Class(ObjectClass::Date),
        ManualType::Class(ObjectClass::of::<Point>()),
    ];
    for hint in &hints {
        assert_eq!(v.encode_as(&SqlValue::Null, hint).unwrap(), "NULL");
        assert_eq!(v.encode_as(&SqlValue::Default, hint).unwrap(), "DEFAULT");
    }
}

#[test]
fn asserted_primitive_must_match() {
    let v = SqlValuesCreator::new();
    assert_eq!(v.encode_as(&"x".into(), &ManualType::String).unwrap(), "'x'");

    let err = v.encode_as(&SqlValue::Int(1), &ManualType::String).unwrap_err();
    match err {
        SqlError::TypeMismatch { expected, actual } => {
            assert_eq!(expected, "string");
            assert_eq!(actual, "number");
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(matches!(
        v.encode_as(&SqlValue::BigInt(1), &ManualType::Number),
        Err(SqlError::TypeMismatch { .. })
    ));
}

#[test]
fn arrays_infer_element_type_from_first_defined_element() {
    let v = SqlValuesCreator::new();
    let items = SqlValue::Array(vec![
        SqlValue::Int(1),
        SqlValue::Int(2),
        SqlValue::Default,
        SqlValue::Null,
    ]);
    assert_eq!(v.encode(&items).unwrap(), "ARRAY[1,2,DEFAULT,NULL]");
    assert_eq!(v.to_sql_str(vec!["a", "b'"]).unwrap(), "ARRAY['a','b''']");
    assert_eq!(v.to_sql_str(Vec::<i32>::new()).unwrap(), "NULL");

    let leading_null = SqlValue::Array(vec![SqlValue::Null, "x".into()]);
    assert_eq!(v.encode(&leading_null).unwrap(), "ARRAY[NULL,'x']");
}

#[test]
fn heterogeneous_array_fails_under_first_type() {
    let v = SqlValuesCreator::new();
    let items = SqlValue::Array(vec![SqlValue::Int(1), "x".into()]);
    assert!(matches!(v.encode(&items), Err(SqlError::TypeMismatch { .. })));
}

#[test]
fn nested_arrays_and_dates() {
    let v = SqlValuesCreator::new();
    let d = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
    assert_eq!(v.to_sql_str(d).unwrap(), "'2024-01-02T03:04:05.000Z'");

    let nested = SqlValue::from(vec![vec![1, 2], vec![3]]);
    assert_eq!(v.encode(&nested).unwrap(), "ARRAY[ARRAY[1,2],ARRAY[3]]");

    let dates = SqlValue::from(vec![d, d]);
    assert_eq!(
        v.encode(&dates).unwrap(),
        "ARRAY['2024-01-02T03:04:05.000Z','2024-01-02T03:04:05.000Z']"
    );
}

#[test]
fn plain_objects_fall_back_to_json() {
    let v = SqlValuesCreator::new();
    let value = SqlValue::from(serde_json::json!({ "a": 1, "b": "it's" }));
    assert_eq!(v.encode(&value).unwrap(), r#"'{"a":1,"b":"it''s"}'"#);
    assert_eq!(
        v.encode_as(&value, &ManualType::Class(ObjectClass::Json)).unwrap(),
        r#"'{"a":1,"b":"it''s"}'"#
    );
}

#[test]
fn objects_with_json_form_fall_back_to_json() {
    #[derive(serde::Serialize)]
    struct Tag {
        name: String,
    }

    let v = SqlValuesCreator::new();
    let obj = SqlObject::with_json(Tag { name: "x".into() }).unwrap();
    assert_eq!(v.encode(&obj.into()).unwrap(), r#"'{"name":"x"}'"#);
}

#[test]
fn unclaimed_object_without_json_is_unsupported() {
    let v = SqlValuesCreator::new();
    assert!(matches!(
        v.encode(&SqlValue::object(Opaque)),
        Err(SqlError::UnsupportedType(_))
    ));
}

#[test]
fn custom_transformer_claims_its_class() {
    let v = point_creator();
    let p = SqlValue::object(Point { x: 1, y: -2 });
    assert_eq!(v.encode(&p).unwrap(), "point(1,-2)");
    assert_eq!(
        v.encode_as(&p, &ManualType::Class(ObjectClass::of::<Point>())).unwrap(),
        "point(1,-2)"
    );
    assert_eq!(v.to_sql_str(vec![p.clone(), SqlValue::Null]).unwrap(), "ARRAY[point(1,-2),NULL]");
}

#[test]
fn asserted_class_without_transformer_is_unregistered() {
    let v = SqlValuesCreator::new();
    let p = SqlValue::object(Point { x: 0, y: 0 });
    let err = v
        .encode_as(&p, &ManualType::Class(ObjectClass::of::<Point>()))
        .unwrap_err();
    assert!(matches!(err, SqlError::UnregisteredType(_)));
}

#[test]
fn asserted_class_rejects_primitives_and_other_classes() {
    let v = point_creator();
    let hint = ManualType::Class(ObjectClass::of::<Point>());
    assert!(matches!(
        v.encode_as(&SqlValue::Int(1), &hint),
        Err(SqlError::TypeMismatch { .. })
    ));
    assert!(matches!(
        v.encode_as(&SqlValue::object(Opaque), &hint),
        Err(SqlError::TypeMismatch { .. })
    ));
}

#[test]
fn predicate_transformer_matches_several_types() {
    let celsius = ObjectClass::of::<Celsius>();
    let fahrenheit = ObjectClass::of::<Fahrenheit>();

    let mut v = SqlValuesCreator::new();
    v.set_transformer_when(
        celsius,
        move |value: &SqlValue| value.class().is_some_and(|c| c == celsius || c == fahrenheit),
        |_: &SqlValuesCreator, value: &SqlValue| match value {
            SqlValue::Object(obj) => {
                if let Some(c) = obj.downcast_ref::<Celsius>() {
                    Ok(format!("{}", c.0))
                } else if let Some(f) = obj.downcast_ref::<Fahrenheit>() {
                    Ok(format!("{}", (f.0 - 32.0) * 5.0 / 9.0))
                } else {
                    Err(SqlError::type_mismatch("temperature", "object"))
                }
            }
            other => Err(SqlError::type_mismatch("temperature", other.kind())),
        },
    );

    assert_eq!(v.encode(&SqlValue::object(Celsius(20.0))).unwrap(), "20");
    assert_eq!(v.encode(&SqlValue::object(Fahrenheit(212.0))).unwrap(), "100");
    assert!(v.has_transformer(celsius));
    assert!(!v.has_transformer(fahrenheit));
}

#[test]
fn arrays_of_predicate_matched_objects() {
    let celsius = ObjectClass::of::<Celsius>();
    let fahrenheit = ObjectClass::of::<Fahrenheit>();

    let mut v = SqlValuesCreator::new();
    v.set_transformer_when(
        celsius,
        move |value: &SqlValue| value.class().is_some_and(|c| c == celsius || c == fahrenheit),
        |_: &SqlValuesCreator, value: &SqlValue| match value {
            SqlValue::Object(obj) => match obj.downcast_ref::<Fahrenheit>() {
                Some(f) => Ok(format!("{}", (f.0 - 32.0) * 5.0 / 9.0)),
                None => obj
                    .downcast_ref::<Celsius>()
                    .map(|c| format!("{}", c.0))
                    .ok_or_else(|| SqlError::type_mismatch("temperature", "object")),
            },
            other => Err(SqlError::type_mismatch("temperature", other.kind())),
        },
    );

    let f = SqlValue::object(Fahrenheit(212.0));
    assert_eq!(v.encode(&f).unwrap(), "100");
    assert_eq!(v.to_sql_str(vec![f.clone()]).unwrap(), "ARRAY[100]");

    let mixed = SqlValue::Array(vec![
        SqlValue::Null,
        f,
        SqlValue::object(Celsius(5.0)),
    ]);
    assert_eq!(v.encode(&mixed).unwrap(), "ARRAY[NULL,100,5]");
}

#[test]
fn arrays_of_json_objects_fall_back_per_element() {
    #[derive(serde::Serialize)]
    struct Tag {
        name: String,
    }

    let v = SqlValuesCreator::new();
    let tag = |name: &str| SqlValue::from(SqlObject::with_json(Tag { name: name.into() }).unwrap());
    assert_eq!(v.encode(&tag("x")).unwrap(), r#"'{"name":"x"}'"#);
    assert_eq!(
        v.to_sql_str(vec![tag("x"), tag("y'z")]).unwrap(),
        r#"ARRAY['{"name":"x"}','{"name":"y''z"}']"#
    );

    let plain = SqlValue::from(serde_json::json!([{ "a": 1 }, { "a": 2 }]));
    assert_eq!(v.encode(&plain).unwrap(), r#"ARRAY['{"a":1}','{"a":2}']"#);
}

#[test]
fn arrays_of_unclaimed_objects_stay_unsupported() {
    let v = SqlValuesCreator::new();
    let items = SqlValue::Array(vec![SqlValue::object(Opaque)]);
    assert!(matches!(v.encode(&items), Err(SqlError::UnsupportedType(_))));

    let v = point_creator();
    let items = SqlValue::Array(vec![SqlValue::object(Point { x: 1, y: 2 }), SqlValue::object(Opaque)]);
    assert!(matches!(v.encode(&items), Err(SqlError::TypeMismatch { .. })));
}

#[test]
fn first_registered_match_wins() {
    let mut v = SqlValuesCreator::empty();
    v.set_transformer_when(ObjectClass::Json, |_: &SqlValue| true, |_: &SqlValuesCreator, _: &SqlValue| {
        Ok("'any'".to_string())
    });
    v.set_transformer(ObjectClass::Date, |_: &SqlValuesCreator, _: &SqlValue| Ok("'date'".to_string()));

    let d = SqlValue::from(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(v.encode(&d).unwrap(), "'any'");
}

#[test]
fn replacing_keeps_position_and_remove_restores_fallback() {
    let mut v = SqlValuesCreator::new();
    v.set_transformer(ObjectClass::Date, |_: &SqlValuesCreator, _: &SqlValue| Ok("now()".to_string()));
    let d = SqlValue::from(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
    assert_eq!(v.encode(&d).unwrap(), "now()");
    assert_eq!(format!("{v:?}"), r#"SqlValuesCreator { transformers: ["Array", "Date"] }"#);

    assert!(v.remove_transformer(ObjectClass::Date));
    assert!(!v.remove_transformer(ObjectClass::Date));
    assert!(!v.has_transformer(ObjectClass::Date));
    assert_eq!(v.encode(&d).unwrap(), r#"'"2024-01-01T00:00:00.000Z"'"#);
}

#[test]
fn bulk_registration() {
    let mut v = SqlValuesCreator::empty();
    let encode: EncodeFn = Arc::new(|_: &SqlValuesCreator, _: &SqlValue| Ok("'p'".to_string()));
    v.set_transformers([(ObjectClass::of::<Point>(), encode)]);
    assert_eq!(v.encode(&SqlValue::object(Point { x: 0, y: 0 })).unwrap(), "'p'");
}

#[test]
fn encoding_is_pure() {
    let v = SqlValuesCreator::new();
    let value = SqlValue::from(vec![SqlValue::from("a"), SqlValue::Null]);
    assert_eq!(v.encode(&value).unwrap(), v.encode(&value).unwrap());
}

#[test]
fn row_union_drops_keys_undefined_everywhere() {
    let v = SqlValuesCreator::new();
    let rows = vec![
        record! { "a" => 1, "b" => 2, "z" => SqlValue::Default },
        record! { "a" => 3, "c" => 4 },
    ];

    let list = v.rows_to_values_list(&rows, &ValuesColumns::Auto, false).unwrap();
    assert_eq!(list.columns, ["a", "b", "c"]);
    assert_eq!(list.text, "(1,2,DEFAULT),\n(3,DEFAULT,4)");

    let list = v.rows_to_values_list(&rows, &ValuesColumns::Auto, true).unwrap();
    assert_eq!(list.columns, ["a", "b", "z", "c"]);
    assert_eq!(list.text, "(1,2,DEFAULT,DEFAULT),\n(3,DEFAULT,DEFAULT,4)");
}

#[test]
fn explicit_keys_select_and_order_columns() {
    let v = SqlValuesCreator::new();
    let rows = vec![record! { "a" => 1, "b" => "x" }];
    let list = v.rows_to_values_list(&rows, &["b", "missing"].into(), false).unwrap();
    assert_eq!(list.columns, ["b", "missing"]);
    assert_eq!(list.text, "('x',DEFAULT)");
}

#[test]
fn typed_columns_cast_first_row_only() {
    let v = SqlValuesCreator::new();
    let mut config = IndexMap::new();
    config.insert("id".to_string(), ColumnToValueConfig::new().sql_type("int8"));
    config.insert("name".to_string(), ColumnToValueConfig::new().assert_type(ManualType::String));

    let rows = vec![
        record! { "id" => 1, "name" => "a" },
        record! { "id" => 2 },
    ];
    let list = v.rows_to_values_list(&rows, &config.into(), false).unwrap();
    assert_eq!(list.text, "(1::int8,'a'),\n(2,DEFAULT)");
}

#[test]
fn row_errors_carry_row_index_and_column() {
    let v = SqlValuesCreator::new();
    let mut config = IndexMap::new();
    config.insert("n".to_string(), ColumnToValueConfig::new().assert_type(ManualType::Number));

    let rows = vec![record! { "n" => 1 }, record! { "n" => "two" }];
    let err = v.rows_to_values_list(&rows, &config.into(), false).unwrap_err();
    let message = err.to_string();
    assert!(std::error::Error::source(&err).is_some());
    match err {
        SqlError::RowEncode { row, column, source } => {
            assert_eq!(row, 1);
            assert_eq!(column, "n");
            assert!(matches!(*source, SqlError::TypeMismatch { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(message.contains("row 1"));
    assert!(message.contains("'n'"));
}

#[test]
fn empty_rows_are_rejected() {
    let v = SqlValuesCreator::new();
    assert!(matches!(
        v.rows_to_values_list(&[], &ValuesColumns::Auto, false),
        Err(SqlError::EmptyInput(_))
    ));
    assert!(matches!(
        v.build_values_as_clause("v", &[], &IndexMap::new()),
        Err(SqlError::EmptyInput(_))
    ));
}

#[test]
fn row_to_values_renders_one_tuple_body() {
    let v = SqlValuesCreator::new();
    let row = record! { "a" => 1, "b" => "x", "c" => SqlValue::Null };
    assert_eq!(v.row_to_values(&row, &ValuesColumns::Auto).unwrap(), "1,'x',NULL");
    assert_eq!(v.row_to_values(&row, &["c", "a"].into()).unwrap(), "NULL,1");
}

#[test]
fn values_as_clause_casts_first_row_and_fills_defaults() {
    let v = SqlValuesCreator::new();
    let mut types = IndexMap::new();
    types.insert("id".to_string(), ColumnToValueConfig::new().sql_type("int"));
    types.insert(
        "name".to_string(),
        ColumnToValueConfig::new().sql_type("text").sql_default("'?'"),
    );
    types.insert("note".to_string(), ColumnToValueConfig::new());

    let rows = vec![
        record! { "id" => 1, "name" => "a", "note" => "n" },
        record! { "id" => 2 },
    ];
    let clause = v.build_values_as_clause("v", &rows, &types).unwrap();
    assert_eq!(
        clause.to_string(),
        "(VALUES (1::int,'a'::text,'n'),(2,'?',NULL)) AS v(id,name,note)"
    );

    assert!(matches!(
        v.build_values_as_clause("v", &rows, &IndexMap::new()),
        Err(SqlError::EmptyColumns)
    ));
}

#[test]
fn values_list_feeds_insert() {
    let v = SqlValuesCreator::new();
    let rows = vec![record! { "a" => 1, "b" => "x" }, record! { "a" => 2, "b" => "y" }];
    let list = v.rows_to_values_list(&rows, &ValuesColumns::Auto, false).unwrap();
    let sql = insert_into("t", list.columns.as_slice()).unwrap().values(&list);
    assert_eq!(sql.to_string(), "INSERT INTO t(a,b)\nVALUES\n(1,'x'),\n(2,'y')");
}

#[test]
fn record_reads_missing_keys_as_default() {
    let row = record! { "a" => 1 };
    assert!(row.value("missing").is_default());
    assert!(row.get("missing").is_none());
    assert_eq!(row.keys().collect::<Vec<_>>(), ["a"]);
}

#[test]
fn record_from_serialize_keeps_field_order() {
    #[derive(serde::Serialize)]
    struct User {
        name: String,
        age: u32,
        email: Option<String>,
    }

    let row = Record::from_serialize(&User {
        name: "al'ice".into(),
        age: 30,
        email: None,
    })
    .unwrap();
    assert_eq!(row.keys().collect::<Vec<_>>(), ["name", "age", "email"]);

    let v = SqlValuesCreator::new();
    assert_eq!(v.row_to_values(&row, &ValuesColumns::Auto).unwrap(), "'al''ice',30,NULL");

    assert!(matches!(
        Record::from_serialize(&[1, 2]),
        Err(SqlError::TypeMismatch { .. })
    ));
}
