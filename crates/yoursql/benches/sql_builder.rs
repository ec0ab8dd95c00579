use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use yoursql::{Record, SqlValue, SqlValuesCreator, ValuesColumns, insert_into, record, select};

/// Rows shaped like `{ id, name, score, tags }`.
fn build_rows(n: usize) -> Vec<Record> {
    (0..n)
        .map(|i| {
            record! {
                "id" => i as i64,
                "name" => format!("user'{i}"),
                "score" => i as f64 / 3.0,
                "tags" => vec!["a", "b"],
            }
        })
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/encode");
    let v = SqlValuesCreator::new();

    let inputs: [(&str, SqlValue); 3] = [
        ("text", SqlValue::from("it's a long-ish string with 'quotes'")),
        ("array", SqlValue::from((0..32).map(i64::from).collect::<Vec<_>>())),
        ("json", SqlValue::from(serde_json::json!({ "a": [1, 2, 3], "b": { "c": "d" } }))),
    ];
    for (name, value) in &inputs {
        group.bench_with_input(BenchmarkId::from_parameter(name), value, |b, value| {
            b.iter(|| black_box(v.encode(value)));
        });
    }

    group.finish();
}

fn bench_values_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/rows_to_values_list");
    let v = SqlValuesCreator::new();

    for n in [1, 10, 100, 1000] {
        let rows = build_rows(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| black_box(v.rows_to_values_list(rows, &ValuesColumns::Auto, false)));
        });
    }

    group.finish();
}

fn bench_chains(c: &mut Criterion) {
    let mut group = c.benchmark_group("sql_builder/chain");

    group.bench_function("select", |b| {
        b.iter(|| {
            let sql = select(["id", "name"])
                .map(|chain| {
                    chain
                        .from("users")
                        .inner_join("teams", "teams.id = users.team_id")
                        .where_(["users.active", "teams.size > 3"])
                        .order_by("users.created_at DESC")
                        .to_string()
                });
            black_box(sql)
        });
    });

    let v = SqlValuesCreator::new();
    let rows = build_rows(10);
    group.bench_function("insert_values", |b| {
        b.iter(|| {
            let list = v.rows_to_values_list(&rows, &ValuesColumns::Auto, false);
            let sql = list.and_then(|list| {
                insert_into("users", list.columns.as_slice())?
                    .values(&list)
                    .on_conflict(["id"])
                    .do_nothing()
                    .returning("*")
            });
            black_box(sql)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_encode, bench_values_list, bench_chains);
criterion_main!(benches);
