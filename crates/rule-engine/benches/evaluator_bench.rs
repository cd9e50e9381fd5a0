//! 条件评估器性能基准测试
//!
//! 针对 ConditionEvaluator 的各种条件变体进行细粒度的性能测试。

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rule_engine::{CartItem, CartSnapshot, ConditionEvaluator, RuleCondition, RuleType};
use serde_json::json;
use std::hint::black_box;

fn create_cart(items: usize) -> CartSnapshot {
    CartSnapshot::new(
        120.0,
        (0..items)
            .map(|i| {
                CartItem::new(format!("p{}", i), format!("v{}", i), 1)
                    .with_collections([format!("C{}", i), format!("C{}", i + 1)])
            })
            .collect(),
        vec!["wholesale".to_string(), "VIP".to_string()],
        "us",
    )
}

/// 各条件变体基准
fn bench_condition_variants(c: &mut Criterion) {
    let mut group = c.benchmark_group("condition_variants");
    let cart = create_cart(5);

    let conditions = vec![
        (
            "cart_total",
            RuleCondition::parse(&RuleType::CartTotal, &json!({"operator": ">=", "value": 100})),
        ),
        (
            "collection",
            RuleCondition::parse(&RuleType::Collection, &json!({"collectionId": "C5"})),
        ),
        (
            "customer_tag",
            RuleCondition::parse(&RuleType::CustomerTag, &json!({"tag": "VIP"})),
        ),
        (
            "country",
            RuleCondition::parse(&RuleType::Country, &json!({"country": "US"})),
        ),
    ];

    for (name, condition) in &conditions {
        group.bench_function(*name, |b| {
            b.iter(|| ConditionEvaluator::matches(black_box(condition), black_box(&cart)))
        });
    }

    group.finish();
}

/// 集合条件随商品数的扩展性
fn bench_collection_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection_scaling");
    let condition = RuleCondition::parse(&RuleType::Collection, &json!({"collectionId": "missing"}));

    for items in [1, 10, 100] {
        let cart = create_cart(items);
        group.bench_with_input(BenchmarkId::from_parameter(items), &cart, |b, cart| {
            b.iter(|| ConditionEvaluator::matches(black_box(&condition), black_box(cart)))
        });
    }

    group.finish();
}

/// 条件解析
fn bench_condition_parse(c: &mut Criterion) {
    let payload = json!({"operator": ">", "value": 50});

    c.bench_function("parse_cart_total", |b| {
        b.iter(|| RuleCondition::parse(black_box(&RuleType::CartTotal), black_box(&payload)))
    });
}

criterion_group!(
    benches,
    bench_condition_variants,
    bench_collection_scaling,
    bench_condition_parse
);
criterion_main!(benches);
