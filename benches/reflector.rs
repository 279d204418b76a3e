//! Benchmarks for reflector construction and property access.
//!
//! Covers the hot paths of a data-mapping layer:
//! - Reflector lookups with and without the type cache
//! - Property path tokenizing
//! - Accessor invocation through method and field invokers
//! - Case-insensitive name resolution

extern crate propscope;

use criterion::{criterion_group, criterion_main, Criterion};
use propscope::prelude::*;
use std::{hint::black_box, sync::Arc};

/// A bean with `width` properties plus a private `id` field, extending a small base class.
fn fixture(width: usize) -> (Arc<TypeRegistry>, TypeRc) {
    let registry = Arc::new(TypeRegistry::new().unwrap());
    let string = registry.string().unwrap();
    let int = registry.get_primitive(PrimitiveKind::I4).unwrap();

    let base = TypeBuilder::class(registry.clone(), "bench", "Base")
        .field("id", &int, MemberFlags::PRIVATE)
        .property("createdBy", &string)
        .build()
        .unwrap();
    let mut builder = TypeBuilder::class(registry.clone(), "bench", "Wide")
        .extends(&base)
        .default_constructor();
    for i in 0..width {
        builder = builder.property(&format!("column{i}"), &string);
    }
    let ty = builder.build().unwrap();
    (registry, ty)
}

/// Benchmark a cached lookup, the path taken by every call after the first.
fn bench_find_cached(c: &mut Criterion) {
    let (registry, ty) = fixture(32);
    let factory = ReflectorFactory::new(registry);
    factory.find_for_type(&ty).unwrap();

    c.bench_function("reflector_find_cached", |b| {
        b.iter(|| black_box(factory.find_for_type(black_box(&ty)).unwrap()));
    });
}

/// Benchmark a full reflector build with the cache disabled.
fn bench_find_uncached(c: &mut Criterion) {
    let (registry, ty) = fixture(32);
    let factory = ReflectorFactory::with_config(registry, ReflectorConfig::uncached());

    c.bench_function("reflector_find_uncached", |b| {
        b.iter(|| black_box(factory.find_for_type(black_box(&ty)).unwrap()));
    });
}

/// Benchmark splitting a nested indexed path into its segments.
fn bench_tokenize_path(c: &mut Criterion) {
    let path = "orders[0].items[2].product.sku";

    c.bench_function("tokenizer_segments", |b| {
        b.iter(|| {
            let count = PropertyTokenizer::new(black_box(path)).segments().count();
            black_box(count)
        });
    });
}

/// Benchmark reading a property through its getter method.
fn bench_invoke_getter(c: &mut Criterion) {
    let (registry, ty) = fixture(8);
    let factory = ReflectorFactory::new(registry);
    let reflector = factory.find_for_type(&ty).unwrap();
    let object = Object::new(&ty).unwrap();
    reflector
        .set_invoker("column3")
        .unwrap()
        .invoke(&object, &[Value::from("value")])
        .unwrap();
    let getter = reflector.get_invoker("column3").unwrap();

    c.bench_function("invoke_getter_method", |b| {
        b.iter(|| black_box(getter.invoke(black_box(&object), &[]).unwrap()));
    });
}

/// Benchmark reading a private field after escalation.
fn bench_invoke_field(c: &mut Criterion) {
    let (registry, ty) = fixture(8);
    let factory = ReflectorFactory::new(registry);
    let reflector = factory.find_for_type(&ty).unwrap();
    let object = Object::new(&ty).unwrap();
    let getter = reflector.get_invoker("id").unwrap();

    c.bench_function("invoke_field_getter", |b| {
        b.iter(|| black_box(getter.invoke(black_box(&object), &[]).unwrap()));
    });
}

/// Benchmark resolving a property name case-insensitively.
fn bench_find_property_name(c: &mut Criterion) {
    let (registry, ty) = fixture(32);
    let factory = ReflectorFactory::new(registry);
    let reflector = factory.find_for_type(&ty).unwrap();

    c.bench_function("find_property_name", |b| {
        b.iter(|| black_box(reflector.find_property_name(black_box("COLUMN17"))));
    });
}

criterion_group!(
    benches,
    bench_find_cached,
    bench_find_uncached,
    bench_tokenize_path,
    bench_invoke_getter,
    bench_invoke_field,
    bench_find_property_name,
);
criterion_main!(benches);
