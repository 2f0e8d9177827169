use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use storefront_cart::CartSnapshot;
use storefront_catalog::{InMemoryCatalog, Product, ProductCatalog};
use storefront_core::ProductId;
use storefront_pricing::compute;

fn seeded_catalog(products: usize) -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    for n in 0..products {
        catalog.seed(Product {
            id: ProductId::new(format!("prod_{n}")).unwrap(),
            name: format!("Product {n}"),
            price: 2_000 + n as u64,
            offer_price: 1_500 + n as u64,
            category: "bench".to_string(),
            image_url: String::new(),
        });
    }
    catalog
}

fn cart_of(size: usize) -> CartSnapshot {
    (0..size)
        .map(|n| (ProductId::new(format!("prod_{n}")).unwrap(), 1 + (n as u32 % 5)))
        .collect()
}

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("price_compute");
    for size in [1usize, 10, 100, 1_000] {
        let catalog = seeded_catalog(size);
        let cart = cart_of(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| compute(black_box(&cart), black_box(&catalog)).unwrap());
        });
    }
    group.finish();
}

fn bench_catalog_lookup(c: &mut Criterion) {
    let catalog = seeded_catalog(1_000);
    let id = ProductId::new("prod_500").unwrap();
    c.bench_function("catalog_lookup", |b| {
        b.iter(|| catalog.get(black_box(&id)));
    });
}

criterion_group!(benches, bench_compute, bench_catalog_lookup);
criterion_main!(benches);
