//! Benchmarks for the hot paths of a webhook host and a storefront.
//!
//! Run with: `cargo bench --bench checkout_codec`

#![allow(missing_docs, reason = "Benchmark functions are self-documenting")]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use google_checkout::{
    command::{Cart, LineItem},
    credentials::MerchantCredentials,
    notification::Notification,
    webhook::{HandlerError, WebhookReceiver},
};
use rust_decimal::Decimal;

const NEW_ORDER: &[u8] = include_bytes!("../tests/fixtures/new-order-notification.xml");
const CHARGE_AMOUNT: &[u8] = include_bytes!("../tests/fixtures/charge-amount-notification.xml");

fn quiet_logging() {
    let _ = tracing_subscriber::fmt().with_max_level(tracing::Level::ERROR).try_init();
}

fn bench_classification(c: &mut Criterion) {
    quiet_logging();
    let mut group = c.benchmark_group("classify");

    for (name, raw) in [("new_order", NEW_ORDER), ("charge_amount", CHARGE_AMOUNT)] {
        group.bench_with_input(BenchmarkId::new("parse", name), raw, |b, raw| {
            b.iter(|| black_box(Notification::parse(black_box(raw))));
        });
    }

    let notification = Notification::parse(NEW_ORDER).unwrap_or_else(|e| panic!("{e}"));
    group.bench_function("deep_field_lookup", |b| {
        b.iter(|| black_box(notification.field(black_box("peepcode-order-number"))));
    });
    group.bench_function("acknowledgment", |b| {
        b.iter(|| black_box(notification.acknowledgment_xml()));
    });

    group.finish();
}

fn bench_webhook_receive(c: &mut Criterion) {
    quiet_logging();
    let receiver =
        WebhookReceiver::new("1234567890", |_: &Notification| -> Result<(), HandlerError> { Ok(()) });

    c.bench_function("webhook_receive_charge_amount", |b| {
        b.iter(|| black_box(receiver.receive(black_box(CHARGE_AMOUNT))));
    });
}

fn bench_cart(c: &mut Criterion) {
    let mut group = c.benchmark_group("cart");

    for items in [1_usize, 10, 100] {
        let mut cart = Cart::new(MerchantCredentials::new("1234567890", "HsYXFoZfHAqyLcCRYeH8qQ"));
        for i in 0..items {
            let item = LineItem::new(format!("Item {i}"), "Benchmark item.", Decimal::new(1999, 2))
                .with_item_id(format!("SKU-{i:04}"));
            cart.add_item(item).unwrap_or_else(|e| panic!("{e}"));
        }
        cart.set_merchant_private_data("session-id", "a1b2c3").unwrap_or_else(|e| panic!("{e}"));

        group.bench_with_input(BenchmarkId::new("serialize_and_sign", items), &cart, |b, cart| {
            b.iter(|| {
                let mut cart = black_box(cart).clone();
                // Any mutation drops the cached document.
                cart.set_continue_shopping_url("https://shop.example.com/");
                black_box(cart.signature())
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_classification, bench_webhook_receive, bench_cart);
criterion_main!(benches);
