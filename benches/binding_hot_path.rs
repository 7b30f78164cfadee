#![allow(clippy::expect_used)]

use brrtbind::binder::{RawRequest, RequestBinder};
use brrtbind::cli::echo_dispatcher;
use brrtbind::response::BufferedSink;
use brrtbind::runtime_config::RuntimeConfig;
use brrtbind::schema::{parse_endpoints, RequestSchema};
use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use serde_json::Value;
use std::hint::black_box;

fn endpoint_file() -> &'static str {
    r#"
endpoints:
  - name: list_animals
    method: GET
    path: /zoo/animals
    schema:
      query:
        - { name: page, type: integer }
        - { name: limit, type: integer, required: false }
        - { name: verbose, type: boolean, required: false }
  - name: get_animal
    method: GET
    path: /zoo/animals/{id}
    schema:
      headers:
        - { name: x-api-key, type: string }
  - name: create_animal
    method: POST
    path: /zoo/animals
    schema:
      headers:
        - { name: x-api-key, type: string }
      body: { accept: [json, form], required: true }
  - name: habitat_section
    method: GET
    path: /zoo/{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}
"#
}

fn schema_of(name: &str) -> RequestSchema {
    parse_endpoints(endpoint_file())
        .expect("failed to parse endpoint file")
        .into_iter()
        .find(|e| e.name == name)
        .expect("endpoint present")
        .schema
}

fn bench_bind(c: &mut Criterion) {
    let binder = RequestBinder::new();

    let list = schema_of("list_animals");
    let list_req = RawRequest::new(Method::GET, "/zoo/animals?page=3&limit=50&verbose=true");
    c.bench_function("bind_query", |b| {
        b.iter(|| black_box(binder.bind::<()>(&list, black_box(&list_req))))
    });

    let create = schema_of("create_animal");
    let create_req = RawRequest::new(Method::POST, "/zoo/animals")
        .with_header("X-Api-Key", "k")
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"name":"okapi","legs":4,"tags":["rare","shy"]}"#);
    c.bench_function("bind_json_body", |b| {
        b.iter(|| black_box(binder.bind::<Value>(&create, black_box(&create_req))))
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let endpoints = parse_endpoints(endpoint_file()).expect("failed to parse endpoint file");
    let dispatcher =
        echo_dispatcher(&endpoints, RuntimeConfig::default()).expect("failed to build dispatcher");
    c.bench_function("dispatch_echo", |b| {
        let requests = [
            RawRequest::new(Method::GET, "/zoo/animals?page=1"),
            RawRequest::new(Method::GET, "/zoo/animals/123").with_header("x-api-key", "k"),
            RawRequest::new(Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
            RawRequest::new(Method::GET, "/nowhere"),
        ];
        b.iter(|| {
            for raw in &requests {
                let mut sink = BufferedSink::new();
                let res = dispatcher.dispatch(raw, &mut sink);
                black_box((&res, &sink));
            }
        })
    });
}

criterion_group!(benches, bench_bind, bench_dispatch);
criterion_main!(benches);
