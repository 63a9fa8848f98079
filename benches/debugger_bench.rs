use criterion::{black_box, criterion_group, criterion_main, Criterion};
use replay_debugger::demo;
use replay_debugger::resolver::DependencyResolver;
use replay_debugger::runtime::parser::convert_args;
use replay_debugger::DebugSessionManager;
use serde_json::json;
use std::sync::Arc;

fn bench_closure_resolution(c: &mut Criterion) {
    let program = demo::program().unwrap();
    let resolver = DependencyResolver::new(program.provider());

    c.bench_function("resolve_controller_closure", |b| {
        b.iter(|| {
            let resolution = resolver
                .resolve(black_box("demo.user.UserController#getUser(long)"))
                .unwrap();
            black_box(resolution.closure.len());
        })
    });
}

fn bench_argument_coercion(c: &mut Criterion) {
    let program = demo::program().unwrap();
    let resolver = DependencyResolver::new(program.provider());
    let echo = resolver.resolve("demo.util.Sample#echo(long)").unwrap();
    let parity = resolver
        .resolve("demo.util.Sample#parity(demo.util.Parity)")
        .unwrap();

    c.bench_function("coerce_numeric_argument", |b| {
        b.iter(|| {
            let args = convert_args(&echo.descriptor, Some(black_box(json!(42))), program.provider())
                .unwrap();
            black_box(args);
        })
    });

    c.bench_function("coerce_enum_argument", |b| {
        b.iter(|| {
            let args =
                convert_args(&parity.descriptor, Some(black_box(json!("ODD"))), program.provider())
                    .unwrap();
            black_box(args);
        })
    });
}

fn bench_session_start(c: &mut Criterion) {
    let manager = DebugSessionManager::new(Arc::new(demo::program().unwrap()));
    let input = json!(1);

    c.bench_function("start_container_session", |b| {
        b.iter(|| {
            let session = manager
                .start(black_box("demo.user.UserController#getUser(long)"), Some(&input))
                .unwrap();
            black_box(session.steps().len());
        })
    });

    c.bench_function("start_freestanding_session", |b| {
        b.iter(|| {
            let session = manager
                .start(black_box("demo.util.Sample#echo(long)"), Some(&input))
                .unwrap();
            black_box(session.steps().len());
        })
    });
}

criterion_group!(
    benches,
    bench_closure_resolution,
    bench_argument_coercion,
    bench_session_start
);
criterion_main!(benches);
