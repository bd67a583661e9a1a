//! End-to-end behaviour of the fallback resolver

use agent_provider::{
    AttemptOutcome, ProviderConfig, ProviderDescriptor, ProviderError, ProviderKind,
    ProviderResolver, Requirement, StaticEnvironment,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

type Handle = &'static str;

fn needs(name: &'static str, var: &str) -> ProviderDescriptor<Handle> {
    ProviderDescriptor::new(name, vec![Requirement::env_var(var)], move |_| Ok(name))
}

fn failing(name: &'static str) -> ProviderDescriptor<Handle> {
    ProviderDescriptor::new(name, vec![], move |_| Err(format!("{name} is down").into()))
}

fn resolver(
    table: Vec<ProviderDescriptor<Handle>>,
    env: StaticEnvironment,
) -> ProviderResolver<Handle> {
    ProviderResolver::new(table, Arc::new(env)).unwrap()
}

#[test]
fn first_viable_provider_wins_over_later_viable_ones() {
    let env = StaticEnvironment::new()
        .with_var("B_KEY", "b")
        .with_var("C_KEY", "c");
    let table = vec![
        needs("a", "A_KEY"),
        needs("b", "B_KEY"),
        needs("c", "C_KEY"),
    ];
    let resolver = resolver(table, env);

    let resolution = resolver.resolve().unwrap();
    assert_eq!(resolution.handle, "b");
    assert_eq!(resolution.provider, "b");

    let usage = resolver.usage();
    assert_eq!(usage.total_attempts, 1);
    assert!(!usage.per_provider.contains_key("c"));
}

#[test]
fn nothing_configured_exhausts_with_zero_attempts() {
    let table = vec![needs("a", "A_KEY"), needs("b", "B_KEY")];
    let resolver = resolver(table, StaticEnvironment::new());

    match resolver.resolve() {
        Err(ProviderError::AllProvidersExhausted { attempts }) => {
            assert_eq!(attempts.len(), 2);
            assert!(attempts.iter().all(|a| a.is_skip()));
            assert_eq!(attempts[0].provider, "a");
            assert_eq!(
                attempts[1].to_string(),
                "b: skipped: missing requirements (env B_KEY)"
            );
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
    assert_eq!(resolver.usage().total_attempts, 0);
}

#[test]
fn all_constructors_failing_records_one_failure_each() {
    let table = vec![failing("a"), failing("b"), failing("c")];
    let resolver = resolver(table, StaticEnvironment::new());

    let Err(ProviderError::AllProvidersExhausted { attempts }) = resolver.resolve() else {
        panic!("expected exhaustion");
    };
    assert_eq!(attempts.len(), 3);
    assert_eq!(
        attempts[2].outcome,
        AttemptOutcome::Failed {
            message: "c is down".into()
        }
    );

    let usage = resolver.usage();
    assert_eq!(usage.total_attempts, 3);
    for name in ["a", "b", "c"] {
        assert_eq!(usage.per_provider[name].failures, 1);
        assert_eq!(usage.per_provider[name].successes, 0);
    }
}

#[test]
fn resolution_is_idempotent() {
    let env = StaticEnvironment::new()
        .with_var("A_KEY", "a")
        .with_var("B_KEY", "b");
    let resolver = resolver(vec![needs("a", "A_KEY"), needs("b", "B_KEY")], env);

    let first = resolver.resolve().unwrap();
    let second = resolver.resolve().unwrap();
    assert_eq!(first.provider, second.provider);
    assert_eq!(first.handle, second.handle);
}

#[test]
fn repeated_resolutions_count_successes_for_one_provider() {
    let env = StaticEnvironment::new()
        .with_var("A_KEY", "a")
        .with_var("B_KEY", "b");
    let resolver = resolver(vec![needs("a", "A_KEY"), needs("b", "B_KEY")], env);

    for _ in 0..5 {
        resolver.resolve().unwrap();
    }

    let usage = resolver.usage();
    assert_eq!(usage.per_provider["a"].successes, 5);
    assert!((usage.per_provider["a"].success_rate - 1.0).abs() < f64::EPSILON);
    assert!(
        usage
            .per_provider
            .iter()
            .filter(|(name, _)| name.as_str() != "a")
            .all(|(_, stats)| stats.successes == 0)
    );
}

#[test]
fn bedrock_skipped_when_only_openai_key_is_set() {
    let table = vec![
        ProviderDescriptor::new(
            "bedrock",
            vec![Requirement::any_of([
                Requirement::env_var("AWS_ACCESS_KEY_ID"),
                Requirement::credential_file("~/.aws/credentials"),
            ])],
            |_| Ok("bedrock"),
        ),
        needs("openai", "OPENAI_API_KEY"),
    ];
    let env = StaticEnvironment::new()
        .with_var("HOME", "/home/dev")
        .with_var("OPENAI_API_KEY", "sk-test");
    let resolver = resolver(table, env);

    let resolution = resolver.resolve().unwrap();
    assert_eq!(resolution.handle, "openai");
    assert!(resolution.passed_over[0].is_skip());
    assert_eq!(resolver.usage().total_attempts, 1);
}

#[test]
fn failing_provider_falls_back_to_next() {
    let resolver = resolver(
        vec![failing("a"), needs("b", "B_KEY")],
        StaticEnvironment::new().with_var("B_KEY", "b"),
    );

    let resolution = resolver.resolve().unwrap();
    assert_eq!(resolution.handle, "b");

    let usage = resolver.usage();
    assert_eq!(usage.total_attempts, 2);
    assert_eq!(usage.per_provider["a"].failures, 1);
    assert_eq!(usage.per_provider["b"].successes, 1);
}

#[test]
fn panicking_provider_falls_back_to_next() {
    let table = vec![
        ProviderDescriptor::new("a", vec![], |_| panic!("constructor bug")),
        needs("b", "B_KEY"),
    ];
    let resolver = resolver(table, StaticEnvironment::new().with_var("B_KEY", "b"));

    assert_eq!(resolver.resolve().unwrap().handle, "b");
    assert_eq!(resolver.usage().per_provider["a"].failures, 1);
}

#[test]
fn each_provider_is_built_at_most_once_per_call() {
    let builds = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&builds);
    let table = vec![ProviderDescriptor::new("flaky", vec![], move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Err::<Handle, _>("unavailable".into())
    })];
    let resolver = resolver(table, StaticEnvironment::new());

    assert!(resolver.resolve().is_err());
    assert_eq!(builds.load(Ordering::SeqCst), 1);
}

#[test]
fn shared_resolver_counts_every_call() {
    let resolver = Arc::new(resolver(
        vec![needs("a", "A_KEY")],
        StaticEnvironment::new().with_var("A_KEY", "a"),
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            std::thread::spawn(move || resolver.resolve().map(|r| r.handle).ok())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some("a"));
    }
    assert_eq!(resolver.usage().per_provider["a"].successes, 4);
}

#[test]
fn catalog_resolver_prefers_configured_order() {
    let config = ProviderConfig::default();
    let env = StaticEnvironment::new()
        .with_var("NVIDIA_API_KEY", "nvapi-test")
        .with_var("OPENROUTER_API_KEY", "sk-or-test");
    let resolver = config.resolver(Arc::new(env)).unwrap();

    let resolution = resolver.resolve().unwrap();
    assert_eq!(resolution.handle.kind(), ProviderKind::NvidiaNim);
    assert_eq!(resolution.passed_over.len(), 2);

    let availability = resolver.availability();
    let available: Vec<&str> = availability
        .iter()
        .filter(|a| a.available)
        .map(|a| a.provider.as_str())
        .collect();
    assert_eq!(available, ["nvidia", "openrouter"]);
}

#[test]
fn catalog_resolver_with_nothing_configured() {
    let resolver = ProviderConfig::default()
        .resolver(Arc::new(StaticEnvironment::new()))
        .unwrap();

    let err = resolver.resolve().unwrap_err();
    assert!(err.to_string().starts_with("All providers exhausted: bedrock: skipped"));
    assert_eq!(resolver.usage().total_attempts, 0);
}
