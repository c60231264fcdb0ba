//! End-to-end bootstrap and promotion scenarios
//!
//! Covers the client lifecycle against controllable collaborators:
//! - Fast-path idempotence and callback coalescing
//! - Synchronous supersession of an async bootstrap
//! - Failure propagation from loads and hooks
//! - Reset symmetry of generated classes and the namespace
//! - Promotion rules and their idempotence

use strata_core::Value;
use strata_runtime::Client;

/// Declared types exercised by promotion checks
pub const PROMOTION_TARGETS: [&str; 18] = [
    "Image",
    "ImageCollection",
    "Feature",
    "EEObject",
    "Geometry",
    "FeatureCollection",
    "EECollection",
    "Collection",
    "Filter",
    "ErrorMargin",
    "Algorithm",
    "Date",
    "Dictionary",
    "String",
    "List",
    "Number",
    "Reducer",
    "Object",
];

/// Does promoting twice give the same result as promoting once?
///
/// Values that fail to promote the first time are vacuously idempotent.
pub fn promotion_is_idempotent(client: &Client, value: Value, target: &str) -> bool {
    match client.promote(value, target) {
        Ok(once) => client.promote(once.clone(), target) == Ok(once),
        Err(_) => true,
    }
}

/// A spread of proxy values built through the client
pub fn sample_proxies(client: &Client) -> Vec<Value> {
    let roads = client.construct("FeatureCollection", vec!["roads".into()]);
    let geometry = roads
        .clone()
        .and_then(|roads| client.promote(roads, "Geometry"));
    let feature = geometry
        .clone()
        .and_then(|geometry| client.construct("Feature", vec![geometry]));

    [
        client.construct("Image", vec![1.0.into()]),
        client.construct("ImageCollection", vec!["L8".into()]),
        roads,
        geometry,
        feature,
        client.promote("2020-01-01".into(), "String"),
        client.call("Reducer.mean", Vec::new()),
        client.call("Projection", vec!["EPSG:4326".into()]),
        client.promote(Value::variable("t", None), "Date"),
    ]
    .into_iter()
    .filter_map(Result::ok)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FailingClass, Harness, SlowClass, FIXTURE_GENERATED};
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;
    use strata_core::{EndpointConfig, Expression, InitState, ProxyKind, StrataError};
    use strata_runtime::{standard_classes, ProxyClass};

    fn ready() -> Harness {
        let harness = Harness::new();
        harness.initialize_sync().unwrap();
        harness
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    #[test]
    fn test_initialize_is_idempotent_when_ready() {
        let harness = ready();
        harness.initialize_sync().unwrap();
        assert_eq!(harness.registry.sync_loads(), 1);

        harness.initialize_async("late").unwrap();
        // Ran inline, before initialize returned.
        assert_eq!(harness.log.events(), ["late"]);
        assert_eq!(harness.registry.async_loads(), 0);
        assert_eq!(harness.client.stats().attempts, 1);
    }

    #[test]
    fn test_async_callbacks_fire_in_call_order() {
        let harness = Harness::new();
        harness.initialize_async("first").unwrap();
        harness.initialize_async("second").unwrap();
        harness.initialize_async("third").unwrap();

        assert_eq!(harness.client.ready(), InitState::Loading);
        assert_eq!(harness.registry.async_loads(), 1);
        assert!(harness.log.events().is_empty());

        assert!(harness.registry.complete_next());
        assert_eq!(harness.client.ready(), InitState::Ready);
        assert_eq!(harness.log.events(), ["first", "second", "third"]);
    }

    #[test]
    fn test_sync_call_supersedes_async_bootstrap() {
        let harness = Harness::new();
        harness.initialize_async("async").unwrap();
        harness.initialize_sync().unwrap();

        assert_eq!(harness.client.ready(), InitState::Ready);
        assert_eq!(harness.log.events(), ["async"]);

        // The superseded load resolves later and changes nothing.
        assert!(harness.registry.complete_next());
        assert_eq!(harness.log.events(), ["async"]);

        let stats = harness.client.stats();
        assert_eq!(stats.resolutions, 1);
        assert_eq!(stats.stale_completions, 1);
    }

    #[test]
    fn test_async_failure_reaches_error_callbacks() {
        let harness = Harness::new();
        harness.initialize_async("a").unwrap();
        harness.initialize_async("b").unwrap();

        harness
            .registry
            .fail_next(StrataError::LoadFailure("offline".into()));

        assert_eq!(harness.client.ready(), InitState::NotReady);
        let events = harness.log.events();
        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with("a: "));
        assert!(events[1].starts_with("b: "));
        assert!(events[1].contains("offline"));
        assert!(harness.client.generated_classes().is_empty());
    }

    #[test]
    fn test_sync_failure_is_raised_and_reported() {
        let harness = Harness::new();
        harness.initialize_async("queued").unwrap();
        harness
            .registry
            .fail_sync_loads(Some(StrataError::LoadFailure("bad catalog".into())));

        let result = harness.initialize_sync();
        assert_eq!(
            result,
            Err(StrataError::LoadFailure("bad catalog".into()))
        );
        assert_eq!(harness.client.ready(), InitState::NotReady);
        assert_eq!(harness.log.events().len(), 1);

        // A later retry recovers.
        harness.registry.fail_sync_loads(None);
        harness.initialize_sync().unwrap();
        assert_eq!(harness.client.ready(), InitState::Ready);
    }

    #[test]
    fn test_hook_failure_fails_bootstrap() {
        let failing = Arc::new(FailingClass::new(
            ProxyKind::Geometry,
            StrataError::InvalidArgument("broken".into()),
        ));
        let mut classes = standard_classes();
        classes.retain(|class| class.kind() != ProxyKind::Geometry);
        classes.push(failing.clone());

        let harness = Harness::with_classes(classes);
        let result = harness.initialize_sync();
        assert!(matches!(
            result,
            Err(StrataError::HookFailure { ref hook, .. }) if hook == "Geometry"
        ));
        assert_eq!(harness.client.ready(), InitState::NotReady);

        harness.initialize_async("async").unwrap();
        harness.registry.complete_next();
        let events = harness.log.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].contains("Geometry"));
        assert_eq!(failing.calls(), 2);
    }

    #[test]
    fn test_error_callback_without_success_is_rejected() {
        let harness = Harness::new();
        let result = harness
            .client
            .initialize(None, None, Some(harness.log.error("orphan")));

        assert!(matches!(result, Err(StrataError::InvalidUsage(_))));
        assert_eq!(harness.client.ready(), InitState::NotReady);
        assert!(harness.transport.configurations().is_empty());
    }

    #[test]
    fn test_endpoints_reach_transport() {
        let harness = Harness::new();
        let config = EndpointConfig::new()
            .with_api_base_url("https://example.test/api")
            .with_tile_base_url("https://tiles.example.test");
        harness.client.initialize(Some(config), None, None).unwrap();

        assert_eq!(
            harness.transport.configurations(),
            [(
                Some("https://example.test/api".to_string()),
                Some("https://tiles.example.test".to_string())
            )]
        );
    }

    #[test]
    fn test_reset_is_symmetric() {
        let harness = ready();
        let generated = harness.client.generated_classes();
        let paths = harness.client.algorithms().paths();
        assert_eq!(generated, FIXTURE_GENERATED);
        assert!(paths.contains(&"Landsat.TOA.calibrate".to_string()));

        let namespace = harness.client.algorithms();
        harness.client.reset();
        assert_eq!(harness.client.ready(), InitState::NotReady);
        assert_eq!(harness.transport.reset_count(), 1);
        assert!(namespace.is_empty());
        for name in &generated {
            assert!(harness.client.type_descriptor(name).is_none());
        }

        harness.initialize_sync().unwrap();
        assert_eq!(harness.client.generated_classes(), generated);
        assert_eq!(harness.client.algorithms().paths(), paths);
    }

    #[test]
    fn test_reserved_names_are_never_generated() {
        let classes: Vec<Arc<dyn ProxyClass>> = standard_classes()
            .into_iter()
            .filter(|class| class.kind() != ProxyKind::List)
            .collect();
        let harness = Harness::with_classes(classes);
        harness.initialize_sync().unwrap();

        assert!(!harness.client.generated_classes().contains(&"List".to_string()));
        assert!(harness.client.type_descriptor("List").is_none());
        assert!(harness.client.algorithms().algorithm("List.sequence").is_some());
    }

    #[test]
    fn test_hidden_algorithms_stay_out_of_namespace() {
        let harness = ready();
        assert!(harness.client.algorithms().get("Debug").is_none());
        assert!(harness.client.algorithms().get("Image").is_none());
        assert!(harness.client.algorithms().get("Landsat").unwrap().is_namespace());
    }

    #[tokio::test]
    async fn test_concurrent_bootstraps_share_one_load() {
        let client = Client::builder(
            Arc::new(crate::RecordingTransport::new()),
            Arc::new(strata_registry::Catalog::new(crate::fixture_source())),
        )
        .build();

        let (a, b) = tokio::join!(client.bootstrap(None), client.bootstrap(None));
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(client.stats().attempts, 1);
        assert!(client.ready().is_ready());
    }

    #[test]
    fn test_threaded_sync_call_resolves_once() {
        let slow = Arc::new(SlowClass::new(
            ProxyKind::Geometry,
            Duration::from_millis(200),
        ));
        let mut classes = standard_classes();
        classes.retain(|class| class.kind() != ProxyKind::Geometry);
        classes.push(slow.clone());

        let harness = Harness::with_classes(classes);
        harness.initialize_async("async").unwrap();

        // The async load completes on another thread while the sync call runs.
        let registry = Arc::clone(&harness.registry);
        let completion = std::thread::spawn(move || registry.complete_next());
        std::thread::sleep(Duration::from_millis(50));
        harness.initialize_sync().unwrap();
        assert!(completion.join().unwrap());

        let stats = harness.client.stats();
        assert_eq!(stats.resolutions, 1);
        assert_eq!(stats.stale_completions, 1);
        assert_eq!(harness.client.ready(), InitState::Ready);
        assert_eq!(harness.log.events(), ["async"]);
        assert_eq!(slow.overlaps(), 0);
        assert!(slow.calls() >= 1);
        assert_eq!(harness.client.generated_classes(), FIXTURE_GENERATED);
    }

    #[test]
    fn test_reset_abandons_queued_callbacks() {
        let harness = Harness::new();
        harness.initialize_async("a").unwrap();
        harness.initialize_async("b").unwrap();

        harness.client.reset();
        assert_eq!(harness.client.ready(), InitState::NotReady);
        let abandoned = format!(": {}", StrataError::Abandoned);
        let events = harness.log.events();
        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with('a') && events[0].ends_with(&abandoned));
        assert!(events[1].starts_with('b') && events[1].ends_with(&abandoned));

        // The load started before the reset resolves into nothing.
        assert!(harness.registry.complete_next());
        assert_eq!(harness.client.ready(), InitState::NotReady);
        assert_eq!(harness.log.events().len(), 2);
        assert_eq!(harness.client.stats().stale_completions, 1);

        // A fresh attempt starts with empty queues.
        harness.initialize_async("c").unwrap();
        assert!(harness.registry.complete_next());
        assert_eq!(harness.log.events().last().map(String::as_str), Some("c"));
    }

    #[tokio::test]
    async fn test_reset_ends_pending_bootstrap() {
        let harness = Harness::new();
        let client = harness.client.clone();
        let pending = tokio::spawn(async move { client.bootstrap(None).await });

        while harness.registry.pending() == 0 {
            tokio::task::yield_now().await;
        }
        harness.client.reset();

        assert_eq!(pending.await.unwrap(), Err(StrataError::Abandoned));
    }

    #[test]
    fn test_panicking_callback_stops_drain() {
        let harness = Harness::new();
        harness.initialize_async("first").unwrap();
        harness
            .client
            .initialize(None, Some(Box::new(|| panic!("callback failed"))), None)
            .unwrap();
        harness.initialize_async("third").unwrap();

        let drained = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            harness.registry.complete_next()
        }));
        assert!(drained.is_err());
        assert_eq!(harness.client.ready(), InitState::Ready);
        assert_eq!(harness.log.events(), ["first"]);
    }

    // ------------------------------------------------------------------------
    // Promotion
    // ------------------------------------------------------------------------

    #[test]
    fn test_promotion_examples() {
        let harness = ready();
        let client = &harness.client;

        let margin = client.promote(5.0.into(), "ErrorMargin").unwrap();
        let expr = margin.expression().unwrap();
        assert!(expr.is_call_to("ErrorMargin"));
        let args = expr.args().unwrap();
        assert_eq!(args["value"], Value::Number(5.0));
        assert_eq!(
            args["unit"].expression(),
            Some(&Expression::constant("meters".into()))
        );

        assert!(client
            .promote("foo".into(), "String")
            .unwrap()
            .is_kind(ProxyKind::String));
        assert_eq!(client.promote(Value::Null, "Image").unwrap(), Value::Null);

        let roads = client.construct("FeatureCollection", vec!["roads".into()]).unwrap();
        let geometry = client.promote(roads.clone(), "Geometry").unwrap();
        let reduced = geometry.expression().unwrap();
        assert!(reduced.is_call_to("Collection.geometry"));
        assert_eq!(reduced.args().unwrap()["collection"], roads);
    }

    #[test]
    fn test_unknown_factory_names_type_and_member() {
        let harness = ready();
        let err = harness.client.promote("median".into(), "Reducer").unwrap_err();
        assert_eq!(
            err,
            StrataError::UnknownAlgorithm {
                type_name: "Reducer".into(),
                member: "median".into(),
            }
        );
        assert_eq!(err.to_string(), "Unknown algorithm: Reducer.median");
    }

    #[test]
    fn test_call_through_generated_signature() {
        let harness = ready();
        let client = &harness.client;
        let image = client.construct("Image", vec![1.0.into()]).unwrap();

        let stats = client
            .call("Image.reduceRegion", vec![image, "sum".into()])
            .unwrap();
        assert!(stats.is_kind(ProxyKind::Dictionary));
        let args = stats.expression().unwrap().args().unwrap();
        assert!(client.is_instance(&args["reducer"], "Reducer"));

        let named = BTreeMap::from([("values".to_string(), Value::List(vec![1.0.into()]))]);
        let array = client.apply("Array", named).unwrap();
        assert!(client.is_instance(&array, "Array"));
    }

    #[test]
    fn test_sample_proxies_are_idempotent() {
        let harness = ready();
        for value in sample_proxies(&harness.client) {
            for target in PROMOTION_TARGETS {
                assert!(
                    promotion_is_idempotent(&harness.client, value.clone(), target),
                    "{} -> {}",
                    value.describe(),
                    target
                );
            }
        }
    }

    fn literal() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            Just(Value::Undefined),
            any::<bool>().prop_map(Value::Bool),
            (-1.0e9..1.0e9f64).prop_map(Value::Number),
            prop::sample::select(vec!["mean", "foo", "roads", "2020-01-01", "Image.add"])
                .prop_map(Value::from),
            prop::collection::vec((-10.0..10.0f64).prop_map(Value::Number), 0..3)
                .prop_map(Value::List),
            Just(Value::Dictionary(BTreeMap::new())),
            Just(Value::variable("v", None)),
            Just(Value::variable("s", Some("String"))),
        ]
    }

    proptest! {
        #[test]
        fn test_promotion_idempotence(
            value in literal(),
            target in prop::sample::select(PROMOTION_TARGETS.to_vec()),
        ) {
            let harness = ready();
            prop_assert!(promotion_is_idempotent(&harness.client, value, target));
        }
    }
}
