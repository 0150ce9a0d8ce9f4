// End-to-end exchange between a traced service and a tracing backend, each
// running against its own in-memory host.

use std::cell::RefCell;
use std::rc::Rc;

use tracing_interface_core::{
    CharmMetadata, Databag, EndpointChangedEvent, EndpointConsumer, EndpointProvider, Ingester,
    IngesterType, MemoryHost, Relation, RelationEvent, RelationEventKind, RelationObserver,
    TracingRequirerData, dispatch,
};

struct Deployment {
    service: MemoryHost,
    service_relation: Relation,
    backend: MemoryHost,
    backend_relation: Relation,
}

impl Deployment {
    fn new(leader: bool) -> Self {
        let mut service = MemoryHost::new(
            "jolly",
            CharmMetadata::new("jolly").with_provides("tracing", "tracing"),
        )
        .with_leader(leader);
        let mut backend = MemoryHost::new(
            "tempo",
            CharmMetadata::new("tempo").with_requires("tracing", "tracing"),
        );
        let service_relation = service.add_relation("tracing", "tempo");
        let backend_relation = backend.add_relation("tracing", "jolly");
        Self {
            service,
            service_relation,
            backend,
            backend_relation,
        }
    }

    /// Copy what the service wrote over to the backend's view of the relation.
    fn sync(&mut self) {
        let data = self
            .service
            .local_app_data(self.service_relation.id)
            .cloned()
            .unwrap_or_default();
        self.backend.set_remote_app_data(self.backend_relation.id, data);
    }

    fn set_backend_view(&mut self, data: Databag) {
        self.backend.set_remote_app_data(self.backend_relation.id, data);
    }

    fn created(&self) -> RelationEvent {
        RelationEvent::new(RelationEventKind::Created, self.service_relation.clone())
    }

    fn changed(&self) -> RelationEvent {
        RelationEvent::new(RelationEventKind::Changed, self.backend_relation.clone())
    }
}

fn recorded(consumer: &mut EndpointConsumer) -> Rc<RefCell<Vec<EndpointChangedEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    consumer.on_endpoint_changed(move |event| sink.borrow_mut().push(event.clone()));
    events
}

fn provider(deployment: &Deployment, hostname: &str, ingesters: Vec<Ingester>) -> EndpointProvider {
    let data = TracingRequirerData::new(hostname, ingesters).unwrap();
    EndpointProvider::from_host(&deployment.service, data).unwrap()
}

#[test]
fn test_published_endpoints_reach_backend() {
    let mut deployment = Deployment::new(true);
    let mut provider = provider(
        &deployment,
        "myhost.local",
        vec![
            Ingester::new(IngesterType::Tempo, 3200),
            Ingester::new(IngesterType::OtlpGrpc, 4317),
        ],
    );

    let created = deployment.created();
    assert_eq!(dispatch(&mut deployment.service, &created, &mut [&mut provider]), 1);
    deployment.sync();

    let mut consumer = EndpointConsumer::from_host(&deployment.backend).unwrap();
    let events = recorded(&mut consumer);
    let changed = deployment.changed();
    dispatch(&mut deployment.backend, &changed, &mut [&mut consumer]);

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].hostname, "myhost.local");
    assert_eq!(
        events[0].ingesters,
        vec![
            Ingester::new(IngesterType::Tempo, 3200),
            Ingester::new(IngesterType::OtlpGrpc, 4317),
        ]
    );
    assert_eq!(events[0].relation, deployment.backend_relation);
    assert_eq!(
        consumer.otlp_grpc_endpoint(&deployment.backend).as_deref(),
        Some("http://myhost.local:4317")
    );
}

#[test]
fn test_round_trip_preserves_descriptor() {
    let mut deployment = Deployment::new(true);
    let ingesters = vec![
        Ingester::new(IngesterType::Zipkin, 9411),
        Ingester::new(IngesterType::OtlpHttp, 4318),
        Ingester::new(IngesterType::OtlpHttp, 14318),
    ];
    let hostname = "tempo-0.tempo-endpoints.cos.svc.cluster.local";
    let provider = provider(&deployment, hostname, ingesters);

    provider.publish(&mut deployment.service).unwrap();
    deployment.sync();

    let consumer = EndpointConsumer::from_host(&deployment.backend).unwrap();
    assert_eq!(consumer.current_endpoint(&deployment.backend).as_ref(), Some(provider.data()));
}

#[test]
fn test_joined_republishes() {
    let mut deployment = Deployment::new(true);
    let mut provider = provider(&deployment, "myhost.local", Ingester::tempo_defaults());
    let joined = RelationEvent::new(RelationEventKind::Joined, deployment.service_relation.clone());

    dispatch(&mut deployment.service, &joined, &mut [&mut provider]);
    dispatch(&mut deployment.service, &joined, &mut [&mut provider]);
    assert_eq!(deployment.service.write_count(), 2);
}

#[test]
fn test_follower_never_writes() {
    let mut deployment = Deployment::new(false);
    let mut provider = provider(&deployment, "myhost.local", Ingester::tempo_defaults());

    for kind in [RelationEventKind::Created, RelationEventKind::Joined] {
        let event = RelationEvent::new(kind, deployment.service_relation.clone());
        provider.handle(&mut deployment.service, &event);
    }
    assert_eq!(deployment.service.write_count(), 0);
    assert!(deployment.service.local_app_data(deployment.service_relation.id).is_none());
}

#[test]
fn test_bogus_ingester_type_emits_nothing() {
    let mut deployment = Deployment::new(true);
    deployment.set_backend_view(Databag::from([
        ("hostname".to_string(), "myhost.local".to_string()),
        ("ingesters".to_string(), r#"[{"type":"bogus","port":"1"}]"#.to_string()),
    ]));

    let mut consumer = EndpointConsumer::from_host(&deployment.backend).unwrap();
    let events = recorded(&mut consumer);
    let changed = deployment.changed();
    dispatch(&mut deployment.backend, &changed, &mut [&mut consumer]);

    assert!(events.borrow().is_empty());
    assert!(consumer.otlp_grpc_endpoint(&deployment.backend).is_none());
}

#[test]
fn test_malformed_ingesters_emit_nothing() {
    let malformed = [
        r#"[{"port": "3200", "type": "tempo"}, {"port": "4317""#,
        r#"[{"port": "4317"}]"#,
        r#"[{"protocol": "tempo", "port": 3200}]"#,
        "not json",
    ];

    for ingesters in malformed {
        let mut deployment = Deployment::new(true);
        deployment.set_backend_view(Databag::from([
            ("hostname".to_string(), "myhost.local".to_string()),
            ("ingesters".to_string(), ingesters.to_string()),
        ]));

        let mut consumer = EndpointConsumer::from_host(&deployment.backend).unwrap();
        let events = recorded(&mut consumer);
        let backend_relation = deployment.backend_relation.clone();
        assert!(consumer.on_relation_changed(&deployment.backend, &backend_relation).is_none());
        assert!(events.borrow().is_empty(), "{ingesters} should not emit");
    }
}

#[test]
fn test_invalid_hostname_emits_nothing() {
    let mut deployment = Deployment::new(true);
    deployment.set_backend_view(Databag::from([
        ("hostname".to_string(), "not a host".to_string()),
        ("ingesters".to_string(), r#"[{"port":"4317","type":"otlp_grpc"}]"#.to_string()),
    ]));

    let mut consumer = EndpointConsumer::from_host(&deployment.backend).unwrap();
    let backend_relation = deployment.backend_relation.clone();
    assert!(consumer.on_relation_changed(&deployment.backend, &backend_relation).is_none());
}

#[test]
fn test_torn_down_relation_during_publish() {
    let mut deployment = Deployment::new(true);
    let mut provider = provider(&deployment, "myhost.local", Ingester::tempo_defaults());
    deployment.service.tear_down(deployment.service_relation.id);

    let created = deployment.created();
    dispatch(&mut deployment.service, &created, &mut [&mut provider]);
    assert_eq!(deployment.service.write_count(), 0);
}
