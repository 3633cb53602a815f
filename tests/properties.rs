mod common;

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use diagvisor::{DispatchError, DispatchQueue, EventFlagSet, EventKind, EventPayload, Task, adapters};
use tokio::sync::oneshot;

use common::{Stream, recording_agent};

/// Occupies the only worker of `queue` until the returned sender fires.
async fn block_worker(queue: &DispatchQueue) -> oneshot::Sender<()> {
    let (started_tx, started_rx) = oneshot::channel::<()>();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    queue
        .enqueue(Task::new("gate", async move {
            let _ = started_tx.send(());
            let _ = release_rx.await;
            Ok(())
        }))
        .await
        .unwrap();
    started_rx.await.unwrap();
    release_tx
}

#[tokio::test]
async fn flag_changes_are_visible_immediately() {
    let (agent, _writer) = recording_agent(1, 8, EventFlagSet::none());
    for kind in EventKind::BUILTIN {
        assert!(!agent.is_enabled(kind));
        agent.enable_event(kind);
        assert!(agent.is_enabled(kind));
        agent.disable_event(kind);
        assert!(!agent.is_enabled(kind));
    }

    let custom = EventKind::custom(40, "cache_miss");
    agent.enable_event(custom);
    assert!(agent.is_enabled(custom));
    agent.close().await.unwrap();
}

#[tokio::test]
async fn single_worker_renders_in_emission_order() {
    let (agent, writer) = recording_agent(1, 256, EventFlagSet::all());
    for i in 0..50 {
        agent.infof(format_args!("line {i}")).await;
    }
    agent.drain().await.unwrap();

    let expected: Vec<String> = (0..50).map(|i| format!("info line {i}")).collect();
    assert_eq!(writer.texts(Stream::Out), expected);

    let seqs: Vec<u64> = writer.lines().iter().map(|l| l.seq).collect();
    assert!(seqs.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_workers_render_every_event_once() {
    let (agent, writer) = recording_agent(4, 32, EventFlagSet::all());

    let mut producers = Vec::new();
    for p in 0..4 {
        let agent = Arc::clone(&agent);
        producers.push(tokio::spawn(async move {
            for i in 0..100 {
                agent.infof(format!("{p}-{i}")).await;
            }
        }));
    }
    for h in producers {
        h.await.unwrap();
    }
    agent.drain().await.unwrap();

    let texts = writer.texts(Stream::Out);
    assert_eq!(texts.len(), 400);
    let unique: HashSet<_> = texts.into_iter().collect();
    assert_eq!(unique.len(), 400);
}

#[tokio::test]
async fn pending_never_exceeds_capacity() {
    let queue = DispatchQueue::new(1, 3);
    let release = block_worker(&queue).await;

    for _ in 0..3 {
        queue.try_enqueue(Task::from_fn("fill", || Ok(()))).unwrap();
    }
    assert_eq!(queue.len(), 3);
    assert_eq!(
        queue.try_enqueue(Task::from_fn("overflow", || Ok(()))),
        Err(DispatchError::Full { capacity: 3 })
    );
    assert_eq!(queue.stats().pending, 3);

    release.send(()).unwrap();
    queue.close().await.unwrap();
    assert_eq!(queue.stats().executed, 4);
}

#[tokio::test]
async fn drained_agent_is_empty_and_closed() {
    let (agent, writer) = recording_agent(2, 64, EventFlagSet::all());
    for i in 0..20 {
        agent.infof(i).await;
    }
    agent.drain().await.unwrap();

    assert_eq!(agent.queue().len(), 0);
    assert!(agent.queue().is_closed());
    assert_eq!(writer.len(), 20);
    assert_eq!(
        agent.queue().enqueue(Task::from_fn("late", || Ok(()))).await,
        Err(DispatchError::Closed)
    );
}

#[tokio::test]
async fn mismatched_payload_is_dropped_and_counted() {
    let (agent, _writer) = recording_agent(1, 8, EventFlagSet::all());
    let calls = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&calls);
    agent.add_listener(
        EventKind::ERROR,
        adapters::error_listener(move |_, _, _| {
            c.fetch_add(1, Ordering::SeqCst);
        }),
    );

    let field: diagvisor::Field = Arc::new(42i64);
    agent
        .on_event(EventKind::ERROR, EventPayload::fields(vec![field]))
        .await;
    agent.drain().await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let stats = agent.stats();
    assert_eq!(stats.listeners.dropped_decodes, 1);
    assert_eq!(stats.queue.failed, 0);
}

#[tokio::test]
async fn disabling_a_kind_keeps_already_queued_events() {
    let (agent, writer) = recording_agent(1, 64, EventFlagSet::all());
    let release = block_worker(agent.queue()).await;

    for i in 0..5 {
        agent.infof(format_args!("queued {i}")).await;
    }
    agent.disable_event(EventKind::INFO);
    agent.infof("suppressed").await;
    assert_eq!(agent.queue().len(), 5);

    release.send(()).unwrap();
    agent.drain().await.unwrap();

    let texts = writer.texts(Stream::Out);
    assert_eq!(texts.len(), 5);
    assert!(texts.iter().all(|t| t.starts_with("info queued")));
}

#[tokio::test]
async fn custom_kinds_flow_through_on_event() {
    const CACHE_MISS: EventKind = EventKind::custom(17, "cache_miss");

    let (agent, _writer) = recording_agent(1, 8, EventFlagSet::none());
    let keys = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let k = Arc::clone(&keys);
    agent.add_listener(
        CACHE_MISS,
        adapters::fields_listener(move |_, _, fields| {
            if let Some(key) = fields.first().and_then(|f| f.downcast_ref::<String>()) {
                k.lock().push(key.clone());
            }
        }),
    );
    agent.enable_event(CACHE_MISS);

    let key: diagvisor::Field = Arc::new("user:42".to_string());
    agent.on_event(CACHE_MISS, EventPayload::fields(vec![key])).await;
    agent.drain().await.unwrap();

    assert_eq!(*keys.lock(), vec!["user:42".to_string()]);
}
