mod common;

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use diagvisor::{DispatchQueue, EventFlagSet, EventKind, Task, adapters};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use common::{Stream, recording_agent};

#[tokio::test]
async fn info_only_agent_renders_one_line_and_fires_no_listener() {
    let (agent, writer) = recording_agent(4, 64, EventFlagSet::from_kinds(&[EventKind::INFO]));
    let fired = Arc::new(AtomicUsize::new(0));
    let f = Arc::clone(&fired);
    agent.add_listener(
        EventKind::ERROR,
        adapters::error_listener(move |_, _, _| {
            f.fetch_add(1, Ordering::SeqCst);
        }),
    );

    agent.infof(format_args!("x={}", 3)).await;
    agent.drain().await.unwrap();

    let lines = writer.lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].stream, Stream::Out);
    assert!(lines[0].text.contains("x=3"));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn error_listener_receives_reported_message() {
    let (agent, writer) = recording_agent(4, 64, EventFlagSet::all());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    agent.add_listener(
        EventKind::ERROR,
        adapters::error_listener(move |_, _, err| s.lock().push(err.message().to_string())),
    );

    let returned = agent.errorf("boom").await;
    agent.drain().await.unwrap();

    assert_eq!(returned.message(), "boom");
    assert_eq!(*seen.lock(), vec!["boom".to_string()]);
    assert_eq!(writer.texts(Stream::Err), vec!["error boom".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_queue_blocks_enqueue_until_running_task_completes() {
    let queue = Arc::new(DispatchQueue::new(1, 1));

    let (started_tx, started_rx) = oneshot::channel::<()>();
    let (release_tx, release_rx) = oneshot::channel::<()>();
    queue
        .enqueue(Task::new("long", async move {
            let _ = started_tx.send(());
            let _ = release_rx.await;
            Ok(())
        }))
        .await
        .unwrap();
    started_rx.await.unwrap();

    // The only slot is taken by a buffered task while the first one runs.
    queue.enqueue(Task::from_fn("buffered", || Ok(()))).await.unwrap();
    assert_eq!(queue.len(), 1);

    let returned = Arc::new(AtomicBool::new(false));
    let producer = {
        let queue = Arc::clone(&queue);
        let returned = Arc::clone(&returned);
        tokio::spawn(async move {
            queue.enqueue(Task::from_fn("blocked", || Ok(()))).await.unwrap();
            returned.store(true, Ordering::SeqCst);
        })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!returned.load(Ordering::SeqCst));

    release_tx.send(()).unwrap();
    producer.await.unwrap();
    assert!(returned.load(Ordering::SeqCst));

    queue.close().await.unwrap();
    assert_eq!(queue.stats().executed, 3);
}

#[tokio::test]
async fn nil_warning_enqueues_nothing() {
    let (agent, writer) = recording_agent(1, 8, EventFlagSet::all());
    let fired = Arc::new(AtomicUsize::new(0));
    let f = Arc::clone(&fired);
    agent.add_listener(
        EventKind::WARNING,
        adapters::error_listener(move |_, _, _| {
            f.fetch_add(1, Ordering::SeqCst);
        }),
    );

    let res: Result<(), io::Error> = agent.warning(Ok(())).await;
    assert!(res.is_ok());
    assert_eq!(agent.queue().len(), 0);

    agent.drain().await.unwrap();
    assert_eq!(agent.stats().queue.executed, 0);
    assert_eq!(writer.len(), 0);
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
