use sluice::{Channel, ClosedError, RecvResult, TrySendError};
use std::collections::HashSet;
use std::time::Duration;

#[tokio::test]
async fn send_recv_ten_in_order() {
    let ch = Channel::new();
    let tx = ch.clone();
    tokio::spawn(async move {
        for i in 0..10 {
            tx.send(i).await.unwrap();
        }
        tx.close();
    });

    let mut got = Vec::new();
    loop {
        match ch.recv().await {
            RecvResult::Item(i) => got.push(i),
            RecvResult::Closed => break,
        }
    }
    assert_eq!(got, (0..10).collect::<Vec<i32>>());

    // closure is sticky
    assert_eq!(ch.recv().await, RecvResult::Closed);
}

#[test]
fn capacity_rules() {
    assert!(Channel::<i32>::with_capacity(0).is_err());
    assert_eq!(Channel::<i32>::new().capacity(), 1);
    assert_eq!(Channel::<i32>::with_capacity(8).unwrap().capacity(), 8);
}

#[tokio::test]
async fn try_ops() {
    let ch = Channel::with_capacity(1).unwrap();

    assert_eq!(ch.try_recv(), None);
    assert!(ch.try_send(1).is_ok());
    assert_eq!(ch.try_send(2), Err(TrySendError::Full(2)));
    assert!(ch.is_full());

    assert_eq!(ch.try_recv(), Some(RecvResult::Item(1)));
    assert!(ch.is_empty());

    ch.close();
    assert_eq!(ch.try_send(3), Err(TrySendError::Closed(3)));
    assert_eq!(ch.try_recv(), Some(RecvResult::Closed));
}

#[tokio::test]
async fn send_after_close_fails_synchronously() {
    let ch = Channel::new();
    ch.close();
    ch.close(); // idempotent
    assert_eq!(ch.send(1).await, Err(ClosedError));
    assert!(ch.is_closed());
}

#[tokio::test(start_paused = true)]
async fn direct_handoff_to_parked_receiver() {
    let ch = Channel::new();
    let rx = ch.clone();
    let receiver = tokio::spawn(async move { rx.recv().await });

    // let the receiver park
    tokio::time::sleep(Duration::from_millis(1)).await;

    ch.send(9).await.unwrap();
    assert_eq!(receiver.await.unwrap(), RecvResult::Item(9));
    // the element was handed off directly, never buffered
    assert!(ch.is_empty());
}

#[tokio::test(start_paused = true)]
async fn parked_senders_unpark_in_fifo_order() {
    let ch = Channel::with_capacity(1).unwrap();
    ch.send(0).await.unwrap();

    let mut parked = Vec::new();
    for i in 1..=3 {
        let tx = ch.clone();
        parked.push(tokio::spawn(async move { tx.send(i).await }));
        // let this sender park before spawning the next
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    let mut got = Vec::new();
    for _ in 0..4 {
        got.push(ch.recv().await.into_item().unwrap());
    }
    assert_eq!(got, vec![0, 1, 2, 3]);
    for handle in parked {
        assert_eq!(handle.await.unwrap(), Ok(()));
    }
}

#[tokio::test(start_paused = true)]
async fn close_fails_parked_senders_and_keeps_buffered_elements() {
    let ch = Channel::with_capacity(1).unwrap();
    ch.send(0).await.unwrap();

    let tx = ch.clone();
    let parked = tokio::spawn(async move { tx.send(1).await });
    tokio::time::sleep(Duration::from_millis(1)).await;

    ch.close();
    assert_eq!(parked.await.unwrap(), Err(ClosedError));

    // the buffer drains after close, the parked element was discarded
    assert_eq!(ch.recv().await, RecvResult::Item(0));
    assert_eq!(ch.recv().await, RecvResult::Closed);
}

#[tokio::test(start_paused = true)]
async fn close_resolves_parked_receivers() {
    let ch = Channel::<u32>::new();
    let mut receivers = Vec::new();
    for _ in 0..2 {
        let rx = ch.clone();
        receivers.push(tokio::spawn(async move { rx.recv().await }));
    }
    tokio::time::sleep(Duration::from_millis(1)).await;

    ch.close();
    for handle in receivers {
        assert_eq!(handle.await.unwrap(), RecvResult::Closed);
    }
}

#[tokio::test(start_paused = true)]
async fn dropped_parked_receive_loses_nothing() {
    let ch = Channel::new();

    // park a receive, then abandon it
    let abandoned = tokio::time::timeout(Duration::from_millis(1), ch.recv()).await;
    assert!(abandoned.is_err());

    // the send must skip the dead parking spot and buffer
    ch.send(7).await.unwrap();
    assert_eq!(ch.recv().await, RecvResult::Item(7));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_senders_many_receivers_conserve_elements() {
    const SENDERS: usize = 4;
    const RECEIVERS: usize = 3;
    const PER_SENDER: usize = 250;

    let ch = Channel::with_capacity(2).unwrap();

    let mut send_tasks = Vec::new();
    for s in 0..SENDERS {
        let tx = ch.clone();
        send_tasks.push(tokio::spawn(async move {
            for i in 0..PER_SENDER {
                tx.send((s, i)).await.unwrap();
            }
        }));
    }

    let mut recv_tasks = Vec::new();
    for _ in 0..RECEIVERS {
        let rx = ch.clone();
        recv_tasks.push(tokio::spawn(async move {
            let mut got = Vec::new();
            loop {
                match rx.recv().await {
                    RecvResult::Item(elem) => got.push(elem),
                    RecvResult::Closed => break got,
                }
            }
        }));
    }

    for task in send_tasks {
        task.await.unwrap();
    }
    ch.close();

    let mut all = Vec::new();
    for task in recv_tasks {
        // every receiver eventually observes closure
        all.extend(task.await.unwrap());
    }

    // exactly the sent elements were received, each exactly once
    assert_eq!(all.len(), SENDERS * PER_SENDER);
    let distinct: HashSet<(usize, usize)> = all.iter().copied().collect();
    assert_eq!(distinct.len(), all.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn per_producer_fifo() {
    const PER_SENDER: usize = 200;

    let ch = Channel::with_capacity(4).unwrap();
    for s in 0..2 {
        let tx = ch.clone();
        tokio::spawn(async move {
            for i in 0..PER_SENDER {
                tx.send((s, i)).await.unwrap();
            }
        });
    }

    let mut seen = vec![Vec::new(), Vec::new()];
    for _ in 0..2 * PER_SENDER {
        let (s, i) = ch.recv().await.into_item().unwrap();
        seen[s].push(i);
    }
    for per_sender in seen {
        assert_eq!(per_sender, (0..PER_SENDER).collect::<Vec<usize>>());
    }
}
