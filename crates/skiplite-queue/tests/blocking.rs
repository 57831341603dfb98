// Cross-thread behaviour of the blocking queue

use skiplite_queue::{BlockingQueue, PushError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_producer_blocks_until_consumer_pops() {
    let queue = Arc::new(BlockingQueue::new(1));
    queue.push_back(1).unwrap();

    let producer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.push_back(2))
    };

    // Give the producer time to hit the full queue
    thread::sleep(Duration::from_millis(50));
    assert_eq!(queue.len(), 1);

    assert_eq!(queue.pop(), Some(1));
    producer.join().unwrap().unwrap();
    assert_eq!(queue.pop(), Some(2));
}

#[test]
fn test_consumer_wakes_on_push() {
    let queue = Arc::new(BlockingQueue::new(4));

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.pop())
    };

    thread::sleep(Duration::from_millis(20));
    queue.push_back("line").unwrap();
    assert_eq!(consumer.join().unwrap(), Some("line"));
}

#[test]
fn test_close_wakes_blocked_threads() {
    let queue: Arc<BlockingQueue<u32>> = Arc::new(BlockingQueue::new(1));

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.pop())
    };
    thread::sleep(Duration::from_millis(20));
    queue.close();
    assert_eq!(consumer.join().unwrap(), None);

    let full: Arc<BlockingQueue<u32>> = Arc::new(BlockingQueue::new(1));
    full.push_back(7).unwrap();
    let producer = {
        let full = Arc::clone(&full);
        thread::spawn(move || full.push_back(8))
    };
    thread::sleep(Duration::from_millis(20));
    assert_eq!(full.close(), vec![7]);
    assert_eq!(producer.join().unwrap(), Err(PushError::Closed(8)));
}

#[test]
fn test_pop_timeout_waits() {
    let queue: BlockingQueue<u8> = BlockingQueue::new(1);
    let start = Instant::now();
    assert_eq!(queue.pop_timeout(Duration::from_millis(50)), None);
    assert!(start.elapsed() >= Duration::from_millis(50));
}

#[test]
fn test_pop_timeout_wakes_on_push() {
    let queue = Arc::new(BlockingQueue::new(2));

    let consumer = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.pop_timeout(Duration::from_secs(5)))
    };
    thread::sleep(Duration::from_millis(20));
    queue.push_back(42u32).unwrap();

    assert_eq!(consumer.join().unwrap(), Some(42));
    assert!(queue.is_empty());
}

#[test]
fn test_many_producers_one_consumer() {
    let queue = Arc::new(BlockingQueue::new(8));
    let producers: Vec<_> = (0..4)
        .map(|p| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..250 {
                    queue.push_back(p * 1000 + i).unwrap();
                }
            })
        })
        .collect();

    let mut received = Vec::with_capacity(1000);
    while received.len() < 1000 {
        if let Some(item) = queue.pop_timeout(Duration::from_secs(5)) {
            received.push(item);
        }
    }
    for producer in producers {
        producer.join().unwrap();
    }

    received.sort_unstable();
    let mut expected: Vec<_> = (0..4)
        .flat_map(|p| (0..250).map(move |i| p * 1000 + i))
        .collect();
    expected.sort_unstable();
    assert_eq!(received, expected);
}
