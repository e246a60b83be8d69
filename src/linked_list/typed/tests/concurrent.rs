extern crate std;

use alloc::{sync::Arc, vec, vec::Vec};
use std::sync::Barrier;
use std::thread;

use hashbrown::HashSet;

use crate::error::ListError;
use crate::linked_list::typed::TypedList;
use crate::test_util::trace_init;

#[test]
fn test_one_append_per_thread() {
    let _trace = trace_init();

    let num_threads = 16;
    let list = Arc::new(TypedList::<usize>::new().unwrap());
    let barrier = Arc::new(Barrier::new(num_threads));

    let mut handles = vec![];
    for i in 0..num_threads {
        let list = Arc::clone(&list);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            list.append(i).unwrap();
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), num_threads);
    let present: HashSet<usize> = list.snapshot().unwrap().into_iter().collect();
    assert_eq!(present, (0..num_threads).collect::<HashSet<_>>());
    list.assert_consistent();
}

#[test]
fn test_concurrent_inserts_keep_per_thread_order() {
    let num_threads = 8;
    let items_per_thread = 1000;
    let list = Arc::new(TypedList::<(usize, usize)>::new().unwrap());

    thread::scope(|s| {
        for t in 0..num_threads {
            let list = &list;
            s.spawn(move || {
                for j in 0..items_per_thread {
                    if t % 2 == 0 {
                        list.append((t, j)).unwrap();
                    } else {
                        list.prepend((t, j)).unwrap();
                    }
                }
            });
        }
    });

    assert_eq!(list.len(), num_threads * items_per_thread);
    let items = list.snapshot().unwrap();

    // Appenders show up in call order, prependers in reverse
    for t in 0..num_threads {
        let mine: Vec<usize> = items.iter().filter(|(o, _)| *o == t).map(|&(_, j)| j).collect();
        let mut expected: Vec<usize> = (0..items_per_thread).collect();
        if t % 2 == 1 {
            expected.reverse();
        }
        assert_eq!(mine, expected, "thread {t}");
    }
    list.assert_consistent();
}

#[test]
fn test_producers_and_consumers_lose_nothing() {
    let _trace = trace_init();

    let producers = 4;
    let items_per_producer = 2000;
    let total = producers * items_per_producer;
    let list = Arc::new(TypedList::<usize>::new().unwrap());

    let consumed: Vec<usize> = thread::scope(|s| {
        for p in 0..producers {
            let list = &list;
            s.spawn(move || {
                for j in 0..items_per_producer {
                    list.append(p * items_per_producer + j).unwrap();
                }
            });
        }

        let consumers: Vec<_> = (0..2)
            .map(|c| {
                let list = &list;
                s.spawn(move || {
                    let mut got = vec![];
                    // Each consumer takes half the items, from opposite ends
                    while got.len() < total / 2 {
                        let popped = if c == 0 { list.pop_head() } else { list.pop_tail() };
                        match popped {
                            Ok(v) => got.push(v),
                            Err(ListError::EmptyCollection) => thread::yield_now(),
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                    got
                })
            })
            .collect();

        consumers
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    assert!(list.is_empty());
    list.assert_consistent();

    let unique: HashSet<usize> = consumed.iter().copied().collect();
    assert_eq!(consumed.len(), total, "duplicates or losses");
    assert_eq!(unique, (0..total).collect::<HashSet<_>>());
}

#[test]
fn test_clear_races_with_appends() {
    let list = Arc::new(TypedList::<u64>::new().unwrap());

    thread::scope(|s| {
        for _ in 0..4 {
            let list = &list;
            s.spawn(move || {
                for j in 0..500 {
                    list.append(j).unwrap();
                }
            });
        }
        s.spawn(|| {
            for _ in 0..50 {
                list.clear().unwrap();
                thread::yield_now();
            }
        });
    });

    // Whatever survived the clears is intact
    list.assert_consistent();
    let survivors = list.snapshot().unwrap();
    assert_eq!(survivors.len(), list.len());
    assert!(survivors.iter().all(|&v| v < 500));
}
