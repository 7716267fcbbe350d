use batchd::error::BatchdError;
use batchd::scheduler::{Job, JobQueue};
use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

/// A job with a fixed submit time, for deterministic ordering checks.
fn job_at(submit_secs: i64, delay_secs: u32) -> Job {
    Job::with_submit_time(
        vec!["echo".to_string(), "hi".to_string()],
        delay_secs,
        ts(submit_secs),
    )
    .unwrap()
}

fn queued_ids(queue: &JobQueue) -> Vec<Uuid> {
    queue.ordered_jobs().iter().map(|job| job.id).collect()
}

#[test]
fn test_job_creation() {
    let job = Job::new(vec!["echo".to_string(), "hello".to_string()], 5).unwrap();
    assert_eq!(job.command, vec!["echo", "hello"]);
    assert_eq!(job.program(), "echo");
    assert_eq!(job.args(), ["hello".to_string()]);
    assert_eq!(job.start_delay_secs, 5);
    assert_eq!(
        job.ready_time(),
        job.submit_time + chrono::Duration::seconds(5)
    );
}

#[test]
fn test_empty_command_rejected() {
    let result = Job::new(Vec::new(), 0);
    assert!(matches!(result, Err(BatchdError::EmptyCommand)));
}

#[test]
fn test_too_many_words_rejected() {
    let words: Vec<String> = (0..6).map(|i| format!("word{}", i)).collect();
    let result = Job::new(words, 0);
    assert!(matches!(result, Err(BatchdError::TooManyWords(6))));
}

#[test]
fn test_five_words_accepted() {
    // Program plus four arguments is the documented limit
    let words: Vec<String> = (0..5).map(|i| format!("word{}", i)).collect();
    assert!(Job::new(words, 0).is_ok());
}

#[test]
fn test_zero_delay_ready_at_submit_time() {
    let job = job_at(100, 0);
    assert_eq!(job.ready_time(), job.submit_time);
}

#[test]
fn test_insert_orders_by_ready_time() {
    // A ready at 105, B ready at 102: expect [B, A]
    let mut queue = JobQueue::new();
    let a = job_at(100, 5);
    let b = job_at(100, 2);
    let (a_id, b_id) = (a.id, b.id);

    queue.insert(a);
    queue.insert(b);
    assert_eq!(queued_ids(&queue), vec![b_id, a_id]);

    // C also ready at 105 but submitted at 101: ties break toward the
    // earlier submit time, so A stays ahead of C
    let c = job_at(101, 4);
    let c_id = c.id;
    queue.insert(c);
    assert_eq!(queued_ids(&queue), vec![b_id, a_id, c_id]);
}

#[test]
fn test_ordered_jobs_is_non_decreasing() {
    let mut queue = JobQueue::new();
    for (submit, delay) in [
        (100, 30),
        (101, 2),
        (102, 0),
        (103, 50),
        (104, 1),
        (105, 0),
        (106, 12),
    ] {
        queue.insert(job_at(submit, delay));
    }

    let jobs = queue.ordered_jobs();
    assert_eq!(jobs.len(), 7);
    for pair in jobs.windows(2) {
        let earlier = (pair[0].ready_time(), pair[0].submit_time);
        let later = (pair[1].ready_time(), pair[1].submit_time);
        assert!(earlier <= later, "queue order violated: {:?}", pair);
    }
}

#[test]
fn test_equal_ready_times_order_by_submit_time() {
    let mut queue = JobQueue::new();
    // Both ready at 110, submitted at 105 and 100
    let late_submit = job_at(105, 5);
    let early_submit = job_at(100, 10);
    let (late_id, early_id) = (late_submit.id, early_submit.id);

    queue.insert(late_submit);
    queue.insert(early_submit);
    assert_eq!(queued_ids(&queue), vec![early_id, late_id]);
}

#[test]
fn test_fully_tied_jobs_keep_insertion_order() {
    let mut queue = JobQueue::new();
    let first = job_at(100, 5);
    let second = job_at(100, 5);
    let (first_id, second_id) = (first.id, second.id);

    queue.insert(first);
    queue.insert(second);
    assert_eq!(queued_ids(&queue), vec![first_id, second_id]);
}

#[test]
fn test_insert_at_head_and_tail() {
    let mut queue = JobQueue::new();
    queue.insert(job_at(100, 10)); // ready 110
    queue.insert(job_at(100, 20)); // ready 120, tail
    queue.insert(job_at(100, 5)); // ready 105, head
    queue.insert(job_at(100, 15)); // ready 115, middle

    let ready_times: Vec<_> = queue
        .ordered_jobs()
        .iter()
        .map(|job| job.ready_time())
        .collect();
    assert_eq!(ready_times, vec![ts(105), ts(110), ts(115), ts(120)]);
}

#[test]
fn test_remove_head_returns_lowest_ready_time() {
    let mut queue = JobQueue::new();
    queue.insert(job_at(100, 5));
    let b = job_at(100, 2);
    let b_id = b.id;
    queue.insert(b);

    let head = queue.remove_head().unwrap();
    assert_eq!(head.id, b_id);
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_remove_head_on_empty_returns_none() {
    let mut queue = JobQueue::new();
    assert!(queue.remove_head().is_none());
    assert_eq!(queue.len(), 0);

    // The queue stays usable after the empty removal
    queue.insert(job_at(100, 1));
    assert_eq!(queue.len(), 1);
    assert!(queue.remove_head().is_some());
    assert!(queue.remove_head().is_none());
}

#[test]
fn test_peek_head_ready_time_is_non_destructive() {
    let mut queue = JobQueue::new();
    assert!(queue.peek_head_ready_time().is_none());

    queue.insert(job_at(100, 2));
    assert_eq!(queue.peek_head_ready_time(), Some(ts(102)));
    assert_eq!(queue.peek_head_ready_time(), Some(ts(102)));
    assert_eq!(queue.len(), 1);
}

#[test]
fn test_size_tracks_inserts_and_removes() {
    let mut queue = JobQueue::new();
    assert!(queue.is_empty());

    for i in 0..10 {
        queue.insert(job_at(100 + i, (i % 3) as u32));
    }
    assert_eq!(queue.len(), 10);

    for _ in 0..4 {
        assert!(queue.remove_head().is_some());
    }
    assert_eq!(queue.len(), 6);

    queue.insert(job_at(200, 0));
    assert_eq!(queue.len(), 7);
    assert!(!queue.is_empty());
}
