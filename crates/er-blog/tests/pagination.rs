use std::cell::RefCell;
use std::collections::VecDeque;

use async_trait::async_trait;
use er_api_types::PostsQuery;
use er_blog::{
    BlogController, CancelSignal, FetchError, LoadMode, LoadOutcome, MemoryWatcher, Messages, Phase,
    PostsPage, PostsSource, ResultsModel, Status, ViewportWatcher, load,
};
use serde_json::json;
use tokio::sync::oneshot;

type Controller = BlogController<ResultsModel, MemoryWatcher>;

fn controller() -> RefCell<Controller> {
    RefCell::new(BlogController::new(
        ResultsModel::new("No posts found."),
        MemoryWatcher::default(),
        10,
        Messages::default(),
    ))
}

fn posts(from: u64, n: u64) -> Vec<serde_json::Value> {
    (from..from + n)
        .map(|i| {
            json!({
                "id": i + 1,
                "title": { "rendered": format!("Post {}", i + 1) },
                "excerpt": { "rendered": "<p>Retro.</p>" },
                "link": format!("/blog/{}", i + 1),
                "date": "2024-01-01T00:00:00"
            })
        })
        .collect()
}

/// Replays queued responses and records every query it sees.
#[derive(Default)]
struct ScriptedSource {
    responses: RefCell<VecDeque<Result<PostsPage, FetchError>>>,
    requests: RefCell<Vec<PostsQuery>>,
}

impl ScriptedSource {
    fn push(self, response: Result<PostsPage, FetchError>) -> Self {
        self.responses.borrow_mut().push_back(response);
        self
    }

    fn offsets(&self) -> Vec<u64> {
        self.requests.borrow().iter().map(|q| q.offset).collect()
    }
}

#[async_trait(?Send)]
impl PostsSource for ScriptedSource {
    async fn fetch(&self, query: PostsQuery, _signal: CancelSignal) -> Result<PostsPage, FetchError> {
        self.requests.borrow_mut().push(query);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(FetchError::Transport("no scripted response".into())))
    }
}

#[tokio::test]
async fn pages_through_to_the_end() -> anyhow::Result<()> {
    let source = ScriptedSource::default()
        .push(Ok(PostsPage::new(posts(0, 10), Some(25))))
        .push(Ok(PostsPage::new(posts(10, 10), Some(25))))
        .push(Ok(PostsPage::new(posts(20, 5), Some(25))));
    let c = controller();

    load(&c, &source, LoadMode::Initial).await;
    {
        let c = c.borrow();
        assert_eq!(c.cursor().loaded_count, 10);
        assert_eq!(c.cursor().total, 25);
        assert_eq!(c.phase(), Phase::ReadyWatching);
        assert!(c.watcher().is_observing());
        assert_eq!(c.view().map(|v| v.cards().len()), Some(10));
        assert_eq!(c.view().map(|v| v.status().clone()), Some(Status::None));
    }

    load(&c, &source, LoadMode::Append).await;
    assert_eq!(c.borrow().cursor().loaded_count, 20);

    let outcome = load(&c, &source, LoadMode::Append).await;
    assert_eq!(outcome, LoadOutcome::Loaded { added: 5, ended: true });
    {
        let c = c.borrow();
        assert_eq!(c.cursor().loaded_count, 25);
        assert_eq!(c.phase(), Phase::EndReached);
        assert!(!c.watcher().is_observing());
        assert_eq!(c.view().map(|v| v.status().clone()), Some(Status::End(Messages::default().end)));
    }

    // The sentinel may still be visible; nothing more is fetched.
    assert_eq!(load(&c, &source, LoadMode::Append).await, LoadOutcome::Skipped);
    assert_eq!(source.offsets(), vec![0, 10, 20]);
    Ok(())
}

#[tokio::test]
async fn initial_failure_shows_message_and_rearms() -> anyhow::Result<()> {
    let source = ScriptedSource::default()
        .push(Err(FetchError::Transport("connection reset".into())))
        .push(Ok(PostsPage::new(posts(0, 4), Some(4))));
    let c = controller();

    let outcome = load(&c, &source, LoadMode::Initial).await;
    assert_eq!(outcome, LoadOutcome::Failed { watching: true });
    {
        let c = c.borrow();
        assert_eq!(c.phase(), Phase::Error);
        assert!(c.watcher().is_observing());
        assert_eq!(
            c.view().map(|v| v.status().clone()),
            Some(Status::Error(Messages::default().load_error))
        );
    }

    // Scrolling back into view retries from the current offset.
    load(&c, &source, LoadMode::Append).await;
    assert_eq!(source.offsets(), vec![0, 0]);
    assert_eq!(c.borrow().cursor().loaded_count, 4);
    assert_eq!(c.borrow().phase(), Phase::EndReached);
    Ok(())
}

#[tokio::test]
async fn empty_retry_after_initial_failure_shows_empty_state() -> anyhow::Result<()> {
    let source = ScriptedSource::default()
        .push(Err(FetchError::Transport("connection reset".into())))
        .push(Ok(PostsPage::new(vec![], Some(0))));
    let c = controller();

    load(&c, &source, LoadMode::Initial).await;
    let outcome = load(&c, &source, LoadMode::Append).await;
    assert_eq!(outcome, LoadOutcome::Loaded { added: 0, ended: true });

    let c = c.borrow();
    assert_eq!(c.phase(), Phase::EndReached);
    assert!(!c.watcher().is_observing());
    assert_eq!(c.view().map(|v| v.cards().len()), Some(0));
    assert_eq!(c.view().map(|v| v.status().clone()), Some(Status::Empty(Messages::default().empty)));
    Ok(())
}

#[tokio::test]
async fn every_page_with_more_left_rearms_the_watcher() -> anyhow::Result<()> {
    let source = ScriptedSource::default()
        .push(Ok(PostsPage::new(posts(0, 10), Some(35))))
        .push(Ok(PostsPage::new(posts(10, 10), Some(35))))
        .push(Ok(PostsPage::new(posts(20, 10), Some(35))))
        .push(Ok(PostsPage::new(posts(30, 5), Some(35))));
    let c = controller();

    load(&c, &source, LoadMode::Initial).await;
    assert_eq!(c.borrow().watcher().arms(), 1);

    // Short pages can leave the sentinel visible; each one starts a fresh watch.
    load(&c, &source, LoadMode::Append).await;
    assert_eq!(c.borrow().watcher().arms(), 2);
    load(&c, &source, LoadMode::Append).await;
    assert_eq!(c.borrow().watcher().arms(), 3);
    assert!(c.borrow().watcher().is_observing());

    load(&c, &source, LoadMode::Append).await;
    assert_eq!(c.borrow().watcher().arms(), 3);
    assert!(!c.borrow().watcher().is_observing());
    Ok(())
}

#[tokio::test]
async fn source_cancellation_does_not_end_the_listing() -> anyhow::Result<()> {
    let source = ScriptedSource::default()
        .push(Ok(PostsPage::new(posts(0, 10), Some(30))))
        .push(Err(FetchError::Cancelled))
        .push(Ok(PostsPage::new(posts(10, 10), Some(30))));
    let c = controller();

    load(&c, &source, LoadMode::Initial).await;
    assert_eq!(load(&c, &source, LoadMode::Append).await, LoadOutcome::Discarded);
    {
        let c = c.borrow();
        assert_eq!(c.phase(), Phase::ReadyWatching);
        assert_eq!(c.cursor().loaded_count, 10);
        assert_eq!(c.cursor().total, 30);
        assert_eq!(c.view().map(|v| v.status().clone()), Some(Status::None));
    }

    load(&c, &source, LoadMode::Append).await;
    assert_eq!(c.borrow().cursor().loaded_count, 20);
    assert_eq!(source.offsets(), vec![0, 10, 10]);
    Ok(())
}

#[tokio::test]
async fn bad_request_on_append_stops_pagination() -> anyhow::Result<()> {
    let source = ScriptedSource::default()
        .push(Ok(PostsPage::new(posts(0, 10), Some(40))))
        .push(Err(FetchError::Transport("HTTP 400: rest_post_invalid_page_number".into())));
    let c = controller();

    load(&c, &source, LoadMode::Initial).await;
    let outcome = load(&c, &source, LoadMode::Append).await;
    assert_eq!(outcome, LoadOutcome::Failed { watching: false });
    assert!(!c.borrow().watcher().is_observing());
    assert!(c.borrow().is_stopped());

    assert_eq!(load(&c, &source, LoadMode::Append).await, LoadOutcome::Skipped);
    assert_eq!(source.offsets(), vec![0, 10]);
    Ok(())
}

#[tokio::test]
async fn generic_append_failure_keeps_watching() -> anyhow::Result<()> {
    let source = ScriptedSource::default()
        .push(Ok(PostsPage::new(posts(0, 10), Some(40))))
        .push(Err(FetchError::Http { status: 502, message: "Bad Gateway".into() }))
        .push(Ok(PostsPage::new(posts(10, 10), Some(40))));
    let c = controller();

    load(&c, &source, LoadMode::Initial).await;
    load(&c, &source, LoadMode::Append).await;
    assert!(c.borrow().watcher().is_observing());
    assert_eq!(c.borrow().cursor().loaded_count, 10);

    load(&c, &source, LoadMode::Append).await;
    assert_eq!(c.borrow().cursor().loaded_count, 20);
    assert_eq!(source.offsets(), vec![0, 10, 10]);
    assert_eq!(c.borrow().view().map(|v| v.status().clone()), Some(Status::None));
    Ok(())
}

#[tokio::test]
async fn loaded_count_sums_successful_pages() -> anyhow::Result<()> {
    let sizes = [10u64, 10, 7, 3];
    let mut source = ScriptedSource::default().push(Ok(PostsPage::new(posts(0, sizes[0]), Some(100))));
    let mut offset = sizes[0];
    for &n in &sizes[1..] {
        source = source
            .push(Err(FetchError::Transport("flaky".into())))
            .push(Ok(PostsPage::new(posts(offset, n), Some(100))));
        offset += n;
    }
    let c = controller();

    load(&c, &source, LoadMode::Initial).await;
    let mut previous = c.borrow().cursor().loaded_count;
    for _ in 0..(sizes.len() - 1) * 2 {
        load(&c, &source, LoadMode::Append).await;
        let now = c.borrow().cursor().loaded_count;
        assert!(now >= previous);
        previous = now;
    }
    assert_eq!(previous, sizes.iter().sum::<u64>());
    Ok(())
}

/// Each fetch waits for a response handed in from the test.
#[derive(Default)]
struct GatedSource {
    gates: RefCell<VecDeque<oneshot::Receiver<Result<PostsPage, FetchError>>>>,
}

#[async_trait(?Send)]
impl PostsSource for GatedSource {
    async fn fetch(&self, _query: PostsQuery, _signal: CancelSignal) -> Result<PostsPage, FetchError> {
        let gate = self.gates.borrow_mut().pop_front();
        match gate {
            Some(rx) => rx.await.unwrap_or(Err(FetchError::Cancelled)),
            None => Err(FetchError::Transport("no gate".into())),
        }
    }
}

#[tokio::test]
async fn superseded_request_never_renders() -> anyhow::Result<()> {
    let (tx_a, rx_a) = oneshot::channel();
    let (tx_b, rx_b) = oneshot::channel();
    let source = GatedSource::default();
    source.gates.borrow_mut().extend([rx_a, rx_b]);
    let c = controller();

    let (a, b, ()) = tokio::join!(
        load(&c, &source, LoadMode::Initial),
        load(&c, &source, LoadMode::Initial),
        async {
            // B resolves first, A arrives late with a different page.
            let _ = tx_b.send(Ok(PostsPage::new(posts(0, 3), Some(3))));
            tokio::task::yield_now().await;
            let _ = tx_a.send(Ok(PostsPage::new(posts(100, 10), Some(50))));
        }
    );

    assert_eq!(a, LoadOutcome::Discarded);
    assert_eq!(b, LoadOutcome::Loaded { added: 3, ended: true });
    let c = c.borrow();
    assert_eq!(c.cursor().loaded_count, 3);
    assert_eq!(c.cursor().total, 3);
    let ids: Vec<u64> = c.view().map(|v| v.cards().iter().map(|card| card.id).collect()).unwrap_or_default();
    assert_eq!(ids, vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn teardown_discards_the_pending_result() -> anyhow::Result<()> {
    let (tx, rx) = oneshot::channel();
    let source = GatedSource::default();
    source.gates.borrow_mut().push_back(rx);
    let c = controller();

    let (outcome, ()) = tokio::join!(load(&c, &source, LoadMode::Initial), async {
        c.borrow_mut().teardown();
        let _ = tx.send(Ok(PostsPage::new(posts(0, 10), Some(10))));
    });

    assert_eq!(outcome, LoadOutcome::Discarded);
    assert_eq!(c.borrow().cursor().loaded_count, 0);
    assert!(c.borrow().view().is_none());
    Ok(())
}
