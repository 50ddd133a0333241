mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use vrmchat_speech::ChunkStatus;

#[tokio::test]
async fn test_stop_without_utterance_is_noop() {
    let provider = Arc::new(MockProvider::new());
    let sink = Arc::new(MockSink::new(Duration::from_millis(5)));
    let tts = session(provider, sink.clone(), config());
    let recorder = Recorder::attach(&tts);

    tts.stop();
    tts.stop();

    assert_eq!(sink.halts(), 0);
    assert!(recorder.events().is_empty());
    let snapshot = tts.snapshot();
    assert!(snapshot.chunks.is_empty());
    assert_eq!(snapshot.current_index, None);
    assert!(!snapshot.is_playing);
    assert!(!snapshot.is_loading);
}

#[tokio::test]
async fn test_stop_halts_playback_silently() {
    init_logger();
    let provider = Arc::new(MockProvider::new());
    let sink = Arc::new(MockSink::new(Duration::from_millis(50)));
    let tts = session(provider, sink.clone(), config());
    let recorder = Recorder::attach(&tts);

    tts.start_synthesis("一つ目。二つ目。三つ目。").await;
    tts.stop();
    tts.stop();

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(recorder.events(), vec![start(0, "一つ目。")]);
    assert_eq!(sink.started(), vec!["一つ目。"]);
    assert_eq!(sink.halts(), 2);
    assert!(!tts.is_playing());
    assert!(!tts.is_loading());
    assert_eq!(tts.current_index(), None);
    assert_eq!(tts.spoken_text(), "");
}

#[tokio::test]
async fn test_stop_from_chunk_end_callback() {
    let provider = Arc::new(MockProvider::new());
    let sink = Arc::new(MockSink::new(Duration::from_millis(5)));
    let tts = session(provider, sink.clone(), config());
    let recorder = Recorder::attach(&tts);

    {
        let (controller, events) = (tts.clone(), recorder.events.clone());
        tts.on_chunk_end(move |index| {
            events.lock().unwrap().push(Event::End(index));
            controller.stop();
        });
    }

    tts.start_synthesis("一つ目。二つ目。三つ目。").await;
    eventually(|| !tts.is_playing()).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    tts.clear_callbacks();

    assert_eq!(
        recorder.events(),
        vec![start(0, "一つ目。"), Event::End(0)]
    );
    assert_eq!(sink.started().len(), 1);
    assert_eq!(tts.chunks()[0].status, ChunkStatus::Done);
}

#[tokio::test]
async fn test_new_utterance_supersedes_previous() {
    init_logger();
    let provider = Arc::new(MockProvider::new());
    let sink = Arc::new(MockSink::new(Duration::from_millis(100)));
    let tts = session(provider.clone(), sink.clone(), config());
    let mut recorder = Recorder::attach(&tts);

    tts.start_synthesis("あ。い。う。").await;
    tts.start_synthesis("え。お。").await;
    recorder.wait_complete().await;
    tokio::time::sleep(Duration::from_millis(150)).await;

    assert_eq!(
        recorder.events(),
        vec![
            start(0, "あ。"),
            start(0, "え。"),
            Event::End(0),
            start(1, "お。"),
            Event::End(1),
            Event::Complete,
        ]
    );
    assert_eq!(sink.started(), vec!["あ。", "え。", "お。"]);

    let chunks = tts.chunks();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].text, "え。");
    assert!(chunks.iter().all(|c| c.status == ChunkStatus::Done));
}

#[tokio::test]
async fn test_restart_during_first_fetch_discards_stale_audio() {
    let provider = Arc::new(MockProvider::new().gated());
    let sink = Arc::new(MockSink::new(Duration::from_millis(5)));
    let tts = session(provider.clone(), sink.clone(), config());
    let mut recorder = Recorder::attach(&tts);

    let first = {
        let tts = tts.clone();
        tokio::spawn(async move { tts.start_synthesis("古い。文章。").await })
    };
    eventually(|| provider.calls_for("古い。") == 1).await;
    assert!(tts.is_loading());

    let second = {
        let tts = tts.clone();
        tokio::spawn(async move { tts.start_synthesis("新しい。").await })
    };
    eventually(|| provider.calls_for("新しい。") == 1).await;
    first.await.unwrap();

    provider.open();
    second.await.unwrap();
    recorder.wait_complete().await;

    assert_eq!(
        recorder.events(),
        vec![start(0, "新しい。"), Event::End(0), Event::Complete]
    );
    assert_eq!(sink.started(), vec!["新しい。"]);
    assert_eq!(provider.calls_for("文章。"), 0);
}

#[tokio::test]
async fn test_concurrent_prefetch_deduplicates_requests() {
    let provider = Arc::new(MockProvider::new().gated());
    let sink = Arc::new(MockSink::new(Duration::from_millis(5)));
    let tts = session(provider.clone(), sink, config());
    let mut recorder = Recorder::attach(&tts);

    let speaking = {
        let tts = tts.clone();
        tokio::spawn(async move { tts.start_synthesis("一。二。三。四。").await })
    };
    eventually(|| provider.calls_for("一。") == 1).await;

    let prefetching = {
        let tts = tts.clone();
        tokio::spawn(async move {
            tokio::join!(tts.prefetch(0), tts.prefetch(1), tts.prefetch(0), tts.prefetch(1));
        })
    };
    eventually(|| provider.in_flight() == 3).await;
    assert_eq!(provider.calls_for("一。"), 1);
    assert_eq!(provider.calls_for("二。"), 1);
    assert_eq!(provider.calls_for("三。"), 1);
    assert_eq!(provider.calls_for("四。"), 0);

    provider.open();
    prefetching.await.unwrap();
    speaking.await.unwrap();
    recorder.wait_complete().await;

    for text in ["一。", "二。", "三。", "四。"] {
        assert_eq!(provider.calls_for(text), 1, "{text} synthesized more than once");
    }
    assert_eq!(tts.snapshot().count(ChunkStatus::Done), 4);
}

#[tokio::test]
async fn test_prefetch_past_end_is_noop() {
    let provider = Arc::new(MockProvider::new());
    let sink = Arc::new(MockSink::new(Duration::from_millis(100)));
    let tts = session(provider.clone(), sink, config());

    tts.prefetch(0).await;
    assert_eq!(provider.total_calls(), 0);

    tts.start_synthesis("一。二。").await;
    tts.prefetch(5).await;
    tts.prefetch(usize::MAX).await;
    eventually(|| provider.total_calls() == 2).await;
    tts.stop();
}
