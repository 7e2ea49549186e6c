//! Integration tests for the playback coordinator.

use parallax_playbin::bus::{BusMessage, DiagnosticBus, MessageMask, MissingPluginType};
use parallax_playbin::caps::{Caps, StreamDescriptor, StreamKind};
use parallax_playbin::config::{DecoderEngine, PlaybinConfig};
use parallax_playbin::element::{MediaSink, UriSource};
use parallax_playbin::elements::FakeSink;
use parallax_playbin::error::{ErrorCode, ErrorDomain, Result};
use parallax_playbin::locator::Locator;
use parallax_playbin::pipeline::{PipelineState, PlayBin, StateChangeReturn, Transition};
use parallax_playbin::plugin::{CapabilityResolver, UriHandlerRegistry};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

const DIAGNOSTICS: MessageMask = MessageMask::ELEMENT.union(MessageMask::ERROR);

/// Install a log subscriber once; `RUST_LOG=parallax_playbin=debug` shows
/// resolution decisions.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn next_diagnostic(bus: &DiagnosticBus) -> Option<BusMessage> {
    bus.poll(DIAGNOSTICS, Some(Duration::ZERO))
}

fn file_locator(path: &std::path::Path) -> String {
    format!("file://{}", path.display())
}

/// A source whose probe takes a while, to observe the pipeline mid-preroll.
#[derive(Debug)]
struct SlowSrc {
    delay: Duration,
}

impl UriSource for SlowSrc {
    fn name(&self) -> &str {
        "slowsrc"
    }

    fn set_locator(&mut self, _locator: &Locator) -> Result<()> {
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn probe(&mut self) -> Result<Vec<StreamDescriptor>> {
        std::thread::sleep(self.delay);
        Ok(vec![StreamDescriptor::new(
            StreamKind::Video,
            Caps::new("video/x-raw"),
        )])
    }
}

fn slow_playbin(video: Arc<FakeSink>) -> PlayBin {
    let registry = Arc::new(UriHandlerRegistry::with_builtin());
    registry.register("slow", || {
        Box::new(SlowSrc {
            delay: Duration::from_millis(200),
        })
    });
    let config = PlaybinConfig::builder()
        .main_locator("slow://")
        .video_sink(video)
        .build()
        .unwrap();
    PlayBin::new(config, registry, Arc::new(CapabilityResolver::new()))
}

// ============================================================================
// Sink usage
// ============================================================================

/// A video-only stream must leave the audio sink untouched, even one that
/// would fail to activate.
#[test]
fn test_video_only_leaves_audio_sink_idle() {
    init_tracing();
    let video = Arc::new(FakeSink::new("video"));
    let audio = Arc::new(FakeSink::new("audio").failing_on(Transition::NullToReady));
    let config = PlaybinConfig::builder()
        .main_locator("redvideo://")
        .video_sink(video.clone())
        .audio_sink(audio.clone())
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);

    assert_eq!(
        playbin.request_state(PipelineState::Ready),
        StateChangeReturn::Success
    );
    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );
    assert_eq!(playbin.await_completion(None), StateChangeReturn::Success);

    assert_eq!(video.state().current, PipelineState::Paused);
    assert_eq!(audio.state().current, PipelineState::Null);
    assert_eq!(audio.state().pending, None);
    assert_eq!(audio.transition_count(), 0);

    let streams = playbin.stream_info();
    assert_eq!(streams.len(), 1);
    assert_eq!(streams[0].kind, StreamKind::Video);

    assert_eq!(
        playbin.request_state(PipelineState::Null),
        StateChangeReturn::Success
    );
    assert_eq!(audio.transition_count(), 0);
    assert_eq!(video.release_count(), 1);
}

#[test]
fn test_sink_activation_failure() {
    init_tracing();
    let video = Arc::new(FakeSink::new("video").failing_on(Transition::ReadyToPaused));
    let config = PlaybinConfig::builder()
        .main_locator("redvideo://")
        .video_sink(video.clone())
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);

    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );
    assert_eq!(playbin.await_completion(None), StateChangeReturn::Failure);
    assert_eq!(playbin.current_state().current, PipelineState::Ready);

    let bus = playbin.bus();
    let msg = bus.poll(MessageMask::ERROR, Some(Duration::ZERO)).unwrap();
    let report = msg.as_error().unwrap();
    assert_eq!(report.domain, ErrorDomain::Core);
    assert_eq!(report.code, ErrorCode::StateChange);

    // the failed run already returned the sink to Null
    assert_eq!(video.state().current, PipelineState::Null);
    playbin.request_state(PipelineState::Null);
    assert_eq!(video.release_count(), 1);
}

// ============================================================================
// Secondary locator
// ============================================================================

fn assert_sub_recovered(sub: &str) {
    let config = PlaybinConfig::builder()
        .main_locator("redvideo://")
        .sub_locator(sub)
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);

    assert_eq!(
        playbin.request_state(PipelineState::Ready),
        StateChangeReturn::Success
    );
    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );
    assert_eq!(playbin.await_completion(None), StateChangeReturn::Success);

    let bus = playbin.bus();
    assert!(next_diagnostic(&bus).is_none(), "sub '{sub}' reached the bus");
    assert_eq!(playbin.stream_info().len(), 1);

    assert_eq!(
        playbin.request_state(PipelineState::Null),
        StateChangeReturn::Success
    );
}

#[test]
fn test_sub_missing_file_is_recovered() {
    init_tracing();
    assert_sub_recovered("file:///foo/bar/803129999/32x9ax1");
}

#[test]
fn test_sub_unknown_protocol_is_recovered() {
    init_tracing();
    assert_sub_recovered("cookie://ficky/bear");
}

#[test]
fn test_sub_unknown_type_is_recovered() {
    init_tracing();
    let file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
    assert_sub_recovered(&file_locator(file.path()));
}

#[test]
fn test_sub_malformed_is_recovered() {
    init_tracing();
    assert_sub_recovered("not a locator");
}

#[test]
fn test_sub_subtitles_add_branch() {
    init_tracing();
    let mut file = tempfile::Builder::new().suffix(".srt").tempfile().unwrap();
    writeln!(file, "1\n00:00:00,000 --> 00:00:01,000\nred").unwrap();

    let config = PlaybinConfig::builder()
        .main_locator("redvideo://")
        .sub_locator(file_locator(file.path()))
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);

    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );
    assert_eq!(playbin.await_completion(None), StateChangeReturn::Success);

    let streams = playbin.stream_info();
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[0].kind, StreamKind::Video);
    assert_eq!(streams[1].kind, StreamKind::Subtitle);
}

// ============================================================================
// Missing source handlers
// ============================================================================

#[test]
fn test_missing_main_uri_handler() {
    init_tracing();
    let config = PlaybinConfig::builder()
        .main_locator("cookie://")
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);

    assert_eq!(
        playbin.request_state(PipelineState::Ready),
        StateChangeReturn::Success
    );
    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Failure
    );

    let bus = playbin.bus();
    let msg = next_diagnostic(&bus).expect("diagnostic");
    let diagnostic = msg.as_diagnostic().expect("diagnostic before error");
    assert_eq!(diagnostic.name(), "missing-plugin");
    assert_eq!(diagnostic.plugin_type, MissingPluginType::UriSource);
    assert_eq!(diagnostic.detail.as_scheme(), Some("cookie"));

    let msg = next_diagnostic(&bus).expect("error");
    let report = msg.as_error().expect("error report");
    assert_eq!(report.domain, ErrorDomain::Core);
    assert_eq!(report.code, ErrorCode::MissingPlugin);

    assert_eq!(
        playbin.request_state(PipelineState::Null),
        StateChangeReturn::Success
    );
}

#[test]
fn test_missing_sub_uri_handler_in_failing_run() {
    init_tracing();
    let config = PlaybinConfig::builder()
        .main_locator("file:///does/not/exis.t")
        .sub_locator("cookie://")
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);

    assert_eq!(
        playbin.request_state(PipelineState::Ready),
        StateChangeReturn::Success
    );
    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Failure
    );

    let bus = playbin.bus();
    let msg = next_diagnostic(&bus).unwrap();
    let diagnostic = msg.as_diagnostic().unwrap();
    assert_eq!(diagnostic.plugin_type, MissingPluginType::UriSource);
    assert_eq!(diagnostic.detail.as_scheme(), Some("cookie"));

    let msg = next_diagnostic(&bus).unwrap();
    let report = msg.as_error().unwrap();
    assert_eq!(report.domain, ErrorDomain::Core);
    assert_eq!(report.code, ErrorCode::MissingPlugin);

    let msg = next_diagnostic(&bus).unwrap();
    let report = msg.as_error().unwrap();
    assert_eq!(report.domain, ErrorDomain::Resource);
    assert_eq!(report.code, ErrorCode::NotFound);
}

#[test]
fn test_malformed_main_locator() {
    init_tracing();
    let config = PlaybinConfig::builder()
        .main_locator("no-separator")
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);

    assert_eq!(
        playbin.request_state(PipelineState::Ready),
        StateChangeReturn::Success
    );
    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Failure
    );

    let bus = playbin.bus();
    let msg = next_diagnostic(&bus).unwrap();
    let diagnostic = msg.as_diagnostic().expect("diagnostic before error");
    assert_eq!(diagnostic.plugin_type, MissingPluginType::UriSource);
    assert_eq!(diagnostic.detail.as_scheme(), Some(""));

    let msg = next_diagnostic(&bus).unwrap();
    let report = msg.as_error().unwrap();
    assert_eq!(report.domain, ErrorDomain::Core);
    assert_eq!(report.code, ErrorCode::MissingPlugin);
    assert!(next_diagnostic(&bus).is_none());
}

#[test]
fn test_missing_main_and_sub_uri_handlers() {
    init_tracing();
    let config = PlaybinConfig::builder()
        .main_locator("cookie://")
        .sub_locator("biscuit://")
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);

    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Failure
    );

    let bus = playbin.bus();
    let schemes: Vec<_> = (0..2)
        .map(|_| {
            let msg = next_diagnostic(&bus).unwrap();
            let diagnostic = msg.as_diagnostic().unwrap();
            diagnostic.detail.as_scheme().unwrap().to_string()
        })
        .collect();
    assert_eq!(schemes, ["cookie", "biscuit"]);

    for scheme in ["biscuit", "cookie"] {
        let msg = next_diagnostic(&bus).unwrap();
        let report = msg.as_error().unwrap();
        assert_eq!(report.code, ErrorCode::MissingPlugin);
        assert!(report.message.contains(scheme), "{}", report.message);
    }
    assert!(next_diagnostic(&bus).is_none());
}

#[test]
fn test_undetectable_main_type() {
    init_tracing();
    let file = tempfile::Builder::new().suffix(".bin").tempfile().unwrap();
    let config = PlaybinConfig::builder()
        .main_locator(file_locator(file.path()))
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);

    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );
    assert_eq!(playbin.await_completion(None), StateChangeReturn::Failure);

    let msg = playbin
        .bus()
        .poll(MessageMask::ERROR, Some(Duration::ZERO))
        .unwrap();
    let report = msg.as_error().unwrap();
    assert_eq!(report.domain, ErrorDomain::Stream);
    assert_eq!(report.code, ErrorCode::TypeNotFound);
}

// ============================================================================
// Missing decoders
// ============================================================================

fn assert_missing_decoder(engine: DecoderEngine, domain: ErrorDomain, code: ErrorCode) {
    let config = PlaybinConfig::builder()
        .main_locator("codec://")
        .decoder_engine(engine)
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);

    assert_eq!(
        playbin.request_state(PipelineState::Ready),
        StateChangeReturn::Success
    );
    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );
    assert_eq!(playbin.await_completion(None), StateChangeReturn::Failure);

    let bus = playbin.bus();
    let msg = next_diagnostic(&bus).unwrap();
    let diagnostic = msg.as_diagnostic().unwrap();
    assert_eq!(diagnostic.plugin_type, MissingPluginType::Decoder);
    assert_eq!(
        diagnostic.detail.as_caps(),
        Some(&Caps::new("application/x-codec"))
    );

    let msg = next_diagnostic(&bus).unwrap();
    let report = msg.as_error().unwrap();
    assert_eq!(report.domain, domain);
    assert_eq!(report.code, code);
    assert!(next_diagnostic(&bus).is_none());

    assert_eq!(
        playbin.request_state(PipelineState::Null),
        StateChangeReturn::Success
    );
}

#[test]
fn test_missing_primary_decoder_v1() {
    init_tracing();
    assert_missing_decoder(
        DecoderEngine::V1,
        ErrorDomain::Stream,
        ErrorCode::CodecNotFound,
    );
}

#[test]
fn test_missing_primary_decoder_v2() {
    init_tracing();
    assert_missing_decoder(DecoderEngine::V2, ErrorDomain::Core, ErrorCode::MissingPlugin);
}

/// Two streams in formats nothing decodes.
#[derive(Debug)]
struct MuxSrc;

impl UriSource for MuxSrc {
    fn name(&self) -> &str {
        "muxsrc"
    }

    fn set_locator(&mut self, _locator: &Locator) -> Result<()> {
        Ok(())
    }

    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn probe(&mut self) -> Result<Vec<StreamDescriptor>> {
        Ok(vec![
            StreamDescriptor::new(StreamKind::Video, Caps::new("video/x-alpha")),
            StreamDescriptor::new(StreamKind::Audio, Caps::new("audio/x-beta")),
        ])
    }
}

#[test]
fn test_each_decoder_gap_is_reported() {
    init_tracing();
    let registry = Arc::new(UriHandlerRegistry::with_builtin());
    registry.register("mux", || Box::new(MuxSrc));
    let config = PlaybinConfig::builder()
        .main_locator("mux://")
        .build()
        .unwrap();
    let playbin = PlayBin::new(config, registry, Arc::new(CapabilityResolver::new()));

    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );
    assert_eq!(playbin.await_completion(None), StateChangeReturn::Failure);

    let bus = playbin.bus();
    for media_type in ["video/x-alpha", "audio/x-beta"] {
        let msg = next_diagnostic(&bus).unwrap();
        let diagnostic = msg.as_diagnostic().unwrap();
        assert_eq!(diagnostic.plugin_type, MissingPluginType::Decoder);
        assert_eq!(diagnostic.detail.as_caps(), Some(&Caps::new(media_type)));

        let msg = next_diagnostic(&bus).unwrap();
        assert_eq!(msg.as_error().unwrap().code, ErrorCode::CodecNotFound);
    }
    assert!(next_diagnostic(&bus).is_none());
}

#[test]
fn test_sub_decoder_gap_is_recovered() {
    init_tracing();
    assert_sub_recovered("codec://");
}

#[test]
fn test_registered_decoder_fills_gap() {
    init_tracing();
    let decoders = Arc::new(CapabilityResolver::new());
    decoders.register(
        "codecdec",
        &["application/x-codec"],
        parallax_playbin::plugin::Rank::PRIMARY,
        || Box::new(parallax_playbin::elements::PassthroughDecoder::new("codecdec")),
    );
    let config = PlaybinConfig::builder()
        .main_locator("codec://")
        .build()
        .unwrap();
    let playbin = PlayBin::new(config, Arc::new(UriHandlerRegistry::with_builtin()), decoders);

    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );
    assert_eq!(playbin.await_completion(None), StateChangeReturn::Success);
    assert!(next_diagnostic(&playbin.bus()).is_none());
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn test_bus_does_not_accumulate_across_cycles() {
    init_tracing();
    let config = PlaybinConfig::builder()
        .main_locator("redvideo://")
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);
    let bus = playbin.bus();

    for _ in 0..50 {
        assert_eq!(
            playbin.request_state(PipelineState::Paused),
            StateChangeReturn::Async
        );
        assert_eq!(playbin.await_completion(None), StateChangeReturn::Success);
        playbin.request_state(PipelineState::Null);
        assert!(bus.drain(DIAGNOSTICS).is_empty());
    }

    // only the last Paused -> Null notification is still queued
    assert_eq!(bus.len(), 1);
    let msg = bus.pop().unwrap();
    assert!(matches!(
        msg,
        BusMessage::StateChanged {
            new: PipelineState::Null,
            ..
        }
    ));
}

#[test]
fn test_null_from_every_state() {
    init_tracing();
    for target in [
        PipelineState::Null,
        PipelineState::Ready,
        PipelineState::Paused,
        PipelineState::Playing,
    ] {
        let video = Arc::new(FakeSink::new("video"));
        let config = PlaybinConfig::builder()
            .main_locator("redvideo://")
            .video_sink(video.clone())
            .build()
            .unwrap();
        let playbin = PlayBin::with_defaults(config);

        if playbin.request_state(target) == StateChangeReturn::Async {
            assert_eq!(playbin.await_completion(None), StateChangeReturn::Success);
        }
        assert_eq!(playbin.current_state().current, target);

        assert_eq!(
            playbin.request_state(PipelineState::Null),
            StateChangeReturn::Success
        );
        assert_eq!(
            playbin.request_state(PipelineState::Null),
            StateChangeReturn::Success
        );
        assert_eq!(playbin.current_state().current, PipelineState::Null);
        assert_eq!(video.state().current, PipelineState::Null);

        let expected = usize::from(target >= PipelineState::Paused);
        assert_eq!(video.release_count(), expected, "from {target}");
    }
}

#[test]
fn test_null_during_preroll() {
    init_tracing();
    let video = Arc::new(FakeSink::new("video"));
    let playbin = slow_playbin(video.clone());

    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );
    assert_eq!(
        playbin.await_completion(Some(Duration::ZERO)),
        StateChangeReturn::Async
    );
    assert_eq!(
        playbin.request_state(PipelineState::Null),
        StateChangeReturn::Success
    );

    assert_eq!(playbin.current_state().current, PipelineState::Null);
    assert_eq!(playbin.current_state().pending, None);
    assert_eq!(video.transition_count(), 0);
    assert!(playbin.stream_info().is_empty());
    assert!(next_diagnostic(&playbin.bus()).is_none());
}

#[test]
fn test_bounded_wait_times_out() {
    init_tracing();
    let video = Arc::new(FakeSink::new("video"));
    let playbin = slow_playbin(video.clone());

    assert_eq!(
        playbin.request_state(PipelineState::Playing),
        StateChangeReturn::Async
    );
    let query = playbin.get_state(Some(Duration::from_millis(10)));
    assert_eq!(query.result, StateChangeReturn::Async);
    assert_eq!(query.current, PipelineState::Ready);
    assert_eq!(query.pending, Some(PipelineState::Playing));

    assert_eq!(playbin.await_completion(None), StateChangeReturn::Success);
    assert_eq!(playbin.current_state().current, PipelineState::Playing);
    assert_eq!(video.state().current, PipelineState::Playing);
}

#[test]
fn test_ready_during_preroll_aborts() {
    init_tracing();
    let video = Arc::new(FakeSink::new("video"));
    let playbin = slow_playbin(video.clone());

    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );
    assert_eq!(
        playbin.request_state(PipelineState::Ready),
        StateChangeReturn::Success
    );
    assert_eq!(playbin.current_state().current, PipelineState::Ready);
    assert_eq!(video.transition_count(), 0);

    // a new run starts cleanly
    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );
    assert_eq!(playbin.await_completion(None), StateChangeReturn::Success);
}

#[test]
fn test_drop_releases_sinks() {
    init_tracing();
    let video = Arc::new(FakeSink::new("video"));
    {
        let config = PlaybinConfig::builder()
            .main_locator("redvideo://")
            .video_sink(video.clone() as Arc<dyn MediaSink>)
            .build()
            .unwrap();
        let playbin = PlayBin::with_defaults(config);
        playbin.request_state(PipelineState::Playing);
        playbin.await_completion(None);
        assert_eq!(video.state().current, PipelineState::Playing);
    }
    assert_eq!(video.state().current, PipelineState::Null);
    assert_eq!(video.release_count(), 1);
}

// ============================================================================
// Async mirror
// ============================================================================

#[tokio::test]
async fn test_mirror_sees_error() {
    init_tracing();
    let config = PlaybinConfig::builder()
        .main_locator("codec://")
        .build()
        .unwrap();
    let playbin = PlayBin::with_defaults(config);
    let mut receiver = playbin.bus().subscribe();

    assert_eq!(
        playbin.request_state(PipelineState::Paused),
        StateChangeReturn::Async
    );

    let report = tokio::time::timeout(Duration::from_secs(5), receiver.wait_error())
        .await
        .expect("error within timeout")
        .expect("bus open");
    assert_eq!(report.code, ErrorCode::CodecNotFound);

    // the mirror does not consume from the queue
    assert!(
        playbin
            .bus()
            .poll(MessageMask::ERROR, Some(Duration::ZERO))
            .is_some()
    );
}
