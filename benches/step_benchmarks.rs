use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stepcue::audio::render::StepRenderer;
use stepcue::messaging::notification::StepEvent;
use stepcue::pattern::{GaitKind, PatternLimits};
use stepcue::sequencer::{EventClock, ScheduledEvent, StepController, StepScheduler};
use stepcue::MetronomeConfig;

/// Benchmark sequence generation (runs on every parameter change)
fn bench_pattern_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern");
    let limits = PatternLimits::default();

    for kind in GaitKind::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(kind), &kind, |b, &kind| {
            b.iter(|| black_box(kind.build(black_box(0.8), black_box(0.4), &limits)));
        });
    }
    group.finish();
}

/// Benchmark scheduling a minute of skipping on the logical clock
fn bench_scheduler_minute(c: &mut Criterion) {
    let config = MetronomeConfig::default();

    c.bench_function("scheduler_skip_60s", |b| {
        let mut events: Vec<StepEvent> = Vec::with_capacity(1024);
        b.iter(|| {
            events.clear();
            let scheduler: StepScheduler<EventClock<ScheduledEvent>> =
                StepScheduler::new(config.boundary_lookahead);
            let mut controller = StepController::new(scheduler, &config).unwrap();
            let _ = controller.set_parameters(GaitKind::Skip, 0.5, 0.3);

            let mut time = 0.0;
            while time < 60.0 {
                time += 0.01;
                controller.advance_to(time, &mut events);
            }
            black_box(events.len())
        });
    });
}

/// Benchmark the audio callback path (critical for real-time performance)
fn bench_render_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let config = MetronomeConfig::default();

    for buffer_size in [64usize, 256, 512] {
        let mut renderer = StepRenderer::new(48000.0, &config).unwrap();
        renderer.controller_mut().play();
        let mut buffer = vec![0.0f32; buffer_size * 2];

        group.bench_with_input(
            BenchmarkId::from_parameter(buffer_size),
            &buffer_size,
            |b, _| {
                b.iter(|| {
                    renderer.render_interleaved(&mut buffer, 2);
                    black_box(&buffer);
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_pattern_generation,
    bench_scheduler_minute,
    bench_render_buffer
);
criterion_main!(benches);
