use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hearth_animation::{AnimatedValue, AnimationScheduler, Spring, SpringConfig};

fn spring_step(c: &mut Criterion) {
    c.bench_function("spring_step_parallax_60fps", |b| {
        b.iter(|| {
            let mut spring = Spring::new(SpringConfig::parallax(), 0.0);
            spring.set_target(-700.0);
            for _ in 0..60 {
                spring.step(black_box(1.0 / 60.0));
            }
            spring.value()
        })
    });
}

fn scheduler_advance(c: &mut Criterion) {
    let scheduler = AnimationScheduler::new();
    let multipliers = [-7.0f32, -6.0, -5.0, -4.0, -3.0];
    let mut layers: Vec<AnimatedValue> = multipliers
        .iter()
        .map(|_| AnimatedValue::new(scheduler.handle(), 0.0, SpringConfig::parallax()))
        .collect();

    c.bench_function("scheduler_advance_five_layers", |b| {
        let mut percent = 0.0f32;
        b.iter(|| {
            percent = (percent + 1.0) % 100.0;
            for (layer, multiplier) in layers.iter_mut().zip(multipliers) {
                layer.set_target(percent * multiplier);
            }
            scheduler.advance(black_box(1.0 / 60.0))
        })
    });
}

criterion_group!(benches, spring_step, scheduler_advance);
criterion_main!(benches);
