// Run with:  cargo bench --bench refresh

use core::convert::Infallible;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use dmd_framebuffer::compute_buffer_size;
use dmd_framebuffer::scan::{ScanEngine, ScanPins};
use dmd_framebuffer::transport::{SpiConfig, Transport};
use embedded_hal::digital::{ErrorType, OutputPin};
use std::hint::black_box;
use std::time::Duration;

const WIDE: usize = 2;
const HIGH: usize = 1;
const BYTES: usize = compute_buffer_size(WIDE, HIGH);

// A full frame is four refresh cycles
const ITERATIONS: usize = 4 * 250;

struct SinkTransport {
    checksum: u32,
}

impl Transport for SinkTransport {
    type Error = Infallible;

    fn configure(&mut self, _config: &SpiConfig) -> Result<(), Infallible> {
        Ok(())
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
        for w in words {
            self.checksum = self.checksum.wrapping_add(u32::from(*w));
        }
        Ok(())
    }
}

struct SinkPin;

impl ErrorType for SinkPin {
    type Error = Infallible;
}

impl OutputPin for SinkPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

fn configure_criterion() -> Criterion {
    Criterion::default()
        .sample_size(100)
        .measurement_time(Duration::from_secs(5))
        .warm_up_time(Duration::from_secs(2))
}

fn refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("refresh");
    group.throughput(Throughput::Elements(ITERATIONS as u64));

    group.bench_function("two_panels", |b| {
        let pins = ScanPins {
            a: SinkPin,
            b: SinkPin,
            output_enable: SinkPin,
            latch: SinkPin,
        };
        let mut dmd = ScanEngine::<_, _, _, _, _, WIDE, HIGH, BYTES>::new(
            SinkTransport { checksum: 0 },
            pins,
        );
        dmd.frame_mut().fill(true);

        b.iter(|| {
            for _ in 0..ITERATIONS {
                black_box(&mut dmd).refresh().unwrap();
            }
        });
    });

    group.finish();
}

criterion_group!(name = benches; config = configure_criterion(); targets = refresh);
criterion_main!(benches);
